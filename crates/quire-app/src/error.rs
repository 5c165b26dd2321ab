//! Application error types.

use thiserror::Error;

/// Errors surfaced to the controller.
///
/// Once stored on the [`crate::Controller`] any of these halts further
/// transitions; only a quit request is honored afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Client bootstrap failed for a reason other than missing credentials.
    #[error("could not initialize client: {0}")]
    Bootstrap(String),

    /// Credentials were generated but the client still cannot authenticate.
    #[error("SSH authentication failed")]
    AuthenticationFailed,

    /// Keypair generation failed.
    #[error("could not generate keys: {0}")]
    Keygen(String),

    /// Terminal geometry probe failed.
    #[error("could not read terminal size: {0}")]
    Geometry(String),

    /// A remote stash operation failed.
    #[error("{0}")]
    Remote(String),

    /// A handler observed a state it cannot be in.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// Outcome of a failed client bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BootstrapError {
    /// No usable credentials were found. Retryable once via key generation.
    #[error("missing authentication")]
    MissingAuth,

    /// Any other failure. Fatal.
    #[error("{0}")]
    Failed(String),
}
