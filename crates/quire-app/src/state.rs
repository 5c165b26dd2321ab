//! Observable application state types.
//!
//! These are the values the controller and its sub-components exchange with
//! the runtime: terminal geometry, the authenticated session, and the stash
//! documents. They carry no I/O handles, so every message stays cheap to
//! clone and compare in tests.

use std::fmt;

/// Top-level application state. Exactly one is current at any time and it
/// alone decides which sub-component receives input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    /// Waiting for the remote client to bootstrap.
    #[default]
    InitializingClient,
    /// Bootstrap reported missing credentials; generating a keypair.
    GeneratingCredentials,
    /// Keypair generated; bootstrap is being retried.
    CredentialsReady,
    /// Document list is live.
    ShowingList,
    /// Document reader is live.
    ShowingDocument,
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InitializingClient => "initializing",
            Self::GeneratingCredentials => "generating keys",
            Self::CredentialsReady => "keys generated",
            Self::ShowingList => "showing stash",
            Self::ShowingDocument => "showing document",
        };
        f.write_str(label)
    }
}

/// Terminal dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Geometry {
    /// Columns.
    pub width: u16,
    /// Rows.
    pub height: u16,
}

impl Geometry {
    /// Create a geometry.
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

/// Authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct User {
    /// Stable identifier derived from the user's public key.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Handle to a bootstrapped remote client.
///
/// The live client object stays with the runtime; the controller only keeps
/// this description of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Session {
    /// Where the client is connected.
    pub endpoint: String,
    /// Authenticated user. `None` for anonymous access.
    pub user: Option<User>,
}

/// Stash document identifier.
pub type DocumentId = u64;

/// Stash document metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Document {
    /// Identifier, unique within a stash.
    pub id: DocumentId,
    /// Title shown in the list.
    pub title: String,
    /// User note attached to the document. Empty if none.
    pub note: String,
}

impl Document {
    /// Create a document without a note.
    pub fn new(id: DocumentId, title: impl Into<String>) -> Self {
        Self { id, title: title.into(), note: String::new() }
    }
}

/// Frames of the dot spinner.
const SPINNER_FRAMES: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Tick-driven activity indicator. Advances on elapsed-time ticks only, never
/// on actual progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Spinner {
    frame: usize,
}

impl Spinner {
    /// Advance one frame.
    pub fn tick(&mut self) {
        self.frame = (self.frame + 1) % SPINNER_FRAMES.len();
    }

    /// Current glyph.
    pub fn glyph(&self) -> &'static str {
        SPINNER_FRAMES.get(self.frame).copied().unwrap_or(" ")
    }
}
