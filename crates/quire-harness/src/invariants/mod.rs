//! Invariant checking for deterministic simulation testing.
//!
//! Invariants are properties that must always hold during execution. Unlike
//! example-based tests that check specific scenarios, invariants verify
//! behavioral properties across every path a script or property test takes.
//!
//! # Architecture
//!
//! The invariant system extracts observable state from the [`Controller`]
//! into a [`ControllerSnapshot`], then runs registered [`Invariant`] checks
//! against it.
//!
//! # Usage
//!
//! ```ignore
//! let registry = InvariantRegistry::standard();
//! let snapshot = ControllerSnapshot::from_controller(&app);
//! registry.check_all(&snapshot)?;
//! ```
//!
//! [`Controller`]: quire_app::Controller

mod checks;
mod snapshot;

pub use checks::{
    ErrorIsTerminal, GeometryPropagated, LiveViewExclusive, ReaderHasDocument, SessionBeforeStash,
};
pub use snapshot::ControllerSnapshot;

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Invariant violation with context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{invariant}: {message}")]
pub struct Violation {
    /// Name of the violated invariant.
    pub invariant: &'static str,
    /// Description of what went wrong.
    pub message: String,
}

/// An invariant that can be checked against controller state.
pub trait Invariant: Send + Sync {
    /// Invariant name for error reporting.
    fn name(&self) -> &'static str;

    /// Check the invariant against a snapshot.
    ///
    /// Returns `Ok(())` if the invariant holds, or a [`Violation`]
    /// describing what went wrong.
    fn check(&self, state: &ControllerSnapshot) -> InvariantResult;
}

/// Registry of invariants to check.
///
/// Use [`InvariantRegistry::standard()`] for the controller invariants.
#[derive(Default)]
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the standard controller invariants.
    ///
    /// Includes:
    /// - [`LiveViewExclusive`]: only the live component is rendered
    /// - [`GeometryPropagated`]: components share the controller geometry
    /// - [`ReaderHasDocument`]: the reader never shows while loading
    /// - [`SessionBeforeStash`]: list and reader need a session
    /// - [`ErrorIsTerminal`]: a stored error owns the view
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(LiveViewExclusive);
        registry.add(GeometryPropagated);
        registry.add(ReaderHasDocument);
        registry.add(SessionBeforeStash);
        registry.add(ErrorIsTerminal);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants against the given state.
    ///
    /// Returns `Ok(())` if all invariants hold, or all violations found.
    pub fn check_all(&self, state: &ControllerSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use quire_app::{AppError, Controller, Geometry, Message, Session};

    use super::*;

    fn snapshot(app: &Controller) -> ControllerSnapshot {
        ControllerSnapshot::from_controller(app)
    }

    #[test]
    fn standard_registry_has_invariants() {
        let registry = InvariantRegistry::standard();
        assert!(!registry.is_empty());
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn fresh_controller_passes() {
        let (app, _) = Controller::init();
        assert!(InvariantRegistry::standard().check_all(&snapshot(&app)).is_ok());
    }

    #[test]
    fn listing_and_error_states_pass() {
        let (app, _) = Controller::init();
        let session = Session { endpoint: "sim".into(), user: None };
        let (app, _) = app.update(Message::TerminalSize(Geometry::new(100, 30)));
        let (app, _) = app.update(Message::ClientReady(session));
        let registry = InvariantRegistry::standard();
        assert!(registry.check_all(&snapshot(&app)).is_ok());

        let (app, _) = app.update(Message::Error(AppError::Remote("gone".into())));
        assert!(registry.check_all(&snapshot(&app)).is_ok());
    }

    #[test]
    fn mismatched_geometry_is_reported() {
        let (app, _) = Controller::init();
        let mut state = snapshot(&app);
        state.component_geometry[1] = Geometry::new(1, 1);

        let violations = InvariantRegistry::standard().check_all(&state).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].invariant, "geometry_propagated");
    }

    #[test]
    fn reader_without_document_is_reported() {
        let (app, _) = Controller::init();
        let mut state = snapshot(&app);
        state.state = quire_app::AppState::ShowingDocument;
        state.has_session = true;
        state.view = state.pager_view.clone();

        let violations = InvariantRegistry::standard().check_all(&state).unwrap_err();
        assert_eq!(violations[0].invariant, "reader_has_document");
    }
}
