//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use quire_app::AppState;

use super::{ControllerSnapshot, Invariant, InvariantResult, Violation};

/// Only the live sub-component is rendered.
///
/// In `ShowingList` the view is exactly the stash's view; in
/// `ShowingDocument` it is exactly the pager's view.
pub struct LiveViewExclusive;

impl Invariant for LiveViewExclusive {
    fn name(&self) -> &'static str {
        "live_view_exclusive"
    }

    fn check(&self, state: &ControllerSnapshot) -> InvariantResult {
        if state.error.is_some() {
            return Ok(());
        }
        let expected = match state.state {
            AppState::ShowingList => &state.stash_view,
            AppState::ShowingDocument => &state.pager_view,
            _ => return Ok(()),
        };
        if &state.view == expected {
            Ok(())
        } else {
            Err(Violation {
                invariant: self.name(),
                message: format!(
                    "{} renders {:?}, live component renders {expected:?}",
                    state.state, state.view
                ),
            })
        }
    }
}

/// Every sub-component has the controller's geometry.
pub struct GeometryPropagated;

impl Invariant for GeometryPropagated {
    fn name(&self) -> &'static str {
        "geometry_propagated"
    }

    fn check(&self, state: &ControllerSnapshot) -> InvariantResult {
        const NAMES: [&str; 3] = ["keygen", "stash", "pager"];

        for (name, geometry) in NAMES.iter().zip(state.component_geometry) {
            if geometry != state.geometry {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "{name} has {geometry:?}, controller has {:?}",
                        state.geometry
                    ),
                });
            }
        }
        Ok(())
    }
}

/// The reader is only shown once its content is ready.
pub struct ReaderHasDocument;

impl Invariant for ReaderHasDocument {
    fn name(&self) -> &'static str {
        "reader_has_document"
    }

    fn check(&self, state: &ControllerSnapshot) -> InvariantResult {
        if state.state != AppState::ShowingDocument {
            return Ok(());
        }
        if !state.pager_has_document || state.pager_loading {
            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "showing document with has_document={} loading={}",
                    state.pager_has_document, state.pager_loading
                ),
            });
        }
        Ok(())
    }
}

/// The list and reader are only reachable with a session.
pub struct SessionBeforeStash;

impl Invariant for SessionBeforeStash {
    fn name(&self) -> &'static str {
        "session_before_stash"
    }

    fn check(&self, state: &ControllerSnapshot) -> InvariantResult {
        let needs_session =
            matches!(state.state, AppState::ShowingList | AppState::ShowingDocument);
        if needs_session && !state.has_session {
            return Err(Violation {
                invariant: self.name(),
                message: format!("{} without a session", state.state),
            });
        }
        Ok(())
    }
}

/// A stored error replaces the whole view.
pub struct ErrorIsTerminal;

impl Invariant for ErrorIsTerminal {
    fn name(&self) -> &'static str {
        "error_is_terminal"
    }

    fn check(&self, state: &ControllerSnapshot) -> InvariantResult {
        let Some(error) = &state.error else {
            return Ok(());
        };
        let rendered = state.view.contains(&format!("Error: {error}"));
        if rendered && state.view.contains("Press q to exit.") {
            Ok(())
        } else {
            Err(Violation {
                invariant: self.name(),
                message: format!("error {error:?} not rendered: {:?}", state.view),
            })
        }
    }
}
