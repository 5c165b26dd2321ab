//! Sub-component protocol.
//!
//! Every pluggable mode (key generation, stash list, pager) implements
//! [`Component`]. The controller never touches a component's private state
//! machine; it only initializes it, feeds it messages, resizes it and asks it
//! for a view.

use crate::{Command, Geometry, Message, Session};

/// Everything a component needs to initialize itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    /// Bootstrapped client. `None` before bootstrap succeeds.
    pub session: Option<Session>,
    /// Current terminal geometry.
    pub geometry: Geometry,
}

/// Init/update/view contract for a pluggable mode.
///
/// `update` must not block: long-running work is returned as a [`Command`].
/// Components receive every message routed to them, including ones they do
/// not recognize, and must ignore what they do not care about. Results of
/// superseded commands can still arrive and must be checked against the
/// current sub-state before acting on them.
pub trait Component: Sized {
    /// Create the initial state and any commands to start it.
    fn init(ctx: &Context) -> (Self, Vec<Command>);

    /// Advance the state by one message.
    fn update(self, msg: &Message) -> (Self, Vec<Command>);

    /// Render the state as text. Pure.
    fn view(&self) -> String;

    /// Record new terminal geometry.
    fn set_size(&mut self, geometry: Geometry);
}
