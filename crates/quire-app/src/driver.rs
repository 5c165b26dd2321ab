//! I/O abstractions for the runtime.
//!
//! [`Driver`] covers what must happen on the loop thread (reading terminal
//! input, drawing). [`Backend`] and [`DocumentClient`] cover the external
//! collaborators whose work runs in background tasks: client bootstrap, key
//! generation, geometry probing, stash operations and markdown rendering.
//! Each frontend implements these traits while the generic
//! [`crate::Runtime`] handles all orchestration, so the same loop runs in the
//! terminal and in simulation.

use std::future::Future;

use crate::{BootstrapError, Controller, Document, DocumentId, Geometry, KeyInput};

/// Input read from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalInput {
    /// Key press.
    Key(KeyInput),
    /// The terminal changed size.
    Resized,
}

/// Loop-thread terminal I/O.
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Wait for the next terminal input.
    ///
    /// Returns `None` when nothing relevant arrived (the runtime simply polls
    /// again).
    fn poll_input(
        &mut self,
    ) -> impl Future<Output = Result<Option<TerminalInput>, Self::Error>> + Send;

    /// Draw the controller's current view.
    ///
    /// # Errors
    ///
    /// Returns an error if drawing fails.
    fn render(&mut self, app: &Controller) -> Result<(), Self::Error>;

    /// Release terminal resources.
    fn stop(&mut self);
}

/// Stash operations of a bootstrapped client.
///
/// Shared read-only between background tasks after bootstrap.
pub trait DocumentClient: Send + Sync + 'static {
    /// Client-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Endpoint description for display.
    fn endpoint(&self) -> String;

    /// Authenticated user, if any.
    fn user(&self) -> Option<crate::User>;

    /// Load up to [`crate::PAGE_SIZE`] documents in id order, starting after
    /// `after` (from the beginning when `None`).
    ///
    /// `after` need not exist any more; paging by id keeps pages stable
    /// across deletes.
    fn list(
        &self,
        after: Option<DocumentId>,
    ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send;

    /// Fetch a document's markdown body.
    fn fetch(&self, id: DocumentId) -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Persist a note for a document.
    fn save_note(
        &self,
        id: DocumentId,
        note: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Delete a document.
    fn delete(&self, id: DocumentId) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Background collaborators.
pub trait Backend: Send + Sync + 'static {
    /// Client produced by a successful bootstrap.
    type Client: DocumentClient;

    /// Bootstrap the remote client.
    fn bootstrap(&self) -> impl Future<Output = Result<Self::Client, BootstrapError>> + Send;

    /// Generate and store a keypair.
    fn generate_keys(&self) -> impl Future<Output = Result<(), String>> + Send;

    /// Query the terminal size.
    fn probe_geometry(&self) -> impl Future<Output = Result<Geometry, String>> + Send;

    /// Render markdown to display text wrapped at `width` columns.
    fn render_content(&self, body: &str, width: u16) -> impl Future<Output = String> + Send;
}
