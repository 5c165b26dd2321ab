//! Application side-effects and intents.
//!
//! This module defines the [`Command`] enum: descriptions of work produced by
//! the [`crate::Controller`] and its sub-components for the runtime to
//! execute. Every command that does I/O eventually produces exactly one
//! [`crate::Message`] back into the loop.

use crate::{DocumentId, Message};

/// Commands produced by the controller and sub-components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Quit the application.
    Quit,

    /// Query terminal width/height. Yields `TerminalSize` or `Error`.
    ProbeGeometry,

    /// Arm the one-shot resize listener. Yields `TerminalResized` on the next
    /// change.
    ListenForResize,

    /// Bootstrap the remote client. Yields `ClientReady`, `MissingAuth` or
    /// `Error`.
    BootstrapClient,

    /// Generate a keypair. Yields `KeygenDone` or `Error`.
    GenerateKeys,

    /// Load a page of stash documents. Yields `DocumentsLoaded` or `Error`.
    LoadDocuments {
        /// Page starts after this document; `None` for the first page.
        after: Option<DocumentId>,
    },

    /// Fetch the markdown body of a document. Yields `ContentFetched` or
    /// `Error`.
    FetchContent {
        /// Document to fetch.
        id: DocumentId,
    },

    /// Render markdown for display. Yields `ContentRendered`.
    RenderContent {
        /// Document being rendered.
        id: DocumentId,
        /// Markdown source.
        body: String,
        /// Wrap width in columns.
        width: u16,
    },

    /// Persist a note. Yields `NoteSaved` or `Error`.
    SaveNote {
        /// Document the note belongs to.
        id: DocumentId,
        /// Note text.
        note: String,
    },

    /// Delete a document. Yields `DocumentDeleted` or `Error`.
    DeleteDocument {
        /// Document to delete.
        id: DocumentId,
    },

    /// Deliver a message back through the loop without doing any I/O.
    Emit(Message),
}
