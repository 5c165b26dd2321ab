//! Application input messages.
//!
//! This module defines [`Message`], the closed set of inputs that drive the
//! [`crate::Controller`].
//!
//! Messages originate from three distinct sources:
//! - User interactions (keys) and the runtime's periodic tick.
//! - Terminal notifications (geometry results, resize notices).
//! - Completions of background commands (bootstrap, key generation, stash
//!   operations, rendering).

use crate::{AppError, Document, DocumentId, Geometry, KeyInput, Session};

/// Messages processed by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic tick. Drives spinners.
    Tick,

    /// Unrecoverable error reported by a command or sub-component.
    Error(AppError),

    /// Result of a geometry probe.
    TerminalSize(Geometry),

    /// The terminal was resized; geometry must be probed again.
    TerminalResized,

    /// Client bootstrap succeeded.
    ClientReady(Session),

    /// Client bootstrap found no credentials.
    MissingAuth,

    /// Keypair generation finished.
    KeygenDone,

    /// A page of stash documents arrived.
    DocumentsLoaded {
        /// Document the page was requested after.
        after: Option<DocumentId>,
        /// Documents on the page, in display order.
        documents: Vec<Document>,
    },

    /// The list asks for a document to be opened.
    OpenDocument(Document),

    /// Raw markdown for a document arrived.
    ContentFetched {
        /// Document the body belongs to.
        id: DocumentId,
        /// Markdown source.
        body: String,
    },

    /// Rendered text for a document is ready to display.
    ContentRendered {
        /// Document the text belongs to.
        id: DocumentId,
        /// Rendered, width-wrapped text.
        text: String,
    },

    /// A note was saved to a document.
    NoteSaved {
        /// Document the note belongs to.
        id: DocumentId,
        /// Saved note text.
        note: String,
    },

    /// A document was deleted from the stash.
    DocumentDeleted {
        /// Deleted document.
        id: DocumentId,
    },
}

impl From<KeyInput> for Message {
    fn from(key: KeyInput) -> Self {
        Self::Key(key)
    }
}

impl From<AppError> for Message {
    fn from(error: AppError) -> Self {
        Self::Error(error)
    }
}
