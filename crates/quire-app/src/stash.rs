//! Stash (document list) component.
//!
//! Shows the user's documents, paged in from the remote client, and owns the
//! list-local modes: waiting for an opened document, editing a note and
//! confirming a delete. Opening a document is only an intent: the list emits
//! [`Message::OpenDocument`] and the controller hands it to the pager.

use crate::{
    Command, Component, Context, Document, DocumentId, Geometry, InputOutcome, KeyInput, Message,
    Session, Spinner, TextInput,
};

/// Documents requested per page.
pub const PAGE_SIZE: usize = 50;

/// Maximum note length in characters.
pub const NOTE_CHARACTER_LIMIT: usize = 256;

/// Title line plus blank line.
const HEADER_LINES: u16 = 2;
/// Blank line plus help/status line.
const FOOTER_LINES: u16 = 2;

/// List sub-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StashState {
    /// Browsing the list.
    #[default]
    Ready,
    /// An open request is in flight.
    LoadingDocument,
    /// Editing the note of the selected document.
    EditingNote,
    /// Waiting for the user to confirm deleting the selected document.
    ConfirmingDelete,
}

/// Stash component state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StashModel {
    state: StashState,
    session: Option<Session>,
    documents: Vec<Document>,
    /// Index of the selected document.
    cursor: usize,
    /// Index of the first visible document.
    offset: usize,
    /// Pages received so far.
    loaded_pages: usize,
    /// Last document of the last page received. Next page starts after it,
    /// even if it was deleted since.
    last_loaded: Option<DocumentId>,
    /// Last page was full, so another may exist.
    more_available: bool,
    /// A `LoadDocuments` command is in flight.
    loading_page: bool,
    note_input: TextInput,
    spinner: Spinner,
    geometry: Geometry,
}

impl Default for StashModel {
    fn default() -> Self {
        Self {
            state: StashState::Ready,
            session: None,
            documents: Vec::new(),
            cursor: 0,
            offset: 0,
            loaded_pages: 0,
            last_loaded: None,
            more_available: false,
            loading_page: false,
            note_input: TextInput::new(NOTE_CHARACTER_LIMIT),
            spinner: Spinner::default(),
            geometry: Geometry::default(),
        }
    }
}

impl StashModel {
    /// Current sub-state.
    pub fn state(&self) -> StashState {
        self.state
    }

    /// Whether the list is in a mode that owns the quit key.
    pub fn is_modal(&self) -> bool {
        self.state != StashState::Ready
    }

    /// Documents loaded so far.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Index of the selected document.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Index of the first visible document.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Selected document. `None` if the list is empty.
    pub fn selected(&self) -> Option<&Document> {
        self.documents.get(self.cursor)
    }

    /// Last geometry pushed by the controller.
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Leave any list-local mode. Selection and scroll are kept.
    pub fn reset_state(&mut self) {
        self.state = StashState::Ready;
        self.note_input = TextInput::new(NOTE_CHARACTER_LIMIT);
    }

    /// Rows available for list items.
    fn visible_rows(&self) -> usize {
        self.geometry.height.saturating_sub(HEADER_LINES + FOOTER_LINES).max(1) as usize
    }

    /// Scroll so the cursor is on screen.
    fn ensure_visible(&mut self) {
        let rows = self.visible_rows();
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + rows {
            self.offset = self.cursor + 1 - rows;
        }
        let max_offset = self.documents.len().saturating_sub(rows);
        self.offset = self.offset.min(max_offset);
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.documents.len().saturating_sub(1));
        self.ensure_visible();
    }

    /// Request the next page once the cursor reaches the end of what we have.
    fn maybe_load_more(&mut self) -> Vec<Command> {
        let at_end = self.cursor + 1 >= self.documents.len();
        if at_end && self.more_available && !self.loading_page {
            self.loading_page = true;
            vec![Command::LoadDocuments { after: self.last_loaded }]
        } else {
            vec![]
        }
    }

    fn document_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.documents.iter_mut().find(|d| d.id == id)
    }

    fn handle_documents_loaded(&mut self, after: Option<DocumentId>, documents: &[Document]) {
        if !self.loading_page || after != self.last_loaded {
            tracing::warn!(?after, last = ?self.last_loaded, "discarding out-of-order stash page");
            return;
        }
        self.loading_page = false;
        self.loaded_pages += 1;
        self.more_available = documents.len() == PAGE_SIZE;
        if let Some(last) = documents.last() {
            self.last_loaded = Some(last.id);
        }
        self.documents.extend(documents.iter().cloned());
        self.clamp_cursor();
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<Command> {
        match self.state {
            StashState::Ready => self.handle_ready_key(key),
            StashState::LoadingDocument => {
                if key.is_quit() {
                    self.state = StashState::Ready;
                }
                vec![]
            },
            StashState::EditingNote => match self.note_input.handle_key(key) {
                InputOutcome::Editing => vec![],
                InputOutcome::Cancelled => {
                    self.reset_state();
                    vec![]
                },
                InputOutcome::Submitted(note) => {
                    self.reset_state();
                    let Some(doc) = self.documents.get_mut(self.cursor) else {
                        return vec![];
                    };
                    doc.note.clone_from(&note);
                    vec![Command::SaveNote { id: doc.id, note }]
                },
            },
            StashState::ConfirmingDelete => {
                self.state = StashState::Ready;
                if key != KeyInput::Char('y') || self.cursor >= self.documents.len() {
                    return vec![];
                }
                let doc = self.documents.remove(self.cursor);
                self.clamp_cursor();
                let mut commands = vec![Command::DeleteDocument { id: doc.id }];
                commands.extend(self.maybe_load_more());
                commands
            },
        }
    }

    fn handle_ready_key(&mut self, key: KeyInput) -> Vec<Command> {
        let last = self.documents.len().saturating_sub(1);
        match key {
            KeyInput::Char('k') | KeyInput::Up => {
                self.cursor = self.cursor.saturating_sub(1);
                self.ensure_visible();
                vec![]
            },
            KeyInput::Char('j') | KeyInput::Down => {
                self.cursor = (self.cursor + 1).min(last);
                self.ensure_visible();
                self.maybe_load_more()
            },
            KeyInput::Char('g') | KeyInput::Home => {
                self.cursor = 0;
                self.ensure_visible();
                vec![]
            },
            KeyInput::Char('G') | KeyInput::End => {
                self.cursor = last;
                self.ensure_visible();
                self.maybe_load_more()
            },
            KeyInput::Enter => match self.selected() {
                Some(doc) => {
                    let doc = doc.clone();
                    self.state = StashState::LoadingDocument;
                    vec![Command::Emit(Message::OpenDocument(doc))]
                },
                None => vec![],
            },
            KeyInput::Char('m') => {
                if let Some(note) = self.selected().map(|d| d.note.clone()) {
                    self.note_input = TextInput::with_text(NOTE_CHARACTER_LIMIT, &note);
                    self.state = StashState::EditingNote;
                }
                vec![]
            },
            KeyInput::Char('x') => {
                if self.selected().is_some() {
                    self.state = StashState::ConfirmingDelete;
                }
                vec![]
            },
            _ => vec![],
        }
    }

    fn footer(&self) -> String {
        match self.state {
            StashState::Ready => "j/k: move • enter: open • m: note • x: delete • q: quit".into(),
            StashState::LoadingDocument => format!("{} Fetching document...", self.spinner.glyph()),
            StashState::EditingNote => format!("Note: {}", self.note_input.buffer()),
            StashState::ConfirmingDelete => "Delete this document? (y/N)".into(),
        }
    }
}

impl Component for StashModel {
    fn init(ctx: &Context) -> (Self, Vec<Command>) {
        let model = Self {
            session: ctx.session.clone(),
            geometry: ctx.geometry,
            loading_page: true,
            ..Self::default()
        };
        (model, vec![Command::LoadDocuments { after: None }])
    }

    fn update(mut self, msg: &Message) -> (Self, Vec<Command>) {
        let commands = match msg {
            Message::Key(key) => self.handle_key(*key),
            Message::Tick => {
                if self.loading_page || self.state == StashState::LoadingDocument {
                    self.spinner.tick();
                }
                vec![]
            },
            Message::DocumentsLoaded { after, documents } => {
                self.handle_documents_loaded(*after, documents);
                vec![]
            },
            Message::NoteSaved { id, note } => {
                if let Some(doc) = self.document_mut(*id) {
                    doc.note.clone_from(note);
                }
                vec![]
            },
            Message::DocumentDeleted { id } => {
                self.documents.retain(|d| d.id != *id);
                self.clamp_cursor();
                vec![]
            },
            _ => vec![],
        };
        (self, commands)
    }

    fn view(&self) -> String {
        let width = self.geometry.width as usize;
        let title = match self.session.as_ref().and_then(|s| s.user.as_ref()) {
            Some(user) => format!("Stash of {}", user.name),
            None => "Stash".to_string(),
        };

        let mut lines = vec![title, String::new()];
        if self.loaded_pages == 0 {
            lines.push(format!("{} Loading your stash...", self.spinner.glyph()));
        } else if self.documents.is_empty() {
            lines.push("Nothing stashed yet.".to_string());
        } else {
            let rows = self.visible_rows();
            for (i, doc) in self.documents.iter().enumerate().skip(self.offset).take(rows) {
                let marker = if i == self.cursor { ">" } else { " " };
                let line = if doc.note.is_empty() {
                    format!("{marker} {}", doc.title)
                } else {
                    format!("{marker} {} · {}", doc.title, doc.note)
                };
                lines.push(line.chars().take(width).collect());
            }
        }
        lines.push(String::new());
        lines.push(self.footer());
        lines.join("\n")
    }

    fn set_size(&mut self, geometry: Geometry) {
        self.geometry = geometry;
        self.ensure_visible();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(count: u64) -> Vec<Document> {
        (1..=count).map(|i| Document::new(i, format!("doc-{i}"))).collect()
    }

    fn loaded(count: u64) -> StashModel {
        let (model, _) = StashModel::init(&Context::default());
        let (model, _) =
            model.update(&Message::DocumentsLoaded { after: None, documents: docs(count) });
        model
    }

    fn press(model: StashModel, key: KeyInput) -> (StashModel, Vec<Command>) {
        model.update(&Message::Key(key))
    }

    #[test]
    fn init_requests_first_page() {
        let (model, commands) = StashModel::init(&Context::default());
        assert_eq!(commands, vec![Command::LoadDocuments { after: None }]);
        assert!(model.view().contains("Loading your stash"));
    }

    #[test]
    fn enter_emits_open_intent() {
        let model = loaded(3);
        let (model, _) = press(model, KeyInput::Down);
        let (model, commands) = press(model, KeyInput::Enter);

        assert_eq!(model.state(), StashState::LoadingDocument);
        assert!(matches!(
            commands.as_slice(),
            [Command::Emit(Message::OpenDocument(Document { id: 2, .. }))]
        ));
    }

    #[test]
    fn quit_key_cancels_loading() {
        let model = loaded(3);
        let (model, _) = press(model, KeyInput::Enter);
        let (model, commands) = press(model, KeyInput::Esc);
        assert_eq!(model.state(), StashState::Ready);
        assert!(commands.is_empty());
    }

    #[test]
    fn delete_requires_confirmation() {
        let model = loaded(3);
        let (model, _) = press(model, KeyInput::Char('x'));
        assert_eq!(model.state(), StashState::ConfirmingDelete);

        let (model, commands) = press(model, KeyInput::Char('n'));
        assert_eq!(model.state(), StashState::Ready);
        assert!(commands.is_empty());
        assert_eq!(model.documents().len(), 3);

        let (model, _) = press(model, KeyInput::Char('x'));
        let (model, commands) = press(model, KeyInput::Char('y'));
        assert_eq!(commands, vec![Command::DeleteDocument { id: 1 }]);
        assert_eq!(model.documents().len(), 2);
    }

    #[test]
    fn note_editing_saves_on_enter() {
        let model = loaded(2);
        let (mut model, _) = press(model, KeyInput::Char('m'));
        assert_eq!(model.state(), StashState::EditingNote);

        for c in "read later".chars() {
            (model, _) = press(model, KeyInput::Char(c));
        }
        // 'q' is text while editing
        let (model, _) = press(model, KeyInput::Char('q'));
        let (model, commands) = press(model, KeyInput::Enter);

        assert_eq!(model.state(), StashState::Ready);
        assert_eq!(commands, vec![Command::SaveNote { id: 1, note: "read laterq".into() }]);
        assert_eq!(model.documents()[0].note, "read laterq");
    }

    #[test]
    fn note_saved_elsewhere_updates_item() {
        let model = loaded(2);
        let (model, _) = model.update(&Message::NoteSaved { id: 2, note: "from pager".into() });
        assert_eq!(model.documents()[1].note, "from pager");
    }

    #[test]
    fn full_page_triggers_next_page_at_end() {
        let (model, _) = StashModel::init(&Context::default());
        let (model, _) = model
            .update(&Message::DocumentsLoaded { after: None, documents: docs(PAGE_SIZE as u64) });
        let (model, commands) = press(model, KeyInput::End);
        assert_eq!(commands, vec![Command::LoadDocuments { after: Some(PAGE_SIZE as u64) }]);

        // Already in flight
        let (_, commands) = press(model, KeyInput::Down);
        assert!(commands.is_empty());
    }

    #[test]
    fn out_of_order_page_is_discarded() {
        let model = loaded(2);
        let (model, _) =
            model.update(&Message::DocumentsLoaded { after: Some(40), documents: docs(4) });
        assert_eq!(model.documents().len(), 2);
    }

    #[test]
    fn next_page_follows_last_loaded_after_delete() {
        let (model, _) = StashModel::init(&Context::default());
        let (model, _) = model
            .update(&Message::DocumentsLoaded { after: None, documents: docs(PAGE_SIZE as u64) });
        let (model, _) = press(model, KeyInput::Char('x'));
        let (model, _) = press(model, KeyInput::Char('y'));
        assert_eq!(model.documents().len(), PAGE_SIZE - 1);

        let (model, commands) = press(model, KeyInput::End);
        let last = PAGE_SIZE as u64;
        assert_eq!(commands, vec![Command::LoadDocuments { after: Some(last) }]);

        let next = vec![Document::new(last + 1, format!("doc-{}", last + 1))];
        let (model, _) =
            model.update(&Message::DocumentsLoaded { after: Some(last), documents: next });
        assert_eq!(model.documents().len(), PAGE_SIZE);
        assert_eq!(model.documents().last().map(|d| d.id), Some(last + 1));
    }

    #[test]
    fn scroll_keeps_cursor_visible() {
        let mut model = loaded(30);
        model.set_size(Geometry::new(80, 10));
        let rows = 10 - (HEADER_LINES + FOOTER_LINES) as usize;

        for _ in 0..20 {
            (model, _) = press(model, KeyInput::Down);
        }
        assert_eq!(model.cursor(), 20);
        assert_eq!(model.offset(), 20 + 1 - rows);
        assert!(model.view().contains("> doc-21"));
    }

    #[test]
    fn reset_state_keeps_selection() {
        let model = loaded(5);
        let (model, _) = press(model, KeyInput::Down);
        let (mut model, _) = press(model, KeyInput::Enter);
        model.reset_state();
        assert_eq!(model.state(), StashState::Ready);
        assert_eq!(model.cursor(), 1);
    }
}
