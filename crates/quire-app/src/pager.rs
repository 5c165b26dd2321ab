//! Pager (document reader) component.
//!
//! Holds one document: fetches its markdown, asks the runtime to render it
//! for the current width, and scrolls the result. The pager can be loaded
//! while it is not yet live; the controller switches to it once
//! `ContentRendered` for the awaited document arrives.

use crate::{
    Command, Component, Context, Document, DocumentId, Geometry, InputOutcome, KeyInput, Message,
    Session, Spinner, TextInput,
    stash::NOTE_CHARACTER_LIMIT,
};

/// Status bar plus separator line.
const STATUS_LINES: u16 = 2;

/// Reader sub-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PagerState {
    /// Scrolling rendered content.
    #[default]
    Browsing,
    /// Waiting for content to be fetched and rendered.
    Loading,
    /// Editing the note of the open document.
    EditingNote,
}

/// Pager component state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerModel {
    state: PagerState,
    session: Option<Session>,
    document: Option<Document>,
    lines: Vec<String>,
    y_offset: usize,
    note_input: TextInput,
    /// Transient status shown in place of the position indicator.
    status: Option<String>,
    spinner: Spinner,
    geometry: Geometry,
}

impl Default for PagerModel {
    fn default() -> Self {
        Self {
            state: PagerState::Browsing,
            session: None,
            document: None,
            lines: Vec::new(),
            y_offset: 0,
            note_input: TextInput::new(NOTE_CHARACTER_LIMIT),
            status: None,
            spinner: Spinner::default(),
            geometry: Geometry::default(),
        }
    }
}

impl PagerModel {
    /// Current sub-state.
    pub fn state(&self) -> PagerState {
        self.state
    }

    /// Whether the reader is in a mode that owns the quit key.
    pub fn is_modal(&self) -> bool {
        self.state != PagerState::Browsing
    }

    /// Whether a fetch or render is in flight.
    pub fn is_loading(&self) -> bool {
        self.state == PagerState::Loading
    }

    /// Whether results for `id` are still wanted.
    pub fn is_awaiting(&self, id: DocumentId) -> bool {
        self.is_loading() && self.document.as_ref().is_some_and(|d| d.id == id)
    }

    /// Open document. `None` when unloaded.
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// First visible content line.
    pub fn y_offset(&self) -> usize {
        self.y_offset
    }

    /// Rendered content lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Last geometry pushed by the controller.
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Begin loading `document`. Any previous document is dropped.
    pub fn load(&mut self, document: Document) -> Vec<Command> {
        let id = document.id;
        self.unload();
        self.document = Some(document);
        self.state = PagerState::Loading;
        vec![Command::FetchContent { id }]
    }

    /// Return to the initial browse state with no document. Session and
    /// geometry are kept.
    pub fn unload(&mut self) {
        *self = Self {
            session: self.session.take(),
            geometry: self.geometry,
            ..Self::default()
        };
    }

    fn viewport_height(&self) -> usize {
        self.geometry.height.saturating_sub(STATUS_LINES).max(1) as usize
    }

    fn max_offset(&self) -> usize {
        self.lines.len().saturating_sub(self.viewport_height())
    }

    fn scroll_to(&mut self, offset: usize) {
        self.y_offset = offset.min(self.max_offset());
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<Command> {
        match self.state {
            PagerState::Browsing => {
                self.status = None;
                self.handle_browse_key(key);
                vec![]
            },
            PagerState::Loading => vec![],
            PagerState::EditingNote => match self.note_input.handle_key(key) {
                InputOutcome::Editing => vec![],
                InputOutcome::Cancelled => {
                    self.state = PagerState::Browsing;
                    vec![]
                },
                InputOutcome::Submitted(note) => {
                    self.state = PagerState::Browsing;
                    match &self.document {
                        Some(doc) => vec![Command::SaveNote { id: doc.id, note }],
                        None => vec![],
                    }
                },
            },
        }
    }

    fn handle_browse_key(&mut self, key: KeyInput) {
        let page = self.viewport_height();
        match key {
            KeyInput::Char('j') | KeyInput::Down => self.scroll_to(self.y_offset + 1),
            KeyInput::Char('k') | KeyInput::Up => self.scroll_to(self.y_offset.saturating_sub(1)),
            KeyInput::Char(' ' | 'f') | KeyInput::PageDown => self.scroll_to(self.y_offset + page),
            KeyInput::Char('b') | KeyInput::PageUp => {
                self.scroll_to(self.y_offset.saturating_sub(page));
            },
            KeyInput::Char('g') | KeyInput::Home => self.scroll_to(0),
            KeyInput::Char('G') | KeyInput::End => self.scroll_to(self.max_offset()),
            KeyInput::Char('n') => {
                if let Some(doc) = &self.document {
                    self.note_input = TextInput::with_text(NOTE_CHARACTER_LIMIT, &doc.note);
                    self.state = PagerState::EditingNote;
                }
            },
            _ => {},
        }
    }

    fn status_line(&self) -> String {
        if self.state == PagerState::EditingNote {
            return format!("Note: {}", self.note_input.buffer());
        }
        let title = self.document.as_ref().map_or("", |d| d.title.as_str());
        if let Some(status) = &self.status {
            return format!("{title} • {status}");
        }
        let max = self.max_offset();
        let percent = if max == 0 { 100 } else { self.y_offset * 100 / max };
        format!("{title} • {percent}%")
    }
}

impl Component for PagerModel {
    fn init(ctx: &Context) -> (Self, Vec<Command>) {
        let model = Self { session: ctx.session.clone(), geometry: ctx.geometry, ..Self::default() };
        (model, vec![])
    }

    fn update(mut self, msg: &Message) -> (Self, Vec<Command>) {
        let commands = match msg {
            Message::Key(key) => self.handle_key(*key),
            Message::Tick => {
                if self.is_loading() {
                    self.spinner.tick();
                }
                vec![]
            },
            Message::ContentFetched { id, body } => {
                if self.is_awaiting(*id) {
                    vec![Command::RenderContent {
                        id: *id,
                        body: body.clone(),
                        width: self.geometry.width,
                    }]
                } else {
                    tracing::debug!(id, "discarding stale document content");
                    vec![]
                }
            },
            Message::ContentRendered { id, text } => {
                if self.is_awaiting(*id) {
                    self.lines = text.lines().map(str::to_string).collect();
                    self.y_offset = 0;
                    self.state = PagerState::Browsing;
                } else {
                    tracing::debug!(id, "discarding stale rendered content");
                }
                vec![]
            },
            Message::NoteSaved { id, note } => {
                if let Some(doc) = self.document.as_mut().filter(|d| d.id == *id) {
                    doc.note.clone_from(note);
                    self.status = Some("Note saved".to_string());
                }
                vec![]
            },
            _ => vec![],
        };
        (self, commands)
    }

    fn view(&self) -> String {
        if self.is_loading() {
            return format!("{} Loading document...", self.spinner.glyph());
        }
        let width = self.geometry.width as usize;
        let mut out: Vec<String> = self
            .lines
            .iter()
            .skip(self.y_offset)
            .take(self.viewport_height())
            .map(|line| line.chars().take(width).collect())
            .collect();
        out.resize(self.viewport_height(), String::new());
        out.push(String::new());
        out.push(self.status_line());
        out.join("\n")
    }

    fn set_size(&mut self, geometry: Geometry) {
        self.geometry = geometry;
        self.scroll_to(self.y_offset);
    }
}
