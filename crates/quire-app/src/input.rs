//! Terminal-agnostic keyboard input and the shared text-entry buffer.

/// Keyboard input abstraction.
///
/// Decouples application logic from terminal libraries (crossterm, termion,
/// etc.) enabling deterministic simulation testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Character pressed together with Control.
    Ctrl(char),
    /// Enter/Return key.
    Enter,
    /// Backspace key (delete character before cursor).
    Backspace,
    /// Delete key (delete character at cursor).
    Delete,
    /// Tab key.
    Tab,
    /// Escape key.
    Esc,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page up key.
    PageUp,
    /// Page down key.
    PageDown,
}

impl KeyInput {
    /// `q` or `Esc`: quit at the top level, "back" inside a document.
    pub fn is_quit(self) -> bool {
        matches!(self, Self::Char('q') | Self::Esc)
    }

    /// Ctrl-c, honored in every state.
    pub fn is_interrupt(self) -> bool {
        self == Self::Ctrl('c')
    }

    /// Ctrl-l.
    pub fn is_repaint(self) -> bool {
        self == Self::Ctrl('l')
    }
}

/// Result of feeding a key to a [`TextInput`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// Buffer or cursor changed (or the key was ignored); keep editing.
    Editing,
    /// Enter pressed; carries the submitted text.
    Submitted(String),
    /// Esc pressed.
    Cancelled,
}

/// Single-line text buffer with a cursor.
///
/// Cursor positions are counted in characters, not bytes. Input beyond
/// `limit` characters is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    buffer: String,
    cursor: usize,
    limit: usize,
}

impl TextInput {
    /// Create an empty input accepting at most `limit` characters.
    pub fn new(limit: usize) -> Self {
        Self { buffer: String::new(), cursor: 0, limit }
    }

    /// Create an input pre-filled with `text`, cursor at the end.
    pub fn with_text(limit: usize, text: &str) -> Self {
        let buffer: String = text.chars().take(limit).collect();
        let cursor = buffer.chars().count();
        Self { buffer, cursor, limit }
    }

    /// Current text in the buffer.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Current cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.buffer.char_indices().nth(char_index).map_or(self.buffer.len(), |(i, _)| i)
    }

    fn char_len(&self) -> usize {
        self.buffer.chars().count()
    }

    /// Handle a key.
    pub fn handle_key(&mut self, key: KeyInput) -> InputOutcome {
        match key {
            KeyInput::Char(c) => {
                if self.char_len() < self.limit {
                    let at = self.byte_index(self.cursor);
                    self.buffer.insert(at, c);
                    self.cursor = self.cursor.saturating_add(1);
                }
            },
            KeyInput::Backspace => {
                if self.cursor > 0 {
                    self.cursor = self.cursor.saturating_sub(1);
                    let at = self.byte_index(self.cursor);
                    self.buffer.remove(at);
                }
            },
            KeyInput::Delete => {
                if self.cursor < self.char_len() {
                    let at = self.byte_index(self.cursor);
                    self.buffer.remove(at);
                }
            },
            KeyInput::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyInput::Right => {
                if self.cursor < self.char_len() {
                    self.cursor = self.cursor.saturating_add(1);
                }
            },
            KeyInput::Home => self.cursor = 0,
            KeyInput::End => self.cursor = self.char_len(),
            KeyInput::Enter => return InputOutcome::Submitted(self.buffer.clone()),
            KeyInput::Esc => return InputOutcome::Cancelled,
            KeyInput::Ctrl(_)
            | KeyInput::Tab
            | KeyInput::Up
            | KeyInput::Down
            | KeyInput::PageUp
            | KeyInput::PageDown => {},
        }
        InputOutcome::Editing
    }
}
