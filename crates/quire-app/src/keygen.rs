//! Credential-generation component.
//!
//! Issues a single [`Command::GenerateKeys`] on init and shows a spinner until
//! the runtime reports completion. Failures arrive as `Message::Error` and are
//! handled by the controller.

use crate::{Command, Component, Context, Geometry, Message, Spinner};

/// Key generation progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeygenState {
    /// Generation in flight.
    #[default]
    Running,
    /// Keys written.
    Done,
}

/// Key generation component state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeygenModel {
    state: KeygenState,
    spinner: Spinner,
    geometry: Geometry,
}

impl KeygenModel {
    /// Current progress.
    pub fn state(&self) -> KeygenState {
        self.state
    }

    /// Last geometry pushed by the controller.
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }
}

impl Component for KeygenModel {
    fn init(ctx: &Context) -> (Self, Vec<Command>) {
        let model = Self { geometry: ctx.geometry, ..Self::default() };
        (model, vec![Command::GenerateKeys])
    }

    fn update(mut self, msg: &Message) -> (Self, Vec<Command>) {
        match msg {
            Message::Tick if self.state == KeygenState::Running => self.spinner.tick(),
            Message::KeygenDone => self.state = KeygenState::Done,
            _ => {},
        }
        (self, vec![])
    }

    fn view(&self) -> String {
        match self.state {
            KeygenState::Running => format!(
                "You don't have a key yet; generating one.\n\n{} Generating keys...",
                self.spinner.glyph()
            ),
            KeygenState::Done => "Keys generated.".to_string(),
        }
    }

    fn set_size(&mut self, geometry: Geometry) {
        self.geometry = geometry;
    }
}
