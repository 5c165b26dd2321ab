//! UI rendering
//!
//! Converts the controller's text view into ratatui widgets. All functions
//! are pure (no I/O), so they can be exercised against a `TestBackend`.

mod document;
mod status;

use quire_app::{AppState, Controller};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    text::Text,
    widgets::Paragraph,
};

use crate::Theme;

/// Rows taken by the status footer.
pub const FOOTER_HEIGHT: u16 = 1;

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &Controller, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(FOOTER_HEIGHT)])
        .split(frame.area());

    let [body_area, status_area] = chunks.as_ref() else {
        return;
    };

    let view = app.view();
    let body = if app.error().is_some() {
        Paragraph::new(Text::raw(view.as_str())).style(theme.error)
    } else if app.state() == AppState::ShowingDocument {
        Paragraph::new(document::styled(&view, theme))
    } else {
        Paragraph::new(Text::raw(view.as_str())).style(theme.text)
    };

    frame.render_widget(body, *body_area);
    status::render(frame, app, theme, *status_area);
}

#[cfg(test)]
mod tests {
    use quire_app::{AppError, Message, Session, User};
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;

    fn draw(app: &Controller) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal.draw(|frame| render(frame, app, &Theme::dark())).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(ratatui::buffer::Cell::symbol).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn initializing_screen_shows_spinner_text() {
        let (app, _) = Controller::init();
        let screen = draw(&app);
        assert!(screen.contains("Initializing..."));
        assert!(screen.contains("initializing"));
    }

    #[test]
    fn error_screen_shows_exit_hint() {
        let (app, _) = Controller::init();
        let (app, _) = app.update(Message::Error(AppError::Bootstrap("offline".into())));
        let screen = draw(&app);
        assert!(screen.contains("Error: could not initialize client: offline"));
        assert!(screen.contains("Press q to exit."));
    }

    #[test]
    fn footer_names_the_user() {
        let (app, _) = Controller::init();
        let user = User { id: "ab".into(), name: "ada".into() };
        let session = Session { endpoint: "/tmp/stash".into(), user: Some(user) };
        let (app, _) = app.update(Message::ClientReady(session));
        let screen = draw(&app);
        assert!(screen.contains("Stash of ada"));
        assert!(screen.lines().last().unwrap().contains("showing stash"));
    }
}
