//! Status footer
//!
//! Shows the top-level state, the signed-in user and key hints.

use quire_app::{AppState, Controller};
use ratatui::{
    Frame,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::Theme;

/// Render the footer.
pub fn render(frame: &mut Frame, app: &Controller, theme: &Theme, area: Rect) {
    let hints = match (app.error().is_some(), app.state()) {
        (true, _) => "q quit",
        (false, AppState::ShowingList) => "enter open · m note · x delete · q quit",
        (false, AppState::ShowingDocument) => "space page · n note · q back",
        (false, _) => "q quit",
    };

    let mut spans = vec![Span::raw(" "), Span::raw(app.state().to_string())];
    if let Some(user) = app.user() {
        spans.push(Span::raw(" · "));
        spans.push(Span::styled(user.name.clone(), theme.status.add_modifier(Modifier::BOLD)));
    }
    spans.push(Span::raw(" │ "));
    spans.push(Span::raw(hints));

    frame.render_widget(Paragraph::new(Line::from(spans)).style(theme.status), area);
}
