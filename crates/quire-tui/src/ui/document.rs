//! Themed drawing of a rendered document.
//!
//! The markdown renderer emits plain text; block structure is recovered here
//! from its line shapes so the palette can colour it: a heading is a line
//! followed by an `=` or `-` rule, quotes start with `│ `, code is indented
//! four spaces.

use ratatui::text::{Line, Text};

use crate::{
    Theme,
    markdown::{CODE_INDENT, QUOTE_PREFIX},
};

fn is_rule(line: &str) -> bool {
    let mut chars = line.chars();
    match chars.next() {
        Some(c @ ('=' | '-')) => chars.all(|next| next == c),
        _ => false,
    }
}

/// Style each line of `view` by the block it belongs to.
pub fn styled<'a>(view: &'a str, theme: &Theme) -> Text<'a> {
    let lines: Vec<&str> = view.lines().collect();
    let styled = lines.iter().enumerate().map(|(i, line)| {
        let style = if is_rule(line) {
            theme.rule
        } else if !line.is_empty() && lines.get(i + 1).is_some_and(|next| is_rule(next)) {
            theme.heading
        } else if line.starts_with(QUOTE_PREFIX) {
            theme.quote
        } else if line.starts_with(CODE_INDENT) {
            theme.code
        } else {
            theme.text
        };
        Line::styled(*line, style)
    });
    Text::from(styled.collect::<Vec<_>>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_take_heading_style() {
        let theme = Theme::dark();
        let text = styled("Title\n=====\n\nbody", &theme);
        assert_eq!(text.lines[0].style, theme.heading);
        assert_eq!(text.lines[1].style, theme.rule);
        assert_eq!(text.lines[3].style, theme.text);
    }

    #[test]
    fn quotes_and_code_are_distinguished() {
        let theme = Theme::light();
        let text = styled("│ quoted\n    let x = 1;", &theme);
        assert_eq!(text.lines[0].style, theme.quote);
        assert_eq!(text.lines[1].style, theme.code);
    }

    #[test]
    fn palettes_differ_for_documents() {
        let dark = styled("Title\n-----", &Theme::dark());
        let light = styled("Title\n-----", &Theme::light());
        assert_ne!(dark.lines[0].style, light.lines[0].style);
    }
}
