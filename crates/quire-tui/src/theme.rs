//! Colour themes.
//!
//! A theme colours the whole screen, including the block structure of an
//! open document.
//!
//! The `--style` flag picks a theme explicitly or asks for auto-detection.
//! Detection reads `COLORFGBG` (`"<fg>;<bg>"`, set by rxvt-derived and many
//! other terminals); when it is missing or unparsable the dark palette wins.

use clap::ValueEnum;
use ratatui::style::{Color, Modifier, Style as CellStyle};

/// Requested style, as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Style {
    /// Detect from the terminal background.
    #[default]
    Auto,
    /// Light text on a dark background.
    Dark,
    /// Dark text on a light background.
    Light,
}

impl Style {
    /// Resolve to a concrete theme using the process environment.
    pub fn resolve(self) -> Theme {
        self.resolve_with(std::env::var("COLORFGBG").ok().as_deref())
    }

    /// Resolve to a concrete theme given a `COLORFGBG` value.
    pub fn resolve_with(self, colorfgbg: Option<&str>) -> Theme {
        match self {
            Self::Dark => Theme::dark(),
            Self::Light => Theme::light(),
            Self::Auto => match colorfgbg.map(background_is_dark) {
                Some(false) => Theme::light(),
                _ => Theme::dark(),
            },
        }
    }
}

/// `true` for ANSI background indices 0-6 and 8.
fn background_is_dark(colorfgbg: &str) -> bool {
    colorfgbg
        .rsplit(';')
        .next()
        .and_then(|bg| bg.trim().parse::<u8>().ok())
        .is_none_or(|bg| bg <= 6 || bg == 8)
}

/// Palette used when drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Whether this is the dark palette.
    pub dark: bool,
    /// Body text.
    pub text: CellStyle,
    /// Errors.
    pub error: CellStyle,
    /// Footer bar.
    pub status: CellStyle,
    /// Document headings.
    pub heading: CellStyle,
    /// Heading underlines.
    pub rule: CellStyle,
    /// Block quotes.
    pub quote: CellStyle,
    /// Code blocks.
    pub code: CellStyle,
}

impl Theme {
    /// Palette for dark backgrounds.
    pub fn dark() -> Self {
        Self {
            dark: true,
            text: CellStyle::default().fg(Color::Gray),
            error: CellStyle::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
            status: CellStyle::default().bg(Color::DarkGray).fg(Color::White),
            heading: CellStyle::default().fg(Color::LightCyan).add_modifier(Modifier::BOLD),
            rule: CellStyle::default().fg(Color::DarkGray),
            quote: CellStyle::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            code: CellStyle::default().fg(Color::LightYellow),
        }
    }

    /// Palette for light backgrounds.
    pub fn light() -> Self {
        Self {
            dark: false,
            text: CellStyle::default().fg(Color::Black),
            error: CellStyle::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            status: CellStyle::default().bg(Color::Gray).fg(Color::Black),
            heading: CellStyle::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            rule: CellStyle::default().fg(Color::Gray),
            quote: CellStyle::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            code: CellStyle::default().fg(Color::Magenta),
        }
    }
}
