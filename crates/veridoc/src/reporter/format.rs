//! Terminal styling for text reporters.

use crate::options::ColorChoice;
use console::Style;

/// Applies (or omits) ANSI styling.
///
/// Styling is forced on or off explicitly so output does not depend on
/// global terminal detection once the formatter is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Formatter {
    styled: bool,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::for_choice(ColorChoice::Auto)
    }
}

impl Formatter {
    /// Always emit ANSI escapes
    #[must_use]
    pub const fn ansi() -> Self {
        Self { styled: true }
    }

    /// Never emit ANSI escapes
    #[must_use]
    pub const fn plain() -> Self {
        Self { styled: false }
    }

    /// Resolve a color choice against the current terminal
    #[must_use]
    pub fn for_choice(choice: ColorChoice) -> Self {
        Self {
            styled: choice.should_color(),
        }
    }

    /// Check if escapes are emitted
    #[must_use]
    pub const fn is_styled(&self) -> bool {
        self.styled
    }

    fn paint(&self, style: Style, text: &str) -> String {
        style.force_styling(self.styled).apply_to(text).to_string()
    }

    /// Bold text
    #[must_use]
    pub fn bold(&self, text: &str) -> String {
        self.paint(Style::new().bold(), text)
    }

    /// Underlined text
    #[must_use]
    pub fn underline(&self, text: &str) -> String {
        self.paint(Style::new().underlined(), text)
    }

    /// Dimmed text
    #[must_use]
    pub fn dim(&self, text: &str) -> String {
        self.paint(Style::new().dim(), text)
    }

    /// Red text
    #[must_use]
    pub fn red(&self, text: &str) -> String {
        self.paint(Style::new().red(), text)
    }

    /// Green text
    #[must_use]
    pub fn green(&self, text: &str) -> String {
        self.paint(Style::new().green(), text)
    }

    /// Yellow text
    #[must_use]
    pub fn yellow(&self, text: &str) -> String {
        self.paint(Style::new().yellow(), text)
    }

    /// Cyan text
    #[must_use]
    pub fn cyan(&self, text: &str) -> String {
        self.paint(Style::new().cyan(), text)
    }
}
