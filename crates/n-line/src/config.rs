//! Editor configuration.
//!
//! One plain struct with sensible defaults. The binary maps its command
//! line flags onto it; library users build one with the `with_*` setters.
//!
//! | Field              | Default        | Meaning                               |
//! |--------------------|----------------|---------------------------------------|
//! | `history_capacity` | 32             | entries kept by [`History`]           |
//! | `max_lines`        | 256            | line limit of a [`BlockEditor`]       |
//! | `max_view_rows`    | 10             | block editor viewport height cap      |
//! | `scroll_step`      | 20             | horizontal scroll increment (columns) |
//! | `fallback_size`    | 80×24          | used when the size query fails        |
//! | `prompt_color`     | blue           | prompt and continuation marker        |
//! | `control_color`    | bright black   | `^X` control-character glyphs         |
//!
//! [`History`]: crate::history::History
//! [`BlockEditor`]: crate::block::BlockEditor

use n_term::color::Color;
use n_term::terminal::Size;

/// Default history ring size.
pub const DEFAULT_HISTORY_CAPACITY: usize = 32;

/// Default block editor line limit.
pub const DEFAULT_MAX_LINES: usize = 256;

/// Default cap on block editor viewport height.
pub const DEFAULT_MAX_VIEW_ROWS: u16 = 10;

/// Default horizontal scroll increment.
pub const DEFAULT_SCROLL_STEP: usize = 20;

/// Size assumed when the terminal can't be queried.
pub const FALLBACK_SIZE: Size = Size::new(80, 24);

/// Tunables shared by the REPL engine and the block editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub history_capacity: usize,
    pub max_lines: usize,
    pub max_view_rows: u16,
    pub scroll_step: usize,
    pub fallback_size: Size,
    pub prompt_color: Color,
    pub control_color: Color,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            max_lines: DEFAULT_MAX_LINES,
            max_view_rows: DEFAULT_MAX_VIEW_ROWS,
            scroll_step: DEFAULT_SCROLL_STEP,
            fallback_size: FALLBACK_SIZE,
            prompt_color: Color::Blue,
            control_color: Color::BrightBlack,
        }
    }
}

impl Config {
    #[must_use]
    pub const fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Set the block editor line limit. At least one line is always allowed.
    #[must_use]
    pub fn with_max_lines(mut self, max: usize) -> Self {
        self.max_lines = max.max(1);
        self
    }

    /// Set the viewport height cap. At least one row is always shown.
    #[must_use]
    pub fn with_max_view_rows(mut self, rows: u16) -> Self {
        self.max_view_rows = rows.max(1);
        self
    }

    /// Set the horizontal scroll increment. Zero is treated as one.
    #[must_use]
    pub fn with_scroll_step(mut self, step: usize) -> Self {
        self.scroll_step = step.max(1);
        self
    }

    #[must_use]
    pub const fn with_fallback_size(mut self, size: Size) -> Self {
        self.fallback_size = size;
        self
    }

    #[must_use]
    pub const fn with_prompt_color(mut self, color: Color) -> Self {
        self.prompt_color = color;
        self
    }

    #[must_use]
    pub const fn with_control_color(mut self, color: Color) -> Self {
        self.control_color = color;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.history_capacity, 32);
        assert_eq!(c.max_lines, 256);
        assert_eq!(c.max_view_rows, 10);
        assert_eq!(c.scroll_step, 20);
        assert_eq!(c.fallback_size, Size::new(80, 24));
        assert_eq!(c.prompt_color, Color::Blue);
        assert_eq!(c.control_color, Color::BrightBlack);
    }

    #[test]
    fn setters_chain() {
        let c = Config::default()
            .with_history_capacity(4)
            .with_max_lines(3)
            .with_prompt_color(Color::Green);
        assert_eq!(c.history_capacity, 4);
        assert_eq!(c.max_lines, 3);
        assert_eq!(c.prompt_color, Color::Green);
    }

    #[test]
    fn degenerate_values_are_clamped() {
        let c = Config::default()
            .with_max_lines(0)
            .with_max_view_rows(0)
            .with_scroll_step(0);
        assert_eq!(c.max_lines, 1);
        assert_eq!(c.max_view_rows, 1);
        assert_eq!(c.scroll_step, 1);
    }
}
