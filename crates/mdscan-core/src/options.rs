//! Scanner feature switches.

use serde::{Deserialize, Serialize};

/// Which optional (mostly GFM) constructs the scanner recognizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Recognize GFM tables
    pub tables: bool,
    /// Recognize `~~strikethrough~~`
    pub strikethrough: bool,
    /// Recognize inline HTML tags and comments
    pub html: bool,
    /// Recognize `<scheme://...>` and `<user@host>` autolinks
    pub autolinks: bool,
    /// Treat a newline inside a paragraph as a line break (GFM)
    pub hard_line_breaks: bool,
    /// Columns a tab expands to when measuring indentation
    pub tab_width: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            html: true,
            autolinks: true,
            hard_line_breaks: false,
            tab_width: 4,
        }
    }
}

impl ScanOptions {
    /// Defaults plus GFM single-newline line breaks.
    pub fn gfm() -> Self {
        Self {
            hard_line_breaks: true,
            ..Self::default()
        }
    }

    /// Only the original Markdown constructs, no extensions.
    pub fn strict() -> Self {
        Self {
            tables: false,
            strikethrough: false,
            html: true,
            autolinks: true,
            hard_line_breaks: false,
            tab_width: 4,
        }
    }

    /// Display width of a run of leading whitespace.
    pub fn indent_width(&self, whitespace: &str) -> usize {
        whitespace
            .chars()
            .map(|c| if c == '\t' { self.tab_width } else { 1 })
            .sum()
    }
}
