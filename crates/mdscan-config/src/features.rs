//! Scanner feature flags.
//!
//! This module contains the `FeaturesConfig` struct which selects the
//! optional Markdown constructs the scanner recognizes.

use mdscan_core::ScanOptions;
use serde::{Deserialize, Serialize};

/// Feature flags configuration.
///
/// Controls which constructs the scanner recognizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FeaturesConfig {
    /// Recognize GFM pipe tables.
    /// Default: true
    #[serde(default = "default_true")]
    pub tables: bool,

    /// Recognize `~~strikethrough~~`.
    /// Default: true
    #[serde(default = "default_true")]
    pub strikethrough: bool,

    /// Recognize inline HTML tags and comments.
    /// Default: true
    #[serde(default = "default_true")]
    pub html: bool,

    /// Recognize `<scheme://...>` and `<user@host>` autolinks.
    /// Default: true
    #[serde(default = "default_true")]
    pub autolinks: bool,

    /// Treat every newline inside a paragraph as a line break.
    /// Default: false
    #[serde(default)]
    pub hard_line_breaks: bool,

    /// Columns a tab counts for when measuring indentation.
    /// Default: 4
    #[serde(default = "default_tab_width")]
    pub tab_width: usize,
}

impl Default for FeaturesConfig {
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

impl FeaturesConfig {
    /// Merge another FeaturesConfig into this one.
    ///
    /// All fields are copied from `other`; TOML cannot tell an unset key
    /// from one set to its default.
    pub fn merge(&mut self, other: &FeaturesConfig) {
        self.tables = other.tables;
        self.strikethrough = other.strikethrough;
        self.html = other.html;
        self.autolinks = other.autolinks;
        self.hard_line_breaks = other.hard_line_breaks;
        self.tab_width = other.tab_width;
    }

    /// Every extension switched on, including GFM line breaks.
    pub fn all_enabled() -> Self {
        Self {
            hard_line_breaks: true,
            ..Self::default()
        }
    }

    /// Plain Markdown: no tables, strikethrough, HTML, autolinks or
    /// newline breaks.
    pub fn all_disabled() -> Self {
        Self {
            tables: false,
            strikethrough: false,
            html: false,
            autolinks: false,
            hard_line_breaks: false,
            tab_width: 4,
        }
    }

    /// The scanner options these flags select.
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions::from(self)
    }
}

impl From<&FeaturesConfig> for ScanOptions {
    fn from(features: &FeaturesConfig) -> Self {
        ScanOptions {
            tables: features.tables,
            strikethrough: features.strikethrough,
            html: features.html,
            autolinks: features.autolinks,
            hard_line_breaks: features.hard_line_breaks,
            tab_width: features.tab_width.max(1),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_tab_width() -> usize {
    4
}
