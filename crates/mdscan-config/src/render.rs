//! HTML output settings.

use serde::{Deserialize, Serialize};

/// Render configuration.
///
/// Controls the shape of the HTML written for a scanned document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RenderConfig {
    /// Close void elements XHTML style (`<br />`, `<hr />`).
    /// Default: false
    #[serde(default)]
    pub xhtml: bool,

    /// Prefix of the `class` attribute put on fenced code.
    /// Default: "language-"
    #[serde(default = "default_code_class_prefix")]
    pub code_class_prefix: String,

    /// Wrap paragraphs in `<p>` elements.
    /// Default: true
    #[serde(default = "default_true")]
    pub paragraphs: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            xhtml: false,
            code_class_prefix: default_code_class_prefix(),
            paragraphs: true,
        }
    }
}

impl RenderConfig {
    /// Merge another RenderConfig into this one.
    pub fn merge(&mut self, other: &RenderConfig) {
        self.xhtml = other.xhtml;
        self.code_class_prefix = other.code_class_prefix.clone();
        self.paragraphs = other.paragraphs;
    }
}

fn default_code_class_prefix() -> String {
    "language-".to_string()
}

fn default_true() -> bool {
    true
}
