//! mdscan Render
//!
//! Renders a scanned document to HTML from its source text and mark list.
//!
//! Rendering never re-parses: each [`Mark`](mdscan_core::Mark) is turned
//! into edits anchored at byte offsets of the source (insert a tag here,
//! replace that delimiter run), the edits are ordered so elements nest
//! properly, and one pass over the source applies them. Text outside any
//! edit is copied through HTML-escaped.
//!
//! # Example
//!
//! ```
//! use mdscan_render::{HtmlRenderer, RenderOptions};
//!
//! let source = "# Hello *World*";
//! let marks = mdscan_parser::scan(source).marks;
//! let html = HtmlRenderer::new(RenderOptions::default()).render(source, &marks);
//! assert_eq!(html, "<h1>Hello <em>World</em></h1>");
//! ```

pub mod edit;
mod plan;

pub use edit::{Edit, Phase};

use log::debug;
use mdscan_config::RenderConfig;
use mdscan_core::MarkList;
use plan::Planner;
use std::io::Write;

/// HTML output options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Write void elements as `<br />` instead of `<br>`
    pub xhtml: bool,
    /// Prefix for the language class on fenced code
    pub code_class_prefix: String,
    /// Wrap paragraphs in `<p>`
    pub paragraphs: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            xhtml: false,
            code_class_prefix: "language-".to_string(),
            paragraphs: true,
        }
    }
}

impl From<&RenderConfig> for RenderOptions {
    fn from(config: &RenderConfig) -> Self {
        Self {
            xhtml: config.xhtml,
            code_class_prefix: config.code_class_prefix.clone(),
            paragraphs: config.paragraphs,
        }
    }
}

/// HTML renderer for scanned Markdown.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    options: RenderOptions,
}

impl HtmlRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: RenderOptions) {
        self.options = options;
    }

    /// Render `source` to an HTML string using its `marks`.
    pub fn render(&self, source: &str, marks: &MarkList) -> String {
        let edits = Planner::new(source, marks, &self.options).plan();
        debug!("rendering {} marks as {} edits", marks.len(), edits.len());
        let mut out = String::with_capacity(source.len() + source.len() / 2);
        edit::apply(source, edits, &mut out);
        out
    }

    /// Render to a writer.
    pub fn render_to<W: Write>(
        &self,
        writer: &mut W,
        source: &str,
        marks: &MarkList,
    ) -> std::io::Result<()> {
        writer.write_all(self.render(source, marks).as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdscan_core::ScanOptions;
    use mdscan_parser::Scanner;

    fn html(source: &str) -> String {
        let marks = mdscan_parser::scan(source).marks;
        HtmlRenderer::default().render(source, &marks)
    }

    fn html_with(source: &str, options: RenderOptions) -> String {
        let marks = mdscan_parser::scan(source).marks;
        HtmlRenderer::new(options).render(source, &marks)
    }

    #[test]
    fn test_render_headers() {
        assert_eq!(html("# Title"), "<h1>Title</h1>");
        assert_eq!(html("### Three ###"), "<h3>Three</h3>");
        assert_eq!(html("Title\n====="), "<h1>Title</h1>");
        assert_eq!(html("Sub\n---"), "<h2>Sub</h2>");
    }

    #[test]
    fn test_render_paragraphs() {
        assert_eq!(html("one\ntwo\n\nthree"), "<p>one\ntwo</p>\n\n<p>three</p>");
        let bare = RenderOptions {
            paragraphs: false,
            ..RenderOptions::default()
        };
        assert_eq!(html_with("plain", bare), "plain");
    }

    #[test]
    fn test_render_emphasis() {
        assert_eq!(
            html("*a* **b** ***c*** ~~d~~"),
            "<p><em>a</em> <strong>b</strong> <strong><em>c</em></strong> <del>d</del></p>"
        );
    }

    #[test]
    fn test_render_escapes_text() {
        assert_eq!(html("a < b & c"), "<p>a &lt; b &amp; c</p>");
        assert_eq!(html(r"\*x\*"), "<p>*x*</p>");
        assert_eq!(html("`<T>`"), "<p><code>&lt;T&gt;</code></p>");
    }

    #[test]
    fn test_render_html_passthrough() {
        assert_eq!(
            html("a <b>bold</b> &amp; c"),
            "<p>a <b>bold</b> &amp; c</p>"
        );
    }

    #[test]
    fn test_render_lists() {
        assert_eq!(
            html("- a\n- b"),
            "<ul>\n<li>a</li>\n<li>b</li>\n</ul>"
        );
        assert_eq!(
            html("3. c\n4. d"),
            "<ol start=\"3\">\n<li>c</li>\n<li>d</li>\n</ol>"
        );
        assert_eq!(
            html("- outer\n    - inner\n- next"),
            "<ul>\n<li>outer\n<ul>\n<li>inner</li>\n</ul></li>\n<li>next</li>\n</ul>"
        );
    }

    #[test]
    fn test_render_blockquotes() {
        assert_eq!(html("> quoted"), "<blockquote>quoted</blockquote>");
        assert_eq!(
            html("> one\n> two"),
            "<blockquote>\none\ntwo\n</blockquote>"
        );
    }

    #[test]
    fn test_render_code() {
        assert_eq!(
            html("```rust\nlet x = 1 < 2;\n```"),
            "<pre><code class=\"language-rust\">let x = 1 &lt; 2;\n</code></pre>"
        );
        assert_eq!(
            html("    a\n    b"),
            "<pre><code>a\nb\n</code></pre>"
        );
        assert_eq!(html("```\nopen"), "<pre><code>open\n</code></pre>");
    }

    #[test]
    fn test_render_rule_and_breaks() {
        assert_eq!(html("---"), "<hr>");
        assert_eq!(html("a  \nb"), "<p>a<br>\nb</p>");
        let xhtml = RenderOptions {
            xhtml: true,
            ..RenderOptions::default()
        };
        assert_eq!(html_with("***", xhtml), "<hr />");
    }

    #[test]
    fn test_render_gfm_breaks() {
        let source = "a\nb";
        let marks = Scanner::with_options(ScanOptions::gfm()).scan(source).marks;
        assert_eq!(
            HtmlRenderer::default().render(source, &marks),
            "<p>a<br>\nb</p>"
        );
    }

    #[test]
    fn test_render_links() {
        assert_eq!(
            html("[x](/u \"T\")"),
            "<p><a href=\"/u\" title=\"T\">x</a></p>"
        );
        assert_eq!(
            html("<me@example.com>"),
            "<p><a href=\"mailto:me@example.com\">me@example.com</a></p>"
        );
        assert_eq!(
            html("![pic](/p.png)"),
            "<p><img src=\"/p.png\" alt=\"pic\"></p>"
        );
    }

    #[test]
    fn test_render_references() {
        assert_eq!(
            html("[foo]\n\n[foo]: /url"),
            "<p><a href=\"/url\">foo</a></p>\n\n"
        );
        assert_eq!(html("[missing]"), "<p>[missing]</p>");
    }

    #[test]
    fn test_render_unclosed_reference_title_as_text() {
        let source = "[foo]: /url \"title\n[foo]";
        assert_eq!(html(source), format!("<p>{}</p>", source));
    }

    #[test]
    fn test_render_emphasis_around_link() {
        assert_eq!(
            html("*see [a*b](u) here*"),
            "<p><em>see <a href=\"u\">a*b</a> here</em></p>"
        );
    }

    #[test]
    fn test_render_table() {
        assert_eq!(
            html("| a | b |\n|---|:-:|\n| 1 | 2 |"),
            "<table>\n<thead>\n<tr><th>a</th><th style=\"text-align: center\">b</th></tr>\n</thead>\n<tbody>\n<tr><td>1</td><td style=\"text-align: center\">2</td></tr>\n</tbody>\n</table>"
        );
    }

    #[test]
    fn test_render_to_writer() {
        let source = "# Hi";
        let marks = mdscan_parser::scan(source).marks;
        let mut out = Vec::new();
        HtmlRenderer::default()
            .render_to(&mut out, source, &marks)
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "<h1>Hi</h1>");
    }

    #[test]
    fn test_options_from_config() {
        let config = RenderConfig {
            xhtml: true,
            code_class_prefix: "lang-".into(),
            paragraphs: false,
        };
        let options = RenderOptions::from(&config);
        assert!(options.xhtml);
        assert_eq!(options.code_class_prefix, "lang-");
        assert!(!options.paragraphs);
    }
}
