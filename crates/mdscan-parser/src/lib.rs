//! mdscan Parser
//!
//! A single-pass, recursive-descent scanner that recognizes Markdown
//! constructs and reports them as a sorted list of positioned [`Mark`]s,
//! together with the table of reference definitions found along the way.
//!
//! The scanner never fails: text that matches no construct is simply left
//! unmarked.
//!
//! # Example
//!
//! ```
//! use mdscan_parser::scan;
//!
//! let result = scan("# Hello **World**");
//! let names: Vec<_> = result.marks.iter().map(|m| m.name()).collect();
//! assert_eq!(names, ["header", "strong-begin", "strong-end"]);
//! ```
//!
//! [`Mark`]: mdscan_core::Mark

mod block;
mod builders;
mod context;
mod cursor;
mod inline;
mod resolve;

use context::Context;
use mdscan_core::{MarkList, ReferenceTable, ScanOptions};

/// Output of one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Every recognized span, ordered by start position
    pub marks: MarkList,
    /// Reference definitions, keyed by normalized label
    pub references: ReferenceTable,
}

/// Reusable scanner configured with a set of [`ScanOptions`].
///
/// A `Scanner` holds no per-text state, so one instance can scan any number
/// of texts, from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    options: ScanOptions,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ScanOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Scan `text` into marks and reference definitions.
    pub fn scan(&self, text: &str) -> ScanResult {
        Context::new(text, &self.options).run()
    }
}

/// Scan `text` with the default options.
pub fn scan(text: &str) -> ScanResult {
    Scanner::new().scan(text)
}

/// Scan `text` with the given options.
pub fn scan_with(text: &str, options: &ScanOptions) -> ScanResult {
    Context::new(text, options).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdscan_core::{Alignment, Mark, MarkKind, Position, Span};

    fn names(text: &str) -> Vec<&'static str> {
        scan(text).marks.iter().map(Mark::name).collect()
    }

    fn first(text: &str, name: &str) -> Mark {
        scan(text)
            .marks
            .named(name)
            .next()
            .cloned()
            .unwrap_or_else(|| panic!("no {} mark in {:?}", name, text))
    }

    fn pos(line: usize, column: usize) -> Position {
        Position::new(line, column)
    }

    // -------------------------------------------------------------------------
    // Headers
    // -------------------------------------------------------------------------

    #[test]
    fn test_atx_header() {
        let result = scan("# Title");
        assert_eq!(result.marks.len(), 1);
        let mark = &result.marks[0];
        assert_eq!(mark.start, pos(0, 0));
        assert_eq!(mark.end, Some(pos(0, 7)));
        assert_eq!(
            mark.kind,
            MarkKind::Header {
                level: 1,
                is_setext: false,
                is_opening_tag: true,
                content: Span::new(pos(0, 2), pos(0, 7)),
            }
        );
    }

    #[test]
    fn test_atx_header_levels() {
        for level in 1..=6u8 {
            let text = format!("{} x", "#".repeat(level as usize));
            assert!(matches!(
                first(&text, "header").kind,
                MarkKind::Header { level: l, .. } if l == level
            ));
        }
        assert!(matches!(
            first("######### deep", "header").kind,
            MarkKind::Header { level: 6, .. }
        ));
    }

    #[test]
    fn test_atx_header_requires_space() {
        assert!(names("#hashtag").iter().all(|n| *n != "header"));
        assert_eq!(names("#hashtag"), ["paragraph"]);
    }

    #[test]
    fn test_atx_header_closing_sequence() {
        let mark = first("## Title ##", "header");
        assert_eq!(
            mark.kind,
            MarkKind::Header {
                level: 2,
                is_setext: false,
                is_opening_tag: false,
                content: Span::new(pos(0, 3), pos(0, 8)),
            }
        );
        // A hash glued to a word is content.
        let mark = first("# C#", "header");
        assert!(matches!(
            mark.kind,
            MarkKind::Header { is_opening_tag: true, content, .. } if content.end == pos(0, 4)
        ));
    }

    #[test]
    fn test_header_with_inline_content() {
        assert_eq!(
            names("## **bold** title"),
            ["header", "strong-begin", "strong-end"]
        );
    }

    #[test]
    fn test_setext_header() {
        let result = scan("Title\n=====");
        assert_eq!(result.marks.len(), 1);
        let mark = &result.marks[0];
        assert_eq!(mark.start, pos(0, 0));
        assert_eq!(mark.end, Some(pos(1, 5)));
        assert!(matches!(
            mark.kind,
            MarkKind::Header {
                level: 1,
                is_setext: true,
                ..
            }
        ));
        assert!(matches!(
            first("Sub\n---", "header").kind,
            MarkKind::Header { level: 2, .. }
        ));
    }

    #[test]
    fn test_setext_underline_too_short() {
        let result = scan("A long title\n===");
        assert!(result.marks.named("header").next().is_none());
    }

    // -------------------------------------------------------------------------
    // Emphasis
    // -------------------------------------------------------------------------

    #[test]
    fn test_strong() {
        let result = scan("**bold**");
        let strong: Vec<_> = result
            .marks
            .iter()
            .filter(|m| m.kind.is_inline())
            .collect();
        assert_eq!(strong.len(), 2);
        assert_eq!(strong[0].kind, MarkKind::StrongBegin);
        assert_eq!(strong[0].start, pos(0, 0));
        assert_eq!(strong[1].kind, MarkKind::StrongEnd);
        assert_eq!(strong[1].start, pos(0, 6));
    }

    #[test]
    fn test_emphasis_forms() {
        assert_eq!(
            names("*a* _b_"),
            [
                "paragraph",
                "emphasis-begin",
                "emphasis-end",
                "emphasis-begin",
                "emphasis-end"
            ]
        );
        assert_eq!(
            names("***x***"),
            [
                "paragraph",
                "strong-begin",
                "emphasis-begin",
                "emphasis-end",
                "strong-end"
            ]
        );
    }

    #[test]
    fn test_nested_emphasis() {
        assert_eq!(
            names("**a *b* c**"),
            [
                "paragraph",
                "strong-begin",
                "emphasis-begin",
                "emphasis-end",
                "strong-end"
            ]
        );
    }

    #[test]
    fn test_unmatched_delimiters_are_text() {
        assert_eq!(names("**not closed"), ["paragraph"]);
        assert_eq!(names("a * b * c"), ["paragraph"]);
        assert_eq!(names("snake_case_name"), ["paragraph"]);
    }

    #[test]
    fn test_crossing_delimiters_rejected() {
        let result = scan("*a **b* c**");
        let begins = result.marks.named("emphasis-begin").count();
        let strong = result.marks.named("strong-begin").count();
        assert_eq!(begins, 1);
        assert_eq!(strong, 0);
    }

    #[test]
    fn test_emphasis_across_paragraph_lines() {
        let result = scan("*one\ntwo*");
        let begin = first("*one\ntwo*", "emphasis-begin");
        assert_eq!(begin.start, pos(0, 0));
        let end = result.marks.named("emphasis-end").next().unwrap();
        assert_eq!(end.start, pos(1, 3));
    }

    #[test]
    fn test_emphasis_stops_at_blank_line() {
        assert_eq!(names("*one\n\ntwo*"), ["paragraph", "paragraph"]);
    }

    #[test]
    fn test_escaped_delimiters() {
        assert_eq!(names(r"\*not\*"), ["paragraph", "escape", "escape"]);
        assert_eq!(
            first(r"\*", "escape").kind,
            MarkKind::Escape { ch: '*' }
        );
    }

    #[test]
    fn test_strikethrough() {
        let mark = first("~~gone~~", "strikethrough");
        assert_eq!(mark.start, pos(0, 0));
        assert_eq!(mark.end, Some(pos(0, 8)));
        assert_eq!(
            mark.kind,
            MarkKind::Strikethrough {
                content: Span::new(pos(0, 2), pos(0, 6))
            }
        );
        let strict = Scanner::with_options(ScanOptions::strict()).scan("~~gone~~");
        assert!(strict.marks.named("strikethrough").next().is_none());
    }

    // -------------------------------------------------------------------------
    // Code
    // -------------------------------------------------------------------------

    #[test]
    fn test_inline_code() {
        let mark = first("use `x * y` here", "inline-code");
        assert_eq!(mark.start, pos(0, 4));
        assert_eq!(mark.end, Some(pos(0, 11)));
        assert_eq!(mark.kind, MarkKind::InlineCode { code: "x * y".into() });
        assert_eq!(
            first("``a ` b``", "inline-code").kind,
            MarkKind::InlineCode { code: "a ` b".into() }
        );
    }

    #[test]
    fn test_code_span_hides_delimiters() {
        assert_eq!(names("`*a*`"), ["paragraph", "inline-code"]);
    }

    #[test]
    fn test_unterminated_backtick() {
        let result = scan("`unterminated");
        assert!(result.marks.named("inline-code").next().is_none());
        assert_eq!(names("`unterminated"), ["paragraph"]);
    }

    #[test]
    fn test_fenced_code() {
        let result = scan("```rust\nfn main() {}\n**x**\n```\nafter");
        let fence = result.marks.named("code-fence").next().unwrap();
        assert_eq!(fence.start, pos(0, 0));
        assert_eq!(fence.end, Some(pos(3, 3)));
        assert_eq!(
            fence.kind,
            MarkKind::CodeFence {
                language: Some("rust".into())
            }
        );
        assert_eq!(result.marks.named("code-block-line").count(), 2);
        assert_eq!(result.marks.named("strong-begin").count(), 0);
        assert_eq!(result.marks.named("paragraph").count(), 1);
    }

    #[test]
    fn test_unterminated_fence_runs_to_end() {
        let fence = first("~~~\ncode\nmore", "code-fence");
        assert_eq!(fence.end, Some(pos(2, 4)));
        assert_eq!(fence.kind, MarkKind::CodeFence { language: None });
    }

    #[test]
    fn test_indented_code() {
        let mark = first("    let x = 1;", "code-block-line");
        assert_eq!(mark.start, pos(0, 0));
        assert_eq!(
            mark.kind,
            MarkKind::CodeBlockLine {
                language: None,
                content: Span::new(pos(0, 4), pos(0, 14)),
            }
        );
        // Indentation inside a paragraph continues it.
        assert_eq!(names("text\n    more"), ["paragraph"]);
    }

    // -------------------------------------------------------------------------
    // Block structure
    // -------------------------------------------------------------------------

    #[test]
    fn test_horizontal_rule() {
        let result = scan("---");
        assert_eq!(result.marks.len(), 1);
        assert_eq!(result.marks[0].kind, MarkKind::HorizontalRule);
        assert_eq!(result.marks[0].start, pos(0, 0));
        assert!(result.marks[0].is_zero_width());
        assert_eq!(names("* * *"), ["horizontal-rule"]);
        assert_eq!(names("___"), ["horizontal-rule"]);
    }

    #[test]
    fn test_blockquote() {
        let result = scan("> one\n> two");
        assert_eq!(
            result.marks.iter().map(Mark::name).collect::<Vec<_>>(),
            ["block-quote-multi-line", "block-quote", "block-quote"]
        );
        let multi = &result.marks[0];
        assert_eq!(multi.end, Some(pos(1, 5)));
        assert_eq!(
            result.marks[1].kind,
            MarkKind::BlockQuote {
                level: 1,
                content: Span::new(pos(0, 2), pos(0, 5)),
            }
        );
    }

    #[test]
    fn test_nested_blockquote_level() {
        assert!(matches!(
            first("> > deep", "block-quote").kind,
            MarkKind::BlockQuote { level: 2, .. }
        ));
        assert_eq!(names("> single"), ["block-quote"]);
        assert!(matches!(
            first("> a\n>> b", "block-quote-multi-line").kind,
            MarkKind::BlockQuoteMultiLine { level: 2 }
        ));
    }

    #[test]
    fn test_unordered_list() {
        let result = scan("- one\n- two");
        assert_eq!(
            result.marks.iter().map(Mark::name).collect::<Vec<_>>(),
            ["unordered-list", "unordered-list-item", "unordered-list-item"]
        );
        assert_eq!(result.marks[0].end, Some(pos(1, 5)));
        assert_eq!(
            result.marks[1].kind,
            MarkKind::UnorderedListItem {
                level: 1,
                content: Span::new(pos(0, 2), pos(0, 5)),
            }
        );
        assert_eq!(result.marks[1].end, Some(pos(0, 5)));
    }

    #[test]
    fn test_ordered_list_numbers() {
        let result = scan("3. three\n4. four");
        let numbers: Vec<u64> = result
            .marks
            .iter()
            .filter_map(|m| match m.kind {
                MarkKind::OrderedListItem { number, .. } => Some(number),
                _ => None,
            })
            .collect();
        assert_eq!(numbers, [3, 4]);
        assert_eq!(result.marks.named("ordered-list").count(), 1);
    }

    #[test]
    fn test_nested_list() {
        let result = scan("- outer\n    - inner\n- next");
        let levels: Vec<(&str, usize)> = result
            .marks
            .iter()
            .filter_map(|m| match m.kind {
                MarkKind::UnorderedList { level } => Some(("list", level)),
                MarkKind::UnorderedListItem { level, .. } => Some(("item", level)),
                _ => None,
            })
            .collect();
        assert_eq!(
            levels,
            [
                ("list", 1),
                ("item", 1),
                ("list", 2),
                ("item", 2),
                ("item", 1)
            ]
        );
        // The outer item covers its nested list.
        let outer = &result.marks[1];
        assert_eq!(outer.end, Some(pos(1, 11)));
    }

    #[test]
    fn test_list_closed_by_blank_line() {
        assert_eq!(
            names("- a\n\ntext"),
            ["unordered-list", "unordered-list-item", "paragraph"]
        );
    }

    #[test]
    fn test_list_continuation_line() {
        let result = scan("- a\n  still a");
        let item = result.marks.named("unordered-list-item").next().unwrap();
        assert_eq!(item.end, Some(pos(1, 9)));
        assert!(result.marks.named("paragraph").next().is_none());
    }

    #[test]
    fn test_switching_list_kind() {
        assert_eq!(
            names("- a\n1. b"),
            [
                "unordered-list",
                "unordered-list-item",
                "ordered-list",
                "ordered-list-item"
            ]
        );
    }

    #[test]
    fn test_paragraph_spans_lines() {
        let result = scan("one\ntwo\n\nthree");
        let paragraphs: Vec<_> = result.marks.named("paragraph").collect();
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0].start, pos(0, 0));
        assert_eq!(paragraphs[0].end, Some(pos(1, 3)));
        assert_eq!(paragraphs[1].start, pos(3, 0));
    }

    #[test]
    fn test_table() {
        let result = scan("| a | b |\n|:--|--:|\n| 1 | 2 |\n| 3 |");
        assert_eq!(
            result.marks.iter().map(Mark::name).collect::<Vec<_>>(),
            ["table", "table-header", "table-alignment", "table-row", "table-row"]
        );
        assert_eq!(
            result.marks[0].kind,
            MarkKind::Table {
                alignments: vec![Alignment::Left, Alignment::Right]
            }
        );
        assert_eq!(result.marks[0].end, Some(pos(3, 5)));
        assert_eq!(
            result.marks[1].kind,
            MarkKind::TableHeader {
                cells: vec!["a".into(), "b".into()]
            }
        );
        assert_eq!(
            result.marks[4].kind,
            MarkKind::TableRow {
                cells: vec!["3".into(), String::new()]
            }
        );
    }

    #[test]
    fn test_table_needs_matching_alignment_row() {
        assert!(scan("a | b\n---").marks.named("table").next().is_none());
        let strict = Scanner::with_options(ScanOptions::strict()).scan("a | b\n--|--");
        assert!(strict.marks.named("table").next().is_none());
    }

    // -------------------------------------------------------------------------
    // Links
    // -------------------------------------------------------------------------

    #[test]
    fn test_link_with_title() {
        let mark = first(r#"[text](http://example.com "Title")"#, "link-with-title");
        assert_eq!(mark.start, pos(0, 0));
        assert_eq!(mark.end, Some(pos(0, 34)));
        assert_eq!(
            mark.kind,
            MarkKind::LinkWithTitle {
                text: "text".into(),
                target: "http://example.com".into(),
                title: "Title".into(),
            }
        );
    }

    #[test]
    fn test_inline_link_forms() {
        assert_eq!(
            first("[a](/url)", "link").kind,
            MarkKind::Link {
                text: "a".into(),
                target: "/url".into()
            }
        );
        assert_eq!(
            first("[a](<my url>)", "link").kind.target(),
            Some("my url")
        );
        assert_eq!(
            first("[a](/x_(y))", "link").kind.target(),
            Some("/x_(y)")
        );
        assert_eq!(
            first("![alt](/img.png 'pic')", "image").kind,
            MarkKind::Image {
                alt: "alt".into(),
                target: "/img.png".into(),
                title: Some("pic".into()),
            }
        );
    }

    #[test]
    fn test_broken_link_is_text() {
        assert_eq!(names("[a](/url"), ["paragraph"]);
        assert_eq!(names("[ ] todo"), ["paragraph"]);
    }

    #[test]
    fn test_reference_definition_and_use() {
        let result = scan("[foo]: /url \"title\"\n[foo]");
        let reference = result.marks.named("reference").next().unwrap();
        assert_eq!(
            reference.kind,
            MarkKind::Reference {
                label: "foo".into(),
                target: "/url".into(),
                title: Some("title".into()),
            }
        );
        let link = result.marks.named("link-by-reference").next().unwrap();
        assert_eq!(
            link.kind,
            MarkKind::LinkByReference {
                text: "foo".into(),
                label: "foo".into(),
                target: Some("/url".into()),
                title: Some("title".into()),
            }
        );
        let defined = result.references.resolve("FOO").unwrap();
        assert_eq!(defined.target, "/url");
    }

    #[test]
    fn test_reference_definition_unclosed_title() {
        let result = scan("[foo]: /url \"title\n[foo]");
        assert!(result.references.is_empty());
        assert_eq!(result.marks.named("reference").count(), 0);
        assert_eq!(result.marks.named("paragraph").count(), 1);
        let links: Vec<_> = result.marks.named("link-by-reference").collect();
        assert_eq!(links.len(), 2);
        for link in links {
            assert_eq!(
                link.kind,
                MarkKind::LinkByReference {
                    text: "foo".into(),
                    label: "foo".into(),
                    target: None,
                    title: None,
                }
            );
        }
    }

    #[test]
    fn test_emphasis_closer_not_taken_from_link() {
        let expected = ["paragraph", "emphasis-begin", "link", "emphasis-end"];
        assert_eq!(names("*see [a*b](u) here*"), expected);
        assert_eq!(names("*a [x](http://h/*) b*"), expected);
        assert_eq!(
            names("**a [b**][c] d**"),
            ["paragraph", "strong-begin", "link-by-reference", "strong-end"]
        );
    }

    #[test]
    fn test_forward_reference() {
        let result = scan("[Text][Label]\n\n[label]: /later");
        assert_eq!(
            first("[Text][Label]\n\n[label]: /later", "link-by-reference")
                .kind
                .target(),
            Some("/later")
        );
        assert_eq!(result.references.len(), 1);
    }

    #[test]
    fn test_unresolved_reference_keeps_no_target() {
        let mark = first("[nowhere][]", "link-by-reference");
        assert_eq!(mark.kind.target(), None);
    }

    #[test]
    fn test_image_by_reference() {
        let mark = first("![logo][img]\n\n[img]: /logo.png", "image-by-reference");
        assert_eq!(mark.kind.target(), Some("/logo.png"));
    }

    #[test]
    fn test_later_reference_definition_wins() {
        let result = scan("[a]: /one\n[a]: /two\n\n[a]");
        assert_eq!(result.references.resolve("a").unwrap().target, "/two");
    }

    #[test]
    fn test_autolinks() {
        assert_eq!(
            first("<https://example.com>", "auto-link").kind,
            MarkKind::AutoLink {
                target: "https://example.com".into(),
                is_email: false,
            }
        );
        assert_eq!(
            first("<me@example.com>", "auto-link").kind,
            MarkKind::AutoLink {
                target: "me@example.com".into(),
                is_email: true,
            }
        );
    }

    // -------------------------------------------------------------------------
    // HTML, entities, line breaks
    // -------------------------------------------------------------------------

    #[test]
    fn test_html_tag_spans_to_closing_tag() {
        let mark = first("a <span class=\"x\">b</span> c", "html-tag");
        assert_eq!(mark.start, pos(0, 2));
        assert_eq!(mark.end, Some(pos(0, 26)));
        assert_eq!(mark.kind, MarkKind::HtmlTag { name: "span".into() });
    }

    #[test]
    fn test_void_and_unclosed_tags() {
        assert_eq!(first("a<br>b", "html-tag").end, Some(pos(0, 5)));
        assert_eq!(first("<b>open", "html-tag").end, Some(pos(0, 3)));
        assert_eq!(
            first("<!-- note -->", "html-tag").kind,
            MarkKind::HtmlTag { name: "!--".into() }
        );
        assert_eq!(names("1 < 2"), ["paragraph"]);
    }

    #[test]
    fn test_entities() {
        let result = scan("&amp; &#42; &#x2A; &nope");
        let entities: Vec<_> = result
            .marks
            .iter()
            .filter_map(|m| match &m.kind {
                MarkKind::HtmlEntity { entity } => Some(entity.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(entities, ["&amp;", "&#42;", "&#x2A;"]);
    }

    #[test]
    fn test_trailing_space_line_break() {
        let result = scan("one  \ntwo");
        let brk = result.marks.named("line-break").next().unwrap();
        assert_eq!(brk.start, pos(0, 3));
        assert!(brk.is_zero_width());
        assert!(scan("one  ").marks.named("line-break").next().is_none());
    }

    #[test]
    fn test_hard_line_breaks_option() {
        assert!(scan("one\ntwo").marks.named("line-break").next().is_none());
        let gfm = Scanner::with_options(ScanOptions::gfm()).scan("one\ntwo\nthree");
        let breaks: Vec<_> = gfm.marks.named("line-break").map(|m| m.start).collect();
        assert_eq!(breaks, [pos(0, 3), pos(1, 3)]);
    }

    // -------------------------------------------------------------------------
    // Whole-document properties
    // -------------------------------------------------------------------------

    #[test]
    fn test_empty_input() {
        let result = scan("");
        assert!(result.marks.is_empty());
        assert!(result.references.is_empty());
    }

    #[test]
    fn test_marks_are_sorted() {
        let text = "# H\n\n> q *e*\n\n- a **b**\n- c\n\n| x |\n|---|\n| y |\n\ntext `c` [l](/u)";
        assert!(scan(text).marks.is_sorted());
    }

    #[test]
    fn test_scan_is_idempotent() {
        let text = "Title\n===\n\n- [a][ref]\n\n[ref]: /r";
        let scanner = Scanner::new();
        assert_eq!(scanner.scan(text), scanner.scan(text));
        assert_eq!(scan_with(text, &ScanOptions::default()), scan(text));
    }

    #[test]
    fn test_crlf_input() {
        let result = scan("# Title\r\n\r\ntext  \r\nmore");
        let header = result.marks.named("header").next().unwrap();
        assert_eq!(header.end, Some(pos(0, 7)));
        assert_eq!(result.marks.named("line-break").count(), 1);
        assert_eq!(result.marks.named("paragraph").count(), 1);
    }
}
