//! Marks: the typed, positioned spans produced by the scanner.
//!
//! A [`Mark`] is an immutable record. Its `kind` is a closed sum type so
//! consumers can match exhaustively on everything the scanner recognizes.

use crate::enums::Alignment;
use crate::types::{Position, Span};
use serde::{Deserialize, Serialize};

/// One recognized syntactic span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    /// Where the span starts
    pub start: Position,
    /// Where the span ends (exclusive); `None` for zero-width marks
    pub end: Option<Position>,
    /// What was recognized
    pub kind: MarkKind,
}

impl Mark {
    /// Create a mark covering `start..end`.
    pub fn new(start: Position, end: Position, kind: MarkKind) -> Self {
        Self {
            start,
            end: Some(end),
            kind,
        }
    }

    /// Create a zero-width mark anchored at `start`.
    pub fn point(start: Position, kind: MarkKind) -> Self {
        Self {
            start,
            end: None,
            kind,
        }
    }

    /// Whether the mark has no end position.
    pub fn is_zero_width(&self) -> bool {
        self.end.is_none()
    }

    /// Short kebab-case name of the mark kind.
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.end {
            Some(end) => write!(f, "{} {} {}", self.start, end, self.kind),
            None => write!(f, "{} - {}", self.start, self.kind),
        }
    }
}

/// Every kind of span the scanner can recognize, with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkKind {
    // === Block-level elements ===
    /// ATX (`#`) or setext (underlined) header
    Header {
        level: u8,
        is_setext: bool,
        /// ATX header without a closing `#` sequence
        is_opening_tag: bool,
        content: Span,
    },
    /// One `>`-prefixed line
    BlockQuote { level: usize, content: Span },
    /// Two or more consecutive quoted lines
    BlockQuoteMultiLine { level: usize },
    HorizontalRule,
    OrderedList { level: usize },
    OrderedListItem {
        level: usize,
        number: u64,
        content: Span,
    },
    UnorderedList { level: usize },
    UnorderedListItem { level: usize, content: Span },
    /// One line of indented or fenced code
    CodeBlockLine {
        language: Option<String>,
        content: Span,
    },
    /// A whole fenced code block, fences included
    CodeFence { language: Option<String> },
    /// Consecutive text lines outside lists, quotes and tables
    Paragraph,
    /// A link reference definition line
    Reference {
        label: String,
        target: String,
        title: Option<String>,
    },
    Table { alignments: Vec<Alignment> },
    TableHeader { cells: Vec<String> },
    TableAlignment { alignments: Vec<Alignment> },
    TableRow { cells: Vec<String> },

    // === Inline elements ===
    EmphasisBegin,
    EmphasisEnd,
    StrongBegin,
    StrongEnd,
    Strikethrough { content: Span },
    InlineCode { code: String },
    Escape { ch: char },
    HtmlTag { name: String },
    HtmlEntity { entity: String },
    Link { text: String, target: String },
    LinkWithTitle {
        text: String,
        target: String,
        title: String,
    },
    /// `[text][label]`, `[text][]` or `[text]`; target filled once resolved
    LinkByReference {
        text: String,
        label: String,
        target: Option<String>,
        title: Option<String>,
    },
    AutoLink { target: String, is_email: bool },
    Image {
        alt: String,
        target: String,
        title: Option<String>,
    },
    ImageByReference {
        alt: String,
        label: String,
        target: Option<String>,
        title: Option<String>,
    },
    LineBreak,
}

impl MarkKind {
    /// Short kebab-case name, stable across releases.
    pub fn name(&self) -> &'static str {
        match self {
            MarkKind::Header { .. } => "header",
            MarkKind::BlockQuote { .. } => "block-quote",
            MarkKind::BlockQuoteMultiLine { .. } => "block-quote-multi-line",
            MarkKind::HorizontalRule => "horizontal-rule",
            MarkKind::OrderedList { .. } => "ordered-list",
            MarkKind::OrderedListItem { .. } => "ordered-list-item",
            MarkKind::UnorderedList { .. } => "unordered-list",
            MarkKind::UnorderedListItem { .. } => "unordered-list-item",
            MarkKind::CodeBlockLine { .. } => "code-block-line",
            MarkKind::CodeFence { .. } => "code-fence",
            MarkKind::Paragraph => "paragraph",
            MarkKind::Reference { .. } => "reference",
            MarkKind::Table { .. } => "table",
            MarkKind::TableHeader { .. } => "table-header",
            MarkKind::TableAlignment { .. } => "table-alignment",
            MarkKind::TableRow { .. } => "table-row",
            MarkKind::EmphasisBegin => "emphasis-begin",
            MarkKind::EmphasisEnd => "emphasis-end",
            MarkKind::StrongBegin => "strong-begin",
            MarkKind::StrongEnd => "strong-end",
            MarkKind::Strikethrough { .. } => "strikethrough",
            MarkKind::InlineCode { .. } => "inline-code",
            MarkKind::Escape { .. } => "escape",
            MarkKind::HtmlTag { .. } => "html-tag",
            MarkKind::HtmlEntity { .. } => "html-entity",
            MarkKind::Link { .. } => "link",
            MarkKind::LinkWithTitle { .. } => "link-with-title",
            MarkKind::LinkByReference { .. } => "link-by-reference",
            MarkKind::AutoLink { .. } => "auto-link",
            MarkKind::Image { .. } => "image",
            MarkKind::ImageByReference { .. } => "image-by-reference",
            MarkKind::LineBreak => "line-break",
        }
    }

    pub fn is_block(&self) -> bool {
        !self.is_inline()
    }

    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            MarkKind::EmphasisBegin
                | MarkKind::EmphasisEnd
                | MarkKind::StrongBegin
                | MarkKind::StrongEnd
                | MarkKind::Strikethrough { .. }
                | MarkKind::InlineCode { .. }
                | MarkKind::Escape { .. }
                | MarkKind::HtmlTag { .. }
                | MarkKind::HtmlEntity { .. }
                | MarkKind::Link { .. }
                | MarkKind::LinkWithTitle { .. }
                | MarkKind::LinkByReference { .. }
                | MarkKind::AutoLink { .. }
                | MarkKind::Image { .. }
                | MarkKind::ImageByReference { .. }
                | MarkKind::LineBreak
        )
    }

    /// Whether this is any of the link or image forms.
    pub fn is_link(&self) -> bool {
        matches!(
            self,
            MarkKind::Link { .. }
                | MarkKind::LinkWithTitle { .. }
                | MarkKind::LinkByReference { .. }
                | MarkKind::AutoLink { .. }
                | MarkKind::Image { .. }
                | MarkKind::ImageByReference { .. }
        )
    }

    /// The inner content region of container marks.
    pub fn content(&self) -> Option<Span> {
        match self {
            MarkKind::Header { content, .. }
            | MarkKind::BlockQuote { content, .. }
            | MarkKind::OrderedListItem { content, .. }
            | MarkKind::UnorderedListItem { content, .. }
            | MarkKind::CodeBlockLine { content, .. }
            | MarkKind::Strikethrough { content } => Some(*content),
            _ => None,
        }
    }

    /// Resolved target of a link or image, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            MarkKind::Link { target, .. }
            | MarkKind::LinkWithTitle { target, .. }
            | MarkKind::AutoLink { target, .. }
            | MarkKind::Image { target, .. }
            | MarkKind::Reference { target, .. } => Some(target),
            MarkKind::LinkByReference { target, .. } | MarkKind::ImageByReference { target, .. } => {
                target.as_deref()
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for MarkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkKind::Header { level, .. } => write!(f, "header(h{})", level),
            MarkKind::BlockQuote { level, .. } | MarkKind::BlockQuoteMultiLine { level } => {
                write!(f, "{}({})", self.name(), level)
            }
            MarkKind::Link { target, .. }
            | MarkKind::LinkWithTitle { target, .. }
            | MarkKind::AutoLink { target, .. }
            | MarkKind::Image { target, .. } => write!(f, "{}({})", self.name(), target),
            MarkKind::LinkByReference { label, .. }
            | MarkKind::ImageByReference { label, .. }
            | MarkKind::Reference { label, .. } => write!(f, "{}[{}]", self.name(), label),
            _ => write!(f, "{}", self.name()),
        }
    }
}
