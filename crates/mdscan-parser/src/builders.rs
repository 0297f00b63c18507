//! Open-ended block builders.
//!
//! A builder records where a container started and grows its end as lines
//! are consumed. It turns into a [`Mark`] only when the container closes.
//! Each builder carries the sequence number it was opened with, so at equal
//! start positions the outer container sorts before what it contains.

use mdscan_core::{Alignment, LineIndex, Mark, MarkKind, Span};
use std::ops::Range;

/// Deepest header level; extra `#` characters clamp here.
pub const MAX_HEADER_LEVEL: usize = 6;

/// A mark paired with the order it was opened in.
pub type Sequenced = (usize, Mark);

fn span(index: &LineIndex, range: &Range<usize>) -> Span {
    Span::new(index.position(range.start), index.position(range.end))
}

/// ATX or setext header under construction.
#[derive(Debug, Clone)]
pub struct HeaderBuilder {
    pub seq: usize,
    pub start: usize,
    hashes: usize,
    pub level: u8,
    pub is_setext: bool,
    pub is_opening_tag: bool,
}

impl HeaderBuilder {
    pub fn atx(seq: usize, start: usize) -> Self {
        Self {
            seq,
            start,
            hashes: 0,
            level: 0,
            is_setext: false,
            is_opening_tag: true,
        }
    }

    pub fn setext(seq: usize, start: usize, level: u8) -> Self {
        Self {
            seq,
            start,
            hashes: 0,
            level,
            is_setext: true,
            is_opening_tag: false,
        }
    }

    /// Count one more leading `#`.
    pub fn push_hash(&mut self) {
        self.hashes += 1;
        self.level = self.hashes.min(MAX_HEADER_LEVEL) as u8;
    }

    pub fn hashes(&self) -> usize {
        self.hashes
    }

    pub fn finish(self, index: &LineIndex, content: Range<usize>, end: usize) -> Sequenced {
        let kind = MarkKind::Header {
            level: self.level,
            is_setext: self.is_setext,
            is_opening_tag: self.is_opening_tag,
            content: span(index, &content),
        };
        (
            self.seq,
            Mark::new(index.position(self.start), index.position(end), kind),
        )
    }
}

/// One list item; `number` is set for ordered items.
#[derive(Debug, Clone)]
pub struct ItemBuilder {
    pub seq: usize,
    pub level: usize,
    pub number: Option<u64>,
    pub start: usize,
    pub content: Range<usize>,
    pub end: usize,
}

impl ItemBuilder {
    pub fn finish(self, index: &LineIndex) -> Sequenced {
        let content = span(index, &self.content);
        let kind = match self.number {
            Some(number) => MarkKind::OrderedListItem {
                level: self.level,
                number,
                content,
            },
            None => MarkKind::UnorderedListItem {
                level: self.level,
                content,
            },
        };
        (
            self.seq,
            Mark::new(index.position(self.start), index.position(self.end), kind),
        )
    }
}

/// A list at one nesting level, with its current item.
#[derive(Debug, Clone)]
pub struct ListBuilder {
    pub seq: usize,
    pub level: usize,
    pub ordered: bool,
    pub start: usize,
    pub end: usize,
    pub item: Option<ItemBuilder>,
}

impl ListBuilder {
    pub fn new(seq: usize, level: usize, ordered: bool, start: usize) -> Self {
        Self {
            seq,
            level,
            ordered,
            start,
            end: start,
            item: None,
        }
    }

    /// Grow the list and its open item to `end`.
    pub fn extend(&mut self, end: usize) {
        self.end = end;
        if let Some(item) = &mut self.item {
            item.end = end;
        }
    }

    /// Close the open item, if any.
    pub fn take_item(&mut self, index: &LineIndex) -> Option<Sequenced> {
        self.item.take().map(|item| item.finish(index))
    }

    pub fn finish(mut self, index: &LineIndex) -> Vec<Sequenced> {
        let mut marks = Vec::with_capacity(2);
        marks.extend(self.take_item(index));
        let kind = if self.ordered {
            MarkKind::OrderedList { level: self.level }
        } else {
            MarkKind::UnorderedList { level: self.level }
        };
        marks.push((
            self.seq,
            Mark::new(index.position(self.start), index.position(self.end), kind),
        ));
        marks
    }
}

/// Consecutive `>` lines.
#[derive(Debug, Clone)]
pub struct QuoteBuilder {
    pub seq: usize,
    pub start: usize,
    pub end: usize,
    pub level: usize,
    pub lines: usize,
}

impl QuoteBuilder {
    pub fn new(seq: usize, start: usize) -> Self {
        Self {
            seq,
            start,
            end: start,
            level: 0,
            lines: 0,
        }
    }

    pub fn add_line(&mut self, level: usize, end: usize) {
        self.level = self.level.max(level);
        self.lines += 1;
        self.end = end;
    }

    /// A single quoted line produces no multi-line mark.
    pub fn finish(self, index: &LineIndex) -> Option<Sequenced> {
        (self.lines >= 2).then(|| {
            (
                self.seq,
                Mark::new(
                    index.position(self.start),
                    index.position(self.end),
                    MarkKind::BlockQuoteMultiLine { level: self.level },
                ),
            )
        })
    }
}

/// Plain text lines outside any container.
#[derive(Debug, Clone)]
pub struct ParagraphBuilder {
    pub seq: usize,
    pub start: usize,
    pub end: usize,
    /// Start of the blank line (or end of input) that will close the
    /// paragraph; delimiter searches never look past it.
    pub bound: usize,
}

impl ParagraphBuilder {
    pub fn finish(self, index: &LineIndex) -> Sequenced {
        (
            self.seq,
            Mark::new(
                index.position(self.start),
                index.position(self.end),
                MarkKind::Paragraph,
            ),
        )
    }
}

/// A table, from its header line to its last row.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    pub seq: usize,
    pub start: usize,
    pub end: usize,
    pub alignments: Vec<Alignment>,
}

impl TableBuilder {
    pub fn columns(&self) -> usize {
        self.alignments.len()
    }

    pub fn finish(self, index: &LineIndex) -> Sequenced {
        (
            self.seq,
            Mark::new(
                index.position(self.start),
                index.position(self.end),
                MarkKind::Table {
                    alignments: self.alignments,
                },
            ),
        )
    }
}

/// What a confirmed delimiter pair turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterKind {
    Emphasis,
    Strong,
    StrongEmphasis,
    Strikethrough,
}

impl DelimiterKind {
    /// Delimiter run length for `*`/`_` runs.
    pub fn from_run(run: usize) -> Option<Self> {
        match run {
            1 => Some(DelimiterKind::Emphasis),
            2 => Some(DelimiterKind::Strong),
            3 => Some(DelimiterKind::StrongEmphasis),
            _ => None,
        }
    }
}

/// An opener whose closer has been located but not yet reached.
///
/// Nothing is emitted for it until the scan arrives at `close`; if the
/// closer is skipped over, the opener is dropped without a trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelimiter {
    pub kind: DelimiterKind,
    pub open: Range<usize>,
    pub close: Range<usize>,
}

impl PendingDelimiter {
    /// Marks for the confirmed pair, in document order.
    pub fn finish(self, index: &LineIndex) -> Vec<Mark> {
        let at = |start: usize, end: usize, kind| {
            Mark::new(index.position(start), index.position(end), kind)
        };
        let (open, close) = (self.open, self.close);
        match self.kind {
            DelimiterKind::Emphasis => vec![
                at(open.start, open.end, MarkKind::EmphasisBegin),
                at(close.start, close.end, MarkKind::EmphasisEnd),
            ],
            DelimiterKind::Strong => vec![
                at(open.start, open.end, MarkKind::StrongBegin),
                at(close.start, close.end, MarkKind::StrongEnd),
            ],
            DelimiterKind::StrongEmphasis => vec![
                at(open.start, open.start + 2, MarkKind::StrongBegin),
                at(open.start + 2, open.end, MarkKind::EmphasisBegin),
                at(close.start, close.start + 1, MarkKind::EmphasisEnd),
                at(close.start + 1, close.end, MarkKind::StrongEnd),
            ],
            DelimiterKind::Strikethrough => vec![at(
                open.start,
                close.end,
                MarkKind::Strikethrough {
                    content: span(index, &(open.end..close.start)),
                },
            )],
        }
    }
}
