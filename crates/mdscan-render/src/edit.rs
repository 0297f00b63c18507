//! Offset-anchored output edits and their application.
//!
//! Every mark becomes one or more edits against the source text. An edit
//! either inserts text at an offset (`start == end`) or replaces a byte
//! range. Source text no edit touches is copied through HTML-escaped.

use html_escape::encode_text;
use log::trace;
use std::cmp::Reverse;

/// When an edit applies relative to others at the same offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    /// Closing tag of an element ending here
    Close,
    /// Opening tag of an element starting here
    Open,
    /// Replacement of source text
    Replace,
}

/// One change to the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub phase: Phase,
    /// Byte range of the mark that produced this edit
    pub owner: (usize, usize),
    /// Index of that mark in the mark list
    pub index: usize,
    pub text: String,
}

impl Edit {
    pub fn open(at: usize, owner: (usize, usize), index: usize, text: impl Into<String>) -> Self {
        Self {
            start: at,
            end: at,
            phase: Phase::Open,
            owner,
            index,
            text: text.into(),
        }
    }

    pub fn close(at: usize, owner: (usize, usize), index: usize, text: impl Into<String>) -> Self {
        Self {
            start: at,
            end: at,
            phase: Phase::Close,
            owner,
            index,
            text: text.into(),
        }
    }

    pub fn replace(
        start: usize,
        end: usize,
        owner: (usize, usize),
        index: usize,
        text: impl Into<String>,
    ) -> Self {
        Self {
            start,
            end: end.max(start),
            phase: Phase::Replace,
            owner,
            index,
            text: text.into(),
        }
    }

    /// Closes come first, innermost first; then opens, outermost first;
    /// then replacements in mark order. `seq` keeps edits of one mark in
    /// the order they were made.
    fn sort_key(&self, seq: usize) -> (usize, Phase, Reverse<usize>, isize, usize) {
        let index = self.index as isize;
        let (nest, order) = match self.phase {
            Phase::Close => (Reverse(self.owner.0), -index),
            Phase::Open => (Reverse(self.owner.1), index),
            Phase::Replace => (Reverse(0), index),
        };
        (self.start, self.phase, nest, order, seq)
    }
}

/// Apply `edits` to `source`, appending the result to `out`.
///
/// A replacement that starts inside text an earlier replacement already
/// consumed is dropped; inserts are always written so tags stay balanced.
pub fn apply(source: &str, edits: Vec<Edit>, out: &mut String) {
    let mut edits: Vec<(usize, Edit)> = edits.into_iter().enumerate().collect();
    edits.sort_by_key(|(seq, edit)| edit.sort_key(*seq));

    let mut cursor = 0;
    for (_, edit) in edits {
        if edit.start < cursor {
            if edit.end > edit.start {
                trace!(
                    "dropping edit {}..{}: overlaps text already replaced",
                    edit.start,
                    edit.end
                );
            } else {
                out.push_str(&edit.text);
            }
            continue;
        }
        out.push_str(&encode_text(&source[cursor..edit.start]));
        out.push_str(&edit.text);
        cursor = edit.end;
    }
    out.push_str(&encode_text(&source[cursor..]));
}
