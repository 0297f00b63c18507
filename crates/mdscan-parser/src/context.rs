//! Per-scan state and the line driver.

use crate::builders::{
    ListBuilder, ParagraphBuilder, PendingDelimiter, QuoteBuilder, Sequenced, TableBuilder,
};
use crate::cursor::{Checkpoint, Cursor};
use crate::resolve::resolve_references;
use crate::ScanResult;
use log::{debug, trace};
use mdscan_core::{
    LineIndex, Mark, MarkKind, MarkList, Position, ReferenceTable, ScanOptions, Span,
};

/// Everything a recognizer may need to undo.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Snapshot {
    cursor: Checkpoint,
    marks: usize,
    delimiters: usize,
}

/// Mutable state for one scan of one text.
pub(crate) struct Context<'a> {
    pub(crate) cur: Cursor<'a>,
    pub(crate) options: &'a ScanOptions,
    pub(crate) index: LineIndex,
    marks: Vec<Sequenced>,
    seq: usize,
    pub(crate) references: ReferenceTable,
    pub(crate) delimiters: Vec<PendingDelimiter>,
    pub(crate) paragraph: Option<ParagraphBuilder>,
    pub(crate) lists: Vec<ListBuilder>,
    pub(crate) quote: Option<QuoteBuilder>,
    pub(crate) table: Option<TableBuilder>,
    /// Newline offset of the previous paragraph line, when that newline
    /// becomes a break if the paragraph continues.
    pub(crate) pending_break: Option<usize>,
    /// Set once a trailing-space break was emitted on the current line.
    pub(crate) line_broke: bool,
}

impl<'a> Context<'a> {
    pub(crate) fn new(text: &'a str, options: &'a ScanOptions) -> Self {
        Self {
            cur: Cursor::new(text),
            options,
            index: LineIndex::new(text),
            marks: Vec::new(),
            seq: 0,
            references: ReferenceTable::new(),
            delimiters: Vec::new(),
            paragraph: None,
            lists: Vec::new(),
            quote: None,
            table: None,
            pending_break: None,
            line_broke: false,
        }
    }

    pub(crate) fn text(&self) -> &'a str {
        self.cur.text()
    }

    /// Scan the whole text.
    pub(crate) fn run(mut self) -> ScanResult {
        while !self.cur.at_end() {
            let before = self.cur.pos();
            self.line_broke = false;
            self.md_line();
            if self.cur.pos() == before {
                trace!("no rule matched at offset {}, skipping one character", before);
                self.cur.bump();
            }
        }
        self.close_all();

        let mut marks = std::mem::take(&mut self.marks);
        marks.sort_by_key(|(seq, mark)| (mark.start, *seq));
        let mut marks: MarkList = marks.into_iter().map(|(_, mark)| mark).collect();
        resolve_references(&mut marks, &self.references);
        debug!(
            "scanned {} lines: {} marks, {} references",
            self.index.line_count(),
            marks.len(),
            self.references.len()
        );
        ScanResult {
            marks,
            references: self.references,
        }
    }

    /// One line: blank lines, then block elements, then indented code, then
    /// text.
    fn md_line(&mut self) {
        let _ = self.blank_line()
            || self.block_element()
            || self.indented_code()
            || self.text_line();
    }

    // =========================================================================
    // Backtracking
    // =========================================================================

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            cursor: self.cur.checkpoint(),
            marks: self.marks.len(),
            delimiters: self.delimiters.len(),
        }
    }

    pub(crate) fn rollback(&mut self, snapshot: Snapshot) {
        self.cur.restore(snapshot.cursor);
        self.marks.truncate(snapshot.marks);
        self.delimiters.truncate(snapshot.delimiters);
    }

    /// Run `rule`; if it fails, undo the cursor movement and any marks or
    /// pending delimiters it produced. Rules must not touch open builders
    /// before they are certain to succeed.
    pub(crate) fn attempt<T>(&mut self, rule: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let snapshot = self.snapshot();
        let result = rule(self);
        if result.is_none() {
            self.rollback(snapshot);
        }
        result
    }

    // =========================================================================
    // Emission
    // =========================================================================

    pub(crate) fn next_seq(&mut self) -> usize {
        self.seq += 1;
        self.seq
    }

    pub(crate) fn position(&self, offset: usize) -> Position {
        self.index.position(offset)
    }

    pub(crate) fn span(&self, start: usize, end: usize) -> Span {
        Span::new(self.position(start), self.position(end))
    }

    pub(crate) fn push(&mut self, entry: Sequenced) {
        trace!("mark {}", entry.1);
        self.marks.push(entry);
    }

    pub(crate) fn push_with(&mut self, seq: usize, start: usize, end: usize, kind: MarkKind) {
        let mark = Mark::new(self.position(start), self.position(end), kind);
        self.push((seq, mark));
    }

    pub(crate) fn emit(&mut self, start: usize, end: usize, kind: MarkKind) {
        let seq = self.next_seq();
        self.push_with(seq, start, end, kind);
    }

    pub(crate) fn emit_point(&mut self, start: usize, kind: MarkKind) {
        let seq = self.next_seq();
        let mark = Mark::point(self.position(start), kind);
        self.push((seq, mark));
    }

    // =========================================================================
    // Containers
    // =========================================================================

    pub(crate) fn close_paragraph(&mut self) {
        if let Some(paragraph) = self.paragraph.take() {
            let entry = paragraph.finish(&self.index);
            self.push(entry);
        }
        self.drop_delimiters();
        self.pending_break = None;
    }

    pub(crate) fn drop_delimiters(&mut self) {
        for pending in self.delimiters.drain(..) {
            debug!(
                "discarding {:?} opener at offset {}: closer never reached",
                pending.kind, pending.open.start
            );
        }
    }

    pub(crate) fn close_top_list(&mut self) {
        if let Some(list) = self.lists.pop() {
            for entry in list.finish(&self.index) {
                self.push(entry);
            }
        }
    }

    pub(crate) fn close_lists(&mut self) {
        while !self.lists.is_empty() {
            self.close_top_list();
        }
    }

    /// Grow every open list and item to `end`.
    pub(crate) fn extend_lists(&mut self, end: usize) {
        for list in &mut self.lists {
            list.extend(end);
        }
    }

    pub(crate) fn close_quote(&mut self) {
        if let Some(entry) = self.quote.take().and_then(|q| q.finish(&self.index)) {
            self.push(entry);
        }
    }

    pub(crate) fn close_table(&mut self) {
        if let Some(table) = self.table.take() {
            let entry = table.finish(&self.index);
            self.push(entry);
        }
    }

    pub(crate) fn close_all(&mut self) {
        self.close_paragraph();
        self.close_lists();
        self.close_quote();
        self.close_table();
    }

    /// Move past the newline of the line the cursor is on.
    pub(crate) fn finish_line(&mut self) {
        self.cur.skip_line();
    }
}
