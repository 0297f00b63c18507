//! Line-level recognizers.
//!
//! Each recognizer looks at the line under the cursor and either consumes
//! it (returning `true`) or leaves everything untouched. Open containers
//! are only closed once a recognizer knows it matches.

use crate::builders::{
    HeaderBuilder, ItemBuilder, ListBuilder, ParagraphBuilder, QuoteBuilder, TableBuilder,
};
use crate::context::Context;
use log::debug;
use mdscan_core::{normalize_label, Alignment, MarkKind};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

// =============================================================================
// Regex patterns
// =============================================================================

/// Horizontal rule: three or more `*`, `-` or `_`, optionally spaced
static HR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ {0,3}(?:(?:\*[ \t]*){3,}|(?:-[ \t]*){3,}|(?:_[ \t]*){3,})$").unwrap()
});

/// List item marker: indentation, bullet or `N.`, at least one space
static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([ \t]*)(?:[-+*]|([0-9]{1,9})\.)[ \t]+").unwrap());

/// Opening code fence with an optional language
static FENCE_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}(`{3,}|~{3,})[ \t]*([^\s`]*)(.*)$").unwrap());

/// Closing code fence
static FENCE_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}(`{3,}|~{3,})[ \t]*$").unwrap());

/// Setext underline
static SETEXT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ {0,3}(=+|-+)[ \t]*$").unwrap());

/// Table alignment row such as `| :--- | ---: |`
static TABLE_ALIGN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ {0,3}\|?[ \t]*:?-+:?[ \t]*(?:\|[ \t]*:?-+:?[ \t]*)*\|?[ \t]*$").unwrap()
});

/// Reference definition: `[label]: target "title"`
static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^ {0,3}\[((?:[^\]\\\n]|\\.)+)\]:[ \t]*(?:<([^>\n]*)>|(\S+))(?:[ \t]+(?:"([^"\n]*)"|'([^'\n]*)'|\(([^)\n]*)\)))?[ \t]*$"#,
    )
    .unwrap()
});

fn is_blank_char(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Whether `line` has a `|` not preceded by a backslash.
pub(crate) fn has_unescaped_pipe(line: &str) -> bool {
    let mut escaped = false;
    for c in line.chars() {
        match c {
            '|' if !escaped => return true,
            '\\' => escaped = !escaped,
            _ => escaped = false,
        }
    }
    false
}

/// Split a table line into trimmed cells. Outer pipes are optional and
/// `\|` stands for a literal pipe inside a cell.
pub(crate) fn split_cells(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let trimmed = match trimmed.strip_suffix('|') {
        Some(inner) if !inner.ends_with('\\') => inner,
        _ => trimmed,
    };

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = trimmed.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('|') => cell.push('|'),
                Some(other) => {
                    cell.push('\\');
                    cell.push(other);
                }
                None => cell.push('\\'),
            },
            '|' => cells.push(std::mem::take(&mut cell).trim().to_string()),
            _ => cell.push(c),
        }
    }
    cells.push(cell.trim().to_string());
    cells
}

impl Context<'_> {
    /// A whitespace-only line closes every open container.
    pub(crate) fn blank_line(&mut self) -> bool {
        let start = self.cur.pos();
        if !self.cur.is_blank_line(start) {
            return false;
        }
        self.close_all();
        self.finish_line();
        true
    }

    pub(crate) fn block_element(&mut self) -> bool {
        self.table_row()
            || self.fenced_code()
            || self.block_quote()
            || self.atx_header()
            || self.horizontal_rule()
            || self.list_item()
            || self.setext_header()
            || self.table_start()
            || self.reference_definition()
    }

    // =========================================================================
    // Tables
    // =========================================================================

    /// Header line followed by a matching alignment row.
    fn table_start(&mut self) -> bool {
        if !self.options.tables {
            return false;
        }
        let start = self.cur.pos();
        let header = self.cur.line(start);
        if !has_unescaped_pipe(header) || self.cur.line_end(start) >= self.text().len() {
            return false;
        }
        let next = self.cur.next_line(start);
        let delimiter = self.cur.line(next);
        if !TABLE_ALIGN_RE.is_match(delimiter) {
            return false;
        }

        let cells = split_cells(header);
        let alignments: Option<Vec<Alignment>> = split_cells(delimiter)
            .iter()
            .map(|cell| Alignment::parse(cell))
            .collect();
        let Some(alignments) = alignments else {
            return false;
        };
        if alignments.len() != cells.len() {
            debug!(
                "not a table at line {}: {} header cells, {} alignments",
                self.position(start).line,
                cells.len(),
                alignments.len()
            );
            return false;
        }

        self.close_all();
        let seq = self.next_seq();
        let header_end = self.cur.content_end(start);
        let delimiter_end = self.cur.content_end(next);
        self.emit(start, header_end, MarkKind::TableHeader { cells });
        self.emit(
            next,
            delimiter_end,
            MarkKind::TableAlignment {
                alignments: alignments.clone(),
            },
        );
        self.table = Some(TableBuilder {
            seq,
            start,
            end: delimiter_end,
            alignments,
        });
        self.cur.set(next);
        self.finish_line();
        true
    }

    /// Body row of the open table; any other line closes it.
    fn table_row(&mut self) -> bool {
        let Some(columns) = self.table.as_ref().map(TableBuilder::columns) else {
            return false;
        };
        let start = self.cur.pos();
        let line = self.cur.line(start);
        if !has_unescaped_pipe(line) {
            self.close_table();
            return false;
        }

        let mut cells = split_cells(line);
        cells.resize(columns, String::new());
        let end = self.cur.content_end(start);
        self.emit(start, end, MarkKind::TableRow { cells });
        if let Some(table) = &mut self.table {
            table.end = end;
        }
        self.finish_line();
        true
    }

    // =========================================================================
    // Code
    // =========================================================================

    /// A fenced block, consumed up to its closing fence or end of input.
    fn fenced_code(&mut self) -> bool {
        let start = self.cur.pos();
        let Some(caps) = FENCE_OPEN_RE.captures(self.cur.line(start)) else {
            return false;
        };
        let fence = caps.get(1).map_or("", |m| m.as_str());
        let (fence_char, fence_len) = (fence.as_bytes()[0], fence.len());
        if fence_char == b'`' && caps.get(3).is_some_and(|m| m.as_str().contains('`')) {
            return false;
        }
        let language = caps
            .get(2)
            .map(|m| m.as_str())
            .filter(|lang| !lang.is_empty())
            .map(str::to_string);

        self.close_all();
        let seq = self.next_seq();
        let len = self.text().len();
        let mut line = self.cur.next_line(start);
        let mut end = None;
        while line < len {
            let line_end = self.cur.content_end(line);
            let closes = FENCE_CLOSE_RE
                .captures(self.cur.line(line))
                .and_then(|close| close.get(1))
                .is_some_and(|close| {
                    close.as_str().as_bytes()[0] == fence_char && close.as_str().len() >= fence_len
                });
            if closes {
                end = Some(line_end);
                break;
            }
            let content = self.span(line, line_end);
            self.emit(
                line,
                line_end,
                MarkKind::CodeBlockLine {
                    language: language.clone(),
                    content,
                },
            );
            line = self.cur.next_line(line);
        }

        let end = end.unwrap_or_else(|| {
            debug!(
                "code fence opened at line {} is never closed",
                self.position(start).line
            );
            len
        });
        self.push_with(seq, start, end, MarkKind::CodeFence { language });
        self.cur.set(end);
        self.finish_line();
        true
    }

    /// A line indented past the current list's content column.
    pub(crate) fn indented_code(&mut self) -> bool {
        if self.paragraph.is_some() {
            return false;
        }
        let start = self.cur.pos();
        let line = self.cur.line(start);
        let indent = line.len() - line.trim_start_matches(is_blank_char).len();
        if indent == 0 || indent == line.len() {
            return false;
        }
        let needed = self.lists.last().map_or(0, |list| list.level * 4) + 4;
        if self.options.indent_width(&line[..indent]) < needed {
            return false;
        }

        let mut width = 0;
        let mut skipped = 0;
        for c in line[..indent].chars() {
            if width >= needed {
                break;
            }
            width += if c == '\t' { self.options.tab_width } else { 1 };
            skipped += 1;
        }

        let end = self.cur.content_end(start);
        self.close_quote();
        self.close_table();
        let content = self.span(start + skipped, end);
        self.emit(
            start,
            end,
            MarkKind::CodeBlockLine {
                language: None,
                content,
            },
        );
        self.extend_lists(end);
        self.finish_line();
        true
    }

    // =========================================================================
    // Quotes and headers
    // =========================================================================

    fn block_quote(&mut self) -> bool {
        let start = self.cur.pos();
        let line = self.cur.line(start);
        let indent = line.len() - line.trim_start_matches(' ').len();
        if indent > 3 || !line[indent..].starts_with('>') {
            return false;
        }

        self.cur.set(start + indent);
        let mut level = 0;
        while self.cur.eat('>') {
            level += 1;
            self.cur.eat(' ');
        }
        let content_start = self.cur.pos();
        let end = self.cur.content_end(start);

        self.close_paragraph();
        self.close_lists();
        self.close_table();
        if self.quote.is_none() {
            let seq = self.next_seq();
            self.quote = Some(QuoteBuilder::new(seq, start));
        }
        let seq = self.next_seq();
        self.inline_until(end, end);
        let content = self.span(content_start, end);
        self.push_with(seq, start, end, MarkKind::BlockQuote { level, content });
        if let Some(quote) = &mut self.quote {
            quote.add_line(level, end);
        }
        self.finish_line();
        true
    }

    fn atx_header(&mut self) -> bool {
        let start = self.cur.pos();
        self.attempt(|ctx| ctx.atx_header_body(start)).is_some()
    }

    fn atx_header_body(&mut self, start: usize) -> Option<()> {
        self.cur.eat_up_to(' ', 3);
        let seq = self.next_seq();
        let mut header = HeaderBuilder::atx(seq, start);
        while self.cur.eat('#') {
            header.push_hash();
        }
        if header.hashes() == 0 || !self.cur.peek().is_some_and(is_blank_char) {
            return None;
        }
        self.cur.eat_while(is_blank_char);

        let content_start = self.cur.pos();
        let end = self.cur.content_end(start);
        let content = self.text()[content_start..end].trim_end_matches(is_blank_char);
        let unhashed = content.trim_end_matches('#');
        let closed = unhashed.len() < content.len()
            && (unhashed.is_empty() || unhashed.ends_with(is_blank_char));
        let content = if closed {
            unhashed.trim_end_matches(is_blank_char)
        } else {
            content
        };
        header.is_opening_tag = !closed;
        let content_end = content_start + content.len();

        self.close_all();
        self.inline_until(content_end, content_end);
        let entry = header.finish(&self.index, content_start..content_end, end);
        self.push(entry);
        self.cur.set(end);
        self.finish_line();
        Some(())
    }

    /// Text line underlined by `===` or `---` at least as long as the text.
    fn setext_header(&mut self) -> bool {
        let start = self.cur.pos();
        let line = self.cur.line(start);
        let indent = line.len() - line.trim_start_matches(' ').len();
        let content = line.trim();
        if content.is_empty() || indent > 3 || line.starts_with('\t') {
            return false;
        }
        if self.cur.line_end(start) >= self.text().len() {
            return false;
        }
        let next = self.cur.next_line(start);
        let Some(underline) = SETEXT_RE
            .captures(self.cur.line(next))
            .and_then(|caps| caps.get(1))
        else {
            return false;
        };
        if underline.as_str().len() < content.chars().count() {
            return false;
        }
        let level = if underline.as_str().starts_with('=') { 1 } else { 2 };

        self.close_all();
        let seq = self.next_seq();
        let header = HeaderBuilder::setext(seq, start, level);
        let content_start = start + indent;
        let content_end = content_start + content.len();
        self.cur.set(content_start);
        self.inline_until(content_end, content_end);
        let end = self.cur.content_end(next);
        let entry = header.finish(&self.index, content_start..content_end, end);
        self.push(entry);
        self.cur.set(end);
        self.finish_line();
        true
    }

    fn horizontal_rule(&mut self) -> bool {
        let start = self.cur.pos();
        if !HR_RE.is_match(self.cur.line(start)) {
            return false;
        }
        self.close_all();
        self.emit_point(start, MarkKind::HorizontalRule);
        self.finish_line();
        true
    }

    // =========================================================================
    // Lists
    // =========================================================================

    fn list_item(&mut self) -> bool {
        let start = self.cur.pos();
        let Some(caps) = LIST_ITEM_RE.captures(self.cur.line(start)) else {
            return false;
        };
        let Some(marker) = caps.get(0) else {
            return false;
        };
        let indent = caps.get(1).map_or("", |m| m.as_str());
        let level = self.options.indent_width(indent) / 4 + 1;
        let number = match caps.get(2).map(|m| m.as_str().parse::<u64>()) {
            Some(Ok(number)) => Some(number),
            Some(Err(_)) => return false,
            None => None,
        };
        let content_start = start + marker.end();
        let end = self.cur.content_end(start);

        self.close_paragraph();
        self.close_quote();
        self.close_table();
        self.open_item(level, number, start, content_start..end);
        self.cur.set(content_start);
        self.inline_until(end, end);
        self.extend_lists(end);
        self.finish_line();
        true
    }

    /// Close deeper lists, reuse or open the list at `level`, then start a
    /// new item in it.
    fn open_item(&mut self, level: usize, number: Option<u64>, start: usize, content: Range<usize>) {
        let ordered = number.is_some();
        while self.lists.last().is_some_and(|list| list.level > level) {
            self.close_top_list();
        }
        if self
            .lists
            .last()
            .is_some_and(|list| list.level == level && list.ordered != ordered)
        {
            self.close_top_list();
        }
        if self.lists.last().map_or(true, |list| list.level < level) {
            let seq = self.next_seq();
            self.lists.push(ListBuilder::new(seq, level, ordered, start));
        }

        let closed = self
            .lists
            .last_mut()
            .and_then(|list| list.take_item(&self.index));
        if let Some(entry) = closed {
            self.push(entry);
        }
        let seq = self.next_seq();
        if let Some(list) = self.lists.last_mut() {
            list.item = Some(ItemBuilder {
                seq,
                level,
                number,
                start,
                end: content.end,
                content,
            });
        }
    }

    // =========================================================================
    // References and text
    // =========================================================================

    fn reference_definition(&mut self) -> bool {
        let start = self.cur.pos();
        let Some(caps) = REFERENCE_RE.captures(self.cur.line(start)) else {
            return false;
        };
        let label = normalize_label(caps.get(1).map_or("", |m| m.as_str()));
        if label.is_empty() {
            return false;
        }
        let target = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map_or("", |m| m.as_str())
            .to_string();
        let title = caps
            .get(4)
            .or_else(|| caps.get(5))
            .or_else(|| caps.get(6))
            .map(|m| m.as_str().to_string());

        self.close_all();
        if self
            .references
            .define(&label, target.clone(), title.clone())
            .is_some()
        {
            debug!(
                "reference [{}] redefined at line {}",
                label,
                self.position(start).line
            );
        }
        let end = self.cur.content_end(start);
        self.emit(start, end, MarkKind::Reference { label, target, title });
        self.finish_line();
        true
    }

    /// Anything else: list continuation or paragraph text.
    pub(crate) fn text_line(&mut self) -> bool {
        if self.cur.at_end() {
            return false;
        }
        let start = self.cur.pos();
        let end = self.cur.content_end(start);
        self.close_quote();
        self.close_table();

        if !self.lists.is_empty() {
            self.inline_until(end, end);
            self.extend_lists(end);
            self.finish_line();
            return true;
        }

        let bound = match self.paragraph.as_ref().map(|paragraph| paragraph.bound) {
            Some(bound) => bound,
            None => {
                let bound = self.paragraph_bound(start);
                let seq = self.next_seq();
                self.paragraph = Some(ParagraphBuilder {
                    seq,
                    start,
                    end,
                    bound,
                });
                bound
            }
        };
        if let Some(at) = self.pending_break.take() {
            self.emit_point(at, MarkKind::LineBreak);
        }
        let last = self.inline_lines(end, bound);
        if let Some(paragraph) = &mut self.paragraph {
            paragraph.end = last;
        }
        if self.options.hard_line_breaks
            && !self.line_broke
            && self.cur.line_end(last) < self.text().len()
        {
            self.pending_break = Some(last);
        }
        self.finish_line();
        true
    }

    /// Start of the first blank line after `from`, or the end of input.
    fn paragraph_bound(&self, from: usize) -> usize {
        let len = self.text().len();
        let mut line = self.cur.next_line(from);
        while line < len {
            if self.cur.is_blank_line(line) {
                return line;
            }
            line = self.cur.next_line(line);
        }
        len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_cells() {
        assert_eq!(split_cells("| a | b |"), ["a", "b"]);
        assert_eq!(split_cells("a | b"), ["a", "b"]);
        assert_eq!(split_cells("| a \\| b |"), ["a | b"]);
        assert_eq!(split_cells("| |"), [""]);
    }

    #[test]
    fn test_has_unescaped_pipe() {
        assert!(has_unescaped_pipe("a | b"));
        assert!(!has_unescaped_pipe("a \\| b"));
        assert!(has_unescaped_pipe("a \\\\| b"));
        assert!(!has_unescaped_pipe("plain"));
    }

    #[test]
    fn test_line_patterns() {
        assert!(HR_RE.is_match("---"));
        assert!(HR_RE.is_match(" * * *"));
        assert!(!HR_RE.is_match("--"));
        assert!(!HR_RE.is_match("-*-"));
        assert!(LIST_ITEM_RE.is_match("- item"));
        assert!(LIST_ITEM_RE.is_match("12. item"));
        assert!(!LIST_ITEM_RE.is_match("-item"));
        assert!(!LIST_ITEM_RE.is_match("**bold**"));
        assert!(TABLE_ALIGN_RE.is_match("|:---|---:|"));
        assert!(TABLE_ALIGN_RE.is_match("--- | :-:"));
        assert!(!TABLE_ALIGN_RE.is_match("| a | b |"));
        assert!(SETEXT_RE.is_match("===  "));
        assert!(!SETEXT_RE.is_match("=-="));
    }

    #[test]
    fn test_reference_pattern() {
        let caps = REFERENCE_RE.captures(r#"[Foo Bar]: /url "the title""#).unwrap();
        assert_eq!(&caps[1], "Foo Bar");
        assert_eq!(&caps[3], "/url");
        assert_eq!(&caps[4], "the title");

        let caps = REFERENCE_RE.captures("[x]: <a b>").unwrap();
        assert_eq!(&caps[2], "a b");
        assert!(caps.get(4).is_none());

        assert!(REFERENCE_RE.captures("[x] /url").is_none());
    }
}
