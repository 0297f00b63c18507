//! Inline recognizers.
//!
//! `limit` is where the current line's text ends; `bound` is how far a
//! recognizer may look for a closing delimiter (the line, or the end of
//! the paragraph).

use crate::builders::{DelimiterKind, PendingDelimiter};
use crate::context::Context;
use crate::cursor::Cursor;
use log::{debug, trace};
use mdscan_core::{normalize_label, MarkKind};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// Named, decimal or hexadecimal character reference
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^&(?:#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});").unwrap()
});

/// `<scheme://...>`
static URL_AUTOLINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<([A-Za-z][A-Za-z0-9+.-]{1,31}:[^<>\s]+)>").unwrap());

/// `<user@host>`
static EMAIL_AUTOLINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^<([A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*)>",
    )
    .unwrap()
});

/// Opening tag; group 2 holds the `/` of a self-closing tag
static OPENING_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<([A-Za-z][A-Za-z0-9-]*)(?:\s+[A-Za-z_:][^<>]*?)?\s*(/?)>").unwrap()
});

/// Closing tag
static CLOSING_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^</([A-Za-z][A-Za-z0-9-]*)\s*>").unwrap());

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Characters that may start an inline construct.
const SPECIAL: &[char] = &['\\', '*', '_', '~', '`', '[', '!', '<', '&'];

fn by_reference(image: bool, text: String, label: String) -> MarkKind {
    if image {
        MarkKind::ImageByReference {
            alt: text,
            label,
            target: None,
            title: None,
        }
    } else {
        MarkKind::LinkByReference {
            text,
            label,
            target: None,
            title: None,
        }
    }
}

fn skip_link_space(cur: &mut Cursor<'_>, bound: usize) -> usize {
    let start = cur.pos();
    while cur.pos() < bound && cur.peek().is_some_and(char::is_whitespace) {
        cur.bump();
    }
    cur.pos() - start
}

/// `target "title")` after the opening parenthesis.
fn link_destination(cur: &mut Cursor<'_>, bound: usize) -> Option<(String, Option<String>)> {
    skip_link_space(cur, bound);
    let target = if cur.eat('<') {
        let start = cur.pos();
        let len = cur.rest().find(|c: char| c == '>' || c == '\n')?;
        if cur.char_at(start + len) != Some('>') {
            return None;
        }
        cur.set(start + len + 1);
        cur.text()[start..start + len].to_string()
    } else {
        let start = cur.pos();
        let mut depth = 0usize;
        while cur.pos() < bound {
            match cur.peek() {
                None => break,
                Some(c) if c.is_whitespace() => break,
                Some('(') => depth += 1,
                Some(')') if depth == 0 => break,
                Some(')') => depth -= 1,
                Some('\\') => {
                    cur.bump();
                }
                Some(_) => {}
            }
            cur.bump();
        }
        cur.text()[start..cur.pos()].to_string()
    };

    let spaced = skip_link_space(cur, bound) > 0;
    let title = match cur.peek() {
        Some(quote @ ('"' | '\'' | '(')) if spaced => {
            let closer = if quote == '(' { ')' } else { quote };
            cur.bump();
            let start = cur.pos();
            let len = cur.text()[start..bound.max(start)].find(closer)?;
            cur.set(start + len + 1);
            skip_link_space(cur, bound);
            Some(cur.text()[start..start + len].to_string())
        }
        _ => None,
    };
    if !cur.eat(')') {
        return None;
    }
    Some((target, title))
}

impl Context<'_> {
    /// Scan inline content up to `limit`.
    pub(crate) fn inline_until(&mut self, limit: usize, bound: usize) {
        while self.cur.pos() < limit {
            if self.delimiter_closer() || self.inline_element(limit, bound) {
                continue;
            }
            self.plain_text(limit);
        }
    }

    /// Like [`inline_until`](Self::inline_until), following constructs
    /// that carry the cursor onto later lines. Returns the text end of the
    /// line the scan finished on.
    pub(crate) fn inline_lines(&mut self, limit: usize, bound: usize) -> usize {
        let mut limit = limit;
        loop {
            self.inline_until(limit, bound);
            let pos = self.cur.pos();
            if pos <= limit {
                return limit;
            }
            limit = self.cur.content_end(pos).max(pos);
        }
    }

    fn inline_element(&mut self, limit: usize, bound: usize) -> bool {
        match self.cur.peek() {
            Some('&') => self.html_entity(limit),
            Some('<') => self.autolink() || self.html_tag(bound),
            Some('*' | '_') => self.emphasis(bound),
            Some('~') => self.strikethrough(bound),
            Some('`') => self.inline_code(bound),
            Some('\\') => self.escape(limit),
            Some('!') => self.image(bound),
            Some('[') => self.link(bound),
            Some(' ') => self.line_break(limit),
            _ => false,
        }
    }

    /// Text with no markup. A delimiter run that failed to open anything is
    /// consumed whole so its tail cannot open a shorter construct.
    fn plain_text(&mut self, limit: usize) {
        let start = self.cur.pos();
        let Some(first) = self.cur.peek() else {
            return;
        };
        let next_closer = self
            .delimiters
            .iter()
            .map(|pending| pending.close.start)
            .filter(|close| *close > start)
            .min()
            .unwrap_or(usize::MAX);

        if matches!(first, '*' | '_' | '~' | '`') {
            let run = self.cur.run_len(start, first as u8);
            self.cur.set((start + run).min(limit.max(start + 1)).min(next_closer));
            return;
        }

        let text = self.text();
        let trailing = start + text[start..limit].trim_end_matches(' ').len();
        let mut pos = start + first.len_utf8();
        while pos < limit {
            let Some(c) = text[pos..].chars().next() else {
                break;
            };
            if SPECIAL.contains(&c) || (c == ' ' && pos == trailing) {
                break;
            }
            pos += c.len_utf8();
        }
        self.cur.set(pos);
    }

    // =========================================================================
    // Delimiter runs
    // =========================================================================

    /// Confirm a pending opener whose closer the scan has reached.
    fn delimiter_closer(&mut self) -> bool {
        let pos = self.cur.pos();
        self.delimiters.retain(|pending| {
            let reachable = pending.close.start >= pos;
            if !reachable {
                debug!(
                    "dropping {:?} opener at offset {}: closer was skipped",
                    pending.kind, pending.open.start
                );
            }
            reachable
        });
        let Some(found) = self
            .delimiters
            .iter()
            .rposition(|pending| pending.close.start == pos)
        else {
            return false;
        };

        let pending = self.delimiters.remove(found);
        self.cur.set(pending.close.end);
        for mark in pending.finish(&self.index) {
            let seq = self.next_seq();
            self.push((seq, mark));
        }
        true
    }

    /// Register an opener; rejected if its closer lies beyond the closer of
    /// an enclosing pending delimiter.
    fn open_delimiter(&mut self, kind: DelimiterKind, open: Range<usize>, close: Range<usize>) -> bool {
        if self
            .delimiters
            .iter()
            .any(|pending| pending.close.start < close.end)
        {
            trace!("{:?} at offset {} would cross an enclosing delimiter", kind, open.start);
            return false;
        }
        self.cur.set(open.end);
        self.delimiters.push(PendingDelimiter { kind, open, close });
        true
    }

    /// `*em*`, `**strong**`, `***both***` and the `_` forms.
    fn emphasis(&mut self, bound: usize) -> bool {
        let pos = self.cur.pos();
        let Some(ch) = self.cur.peek() else {
            return false;
        };
        let run = self.cur.run_len(pos, ch as u8);
        let Some(kind) = DelimiterKind::from_run(run) else {
            return false;
        };
        let after = pos + run;
        if !self.cur.char_at(after).is_some_and(|c| !c.is_whitespace()) {
            return false;
        }
        if ch == '_' && self.cur.char_before(pos).is_some_and(char::is_alphanumeric) {
            return false;
        }
        match self.find_closer(after, bound, ch as u8, run) {
            Some(close) => self.open_delimiter(kind, pos..after, close..close + run),
            None => false,
        }
    }

    fn strikethrough(&mut self, bound: usize) -> bool {
        if !self.options.strikethrough {
            return false;
        }
        let pos = self.cur.pos();
        if self.cur.run_len(pos, b'~') != 2 {
            return false;
        }
        let after = pos + 2;
        if !self.cur.char_at(after).is_some_and(|c| !c.is_whitespace()) {
            return false;
        }
        match self.find_closer(after, bound, b'~', 2) {
            Some(close) => {
                self.open_delimiter(DelimiterKind::Strikethrough, pos..after, close..close + 2)
            }
            None => false,
        }
    }

    /// First run of exactly `len` copies of `ch` after `from` that can close
    /// a delimiter. Escapes, code spans and links are skipped.
    fn find_closer(&self, from: usize, bound: usize, ch: u8, len: usize) -> Option<usize> {
        let bytes = self.text().as_bytes();
        let bound = bound.min(bytes.len());
        let mut i = from;
        while i < bound {
            match bytes[i] {
                b'\\' => i += 2,
                b'`' => {
                    let run = self.cur.run_len(i, b'`');
                    i = match self.find_code_close(i + run, bound, run) {
                        Some(close) => close + run,
                        None => i + run,
                    };
                }
                b'[' => i = self.link_span_end(i, bound).unwrap_or(i + 1),
                b if b == ch => {
                    let run = self.cur.run_len(i, ch).min(bound - i);
                    if run == len
                        && self.can_close(i, run, ch)
                        && !self.delimiters.iter().any(|pending| pending.close.start == i)
                    {
                        return Some(i);
                    }
                    i += run;
                }
                _ => i += 1,
            }
        }
        None
    }

    fn can_close(&self, at: usize, run: usize, ch: u8) -> bool {
        let after_text = self.cur.char_before(at).is_some_and(|c| !c.is_whitespace());
        let intraword = ch == b'_' && self.cur.char_at(at + run).is_some_and(char::is_alphanumeric);
        after_text && !intraword
    }

    // =========================================================================
    // Code, escapes, entities, HTML
    // =========================================================================

    fn find_code_close(&self, from: usize, bound: usize, len: usize) -> Option<usize> {
        let bytes = self.text().as_bytes();
        let bound = bound.min(bytes.len());
        let mut i = from;
        while i < bound {
            if bytes[i] == b'`' {
                let run = self.cur.run_len(i, b'`');
                if run == len {
                    return Some(i);
                }
                i += run;
            } else {
                i += 1;
            }
        }
        None
    }

    /// A backtick run closed by a run of the same length.
    fn inline_code(&mut self, bound: usize) -> bool {
        let pos = self.cur.pos();
        let run = self.cur.run_len(pos, b'`');
        let Some(close) = self.find_code_close(pos + run, bound, run) else {
            return false;
        };

        let code = self.text()[pos + run..close]
            .replace("\r\n", " ")
            .replace('\n', " ");
        let padded = code.len() >= 2
            && code.starts_with(' ')
            && code.ends_with(' ')
            && !code.trim().is_empty();
        let code = if padded {
            code[1..code.len() - 1].to_string()
        } else {
            code
        };
        let end = close + run;
        self.emit(pos, end, MarkKind::InlineCode { code });
        self.cur.set(end);
        true
    }

    /// Backslash before ASCII punctuation.
    fn escape(&mut self, limit: usize) -> bool {
        let pos = self.cur.pos();
        match self.cur.char_at(pos + 1) {
            Some(ch) if pos + 1 < limit && ch.is_ascii_punctuation() => {
                self.emit(pos, pos + 2, MarkKind::Escape { ch });
                self.cur.set(pos + 2);
                true
            }
            _ => false,
        }
    }

    fn html_entity(&mut self, limit: usize) -> bool {
        let pos = self.cur.pos();
        let Some(found) = ENTITY_RE.find(&self.text()[pos..limit.max(pos)]) else {
            return false;
        };
        let end = pos + found.end();
        self.emit(
            pos,
            end,
            MarkKind::HtmlEntity {
                entity: found.as_str().to_string(),
            },
        );
        self.cur.set(end);
        true
    }

    fn autolink(&mut self) -> bool {
        if !self.options.autolinks {
            return false;
        }
        let pos = self.cur.pos();
        let rest = self.cur.rest();
        let (caps, is_email) = match URL_AUTOLINK_RE.captures(rest) {
            Some(caps) => (caps, false),
            None => match EMAIL_AUTOLINK_RE.captures(rest) {
                Some(caps) => (caps, true),
                None => return false,
            },
        };
        let (Some(whole), Some(target)) = (caps.get(0), caps.get(1)) else {
            return false;
        };
        let end = pos + whole.end();
        self.emit(
            pos,
            end,
            MarkKind::AutoLink {
                target: target.as_str().to_string(),
                is_email,
            },
        );
        self.cur.set(end);
        true
    }

    /// A comment, a closing tag, or an opening tag extended to its matching
    /// closing tag when one follows within `bound`.
    fn html_tag(&mut self, bound: usize) -> bool {
        if !self.options.html {
            return false;
        }
        let pos = self.cur.pos();
        let window = &self.text()[pos..bound.max(pos)];

        let (name, end) = if let Some(body) = window.strip_prefix("<!--") {
            match body.find("-->") {
                Some(close) => ("!--".to_string(), pos + 4 + close + 3),
                None => return false,
            }
        } else if let Some(caps) = CLOSING_TAG_RE.captures(window) {
            (caps[1].to_ascii_lowercase(), pos + caps[0].len())
        } else if let Some(caps) = OPENING_TAG_RE.captures(window) {
            let name = caps[1].to_ascii_lowercase();
            let tag_end = caps[0].len();
            let self_closing = !caps[2].is_empty() || VOID_ELEMENTS.contains(&name.as_str());
            let end = if self_closing {
                tag_end
            } else {
                let closing = format!("</{}>", name);
                match window[tag_end..].to_ascii_lowercase().find(&closing) {
                    Some(at) => tag_end + at + closing.len(),
                    None => {
                        debug!("<{}> at offset {} has no closing tag", name, pos);
                        tag_end
                    }
                }
            };
            (name, pos + end)
        } else {
            return false;
        };

        self.emit(pos, end, MarkKind::HtmlTag { name });
        self.cur.set(end);
        true
    }

    // =========================================================================
    // Links and images
    // =========================================================================

    fn link(&mut self, bound: usize) -> bool {
        self.attempt(|ctx| ctx.link_body(bound, false)).is_some()
    }

    fn image(&mut self, bound: usize) -> bool {
        if self.cur.peek_at(1) != Some('[') {
            return false;
        }
        self.attempt(|ctx| ctx.link_body(bound, true)).is_some()
    }

    fn link_body(&mut self, bound: usize, image: bool) -> Option<()> {
        let start = self.cur.pos();
        if image {
            self.cur.bump();
        }
        let open = self.cur.pos();
        let close = self.find_bracket_close(open, bound)?;
        let text = self.text()[open + 1..close].to_string();
        self.cur.set(close + 1);

        let kind = if self.cur.eat('(') {
            let (target, title) = link_destination(&mut self.cur, bound)?;
            match (image, title) {
                (true, title) => MarkKind::Image {
                    alt: text,
                    target,
                    title,
                },
                (false, Some(title)) => MarkKind::LinkWithTitle {
                    text,
                    target,
                    title,
                },
                (false, None) => MarkKind::Link { text, target },
            }
        } else if self.cur.peek() == Some('[') {
            let label_open = self.cur.pos();
            let label_close = self.find_label_close(label_open, bound)?;
            let label = &self.text()[label_open + 1..label_close];
            let label = if label.trim().is_empty() {
                normalize_label(&text)
            } else {
                normalize_label(label)
            };
            self.cur.set(label_close + 1);
            by_reference(image, text, label)
        } else {
            if text.trim().is_empty() {
                return None;
            }
            let label = normalize_label(&text);
            by_reference(image, text, label)
        };

        let end = self.cur.pos();
        self.emit(start, end, kind);
        Some(())
    }

    /// Matching `]` for the `[` at `open`, honoring nesting.
    fn find_bracket_close(&self, open: usize, bound: usize) -> Option<usize> {
        let bytes = self.text().as_bytes();
        let bound = bound.min(bytes.len());
        let mut depth = 0usize;
        let mut i = open + 1;
        while i < bound {
            match bytes[i] {
                b'\\' => {
                    i += 2;
                    continue;
                }
                b'`' => {
                    let run = self.cur.run_len(i, b'`');
                    i = match self.find_code_close(i + run, bound, run) {
                        Some(close) => close + run,
                        None => i + run,
                    };
                    continue;
                }
                b'[' => depth += 1,
                b']' if depth == 0 => return Some(i),
                b']' => depth -= 1,
                _ => {}
            }
            i += 1;
        }
        None
    }

    /// End of the link or image text starting with the `[` at `open`,
    /// including its destination or label. Mirrors `link_body` without
    /// emitting anything.
    fn link_span_end(&self, open: usize, bound: usize) -> Option<usize> {
        let close = self.find_bracket_close(open, bound)?;
        let mut cur = self.cur.clone();
        cur.set(close + 1);
        if cur.eat('(') {
            link_destination(&mut cur, bound)?;
        } else if cur.peek() == Some('[') {
            let label_close = self.find_label_close(cur.pos(), bound)?;
            cur.set(label_close + 1);
        } else if self.text()[open + 1..close].trim().is_empty() {
            return None;
        }
        Some(cur.pos())
    }

    /// Closing `]` of a reference label; labels do not nest.
    fn find_label_close(&self, open: usize, bound: usize) -> Option<usize> {
        let bytes = self.text().as_bytes();
        let bound = bound.min(bytes.len());
        let mut i = open + 1;
        while i < bound {
            match bytes[i] {
                b'\\' => i += 2,
                b'[' => return None,
                b']' => return Some(i),
                _ => i += 1,
            }
        }
        None
    }

    // =========================================================================
    // Line breaks
    // =========================================================================

    /// Two or more spaces ending a line that is followed by more text.
    fn line_break(&mut self, limit: usize) -> bool {
        let pos = self.cur.pos();
        let spaces = &self.text()[pos..limit.max(pos)];
        if spaces.len() < 2 || !spaces.bytes().all(|b| b == b' ') {
            return false;
        }
        let next = self.cur.next_line(pos);
        if next >= self.text().len() || self.cur.is_blank_line(next) {
            return false;
        }
        self.emit_point(pos, MarkKind::LineBreak);
        self.cur.set(limit);
        self.line_broke = true;
        true
    }
}
