//! Byte cursor over the scanned text.
//!
//! The cursor only ever rests on `char` boundaries. All the markup the
//! scanner looks for is ASCII, so byte-wise lookahead never splits a
//! multi-byte character.

/// Saved cursor state, restored when a recognizer fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// A position in the text plus line-oriented lookahead helpers.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn set(&mut self, pos: usize) {
        debug_assert!(self.text.is_char_boundary(pos.min(self.text.len())));
        self.pos = pos.min(self.text.len());
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.pos)
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.0;
    }

    /// Text from the cursor to the end of input.
    pub fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// The `n`th character after the cursor (0 = current).
    pub fn peek_at(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    /// Character immediately before byte offset `at`.
    pub fn char_before(&self, at: usize) -> Option<char> {
        self.text[..at].chars().next_back()
    }

    /// Character starting at byte offset `at`.
    pub fn char_at(&self, at: usize) -> Option<char> {
        self.text.get(at..).and_then(|s| s.chars().next())
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    /// Consume characters while `pred` holds; returns the bytes consumed.
    pub fn eat_while(&mut self, mut pred: impl FnMut(char) -> bool) -> usize {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        self.pos - start
    }

    /// Consume up to `max` occurrences of `expected`; returns how many.
    pub fn eat_up_to(&mut self, expected: char, max: usize) -> usize {
        let mut count = 0;
        while count < max && self.eat(expected) {
            count += 1;
        }
        count
    }

    /// Length of the run of the ASCII character `ch` starting at `at`.
    pub fn run_len(&self, at: usize, ch: u8) -> usize {
        self.text.as_bytes()[at.min(self.text.len())..]
            .iter()
            .take_while(|b| **b == ch)
            .count()
    }

    /// Offset of the `\n` ending the line that contains `from`, or the end
    /// of input.
    pub fn line_end(&self, from: usize) -> usize {
        self.text[from..]
            .find('\n')
            .map(|i| from + i)
            .unwrap_or(self.text.len())
    }

    /// Like [`line_end`](Self::line_end) but excluding a `\r` before the
    /// newline.
    pub fn content_end(&self, from: usize) -> usize {
        let end = self.line_end(from);
        if end > from && self.text.as_bytes()[end - 1] == b'\r' {
            end - 1
        } else {
            end
        }
    }

    /// Start of the line after the one containing `from`.
    pub fn next_line(&self, from: usize) -> usize {
        (self.line_end(from) + 1).min(self.text.len())
    }

    /// The line containing `from`, from `from` to its content end.
    pub fn line(&self, from: usize) -> &'a str {
        &self.text[from..self.content_end(from)]
    }

    pub fn is_blank_line(&self, from: usize) -> bool {
        self.line(from).chars().all(|c| c == ' ' || c == '\t')
    }

    /// Move past the rest of the current line and its newline.
    pub fn skip_line(&mut self) {
        self.pos = self.next_line(self.pos);
    }
}
