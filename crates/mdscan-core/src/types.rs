//! Source location types for mdscan

use serde::{Deserialize, Serialize};
use std::ops::Add;

/// A line/column location in the scanned text.
///
/// Both fields are 0-indexed. `column` counts bytes from the start of the
/// line, so a position always maps back to an exact byte offset through a
/// [`LineIndex`]. Ordering is lexicographic: line first, then column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Line number (0-indexed)
    pub line: usize,
    /// Byte column within the line (0-indexed)
    pub column: usize,
}

impl Position {
    /// Create a new position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Add<(usize, usize)> for Position {
    type Output = Position;

    /// Shift by a `(line_delta, column_delta)` pair.
    fn add(self, (line_delta, column_delta): (usize, usize)) -> Position {
        Position {
            line: self.line.saturating_add(line_delta),
            column: self.column.saturating_add(column_delta),
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Represents a span in the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    /// Create a new span from start and end positions
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Whether the span covers no text.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whether `pos` lies inside the span.
    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos < self.end
    }
}

/// Maps byte offsets to [`Position`]s and back.
///
/// # Example
///
/// ```
/// use mdscan_core::{LineIndex, Position};
///
/// let index = LineIndex::new("one\ntwo");
/// assert_eq!(index.position(5), Position::new(1, 1));
/// assert_eq!(index.offset(Position::new(1, 1)), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    /// Build the index for `text`.
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            starts,
            len: text.len(),
        }
    }

    /// Position of a byte offset. Offsets past the end clamp to the end.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.len);
        let line = match self.starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        Position::new(line, offset - self.starts[line])
    }

    /// Byte offset of a position. Positions past the end clamp to the end.
    pub fn offset(&self, pos: Position) -> usize {
        self.starts
            .get(pos.line)
            .map(|start| (start + pos.column).min(self.len))
            .unwrap_or(self.len)
    }

    /// Byte offset where `line` starts.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.starts.get(line).copied()
    }

    /// Number of lines (a trailing newline opens one more, empty, line).
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }
}
