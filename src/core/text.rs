//! Text coordinates.
//!
//! Positions are `(row, col)` pairs counted in chars, with `col` allowed to sit
//! one past the last char of a line (the end-of-line position).

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}

/// A half-open range of text from `start` up to (not including) `end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: Coord,
    pub end: Coord,
}

impl Span {
    /// Build a span, swapping the ends if they are given backwards.
    pub fn new(a: Coord, b: Coord) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Zero-width span at `at`.
    pub fn point(at: Coord) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Cursor positions of one buffer, kept as per-buffer extension state.
///
/// Inserting text through a buffer action writes at every cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursors(pub Vec<Span>);

impl Default for Cursors {
    fn default() -> Self {
        Cursors(vec![Span::point(Coord::new(0, 0))])
    }
}

impl Cursors {
    /// Position of the first cursor.
    pub fn primary(&self) -> Coord {
        self.0.first().map(|span| span.start).unwrap_or_default()
    }
}
