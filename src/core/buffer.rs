//! Buffer: text storage for one editor buffer
//! Holds only text and file metadata; cursors and everything else extensions
//! care about live in the buffer's extension state.
//!
//! Backed by a ropey Rope, which gives O(log n) line and char lookups.

use ropey::Rope;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::text::{Coord, Span};
use crate::error::{Error, Result};

/// Text content plus the little metadata the runtime needs
#[derive(Debug)]
pub struct Buffer {
    /// Text content stored in a Rope (O(log n) operations)
    rope: Rope,
    /// Filename (if loaded from file)
    pub filename: Option<PathBuf>,
    /// Dirty flag (true if buffer has changes since load)
    pub modified: bool,
    /// Version counter bumped on every edit
    pub version: u64,
}

impl Default for Buffer {
    fn default() -> Self {
        Self {
            rope: Rope::new(),
            filename: None,
            modified: false,
            version: 0,
        }
    }
}

impl Buffer {
    /// Create a new empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer from a string
    pub fn from_string(content: impl AsRef<str>) -> Self {
        Self {
            rope: Rope::from_str(content.as_ref()),
            ..Self::default()
        }
    }

    /// Load a buffer from a file
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            return Err(Error::Config(format!(
                "Path is a directory, not a file: {}",
                path.display()
            )));
        }

        let bytes = fs::read(path)?;
        let content = String::from_utf8_lossy(&bytes);

        Ok(Self {
            rope: Rope::from_str(&content),
            filename: Some(path.to_path_buf()),
            ..Self::default()
        })
    }

    // ==================== Content Access ====================

    /// Total length in chars
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Entire content as a string
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Number of lines; an empty buffer has one
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Content of a line without its line terminator
    pub fn line(&self, row: usize) -> Option<String> {
        let len = self.line_len(row)?;
        Some(self.rope.line(row).slice(..len).to_string())
    }

    /// Length of a line in chars, not counting the line terminator
    pub fn line_len(&self, row: usize) -> Option<usize> {
        if row >= self.rope.len_lines() {
            return None;
        }
        let line = self.rope.line(row);
        let mut len = line.len_chars();
        if len > 0 && is_line_break(line.char(len - 1)) {
            len -= 1;
            if line.char(len) == '\n' && len > 0 && line.char(len - 1) == '\r' {
                len -= 1;
            }
        }
        Some(len)
    }

    // ==================== Coordinates ====================

    /// Char offset of a coordinate
    pub fn coord_to_char(&self, at: Coord) -> Result<usize> {
        let invalid = || Error::InvalidPosition {
            row: at.row,
            col: at.col,
        };
        let line_len = self.line_len(at.row).ok_or_else(invalid)?;
        if at.col > line_len {
            return Err(invalid());
        }
        Ok(self.rope.line_to_char(at.row) + at.col)
    }

    /// Coordinate of a char offset, clamped to the end of the buffer
    pub fn char_to_coord(&self, offset: usize) -> Coord {
        let offset = offset.min(self.rope.len_chars());
        let row = self.rope.char_to_line(offset);
        Coord::new(row, offset - self.rope.line_to_char(row))
    }

    /// Clamp a coordinate into the buffer
    pub fn clamp(&self, at: Coord) -> Coord {
        let row = at.row.min(self.line_count().saturating_sub(1));
        let col = at.col.min(self.line_len(row).unwrap_or(0));
        Coord::new(row, col)
    }

    // ==================== Editing Operations ====================

    /// Char offsets of the ends of `span`, lower first
    fn char_bounds(&self, span: Span) -> Result<(usize, usize)> {
        let a = self.coord_to_char(span.start)?;
        let b = self.coord_to_char(span.end)?;
        Ok((a.min(b), a.max(b)))
    }

    /// Text between the ends of `span`, in either order
    pub fn read_range(&self, span: Span) -> Result<String> {
        let (start, end) = self.char_bounds(span)?;
        Ok(self.rope.slice(start..end).to_string())
    }

    /// Insert text at a coordinate
    pub fn insert_at(&mut self, at: Coord, text: &str) -> Result<()> {
        let offset = self.coord_to_char(at)?;
        self.insert_char_offset(offset, text);
        Ok(())
    }

    /// Insert text at a char offset, clamped to the end of the buffer
    pub fn insert_char_offset(&mut self, offset: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let offset = offset.min(self.rope.len_chars());
        self.rope.insert(offset, text);
        self.mark_modified();
    }

    /// Remove the text in `span` and return it
    pub fn delete_range(&mut self, span: Span) -> Result<String> {
        let (start, end) = self.char_bounds(span)?;
        Ok(self.delete_char_range(start, end))
    }

    /// Remove chars `start..end` (clamped) and return them
    pub fn delete_char_range(&mut self, start: usize, end: usize) -> String {
        let end = end.min(self.rope.len_chars());
        if start >= end {
            return String::new();
        }
        let removed = self.rope.slice(start..end).to_string();
        self.rope.remove(start..end);
        self.mark_modified();
        removed
    }

    /// Replace the text in `span` with `text`
    pub fn replace_range(&mut self, span: Span, text: &str) -> Result<String> {
        let (start, end) = self.char_bounds(span)?;
        let removed = self.delete_char_range(start, end);
        self.insert_char_offset(start, text);
        Ok(removed)
    }

    fn mark_modified(&mut self) {
        self.modified = true;
        self.version = self.version.wrapping_add(1);
    }

    /// Name shown by renderers
    pub fn display_name(&self) -> String {
        self.filename
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "*scratch*".to_string())
    }
}

/// Every char ropey ends a line on
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}
