//! Terminal rendering module
//!
//! Draws the first focused buffer and a status line with crossterm. Every
//! frame is a full redraw; the bottom row is the status line.

use std::io::Write;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{Clear, ClearType};
use crossterm::queue;
use unicode_width::UnicodeWidthChar;

use crate::error::Result;
use crate::ext::status::{Frame, Renderer};

pub struct TerminalRenderer<W: Write> {
    out: W,
    /// Fixed size, or `None` to ask the terminal on each frame
    size: Option<(u16, u16)>,
}

impl TerminalRenderer<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout(), None)
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, size: Option<(u16, u16)>) -> Self {
        Self { out, size }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn size(&self) -> Result<(u16, u16)> {
        match self.size {
            Some(size) => Ok(size),
            None => Ok(crossterm::terminal::size()?),
        }
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn draw(&mut self, frame: &Frame) -> Result<()> {
        let (cols, rows) = self.size()?;
        if cols == 0 || rows == 0 {
            return Ok(());
        }
        let text_rows = usize::from(rows - 1);
        let width = usize::from(cols);

        queue!(self.out, Hide, Clear(ClearType::All))?;

        let view = frame.primary();
        let cursor = view
            .and_then(|v| v.cursors.first().copied())
            .unwrap_or_default();
        // Scroll just enough to keep the cursor row on screen
        let top = (cursor.row + 1).saturating_sub(text_rows);

        if let Some(view) = view {
            for (y, line) in view.text.lines().skip(top).take(text_rows).enumerate() {
                queue!(self.out, MoveTo(0, y as u16), Print(fit(line, width)))?;
            }
        }

        let label = match view {
            Some(v) if v.modified => format!(" {} [+]", v.name),
            Some(v) => format!(" {}", v.name),
            None => " (no buffer)".to_string(),
        };
        let mut status = if frame.status.is_empty() {
            label
        } else {
            format!("{}  {}", label, frame.status)
        };
        status = fit(&status, width);
        let padding = width - display_width(&status);
        status.extend(std::iter::repeat_n(' ', padding));
        queue!(
            self.out,
            MoveTo(0, rows - 1),
            SetAttribute(Attribute::Reverse),
            Print(status),
            SetAttribute(Attribute::Reset)
        )?;

        if let Some(view) = view {
            let line = view.text.lines().nth(cursor.row).unwrap_or("");
            let before: String = line.chars().take(cursor.col).collect();
            let x = display_width(&before).min(width - 1) as u16;
            let y = cursor.row.saturating_sub(top) as u16;
            queue!(self.out, MoveTo(x, y), Show)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

fn char_width(c: char) -> usize {
    UnicodeWidthChar::width(c).unwrap_or(0)
}

fn display_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// The longest prefix of `s` that fits in `width` columns
fn fit(s: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for c in s.chars() {
        used += char_width(c);
        if used > width {
            break;
        }
        out.push(c);
    }
    out
}
