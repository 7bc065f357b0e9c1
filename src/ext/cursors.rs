//! Cursor movement over each focused buffer's [`Cursors`].

use crate::core::action::{Action, BufAction};
use crate::core::buffer::Buffer;
use crate::core::events::Command;
use crate::core::text::{Coord, Cursors, Span};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
}

impl Motion {
    pub fn from_command(name: &str) -> Option<Motion> {
        match name {
            "backward-char" => Some(Motion::Left),
            "forward-char" => Some(Motion::Right),
            "previous-line" => Some(Motion::Up),
            "next-line" => Some(Motion::Down),
            "beginning-of-line" => Some(Motion::LineStart),
            "end-of-line" => Some(Motion::LineEnd),
            _ => None,
        }
    }

    /// Where a cursor at `at` ends up in `buffer`
    pub fn apply(self, buffer: &Buffer, at: Coord) -> Coord {
        let at = buffer.clamp(at);
        let line_len = |row| buffer.line_len(row).unwrap_or(0);
        match self {
            Motion::Left if at.col > 0 => Coord::new(at.row, at.col - 1),
            Motion::Left if at.row > 0 => Coord::new(at.row - 1, line_len(at.row - 1)),
            Motion::Right if at.col < line_len(at.row) => Coord::new(at.row, at.col + 1),
            Motion::Right if at.row + 1 < buffer.line_count() => Coord::new(at.row + 1, 0),
            Motion::Up if at.row > 0 => buffer.clamp(Coord::new(at.row - 1, at.col)),
            Motion::Down if at.row + 1 < buffer.line_count() => {
                buffer.clamp(Coord::new(at.row + 1, at.col))
            }
            Motion::LineStart => Coord::new(at.row, 0),
            Motion::LineEnd => Coord::new(at.row, line_len(at.row)),
            _ => at,
        }
    }
}

pub fn install(act: &mut Action<'_>) {
    act.add_listener(|act: &mut Action<'_>, cmd: &Command| {
        if let Some(motion) = Motion::from_command(&cmd.0) {
            act.focused_do(|b| move_cursors(b, motion))?;
        }
        Ok(())
    });
}

/// Move every cursor of the current buffer, collapsing selections
pub fn move_cursors(b: &mut BufAction<'_>, motion: Motion) -> Result<()> {
    let cursors = b.get_buf_ext::<Cursors>()?;
    let buffer = b.buffer()?;
    let moved = cursors
        .0
        .iter()
        .map(|span| Span::point(motion.apply(buffer, span.start)))
        .collect();
    b.set_buf_ext(Cursors(moved))
}
