//! Text entry: plain typing plus the `newline`, `indent`, `delete-backward`
//! and `delete-forward` commands, applied at every cursor of each focused
//! buffer.

use crate::config::Config;
use crate::core::action::{Action, BufAction};
use crate::core::events::Command;
use crate::core::input::Keypress;
use crate::core::text::{Cursors, Span};
use crate::error::Result;
use crate::ext::bindings::KeyConsumed;

/// Global state: spaces inserted by `indent`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabWidth(pub usize);

impl Default for TabWidth {
    fn default() -> Self {
        TabWidth(4)
    }
}

pub fn install(act: &mut Action<'_>, config: &Config) -> Result<()> {
    let width = config.get_usize_or("tab_width", TabWidth::default().0)?;
    act.set_ext(TabWidth(width));

    act.add_listener(|act: &mut Action<'_>, key: &Keypress| {
        let Some(c) = key.printable() else {
            return Ok(());
        };
        if act.get_ext::<KeyConsumed>()?.0 {
            return Ok(());
        }
        let mut text = [0u8; 4];
        let text: &str = c.encode_utf8(&mut text);
        act.focused_do(|b| b.insert_text(text))?;
        Ok(())
    });

    act.add_listener(|act: &mut Action<'_>, cmd: &Command| {
        match cmd.0.as_str() {
            "newline" => {
                act.focused_do(|b| b.insert_text("\n"))?;
            }
            "indent" => {
                let indent = " ".repeat(act.get_ext::<TabWidth>()?.0);
                act.focused_do(|b| b.insert_text(&indent))?;
            }
            "delete-backward" => {
                act.focused_do(delete_backward)?;
            }
            "delete-forward" => {
                act.focused_do(delete_forward)?;
            }
            _ => {}
        }
        Ok(())
    });
    Ok(())
}

/// Delete the char before every cursor
pub fn delete_backward(b: &mut BufAction<'_>) -> Result<()> {
    delete_at_cursors(b, |offset, _| offset.checked_sub(1))
}

/// Delete the char after every cursor
pub fn delete_forward(b: &mut BufAction<'_>) -> Result<()> {
    delete_at_cursors(b, |offset, len| (offset < len).then_some(offset))
}

/// Delete one char per cursor, at the offset `target` picks.
///
/// Cursors sharing a target delete it once. Deletions run back to front so
/// earlier offsets stay valid.
fn delete_at_cursors(
    b: &mut BufAction<'_>,
    target: impl Fn(usize, usize) -> Option<usize>,
) -> Result<()> {
    let cursors = b.get_buf_ext::<Cursors>()?;
    let buffer = b.buffer_mut()?;
    let len = buffer.len_chars();

    let mut offsets = Vec::with_capacity(cursors.0.len());
    for span in &cursors.0 {
        offsets.push(buffer.coord_to_char(buffer.clamp(span.start))?);
    }
    let mut doomed: Vec<usize> = offsets.iter().filter_map(|o| target(*o, len)).collect();
    doomed.sort_unstable();
    doomed.dedup();
    for at in doomed.iter().rev() {
        buffer.delete_char_range(*at, at + 1);
    }

    let moved = offsets
        .iter()
        .map(|offset| {
            let shift = doomed.iter().filter(|d| **d < *offset).count();
            Span::point(buffer.char_to_coord(offset - shift))
        })
        .collect();
    b.set_buf_ext(Cursors(moved))
}
