//! A copy register per buffer.
//!
//! `copy` stores the primary cursor's line (or its selection, when it has
//! one) in the buffer's own [`CopyPasta`] and announces it with a global
//! [`Copied`] event. `paste` inserts the register at every cursor. Copying in
//! one buffer never changes what another buffer pastes.

use crate::core::action::{Action, BufAction};
use crate::core::events::Command;
use crate::core::text::Cursors;
use crate::error::Result;
use crate::ext::status::StatusMessage;

/// Buffer state: the register
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyPasta(pub String);

/// Dispatched globally whenever a buffer's register changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Copied(pub String);

pub fn install(act: &mut Action<'_>) {
    act.add_listener(|act: &mut Action<'_>, cmd: &Command| {
        match cmd.0.as_str() {
            "copy" => {
                act.focused_do(copy)?;
            }
            "paste" => {
                act.focused_do(paste)?;
            }
            _ => {}
        }
        Ok(())
    });

    act.add_listener(|act: &mut Action<'_>, copied: &Copied| {
        act.set_ext(StatusMessage(format!(
            "copied {} chars",
            copied.0.chars().count()
        )));
        Ok(())
    });
}

pub fn copy(b: &mut BufAction<'_>) -> Result<()> {
    let cursor = b.get_buf_ext::<Cursors>()?.0.first().copied().unwrap_or_default();
    let text = if cursor.is_empty() {
        b.buffer()?.line(cursor.start.row).unwrap_or_default()
    } else {
        b.read_range(cursor)?
    };
    tracing::debug!(buf = %b.buf_ref(), chars = text.chars().count(), "copied");
    b.set_buf_ext(CopyPasta(text.clone()))?;
    b.dispatch(Copied(text))
}

pub fn paste(b: &mut BufAction<'_>) -> Result<()> {
    let CopyPasta(text) = b.get_buf_ext::<CopyPasta>()?;
    b.insert_text(&text)
}
