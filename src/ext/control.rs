//! Session control commands: `exit` and `close-buffer`.

use crate::core::action::Action;
use crate::core::events::Command;
use crate::error::Result;

pub fn install(act: &mut Action<'_>) {
    act.add_listener(on_command);
}

fn on_command(act: &mut Action<'_>, cmd: &Command) -> Result<()> {
    match cmd.0.as_str() {
        "exit" => {
            tracing::info!("exit requested");
            act.exit();
        }
        "close-buffer" => {
            for buf in act.focused() {
                act.destroy_buffer(buf)?;
            }
            // Closing the last buffer ends the session
            match act.buffers().first() {
                Some(next) => {
                    if act.focused().is_empty() {
                        act.focus(*next)?;
                    }
                }
                None => act.exit(),
            }
        }
        _ => {}
    }
    Ok(())
}
