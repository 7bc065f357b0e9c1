//! Appends every keypress to a log file, one per line.

use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

use crate::core::action::Action;
use crate::core::events::Exit;
use crate::core::input::Keypress;
use crate::error::Result;

/// Global state: keypresses written so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeysLogged(pub usize);

pub fn install(act: &mut Action<'_>, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing::info!(path = %path.display(), "logging keypresses");
    let file = Rc::new(RefCell::new(file));

    let log = Rc::clone(&file);
    act.add_listener(move |act: &mut Action<'_>, key: &Keypress| {
        writeln!(log.borrow_mut(), "{}", key)?;
        act.modify_ext::<KeysLogged, _>(|n| n.0 += 1)
    });
    act.add_listener(move |_: &mut Action<'_>, _: &Exit| flush(&file));
    Ok(())
}

fn flush(file: &RefCell<File>) -> Result<()> {
    file.borrow_mut().sync_data()?;
    Ok(())
}
