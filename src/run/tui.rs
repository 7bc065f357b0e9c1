//! Terminal (TUI) mode implementation.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use crate::config::Config;
use crate::core::editor::Editor;
use crate::core::host;
use crate::error::Result;
use crate::ext::status::{self, Renderer};
use crate::terminal::events::TerminalInput;
use crate::terminal::raw::RawMode;
use crate::terminal::render::TerminalRenderer;
use crate::user_config;

/// Run in terminal (TUI) mode.
pub fn run_terminal_mode(files: &[PathBuf], config: &Config) -> Result<()> {
    let mut editor = Editor::with_config(config)?;
    {
        let mut act = editor.action();
        user_config::extensions(&mut act, config)?;
        let renderer: Rc<RefCell<dyn Renderer>> =
            Rc::new(RefCell::new(TerminalRenderer::stdout()));
        status::install(&mut act, renderer);
        super::open_files(&mut act, files)?;
    }
    tracing::info!(buffers = editor.buffers().len(), "terminal mode starting");

    let _raw_mode = RawMode::new()?;
    let mut input = TerminalInput::new();
    host::run(&mut editor, &mut input)
}
