//! Application execution for strand.
//!
//! This module wires the pieces together for the binary:
//! - Logging setup (tracing to a file, since the terminal is in raw mode)
//! - Opening the files named on the command line
//! - Terminal mode

mod tui;

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::core::action::Action;
use crate::core::buffer::Buffer;
use crate::core::id::BufRef;
use crate::error::{Error, Result};

pub use tui::run_terminal_mode;

const DEFAULT_LOG_FILE: &str = "strand.log";
const DEFAULT_LOG_LEVEL: &str = "info";

/// The filter directive: `RUST_LOG` if set, else the `log_level` setting.
pub fn filter_directive(config: &Config, rust_log: Option<String>) -> String {
    rust_log
        .filter(|d| !d.trim().is_empty())
        .or_else(|| config.get_string("log_level").map(str::to_string))
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

/// Install the global tracing subscriber, writing to the `log_file` setting.
///
/// Keep the returned guard alive until exit; dropping it flushes the log.
/// Returns `None` when a subscriber was already installed.
pub fn init_logging(config: &Config) -> Result<Option<WorkerGuard>> {
    let directive = filter_directive(config, std::env::var("RUST_LOG").ok());
    let filter = EnvFilter::try_new(&directive)
        .map_err(|e| Error::Config(format!("log_level {:?}: {}", directive, e)))?;

    let path = config
        .get_path("log_file")
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::Config(format!("log_file {:?} names no file", path)))?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(()) => Ok(Some(guard)),
        // A subscriber is already installed; dropping the guard shuts our writer down
        Err(_) => Ok(None),
    }
}

/// Open each of `files` as a buffer; a missing file becomes an empty buffer
/// that remembers its name. With no files, one scratch buffer is created.
pub fn open_files(act: &mut Action<'_>, files: &[PathBuf]) -> Result<Vec<BufRef>> {
    if files.is_empty() {
        return Ok(vec![act.create_buffer("")?]);
    }
    let mut bufs = Vec::with_capacity(files.len());
    for path in files {
        let buf = if path.exists() {
            act.open_file(path)?
        } else {
            tracing::info!(path = %path.display(), "new file");
            let mut buffer = Buffer::new();
            buffer.filename = Some(path.clone());
            act.add_buffer(buffer)?
        };
        bufs.push(buf);
    }
    Ok(bufs)
}
