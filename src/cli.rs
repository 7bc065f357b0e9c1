//! Command-line argument parsing for strand.
//!
//! This module provides the `Cli` struct which encapsulates all command-line
//! options and methods for parsing them.

use crate::config::{Config, ConfigValue};
use crate::error::{Error, Result};
use std::path::PathBuf;

/// Command-line interface configuration.
#[derive(Debug, Default, PartialEq)]
pub struct Cli {
    /// File(s) to open
    pub files: Vec<PathBuf>,

    /// Log file override
    pub log_file: Option<PathBuf>,

    /// Log everything down to trace level
    pub trace: bool,

    /// Print usage and exit
    pub help: bool,
}

pub const USAGE: &str = "\
strand - An extensible text editor

Usage: strand [OPTIONS] [FILES...]

Options:
  -h, --help        Show this help message
  -l, --log FILE    Write the log to FILE
  -t, --trace       Log at trace level";

impl Cli {
    /// Parse the process's command-line arguments.
    pub fn parse() -> Result<Self> {
        Self::parse_from(std::env::args().skip(1))
    }

    /// Parse arguments, not including the program name.
    ///
    /// Returns an error for unknown flags or a flag missing its value.
    pub fn parse_from(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut cli = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-t" | "--trace" => cli.trace = true,
                "-h" | "--help" => cli.help = true,
                "-l" | "--log" => {
                    if let Some(path) = args.next() {
                        cli.log_file = Some(PathBuf::from(path));
                    } else {
                        return Err(Error::Config("--log requires a value".to_string()));
                    }
                }
                "--" => {
                    cli.files.extend(args.by_ref().map(PathBuf::from));
                }
                arg if arg.starts_with('-') && arg.len() > 1 => {
                    return Err(Error::Config(format!(
                        "Unknown flag: {}. Use --help for usage.",
                        arg
                    )));
                }
                _ => {
                    // Positional arguments are files
                    cli.files.push(PathBuf::from(arg));
                }
            }
        }

        Ok(cli)
    }

    /// Apply CLI overrides to a configuration object.
    pub fn apply_to_config(&self, config: &mut Config) {
        if let Some(path) = &self.log_file {
            config.set(
                "log_file",
                ConfigValue::String(path.to_string_lossy().into_owned()),
            );
        }
        if self.trace {
            config.set("log_level", "trace");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli> {
        Cli::parse_from(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_files_and_flags() {
        let cli = parse(&["-t", "a.txt", "--log", "out.log", "b.txt"]).unwrap();
        assert!(cli.trace);
        assert_eq!(cli.log_file, Some(PathBuf::from("out.log")));
        assert_eq!(
            cli.files,
            vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]
        );
    }

    #[test]
    fn test_double_dash_ends_flags() {
        let cli = parse(&["--", "-odd-name"]).unwrap();
        assert_eq!(cli.files, vec![PathBuf::from("-odd-name")]);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse(&["--log"]), Err(Error::Config(_))));
        assert!(matches!(parse(&["--sed"]), Err(Error::Config(_))));
    }

    #[test]
    fn test_apply_to_config() {
        let mut config = Config::default();
        config.set("log_level", "info");
        let cli = parse(&["-l", "x.log", "-t"]).unwrap();
        cli.apply_to_config(&mut config);
        assert_eq!(config.get_string("log_file"), Some("x.log"));
        assert_eq!(config.get_string("log_level"), Some("trace"));
    }
}
