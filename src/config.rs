//! Configuration: key bindings plus named settings.
//!
//! `user_config::configure` fills a [`Config`], the CLI overrides some of it,
//! and each consumer reads the settings it owns:
//!
//! | setting           | type   | read by                         |
//! |-------------------|--------|---------------------------------|
//! | `listener_faults` | string | `Editor::with_config`           |
//! | `tab_width`       | int    | the editing extension           |
//! | `key_log`         | path   | the extension list (logger)     |
//! | `log_file`        | path   | `run::init_logging`             |
//! | `log_level`       | string | `run::init_logging`             |

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::Error;

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Key notation ("C-x k") to command name
    pub keybindings: HashMap<String, String>,
    pub settings: HashMap<String, ConfigValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    String(String),
}

impl Config {
    /// Bind a key sequence to a command
    pub fn bind(&mut self, key: &str, command: &str) {
        self.keybindings
            .insert(key.to_string(), command.to_string());
    }

    /// Set a configuration value
    pub fn set<V: Into<ConfigValue>>(&mut self, key: &str, value: V) {
        self.settings.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.settings.get(key)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| match v {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        })
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| match v {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        })
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| match v {
            ConfigValue::String(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// String setting naming a file
    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get_string(key)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    }

    /// Integer setting that must be non-negative, or `default` when unset
    pub fn get_usize_or(&self, key: &str, default: usize) -> Result<usize, Error> {
        match self.get(key) {
            None => Ok(default),
            Some(ConfigValue::Int(i)) => usize::try_from(*i)
                .map_err(|_| Error::Config(format!("{} must not be negative, got {}", key, i))),
            Some(other) => Err(Error::Config(format!(
                "{} must be an integer, got {:?}",
                key, other
            ))),
        }
    }

    /// String setting parsed into `T`, or `default` when unset
    pub fn parse_or<T>(&self, key: &str, default: T) -> Result<T, Error>
    where
        T: FromStr<Err = Error>,
    {
        match self.get(key) {
            None => Ok(default),
            Some(ConfigValue::String(s)) => s.parse(),
            Some(other) => Err(Error::Config(format!(
                "{} must be a string, got {:?}",
                key, other
            ))),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Int(i)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}
