use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Native key representation for strand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    F(u8),
    Esc,
    Enter,
    Backspace,
    Tab,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    Insert,
    Null,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c),
            Key::F(n) => write!(f, "F{}", n),
            Key::Esc => write!(f, "Esc"),
            Key::Enter => write!(f, "Enter"),
            Key::Backspace => write!(f, "Backspace"),
            Key::Tab => write!(f, "Tab"),
            Key::Delete => write!(f, "Delete"),
            Key::Home => write!(f, "Home"),
            Key::End => write!(f, "End"),
            Key::PageUp => write!(f, "PageUp"),
            Key::PageDown => write!(f, "PageDown"),
            Key::Up => write!(f, "Up"),
            Key::Down => write!(f, "Down"),
            Key::Left => write!(f, "Left"),
            Key::Right => write!(f, "Right"),
            Key::Insert => write!(f, "Insert"),
            Key::Null => write!(f, "Null"),
        }
    }
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ENTER" | "RET" => return Ok(Key::Enter),
            "TAB" => return Ok(Key::Tab),
            "BACKSPACE" | "BS" => return Ok(Key::Backspace),
            "ESC" => return Ok(Key::Esc),
            "DELETE" | "DEL" => return Ok(Key::Delete),
            "HOME" => return Ok(Key::Home),
            "END" => return Ok(Key::End),
            "PAGEUP" | "PGUP" => return Ok(Key::PageUp),
            "PAGEDOWN" | "PGDN" => return Ok(Key::PageDown),
            "UP" => return Ok(Key::Up),
            "DOWN" => return Ok(Key::Down),
            "LEFT" => return Ok(Key::Left),
            "RIGHT" => return Ok(Key::Right),
            "INSERT" | "INS" => return Ok(Key::Insert),
            "NUL" | "NULL" => return Ok(Key::Null),
            "SPC" | "SPACE" => return Ok(Key::Char(' ')),
            _ => {}
        }

        // Function keys F1-F24
        if let Some(num) = s.strip_prefix('F') {
            if let Ok(n @ 1..=24) = num.parse::<u8>() {
                return Ok(Key::F(n));
            }
        }

        // Single raw character, case preserved
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Key::Char(c)),
            _ => Err(format!("Unknown key: {}", s)),
        }
    }
}

/// Modifier keys held during a keypress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Mods {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Mods {
    pub const NONE: Mods = Mods {
        ctrl: false,
        alt: false,
        shift: false,
    };

    pub const CTRL: Mods = Mods {
        ctrl: true,
        alt: false,
        shift: false,
    };

    pub const ALT: Mods = Mods {
        ctrl: false,
        alt: true,
        shift: false,
    };

    pub fn is_empty(&self) -> bool {
        !self.ctrl && !self.alt && !self.shift
    }
}

/// One key from the input source, the event the host loop dispatches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Keypress {
    pub key: Key,
    pub mods: Mods,
}

impl Keypress {
    pub fn new(key: Key, mods: Mods) -> Self {
        Self { key, mods }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Mods::NONE)
    }

    pub fn char(c: char) -> Self {
        Self::plain(Key::Char(c))
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(Key::Char(c), Mods::CTRL)
    }

    /// The character to insert for this key, if it is plain typing.
    ///
    /// Shift does not count: it is already reflected in the character itself.
    pub fn printable(&self) -> Option<char> {
        match self.key {
            Key::Char(c) if !self.mods.ctrl && !self.mods.alt && !c.is_control() => Some(c),
            _ => None,
        }
    }

    /// Normalized form used for binding lookups
    fn normalized(&self) -> Keypress {
        match self.key {
            Key::Char(c) if self.mods.ctrl || self.mods.alt => Keypress {
                key: Key::Char(c.to_ascii_lowercase()),
                mods: Mods {
                    shift: false,
                    ..self.mods
                },
            },
            Key::Char(_) => Keypress {
                key: self.key,
                mods: Mods {
                    shift: false,
                    ..self.mods
                },
            },
            _ => *self,
        }
    }
}

impl fmt::Display for Keypress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mods.ctrl {
            write!(f, "C-")?;
        }
        if self.mods.alt {
            write!(f, "M-")?;
        }
        if self.mods.shift {
            write!(f, "S-")?;
        }
        write!(f, "{}", self.key)
    }
}

/// Parse binding notation: `C-x`, `M-f`, `S-Up`, `^X`, `Enter`, `a`.
impl FromStr for Keypress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix('^') {
            if rest.chars().count() == 1 {
                let key = Key::from_str(rest)?;
                return Ok(Keypress::new(key, Mods::CTRL).normalized());
            }
        }

        let mut mods = Mods::NONE;
        let mut rest = s;
        loop {
            if rest.len() > 2 {
                if let Some(r) = rest.strip_prefix("C-") {
                    mods.ctrl = true;
                    rest = r;
                    continue;
                }
                if let Some(r) = rest.strip_prefix("M-") {
                    mods.alt = true;
                    rest = r;
                    continue;
                }
                if let Some(r) = rest.strip_prefix("S-") {
                    mods.shift = true;
                    rest = r;
                    continue;
                }
            }
            break;
        }

        let key = Key::from_str(rest)?;
        Ok(Keypress::new(key, mods).normalized())
    }
}

/// Result of a key lookup in the trie
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    /// Found a complete command binding
    Command(String),
    /// Found a prefix, more keys needed
    Prefix,
    /// A pending sequence did not continue to any binding
    DeadEnd,
    /// The key starts no binding at all
    Unbound,
}

/// A node in the key binding trie
#[derive(Debug, Clone, Default)]
struct TrieNode {
    /// The command bound to this sequence (if any)
    command: Option<String>,
    /// Child nodes for multi-key sequences
    children: HashMap<Keypress, TrieNode>,
}

/// Trie of key sequences to command names
#[derive(Debug, Clone, Default)]
pub struct KeyTrie {
    root: TrieNode,
    /// Keys of the sequence typed so far
    current: Vec<Keypress>,
}

impl KeyTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a whitespace-separated sequence such as `"C-x C-s"` to `command`.
    pub fn bind(&mut self, sequence: &str, command: impl Into<String>) -> Result<(), String> {
        let keys = sequence
            .split_whitespace()
            .map(Keypress::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        if keys.is_empty() {
            return Err("empty key sequence".to_string());
        }

        let mut node = &mut self.root;
        for key in keys {
            node = node.children.entry(key).or_default();
        }
        node.command = Some(command.into());
        Ok(())
    }

    /// Feed one key and report what it completed
    pub fn process_key(&mut self, key: &Keypress) -> LookupResult {
        let was_pending = !self.current.is_empty();
        self.current.push(key.normalized());

        let mut node = &self.root;
        for k in &self.current {
            match node.children.get(k) {
                Some(child) => node = child,
                None => {
                    self.current.clear();
                    return if was_pending {
                        LookupResult::DeadEnd
                    } else {
                        LookupResult::Unbound
                    };
                }
            }
        }

        if let Some(cmd) = &node.command {
            let result = LookupResult::Command(cmd.clone());
            self.current.clear();
            return result;
        }
        LookupResult::Prefix
    }

    pub fn is_pending(&self) -> bool {
        !self.current.is_empty()
    }

    /// The partial key sequence as a display string
    pub fn current_sequence(&self) -> String {
        if self.current.is_empty() {
            return String::new();
        }
        self.current
            .iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join(" ")
            + " -"
    }
}
