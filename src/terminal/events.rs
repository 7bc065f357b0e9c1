//! Keyboard input from the terminal, as an [`InputSource`] for the host loop.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::core::host::InputSource;
use crate::core::input::{Key, Keypress, Mods};
use crate::error::Result;

/// Blocking crossterm reader
#[derive(Debug, Default)]
pub struct TerminalInput;

impl TerminalInput {
    pub fn new() -> Self {
        Self
    }
}

impl InputSource for TerminalInput {
    fn next_key(&mut self) -> Result<Option<Keypress>> {
        loop {
            match event::read()? {
                Event::Key(key_event) => {
                    if let Some(key) = crossterm_key_to_keypress(key_event) {
                        return Ok(Some(key));
                    }
                }
                // A Null key runs a full chain, which redraws at the new size
                Event::Resize(..) => return Ok(Some(Keypress::plain(Key::Null))),
                _ => {}
            }
        }
    }
}

/// Normalize a crossterm key event. Key releases yield nothing.
pub fn crossterm_key_to_keypress(key_event: KeyEvent) -> Option<Keypress> {
    if key_event.kind == KeyEventKind::Release {
        return None;
    }
    let modifiers = key_event.modifiers;
    let mut mods = Mods {
        ctrl: modifiers.contains(KeyModifiers::CONTROL),
        alt: modifiers.contains(KeyModifiers::ALT),
        shift: modifiers.contains(KeyModifiers::SHIFT),
    };

    let key = match key_event.code {
        // Shift is already in the character
        KeyCode::Char(c) => {
            mods.shift = false;
            Key::Char(c)
        }
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Enter => Key::Enter,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => {
            mods.shift = true;
            Key::Tab
        }
        KeyCode::Delete => Key::Delete,
        KeyCode::Insert => Key::Insert,
        KeyCode::F(n) => Key::F(n),
        KeyCode::Esc => Key::Esc,
        _ => return None,
    };

    Some(Keypress::new(key, mods))
}
