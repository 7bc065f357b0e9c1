//! Key bindings: turns keypresses into named [`Command`] events.

use crate::config::Config;
use crate::core::action::Action;
use crate::core::events::Command;
use crate::core::input::{KeyTrie, Keypress, LookupResult};
use crate::error::{Error, Result};

/// Global state: the binding trie and any partially typed sequence
#[derive(Debug, Clone, Default)]
pub struct Bindings(pub KeyTrie);

/// Global state: whether the bindings extension consumed the current keypress.
///
/// Extensions that react to raw keys (plain typing) check this so a key that
/// continued or completed a binding is not also inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyConsumed(pub bool);

/// Install the bindings from `config`.
///
/// Must be installed before any extension that reads [`KeyConsumed`], since
/// listeners run in registration order.
pub fn install(act: &mut Action<'_>, config: &Config) -> Result<()> {
    let mut trie = KeyTrie::new();
    for (sequence, command) in &config.keybindings {
        trie.bind(sequence, command.as_str())
            .map_err(|e| Error::Config(format!("binding {:?}: {}", sequence, e)))?;
    }
    tracing::debug!(bindings = config.keybindings.len(), "key bindings loaded");
    act.set_ext(Bindings(trie));
    act.add_listener(on_keypress);
    Ok(())
}

fn on_keypress(act: &mut Action<'_>, key: &Keypress) -> Result<()> {
    let lookup = act.modify_ext::<Bindings, _>(|b| b.0.process_key(key))?;
    act.set_ext(KeyConsumed(lookup != LookupResult::Unbound));
    match lookup {
        LookupResult::Command(name) => {
            tracing::debug!(%key, command = %name, "binding matched");
            act.dispatch(Command(name))
        }
        LookupResult::DeadEnd => {
            tracing::debug!(%key, "key sequence cancelled");
            Ok(())
        }
        LookupResult::Prefix | LookupResult::Unbound => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::editor::Editor;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn editor_with(bindings: &[(&str, &str)]) -> (Editor, Rc<RefCell<Vec<String>>>) {
        let mut config = Config::default();
        for (key, cmd) in bindings {
            config.bind(key, cmd);
        }
        let mut editor = Editor::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let mut act = editor.action();
        install(&mut act, &config).unwrap();
        act.add_listener(move |_, cmd: &Command| {
            log.borrow_mut().push(cmd.0.clone());
            Ok(())
        });
        (editor, seen)
    }

    #[test]
    fn test_single_key_binding() {
        let (mut editor, seen) = editor_with(&[("C-q", "exit")]);
        let mut act = editor.action();
        act.dispatch::<_, ()>(Keypress::ctrl('q')).unwrap();
        assert_eq!(*seen.borrow(), vec!["exit".to_string()]);
        assert_eq!(act.get_ext::<KeyConsumed>().unwrap(), KeyConsumed(true));
    }

    #[test]
    fn test_sequence_binding() {
        let (mut editor, seen) = editor_with(&[("C-x C-c", "exit")]);
        let mut act = editor.action();
        act.dispatch::<_, ()>(Keypress::ctrl('x')).unwrap();
        assert!(seen.borrow().is_empty());
        assert!(act.get_ext::<Bindings>().unwrap().0.is_pending());
        act.dispatch::<_, ()>(Keypress::ctrl('c')).unwrap();
        assert_eq!(*seen.borrow(), vec!["exit".to_string()]);
    }

    #[test]
    fn test_unbound_key_is_not_consumed() {
        let (mut editor, seen) = editor_with(&[("C-q", "exit")]);
        let mut act = editor.action();
        act.dispatch::<_, ()>(Keypress::char('a')).unwrap();
        assert!(seen.borrow().is_empty());
        assert_eq!(act.get_ext::<KeyConsumed>().unwrap(), KeyConsumed(false));
    }

    #[test]
    fn test_dead_end_consumes_key() {
        let (mut editor, seen) = editor_with(&[("C-x C-c", "exit")]);
        let mut act = editor.action();
        act.dispatch::<_, ()>(Keypress::ctrl('x')).unwrap();
        act.dispatch::<_, ()>(Keypress::char('s')).unwrap();
        assert!(seen.borrow().is_empty());
        assert_eq!(act.get_ext::<KeyConsumed>().unwrap(), KeyConsumed(true));
    }

    #[test]
    fn test_bad_binding_is_config_error() {
        let mut config = Config::default();
        config.bind("   ", "nothing");
        let mut editor = Editor::new();
        let err = install(&mut editor.action(), &config).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
