//! The host loop.
//!
//! Single-threaded: block for one input, run its whole dispatch chain to
//! completion, repeat. A fault ends the chain for the current input only; it
//! is logged, recorded as [`LastFault`] and the loop goes on to the next input.
//!
//! Every event in the chain reaches the global listeners first, then the
//! listeners of each focused buffer in focus order. The focus list is read
//! after the global listeners ran, so a focus change they make applies to the
//! same event.

use std::collections::VecDeque;

use crate::core::editor::Editor;
use crate::core::events::{
    AfterEvent, AfterRender, BeforeEvent, BeforeRender, Exit, Init, OnRender,
};
use crate::core::input::Keypress;
use crate::error::{Error, Result};

/// Where the host loop gets its input from
pub trait InputSource {
    /// Block until the next keypress. `Ok(None)` means the input is exhausted.
    fn next_key(&mut self) -> Result<Option<Keypress>>;
}

/// A fixed sequence of keypresses, for tests and scripted sessions
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    keys: VecDeque<Keypress>,
}

impl ScriptedInput {
    pub fn new(keys: impl IntoIterator<Item = Keypress>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// Plain keypresses for each character of `text`
    pub fn typing(text: &str) -> Self {
        Self::new(text.chars().map(Keypress::char))
    }

    pub fn push(&mut self, key: Keypress) {
        self.keys.push_back(key);
    }
}

impl InputSource for ScriptedInput {
    fn next_key(&mut self) -> Result<Option<Keypress>> {
        Ok(self.keys.pop_front())
    }
}

/// Global state: the last fault that ended an input's dispatch chain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastFault(pub Option<String>);

/// Drive `editor` from `input` until an action requests exit or input runs out.
///
/// Only failures of the input source itself end the loop with an error.
pub fn run(editor: &mut Editor, input: &mut dyn InputSource) -> Result<()> {
    tracing::info!("host loop starting");
    contain(editor, "init", |editor| {
        broadcast(editor, Init)?;
        render(editor)
    });

    while !editor.is_exiting() {
        let Some(key) = input.next_key()? else {
            tracing::info!("input exhausted");
            break;
        };
        handle_key(editor, key);
    }

    contain(editor, "exit", |editor| broadcast(editor, Exit));
    tracing::info!("host loop stopped");
    Ok(())
}

/// Run the full chain for one keypress. Faults are contained and recorded.
pub fn handle_key(editor: &mut Editor, key: Keypress) {
    tracing::debug!(%key, "input");
    contain(editor, "keypress", |editor| {
        broadcast(editor, BeforeEvent)?;
        broadcast(editor, key)?;
        broadcast(editor, AfterEvent)?;
        render(editor)
    });
}

fn render(editor: &mut Editor) -> Result<()> {
    broadcast(editor, BeforeRender)?;
    broadcast(editor, OnRender)?;
    broadcast(editor, AfterRender)
}

/// Dispatch `event` globally, then to every focused buffer
fn broadcast<E: Clone + 'static>(editor: &mut Editor, event: E) -> Result<()> {
    let mut act = editor.action();
    act.dispatch::<_, ()>(event.clone())?;
    act.focused_do(|b| b.dispatch_buf::<_, ()>(event.clone()))?;
    Ok(())
}

fn contain(
    editor: &mut Editor,
    phase: &'static str,
    chain: impl FnOnce(&mut Editor) -> Result<()>,
) {
    match chain(editor) {
        Ok(()) => editor.action().set_ext(LastFault(None)),
        Err(error) => report(editor, phase, &error),
    }
}

fn report(editor: &mut Editor, phase: &'static str, error: &Error) {
    tracing::error!(phase, %error, "dispatch chain aborted");
    editor.action().set_ext(LastFault(Some(error.to_string())));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::BufAction;
    use crate::core::events::BufAdded;
    use crate::core::input::Key;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(editor: &mut Editor) -> Rc<RefCell<Vec<String>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut act = editor.action();
        macro_rules! record {
            ($ty:ty, $name:expr) => {{
                let log = Rc::clone(&log);
                act.add_listener(move |_, _: &$ty| {
                    log.borrow_mut().push($name.to_string());
                    Ok(())
                });
            }};
        }
        record!(Init, "init");
        record!(BeforeEvent, "before");
        record!(AfterEvent, "after");
        record!(OnRender, "render");
        record!(Exit, "exit");
        let keys = Rc::clone(&log);
        act.add_listener(move |_, key: &Keypress| {
            keys.borrow_mut().push(format!("key:{}", key));
            Ok(())
        });
        log
    }

    #[test]
    fn test_event_order() {
        let mut editor = Editor::new();
        let log = recorder(&mut editor);
        let mut input = ScriptedInput::typing("a");
        run(&mut editor, &mut input).unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["init", "render", "before", "key:a", "after", "render", "exit"]
        );
    }

    #[test]
    fn test_exit_stops_loop() {
        let mut editor = Editor::new();
        let seen = Rc::new(RefCell::new(0));
        let count = Rc::clone(&seen);
        editor.action().add_listener(move |act, key: &Keypress| {
            *count.borrow_mut() += 1;
            if key.key == Key::Esc {
                act.exit();
            }
            Ok(())
        });
        let mut input = ScriptedInput::new([
            Keypress::char('a'),
            Keypress::plain(Key::Esc),
            Keypress::char('b'),
        ]);
        run(&mut editor, &mut input).unwrap();
        assert_eq!(*seen.borrow(), 2);
        assert!(editor.is_exiting());
    }

    #[test]
    fn test_fault_ends_chain_but_not_loop() {
        let mut editor = Editor::new();
        let log = recorder(&mut editor);
        editor.action().add_listener(|_, key: &Keypress| {
            if key.key == Key::Char('x') {
                return Err(Error::Config("boom".to_string()));
            }
            Ok(())
        });
        let mut input = ScriptedInput::typing("xy");
        run(&mut editor, &mut input).unwrap();

        let log = log.borrow();
        // 'x' stopped before AfterEvent and rendering; 'y' ran fully
        let expected = vec![
            "init", "render", "before", "key:x", "before", "key:y", "after", "render", "exit",
        ];
        assert_eq!(*log, expected);
        assert_eq!(editor.peek_ext::<LastFault>().unwrap(), Some(&LastFault(None)));
    }

    #[test]
    fn test_focused_buffers_hear_the_chain() {
        let mut editor = Editor::new();
        let log = recorder(&mut editor);
        let mut act = editor.action();
        let hook = Rc::clone(&log);
        act.add_listener(move |act, added: &BufAdded| {
            let buf = added.0;
            let keys = Rc::clone(&hook);
            let renders = Rc::clone(&hook);
            act.with_buffer(buf, move |b| {
                b.add_buf_listener(move |_: &mut BufAction<'_>, key: &Keypress| {
                    keys.borrow_mut().push(format!("{}:key:{}", buf, key));
                    Ok(())
                })?;
                b.add_buf_listener(move |_: &mut BufAction<'_>, _: &OnRender| {
                    renders.borrow_mut().push(format!("{}:render", buf));
                    Ok(())
                })?;
                Ok(())
            })
        });
        let b1 = act.create_buffer("").unwrap();
        let b2 = act.create_buffer("").unwrap();
        let _unfocused = act.create_buffer("").unwrap();
        act.set_focus(vec![b2, b1]).unwrap();

        let mut input = ScriptedInput::typing("a");
        run(&mut editor, &mut input).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![
                "init",
                "render",
                "Buffer(1):render",
                "Buffer(0):render",
                "before",
                "key:a",
                "Buffer(1):key:a",
                "Buffer(0):key:a",
                "after",
                "render",
                "Buffer(1):render",
                "Buffer(0):render",
                "exit",
            ]
        );
    }

    #[test]
    fn test_buffer_listener_fault_is_contained() {
        let mut editor = Editor::new();
        let log = recorder(&mut editor);
        let mut act = editor.action();
        let b = act.create_buffer("").unwrap();
        act.with_buffer(b, |b| {
            b.add_buf_listener(|_: &mut BufAction<'_>, key: &Keypress| {
                if key.key == Key::Char('x') {
                    return Err(Error::Config("boom".to_string()));
                }
                Ok(())
            })
        })
        .unwrap();

        handle_key(&mut editor, Keypress::char('x'));
        assert_eq!(*log.borrow(), vec!["before", "key:x"]);
        let fault = editor.peek_ext::<LastFault>().unwrap().cloned().unwrap();
        assert!(fault.0.unwrap().contains("boom"));
    }

    #[test]
    fn test_fault_is_recorded() {
        let mut editor = Editor::new();
        editor.action().add_listener(|_, _: &Keypress| -> Result<()> {
            Err(Error::Config("boom".to_string()))
        });
        handle_key(&mut editor, Keypress::char('q'));
        let fault = editor.peek_ext::<LastFault>().unwrap().cloned().unwrap();
        assert!(fault.0.unwrap().contains("boom"));
    }
}
