// strand Configuration
// Edit this file to customize your editor and the extensions it loads

use crate::config::Config;
use crate::core::action::Action;
use crate::error::Result;
use crate::ext::{bindings, control, copy_pasta, cursors, editing, logger};

/// User configuration function
pub fn configure(config: &mut Config) {
    // Keybindings map key notation to the command names extensions listen for.
    // Sequences are space separated: "C-x C-c".

    // Session
    config.bind("C-q", "exit");
    config.bind("C-x C-c", "exit");
    config.bind("C-x k", "close-buffer");

    // Movement
    config.bind("Left", "backward-char");
    config.bind("Right", "forward-char");
    config.bind("Up", "previous-line");
    config.bind("Down", "next-line");
    config.bind("C-b", "backward-char");
    config.bind("C-f", "forward-char");
    config.bind("C-p", "previous-line");
    config.bind("C-n", "next-line");
    config.bind("Home", "beginning-of-line");
    config.bind("End", "end-of-line");
    config.bind("C-a", "beginning-of-line");
    config.bind("C-e", "end-of-line");

    // Editing
    config.bind("Enter", "newline");
    config.bind("Tab", "indent");
    config.bind("Backspace", "delete-backward");
    config.bind("Delete", "delete-forward");
    config.bind("C-d", "delete-forward");

    // Copy register (one per buffer)
    config.bind("M-w", "copy");
    config.bind("C-k", "copy");
    config.bind("C-y", "paste");

    // =========================================================================
    // SETTINGS
    // =========================================================================
    config.set("tab_width", 4i64); // Spaces inserted by "indent"

    // What a dispatch does when a listener fails:
    // "continue" runs the remaining listeners and reports all failures,
    // "abort" stops at the first one
    config.set("listener_faults", "continue");

    // Tracing output goes to a file; the terminal is in raw mode.
    // log_level takes an EnvFilter directive; RUST_LOG overrides it.
    // CLI override: -l/--log FILE, -t/--trace
    config.set("log_file", "strand.log");
    config.set("log_level", "info");

    // Append every keypress to this file (unset: no key log)
    // config.set("key_log", "keys.log");
}

/// The extension list: installs the bundled extensions in order.
///
/// Bindings come first: listeners run in registration order and the editing
/// extension skips keys the bindings extension consumed.
pub fn extensions(act: &mut Action<'_>, config: &Config) -> Result<()> {
    bindings::install(act, config)?;
    control::install(act);
    cursors::install(act);
    editing::install(act, config)?;
    copy_pasta::install(act);
    if let Some(path) = config.get_path("key_log") {
        logger::install(act, path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::editor::Editor;
    use crate::core::input::{Key, Keypress};

    #[test]
    fn test_user_configuration_defaults() {
        let mut config = Config::default();
        configure(&mut config);

        assert_eq!(config.keybindings.get("C-q"), Some(&"exit".to_string()));
        assert_eq!(
            config.keybindings.get("Left"),
            Some(&"backward-char".to_string())
        );
        assert_eq!(config.keybindings.get("Enter"), Some(&"newline".to_string()));
        assert_eq!(config.keybindings.get("C-y"), Some(&"paste".to_string()));

        assert_eq!(config.get_int("tab_width"), Some(4));
        assert_eq!(config.get_string("listener_faults"), Some("continue"));
        assert_eq!(config.get_string("log_level"), Some("info"));
        assert_eq!(config.get_string("key_log"), None);
    }

    #[test]
    fn test_default_extensions_edit_focused_buffer() {
        let mut config = Config::default();
        configure(&mut config);
        let mut editor = Editor::with_config(&config).unwrap();
        let mut act = editor.action();
        extensions(&mut act, &config).unwrap();
        let buf = act.create_buffer("").unwrap();

        for key in [
            Keypress::char('a'),
            Keypress::char('b'),
            Keypress::plain(Key::Enter),
            Keypress::plain(Key::Tab),
            Keypress::char('c'),
            Keypress::plain(Key::Backspace),
            // C-x then a key that continues no binding: consumed, not typed
            Keypress::ctrl('x'),
            Keypress::char('z'),
        ] {
            act.dispatch::<_, ()>(key).unwrap();
        }
        assert_eq!(act.editor().buffer(buf).unwrap().text(), "ab\n    ");

        act.dispatch::<_, ()>(Keypress::ctrl('q')).unwrap();
        assert!(act.editor().is_exiting());
    }
}
