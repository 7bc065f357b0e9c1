//! Rendering.
//!
//! On every [`OnRender`] this extension snapshots the editor into a [`Frame`]:
//! each buffer's text, cursors and extension state, plus a status line. A
//! [`Renderer`] turns that into output. The terminal renderer lives in
//! `terminal::render`; tests use an in-memory one.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::action::Action;
use crate::core::editor::Editor;
use crate::core::events::OnRender;
use crate::core::id::BufRef;
use crate::core::text::{Coord, Cursors};
use crate::error::Result;
use crate::ext::bindings::Bindings;

/// Global state: a one-line message for the status line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusMessage(pub String);

/// What a renderer needs to know about one buffer
#[derive(Debug, Clone, PartialEq)]
pub struct BufferView {
    pub buf: BufRef,
    pub name: String,
    pub text: String,
    pub cursors: Vec<Coord>,
    pub modified: bool,
    /// Every extension state entry of the buffer as `(type, value)`
    pub state: Vec<(&'static str, String)>,
}

/// A read-only snapshot of the editor for one render
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    /// Live buffers in creation order
    pub buffers: Vec<BufferView>,
    pub focused: Vec<BufRef>,
    pub status: String,
    /// Every global extension state entry as `(type, value)`
    pub global: Vec<(&'static str, String)>,
}

impl Frame {
    /// Snapshot `editor`
    pub fn capture(editor: &Editor) -> Result<Frame> {
        let mut buffers = Vec::new();
        for buf in editor.buffers() {
            let buffer = editor.buffer(buf)?;
            let state = editor.buffer_state(buf)?;
            let cursors = state.peek::<Cursors>()?.cloned().unwrap_or_default();
            buffers.push(BufferView {
                buf,
                name: buffer.display_name(),
                text: buffer.text(),
                cursors: cursors.0.iter().map(|span| span.start).collect(),
                modified: buffer.modified,
                state: state.describe(),
            });
        }

        Ok(Frame {
            buffers,
            focused: editor.focused().to_vec(),
            status: status_line(editor)?,
            global: editor.global_state().describe(),
        })
    }

    /// The first focused buffer's view
    pub fn primary(&self) -> Option<&BufferView> {
        let focused = self.focused.first()?;
        self.buffers.iter().find(|view| view.buf == *focused)
    }
}

/// A pending key sequence wins over the message
fn status_line(editor: &Editor) -> Result<String> {
    if let Some(bindings) = editor.peek_ext::<Bindings>()? {
        if bindings.0.is_pending() {
            return Ok(bindings.0.current_sequence());
        }
    }
    Ok(editor
        .peek_ext::<StatusMessage>()?
        .map(|m| m.0.clone())
        .unwrap_or_default())
}

/// Draws frames
pub trait Renderer {
    fn draw(&mut self, frame: &Frame) -> Result<()>;
}

pub fn install(act: &mut Action<'_>, renderer: Rc<RefCell<dyn Renderer>>) {
    act.add_listener(move |act: &mut Action<'_>, _: &OnRender| {
        let frame = Frame::capture(act.editor())?;
        renderer.borrow_mut().draw(&frame)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::text::Span;

    #[derive(Default)]
    struct Recorder {
        frames: Vec<Frame>,
    }

    impl Renderer for Recorder {
        fn draw(&mut self, frame: &Frame) -> Result<()> {
            self.frames.push(frame.clone());
            Ok(())
        }
    }

    #[test]
    fn test_frame_reads_every_store() {
        let mut editor = Editor::new();
        let mut act = editor.action();
        let b1 = act.create_buffer("one").unwrap();
        let b2 = act.create_buffer("two").unwrap();
        act.with_buffer(b2, |b| {
            b.set_buf_ext(Cursors(vec![Span::point(Coord::new(0, 2))]))
        })
        .unwrap();
        act.set_ext(StatusMessage("ready".to_string()));

        let frame = Frame::capture(&editor).unwrap();
        assert_eq!(frame.buffers.len(), 2);
        assert_eq!(frame.status, "ready");
        assert_eq!(frame.primary().unwrap().buf, b1);
        assert_eq!(frame.buffers[0].cursors, vec![Coord::new(0, 0)]);
        assert_eq!(frame.buffers[1].cursors, vec![Coord::new(0, 2)]);
        assert!(frame.buffers[1]
            .state
            .iter()
            .any(|(name, _)| name.ends_with("Cursors")));
        assert!(frame.global.iter().any(|(name, value)| {
            name.ends_with("StatusMessage") && value.contains("ready")
        }));
    }

    #[test]
    fn test_renderer_draws_on_render() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut editor = Editor::new();
        let mut act = editor.action();
        install(&mut act, recorder.clone());
        act.create_buffer("hello").unwrap();
        act.dispatch::<_, ()>(OnRender).unwrap();

        let recorder = recorder.borrow();
        let frames = &recorder.frames;
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].primary().unwrap().text, "hello");
    }
}
