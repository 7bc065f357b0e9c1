//! Execution contexts for extension code.
//!
//! [`Action`] is editor-scoped: it reaches the global store and registry and
//! can address any buffer by ref. [`BufAction`] is buffer-scoped: it also has
//! an implicit current buffer, whose store, registry and text it exposes
//! without naming a ref. A `BufAction` only exists inside
//! [`Action::with_buffer`] (or the helpers built on it), which pins the
//! buffer for the duration.
//!
//! Both are thin wrappers around `&mut Editor`; there is no hidden context.

use std::path::Path;

use crate::core::buffer::Buffer;
use crate::core::combine::Combine;
use crate::core::dispatcher;
use crate::core::editor::Editor;
use crate::core::events::{BufAdded, BufRemoved};
use crate::core::id::{BufRef, ListenerId};
use crate::core::registry::Teardown;
use crate::core::state::{Extension, ExtensionStateStore};
use crate::core::text::{Coord, Cursors, Span};
use crate::error::{Error, Result};

/// Editor-scoped execution context
pub struct Action<'a> {
    editor: &'a mut Editor,
}

impl<'a> Action<'a> {
    pub(crate) fn new(editor: &'a mut Editor) -> Self {
        Self { editor }
    }

    /// Read-only view of the whole editor
    pub fn editor(&self) -> &Editor {
        &*self.editor
    }

    // ==================== Global state ====================

    pub fn get_ext<T: Extension + Default + Clone>(&mut self) -> Result<T> {
        self.editor.state.get::<T>()
    }

    pub fn set_ext<T: Extension>(&mut self, value: T) {
        self.editor.state.set(value);
    }

    pub fn modify_ext<T, R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Result<R>
    where
        T: Extension + Default,
    {
        self.editor.state.modify::<T, R>(f)
    }

    // ==================== Global events ====================

    /// Dispatch `event` to the global listeners and combine their results
    pub fn dispatch<E, R>(&mut self, event: E) -> Result<R>
    where
        E: 'static,
        R: Combine + 'static,
    {
        dispatcher::dispatch_global(self.editor, &event)
    }

    /// Register a global listener for events of type `E`
    pub fn add_listener<E, R, F>(&mut self, listener: F) -> ListenerId
    where
        E: 'static,
        R: Combine + 'static,
        F: Fn(&mut Action<'_>, &E) -> Result<R> + 'static,
    {
        let id = self.editor.alloc_listener_id();
        self.editor
            .listeners
            .add::<E>(id, dispatcher::erase_listener(listener));
        tracing::debug!(%id, event = std::any::type_name::<E>(), "global listener added");
        id
    }

    /// Remove a global listener. Returns false if it was already gone.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let removed = self.editor.listeners.remove(id);
        tracing::debug!(%id, removed, "global listener removed");
        removed
    }

    // ==================== Buffers ====================

    /// Create a buffer holding `content` and announce it with [`BufAdded`]
    pub fn create_buffer(&mut self, content: &str) -> Result<BufRef> {
        self.add_buffer(Buffer::from_string(content))
    }

    /// Create a buffer from a file on disk
    pub fn open_file(&mut self, path: impl AsRef<Path>) -> Result<BufRef> {
        self.add_buffer(Buffer::from_file(path)?)
    }

    /// Register an already built buffer and announce it with [`BufAdded`]
    pub fn add_buffer(&mut self, buffer: Buffer) -> Result<BufRef> {
        let buf = self.editor.buffers.create(buffer);
        if self.editor.focus.is_empty() {
            self.editor.focus.push(buf);
        }
        tracing::debug!(%buf, "buffer created");
        self.dispatch::<_, ()>(BufAdded(buf))?;
        Ok(buf)
    }

    /// Destroy a buffer and its per-buffer stores.
    ///
    /// [`BufRemoved`] is dispatched while the ref is still live; once this
    /// returns the ref is stale. If the buffer is currently in use by a
    /// [`with_buffer`](Self::with_buffer) body, that body keeps its access
    /// and the teardown completes when it returns.
    pub fn destroy_buffer(&mut self, buf: BufRef) -> Result<()> {
        if !self.editor.buffers.begin_removal(buf)? {
            // Already being removed further up the stack
            return Ok(());
        }
        self.editor.focus.retain(|b| *b != buf);

        let notified = self.dispatch::<_, ()>(BufRemoved(buf));
        match self.editor.buffers.finish_removal(buf) {
            Teardown::Destroyed => tracing::debug!(%buf, "buffer destroyed"),
            Teardown::Deferred => tracing::debug!(%buf, "buffer in use; destruction deferred"),
        }
        notified
    }

    /// Run `body` with `buf` as the current buffer.
    ///
    /// The buffer cannot be torn down while `body` runs.
    pub fn with_buffer<T>(
        &mut self,
        buf: BufRef,
        body: impl FnOnce(&mut BufAction<'_>) -> Result<T>,
    ) -> Result<T> {
        self.editor.buffers.acquire(buf)?;
        let result = body(&mut BufAction::new(self.editor, buf));
        self.editor.buffers.release(buf);
        result
    }

    /// Run `body` once for each of `bufs`, collecting results in order.
    /// Any stale ref is an error.
    pub fn with_buffers<T>(
        &mut self,
        bufs: &[BufRef],
        mut body: impl FnMut(&mut BufAction<'_>) -> Result<T>,
    ) -> Result<Vec<T>> {
        bufs.iter()
            .map(|buf| self.with_buffer(*buf, &mut body))
            .collect()
    }

    /// Run `body` once per focused buffer, collecting results in focus order
    pub fn focused_do<T>(
        &mut self,
        body: impl FnMut(&mut BufAction<'_>) -> Result<T>,
    ) -> Result<Vec<T>> {
        let bufs = self.editor.focus.clone();
        self.each_live(bufs, body)
    }

    /// Run `body` once per live buffer, collecting results in creation order
    pub fn buffers_do<T>(
        &mut self,
        body: impl FnMut(&mut BufAction<'_>) -> Result<T>,
    ) -> Result<Vec<T>> {
        let bufs = self.editor.buffers.refs();
        self.each_live(bufs, body)
    }

    /// Like `with_buffers`, but skips buffers destroyed by an earlier iteration
    fn each_live<T>(
        &mut self,
        bufs: Vec<BufRef>,
        mut body: impl FnMut(&mut BufAction<'_>) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut out = Vec::with_capacity(bufs.len());
        for buf in bufs {
            if self.editor.buffers.contains(buf) {
                out.push(self.with_buffer(buf, &mut body)?);
            }
        }
        Ok(out)
    }

    /// Dispatch `event` to one buffer's listeners
    pub fn dispatch_to<E, R>(&mut self, buf: BufRef, event: E) -> Result<R>
    where
        E: 'static,
        R: Combine + 'static,
    {
        self.with_buffer(buf, |b| b.dispatch_buf(event))
    }

    pub fn buffers(&self) -> Vec<BufRef> {
        self.editor.buffers()
    }

    // ==================== Focus ====================

    pub fn focused(&self) -> Vec<BufRef> {
        self.editor.focus.clone()
    }

    /// Make `buf` the only focused buffer
    pub fn focus(&mut self, buf: BufRef) -> Result<()> {
        self.set_focus(vec![buf])
    }

    /// Replace the focus list; every ref must be live
    pub fn set_focus(&mut self, bufs: Vec<BufRef>) -> Result<()> {
        if let Some(stale) = bufs.iter().find(|b| !self.editor.buffers.contains(**b)) {
            return Err(Error::StaleBuffer(*stale));
        }
        self.editor.focus = bufs;
        Ok(())
    }

    /// Add `buf` to the focus list if it is not already there
    pub fn add_focus(&mut self, buf: BufRef) -> Result<()> {
        if !self.editor.buffers.contains(buf) {
            return Err(Error::StaleBuffer(buf));
        }
        if !self.editor.focus.contains(&buf) {
            self.editor.focus.push(buf);
        }
        Ok(())
    }

    /// Ask the host loop to stop after the current input
    pub fn exit(&mut self) {
        self.editor.request_exit();
    }
}

/// Buffer-scoped execution context
pub struct BufAction<'a> {
    editor: &'a mut Editor,
    buf: BufRef,
}

impl<'a> BufAction<'a> {
    pub(crate) fn new(editor: &'a mut Editor, buf: BufRef) -> Self {
        Self { editor, buf }
    }

    /// The current buffer
    pub fn buf_ref(&self) -> BufRef {
        self.buf
    }

    /// Editor-scoped context for the same editor
    pub fn editor_action(&mut self) -> Action<'_> {
        Action::new(&mut *self.editor)
    }

    /// Read-only view of the whole editor
    pub fn editor(&self) -> &Editor {
        &*self.editor
    }

    fn store(&mut self) -> Result<&mut ExtensionStateStore> {
        Ok(&mut self.editor.buffers.slot_mut(self.buf)?.state)
    }

    // ==================== Buffer state ====================

    pub fn get_buf_ext<T: Extension + Default + Clone>(&mut self) -> Result<T> {
        self.store()?.get::<T>()
    }

    pub fn set_buf_ext<T: Extension>(&mut self, value: T) -> Result<()> {
        self.store()?.set(value);
        Ok(())
    }

    pub fn modify_buf_ext<T, R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Result<R>
    where
        T: Extension + Default,
    {
        self.store()?.modify::<T, R>(f)
    }

    // ==================== Global state ====================

    pub fn get_ext<T: Extension + Default + Clone>(&mut self) -> Result<T> {
        self.editor.state.get::<T>()
    }

    pub fn set_ext<T: Extension>(&mut self, value: T) {
        self.editor.state.set(value);
    }

    pub fn modify_ext<T, R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Result<R>
    where
        T: Extension + Default,
    {
        self.editor.state.modify::<T, R>(f)
    }

    // ==================== Events ====================

    /// Dispatch `event` to this buffer's listeners only
    pub fn dispatch_buf<E, R>(&mut self, event: E) -> Result<R>
    where
        E: 'static,
        R: Combine + 'static,
    {
        dispatcher::dispatch_buffer(self.editor, self.buf, &event)
    }

    /// Dispatch `event` to the global listeners
    pub fn dispatch<E, R>(&mut self, event: E) -> Result<R>
    where
        E: 'static,
        R: Combine + 'static,
    {
        dispatcher::dispatch_global(self.editor, &event)
    }

    /// Register a listener on this buffer for events of type `E`
    pub fn add_buf_listener<E, R, F>(&mut self, listener: F) -> Result<ListenerId>
    where
        E: 'static,
        R: Combine + 'static,
        F: Fn(&mut BufAction<'_>, &E) -> Result<R> + 'static,
    {
        let id = self.editor.alloc_listener_id();
        self.editor
            .buffers
            .slot_mut(self.buf)?
            .listeners
            .add::<E>(id, dispatcher::erase_buf_listener(listener));
        tracing::debug!(%id, buf = %self.buf, event = std::any::type_name::<E>(), "buffer listener added");
        Ok(id)
    }

    /// Remove a listener from this buffer. Returns false if it was already gone.
    pub fn remove_buf_listener(&mut self, id: ListenerId) -> Result<bool> {
        Ok(self.editor.buffers.slot_mut(self.buf)?.listeners.remove(id))
    }

    // ==================== Text ====================

    pub fn buffer(&self) -> Result<&Buffer> {
        self.editor.buffer(self.buf)
    }

    pub fn buffer_mut(&mut self) -> Result<&mut Buffer> {
        Ok(&mut self.editor.buffers.slot_mut(self.buf)?.buffer)
    }

    pub fn text(&self) -> Result<String> {
        Ok(self.buffer()?.text())
    }

    pub fn read_range(&self, span: Span) -> Result<String> {
        self.buffer()?.read_range(span)
    }

    pub fn insert_at(&mut self, at: Coord, text: &str) -> Result<()> {
        self.buffer_mut()?.insert_at(at, text)
    }

    pub fn delete_range(&mut self, span: Span) -> Result<String> {
        self.buffer_mut()?.delete_range(span)
    }

    pub fn replace_range(&mut self, span: Span, text: &str) -> Result<String> {
        self.buffer_mut()?.replace_range(span, text)
    }

    /// Insert `text` at every cursor and move each cursor past its insertion.
    pub fn insert_text(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let cursors = self.get_buf_ext::<Cursors>()?;
        let inserted = text.chars().count();
        let buffer = self.buffer_mut()?;

        // (offset, original index), processed back to front so earlier offsets stay put
        let mut offsets = Vec::with_capacity(cursors.0.len());
        for (i, span) in cursors.0.iter().enumerate() {
            offsets.push((buffer.coord_to_char(buffer.clamp(span.start))?, i));
        }
        offsets.sort();
        for (offset, _) in offsets.iter().rev() {
            buffer.insert_char_offset(*offset, text);
        }

        let mut moved = vec![Span::default(); cursors.0.len()];
        for (rank, (offset, i)) in offsets.into_iter().enumerate() {
            let at = buffer.char_to_coord(offset + (rank + 1) * inserted);
            moved[i] = Span::point(at);
        }
        self.set_buf_ext(Cursors(moved))
    }

    // ==================== Misc ====================

    /// Ask the host loop to stop after the current input
    pub fn exit(&mut self) {
        self.editor.request_exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::combine::Sum;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct CopyPasta(String);

    #[derive(Debug, Clone, PartialEq)]
    struct Copied(String);

    struct Keypress;

    #[test]
    fn test_with_buffer_state_round_trip() {
        let mut editor = Editor::new();
        let mut act = editor.action();
        let b = act.create_buffer("abc").unwrap();
        act.with_buffer(b, |b| b.set_buf_ext(CopyPasta("x".into())))
            .unwrap();
        let got = act.with_buffer(b, |b| b.get_buf_ext::<CopyPasta>()).unwrap();
        assert_eq!(got, CopyPasta("x".into()));
    }

    #[test]
    fn test_buffer_stores_are_isolated() {
        let mut editor = Editor::new();
        let mut act = editor.action();
        let b1 = act.create_buffer("one").unwrap();
        let b2 = act.create_buffer("two").unwrap();
        act.with_buffer(b1, |b| b.set_buf_ext(CopyPasta("x".into())))
            .unwrap();
        let got = act.with_buffer(b2, |b| b.get_buf_ext::<CopyPasta>()).unwrap();
        assert_eq!(got, CopyPasta::default());
        // Global store is separate as well
        assert_eq!(act.get_ext::<CopyPasta>().unwrap(), CopyPasta::default());
    }

    #[test]
    fn test_global_listener_sees_payload_once() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut editor = Editor::new();
        let mut act = editor.action();
        let log = Rc::clone(&seen);
        act.add_listener(move |_, ev: &Copied| {
            log.borrow_mut().push(ev.0.clone());
            Ok(())
        });
        act.dispatch::<_, ()>(Copied("hi".into())).unwrap();
        assert_eq!(*seen.borrow(), vec!["hi".to_string()]);
    }

    #[test]
    fn test_removed_listener_not_invoked() {
        let count = Rc::new(RefCell::new(0));
        let mut editor = Editor::new();
        let mut act = editor.action();
        let c = Rc::clone(&count);
        let id = act.add_listener(move |_, _: &Keypress| {
            *c.borrow_mut() += 1;
            Ok(())
        });
        assert!(act.remove_listener(id));
        act.dispatch::<_, ()>(Keypress).unwrap();
        assert_eq!(*count.borrow(), 0);
        assert!(!act.remove_listener(id));
    }

    #[test]
    fn test_dispatch_with_no_listeners_is_identity() {
        let mut editor = Editor::new();
        let mut act = editor.action();
        let out: Sum = act.dispatch(Keypress).unwrap();
        assert_eq!(out, Sum(0));
        let out: Vec<String> = act.dispatch(Keypress).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_buffer_dispatch_stays_in_its_buffer() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let mut editor = Editor::new();
        let mut act = editor.action();
        let b1 = act.create_buffer("").unwrap();
        let b2 = act.create_buffer("").unwrap();

        for buf in [b1, b2] {
            let log = Rc::clone(&hits);
            act.with_buffer(buf, move |b| {
                b.add_buf_listener(move |b: &mut BufAction<'_>, _: &Keypress| {
                    log.borrow_mut().push(b.buf_ref());
                    Ok(())
                })
            })
            .unwrap();
        }
        let global = Rc::clone(&hits);
        act.add_listener(move |_, _: &Keypress| {
            global.borrow_mut().push(BufRef(usize::MAX));
            Ok(())
        });

        act.dispatch_to::<_, ()>(b2, Keypress).unwrap();
        assert_eq!(*hits.borrow(), vec![b2]);
    }

    #[test]
    fn test_destroyed_buffer_is_stale() {
        let mut editor = Editor::new();
        let mut act = editor.action();
        let b = act.create_buffer("abc").unwrap();
        act.destroy_buffer(b).unwrap();
        let err = act.with_buffer(b, |b| b.text()).unwrap_err();
        assert!(matches!(err, Error::StaleBuffer(r) if r == b));
        assert!(act.destroy_buffer(b).is_err());
        assert!(act.focused().is_empty());
    }

    #[test]
    fn test_destroy_inside_with_buffer_is_deferred() {
        let mut editor = Editor::new();
        let mut act = editor.action();
        let b = act.create_buffer("abc").unwrap();
        let text = act
            .with_buffer(b, |ba| {
                let me = ba.buf_ref();
                ba.editor_action().destroy_buffer(me)?;
                // Still fully usable until the body returns
                ba.insert_at(Coord::new(0, 3), "d")?;
                ba.text()
            })
            .unwrap();
        assert_eq!(text, "abcd");
        assert!(!act.editor().is_live(b));
    }

    #[test]
    fn test_doomed_buffer_is_stale_to_new_users() {
        let mut editor = Editor::new();
        let mut act = editor.action();
        let b = act.create_buffer("abc").unwrap();
        let other = act.create_buffer("xyz").unwrap();
        let checks = act
            .with_buffer(b, |ba| {
                let me = ba.buf_ref();
                let mut act = ba.editor_action();
                act.destroy_buffer(me)?;
                Ok((
                    act.editor().is_live(me),
                    act.with_buffer(me, |b| b.text()).is_ok(),
                    act.dispatch_to::<_, ()>(me, Keypress).is_ok(),
                    act.add_focus(me).is_ok(),
                    act.set_focus(vec![other, me]).is_ok(),
                    act.destroy_buffer(me).is_ok(),
                    act.buffers(),
                ))
            })
            .unwrap();
        assert_eq!(checks, (false, false, false, false, false, false, vec![other]));
        assert_eq!(act.focused(), Vec::<BufRef>::new());
        assert!(act.editor().buffer(b).is_err());
    }

    #[test]
    fn test_buf_removed_listener_still_reaches_buffer() {
        let mut editor = Editor::new();
        let mut act = editor.action();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        act.add_listener(move |act, removed: &BufRemoved| {
            let text = act.with_buffer(removed.0, |b| b.text())?;
            // A second destroy during the announcement is a no-op
            act.destroy_buffer(removed.0)?;
            log.borrow_mut().push(text);
            Ok(())
        });
        let b = act.create_buffer("bye").unwrap();
        act.destroy_buffer(b).unwrap();
        assert_eq!(*seen.borrow(), vec!["bye".to_string()]);
        assert!(!act.editor().is_live(b));
    }

    #[test]
    fn test_insert_text_at_every_cursor() {
        let mut editor = Editor::new();
        let mut act = editor.action();
        let b = act.create_buffer("ab\ncd").unwrap();
        let text = act
            .with_buffer(b, |ba| {
                ba.set_buf_ext(Cursors(vec![
                    Span::point(Coord::new(1, 1)),
                    Span::point(Coord::new(0, 1)),
                ]))?;
                ba.insert_text("XY")?;
                let cursors = ba.get_buf_ext::<Cursors>()?;
                assert_eq!(
                    cursors.0,
                    vec![
                        Span::point(Coord::new(1, 3)),
                        Span::point(Coord::new(0, 3)),
                    ]
                );
                ba.text()
            })
            .unwrap();
        assert_eq!(text, "aXYb\ncXYd");
    }

    #[test]
    fn test_focused_do_collects_in_order() {
        let mut editor = Editor::new();
        let mut act = editor.action();
        let b1 = act.create_buffer("one").unwrap();
        let b2 = act.create_buffer("two").unwrap();
        assert_eq!(act.focused(), vec![b1]);

        act.set_focus(vec![b2, b1]).unwrap();
        let texts = act.focused_do(|b| b.text()).unwrap();
        assert_eq!(texts, vec!["two".to_string(), "one".to_string()]);

        let all = act.buffers_do(|b| Ok(b.buf_ref())).unwrap();
        assert_eq!(all, vec![b1, b2]);

        assert!(act.set_focus(vec![BufRef(99)]).is_err());
    }

    #[test]
    fn test_buf_added_lets_extensions_attach_listeners() {
        let mut editor = Editor::new();
        let mut act = editor.action();
        act.add_listener(|act, added: &BufAdded| {
            act.with_buffer(added.0, |b| {
                b.add_buf_listener(|b: &mut BufAction<'_>, _: &Keypress| {
                    b.insert_text("k")
                })?;
                Ok(())
            })
        });
        let b = act.create_buffer("").unwrap();
        act.dispatch_to::<_, ()>(b, Keypress).unwrap();
        assert_eq!(act.with_buffer(b, |b| b.text()).unwrap(), "k");
    }
}
