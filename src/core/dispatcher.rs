//! Event dispatch.
//!
//! A dispatch snapshots the listeners registered for the event type, invokes
//! them one after another in registration order and folds their results with
//! the result type's [`Combine`] instance. Listener additions or removals made
//! while a dispatch runs only show up in later dispatches.
//!
//! Global dispatch reaches the editor-wide registry; buffer dispatch reaches
//! exactly one buffer's registry and nothing else.

use std::any::type_name;
use std::rc::Rc;

use crate::core::action::{Action, BufAction};
use crate::core::combine::Combine;
use crate::core::editor::{Editor, FaultPolicy};
use crate::core::id::{BufRef, ListenerId};
use crate::core::listeners::ErasedListener;
use crate::error::{Error, ListenerFault, Result};

/// Maximum nesting of dispatches to stop listeners that re-dispatch forever
pub const MAX_DISPATCH_DEPTH: usize = 64;

/// A global listener: runs editor-scoped
pub type Listener<E, R> = dyn Fn(&mut Action<'_>, &E) -> Result<R>;

/// A buffer listener: runs scoped to the buffer it was registered on
pub type BufListener<E, R> = dyn Fn(&mut BufAction<'_>, &E) -> Result<R>;

pub(crate) fn erase_listener<E, R, F>(listener: F) -> ErasedListener
where
    E: 'static,
    R: 'static,
    F: Fn(&mut Action<'_>, &E) -> Result<R> + 'static,
{
    let boxed: Box<Listener<E, R>> = Box::new(listener);
    Rc::new(boxed)
}

pub(crate) fn erase_buf_listener<E, R, F>(listener: F) -> ErasedListener
where
    E: 'static,
    R: 'static,
    F: Fn(&mut BufAction<'_>, &E) -> Result<R> + 'static,
{
    let boxed: Box<BufListener<E, R>> = Box::new(listener);
    Rc::new(boxed)
}

/// Recover the concrete listener type. A listener registered for `E` with a
/// different result type than the dispatch asks for is a type mismatch.
fn typed<L: ?Sized + 'static, R>(
    snapshot: Vec<(ListenerId, ErasedListener)>,
) -> Result<Vec<(ListenerId, Rc<Box<L>>)>> {
    snapshot
        .into_iter()
        .map(|(id, erased)| {
            erased
                .downcast::<Box<L>>()
                .map(|listener| (id, listener))
                .map_err(|_| Error::TypeMismatch {
                    expected: type_name::<R>(),
                    context: "dispatch result",
                })
        })
        .collect()
}

/// Dispatch `event` to the global registry.
pub fn dispatch_global<E, R>(editor: &mut Editor, event: &E) -> Result<R>
where
    E: 'static,
    R: Combine + 'static,
{
    let listeners = typed::<Listener<E, R>, R>(editor.listeners.snapshot::<E>())?;
    tracing::trace!(
        event = type_name::<E>(),
        listeners = listeners.len(),
        "global dispatch"
    );
    fold(editor, listeners, |editor, listener| {
        listener(&mut Action::new(editor), event)
    })
}

/// Dispatch `event` to one buffer's registry.
pub fn dispatch_buffer<E, R>(editor: &mut Editor, buf: BufRef, event: &E) -> Result<R>
where
    E: 'static,
    R: Combine + 'static,
{
    let snapshot = editor.buffers.slot(buf)?.listeners.snapshot::<E>();
    let listeners = typed::<BufListener<E, R>, R>(snapshot)?;
    tracing::trace!(
        event = type_name::<E>(),
        %buf,
        listeners = listeners.len(),
        "buffer dispatch"
    );
    fold(editor, listeners, |editor, listener| {
        listener(&mut BufAction::new(editor, buf), event)
    })
}

fn fold<L: ?Sized, R: Combine>(
    editor: &mut Editor,
    listeners: Vec<(ListenerId, Rc<Box<L>>)>,
    invoke: impl Fn(&mut Editor, &L) -> Result<R>,
) -> Result<R> {
    if editor.dispatch_depth >= MAX_DISPATCH_DEPTH {
        return Err(Error::RecursionLimit(MAX_DISPATCH_DEPTH));
    }
    editor.dispatch_depth += 1;

    let policy = editor.fault_policy;
    let mut acc = R::identity();
    let mut faults = Vec::new();
    for (id, listener) in listeners {
        match invoke(editor, &**listener) {
            Ok(result) => acc = acc.combine(result),
            Err(error) => {
                tracing::warn!(%id, %error, "listener failed");
                faults.push(ListenerFault::new(id, error));
                if policy == FaultPolicy::Abort {
                    break;
                }
            }
        }
    }

    editor.dispatch_depth -= 1;
    if faults.is_empty() {
        Ok(acc)
    } else {
        Err(Error::ListenerFaults(faults))
    }
}
