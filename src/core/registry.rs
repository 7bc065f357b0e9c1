//! The set of live buffers.
//!
//! Each buffer owns its text, a fresh extension state store and a fresh
//! listener registry. Buffers are addressed by [`BufRef`]s allocated from a
//! counter that never goes backwards, so a destroyed buffer's ref can never
//! alias a newer buffer.
//!
//! A buffer that is being worked on (acquired through
//! [`Action::with_buffer`](crate::core::action::Action::with_buffer)) cannot
//! be torn down underneath its user: destruction requested while it is held
//! is deferred until the last hold is released. From the moment destruction
//! completes its notification the ref is stale to everyone else; only the
//! holders that were already running keep reaching the slot.

use std::collections::BTreeMap;

use crate::core::buffer::Buffer;
use crate::core::id::BufRef;
use crate::core::listeners::ListenerRegistry;
use crate::core::state::ExtensionStateStore;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Lifecycle {
    #[default]
    Live,
    /// Removal announced; still reachable until the announcement ends
    Removing,
    /// Gone for new users; torn down when the last hold is released
    Doomed,
}

/// Everything that belongs to one buffer
#[derive(Default)]
pub struct BufferSlot {
    pub buffer: Buffer,
    pub state: ExtensionStateStore,
    pub listeners: ListenerRegistry,
    /// Number of active scoped acquisitions
    holds: usize,
    lifecycle: Lifecycle,
}

impl BufferSlot {
    fn new(buffer: Buffer) -> Self {
        Self {
            buffer,
            ..Self::default()
        }
    }

    pub fn is_held(&self) -> bool {
        self.holds > 0
    }

    /// Destruction was requested; the slot only lingers for running holders
    pub fn is_doomed(&self) -> bool {
        self.lifecycle == Lifecycle::Doomed
    }

    /// Destruction is being announced right now
    pub fn is_removing(&self) -> bool {
        self.lifecycle == Lifecycle::Removing
    }

    fn is_reachable(&self) -> bool {
        self.lifecycle != Lifecycle::Doomed
    }
}

/// Outcome of a destruction request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Teardown {
    /// The buffer and its stores are gone
    Destroyed,
    /// The buffer is held; it goes away when released
    Deferred,
}

#[derive(Default)]
pub struct BufferRegistry {
    /// Ordered by ref, which is creation order
    slots: BTreeMap<BufRef, BufferSlot>,
    next_ref: usize,
}

impl BufferRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a ref for `buffer` together with empty per-buffer stores.
    pub fn create(&mut self, buffer: Buffer) -> BufRef {
        let buf = BufRef(self.next_ref);
        self.next_ref += 1;
        self.slots.insert(buf, BufferSlot::new(buffer));
        buf
    }

    /// True if `buf` can still be acquired
    pub fn contains(&self, buf: BufRef) -> bool {
        self.slots.get(&buf).is_some_and(BufferSlot::is_reachable)
    }

    /// The slot behind `buf`, including a doomed one still held by a running
    /// scoped action.
    pub fn slot(&self, buf: BufRef) -> Result<&BufferSlot> {
        self.slots.get(&buf).ok_or(Error::StaleBuffer(buf))
    }

    pub fn slot_mut(&mut self, buf: BufRef) -> Result<&mut BufferSlot> {
        self.slots.get_mut(&buf).ok_or(Error::StaleBuffer(buf))
    }

    /// Live buffer refs in creation order.
    pub fn refs(&self) -> Vec<BufRef> {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.is_reachable())
            .map(|(buf, _)| *buf)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.values().filter(|slot| slot.is_reachable()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pin a buffer for the duration of a scoped action. Doomed buffers are
    /// stale.
    pub fn acquire(&mut self, buf: BufRef) -> Result<()> {
        match self.slots.get_mut(&buf) {
            Some(slot) if slot.is_reachable() => {
                slot.holds += 1;
                Ok(())
            }
            _ => Err(Error::StaleBuffer(buf)),
        }
    }

    /// Undo one [`acquire`](Self::acquire). Completes a deferred destruction
    /// when the last hold goes; returns true in that case.
    pub fn release(&mut self, buf: BufRef) -> bool {
        let finished = match self.slots.get_mut(&buf) {
            Some(slot) => {
                slot.holds = slot.holds.saturating_sub(1);
                slot.holds == 0 && slot.is_doomed()
            }
            None => false,
        };
        if finished {
            self.slots.remove(&buf);
            tracing::debug!(%buf, "deferred buffer teardown completed");
        }
        finished
    }

    /// Start destroying `buf`: the buffer stays reachable, and pinned, until
    /// [`finish_removal`](Self::finish_removal). Returns false if a removal
    /// is already being announced.
    pub fn begin_removal(&mut self, buf: BufRef) -> Result<bool> {
        match self.slots.get_mut(&buf) {
            Some(slot) if slot.lifecycle == Lifecycle::Live => {
                slot.lifecycle = Lifecycle::Removing;
                slot.holds += 1;
                Ok(true)
            }
            Some(slot) if slot.is_removing() => Ok(false),
            _ => Err(Error::StaleBuffer(buf)),
        }
    }

    /// End a removal started by [`begin_removal`](Self::begin_removal). The
    /// ref is stale from here on; the slot itself goes once nothing holds it.
    pub fn finish_removal(&mut self, buf: BufRef) -> Teardown {
        if let Some(slot) = self.slots.get_mut(&buf) {
            slot.lifecycle = Lifecycle::Doomed;
        }
        if self.release(buf) {
            Teardown::Destroyed
        } else {
            Teardown::Deferred
        }
    }

    /// Tear a buffer down now, or as soon as it is no longer held.
    pub fn destroy(&mut self, buf: BufRef) -> Result<Teardown> {
        if !self.begin_removal(buf)? {
            return Ok(Teardown::Deferred);
        }
        Ok(self.finish_removal(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refs_are_never_reused() {
        let mut reg = BufferRegistry::new();
        let a = reg.create(Buffer::new());
        assert_eq!(reg.destroy(a).unwrap(), Teardown::Destroyed);
        let b = reg.create(Buffer::new());
        assert_ne!(a, b);
        assert!(matches!(reg.slot(a), Err(Error::StaleBuffer(r)) if r == a));
        assert!(reg.slot(b).is_ok());
    }

    #[test]
    fn test_refs_in_creation_order() {
        let mut reg = BufferRegistry::new();
        let a = reg.create(Buffer::new());
        let b = reg.create(Buffer::new());
        let c = reg.create(Buffer::new());
        reg.destroy(b).unwrap();
        assert_eq!(reg.refs(), vec![a, c]);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_destroy_while_held_is_deferred() {
        let mut reg = BufferRegistry::new();
        let a = reg.create(Buffer::from_string("abc"));
        reg.acquire(a).unwrap();
        reg.acquire(a).unwrap();

        assert_eq!(reg.destroy(a).unwrap(), Teardown::Deferred);
        assert!(reg.slot(a).unwrap().is_doomed());

        // Stale to newcomers at once; the slot outlives the holds
        assert!(!reg.contains(a));
        assert!(reg.refs().is_empty());
        assert!(matches!(reg.acquire(a), Err(Error::StaleBuffer(_))));
        assert!(!reg.release(a));
        assert_eq!(reg.slot(a).unwrap().buffer.text(), "abc");
        assert!(reg.release(a));
        assert!(reg.slot(a).is_err());
    }

    #[test]
    fn test_removal_window() {
        let mut reg = BufferRegistry::new();
        let a = reg.create(Buffer::new());
        assert!(reg.begin_removal(a).unwrap());
        assert!(reg.slot(a).unwrap().is_removing());
        assert!(!reg.begin_removal(a).unwrap());

        // Reachable while the removal is announced
        assert!(reg.contains(a));
        reg.acquire(a).unwrap();
        assert!(!reg.release(a));

        assert_eq!(reg.finish_removal(a), Teardown::Destroyed);
        assert!(!reg.contains(a));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_stale_acquire_and_destroy() {
        let mut reg = BufferRegistry::new();
        let a = reg.create(Buffer::new());
        reg.destroy(a).unwrap();
        assert!(reg.acquire(a).is_err());
        assert!(reg.destroy(a).is_err());
        assert!(!reg.release(a));
    }
}
