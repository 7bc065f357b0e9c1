//! Type-indexed listener registry.
//!
//! Listeners are stored type-erased, grouped by the `TypeId` of the event they
//! accept and kept in registration order. The registry itself never calls a
//! listener: the dispatcher takes a [`snapshot`](ListenerRegistry::snapshot)
//! and invokes that, so listeners added or removed mid-dispatch only affect
//! later dispatches.

use crate::core::id::ListenerId;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::rc::Rc;

/// A registered callback, type-erased. The dispatcher knows its concrete type.
pub type ErasedListener = Rc<dyn Any>;

#[derive(Clone)]
struct Entry {
    id: ListenerId,
    callback: ErasedListener,
}

/// Event-type-keyed, ordered collection of listeners
#[derive(Default)]
pub struct ListenerRegistry {
    by_event: HashMap<TypeId, Vec<Entry>>,
    /// Reverse index so removal by id does not scan every event type
    owners: HashMap<ListenerId, TypeId>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener for events of type `E`.
    pub fn add<E: 'static>(&mut self, id: ListenerId, callback: ErasedListener) {
        let event = TypeId::of::<E>();
        self.by_event
            .entry(event)
            .or_default()
            .push(Entry { id, callback });
        self.owners.insert(id, event);
    }

    /// Remove the listener registered under `id`. Returns false if it was not found.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let Some(event) = self.owners.remove(&id) else {
            return false;
        };
        if let Some(entries) = self.by_event.get_mut(&event) {
            entries.retain(|entry| entry.id != id);
            if entries.is_empty() {
                self.by_event.remove(&event);
            }
        }
        true
    }

    /// The listeners for `E`, in registration order, as of now.
    pub fn snapshot<E: 'static>(&self) -> Vec<(ListenerId, ErasedListener)> {
        self.by_event
            .get(&TypeId::of::<E>())
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| (entry.id, Rc::clone(&entry.callback)))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.owners.contains_key(&id)
    }

    /// Number of listeners registered for `E`.
    pub fn count<E: 'static>(&self) -> usize {
        self.by_event
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
