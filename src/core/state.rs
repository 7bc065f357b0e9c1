//! Type-indexed extension state.
//!
//! An [`ExtensionStateStore`] holds at most one value per Rust type. Extensions
//! keep their state apart by defining their own wrapper types; nothing else
//! namespaces the entries. Reading a type that was never written materializes
//! its `Default` value, so no per-buffer initialization hook is needed.
//!
//! One store lives on the editor (global scope) and one on every buffer.

use crate::error::{Error, Result};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Anything that can be stored as extension state.
///
/// Blanket-implemented for every `'static + Debug` type; the `Debug` bound is
/// what lets diagnostic extensions render other extensions' state.
pub trait Extension: Any + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn type_name(&self) -> &'static str;
}

impl<T: Any + fmt::Debug> Extension for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Mapping from type identity to one owned, type-erased value of that type
#[derive(Default)]
pub struct ExtensionStateStore {
    entries: HashMap<TypeId, Box<dyn Extension>>,
}

impl ExtensionStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy of the stored `T`, materializing `T::default()` if absent.
    pub fn get<T>(&mut self) -> Result<T>
    where
        T: Extension + Default + Clone,
    {
        self.get_mut::<T>().map(|value| value.clone())
    }

    /// Mutable access to the stored `T`, materializing the default if absent.
    pub fn get_mut<T>(&mut self) -> Result<&mut T>
    where
        T: Extension + Default,
    {
        let entry = self
            .entries
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(T::default()));
        (**entry)
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or_else(|| Error::mismatch::<T>("extension state"))
    }

    /// Read the stored `T` without materializing it.
    pub fn peek<T: Extension>(&self) -> Result<Option<&T>> {
        match self.entries.get(&TypeId::of::<T>()) {
            None => Ok(None),
            Some(entry) => (**entry)
                .as_any()
                .downcast_ref::<T>()
                .map(Some)
                .ok_or_else(|| Error::mismatch::<T>("extension state")),
        }
    }

    /// Overwrite (or create) the stored `T`.
    pub fn set<T: Extension>(&mut self, value: T) {
        self.entries.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Apply `f` to the stored `T` (default if absent) and return its result.
    pub fn modify<T, R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Result<R>
    where
        T: Extension + Default,
    {
        self.get_mut::<T>().map(f)
    }

    pub fn contains<T: Extension>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Drop the stored `T`; the next read sees the default again.
    pub fn remove<T: Extension>(&mut self) -> bool {
        self.entries.remove(&TypeId::of::<T>()).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(type name, Debug rendering)` of every entry, sorted by type name.
    pub fn describe(&self) -> Vec<(&'static str, String)> {
        let mut out: Vec<_> = self
            .entries
            .values()
            .map(|entry| ((**entry).type_name(), format!("{:?}", entry)))
            .collect();
        out.sort();
        out
    }
}

impl fmt::Debug for ExtensionStateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.describe()).finish()
    }
}
