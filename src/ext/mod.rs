//! Bundled extensions.
//!
//! Each extension is a module with an `install` function that registers its
//! listeners on an editor-scoped [`Action`](crate::core::Action) and keeps its
//! state in wrapper types of its own. They talk to each other only through
//! events, chiefly the [`Command`](crate::core::events::Command) events the
//! bindings extension produces from keypresses.

pub mod bindings;
pub mod control;
pub mod copy_pasta;
pub mod cursors;
pub mod editing;
pub mod logger;
pub mod status;
