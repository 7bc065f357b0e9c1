//! This module constitutes the core, headless runtime of strand.
//! It owns the extension state stores, the listener registries and event
//! dispatch, the buffer registry with its ropey-backed buffers, the action
//! contexts extensions run in, and the host loop that drives them from input.

pub mod action;
pub mod buffer;
pub mod combine;
pub mod dispatcher;
pub mod editor;
pub mod events;
pub mod host;
pub mod id;
pub mod input;
pub mod listeners;
pub mod registry;
pub mod state;
pub mod text;

pub use action::{Action, BufAction};
pub use combine::Combine;
pub use editor::{Editor, FaultPolicy};
pub use id::{BufRef, ListenerId};
pub use input::{Key, Keypress, Mods};
