//! The terminal collaborator: raw mode, keyboard input and rendering.

pub mod events;
pub mod raw;
pub mod render;
