//! Events the runtime itself dispatches.
//!
//! Extensions define their own event types freely; these are the ones the host
//! loop and the buffer registry emit. Listeners for all of them return `()`.

use crate::core::id::BufRef;

/// Dispatched once, before the first input is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Init;

/// Dispatched before each input's keypress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeforeEvent;

/// Dispatched after each input's keypress listeners have run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AfterEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeforeRender;

/// Renderers draw in response to this
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnRender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AfterRender;

/// Dispatched once when the host loop shuts down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exit;

/// A buffer was created. Dispatched globally so extensions can attach
/// per-buffer listeners right away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufAdded(pub BufRef);

/// A buffer is about to be destroyed. Its ref is still live while this runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufRemoved(pub BufRef);

/// A named command, produced by the key-bindings extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command(pub String);

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Command(name.into())
    }

    pub fn is(&self, name: &str) -> bool {
        self.0 == name
    }
}
