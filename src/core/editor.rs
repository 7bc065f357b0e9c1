//! This module defines the central `Editor` structure, the per-session context
//! every action runs against: the global extension store and listener
//! registry, the buffer registry, the focus list and the host loop's flags.
//!
//! The editor is constructed once at startup and passed explicitly to the host
//! loop; nothing about it is ambient or global.

use std::fmt;
use std::str::FromStr;

use crate::config::Config;
use crate::core::action::Action;
use crate::core::buffer::Buffer;
use crate::core::id::{BufRef, ListenerId};
use crate::core::listeners::ListenerRegistry;
use crate::core::registry::BufferRegistry;
use crate::core::state::{Extension, ExtensionStateStore};
use crate::error::{Error, Result};

/// What a dispatch does when one of its listeners fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultPolicy {
    /// Run the remaining listeners and report every failure together
    #[default]
    Continue,
    /// Stop at the first failure
    Abort,
}

impl FromStr for FaultPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "continue" => Ok(FaultPolicy::Continue),
            "abort" => Ok(FaultPolicy::Abort),
            other => Err(Error::Config(format!(
                "listener_faults must be \"continue\" or \"abort\", got {:?}",
                other
            ))),
        }
    }
}

/// Editor: the root session state shared by every extension
pub struct Editor {
    /// Global extension state
    pub(crate) state: ExtensionStateStore,
    /// Global listeners
    pub(crate) listeners: ListenerRegistry,
    /// All live buffers with their per-buffer stores
    pub(crate) buffers: BufferRegistry,
    /// Buffers that buffer-scoped input applies to, in order
    pub(crate) focus: Vec<BufRef>,
    /// Next listener ID to allocate
    next_listener_id: usize,
    /// Nesting of in-progress dispatches
    pub(crate) dispatch_depth: usize,
    pub fault_policy: FaultPolicy,
    /// Set by an action to end the host loop after the current input
    exiting: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// An editor with no buffers, no listeners and empty global state
    pub fn new() -> Self {
        Self {
            state: ExtensionStateStore::new(),
            listeners: ListenerRegistry::new(),
            buffers: BufferRegistry::new(),
            focus: Vec::new(),
            next_listener_id: 0,
            dispatch_depth: 0,
            fault_policy: FaultPolicy::default(),
            exiting: false,
        }
    }

    /// Build an editor whose runtime settings come from `config`
    pub fn with_config(config: &Config) -> Result<Self> {
        let mut editor = Self::new();
        editor.fault_policy = config.parse_or("listener_faults", FaultPolicy::default())?;
        Ok(editor)
    }

    /// Editor-scoped execution context over this editor
    pub fn action(&mut self) -> Action<'_> {
        Action::new(self)
    }

    pub(crate) fn alloc_listener_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        id
    }

    pub(crate) fn request_exit(&mut self) {
        self.exiting = true;
    }

    pub fn is_exiting(&self) -> bool {
        self.exiting
    }

    // ==================== Read-only views ====================
    //
    // Renderers and diagnostic extensions read any store; writes go through actions.

    pub fn global_state(&self) -> &ExtensionStateStore {
        &self.state
    }

    /// Stored global `T`, if it has been materialized
    pub fn peek_ext<T: Extension>(&self) -> Result<Option<&T>> {
        self.state.peek::<T>()
    }

    pub fn buffer(&self, buf: BufRef) -> Result<&Buffer> {
        Ok(&self.buffers.slot(buf)?.buffer)
    }

    pub fn buffer_state(&self, buf: BufRef) -> Result<&ExtensionStateStore> {
        Ok(&self.buffers.slot(buf)?.state)
    }

    /// Live buffers in creation order
    pub fn buffers(&self) -> Vec<BufRef> {
        self.buffers.refs()
    }

    pub fn is_live(&self, buf: BufRef) -> bool {
        self.buffers.contains(buf)
    }

    pub fn focused(&self) -> &[BufRef] {
        &self.focus
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("state", &self.state)
            .field("buffers", &self.buffers.refs())
            .field("focus", &self.focus)
            .field("listeners", &self.listeners.len())
            .field("fault_policy", &self.fault_policy)
            .field("exiting", &self.exiting)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_editor_is_empty() {
        let editor = Editor::new();
        assert!(editor.buffers().is_empty());
        assert!(editor.focused().is_empty());
        assert_eq!(editor.listener_count(), 0);
        assert!(!editor.is_exiting());
        assert_eq!(editor.fault_policy, FaultPolicy::Continue);
    }

    #[test]
    fn test_listener_ids_are_unique() {
        let mut editor = Editor::new();
        let a = editor.alloc_listener_id();
        let b = editor.alloc_listener_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_fault_policy_from_config() {
        let mut config = Config::default();
        config.set("listener_faults", "abort");
        let editor = Editor::with_config(&config).unwrap();
        assert_eq!(editor.fault_policy, FaultPolicy::Abort);

        config.set("listener_faults", "sometimes");
        assert!(matches!(Editor::with_config(&config), Err(Error::Config(_))));

        config.set("listener_faults", 3i64);
        assert!(Editor::with_config(&config).is_err());
    }

    #[test]
    fn test_stale_views() {
        let editor = Editor::new();
        assert!(matches!(
            editor.buffer(BufRef(0)),
            Err(Error::StaleBuffer(BufRef(0)))
        ));
        assert!(editor.buffer_state(BufRef(0)).is_err());
    }
}
