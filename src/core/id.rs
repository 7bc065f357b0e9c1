/// ID-based handle system for buffers and listeners
/// Handles are plain integers; the owning registry decides whether they are live
use std::fmt;

/// Stable handle identifying one live buffer
///
/// Refs are allocated from a monotonic counter and never reused, so a ref
/// held past its buffer's destruction is detected as stale instead of
/// silently addressing a newer buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufRef(pub usize);

impl fmt::Display for BufRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Buffer({})", self.0)
    }
}

/// Handle returned when a listener is added, used to remove it again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub usize);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({})", self.0)
    }
}
