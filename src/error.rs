//! Error types shared by the runtime, the bundled extensions and the binary.

use crate::core::id::{BufRef, ListenerId};
use std::fmt;

/// Convenience alias used throughout strand.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every fault the extension runtime can surface to an action.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A `BufRef` was used after its buffer was destroyed.
    #[error("stale buffer reference: {0}")]
    StaleBuffer(BufRef),

    /// A type-erased value was read back as a different type than it was stored with.
    #[error("type mismatch in {context}: expected {expected}")]
    TypeMismatch {
        expected: &'static str,
        context: &'static str,
    },

    /// Nested dispatch went deeper than the runtime allows.
    #[error("dispatch recursion limit ({0}) exceeded")]
    RecursionLimit(usize),

    /// One or more listeners failed during a single dispatch.
    #[error("{}", FaultList(.0))]
    ListenerFaults(Vec<ListenerFault>),

    /// A text coordinate lies outside the buffer.
    #[error("invalid position {row}:{col}")]
    InvalidPosition { row: usize, col: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn mismatch<T>(context: &'static str) -> Self {
        Error::TypeMismatch {
            expected: std::any::type_name::<T>(),
            context,
        }
    }

    /// True if this error is, or wraps, a stale-reference fault.
    pub fn is_stale(&self) -> bool {
        match self {
            Error::StaleBuffer(_) => true,
            Error::ListenerFaults(faults) => faults.iter().any(|f| f.error.is_stale()),
            _ => false,
        }
    }
}

/// A failure raised by one listener, tagged with the listener that raised it.
#[derive(Debug)]
pub struct ListenerFault {
    pub id: ListenerId,
    pub error: Box<Error>,
}

impl ListenerFault {
    pub fn new(id: ListenerId, error: Error) -> Self {
        Self {
            id,
            error: Box::new(error),
        }
    }
}

impl fmt::Display for ListenerFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.id, self.error)
    }
}

struct FaultList<'a>(&'a [ListenerFault]);

impl fmt::Display for FaultList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} listener(s) failed", self.0.len())?;
        for fault in self.0 {
            write!(f, "; {}", fault)?;
        }
        Ok(())
    }
}
