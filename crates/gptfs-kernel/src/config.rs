//! Session table configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BUFFER_LEN, DEFAULT_SESSIONS, MAX_SESSIONS, MIN_BUFFER_LEN};
use crate::responder::ResponderKind;
use crate::vfs::{VfsError, VfsResult};

/// Shape of the session table, fixed for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Number of session slots (`CAPACITY`).
    pub capacity: usize,

    /// Per-buffer capacity in bytes (`C`); `C - 1` bytes are usable.
    pub buffer_len: usize,

    /// Built-in responder used when none is injected.
    pub responder: ResponderKind,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_SESSIONS,
            buffer_len: DEFAULT_BUFFER_LEN,
            responder: ResponderKind::default(),
        }
    }
}

impl TableConfig {
    /// Create a config with the given dimensions and the default responder.
    pub fn new(capacity: usize, buffer_len: usize) -> Self {
        Self {
            capacity,
            buffer_len,
            responder: ResponderKind::default(),
        }
    }

    /// Set the responder.
    pub fn with_responder(mut self, responder: ResponderKind) -> Self {
        self.responder = responder;
        self
    }

    /// Bytes a buffer can hold.
    pub fn usable_len(&self) -> usize {
        self.buffer_len.saturating_sub(1)
    }

    /// Check the dimensions before any slot is allocated.
    pub fn validate(&self) -> VfsResult<()> {
        if self.capacity == 0 {
            return Err(VfsError::invalid_config("session capacity must be at least 1"));
        }
        if self.capacity > MAX_SESSIONS {
            return Err(VfsError::CapacityExceeded {
                requested: self.capacity,
                limit: MAX_SESSIONS,
            });
        }
        if self.buffer_len < MIN_BUFFER_LEN {
            return Err(VfsError::invalid_config(format!(
                "buffer_len must be at least {MIN_BUFFER_LEN}, got {}",
                self.buffer_len
            )));
        }
        Ok(())
    }
}
