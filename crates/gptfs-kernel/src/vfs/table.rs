//! Fixed-capacity session table.
//!
//! One slot per session id. Each slot has its own lock, so traffic on one
//! session never waits on another; occupancy is an atomic flag so directory
//! listings can scan the table without touching any lock.

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use super::error::{VfsError, VfsResult};
use super::path::SessionPath;
use super::types::{FileAttr, Leaf, SessionId};
use crate::config::TableConfig;
use crate::constants::{DIR_PERM, FILE_PERM};
use crate::responder::Responder;

#[derive(Debug, Default)]
struct SlotState {
    input: Vec<u8>,
    output: Vec<u8>,
    generation: u64,
    modified: Option<SystemTime>,
}

impl SlotState {
    fn buffer(&self, leaf: Leaf) -> &[u8] {
        match leaf {
            Leaf::Input => &self.input,
            Leaf::Output => &self.output,
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    occupied: AtomicBool,
    state: Mutex<SlotState>,
}

/// Consistent view of one session, read in a single critical section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Session the view was taken from.
    pub id: SessionId,
    /// Current input.
    pub input: Vec<u8>,
    /// Output derived from `input`.
    pub output: Vec<u8>,
    /// Number of mutations the slot has seen.
    pub generation: u64,
}

/// Owns every session for the process lifetime.
pub struct SessionTable {
    slots: Box<[Slot]>,
    buffer_len: usize,
    responder: Arc<dyn Responder>,
    created: SystemTime,
}

impl std::fmt::Debug for SessionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTable")
            .field("capacity", &self.slots.len())
            .field("buffer_len", &self.buffer_len)
            .field("responder", &self.responder.name())
            .finish()
    }
}

impl SessionTable {
    /// Build a table using the responder named in `config`.
    pub fn new(config: &TableConfig) -> VfsResult<Self> {
        Self::with_responder(config, config.responder.build())
    }

    /// Build a table with an injected responder.
    pub fn with_responder(config: &TableConfig, responder: Arc<dyn Responder>) -> VfsResult<Self> {
        config.validate()?;
        let slots = (0..config.capacity).map(|_| Slot::default()).collect();
        tracing::info!(
            capacity = config.capacity,
            buffer_len = config.buffer_len,
            responder = responder.name(),
            "session table ready"
        );
        Ok(Self {
            slots,
            buffer_len: config.buffer_len,
            responder,
            created: SystemTime::now(),
        })
    }

    /// Number of session slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Per-buffer capacity, as reported in file sizes.
    pub fn buffer_len(&self) -> usize {
        self.buffer_len
    }

    /// Bytes a buffer can actually hold.
    pub fn usable_len(&self) -> usize {
        self.buffer_len - 1
    }

    /// Name of the installed responder.
    pub fn responder_name(&self) -> &str {
        self.responder.name()
    }

    fn slot(&self, id: SessionId) -> VfsResult<&Slot> {
        self.slots
            .get(id.index())
            .ok_or_else(|| VfsError::invalid_session_id(id.to_string()))
    }

    /// Attributes for a resolved path.
    ///
    /// Every in-range session is a directory whether or not it is occupied.
    pub fn get_attributes(&self, path: &SessionPath) -> VfsResult<FileAttr> {
        match *path {
            SessionPath::Root => Ok(FileAttr::directory(DIR_PERM, self.created)),
            SessionPath::SessionDir(id) => {
                let mtime = self.modified(id)?;
                Ok(FileAttr::directory(DIR_PERM, mtime))
            }
            SessionPath::SessionFile(id, _) => {
                let mtime = self.modified(id)?;
                Ok(FileAttr::file(self.buffer_len as u64, FILE_PERM, mtime))
            }
        }
    }

    fn modified(&self, id: SessionId) -> VfsResult<SystemTime> {
        let slot = self.slot(id)?;
        Ok(slot.state.lock().modified.unwrap_or(self.created))
    }

    /// Occupied sessions in ascending id order.
    ///
    /// Each flag is read atomically; writers are never blocked by a listing.
    pub fn list_sessions(&self) -> Vec<SessionId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.occupied.load(Ordering::Acquire))
            .map(|(index, _)| SessionId::new(index))
            .collect()
    }

    /// Mark a session occupied and clear both buffers.
    pub fn init_session(&self, id: SessionId) -> VfsResult<()> {
        let slot = self.slot(id)?;
        let mut state = slot.state.lock();
        state.input.clear();
        state.output.clear();
        state.generation += 1;
        state.modified = Some(SystemTime::now());
        slot.occupied.store(true, Ordering::Release);
        tracing::debug!(session = %id, generation = state.generation, "session initialised");
        Ok(())
    }

    /// Copy up to `max_len` bytes of a buffer starting at `offset`.
    ///
    /// Reading at or past the end yields an empty vector.
    pub fn read(
        &self,
        id: SessionId,
        leaf: Leaf,
        offset: u64,
        max_len: usize,
    ) -> VfsResult<Vec<u8>> {
        let slot = self.slot(id)?;
        let state = slot.state.lock();
        let data = state.buffer(leaf);
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(data.len());
        let end = start.saturating_add(max_len).min(data.len());
        tracing::trace!(session = %id, %leaf, offset, len = end - start, "read");
        Ok(data[start..end].to_vec())
    }

    /// Replace the input and compute the matching output.
    ///
    /// Input beyond the usable length is dropped. The responder runs inside
    /// the slot's critical section, so no reader can observe an output that
    /// belongs to a different input. It runs before any field is touched: a
    /// panicking responder leaves the slot as it was. Returns the number of
    /// bytes accepted.
    pub fn write_input(&self, id: SessionId, data: &[u8]) -> VfsResult<usize> {
        let slot = self.slot(id)?;
        let usable = self.usable_len();
        let accepted = &data[..data.len().min(usable)];

        let mut state = slot.state.lock();
        let mut output = self.responder.respond(accepted);
        output.truncate(usable);

        state.input.clear();
        state.input.extend_from_slice(accepted);
        state.output = output;

        state.generation += 1;
        state.modified = Some(SystemTime::now());
        slot.occupied.store(true, Ordering::Release);

        tracing::debug!(
            session = %id,
            accepted = accepted.len(),
            dropped = data.len() - accepted.len(),
            output = state.output.len(),
            generation = state.generation,
            "input written"
        );
        Ok(accepted.len())
    }

    /// Input, output and generation read together.
    pub fn snapshot(&self, id: SessionId) -> VfsResult<SessionSnapshot> {
        let slot = self.slot(id)?;
        let state = slot.state.lock();
        Ok(SessionSnapshot {
            id,
            input: state.input.clone(),
            output: state.output.clone(),
            generation: state.generation,
        })
    }

    /// Number of mutations the session has seen.
    pub fn generation(&self, id: SessionId) -> VfsResult<u64> {
        Ok(self.slot(id)?.state.lock().generation)
    }
}
