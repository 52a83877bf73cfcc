//! Session path resolution.
//!
//! Grammar:
//!
//! ```text
//! /                 root, lists sessions
//! /{id}  /{id}/     session directory
//! /{id}/input       writable prompt file
//! /{id}/output      response file
//! ```
//!
//! The id segment is strict: ASCII digits only, leading zeros allowed.
//! `/03abc/input` and `/session3` are rejected rather than truncated to a
//! leading number.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use super::error::{VfsError, VfsResult};
use super::types::{Leaf, SessionId};

/// A resolved location in the session namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPath {
    /// `/`
    Root,
    /// `/{id}`
    SessionDir(SessionId),
    /// `/{id}/{leaf}`
    SessionFile(SessionId, Leaf),
}

impl SessionPath {
    /// Resolve a path string against a table of `capacity` sessions.
    pub fn parse(path: &str, capacity: usize) -> VfsResult<Self> {
        let Some(rest) = path.strip_prefix('/') else {
            return Err(VfsError::invalid_path(path));
        };
        if rest.is_empty() {
            return Ok(SessionPath::Root);
        }

        let (segment, leaf) = match rest.split_once('/') {
            Some((segment, leaf)) => (segment, Some(leaf)),
            None => (rest, None),
        };
        let id = parse_session_id(segment, capacity)?;

        match leaf {
            None | Some("") => Ok(SessionPath::SessionDir(id)),
            Some(name) => Leaf::from_str(name)
                .map(|leaf| SessionPath::SessionFile(id, leaf))
                .map_err(|_| VfsError::no_such_entry(path)),
        }
    }

    /// Resolve a filesystem path. Non UTF-8 paths are invalid.
    pub fn from_path(path: &Path, capacity: usize) -> VfsResult<Self> {
        let text = path
            .to_str()
            .ok_or_else(|| VfsError::invalid_path(path.to_string_lossy()))?;
        Self::parse(text, capacity)
    }

    /// Session addressed by this path, if any.
    pub fn session(&self) -> Option<SessionId> {
        match self {
            SessionPath::Root => None,
            SessionPath::SessionDir(id) | SessionPath::SessionFile(id, _) => Some(*id),
        }
    }

    /// Leaf addressed by this path, if any.
    pub fn leaf(&self) -> Option<Leaf> {
        match self {
            SessionPath::SessionFile(_, leaf) => Some(*leaf),
            _ => None,
        }
    }

    /// Returns true for the root and session directories.
    pub fn is_dir(&self) -> bool {
        !matches!(self, SessionPath::SessionFile(..))
    }
}

impl fmt::Display for SessionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPath::Root => f.write_str("/"),
            SessionPath::SessionDir(id) => write!(f, "/{id}"),
            SessionPath::SessionFile(id, leaf) => write!(f, "/{id}/{leaf}"),
        }
    }
}

/// Parse a decimal id segment and range-check it.
fn parse_session_id(segment: &str, capacity: usize) -> VfsResult<SessionId> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VfsError::invalid_session_id(segment));
    }
    // All digits, so the only possible failure is overflow.
    let index: usize = segment
        .parse()
        .map_err(|_| VfsError::invalid_session_id(segment))?;
    if index >= capacity {
        return Err(VfsError::invalid_session_id(segment));
    }
    Ok(SessionId::new(index))
}
