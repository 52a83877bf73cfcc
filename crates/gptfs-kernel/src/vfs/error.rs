//! VFS error types.

use std::io;
use thiserror::Error;

/// VFS error type.
///
/// Every variant is recoverable: a failed operation leaves the session table
/// untouched and releases any slot lock it took.
#[derive(Debug, Error)]
pub enum VfsError {
    /// Path does not follow the `/`, `/{id}`, `/{id}/{leaf}` grammar.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Session id segment is unparsable or outside `[0, capacity)`.
    #[error("invalid session id: {0}")]
    InvalidSessionId(String),

    /// Leaf name is neither `input` nor `output`.
    #[error("no such entry: {0}")]
    NoSuchEntry(String),

    /// Write targeted `output` or a directory.
    #[error("not writable: {0}")]
    NotWritable(String),

    /// Requested more slots than the compile-time ceiling allows.
    #[error("capacity exceeded: requested {requested}, limit {limit}")]
    CapacityExceeded {
        /// Number of sessions asked for.
        requested: usize,
        /// Hard ceiling.
        limit: usize,
    },

    /// Expected a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Expected a file.
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// Table configuration rejected at construction.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl VfsError {
    /// Create an InvalidPath error.
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    /// Create an InvalidSessionId error.
    pub fn invalid_session_id(id: impl Into<String>) -> Self {
        Self::InvalidSessionId(id.into())
    }

    /// Create a NoSuchEntry error.
    pub fn no_such_entry(name: impl Into<String>) -> Self {
        Self::NoSuchEntry(name.into())
    }

    /// Create a NotWritable error.
    pub fn not_writable(path: impl Into<String>) -> Self {
        Self::NotWritable(path.into())
    }

    /// Create a NotADirectory error.
    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory(path.into())
    }

    /// Create an IsADirectory error.
    pub fn is_a_directory(path: impl Into<String>) -> Self {
        Self::IsADirectory(path.into())
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// True for every error a host should report as "entry does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            VfsError::InvalidPath(_)
                | VfsError::InvalidSessionId(_)
                | VfsError::NoSuchEntry(_)
        )
    }
}

/// Convert VfsError to std::io::Error for compatibility.
impl From<VfsError> for io::Error {
    fn from(e: VfsError) -> Self {
        match e {
            VfsError::InvalidPath(msg)
            | VfsError::InvalidSessionId(msg)
            | VfsError::NoSuchEntry(msg) => io::Error::new(io::ErrorKind::NotFound, msg),
            VfsError::NotWritable(msg) => io::Error::new(io::ErrorKind::PermissionDenied, msg),
            VfsError::CapacityExceeded { requested, limit } => io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("capacity exceeded: requested {requested}, limit {limit}"),
            ),
            VfsError::NotADirectory(msg) => io::Error::new(io::ErrorKind::NotADirectory, msg),
            VfsError::IsADirectory(msg) => io::Error::new(io::ErrorKind::IsADirectory, msg),
            VfsError::InvalidConfig(msg) => io::Error::new(io::ErrorKind::InvalidInput, msg),
        }
    }
}

/// VFS result type.
pub type VfsResult<T> = Result<T, VfsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_errors_are_not_found() {
        assert!(VfsError::invalid_path("x").is_not_found());
        assert!(VfsError::invalid_session_id("999").is_not_found());
        assert!(VfsError::no_such_entry("bogus").is_not_found());
        assert!(!VfsError::not_writable("/0/output").is_not_found());
        assert!(!VfsError::is_a_directory("/0").is_not_found());
    }

    #[test]
    fn test_io_error_kinds() {
        let e: io::Error = VfsError::invalid_session_id("256").into();
        assert_eq!(e.kind(), io::ErrorKind::NotFound);

        let e: io::Error = VfsError::not_writable("/0/output").into();
        assert_eq!(e.kind(), io::ErrorKind::PermissionDenied);

        let e: io::Error = VfsError::CapacityExceeded {
            requested: 70_000,
            limit: 65_536,
        }
        .into();
        assert_eq!(e.kind(), io::ErrorKind::InvalidInput);
    }
}
