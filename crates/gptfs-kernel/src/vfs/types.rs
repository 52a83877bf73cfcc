//! Core VFS types.
//!
//! Path-based, inode-free types shared by the session table, the dispatch
//! surface and host adapters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;
use strum::{Display, EnumString};

/// Identifier of one session slot.
///
/// Construction is unchecked; the session table validates the index against
/// its capacity on every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(usize);

impl SessionId {
    /// Wrap a raw slot index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The slot index.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pseudo-file inside a session directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Leaf {
    /// Prompt submitted by the client. The only writable file.
    Input,
    /// Response derived from the most recent input.
    Output,
}

impl Leaf {
    /// Both leaves in directory-listing order.
    pub const ALL: [Leaf; 2] = [Leaf::Input, Leaf::Output];

    /// File name inside the session directory.
    pub fn as_str(self) -> &'static str {
        match self {
            Leaf::Input => "input",
            Leaf::Output => "output",
        }
    }

    /// Returns true if clients may write this leaf.
    pub fn is_writable(self) -> bool {
        matches!(self, Leaf::Input)
    }
}

/// File type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
}

impl FileType {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileType::File)
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, FileType::Directory)
    }
}

/// File attributes (metadata).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAttr {
    /// Size in bytes.
    pub size: u64,
    /// File type.
    pub kind: FileType,
    /// Unix permissions (e.g., 0o644).
    pub perm: u32,
    /// Last modification time.
    pub mtime: SystemTime,
    /// Number of hard links.
    pub nlink: u32,
}

impl FileAttr {
    /// Attributes for a session pseudo-file.
    pub fn file(size: u64, perm: u32, mtime: SystemTime) -> Self {
        Self {
            size,
            kind: FileType::File,
            perm,
            mtime,
            nlink: 1,
        }
    }

    /// Attributes for the root or a session directory.
    pub fn directory(perm: u32, mtime: SystemTime) -> Self {
        Self {
            size: 0,
            kind: FileType::Directory,
            perm,
            mtime,
            nlink: 2, // . and ..
        }
    }

    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}

/// Directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Entry name (not full path).
    pub name: String,
    /// Entry type.
    pub kind: FileType,
}

impl DirEntry {
    /// Create a new directory entry.
    pub fn new(name: impl Into<String>, kind: FileType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Create a file entry.
    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name, FileType::File)
    }

    /// Create a directory entry.
    pub fn directory(name: impl Into<String>) -> Self {
        Self::new(name, FileType::Directory)
    }
}

/// Open file flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFlags {
    /// Read access requested.
    pub read: bool,
    /// Write access requested.
    pub write: bool,
}

impl Default for OpenFlags {
    fn default() -> Self {
        Self {
            read: true,
            write: false,
        }
    }
}

impl OpenFlags {
    /// Read-only access.
    pub fn read() -> Self {
        Self::default()
    }

    /// Write access (also enables read).
    pub fn write() -> Self {
        Self {
            read: true,
            write: true,
        }
    }

    /// Write-only access, as `open(O_WRONLY)` requests it.
    pub fn write_only() -> Self {
        Self {
            read: false,
            write: true,
        }
    }
}
