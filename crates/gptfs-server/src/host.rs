//! Host-adapter helpers: inode numbering and errno mapping.
//!
//! Inodes are computed from the session path, never allocated:
//!
//! ```text
//! /              1
//! /{i}           2 + 3i
//! /{i}/input     3 + 3i
//! /{i}/output    4 + 3i
//! ```

use gptfs_kernel::{Leaf, SessionId, SessionPath, VfsError, VfsResult};

/// Inode of `/`.
pub const ROOT_INODE: u64 = 1;

const FIRST_SESSION_INODE: u64 = 2;
const INODES_PER_SESSION: u64 = 3;

/// Inode number for a resolved path.
pub fn inode_for(path: &SessionPath) -> u64 {
    let base = |id: SessionId| FIRST_SESSION_INODE + INODES_PER_SESSION * id.index() as u64;
    match *path {
        SessionPath::Root => ROOT_INODE,
        SessionPath::SessionDir(id) => base(id),
        SessionPath::SessionFile(id, Leaf::Input) => base(id) + 1,
        SessionPath::SessionFile(id, Leaf::Output) => base(id) + 2,
    }
}

/// Path for an inode, or `None` if it lies outside the table.
pub fn path_for(inode: u64, capacity: usize) -> Option<SessionPath> {
    if inode == ROOT_INODE {
        return Some(SessionPath::Root);
    }
    let offset = inode.checked_sub(FIRST_SESSION_INODE)?;
    let index = usize::try_from(offset / INODES_PER_SESSION).ok()?;
    if index >= capacity {
        return None;
    }
    let id = SessionId::new(index);
    Some(match offset % INODES_PER_SESSION {
        0 => SessionPath::SessionDir(id),
        1 => SessionPath::SessionFile(id, Leaf::Input),
        _ => SessionPath::SessionFile(id, Leaf::Output),
    })
}

/// Resolve `name` inside directory `parent`.
pub fn child(parent: &SessionPath, name: &str, capacity: usize) -> VfsResult<SessionPath> {
    let path = match parent {
        SessionPath::Root => format!("/{name}"),
        SessionPath::SessionDir(id) => format!("/{id}/{name}"),
        file @ SessionPath::SessionFile(..) => {
            return Err(VfsError::not_a_directory(file.to_string()));
        }
    };
    SessionPath::parse(&path, capacity)
}

/// Errno a host should return for `err`.
///
/// Resolution failures all collapse to `ENOENT`; writes to read-only leaves
/// become `EPERM`.
pub fn errno(err: &VfsError) -> i32 {
    match err {
        VfsError::InvalidPath(_) | VfsError::InvalidSessionId(_) | VfsError::NoSuchEntry(_) => {
            libc::ENOENT
        }
        VfsError::NotWritable(_) => libc::EPERM,
        VfsError::IsADirectory(_) => libc::EISDIR,
        VfsError::NotADirectory(_) => libc::ENOTDIR,
        VfsError::CapacityExceeded { .. } | VfsError::InvalidConfig(_) => libc::EINVAL,
    }
}
