//! Session-addressable virtual filesystem.
//!
//! Key components:
//!
//! - [`SessionTable`] - Fixed-capacity slots, one lock per session
//! - [`SessionPath`] - Stateless resolution of `/{id}/{leaf}` paths
//! - [`VfsOps`] - Core trait for filesystem operations
//! - [`SessionFs`] - The [`VfsOps`] implementation hosts call into
//!
//! ## Design Decisions
//!
//! - **Path-based, no inodes**: Operations use paths, not inode numbers.
//!   Host adapters map inodes to paths themselves.
//! - **Explicit offset/size**: Reads take offset and size without handle
//!   state; open only validates.
//! - **Compute on write**: Writing `input` runs the responder in the same
//!   critical section, so `output` always matches the latest `input`.

mod error;
mod ops;
mod path;
mod session_fs;
mod table;
mod types;

pub use error::{VfsError, VfsResult};
pub use ops::VfsOps;
pub use path::SessionPath;
pub use session_fs::SessionFs;
pub use table::{SessionSnapshot, SessionTable};
pub use types::{DirEntry, FileAttr, FileType, Leaf, OpenFlags, SessionId};
