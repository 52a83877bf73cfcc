//! VFS operations trait.
//!
//! This trait defines the filesystem operations a host integration layer
//! calls into, in a path-based form (no inodes, explicit offset/size).

use async_trait::async_trait;
use std::path::Path;

use super::types::{DirEntry, FileAttr, OpenFlags};
use super::VfsResult;

/// Core VFS operations trait.
///
/// All operations are path-based (no inode numbers). Host adapters such as
/// the FUSE layer handle inode ↔ path mapping themselves.
#[async_trait]
pub trait VfsOps: Send + Sync {
    // ========================================================================
    // Reading
    // ========================================================================

    /// Get file attributes.
    async fn getattr(&self, path: &Path) -> VfsResult<FileAttr>;

    /// Read directory entries, including `.` and `..`.
    async fn readdir(&self, path: &Path) -> VfsResult<Vec<DirEntry>>;

    /// Validate that `path` can be opened with `flags`.
    ///
    /// No per-handle state is kept; every later call re-resolves the path.
    async fn open(&self, path: &Path, flags: OpenFlags) -> VfsResult<()>;

    /// Read file contents.
    ///
    /// Reads up to `size` bytes starting at `offset`.
    /// Returns fewer bytes if EOF is reached.
    async fn read(&self, path: &Path, offset: u64, size: u32) -> VfsResult<Vec<u8>>;

    // ========================================================================
    // Writing
    // ========================================================================

    /// Write data to a file.
    ///
    /// Returns the number of bytes accepted.
    async fn write(&self, path: &Path, offset: u64, data: &[u8]) -> VfsResult<u32>;

    /// Create a new directory.
    ///
    /// Returns the attributes of the newly created directory.
    async fn mkdir(&self, path: &Path, mode: u32) -> VfsResult<FileAttr>;

    // ========================================================================
    // Metadata
    // ========================================================================

    /// Returns true if this filesystem is read-only.
    fn read_only(&self) -> bool;

    // ========================================================================
    // Convenience methods (default implementations)
    // ========================================================================

    /// Check if a path exists.
    async fn exists(&self, path: &Path) -> bool {
        self.getattr(path).await.is_ok()
    }

    /// Read entire file contents.
    ///
    /// Convenience method that reads up to the reported file size.
    async fn read_all(&self, path: &Path) -> VfsResult<Vec<u8>> {
        let attr = self.getattr(path).await?;
        let size = u32::try_from(attr.size).unwrap_or(u32::MAX);
        self.read(path, 0, size).await
    }
}
