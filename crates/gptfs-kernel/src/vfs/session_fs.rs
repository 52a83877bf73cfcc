//! Session filesystem: the dispatch surface over a [`SessionTable`].
//!
//! Pure orchestration. Every call resolves its path, then reads or mutates
//! exactly one slot; the table is the only state.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use super::error::{VfsError, VfsResult};
use super::ops::VfsOps;
use super::path::SessionPath;
use super::table::SessionTable;
use super::types::{DirEntry, FileAttr, Leaf, OpenFlags};

/// Exposes a session table as `/{id}/{input,output}`.
#[derive(Debug, Clone)]
pub struct SessionFs {
    table: Arc<SessionTable>,
}

impl SessionFs {
    /// Wrap a shared table.
    pub fn new(table: Arc<SessionTable>) -> Self {
        Self { table }
    }

    /// The underlying table.
    pub fn table(&self) -> &Arc<SessionTable> {
        &self.table
    }

    /// Resolve a path against this table's capacity.
    pub fn resolve(&self, path: &Path) -> VfsResult<SessionPath> {
        SessionPath::from_path(path, self.table.capacity())
    }

    fn dot_entries() -> Vec<DirEntry> {
        vec![DirEntry::directory("."), DirEntry::directory("..")]
    }
}

#[async_trait]
impl VfsOps for SessionFs {
    async fn getattr(&self, path: &Path) -> VfsResult<FileAttr> {
        let resolved = self.resolve(path)?;
        self.table.get_attributes(&resolved)
    }

    async fn readdir(&self, path: &Path) -> VfsResult<Vec<DirEntry>> {
        let mut entries = Self::dot_entries();
        match self.resolve(path)? {
            SessionPath::Root => {
                entries.extend(
                    self.table
                        .list_sessions()
                        .into_iter()
                        .map(|id| DirEntry::directory(id.to_string())),
                );
            }
            SessionPath::SessionDir(_) => {
                entries.extend(Leaf::ALL.iter().map(|leaf| DirEntry::file(leaf.as_str())));
            }
            resolved @ SessionPath::SessionFile(..) => {
                return Err(VfsError::not_a_directory(resolved.to_string()));
            }
        }
        Ok(entries)
    }

    async fn open(&self, path: &Path, flags: OpenFlags) -> VfsResult<()> {
        match self.resolve(path)? {
            SessionPath::SessionFile(_, leaf) if flags.write && !leaf.is_writable() => {
                Err(VfsError::not_writable(path.display().to_string()))
            }
            SessionPath::SessionFile(..) => Ok(()),
            resolved => Err(VfsError::is_a_directory(resolved.to_string())),
        }
    }

    async fn read(&self, path: &Path, offset: u64, size: u32) -> VfsResult<Vec<u8>> {
        match self.resolve(path)? {
            SessionPath::SessionFile(id, leaf) => {
                self.table.read(id, leaf, offset, size as usize)
            }
            resolved => Err(VfsError::is_a_directory(resolved.to_string())),
        }
    }

    async fn write(&self, path: &Path, offset: u64, data: &[u8]) -> VfsResult<u32> {
        match self.resolve(path)? {
            SessionPath::SessionFile(id, Leaf::Input) => {
                // Hosts split large writes into chunks at increasing offsets.
                // Chunks past the usable length fall outside the buffer and
                // must not replace the prefix already stored.
                if offset >= self.table.usable_len() as u64 {
                    tracing::debug!(
                        session = %id,
                        offset,
                        len = data.len(),
                        "write past buffer dropped"
                    );
                    return Ok(0);
                }
                if offset != 0 {
                    tracing::debug!(session = %id, offset, "write offset ignored, input replaced");
                }
                let accepted = self.table.write_input(id, data)?;
                Ok(u32::try_from(accepted).unwrap_or(u32::MAX))
            }
            resolved => Err(VfsError::not_writable(resolved.to_string())),
        }
    }

    async fn mkdir(&self, path: &Path, _mode: u32) -> VfsResult<FileAttr> {
        match self.resolve(path)? {
            SessionPath::SessionDir(id) => {
                self.table.init_session(id)?;
                self.table.get_attributes(&SessionPath::SessionDir(id))
            }
            SessionPath::Root => Err(VfsError::invalid_path("/")),
            resolved @ SessionPath::SessionFile(..) => {
                Err(VfsError::no_such_entry(resolved.to_string()))
            }
        }
    }

    fn read_only(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableConfig;
    use crate::vfs::types::SessionId;

    fn fs() -> SessionFs {
        let table = SessionTable::new(&TableConfig::new(256, 4096)).unwrap();
        SessionFs::new(Arc::new(table))
    }

    fn names(entries: &[DirEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let fs = fs();
        fs.mkdir(Path::new("/0"), 0o755).await.unwrap();
        let written = fs.write(Path::new("/0/input"), 0, b"hello").await.unwrap();
        assert_eq!(written, 5);

        let input = fs.read(Path::new("/0/input"), 0, 10).await.unwrap();
        assert_eq!(input, b"hello");
        let output = fs.read(Path::new("/0/output"), 0, 20).await.unwrap();
        assert_eq!(output, b"Q: helloA: Yes!\n");
    }

    #[tokio::test]
    async fn test_getattr() {
        let fs = fs();
        assert!(fs.getattr(Path::new("/")).await.unwrap().is_dir());
        assert!(fs.getattr(Path::new("/17")).await.unwrap().is_dir());
        let attr = fs.getattr(Path::new("/17/input")).await.unwrap();
        assert!(attr.is_file());
        assert_eq!(attr.size, 4096);

        assert!(fs.getattr(Path::new("/256")).await.unwrap_err().is_not_found());
        assert!(fs.getattr(Path::new("/0/bogus")).await.unwrap_err().is_not_found());
        assert!(fs.getattr(Path::new("/abc")).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_readdir_root_lists_occupied_sessions() {
        let fs = fs();
        assert_eq!(names(&fs.readdir(Path::new("/")).await.unwrap()), vec![".", ".."]);

        fs.write(Path::new("/12/input"), 0, b"x").await.unwrap();
        fs.mkdir(Path::new("/3"), 0o755).await.unwrap();

        let entries = fs.readdir(Path::new("/")).await.unwrap();
        assert_eq!(names(&entries), vec![".", "..", "3", "12"]);
        assert!(entries.iter().all(|e| e.kind.is_dir()));
    }

    #[tokio::test]
    async fn test_readdir_session_dir() {
        let fs = fs();
        // Occupancy is irrelevant for session directories.
        let entries = fs.readdir(Path::new("/200")).await.unwrap();
        assert_eq!(names(&entries), vec![".", "..", "input", "output"]);
        assert!(entries[2].kind.is_file());

        assert!(fs.readdir(Path::new("/256")).await.is_err());
        assert!(matches!(
            fs.readdir(Path::new("/1/input")).await,
            Err(VfsError::NotADirectory(_))
        ));
    }

    #[tokio::test]
    async fn test_write_rejections() {
        let fs = fs();
        assert!(matches!(
            fs.write(Path::new("/0/output"), 0, b"x").await,
            Err(VfsError::NotWritable(_))
        ));
        assert!(matches!(
            fs.write(Path::new("/0"), 0, b"x").await,
            Err(VfsError::NotWritable(_))
        ));
        assert!(matches!(
            fs.write(Path::new("/"), 0, b"x").await,
            Err(VfsError::NotWritable(_))
        ));
        assert!(matches!(
            fs.write(Path::new("/999/input"), 0, b"x").await,
            Err(VfsError::InvalidSessionId(_))
        ));
        assert!(fs.table().list_sessions().is_empty());
    }

    #[tokio::test]
    async fn test_write_at_offset_replaces_input() {
        let fs = fs();
        fs.write(Path::new("/5/input"), 0, b"first").await.unwrap();
        fs.write(Path::new("/5/input"), 100, b"second").await.unwrap();
        assert_eq!(fs.read(Path::new("/5/input"), 0, 64).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_write_past_buffer_keeps_prefix() {
        let fs = fs();
        let usable = fs.table().usable_len();
        let first: Vec<u8> = vec![b'a'; usable];
        fs.write(Path::new("/6/input"), 0, &first).await.unwrap();
        let generation = fs.table().generation(SessionId::new(6)).unwrap();

        // Second chunk of a split write lands past the buffer.
        let written = fs
            .write(Path::new("/6/input"), usable as u64, b"tail")
            .await
            .unwrap();
        assert_eq!(written, 0);
        assert_eq!(fs.read_all(Path::new("/6/input")).await.unwrap(), first);
        assert_eq!(fs.table().generation(SessionId::new(6)).unwrap(), generation);

        // Dropped chunks never occupy a session.
        fs.write(Path::new("/7/input"), 1 << 17, b"tail").await.unwrap();
        assert_eq!(fs.table().list_sessions(), vec![SessionId::new(6)]);
    }

    #[tokio::test]
    async fn test_read_directory_rejected() {
        let fs = fs();
        assert!(matches!(
            fs.read(Path::new("/0"), 0, 10).await,
            Err(VfsError::IsADirectory(_))
        ));
        assert!(matches!(
            fs.read(Path::new("/"), 0, 10).await,
            Err(VfsError::IsADirectory(_))
        ));
    }

    #[tokio::test]
    async fn test_open() {
        let fs = fs();
        fs.open(Path::new("/0/input"), OpenFlags::write_only()).await.unwrap();
        fs.open(Path::new("/0/output"), OpenFlags::read()).await.unwrap();
        assert!(matches!(
            fs.open(Path::new("/0/output"), OpenFlags::write()).await,
            Err(VfsError::NotWritable(_))
        ));
        assert!(matches!(
            fs.open(Path::new("/0"), OpenFlags::read()).await,
            Err(VfsError::IsADirectory(_))
        ));
        assert!(fs.open(Path::new("/300/input"), OpenFlags::read()).await.is_err());
    }

    #[tokio::test]
    async fn test_mkdir() {
        let fs = fs();
        let attr = fs.mkdir(Path::new("/42"), 0o755).await.unwrap();
        assert!(attr.is_dir());
        assert_eq!(fs.table().list_sessions(), vec![SessionId::new(42)]);

        assert!(matches!(
            fs.mkdir(Path::new("/256"), 0o755).await,
            Err(VfsError::InvalidSessionId(_))
        ));
        assert!(matches!(
            fs.mkdir(Path::new("/"), 0o755).await,
            Err(VfsError::InvalidPath(_))
        ));
        assert!(matches!(
            fs.mkdir(Path::new("/1/input"), 0o755).await,
            Err(VfsError::NoSuchEntry(_))
        ));
    }

    #[tokio::test]
    async fn test_read_all_and_exists() {
        let fs = fs();
        fs.write(Path::new("/8/input"), 0, b"ping").await.unwrap();
        assert_eq!(fs.read_all(Path::new("/8/output")).await.unwrap(), b"Q: pingA: Yes!\n");
        assert!(fs.exists(Path::new("/8/output")).await);
        assert!(!fs.exists(Path::new("/8/other")).await);
        assert!(!fs.read_only());
    }
}
