//! FUSE adapter over [`SessionFs`].
//!
//! fuser drives callbacks on its own thread; each one resolves the inode to
//! a [`SessionPath`], blocks on the async dispatch call via the runtime
//! handle, and converts the result into a reply or an errno.

use std::ffi::OsStr;
use std::future::Future;
use std::path::PathBuf;
use std::time::SystemTime;

use gptfs_kernel::{
    FileAttr, FileType, Leaf, OpenFlags, SessionFs, SessionPath, VfsError, VfsOps, VfsResult,
};
use tokio::runtime::Handle;

use crate::constants::{ATTR_TTL, BLOCK_SIZE};
use crate::host::{self, ROOT_INODE};

pub(crate) struct SessionFuse {
    fs: SessionFs,
    runtime: Handle,
}

impl SessionFuse {
    pub(crate) fn new(fs: SessionFs, runtime: Handle) -> Self {
        Self { fs, runtime }
    }

    fn capacity(&self) -> usize {
        self.fs.table().capacity()
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    fn resolve(&self, inode: u64) -> Result<SessionPath, i32> {
        host::path_for(inode, self.capacity()).ok_or(libc::ENOENT)
    }

    fn lookup_child(&self, parent: u64, name: &OsStr) -> Result<SessionPath, i32> {
        let parent = self.resolve(parent)?;
        let name = name.to_str().ok_or(libc::ENOENT)?;
        host::child(&parent, name, self.capacity()).map_err(|e| host::errno(&e))
    }

    fn attr(&self, req: &fuser::Request<'_>, path: &SessionPath) -> VfsResult<fuser::FileAttr> {
        let attr = self.block_on(self.fs.getattr(&host_path(path)))?;
        Ok(to_fuser_attr(req, host::inode_for(path), &attr))
    }
}

fn host_path(path: &SessionPath) -> PathBuf {
    PathBuf::from(path.to_string())
}

fn to_fuser_kind(kind: FileType) -> fuser::FileType {
    match kind {
        FileType::File => fuser::FileType::RegularFile,
        FileType::Directory => fuser::FileType::Directory,
    }
}

fn to_fuser_attr(req: &fuser::Request<'_>, ino: u64, attr: &FileAttr) -> fuser::FileAttr {
    fuser::FileAttr {
        ino,
        size: attr.size,
        blocks: attr.size.div_ceil(u64::from(BLOCK_SIZE)),
        atime: attr.mtime,
        mtime: attr.mtime,
        ctime: attr.mtime,
        crtime: attr.mtime,
        kind: to_fuser_kind(attr.kind),
        perm: attr.perm as u16,
        nlink: attr.nlink,
        uid: req.uid(),
        gid: req.gid(),
        rdev: 0,
        flags: 0,
        blksize: BLOCK_SIZE,
    }
}

fn open_flags(flags: i32) -> OpenFlags {
    let accmode = flags & libc::O_ACCMODE;
    OpenFlags {
        read: accmode == libc::O_RDONLY || accmode == libc::O_RDWR,
        write: accmode == libc::O_WRONLY || accmode == libc::O_RDWR,
    }
}

fn reply_errno(op: &str, path: &SessionPath, err: &VfsError) -> i32 {
    tracing::debug!(op, %path, error = %err, "fuse request rejected");
    host::errno(err)
}

impl fuser::Filesystem for SessionFuse {
    fn lookup(
        &mut self,
        req: &fuser::Request<'_>,
        parent: u64,
        name: &OsStr,
        reply: fuser::ReplyEntry,
    ) {
        let path = match self.lookup_child(parent, name) {
            Ok(path) => path,
            Err(code) => {
                reply.error(code);
                return;
            }
        };
        match self.attr(req, &path) {
            Ok(attr) => reply.entry(&ATTR_TTL, &attr, 0),
            Err(e) => reply.error(reply_errno("lookup", &path, &e)),
        }
    }

    fn getattr(
        &mut self,
        req: &fuser::Request<'_>,
        ino: u64,
        _fh: Option<u64>,
        reply: fuser::ReplyAttr,
    ) {
        let path = match self.resolve(ino) {
            Ok(path) => path,
            Err(code) => {
                reply.error(code);
                return;
            }
        };
        match self.attr(req, &path) {
            Ok(attr) => reply.attr(&ATTR_TTL, &attr),
            Err(e) => reply.error(reply_errno("getattr", &path, &e)),
        }
    }

    /// Only a size change is meaningful here: shell `>` truncates before
    /// writing, and the next write replaces input anyway.
    fn setattr(
        &mut self,
        req: &fuser::Request<'_>,
        ino: u64,
        _mode: Option<u32>,
        _uid: Option<u32>,
        _gid: Option<u32>,
        size: Option<u64>,
        _atime: Option<fuser::TimeOrNow>,
        _mtime: Option<fuser::TimeOrNow>,
        _ctime: Option<SystemTime>,
        _fh: Option<u64>,
        _crtime: Option<SystemTime>,
        _chgtime: Option<SystemTime>,
        _bkuptime: Option<SystemTime>,
        _flags: Option<u32>,
        reply: fuser::ReplyAttr,
    ) {
        let path = match self.resolve(ino) {
            Ok(path) => path,
            Err(code) => {
                reply.error(code);
                return;
            }
        };
        if size.is_some() {
            match path.leaf() {
                Some(Leaf::Input) => {}
                Some(Leaf::Output) => {
                    reply.error(libc::EPERM);
                    return;
                }
                None => {
                    reply.error(libc::EISDIR);
                    return;
                }
            }
        }
        match self.attr(req, &path) {
            Ok(attr) => reply.attr(&ATTR_TTL, &attr),
            Err(e) => reply.error(reply_errno("setattr", &path, &e)),
        }
    }

    fn readdir(
        &mut self,
        _req: &fuser::Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: fuser::ReplyDirectory,
    ) {
        let path = match self.resolve(ino) {
            Ok(path) => path,
            Err(code) => {
                reply.error(code);
                return;
            }
        };
        let entries = match self.block_on(self.fs.readdir(&host_path(&path))) {
            Ok(entries) => entries,
            Err(e) => {
                reply.error(reply_errno("readdir", &path, &e));
                return;
            }
        };

        let capacity = self.capacity();
        let skip = usize::try_from(offset).unwrap_or(0);
        for (idx, entry) in entries.iter().enumerate().skip(skip) {
            let entry_ino = match entry.name.as_str() {
                "." => ino,
                ".." => ROOT_INODE,
                name => match host::child(&path, name, capacity) {
                    Ok(child) => host::inode_for(&child),
                    Err(_) => continue,
                },
            };
            if reply.add(entry_ino, (idx + 1) as i64, to_fuser_kind(entry.kind), &entry.name) {
                break;
            }
        }
        reply.ok();
    }

    fn mkdir(
        &mut self,
        req: &fuser::Request<'_>,
        parent: u64,
        name: &OsStr,
        mode: u32,
        _umask: u32,
        reply: fuser::ReplyEntry,
    ) {
        let path = match self.lookup_child(parent, name) {
            Ok(path) => path,
            Err(code) => {
                reply.error(code);
                return;
            }
        };
        match self.block_on(self.fs.mkdir(&host_path(&path), mode)) {
            Ok(attr) => {
                let attr = to_fuser_attr(req, host::inode_for(&path), &attr);
                reply.entry(&ATTR_TTL, &attr, 0);
            }
            Err(e) => reply.error(reply_errno("mkdir", &path, &e)),
        }
    }

    fn open(&mut self, _req: &fuser::Request<'_>, ino: u64, flags: i32, reply: fuser::ReplyOpen) {
        let path = match self.resolve(ino) {
            Ok(path) => path,
            Err(code) => {
                reply.error(code);
                return;
            }
        };
        match self.block_on(self.fs.open(&host_path(&path), open_flags(flags))) {
            // Buffers change behind the page cache on every write.
            Ok(()) => reply.opened(0, fuser::consts::FOPEN_DIRECT_IO),
            Err(e) => reply.error(reply_errno("open", &path, &e)),
        }
    }

    fn read(
        &mut self,
        _req: &fuser::Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: fuser::ReplyData,
    ) {
        let path = match self.resolve(ino) {
            Ok(path) => path,
            Err(code) => {
                reply.error(code);
                return;
            }
        };
        let Ok(offset) = u64::try_from(offset) else {
            reply.error(libc::EINVAL);
            return;
        };
        match self.block_on(self.fs.read(&host_path(&path), offset, size)) {
            Ok(data) => reply.data(&data),
            Err(e) => reply.error(reply_errno("read", &path, &e)),
        }
    }

    fn write(
        &mut self,
        _req: &fuser::Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        data: &[u8],
        _write_flags: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: fuser::ReplyWrite,
    ) {
        let path = match self.resolve(ino) {
            Ok(path) => path,
            Err(code) => {
                reply.error(code);
                return;
            }
        };
        let offset = u64::try_from(offset).unwrap_or(0);
        match self.block_on(self.fs.write(&host_path(&path), offset, data)) {
            // Input keeps a truncated prefix; report the whole buffer so the
            // kernel does not retry the tail as a second, replacing write.
            Ok(_) => reply.written(u32::try_from(data.len()).unwrap_or(u32::MAX)),
            Err(e) => reply.error(reply_errno("write", &path, &e)),
        }
    }
}
