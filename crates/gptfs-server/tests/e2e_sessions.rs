//! End-to-end session flow: config file → table → dispatch → host mapping.
//!
//! Drives the same path a mounted filesystem takes, minus the kernel: the
//! FUSE adapter only adds inode lookup and errno conversion on top of these
//! calls, both of which are exercised here through `gptfs_server::host`.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use gptfs_kernel::{
    Leaf, OpenFlags, ResponderKind, SessionFs, SessionId, SessionPath, SessionTable, VfsError,
    VfsOps,
};
use gptfs_server::Config;
use gptfs_server::host::{self, ROOT_INODE};

fn fs_from(config: &Config) -> SessionFs {
    SessionFs::new(Arc::new(SessionTable::new(&config.sessions).unwrap()))
}

fn default_fs() -> SessionFs {
    fs_from(&Config::default())
}

#[tokio::test]
async fn test_hello_session() {
    let fs = default_fs();

    fs.mkdir(Path::new("/0"), 0o755).await.unwrap();
    let written = fs.write(Path::new("/0/input"), 0, b"hello").await.unwrap();
    assert_eq!(written, 5);

    assert_eq!(fs.read(Path::new("/0/input"), 0, 10).await.unwrap(), b"hello");
    assert_eq!(
        fs.read(Path::new("/0/output"), 0, 20).await.unwrap(),
        b"Q: helloA: Yes!\n"
    );
    assert_eq!(fs.table().list_sessions(), vec![SessionId::new(0)]);

    let names: Vec<_> = fs
        .readdir(Path::new("/"))
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec![".", "..", "0"]);
}

#[tokio::test]
async fn test_first_write_starts_session_without_mkdir() {
    let fs = default_fs();

    // A mounted tree answers lookups for every in-range id, so `mkdir` never
    // reaches the table; writing input is how a shell starts a session.
    assert!(fs.getattr(Path::new("/0")).await.unwrap().is_dir());
    assert!(fs.table().list_sessions().is_empty());

    fs.write(Path::new("/0/input"), 0, b"hello").await.unwrap();
    assert_eq!(fs.table().list_sessions(), vec![SessionId::new(0)]);
    assert_eq!(
        fs.read_all(Path::new("/0/output")).await.unwrap(),
        b"Q: helloA: Yes!\n"
    );
}

#[tokio::test]
async fn test_out_of_range_write_leaves_table_untouched() {
    let fs = default_fs();

    let err = fs.write(Path::new("/999/input"), 0, b"x").await.unwrap_err();
    assert!(matches!(err, VfsError::InvalidSessionId(_)));
    assert_eq!(host::errno(&err), libc::ENOENT);
    assert!(fs.table().list_sessions().is_empty());
}

#[tokio::test]
async fn test_output_is_read_only_through_every_entry_point() {
    let fs = default_fs();
    fs.write(Path::new("/3/input"), 0, b"q").await.unwrap();

    let err = fs
        .open(Path::new("/3/output"), OpenFlags::write_only())
        .await
        .unwrap_err();
    assert_eq!(host::errno(&err), libc::EPERM);

    let err = fs.write(Path::new("/3/output"), 0, b"forged").await.unwrap_err();
    assert_eq!(host::errno(&err), libc::EPERM);
    assert_eq!(fs.read_all(Path::new("/3/output")).await.unwrap(), b"Q: qA: Yes!\n");
}

#[tokio::test]
async fn test_config_file_drives_table_shape() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[sessions]\ncapacity = 4\nbuffer_len = 8\nresponder = \"echo\""
    )
    .unwrap();
    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.sessions.responder, ResponderKind::Echo);

    let fs = fs_from(&config);
    assert_eq!(fs.table().capacity(), 4);
    assert_eq!(fs.table().responder_name(), "echo");

    // Seven usable bytes; the rest is dropped.
    let accepted = fs
        .write(Path::new("/3/input"), 0, b"0123456789")
        .await
        .unwrap();
    assert_eq!(accepted, 7);
    assert_eq!(fs.read_all(Path::new("/3/output")).await.unwrap(), b"0123456");

    assert!(fs.getattr(Path::new("/4")).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_host_walks_the_tree_by_inode() {
    let fs = default_fs();
    let capacity = fs.table().capacity();
    fs.write(Path::new("/7/input"), 0, b"walk").await.unwrap();

    // lookup("/", "7") then lookup(dir, "output"), as the kernel would.
    let root = host::path_for(ROOT_INODE, capacity).unwrap();
    let dir = host::child(&root, "7", capacity).unwrap();
    let output = host::child(&dir, "output", capacity).unwrap();
    assert_eq!(output, SessionPath::SessionFile(SessionId::new(7), Leaf::Output));

    let ino = host::inode_for(&output);
    let resolved = host::path_for(ino, capacity).unwrap();
    let data = fs
        .read(Path::new(&resolved.to_string()), 0, 64)
        .await
        .unwrap();
    assert_eq!(data, b"Q: walkA: Yes!\n");

    let err = host::child(&dir, "notes", capacity).unwrap_err();
    assert_eq!(host::errno(&err), libc::ENOENT);
}

#[tokio::test]
async fn test_full_buffer_round_trip() {
    let fs = default_fs();
    let usable = fs.table().usable_len();
    let prompt: Vec<u8> = (0..usable).map(|i| b'a' + (i % 26) as u8).collect();

    let accepted = fs.write(Path::new("/255/input"), 0, &prompt).await.unwrap();
    assert_eq!(accepted as usize, usable);
    assert_eq!(fs.read_all(Path::new("/255/input")).await.unwrap(), prompt);

    // Stub output would be longer than the buffer; it is capped.
    let output = fs.read_all(Path::new("/255/output")).await.unwrap();
    assert_eq!(output.len(), usable);
    assert!(output.starts_with(b"Q: abc"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sessions_stay_isolated() {
    let fs = default_fs();

    let mut tasks = Vec::new();
    for id in 0..32usize {
        let fs = fs.clone();
        tasks.push(tokio::spawn(async move {
            for round in 0..20 {
                let prompt = format!("s{id}r{round}");
                let input = format!("/{id}/input");
                fs.write(Path::new(&input), 0, prompt.as_bytes()).await.unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(fs.table().list_sessions().len(), 32);
    for id in 0..32usize {
        let snapshot = fs.table().snapshot(SessionId::new(id)).unwrap();
        assert_eq!(snapshot.input, format!("s{id}r19").into_bytes());
        assert_eq!(snapshot.output, format!("Q: s{id}r19A: Yes!\n").into_bytes());
        assert_eq!(snapshot.generation, 20);
    }
}
