//! # gptfs-kernel
//!
//! Core of gptfs: a filesystem namespace where every directory is a
//! conversational session.
//!
//! ```text
//! /            occupied sessions
//! /{id}/input  write a prompt here
//! /{id}/output read the response here
//! ```
//!
//! The kernel is host-agnostic. [`SessionFs`] implements the path-based
//! [`VfsOps`] trait; a host adapter (FUSE in `gptfs-server`) translates its
//! own callbacks into those calls.

pub mod config;
pub mod constants;
pub mod responder;
pub mod vfs;

pub use config::TableConfig;
pub use responder::{EchoResponder, Responder, ResponderKind, StubResponder};
pub use vfs::{
    DirEntry, FileAttr, FileType, Leaf, OpenFlags, SessionFs, SessionId, SessionPath,
    SessionSnapshot, SessionTable, VfsError, VfsOps, VfsResult,
};
