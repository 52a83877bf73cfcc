//! gptfs server library
//!
//! Configuration loading, host inode/errno mapping and the FUSE mount for a
//! [`gptfs_kernel::SessionFs`].

pub mod config;
pub mod constants;
#[cfg(feature = "fuse")]
mod fuse;
pub mod host;
pub mod mount;

pub use config::{Config, ConfigError, MountConfig};
pub use mount::mount;
