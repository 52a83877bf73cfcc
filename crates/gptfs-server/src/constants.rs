//! Server configuration constants.
//!
//! Centralizes hardcoded values for easier configuration and documentation.

use std::time::Duration;

/// Filesystem name shown in the mount table.
pub const DEFAULT_FS_NAME: &str = "gptfs";

/// Directory under the user config dir holding gptfs settings.
pub const CONFIG_DIR_NAME: &str = "gptfs";

/// Config file name inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// How long the kernel may cache attributes and lookups.
pub const ATTR_TTL: Duration = Duration::from_secs(1);

/// Block size reported in file attributes.
pub const BLOCK_SIZE: u32 = 512;
