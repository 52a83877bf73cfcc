//! gptfs configuration file.
//!
//! ```toml
//! [sessions]
//! capacity = 256
//! buffer_len = 4096
//! responder = "stub"
//!
//! [mount]
//! mount_point = "~/gptfs"
//! fs_name = "gptfs"
//! auto_unmount = true
//! allow_other = false
//! ```
//!
//! Every key is optional; missing keys take the defaults from
//! [`crate::constants`] and [`gptfs_kernel::constants`].

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use gptfs_kernel::{TableConfig, VfsError};

use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_FS_NAME};

/// Errors while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// File is not valid TOML for [`Config`].
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Configuration could not be rendered back to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Values parsed but describe an impossible table.
    #[error(transparent)]
    Invalid(#[from] VfsError),
}

/// FUSE mount settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    /// Where to mount when the CLI does not name a directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_point: Option<PathBuf>,

    /// Filesystem name shown in the mount table.
    pub fs_name: String,

    /// Ask the kernel to unmount when the process exits.
    pub auto_unmount: bool,

    /// Let other users access the mount.
    pub allow_other: bool,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            mount_point: None,
            fs_name: DEFAULT_FS_NAME.to_string(),
            auto_unmount: true,
            allow_other: false,
        }
    }
}

/// Complete gptfs configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Session table shape and responder.
    pub sessions: TableConfig,

    /// Mount settings.
    pub mount: MountConfig,
}

impl Config {
    /// `$XDG_CONFIG_HOME/gptfs/config.toml`, when a config dir exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Parse TOML text. Does not validate.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.mount.mount_point = config.mount.mount_point.as_deref().map(expand_path);
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load `explicit` if given, otherwise the default file if it exists,
    /// otherwise built-in defaults.
    ///
    /// A missing explicit file is an error; a missing default file is not.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Check the session table shape.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sessions.validate()?;
        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Expand a leading `~` in a path.
pub fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(text) => PathBuf::from(shellexpand::tilde(text).as_ref()),
        None => path.to_path_buf(),
    }
}
