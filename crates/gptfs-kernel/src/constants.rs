//! Kernel configuration constants.
//!
//! Centralizes hardcoded values for easier configuration and documentation.

/// Hard ceiling on the number of session slots a table may be built with.
pub const MAX_SESSIONS: usize = 65_536;

/// Default number of session slots.
pub const DEFAULT_SESSIONS: usize = 256;

/// Default per-buffer capacity in bytes. One byte is reserved, so buffers
/// hold at most `DEFAULT_BUFFER_LEN - 1` usable bytes.
pub const DEFAULT_BUFFER_LEN: usize = 4096;

/// Smallest buffer capacity that still leaves one usable byte.
pub const MIN_BUFFER_LEN: usize = 2;

/// Permissions reported for the root and session directories.
pub const DIR_PERM: u32 = 0o755;

/// Permissions reported for `input` and `output`.
pub const FILE_PERM: u32 = 0o644;
