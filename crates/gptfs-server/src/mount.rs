//! Mounting a [`SessionFs`] on the host.

use std::path::Path;

use anyhow::Result;
#[cfg(feature = "fuse")]
use anyhow::Context;
#[cfg(not(feature = "fuse"))]
use anyhow::anyhow;
use gptfs_kernel::SessionFs;
use tokio::runtime::Handle;

use crate::config::MountConfig;

/// Mount options derived from config.
#[cfg(feature = "fuse")]
fn mount_options(options: &MountConfig) -> Vec<fuser::MountOption> {
    let mut out = vec![
        fuser::MountOption::FSName(options.fs_name.clone()),
        fuser::MountOption::DefaultPermissions,
    ];
    if options.auto_unmount {
        out.push(fuser::MountOption::AutoUnmount);
    }
    if options.allow_other {
        out.push(fuser::MountOption::AllowOther);
    }
    out
}

/// Serve `fs` at `at` until unmounted.
///
/// Blocks the calling thread. Call from `spawn_blocking` so `runtime` can
/// drive the dispatch futures.
pub fn mount(fs: SessionFs, runtime: Handle, at: &Path, options: &MountConfig) -> Result<()> {
    #[cfg(feature = "fuse")]
    {
        tracing::info!(
            mount_point = %at.display(),
            sessions = fs.table().capacity(),
            responder = fs.table().responder_name(),
            "mounting gptfs"
        );
        let filesystem = crate::fuse::SessionFuse::new(fs, runtime);
        fuser::mount2(filesystem, at, &mount_options(options))
            .with_context(|| format!("mount {}", at.display()))?;
        tracing::info!(mount_point = %at.display(), "unmounted");
        Ok(())
    }
    #[cfg(not(feature = "fuse"))]
    {
        let _ = fs;
        let _ = runtime;
        let _ = at;
        let _ = options;
        Err(anyhow!("fuse support disabled; rebuild gptfs with --features fuse"))
    }
}
