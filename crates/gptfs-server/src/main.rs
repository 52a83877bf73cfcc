//! gptfs binary
//!
//! Mounts a table of prompt/response sessions as a filesystem.
//!
//! ## Usage
//!
//! ```bash
//! # Mount at ~/gptfs (or [mount].mount_point from config)
//! gptfs mount ~/gptfs
//!
//! # In another shell. Every in-range session directory already exists;
//! # the first write to its input starts the session and lists it.
//! echo hello > ~/gptfs/0/input
//! cat ~/gptfs/0/output
//! ls ~/gptfs
//!
//! # One-shot dispatch without mounting
//! gptfs ask 0 hello
//!
//! # Print the effective configuration
//! gptfs config
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use gptfs_kernel::{ResponderKind, SessionFs, SessionTable, VfsOps};
use gptfs_server::{Config, config::expand_path};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Session-addressable prompt filesystem.
#[derive(Parser, Debug)]
#[command(name = "gptfs")]
#[command(about = "Mount prompt/response sessions as files")]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/gptfs/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mount the session filesystem and serve until unmounted
    Mount {
        /// Directory to mount on (default: [mount].mount_point)
        mount_point: Option<PathBuf>,

        #[command(flatten)]
        table: TableArgs,

        /// Let other users access the mount
        #[arg(long)]
        allow_other: bool,
    },

    /// Write TEXT to session ID's input and print its output
    Ask {
        /// Session id
        id: String,

        /// Prompt text
        text: String,

        #[command(flatten)]
        table: TableArgs,
    },

    /// Print the effective configuration as TOML
    Config {
        #[command(flatten)]
        table: TableArgs,
    },
}

/// Session table overrides shared by every subcommand.
#[derive(Args, Debug, Default)]
struct TableArgs {
    /// Number of session slots
    #[arg(long)]
    sessions: Option<usize>,

    /// Bytes per input/output buffer, including the reserved final byte
    #[arg(long)]
    buffer_len: Option<usize>,

    /// Responder producing output from input (stub, echo)
    #[arg(long)]
    responder: Option<ResponderKind>,
}

impl TableArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(sessions) = self.sessions {
            config.sessions.capacity = sessions;
        }
        if let Some(buffer_len) = self.buffer_len {
            config.sessions.buffer_len = buffer_len;
        }
        if let Some(responder) = self.responder {
            config.sessions.responder = responder;
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(cli: &Cli, table: &TableArgs) -> Result<Config> {
    let mut config = Config::load_or_default(cli.config.as_deref())?;
    table.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn build_fs(config: &Config) -> Result<SessionFs> {
    let table = SessionTable::new(&config.sessions).context("building session table")?;
    Ok(SessionFs::new(Arc::new(table)))
}

async fn run_mount(config: Config, mount_point: Option<PathBuf>) -> Result<()> {
    let Some(mount_point) = mount_point
        .map(|p| expand_path(&p))
        .or_else(|| config.mount.mount_point.clone())
    else {
        bail!("no mount point given and [mount].mount_point is not set");
    };
    std::fs::create_dir_all(&mount_point)
        .with_context(|| format!("create mount directory {}", mount_point.display()))?;

    let fs = build_fs(&config)?;
    let runtime = tokio::runtime::Handle::current();
    let options = config.mount.clone();
    tokio::task::spawn_blocking(move || {
        gptfs_server::mount(fs, runtime, &mount_point, &options)
    })
    .await
    .context("mount thread panicked")?
}

async fn run_ask(config: &Config, id: &str, text: &str) -> Result<()> {
    let fs = build_fs(config)?;
    let input = format!("/{id}/input");
    let output = format!("/{id}/output");

    let accepted = fs
        .write(Path::new(&input), 0, text.as_bytes())
        .await
        .with_context(|| format!("writing {input}"))?;
    tracing::debug!(session = id, accepted, "prompt written");

    let response = fs
        .read_all(Path::new(&output))
        .await
        .with_context(|| format!("reading {output}"))?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&response)?;
    stdout.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Command::Mount {
            mount_point,
            table,
            allow_other,
        } => {
            let mut config = load_config(&cli, table)?;
            if *allow_other {
                config.mount.allow_other = true;
            }
            run_mount(config, mount_point.clone()).await
        }
        Command::Ask { id, text, table } => {
            let config = load_config(&cli, table)?;
            run_ask(&config, id, text).await
        }
        Command::Config { table } => {
            let config = load_config(&cli, table)?;
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}
