//! Command-line interface for ferrojail
//!
//! Uses clap with derive for type-safe CLI parsing. The CLI itself sits
//! outside the jail lifecycle core — argument parsing, help text, and
//! output formatting are external collaborators the core does not depend
//! on.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// ferrojail - deterministic VNET jail manager on ZFS
#[derive(Parser)]
#[command(name = "ferrojail")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "ferrojail.toml")]
    pub config: PathBuf,

    /// Enable verbose host-command tracing
    #[arg(short, long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Key=value pair, used for `--params` and jail parameter overrides.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{s}`"))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the jail's filesystem (clone the latest base snapshot)
    New {
        /// Jail name
        name: String,
    },

    /// Create the filesystem if absent, then start the jail
    Run {
        /// Jail name
        name: String,

        /// Mark the epair's bridge port private (default)
        #[arg(long, default_value_t = true)]
        private: bool,

        #[arg(long = "no-private", conflicts_with = "private")]
        no_private: bool,

        /// Attach via VNET (default) or alias the address on hostif
        #[arg(long, default_value_t = true)]
        vnet: bool,

        #[arg(long = "no-vnet", conflicts_with = "vnet")]
        no_vnet: bool,

        /// Extra jail(8) parameter overrides (key=value, repeatable)
        #[arg(long = "params", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },

    /// Start an already-created jail
    Start {
        /// Jail name
        name: String,

        /// Mark the epair's bridge port private (default)
        #[arg(long, default_value_t = true)]
        private: bool,

        #[arg(long = "no-private", conflicts_with = "private")]
        no_private: bool,

        #[arg(long, default_value_t = true)]
        vnet: bool,

        #[arg(long = "no-vnet", conflicts_with = "vnet")]
        no_vnet: bool,

        #[arg(long = "params", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },

    /// Stop a running jail
    Stop {
        /// Jail name
        name: String,
    },

    /// Destroy a jail's filesystem (stopping it first with --force)
    Remove {
        /// Jail name
        name: String,

        /// Stop the jail first if it is running
        #[arg(short, long)]
        force: bool,
    },

    /// Salvage leftover resources from a degraded jail
    Cleanup {
        /// Jail name
        name: String,

        /// Stop the jail first if it is running
        #[arg(short, long)]
        force: bool,

        /// Also destroy the dataset
        #[arg(long)]
        destroy_fs: bool,
    },

    /// List all jails cloned from the active base
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Edit rc.conf entries inside a jail's root via sysrc -R
    Sysrc {
        /// Jail name
        name: String,

        /// Arguments passed through to sysrc
        #[arg(last = true, required = true)]
        args: Vec<String>,
    },

    /// Execute a command inside a running jail via jexec
    Jexec {
        /// Jail name
        name: String,

        /// Command to execute (use -- to separate from options)
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },

    /// Place a file inside a jail's root (external collaborator, not
    /// implemented by the core)
    Install {
        /// Jail name
        name: String,

        #[arg(long)]
        source: PathBuf,

        #[arg(long, conflicts_with = "mktemp")]
        dest: Option<PathBuf>,

        #[arg(long, conflicts_with = "dest")]
        mktemp: bool,

        #[arg(long)]
        mode: Option<String>,

        #[arg(long)]
        user: Option<String>,

        #[arg(long)]
        group: Option<String>,
    },

    /// Generate shell completion scripts
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn generate_completion(shell: Shell) {
        let mut cmd = Self::command();
        clap_complete::generate(shell, &mut cmd, "ferrojail", &mut std::io::stdout());
    }
}
