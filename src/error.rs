//! Unified error taxonomy for ferrojail
//!
//! Four kinds, per the jail lifecycle design: configuration (host discovery
//! and construction-time invariants), precondition (a state guard rejected
//! the operation), command (a host primitive returned nonzero), and
//! derivation (a required piece of persisted identity is missing). State
//! probes (`check_*`) are the only call sites allowed to swallow a
//! `CommandFailure` into a plain `bool`.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for ferrojail operations
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors — host discovery or construction-time invariants
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to read config file '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    // Precondition errors — a state guard rejected the operation
    #[error("jail '{0}' is already running")]
    AlreadyRunning(String),

    #[error("jail '{0}' is not running")]
    NotRunning(String),

    #[error("jail filesystem for '{0}' already exists")]
    FsExists(String),

    #[error("jail filesystem for '{0}' does not exist")]
    FsAbsent(String),

    // Command errors — a host primitive returned nonzero
    #[error("command failed: {argv:?} (exit {exit_code:?}): {stderr}")]
    CommandFailure {
        argv: Vec<String>,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("failed to spawn command {argv:?}: {source}")]
    Spawn {
        argv: Vec<String>,
        source: std::io::Error,
    },

    // Derivation errors — a required piece of persisted/derived state is missing
    #[error("jail name for hash '{0}' is unset (jail:name is \"-\")")]
    NameUnset(String),

    #[error("no snapshots found under '{0}'")]
    NoSnapshots(String),

    #[error("unparsable output from '{command}': {detail}")]
    ParseFailure { command: String, detail: String },

    #[error("jail name '{0}' is not valid ASCII/UTF-8 for a hostname")]
    InvalidName(String),

    // CLI-surface stubs for explicitly out-of-scope operations
    #[error("'{0}' is not implemented by this core; it is an external collaborator")]
    NotImplemented(&'static str),
}

/// Result type alias for ferrojail operations
pub type Result<T> = std::result::Result<T, Error>;
