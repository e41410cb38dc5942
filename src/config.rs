//! TOML configuration overrides
//!
//! Only the defaults a caller is entitled to override at bootstrap time:
//! the ZFS root and base name, the bridge interface, default jail
//! parameters, and the debug trace switch. Everything `HostContext`
//! discovers from the host (the default interface, host IPv6 address,
//! gateway, derived prefix, mountpoint) is never read from here — it is
//! always live-probed, per the design note that config must not let a
//! stale file shadow host reality.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

const DEFAULT_ZROOT: &str = "zroot/jail";
const DEFAULT_BASE: &str = "base";
const DEFAULT_BRIDGE: &str = "bridge0";

/// Bootstrap-time overrides, loadable from a TOML file or built up
/// programmatically by the CLI from flags + defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub zroot: String,
    pub base: String,
    pub bridge: String,
    pub debug: bool,
    pub default_params: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            zroot: DEFAULT_ZROOT.to_string(),
            base: DEFAULT_BASE.to_string(),
            bridge: DEFAULT_BRIDGE.to_string(),
            debug: false,
            default_params: HashMap::new(),
        }
    }
}

/// On-disk shape of the config file — every field optional, since the
/// file only ever overrides a subset of [`Config::default`].
#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    zroot: Option<String>,
    base: Option<String>,
    bridge: Option<String>,
    debug: Option<bool>,
    #[serde(default)]
    params: HashMap<String, String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(text)?;
        let mut cfg = Config::default();
        if let Some(zroot) = file.zroot {
            cfg.zroot = zroot;
        }
        if let Some(base) = file.base {
            cfg.base = base;
        }
        if let Some(bridge) = file.bridge {
            cfg.bridge = bridge;
        }
        if let Some(debug) = file.debug {
            cfg.debug = debug;
        }
        cfg.default_params.extend(file.params);
        Ok(cfg)
    }
}
