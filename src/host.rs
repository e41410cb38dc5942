//! Process-wide host configuration and discovery
//!
//! `HostContext` is constructed once per process, probes the host for the
//! facts every jail derivation depends on, and is read-only afterward. It
//! owns the `Executor` that every host command flows through; `Jail` objects
//! only ever borrow it.

use crate::command::{Executor, RealExecutor};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::jail::Jail;
use crate::parse;
use crate::zfs;
use blake2::digest::{Update, VariableOutput};
use blake2::Blake2bVar;
use byteorder::{ByteOrder, LittleEndian};
use std::net::Ipv6Addr;

/// Process-wide, read-only-after-construction host context.
pub struct HostContext {
    pub zroot: String,
    pub base: String,
    pub mountpoint: String,
    pub bridge: String,
    pub hostif: String,
    pub hostipv6: String,
    pub gateway: String,
    pub prefix: String,
    pub debug: bool,
    /// Site-wide jail parameter overrides from config, applied under the
    /// built-in defaults and over by `start`'s vnet/shared-IP branches and
    /// the caller's own `extra_params`.
    pub default_params: std::collections::HashMap<String, String>,
    executor: Box<dyn Executor>,
}

impl HostContext {
    /// Bootstrap with the real executor (shells actual host commands).
    pub fn bootstrap(config: Config) -> Result<Self> {
        Self::bootstrap_with(Box::new(RealExecutor), config)
    }

    /// Bootstrap with an injected executor — the hermetic-test entry point.
    pub fn bootstrap_with(executor: Box<dyn Executor>, config: Config) -> Result<Self> {
        let hostif = Self::discover_default_if(executor.as_ref())?;
        let hostipv6 = Self::discover_host_ipv6(executor.as_ref(), &hostif)?;
        let gateway = Self::discover_gateway(executor.as_ref())?;
        let prefix = Self::derive_prefix(&hostipv6)?;
        let mountpoint = zfs::mountpoint(executor.as_ref(), &config.zroot)?;

        let ctx = Self {
            zroot: config.zroot,
            base: config.base,
            mountpoint,
            bridge: config.bridge,
            hostif,
            hostipv6,
            gateway,
            prefix,
            debug: config.debug,
            default_params: config.default_params,
            executor,
        };

        ctx.check_invariants()?;
        Ok(ctx)
    }

    fn check_invariants(&self) -> Result<()> {
        if !self.check_cmd(&["ifconfig", &self.bridge]) {
            return Err(Error::Configuration(format!(
                "bridge interface '{}' does not exist",
                self.bridge
            )));
        }

        let base_dataset = format!("{}/{}", self.zroot, self.base);
        if !zfs::dataset_exists(self.executor.as_ref(), &base_dataset)? {
            return Err(Error::Configuration(format!(
                "base dataset '{base_dataset}' does not exist"
            )));
        }

        if !self.mountpoint.starts_with('/') {
            return Err(Error::Configuration(format!(
                "mountpoint '{}' is not an absolute path",
                self.mountpoint
            )));
        }

        Ok(())
    }

    /// Run `argv` as a child process, capturing stdout/stderr. Returns
    /// trimmed stdout on success; on nonzero exit, a `CommandFailure`
    /// carrying argv, exit code, and stderr. Never merges the streams.
    pub fn cmd(&self, argv: &[&str]) -> Result<String> {
        let out = self.executor.run_captured(argv)?;

        if self.debug {
            eprintln!("CMD: {argv:?}");
        }

        if out.success() {
            if self.debug {
                for line in out.stdout.lines() {
                    eprintln!("   | {line}");
                }
            }
            Ok(out.stdout.trim_end().to_string())
        } else {
            if self.debug {
                for line in out.stderr.lines() {
                    eprintln!("   ! {line}");
                }
            }
            Err(Error::CommandFailure {
                argv: argv.iter().map(|s| s.to_string()).collect(),
                exit_code: Some(out.status),
                stderr: out.stderr,
            })
        }
    }

    /// Run `cmd`, converting any failure into `false`. Used for
    /// existence/state probes that must never propagate the underlying
    /// `CommandFailure` to a caller who only wants a yes/no answer.
    pub fn check_cmd(&self, argv: &[&str]) -> bool {
        self.cmd(argv).is_ok()
    }

    pub(crate) fn executor(&self) -> &dyn Executor {
        self.executor.as_ref()
    }

    fn discover_default_if(exec: &dyn Executor) -> Result<String> {
        let out = exec.run_captured(&["route", "-6", "get", "default"])?;
        if !out.success() {
            return Err(Error::Configuration(
                "no IPv6 default route on this host".to_string(),
            ));
        }
        parse::default_interface(&out.stdout).map_err(|_| {
            Error::Configuration("could not determine default IPv6 interface".to_string())
        })
    }

    fn discover_host_ipv6(exec: &dyn Executor, iface: &str) -> Result<String> {
        let out = exec.run_captured(&["ifconfig", iface, "inet6"])?;
        if !out.success() {
            return Err(Error::Configuration(format!(
                "ifconfig {iface} inet6 failed"
            )));
        }
        parse::first_global_inet6(&out.stdout).map_err(|_| {
            Error::Configuration(format!("no global IPv6 address on '{iface}'"))
        })
    }

    fn discover_gateway(exec: &dyn Executor) -> Result<String> {
        let out = exec.run_captured(&["route", "-6", "get", "default"])?;
        if !out.success() {
            return Err(Error::Configuration(
                "no IPv6 default route on this host".to_string(),
            ));
        }
        parse::default_gateway(&out.stdout)
            .map_err(|_| Error::Configuration("no IPv6 default gateway".to_string()))
    }

    /// First four hextets (zero-padded to 4 hex digits each) of `addr`,
    /// colon-joined — always 19 characters.
    fn derive_prefix(addr: &str) -> Result<String> {
        let ip: Ipv6Addr = addr
            .parse()
            .map_err(|_| Error::Configuration(format!("'{addr}' is not a valid IPv6 address")))?;
        let s = ip.segments();
        Ok(format!("{:04x}:{:04x}:{:04x}:{:04x}", s[0], s[1], s[2], s[3]))
    }

    /// 14-hex-character BLAKE2b-7 digest of the UTF-8 bytes of `name`.
    pub fn generate_hash(name: &str) -> String {
        hex::encode(blake2b(name.as_bytes(), 7))
    }

    /// Synthesized jail address: `prefix:a:b:c:d`, where a..d are four
    /// uint16 values unpacked little-endian from the first 8 bytes of
    /// BLAKE2b-8 of `name`, each formatted lowercase hex with no leading
    /// zeros.
    pub fn generate_addr(&self, name: &str) -> String {
        let digest = blake2b(name.as_bytes(), 8);
        let a = LittleEndian::read_u16(&digest[0..2]);
        let b = LittleEndian::read_u16(&digest[2..4]);
        let c = LittleEndian::read_u16(&digest[4..6]);
        let d = LittleEndian::read_u16(&digest[6..8]);
        format!("{}:{:x}:{:x}:{:x}:{:x}", self.prefix, a, b, c, d)
    }

    /// Re-scope a link-local gateway (`addr%iface`) to `iface`; a global
    /// gateway is returned unchanged.
    pub fn generate_gateway(&self, iface: &str) -> String {
        match self.gateway.split_once('%') {
            Some((addr, _old_iface)) => format!("{addr}%{iface}"),
            None => self.gateway.clone(),
        }
    }

    /// Read the `jail:name` user property off `{zroot}/{hash}`.
    pub fn name_from_hash(&self, hash: &str) -> Result<String> {
        let dataset = format!("{}/{}", self.zroot, hash);
        match zfs::get_property(self.executor.as_ref(), &dataset, "jail:name") {
            Ok(Some(name)) => Ok(name),
            _ => Err(Error::NameUnset(hash.to_string())),
        }
    }

    /// Newest snapshot of `{zroot}/{base}`.
    pub fn get_latest_snapshot(&self) -> Result<String> {
        let base_dataset = format!("{}/{}", self.zroot, self.base);
        zfs::latest_snapshot(self.executor.as_ref(), &base_dataset)
    }

    /// Every jail whose `jail:base` property equals the active `base`.
    pub fn get_jails(&self) -> Result<Vec<Jail<'_>>> {
        let rows = zfs::list_base_rows(self.executor.as_ref(), &self.zroot)?;
        Ok(rows
            .into_iter()
            .filter(|(base, _name)| base == &self.base)
            .map(|(_base, name)| Jail::new(name, self))
            .collect())
    }

    /// Construct a (stateless) view bound to `name`.
    pub fn jail<'a>(&'a self, name: impl Into<String>) -> Jail<'a> {
        Jail::new(name.into(), self)
    }
}

/// BLAKE2b of `data`, truncated to `size` bytes (7 for the short hash, 8 for
/// the address seed).
fn blake2b(data: &[u8], size: usize) -> Vec<u8> {
    let mut hasher = Blake2bVar::new(size).expect("BLAKE2b supports output sizes up to 64 bytes");
    hasher.update(data);
    let mut buf = vec![0u8; size];
    hasher
        .finalize_variable(&mut buf)
        .expect("buffer sized to match requested digest length");
    buf
}
