//! Lifecycle operations: create_fs, start, stop, remove, cleanup
//!
//! Every operation enforces its precondition guards before any side effect,
//! per the failure-semantics note: a guard failure is a hard error with
//! nothing attempted; a mid-sequence failure propagates immediately and
//! leaves the jail degraded, recoverable by `cleanup`.

use super::params::ParamSet;
use super::Jail;
use crate::error::{Error, Result};
use crate::zfs;
use std::collections::HashMap;

/// Best-effort salvage report: which resources were still present after
/// `cleanup` ran its steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupReport {
    pub running: bool,
    pub devfs_mounted: bool,
    pub epair_present: bool,
    pub fs_present: bool,
}

impl Jail<'_> {
    /// Clone the latest base snapshot to `zpath` and stamp the `jail:*`
    /// user properties. Fails if the dataset already exists.
    pub fn create_fs(&self) -> Result<()> {
        if self.check_fs() {
            return Err(Error::FsExists(self.name.clone()));
        }

        let snapshot = self.host.get_latest_snapshot()?;
        let exec = self.host.executor();
        zfs::clone(exec, &snapshot, &self.zpath)?;
        zfs::set_property(exec, &self.zpath, "jail:name", &self.name)?;
        zfs::set_property(exec, &self.zpath, "jail:ipv6", &self.ipv6)?;
        zfs::set_property(exec, &self.zpath, "jail:base", &self.host.base)?;

        Ok(())
    }

    /// Start the jail, attached to the bridge via a private epair (VNET
    /// mode) or with `ipv6` aliased straight onto `hostif` (shared-IP
    /// mode).
    pub fn start(
        &self,
        vnet: bool,
        private: bool,
        extra_params: &HashMap<String, String>,
    ) -> Result<()> {
        if !self.check_fs() {
            return Err(Error::FsAbsent(self.name.clone()));
        }
        if self.is_running() {
            return Err(Error::AlreadyRunning(self.name.clone()));
        }

        let osrelease = self.host.cmd(&["uname", "-r"])?;
        let mut params = ParamSet::defaults(&osrelease);
        params.extend_with(&self.host.default_params);
        params.set("name", &self.hash);
        params.set("path", &self.path);
        params.set("host.hostname", &self.name);

        if vnet {
            params.set("vnet", "new");
            params.set("vnet.interface", &self.epair.1);
        } else {
            params.remove("vnet");
            params.remove("vnet.interface");
            params.set("ip6.addr", &self.ipv6);
        }

        params.extend_with(extra_params);

        if vnet {
            self.create_epair(private)?;
            self.configure_vnet()?;
            self.run_jail_create(&params)?;
            self.local_route()?;
        } else {
            self.configure_host()?;
            self.run_jail_create(&params)?;
        }

        Ok(())
    }

    fn run_jail_create(&self, params: &ParamSet) -> Result<()> {
        let mut argv: Vec<String> = vec!["jail".to_string(), "-cv".to_string()];
        argv.extend(params.to_argv());
        let refs: Vec<&str> = argv.iter().map(|s| s.as_str()).collect();
        self.host.cmd(&refs)?;
        Ok(())
    }

    /// Stop the jail: tear down VNET wiring or the shared-IP alias, release
    /// the jail, then unmount devfs.
    pub fn stop(&self) -> Result<()> {
        if !self.is_running() {
            return Err(Error::NotRunning(self.name.clone()));
        }

        if self.is_vnet() {
            self.remove_vnet()?;
            self.destroy_epair()?;
        } else {
            self.remove_host_alias()?;
        }

        self.host.cmd(&["jail", "-Rv", &self.hash])?;
        self.host.cmd(&["umount", &format!("{}/dev", self.path)])?;

        Ok(())
    }

    /// Stop (if running and `force`), clean up any leftover devfs mount or
    /// epair, then destroy the dataset.
    pub fn remove(&self, force: bool) -> Result<()> {
        if self.is_running() {
            if !force {
                return Err(Error::AlreadyRunning(self.name.clone()));
            }
            self.stop()?;
        }

        if self.check_devfs() {
            self.host.cmd(&["umount", &format!("{}/dev", self.path)])?;
        }
        if self.check_epair() {
            self.destroy_epair()?;
        }

        zfs::destroy(self.host.executor(), &self.zpath, false)?;

        Ok(())
    }

    /// Best-effort resource salvage for a degraded jail. Individual steps
    /// swallow their own failures and never abort the sequence; the
    /// returned report reflects what is left standing afterward.
    pub fn cleanup(&self, force: bool, destroy_fs: bool) -> CleanupReport {
        if force && self.is_running() {
            let _ = self.stop();
        }

        if self.check_devfs() {
            let _ = self.host.cmd(&["umount", &format!("{}/dev", self.path)]);
        }

        if self.check_epair() {
            let _ = self.destroy_epair();
        }

        if destroy_fs && self.check_fs() {
            let _ = zfs::destroy(self.host.executor(), &self.zpath, false);
        }

        CleanupReport {
            running: self.is_running(),
            devfs_mounted: self.check_devfs(),
            epair_present: self.check_epair(),
            fs_present: self.check_fs(),
        }
    }
}
