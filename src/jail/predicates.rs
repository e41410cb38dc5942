//! Non-mutating state probes
//!
//! Every probe here reduces a `CommandFailure` to a plain bool — these are
//! exactly the `check_*` call sites the error taxonomy singles out as
//! allowed to do that.

use super::Jail;
use crate::parse;

impl Jail<'_> {
    /// `jls -Nj hash` succeeds.
    pub fn is_running(&self) -> bool {
        self.host.check_cmd(&["jls", "-Nj", &self.hash])
    }

    /// `zfs list zpath` succeeds.
    pub fn check_fs(&self) -> bool {
        self.host.check_cmd(&["zfs", "list", &self.zpath])
    }

    /// `ifconfig epair[HOST]` succeeds.
    pub fn check_epair(&self) -> bool {
        self.host.check_cmd(&["ifconfig", &self.epair.0])
    }

    /// `mount -t devfs` output has a line at `{path}/dev`.
    pub fn check_devfs(&self) -> bool {
        match self.host.cmd(&["mount", "-t", "devfs"]) {
            Ok(out) => parse::devfs_mounted(&out, &self.path),
            Err(_) => false,
        }
    }

    /// `jls -j hash vnet` returns `"1"`; `false` on command failure too.
    pub fn is_vnet(&self) -> bool {
        match self.host.cmd(&["jls", "-j", &self.hash, "vnet"]) {
            Ok(out) => parse::jls_vnet_flag(&out),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::command::{Fixture, MockExecutor};
    use crate::config::Config;
    use crate::host::HostContext;

    fn host_with(extra: Vec<Fixture>) -> HostContext {
        let mut fixtures = vec![
            Fixture::ok(&["route", "-6", "get", "default"], "interface: em0\n"),
            Fixture::ok(
                &["ifconfig", "em0", "inet6"],
                "\tinet6 2001:db8::a prefixlen 64\n",
            ),
            Fixture::ok(
                &["route", "-6", "get", "default"],
                "gateway: fe80::1%em0\ninterface: em0\n",
            ),
            Fixture::ok(
                &["zfs", "list", "-H", "-o", "mountpoint", "zroot/jail"],
                "/jail\n",
            ),
            Fixture::ok(&["ifconfig", "bridge0"], "bridge0: flags=...\n"),
            Fixture::ok(
                &["zfs", "list", "-H", "-o", "name", "zroot/jail/base"],
                "zroot/jail/base\n",
            ),
        ];
        fixtures.extend(extra);
        HostContext::bootstrap_with(Box::new(MockExecutor::new(fixtures)), Config::default())
            .unwrap()
    }

    #[test]
    fn is_running_reflects_jls_exit_status() {
        let ctx = host_with(vec![]);
        let jail = ctx.jail("web");
        let ctx2 = host_with(vec![Fixture::ok(&["jls", "-Nj", &jail.hash], "")]);
        assert!(ctx2.jail("web").is_running());

        let ctx3 = host_with(vec![Fixture::fail(&["jls", "-Nj", &jail.hash], "no such jail")]);
        assert!(!ctx3.jail("web").is_running());
    }

    #[test]
    fn is_vnet_false_on_command_failure() {
        let ctx = host_with(vec![]);
        let jail = ctx.jail("web");
        let ctx2 = host_with(vec![Fixture::fail(
            &["jls", "-j", &jail.hash, "vnet"],
            "no such jail",
        )]);
        assert!(!ctx2.jail("web").is_vnet());
    }

    #[test]
    fn is_vnet_true_when_flag_is_one() {
        let ctx = host_with(vec![]);
        let jail = ctx.jail("web");
        let ctx2 = host_with(vec![Fixture::ok(
            &["jls", "-j", &jail.hash, "vnet"],
            "1\n",
        )]);
        assert!(ctx2.jail("web").is_vnet());
    }

    #[test]
    fn check_devfs_scans_mount_output() {
        let ctx = host_with(vec![]);
        let jail = ctx.jail("web");
        let mount_out = format!("devfs on {}/dev (devfs, local)\n", jail.path);
        let ctx2 = host_with(vec![Fixture::ok(&["mount", "-t", "devfs"], &mount_out)]);
        assert!(ctx2.jail("web").check_devfs());

        let ctx3 = host_with(vec![Fixture::ok(&["mount", "-t", "devfs"], "")]);
        assert!(!ctx3.jail("web").check_devfs());
    }
}
