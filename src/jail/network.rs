//! epair/bridge wiring and guest network configuration
//!
//! Every method here is a thin sequence of `ifconfig`/`route`/`sysrc`
//! invocations through `HostContext::cmd` — no parsing beyond what
//! `parse.rs` already centralizes.

use super::Jail;
use crate::error::{Error, Result};
use crate::parse;

impl Jail<'_> {
    /// `ifconfig epair create`, rename both halves to `{hash}A`/`{hash}B`,
    /// bring the host half up with an auto link-local address, and attach
    /// it to the bridge (marked `private` when requested).
    pub fn create_epair(&self, private: bool) -> Result<()> {
        let created = self.host.cmd(&["ifconfig", "epair", "create"])?;
        let device = created.trim();
        let stem = device
            .strip_suffix('a')
            .ok_or_else(|| Error::ParseFailure {
                command: "ifconfig epair create".to_string(),
                detail: format!("device name '{device}' does not end in 'a'"),
            })?;
        let raw_host_if = format!("{stem}a");
        let raw_jail_if = format!("{stem}b");

        self.host
            .cmd(&["ifconfig", &raw_host_if, "name", &self.epair.0])?;
        self.host
            .cmd(&["ifconfig", &raw_jail_if, "name", &self.epair.1])?;

        self.host.cmd(&["ifconfig", &self.epair.0, "up"])?;
        self.host
            .cmd(&["ifconfig", &self.epair.0, "inet6", "auto_linklocal"])?;

        self.host
            .cmd(&["ifconfig", &self.host.bridge, "addm", &self.epair.0])?;
        if private {
            self.host
                .cmd(&["ifconfig", &self.host.bridge, "private", &self.epair.0])?;
        }

        Ok(())
    }

    /// Move the jail-side interface back to the host namespace.
    pub fn remove_vnet(&self) -> Result<()> {
        self.host
            .cmd(&["ifconfig", &self.epair.1, "-vnet", &self.hash])?;
        Ok(())
    }

    /// Destroy the host-side interface; destroys both halves of the pair.
    pub fn destroy_epair(&self) -> Result<()> {
        self.host.cmd(&["ifconfig", &self.epair.0, "destroy"])?;
        Ok(())
    }

    /// The paired link-local addresses of the epair halves: the host side
    /// (parsed off `ifconfig epair[HOST]`) and the jail side, derived by
    /// flipping the trailing `a` to `b`.
    pub fn get_lladdr(&self) -> Result<(String, String)> {
        let out = self.host.cmd(&["ifconfig", &self.epair.0])?;
        let (host_addr, _zone) = parse::first_linklocal_inet6_with_zone(&out)?;
        let jail_addr = host_addr
            .strip_suffix('a')
            .map(|stripped| format!("{stripped}b"))
            .ok_or_else(|| Error::ParseFailure {
                command: "ifconfig epair[HOST]".to_string(),
                detail: format!("link-local address '{host_addr}' does not end in 'a'"),
            })?;
        Ok((host_addr, jail_addr))
    }

    /// Host-side route to `ipv6` via the jail-side link-local, and a
    /// jail-side route to `hostipv6` via the host-side link-local.
    pub fn local_route(&self) -> Result<()> {
        let (lladdr_host, lladdr_jail) = self.get_lladdr()?;

        self.host.cmd(&[
            "route",
            "-6",
            "add",
            &self.ipv6,
            &format!("{lladdr_jail}%{}", self.epair.0),
        ])?;

        self.host.cmd(&[
            "jexec",
            &self.hash,
            "route",
            "-6",
            "add",
            &self.host.hostipv6,
            &format!("{lladdr_host}%{}", self.epair.1),
        ])?;

        Ok(())
    }

    /// Write the jail-side `rc.conf` entries for VNET mode via `sysrc -R`.
    pub fn configure_vnet(&self) -> Result<()> {
        self.sysrc("sendmail_enable=NONE")?;
        self.sysrc("syslogd_flags=-ss")?;
        self.sysrc("ip6addrctl_policy=ipv6_prefer")?;
        let ifconfig_key = format!("ifconfig_{}_ipv6", self.epair.1);
        self.sysrc(&format!("{ifconfig_key}=inet6 {}/64", self.ipv6))?;
        self.sysrc(&format!("ipv6_defaultrouter={}", self.gateway))?;
        self.sysrc("ifconfig_lo0_ipv6=inet6 up")?;
        Ok(())
    }

    /// Alias `ipv6` directly onto `hostif` (shared-IP mode).
    pub fn configure_host(&self) -> Result<()> {
        self.host
            .cmd(&["ifconfig", &self.host.hostif, "inet6", &self.ipv6])?;
        Ok(())
    }

    /// Remove the shared-IP alias from `hostif`.
    pub fn remove_host_alias(&self) -> Result<()> {
        self.host
            .cmd(&["ifconfig", &self.host.hostif, "inet6", &self.ipv6, "-alias"])?;
        Ok(())
    }

    fn sysrc(&self, entry: &str) -> Result<()> {
        self.host.cmd(&["sysrc", "-R", &self.path, entry])?;
        Ok(())
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
    fn create_epair_renames_both_halves_and_joins_bridge() {
        let ctx = host_with(vec![]);
        let jail = ctx.jail("web");
        let ctx2 = host_with(vec![
            Fixture::ok(&["ifconfig", "epair", "create"], "epair7a\n"),
            Fixture::ok(&["ifconfig", "epair7a", "name", &jail.epair.0], ""),
            Fixture::ok(&["ifconfig", "epair7b", "name", &jail.epair.1], ""),
            Fixture::ok(&["ifconfig", &jail.epair.0, "up"], ""),
            Fixture::ok(&["ifconfig", &jail.epair.0, "inet6", "auto_linklocal"], ""),
            Fixture::ok(&["ifconfig", "bridge0", "addm", &jail.epair.0], ""),
            Fixture::ok(&["ifconfig", "bridge0", "private", &jail.epair.0], ""),
        ]);
        ctx2.jail("web").create_epair(true).unwrap();
    }

    #[test]
    fn get_lladdr_flips_trailing_nibble() {
        let ctx = host_with(vec![]);
        let jail = ctx.jail("web");
        let ifconfig_out = format!(
            "{}: flags=...\n\tinet6 fe80::a%{} prefixlen 64 scopeid 0x9\n",
            jail.epair.0, jail.epair.0
        );
        let ctx2 = host_with(vec![Fixture::ok(&["ifconfig", &jail.epair.0], &ifconfig_out)]);
        let (host_addr, jail_addr) = ctx2.jail("web").get_lladdr().unwrap();
        assert_eq!(host_addr, "fe80::a");
        assert_eq!(jail_addr, "fe80::b");
    }

    #[test]
    fn configure_vnet_writes_expected_rc_conf_entries() {
        let ctx = host_with(vec![]);
        let jail = ctx.jail("web");
        let ifconfig_entry = format!("ifconfig_{}_ipv6=inet6 {}/64", jail.epair.1, jail.ipv6);
        let defaultrouter_entry = format!("ipv6_defaultrouter={}", jail.gateway);
        let ctx2 = host_with(vec![
            Fixture::ok(&["sysrc", "-R", &jail.path, "sendmail_enable=NONE"], ""),
            Fixture::ok(&["sysrc", "-R", &jail.path, "syslogd_flags=-ss"], ""),
            Fixture::ok(
                &["sysrc", "-R", &jail.path, "ip6addrctl_policy=ipv6_prefer"],
                "",
            ),
            Fixture::ok(&["sysrc", "-R", &jail.path, &ifconfig_entry], ""),
            Fixture::ok(&["sysrc", "-R", &jail.path, &defaultrouter_entry], ""),
            Fixture::ok(&["sysrc", "-R", &jail.path, "ifconfig_lo0_ipv6=inet6 up"], ""),
        ]);
        ctx2.jail("web").configure_vnet().unwrap();
    }
}
