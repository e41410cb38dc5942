//! Text-scraping of host command output
//!
//! `route -6 get`, `ifconfig`, `zfs list`, `mount -t devfs`, and `jls` all
//! communicate in ad hoc line-oriented text. Every parser that picks that
//! text apart lives here, per the design note to centralize the scraping
//! rather than scatter string-splitting through `host.rs`/`jail/*.rs`.

use crate::error::{Error, Result};

fn fail(command: &str, detail: impl Into<String>) -> Error {
    Error::ParseFailure {
        command: command.to_string(),
        detail: detail.into(),
    }
}

/// Extract the `interface: <name>` field from `route -6 get default` output.
pub fn default_interface(route_output: &str) -> Result<String> {
    field_value(route_output, "interface:")
        .ok_or_else(|| fail("route -6 get default", "no 'interface:' field"))
}

/// Extract the `gateway: <addr>` field from `route -6 get default` output.
pub fn default_gateway(route_output: &str) -> Result<String> {
    field_value(route_output, "gateway:")
        .ok_or_else(|| fail("route -6 get default", "no 'gateway:' field"))
}

fn field_value(output: &str, label: &str) -> Option<String> {
    for line in output.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix(label) {
            let v = rest.trim();
            if !v.is_empty() {
                return Some(v.to_string());
            }
        }
    }
    None
}

/// First `inet6 <addr>` in `ifconfig <iface> inet6` output that is not link-local.
pub fn first_global_inet6(ifconfig_output: &str) -> Result<String> {
    for addr in inet6_addresses(ifconfig_output) {
        if !addr.starts_with("fe80::") {
            return Ok(addr);
        }
    }
    Err(fail("ifconfig ... inet6", "no non-link-local inet6 address"))
}

/// First `inet6 fe80::...%iface` address (link-local with zone id) in
/// `ifconfig <iface>` output, split into (address, zone).
pub fn first_linklocal_inet6_with_zone(ifconfig_output: &str) -> Result<(String, String)> {
    for token in inet6_tokens(ifconfig_output) {
        if let Some((addr, zone)) = token.split_once('%') {
            if addr.starts_with("fe80::") {
                return Ok((addr.to_string(), zone.to_string()));
            }
        }
    }
    Err(fail(
        "ifconfig <epair>",
        "no link-local inet6 address with zone id",
    ))
}

/// Every whitespace-delimited token following an `inet6` keyword, raw.
fn inet6_tokens(output: &str) -> Vec<String> {
    let mut out = Vec::new();
    for line in output.lines() {
        let mut words = line.split_whitespace().peekable();
        while let Some(word) = words.next() {
            if word == "inet6" {
                if let Some(addr) = words.peek() {
                    out.push((*addr).to_string());
                }
            }
        }
    }
    out
}

/// Every `inet6` address, with any `%zone` suffix stripped.
fn inet6_addresses(output: &str) -> Vec<String> {
    inet6_tokens(output)
        .into_iter()
        .map(|t| t.split('%').next().unwrap_or(&t).to_string())
        .collect()
}

/// Trim the single-line output of `zfs list -H -o mountpoint <dataset>`.
pub fn mountpoint(zfs_list_output: &str) -> Result<String> {
    let trimmed = zfs_list_output.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return Err(fail("zfs list -H -o mountpoint", "empty mountpoint"));
    }
    Ok(trimmed.to_string())
}

/// Last line of `zfs list -Hrt snap -s creation -o name <dataset>` (ascending
/// by creation; the last line is the newest snapshot).
pub fn latest_snapshot(zfs_list_output: &str, dataset: &str) -> Result<String> {
    zfs_list_output
        .lines()
        .filter(|l| !l.trim().is_empty())
        .next_back()
        .map(|l| l.trim().to_string())
        .ok_or_else(|| Error::NoSnapshots(dataset.to_string()))
}

/// Value of a single-line `zfs get -H -o value <prop> <dataset>` output,
/// treating ZFS's `-` sentinel as "unset."
pub fn zfs_property(output: &str) -> Option<String> {
    let trimmed = output.trim();
    if trimmed.is_empty() || trimmed == "-" {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Whether `mount -t devfs` output has an entry mounted at `{jail_path}/dev`.
pub fn devfs_mounted(mount_output: &str, jail_path: &str) -> bool {
    let needle = format!("{jail_path}/dev");
    mount_output
        .lines()
        .any(|line| line.split(" on ").nth(1).is_some_and(|rest| {
            rest.split(" (").next().map(|p| p.trim() == needle).unwrap_or(false)
        }))
}

/// Parse the single-field output of `jls -j <hash> vnet` into a bool.
pub fn jls_vnet_flag(output: &str) -> bool {
    output.trim() == "1"
}

/// Parse the tab-separated rows of
/// `zfs list -r -H -o jail:base,jail:name <zroot>` into (base, name) pairs,
/// skipping rows where either column is the ZFS `-` sentinel.
pub fn jail_list_rows(output: &str) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    for line in output.lines() {
        let mut cols = line.split('\t');
        let (Some(base), Some(name)) = (cols.next(), cols.next()) else {
            continue;
        };
        if base == "-" || name == "-" {
            continue;
        }
        rows.push((base.to_string(), name.to_string()));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_interface() {
        let out = "   route to: default\ndestination: default\n   interface: em0\n";
        assert_eq!(default_interface(out).unwrap(), "em0");
    }

    #[test]
    fn parses_default_gateway() {
        let out = "destination: default\ngateway: fe80::1%em0\ninterface: em0\n";
        assert_eq!(default_gateway(out).unwrap(), "fe80::1%em0");
    }

    #[test]
    fn skips_link_local_for_global_inet6() {
        let out = "em0: flags=...\n\tinet6 fe80::1%em0 prefixlen 64 scopeid 0x1\n\tinet6 2001:db8::a prefixlen 64\n";
        assert_eq!(first_global_inet6(out).unwrap(), "2001:db8::a");
    }

    #[test]
    fn fails_when_only_link_local() {
        let out = "em0: flags=...\n\tinet6 fe80::1%em0 prefixlen 64 scopeid 0x1\n";
        assert!(first_global_inet6(out).is_err());
    }

    #[test]
    fn parses_linklocal_with_zone() {
        let out = "epairHA: flags=...\n\tinet6 fe80::1%epairHA prefixlen 64 scopeid 0x9\n";
        let (addr, zone) = first_linklocal_inet6_with_zone(out).unwrap();
        assert_eq!(addr, "fe80::1");
        assert_eq!(zone, "epairHA");
    }

    #[test]
    fn parses_mountpoint() {
        assert_eq!(mountpoint("/jail\n").unwrap(), "/jail");
    }

    #[test]
    fn latest_snapshot_is_last_line() {
        let out = "zroot/jail/base@2024-01-01\nzroot/jail/base@2024-06-01\n";
        assert_eq!(
            latest_snapshot(out, "zroot/jail/base").unwrap(),
            "zroot/jail/base@2024-06-01"
        );
    }

    #[test]
    fn latest_snapshot_fails_when_empty() {
        assert!(latest_snapshot("", "zroot/jail/base").is_err());
    }

    #[test]
    fn zfs_property_sentinel_is_none() {
        assert_eq!(zfs_property("-\n"), None);
        assert_eq!(zfs_property("web\n"), Some("web".to_string()));
    }

    #[test]
    fn devfs_mount_detection() {
        let out = "devfs on /jail/abc/dev (devfs, local)\ndevfs on /jail/xyz/dev (devfs, local)\n";
        assert!(devfs_mounted(out, "/jail/abc"));
        assert!(!devfs_mounted(out, "/jail/nope"));
    }

    #[test]
    fn jls_vnet_flag_parsing() {
        assert!(jls_vnet_flag("1\n"));
        assert!(!jls_vnet_flag("0\n"));
    }

    #[test]
    fn jail_list_rows_skip_sentinels() {
        let out = "base\tweb\nbase\t-\n-\tother\n";
        assert_eq!(
            jail_list_rows(out),
            vec![("base".to_string(), "web".to_string())]
        );
    }
}
