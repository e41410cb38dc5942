//! ZFS primitives used by HostContext and Jail
//!
//! Thin wrappers around `zfs list/clone/set/get/destroy`, all routed through
//! an `Executor` so the lifecycle sequencing stays mockable. Callers pass
//! full dataset paths (`zroot/base`, `zroot/<hash>`) — this module has no
//! opinion on naming scheme, that lives in `host.rs`/`jail.rs`.

use crate::command::Executor;
use crate::error::{Error, Result};
use crate::parse;

/// `zfs list -H -o name <dataset>` — true if the dataset exists.
pub fn dataset_exists(exec: &dyn Executor, dataset: &str) -> Result<bool> {
    Ok(exec.run_captured(&["zfs", "list", "-H", "-o", "name", dataset])?.success())
}

/// `zfs clone <snapshot> <dataset>`
pub fn clone(exec: &dyn Executor, snapshot: &str, dataset: &str) -> Result<()> {
    run_checked(exec, &["zfs", "clone", snapshot, dataset])
}

/// `zfs destroy -f <dataset>` (or `-r -f` when `recursive`).
pub fn destroy(exec: &dyn Executor, dataset: &str, recursive: bool) -> Result<()> {
    if recursive {
        run_checked(exec, &["zfs", "destroy", "-r", "-f", dataset])
    } else {
        run_checked(exec, &["zfs", "destroy", "-f", dataset])
    }
}

/// `zfs set <key>=<value> <dataset>`
pub fn set_property(exec: &dyn Executor, dataset: &str, key: &str, value: &str) -> Result<()> {
    let prop = format!("{key}={value}");
    run_checked(exec, &["zfs", "set", &prop, dataset])
}

/// `zfs get -H -o value <key> <dataset>`, mapping the ZFS `-` sentinel to `None`.
pub fn get_property(exec: &dyn Executor, dataset: &str, key: &str) -> Result<Option<String>> {
    let out = exec.run_captured(&["zfs", "get", "-H", "-o", "value", key, dataset])?;
    if !out.success() {
        return Err(command_failure(
            &["zfs", "get", "-H", "-o", "value", key, dataset],
            &out,
        ));
    }
    Ok(parse::zfs_property(&out.stdout))
}

/// `zfs list -H -o mountpoint <dataset>`
pub fn mountpoint(exec: &dyn Executor, dataset: &str) -> Result<String> {
    let argv = ["zfs", "list", "-H", "-o", "mountpoint", dataset];
    let out = exec.run_captured(&argv)?;
    if !out.success() {
        return Err(command_failure(&argv, &out));
    }
    parse::mountpoint(&out.stdout)
}

/// `zfs list -Hrt snap -s creation -o name <base_dataset>`, returning the
/// newest snapshot (creation-ascending, so the last line).
pub fn latest_snapshot(exec: &dyn Executor, base_dataset: &str) -> Result<String> {
    let argv = [
        "zfs", "list", "-Hrt", "snap", "-s", "creation", "-o", "name", base_dataset,
    ];
    let out = exec.run_captured(&argv)?;
    if !out.success() {
        return Err(Error::NoSnapshots(base_dataset.to_string()));
    }
    parse::latest_snapshot(&out.stdout, base_dataset)
}

/// `zfs list -r -H -o jail:base,jail:name <zroot>`, returning (base, name)
/// rows with the ZFS `-` sentinel already filtered out.
pub fn list_base_rows(exec: &dyn Executor, zroot: &str) -> Result<Vec<(String, String)>> {
    let argv = ["zfs", "list", "-r", "-H", "-o", "jail:base,jail:name", zroot];
    let out = exec.run_captured(&argv)?;
    if !out.success() {
        return Err(command_failure(&argv, &out));
    }
    Ok(parse::jail_list_rows(&out.stdout))
}

fn run_checked(exec: &dyn Executor, argv: &[&str]) -> Result<()> {
    let out = exec.run_captured(argv)?;
    if out.success() {
        Ok(())
    } else {
        Err(command_failure(argv, &out))
    }
}

fn command_failure(argv: &[&str], out: &crate::command::Output) -> Error {
    Error::CommandFailure {
        argv: argv.iter().map(|s| s.to_string()).collect(),
        exit_code: Some(out.status),
        stderr: out.stderr.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Fixture, MockExecutor};

    #[test]
    fn clone_runs_zfs_clone() {
        let mock = MockExecutor::new(vec![Fixture::ok(
            &["zfs", "clone", "zroot/jail/base@s1", "zroot/jail/abc"],
            "",
        )]);
        clone(&mock, "zroot/jail/base@s1", "zroot/jail/abc").unwrap();
    }

    #[test]
    fn latest_snapshot_errors_on_command_failure() {
        let mock = MockExecutor::new(vec![Fixture::fail(
            &[
                "zfs", "list", "-Hrt", "snap", "-s", "creation", "-o", "name", "zroot/jail/base",
            ],
            "dataset does not exist",
        )]);
        let err = latest_snapshot(&mock, "zroot/jail/base").unwrap_err();
        assert!(matches!(err, Error::NoSnapshots(_)));
    }

    #[test]
    fn get_property_maps_sentinel_to_none() {
        let mock = MockExecutor::new(vec![Fixture::ok(
            &["zfs", "get", "-H", "-o", "value", "jail:name", "zroot/jail/abc"],
            "-\n",
        )]);
        assert_eq!(
            get_property(&mock, "zroot/jail/abc", "jail:name").unwrap(),
            None
        );
    }
}
