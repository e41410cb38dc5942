//! Host-primitive executor
//!
//! The single choke point through which every host command (`zfs`,
//! `ifconfig`, `route`, `jail`, `jexec`, `sysrc`, `jls`, `uname`, `mount`,
//! `umount`) is invoked. Everything else in this crate calls `Executor::run`
//! or the `cmd`/`check_cmd` convenience wrappers on `HostContext` — nothing
//! reaches for `std::process::Command` directly outside `RealExecutor`.
//!
//! Centralizing this behind a trait is what makes the lifecycle sequencing
//! testable off a real FreeBSD host: `MockExecutor` replays recorded
//! `(argv, stdout, stderr, status)` fixtures instead of spawning anything.

use crate::error::{Error, Result};
use std::process::Command;

/// Captured result of running a host command.
#[derive(Debug, Clone)]
pub struct Output {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl Output {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Abstraction over "run this argv, capture stdout/stderr, report exit status."
///
/// Implementors never translate a nonzero exit into an `Err` themselves —
/// that policy decision (hard error vs. swallowed-to-bool) lives in
/// `HostContext::cmd`/`check_cmd`, one layer up.
pub trait Executor {
    fn run_captured(&self, argv: &[&str]) -> Result<Output>;
}

/// Executor that spawns real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealExecutor;

impl Executor for RealExecutor {
    fn run_captured(&self, argv: &[&str]) -> Result<Output> {
        let (program, args) = argv
            .split_first()
            .expect("argv must have at least one element");

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| Error::Spawn {
                argv: argv.iter().map(|s| s.to_string()).collect(),
                source: e,
            })?;

        Ok(Output {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Executor that replays canned responses, keyed by exact argv match.
///
/// Built for hermetic tests of the lifecycle sequencing and parsers: seed it
/// with the exact argv a code path is expected to invoke and the output it
/// should see back, in order. A call with no matching fixture left in the
/// queue is a test bug, not production behavior, so it panics loudly rather
/// than returning a confusing `Error`.
#[cfg(test)]
pub struct MockExecutor {
    fixtures: std::sync::Mutex<std::collections::VecDeque<Fixture>>,
    calls: std::sync::Mutex<Vec<Vec<String>>>,
}

#[cfg(test)]
#[derive(Debug, Clone)]
pub struct Fixture {
    pub argv: Vec<String>,
    pub stdout: String,
    pub stderr: String,
    pub status: i32,
}

#[cfg(test)]
impl Fixture {
    pub fn ok(argv: &[&str], stdout: &str) -> Self {
        Self {
            argv: argv.iter().map(|s| s.to_string()).collect(),
            stdout: stdout.to_string(),
            stderr: String::new(),
            status: 0,
        }
    }

    pub fn fail(argv: &[&str], stderr: &str) -> Self {
        Self {
            argv: argv.iter().map(|s| s.to_string()).collect(),
            stdout: String::new(),
            stderr: stderr.to_string(),
            status: 1,
        }
    }
}

#[cfg(test)]
impl MockExecutor {
    pub fn new(fixtures: Vec<Fixture>) -> Self {
        Self {
            fixtures: std::sync::Mutex::new(fixtures.into()),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// argv of every call made so far, in order — for asserting sequencing.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Executor for MockExecutor {
    fn run_captured(&self, argv: &[&str]) -> Result<Output> {
        let argv_owned: Vec<String> = argv.iter().map(|s| s.to_string()).collect();
        self.calls.lock().unwrap().push(argv_owned.clone());

        let mut fixtures = self.fixtures.lock().unwrap();
        let fixture = fixtures.pop_front().unwrap_or_else(|| {
            panic!("MockExecutor: no fixture queued for call {:?}", argv_owned)
        });

        assert_eq!(
            fixture.argv, argv_owned,
            "MockExecutor: expected argv {:?}, got {:?}",
            fixture.argv, argv_owned
        );

        Ok(Output {
            status: fixture.status,
            stdout: fixture.stdout,
            stderr: fixture.stderr,
        })
    }
}
