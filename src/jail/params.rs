//! `jail -cv` parameter composition
//!
//! An order-preserving key/value set: `jail(8)` doesn't care about order,
//! but deterministic argv makes the lifecycle sequencing straightforward to
//! test against a `MockExecutor`. Built from [`ParamSet::defaults`], then
//! mutated in place by `start`'s vnet/shared-IP branches and finally by the
//! caller's `extra_params`.

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ParamSet(Vec<(String, String)>);

impl ParamSet {
    /// The default jail parameter table (osrelease filled from `uname -r`
    /// captured at `start` time).
    pub fn defaults(osrelease: &str) -> Self {
        let mut set = Self::default();
        set.set("allow.set_hostname", "false");
        set.set("allow.raw_sockets", "true");
        set.set("allow.socket_af", "true");
        set.set("allow.sysvipc", "true");
        set.set("allow.chflags", "true");
        set.set("mount.devfs", "true");
        set.set("devfs_ruleset", "4");
        set.set("enforce_statfs", "2");
        set.set("sysvmsg", "new");
        set.set("sysvsem", "new");
        set.set("sysvshm", "new");
        set.set("children.max", "0");
        set.set("osrelease", osrelease);
        set.set("persist", "true");
        set.set("exec.start", "/bin/sh /etc/rc");
        set
    }

    /// Insert or overwrite `key`, preserving first-seen position.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(existing) = self.0.iter_mut().find(|(k, _)| k == key) {
            existing.1 = value;
        } else {
            self.0.push((key.to_string(), value));
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.0.retain(|(k, _)| k != key);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Apply caller overrides last, in the order given.
    pub fn extend_with(&mut self, extra: &HashMap<String, String>) {
        for (k, v) in extra {
            self.set(k, v.clone());
        }
    }

    /// Render as `key=value` strings, in insertion order, for `jail -cv`.
    pub fn to_argv(&self) -> Vec<String> {
        self.0.iter().map(|(k, v)| format!("{k}={v}")).collect()
    }
}
