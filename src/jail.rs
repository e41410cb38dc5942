//! Stateless per-name jail view
//!
//! A `Jail` carries no state of its own beyond `name` and a borrow of the
//! `HostContext` it was derived from — every other field here is a pure
//! function of those two things, and any subset of the resources a `Jail`
//! names may or may not currently exist on the host. Lifecycle state always
//! lives in ZFS/the jail table/the interface list, never in this struct.

pub mod lifecycle;
pub mod network;
pub mod params;
pub mod predicates;

use crate::host::HostContext;

/// Host-side (index 0) and jail-side (index 1) epair interface names.
pub type EpairNames = (String, String);

pub struct Jail<'a> {
    pub name: String,
    pub host: &'a HostContext,
    pub hash: String,
    pub ipv6: String,
    pub path: String,
    pub zpath: String,
    pub epair: EpairNames,
    pub gateway: String,
}

impl<'a> Jail<'a> {
    pub fn new(name: impl Into<String>, host: &'a HostContext) -> Self {
        let name = name.into();
        let hash = HostContext::generate_hash(&name);
        let ipv6 = host.generate_addr(&name);
        let path = format!("{}/{}", host.mountpoint, hash);
        let zpath = format!("{}/{}", host.zroot, hash);
        let epair = (format!("{hash}A"), format!("{hash}B"));
        let gateway = host.generate_gateway(&epair.1);

        Self {
            name,
            host,
            hash,
            ipv6,
            path,
            zpath,
            epair,
            gateway,
        }
    }
}
