// # Interface IP Source
//
// This crate provides an IP source that reads the addresses assigned to the
// local network interfaces.
//
// ## Purpose
//
// Used for IPv6, where hosts normally hold a globally routable address
// themselves and no outside service is needed to learn it.
//
// ## Selection
//
// Interfaces are walked in the order the OS reports them; the first address
// of the wanted family that is globally routable wins. Skipped:
// - loopback and unspecified addresses
// - IPv6 link-local (fe80::/10), unique-local (fc00::/7) and multicast
// - IPv4 private, link-local and shared (CGNAT) ranges
//
// Finding nothing is reported as `Error::NotFound`, which the reconciler
// treats as "no address wanted" for the family.

use r53ddns_core::traits::IpSource;
use r53ddns_core::{Error, Family, Result};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// IP source over local interface addresses
#[derive(Debug, Clone)]
pub struct InterfaceIpSource {
    /// Only consider this interface
    interface: Option<String>,

    /// Family to select
    family: Family,
}

impl InterfaceIpSource {
    pub fn new(interface: Option<String>, family: Family) -> Self {
        Self { interface, family }
    }

    /// IPv6 source over every interface
    pub fn ipv6() -> Self {
        Self::new(None, Family::V6)
    }

    /// Pick the first usable address from (interface, address) pairs
    fn select(&self, addresses: &[(String, IpAddr)]) -> Option<IpAddr> {
        addresses
            .iter()
            .filter(|(name, _)| self.interface.as_deref().is_none_or(|wanted| wanted == name))
            .map(|(_, ip)| *ip)
            .find(|ip| self.family.matches(ip) && is_global(ip))
    }
}

/// Whether `ip` is usable as a published address
pub fn is_global(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_global_v4(v4),
        IpAddr::V6(v6) => is_global_v6(v6),
    }
}

fn is_global_v4(ip: &Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();
    let shared = a == 100 && (64..128).contains(&b);

    !(ip.is_loopback()
        || ip.is_unspecified()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_broadcast()
        || ip.is_multicast()
        || shared)
}

fn is_global_v6(ip: &Ipv6Addr) -> bool {
    let first = ip.segments()[0];
    let link_local = (first & 0xffc0) == 0xfe80;
    let unique_local = (first & 0xfe00) == 0xfc00;

    !(ip.is_loopback() || ip.is_unspecified() || ip.is_multicast() || link_local || unique_local)
}

#[async_trait::async_trait]
impl IpSource for InterfaceIpSource {
    async fn current(&self) -> Result<IpAddr> {
        let addresses = local_ip_address::list_afinet_netifas()
            .map_err(|e| Error::ip_source(format!("Failed to list network interfaces: {}", e)))?;

        tracing::debug!("Detected {} interface addresses", addresses.len());

        match self.select(&addresses) {
            Some(ip) => Ok(ip),
            None => Err(Error::not_found(format!(
                "no global {} address on {}",
                self.family,
                self.interface.as_deref().unwrap_or("any interface")
            ))),
        }
    }

    fn family(&self) -> Option<Family> {
        Some(self.family)
    }

    fn source_name(&self) -> &'static str {
        "interface"
    }
}
