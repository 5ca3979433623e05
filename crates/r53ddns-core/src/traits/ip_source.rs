// # IP Source Trait
//
// Defines the interface for discovering the caller's current address of one
// family. Sources are consulted once, before reconciliation begins, and only
// for families whose address was not given literally.
//
// ## Implementations
//
// - HTTP "what is my IP" service (IPv4): `r53ddns-ip-http` crate
// - Local interface enumeration (IPv6): `r53ddns-ip-iface` crate
//
// ## Usage
//
// ```rust,ignore
// use r53ddns_core::IpSource;
//
// let source = /* IpSource implementation */;
// let ip = source.current().await?;
// ```

use crate::record::Family;
use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for IP source implementations
///
/// # Contract
///
/// - `current()` performs one discovery attempt and returns immediately.
/// - When the source looked and found no usable address it returns
///   [`crate::Error::NotFound`]; callers treat that as "no address wanted"
///   for the family. Every other error is a discovery failure.
/// - Sources do not retry, cache, or decide anything about DNS records.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Discover the current address
    async fn current(&self) -> Result<IpAddr, crate::Error>;

    /// The family this source reports, if it is restricted to one
    fn family(&self) -> Option<Family> {
        None
    }

    /// Source name for logging
    fn source_name(&self) -> &'static str;
}
