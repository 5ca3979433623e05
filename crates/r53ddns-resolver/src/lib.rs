// # Nameserver Resolver
//
// This crate provides the pre-check lookup for the reconciler: ask a fixed
// list of nameservers what a name currently publishes for A or AAAA.
//
// ## Behavior
//
// - Nameservers are queried in the configured order (provider nameserver
//   first, public fallbacks after), plain UDP/TCP on port 53
// - One attempt per call: no retries, no response cache, no hosts file
// - Every failure (timeout, NXDOMAIN, empty or malformed answer) is logged
//   and reported as `Resolution::Unresolved`

use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{
    NameServerConfigGroup, ResolverConfig, ResolverOpts, ServerOrderingStrategy,
};
use hickory_resolver::proto::rr::RecordType;
use r53ddns_core::config::validate_domain_name;
use r53ddns_core::traits::{NameResolver, Resolution};
use r53ddns_core::{Error, RecordKind, Result};
use std::net::IpAddr;
use std::time::Duration;

/// DNS port used for every configured nameserver
const DNS_PORT: u16 = 53;

/// Default per-query timeout
const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolver bound to an explicit nameserver list
pub struct NameserverResolver {
    resolver: TokioAsyncResolver,
    nameservers: Vec<IpAddr>,
}

impl std::fmt::Debug for NameserverResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameserverResolver")
            .field("nameservers", &self.nameservers)
            .finish()
    }
}

impl NameserverResolver {
    /// Create a resolver querying `nameservers` with the default timeout
    pub fn new(nameservers: &[IpAddr]) -> Result<Self> {
        Self::with_timeout(nameservers, DEFAULT_QUERY_TIMEOUT)
    }

    /// Create a resolver with a custom per-query timeout
    pub fn with_timeout(nameservers: &[IpAddr], timeout: Duration) -> Result<Self> {
        Self::build(nameservers, DNS_PORT, timeout)
    }

    fn build(nameservers: &[IpAddr], port: u16, timeout: Duration) -> Result<Self> {
        if nameservers.is_empty() {
            return Err(Error::config("At least one nameserver is required"));
        }

        let group = NameServerConfigGroup::from_ips_clear(nameservers, port, true);
        let config = ResolverConfig::from_parts(None, vec![], group);

        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 1;
        opts.cache_size = 0;
        opts.use_hosts_file = false;
        // One server at a time, in the order given
        opts.num_concurrent_reqs = 1;
        opts.server_ordering_strategy = ServerOrderingStrategy::UserProvidedOrder;

        tracing::debug!("Resolver nameservers: {:?} (timeout {:?})", nameservers, timeout);

        Ok(Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
            nameservers: nameservers.to_vec(),
        })
    }

    /// Nameservers in query order
    pub fn nameservers(&self) -> &[IpAddr] {
        &self.nameservers
    }
}

fn record_type(kind: RecordKind) -> RecordType {
    match kind {
        RecordKind::A => RecordType::A,
        RecordKind::Aaaa => RecordType::AAAA,
    }
}

/// Fully-qualified form of `name` so no search domain is appended
fn fqdn(name: &str) -> String {
    format!("{}.", name.trim().trim_end_matches('.'))
}

#[async_trait]
impl NameResolver for NameserverResolver {
    async fn resolve(&self, name: &str, kind: RecordKind) -> Resolution {
        if let Err(e) = validate_domain_name(name) {
            tracing::error!("Exception trying to resolve {} ({}): {}", name, kind, e);
            return Resolution::Unresolved;
        }

        let family = kind.family();
        match self.resolver.lookup(fqdn(name), record_type(kind)).await {
            Ok(lookup) => {
                let address = lookup
                    .iter()
                    .filter_map(|rdata| rdata.ip_addr())
                    .find(|ip| family.matches(ip));

                match address {
                    Some(ip) => {
                        tracing::debug!("Resolved {} ({}) -> {}", name, kind, ip);
                        Resolution::Address(ip)
                    }
                    None => {
                        tracing::error!(
                            "Exception trying to resolve {} ({}): answer has no {} address",
                            name,
                            kind,
                            family
                        );
                        Resolution::Unresolved
                    }
                }
            }
            Err(e) => {
                tracing::error!("Exception trying to resolve {} ({}): {}", name, kind, e);
                Resolution::Unresolved
            }
        }
    }
}
