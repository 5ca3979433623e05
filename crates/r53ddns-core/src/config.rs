//! Configuration types for the reconciler
//!
//! Everything the original tool kept as process-wide constants (nameserver
//! list, poll interval) lives here and is passed into the components, so
//! tests can shrink intervals and point the resolver anywhere.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Route 53 nameserver queried first
pub const PROVIDER_NAMESERVER: IpAddr = IpAddr::V4(Ipv4Addr::new(205, 251, 194, 115));

/// Public fallbacks queried after the provider nameserver
pub const FALLBACK_NAMESERVERS: [IpAddr; 2] = [
    IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
    IpAddr::V4(Ipv4Addr::new(8, 8, 4, 4)),
];

/// Reconciliation settings for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Hosted zone identifier
    pub hosted_zone: String,

    /// Name whose A/AAAA records are reconciled
    pub domain_name: String,

    /// Nameservers used for the pre-check lookup, in order
    #[serde(default = "default_nameservers")]
    pub nameservers: Vec<IpAddr>,

    /// Seconds between change-status reads
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Upper bound on change-status reads; `None` waits until the change
    /// leaves PENDING
    #[serde(default)]
    pub max_poll_attempts: Option<u32>,

    /// TTL used when creating a record set that does not exist yet
    #[serde(default = "default_ttl")]
    pub default_ttl: u32,
}

impl ReconcileConfig {
    /// Create a configuration with defaults for everything but the target
    pub fn new(hosted_zone: impl Into<String>, domain_name: impl Into<String>) -> Self {
        Self {
            hosted_zone: hosted_zone.into(),
            domain_name: domain_name.into(),
            nameservers: default_nameservers(),
            poll_interval_secs: default_poll_interval_secs(),
            max_poll_attempts: None,
            default_ttl: default_ttl(),
        }
    }

    /// Replace the nameserver list
    pub fn with_nameservers(mut self, nameservers: Vec<IpAddr>) -> Self {
        self.nameservers = nameservers;
        self
    }

    /// Set the poll interval
    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs;
        self
    }

    /// Bound the number of status reads
    pub fn with_max_poll_attempts(mut self, attempts: Option<u32>) -> Self {
        self.max_poll_attempts = attempts;
        self
    }

    /// Set the ttl for newly created record sets
    pub fn with_default_ttl(mut self, ttl: u32) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Poll interval as a duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.hosted_zone.trim().is_empty() {
            return Err(crate::Error::config("Hosted zone cannot be empty"));
        }

        validate_domain_name(&self.domain_name)?;

        if self.nameservers.is_empty() {
            return Err(crate::Error::config("At least one nameserver is required"));
        }

        if self.poll_interval_secs == 0 {
            return Err(crate::Error::config("Poll interval must be > 0"));
        }

        if self.max_poll_attempts == Some(0) {
            return Err(crate::Error::config("Max poll attempts must be > 0 when set"));
        }

        if self.default_ttl == 0 {
            return Err(crate::Error::config("Default TTL must be > 0"));
        }

        Ok(())
    }
}

/// Validate that a string is a usable domain name
///
/// Basic RFC 1035 checks: total length, label length, label characters and
/// hyphen placement. A single trailing dot is accepted.
pub fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    let domain = domain.strip_suffix('.').unwrap_or(domain);

    if domain.is_empty() {
        return Err(crate::Error::config("Domain name cannot be empty"));
    }

    if domain.len() > 253 {
        return Err(crate::Error::config(format!(
            "Domain name too long: {} chars (max 253)",
            domain.len()
        )));
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "Domain name has empty label: '{}'",
                domain
            )));
        }

        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(crate::Error::config(format!(
                "Domain label contains invalid characters: '{}'",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "Domain label cannot start or end with hyphen: '{}'",
                label
            )));
        }
    }

    Ok(())
}

fn default_nameservers() -> Vec<IpAddr> {
    let mut servers = vec![PROVIDER_NAMESERVER];
    servers.extend(FALLBACK_NAMESERVERS);
    servers
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_ttl() -> u32 {
    300
}
