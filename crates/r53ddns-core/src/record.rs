//! Address families, record kinds and published record snapshots

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Address family reconciled independently within one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    V4,
    V6,
}

impl Family {
    /// Families in the order a run processes them
    pub const ALL: [Family; 2] = [Family::V4, Family::V6];

    /// The DNS record kind that carries addresses of this family
    pub fn record_kind(self) -> RecordKind {
        match self {
            Family::V4 => RecordKind::A,
            Family::V6 => RecordKind::Aaaa,
        }
    }

    /// The family of an address
    pub fn of(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => Family::V4,
            IpAddr::V6(_) => Family::V6,
        }
    }

    /// Whether `ip` belongs to this family
    pub fn matches(self, ip: &IpAddr) -> bool {
        Family::of(ip) == self
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::V4 => f.write_str("IPv4"),
            Family::V6 => f.write_str("IPv6"),
        }
    }
}

/// DNS resource record type of a family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    #[serde(rename = "A")]
    A,
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordKind {
    /// Wire name of the record type
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::A => "A",
            RecordKind::Aaaa => "AAAA",
        }
    }

    /// The family whose addresses this record kind carries
    pub fn family(self) -> Family {
        match self {
            RecordKind::A => Family::V4,
            RecordKind::Aaaa => Family::V6,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-side record set for (name, kind), read once per family per run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedRecord {
    /// Time-to-live of the record set
    pub ttl: u32,
    /// Current values, verbatim as the provider returned them
    pub values: Vec<String>,
}

impl PublishedRecord {
    /// Create a snapshot from a ttl and values
    pub fn new(ttl: u32, values: Vec<String>) -> Self {
        Self { ttl, values }
    }

    /// Snapshot for a name with no record set, carrying the ttl a CREATE would use
    pub fn empty(ttl: u32) -> Self {
        Self {
            ttl,
            values: Vec::new(),
        }
    }

    /// Whether the provider holds no value for this name and kind
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether `ip` is among the published values.
    ///
    /// Values are compared as addresses so `2001:db8::1` matches
    /// `2001:0db8:0:0:0:0:0:1`.
    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.values
            .iter()
            .any(|v| v.trim().parse::<IpAddr>().is_ok_and(|parsed| parsed == *ip))
    }
}

/// Normalize a record name for comparison: lowercase, no trailing dot
pub fn normalize_name(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_maps_to_record_kind() {
        assert_eq!(Family::V4.record_kind(), RecordKind::A);
        assert_eq!(Family::V6.record_kind(), RecordKind::Aaaa);
        assert_eq!(RecordKind::Aaaa.family(), Family::V6);
        assert_eq!(RecordKind::Aaaa.to_string(), "AAAA");
    }

    #[test]
    fn family_of_address() {
        let v4: IpAddr = "203.0.113.9".parse().unwrap();
        let v6: IpAddr = "2001:db8::1".parse().unwrap();
        assert_eq!(Family::of(&v4), Family::V4);
        assert!(Family::V6.matches(&v6));
        assert!(!Family::V6.matches(&v4));
    }

    #[test]
    fn contains_compares_parsed_addresses() {
        let record = PublishedRecord::new(
            60,
            vec!["2001:0db8:0:0:0:0:0:1".to_string(), "not-an-ip".to_string()],
        );
        assert!(record.contains(&"2001:db8::1".parse().unwrap()));
        assert!(!record.contains(&"2001:db8::2".parse().unwrap()));
    }

    #[test]
    fn normalize_strips_trailing_dot_and_case() {
        assert_eq!(normalize_name("Home.Example.com."), "home.example.com");
        assert_eq!(normalize_name("home.example.com"), "home.example.com");
    }
}
