// # Name Resolver Trait
//
// Looks up the value a name currently publishes for one record kind. The
// reconciler uses it as a cheap pre-check so an unchanged address never
// reaches the provider API.

use crate::record::RecordKind;
use async_trait::async_trait;
use std::net::IpAddr;

/// Outcome of a single lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// First address of the answer
    Address(IpAddr),
    /// The lookup failed (timeout, NXDOMAIN, empty or malformed answer)
    Unresolved,
}

impl Resolution {
    pub fn address(self) -> Option<IpAddr> {
        match self {
            Resolution::Address(ip) => Some(ip),
            Resolution::Unresolved => None,
        }
    }
}

/// Trait for name resolver implementations
///
/// `resolve` never fails: implementations log lookup failures and return
/// [`Resolution::Unresolved`]. One attempt per call, no retry.
#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn resolve(&self, name: &str, kind: RecordKind) -> Resolution;
}
