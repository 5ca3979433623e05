// # DNS Provider Trait
//
// Defines the record-management service the reconciler talks to: hosted zone
// lookup, record-set read, batched write, and change-status read.
//
// ## Implementations
//
// - Route 53: `r53ddns-provider-route53` crate
//
// ## Usage
//
// ```rust,ignore
// use r53ddns_core::{DnsProvider, RecordKind};
//
// let provider = /* DnsProvider implementation */;
// provider.get_zone("Z123").await?;
// let published = provider
//     .list_records("Z123", "home.example.com", RecordKind::A)
//     .await?;
// ```

use crate::batch::{ChangeInfo, ChangeStatus, SealedBatch};
use crate::record::{PublishedRecord, RecordKind};
use async_trait::async_trait;

/// Hosted zone as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneInfo {
    /// Zone identifier
    pub id: String,
    /// Zone apex name
    pub name: String,
}

/// Trait for DNS provider implementations
///
/// Each method maps onto exactly one provider API call. Providers do not
/// retry, do not poll, and do not decide whether a change is needed: the
/// reconciler owns the diff and the wait loop.
///
/// # Errors
///
/// - `get_zone` fails with [`crate::Error::ZoneLookup`]
/// - `list_records` fails with [`crate::Error::RecordRead`]
/// - `submit` fails with [`crate::Error::CommitRejected`]
/// - `change_status` fails with [`crate::Error::ChangeStatus`]
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Look up a hosted zone
    async fn get_zone(&self, zone_id: &str) -> Result<ZoneInfo, crate::Error>;

    /// Read the record set for (name, kind)
    ///
    /// Returns `None` when the zone holds no record set of that kind for
    /// exactly that name.
    async fn list_records(
        &self,
        zone_id: &str,
        record_name: &str,
        kind: RecordKind,
    ) -> Result<Option<PublishedRecord>, crate::Error>;

    /// Submit a batch in one write call
    ///
    /// On acceptance returns the change identifier and its initial status.
    async fn submit(&self, zone_id: &str, batch: &SealedBatch) -> Result<ChangeInfo, crate::Error>;

    /// Read the current status of a submitted change
    async fn change_status(&self, change_id: &str) -> Result<ChangeStatus, crate::Error>;

    /// Provider name (for logging)
    fn provider_name(&self) -> &'static str;
}
