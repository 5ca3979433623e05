// # Route 53 DNS Provider
//
// This crate provides the AWS Route 53 implementation of `DnsProvider`.
//
// ## Scope
//
// - One API call per trait method: no retry, no backoff, no polling (the
//   reconciler owns the wait loop)
// - Record-set reads are filtered to the exact name and type asked for
// - Dry-run mode performs every read, logs the batch it would submit, and
//   never writes
//
// ## Security
//
// - Credential overrides never appear in logs or Debug output
// - Without overrides the standard AWS credential chain is used
//   (environment, shared config/credentials files, instance roles)
//
// ## API Reference
//
// - GetHostedZone: GET `/2013-04-01/hostedzone/{Id}`
// - ListResourceRecordSets: GET `/2013-04-01/hostedzone/{Id}/rrset?name=..&type=..&maxitems=..`
// - ChangeResourceRecordSets: POST `/2013-04-01/hostedzone/{Id}/rrset`
// - GetChange: GET `/2013-04-01/change/{Id}`

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_route53::Client;
use aws_sdk_route53::config::Credentials;
use aws_sdk_route53::error::DisplayErrorContext;
use aws_sdk_route53::types::{
    Change, ChangeAction as AwsChangeAction, ChangeBatch as AwsChangeBatch,
    ChangeStatus as AwsChangeStatus, ResourceRecord, ResourceRecordSet, RrType,
};
use r53ddns_core::batch::{ChangeAction, ChangeEntry, ChangeInfo, ChangeStatus, SealedBatch};
use r53ddns_core::record::{PublishedRecord, RecordKind, normalize_name};
use r53ddns_core::traits::{DnsProvider, ZoneInfo};
use r53ddns_core::{Error, Result};

/// Route 53 is a global service; its API is signed for us-east-1
const FALLBACK_REGION: &str = "us-east-1";

/// Record sets read per ListResourceRecordSets call
const MAX_ITEMS: i32 = 20;

/// Change id reported for batches that were not submitted
pub const DRY_RUN_CHANGE_ID: &str = "dry-run";

/// Comment attached to every submitted batch
const BATCH_COMMENT: &str = "r53ddns dynamic DNS update";

/// Static credentials overriding the default credential chain
#[derive(Clone)]
pub struct StaticCredentials {
    pub access_key_id: String,
    /// ⚠️ NEVER log this value
    pub secret_access_key: String,
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<REDACTED>")
            .finish()
    }
}

/// Route 53 DNS provider
pub struct Route53Provider {
    /// SDK client
    client: Client,

    /// Dry-run mode: perform reads, skip the write
    dry_run: bool,
}

// Custom Debug implementation: the SDK client carries the credentials provider
impl std::fmt::Debug for Route53Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route53Provider")
            .field("client", &"<aws-sdk-route53>")
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Route53Provider {
    /// Wrap an existing SDK client
    pub fn new(client: Client, dry_run: bool) -> Self {
        Self { client, dry_run }
    }

    /// Build a client from the environment, optionally overriding credentials
    pub async fn from_env(credentials: Option<StaticCredentials>, dry_run: bool) -> Self {
        let region = RegionProviderChain::default_provider().or_else(FALLBACK_REGION);
        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region);

        if let Some(creds) = credentials {
            tracing::debug!("Using credentials from command line (key id {})", creds.access_key_id);
            loader = loader.credentials_provider(Credentials::new(
                creds.access_key_id,
                creds.secret_access_key,
                None,
                None,
                "r53ddns-cli",
            ));
        }

        let sdk_config = loader.load().await;

        if dry_run {
            tracing::warn!("Route 53 provider running in DRY-RUN mode - no changes will be made");
        }

        Self::new(Client::new(&sdk_config), dry_run)
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

fn rr_type(kind: RecordKind) -> RrType {
    match kind {
        RecordKind::A => RrType::A,
        RecordKind::Aaaa => RrType::Aaaa,
    }
}

fn change_action(action: ChangeAction) -> AwsChangeAction {
    match action {
        ChangeAction::Create => AwsChangeAction::Create,
        ChangeAction::Delete => AwsChangeAction::Delete,
    }
}

/// Map an SDK change status
fn map_status(status: &AwsChangeStatus) -> ChangeStatus {
    match status {
        AwsChangeStatus::Pending => ChangeStatus::Pending,
        AwsChangeStatus::Insync => ChangeStatus::InSync,
        other => ChangeStatus::Unknown(other.as_str().to_string()),
    }
}

/// Collapse the record sets matching (name, kind) into one snapshot
///
/// ListResourceRecordSets starts at the given name and keeps going through
/// the zone, so other names and types are dropped here. Alias sets carry no
/// values and are skipped.
fn published_record(
    sets: &[ResourceRecordSet],
    record_name: &str,
    kind: RecordKind,
) -> Option<PublishedRecord> {
    let wanted_name = normalize_name(record_name);
    let wanted_type = rr_type(kind);

    let matching: Vec<&ResourceRecordSet> = sets
        .iter()
        .filter(|set| set.r#type() == &wanted_type && normalize_name(set.name()) == wanted_name)
        .filter(|set| set.alias_target().is_none())
        .collect();

    let first = matching.first()?;
    let ttl = first
        .ttl()
        .and_then(|ttl| u32::try_from(ttl).ok())
        .unwrap_or_default();

    let values = matching
        .iter()
        .flat_map(|set| set.resource_records())
        .map(|record| record.value().to_string())
        .collect();

    Some(PublishedRecord::new(ttl, values))
}

/// Convert one entry into an SDK change
fn to_change(entry: &ChangeEntry) -> Result<Change> {
    let records = entry
        .values
        .iter()
        .map(|value| ResourceRecord::builder().value(value).build())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::invalid_input(format!("Invalid record value: {}", e)))?;

    let set = ResourceRecordSet::builder()
        .name(&entry.name)
        .r#type(rr_type(entry.kind))
        .ttl(i64::from(entry.ttl))
        .set_resource_records(Some(records))
        .build()
        .map_err(|e| Error::invalid_input(format!("Invalid record set: {}", e)))?;

    Change::builder()
        .action(change_action(entry.action))
        .resource_record_set(set)
        .build()
        .map_err(|e| Error::invalid_input(format!("Invalid change: {}", e)))
}

/// Convert a sealed batch into an SDK change batch
fn to_change_batch(batch: &SealedBatch) -> Result<AwsChangeBatch> {
    let changes = batch
        .entries()
        .iter()
        .map(to_change)
        .collect::<Result<Vec<_>>>()?;

    AwsChangeBatch::builder()
        .comment(BATCH_COMMENT)
        .set_changes(Some(changes))
        .build()
        .map_err(|e| Error::invalid_input(format!("Invalid change batch: {}", e)))
}

#[async_trait]
impl DnsProvider for Route53Provider {
    /// # API Call
    ///
    /// ```http
    /// GET /2013-04-01/hostedzone/{Id}
    /// ```
    async fn get_zone(&self, zone_id: &str) -> Result<ZoneInfo> {
        tracing::debug!("Looking up hosted zone {}", zone_id);

        let output = self
            .client
            .get_hosted_zone()
            .id(zone_id)
            .send()
            .await
            .map_err(|e| Error::zone_lookup(DisplayErrorContext(&e).to_string()))?;

        let zone = output
            .hosted_zone()
            .ok_or_else(|| Error::zone_lookup("Invalid response: no hosted zone"))?;

        Ok(ZoneInfo {
            id: zone.id().to_string(),
            name: zone.name().to_string(),
        })
    }

    /// # API Call
    ///
    /// ```http
    /// GET /2013-04-01/hostedzone/{Id}/rrset?name={name}&type={kind}&maxitems=20
    /// ```
    async fn list_records(
        &self,
        zone_id: &str,
        record_name: &str,
        kind: RecordKind,
    ) -> Result<Option<PublishedRecord>> {
        tracing::debug!("Listing {} record sets for {}", kind, record_name);

        let output = self
            .client
            .list_resource_record_sets()
            .hosted_zone_id(zone_id)
            .start_record_name(record_name)
            .start_record_type(rr_type(kind))
            .max_items(MAX_ITEMS)
            .send()
            .await
            .map_err(|e| Error::record_read(DisplayErrorContext(&e).to_string()))?;

        Ok(published_record(
            output.resource_record_sets(),
            record_name,
            kind,
        ))
    }

    /// # API Call
    ///
    /// ```http
    /// POST /2013-04-01/hostedzone/{Id}/rrset
    /// ```
    ///
    /// Skipped in dry-run mode.
    async fn submit(&self, zone_id: &str, batch: &SealedBatch) -> Result<ChangeInfo> {
        let change_batch = to_change_batch(batch)
            .map_err(|e| Error::commit_rejected(e.to_string(), batch.to_json()))?;

        if self.dry_run {
            tracing::warn!("DRY-RUN: would submit to zone {}: {}", zone_id, batch);
            return Ok(ChangeInfo::new(
                DRY_RUN_CHANGE_ID,
                ChangeStatus::Unknown("DRY-RUN".to_string()),
            ));
        }

        let output = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(change_batch)
            .send()
            .await
            .map_err(|e| Error::commit_rejected(DisplayErrorContext(&e).to_string(), batch.to_json()))?;

        let info = output.change_info().ok_or_else(|| {
            Error::commit_rejected("Invalid response: no change info", batch.to_json())
        })?;

        Ok(ChangeInfo::new(info.id(), map_status(info.status())))
    }

    /// # API Call
    ///
    /// ```http
    /// GET /2013-04-01/change/{Id}
    /// ```
    async fn change_status(&self, change_id: &str) -> Result<ChangeStatus> {
        if self.dry_run && change_id == DRY_RUN_CHANGE_ID {
            return Ok(ChangeStatus::Unknown("DRY-RUN".to_string()));
        }

        let output = self
            .client
            .get_change()
            .id(change_id)
            .send()
            .await
            .map_err(|e| Error::change_status(DisplayErrorContext(&e).to_string()))?;

        let info = output
            .change_info()
            .ok_or_else(|| Error::change_status("Invalid response: no change info"))?;

        Ok(map_status(info.status()))
    }

    fn provider_name(&self) -> &'static str {
        "route53"
    }
}
