//! Reconciler
//!
//! The Reconciler is responsible for:
//! - Checking each family's published address with a cheap DNS lookup
//! - Reading the provider's record set when the lookup disagrees
//! - Planning deletes/creates per family into one change batch
//! - Committing the batch and waiting for it to propagate
//!
//! ## Architecture
//!
//! ```text
//!                        ┌──────────────┐
//!   DesiredState ───────▶│  Reconciler  │
//!                        └──────────────┘
//!                                │
//!         ┌──────────────────────┼──────────────────────┐
//!         │                      │                      │
//!         ▼                      ▼                      ▼
//! ┌──────────────┐       ┌──────────────┐       ┌──────────────┐
//! │ NameResolver │       │  plan()      │       │ DnsProvider  │
//! │ (pre-check)  │       │  (diff)      │       │ (read/write) │
//! └──────────────┘       └──────────────┘       └──────────────┘
//! ```
//!
//! ## Flow
//!
//! 1. For IPv4 then IPv6: skip disabled families
//! 2. Resolve the published address; equal to desired → skip
//! 3. Verify the hosted zone (once per run), read the record set
//! 4. Plan the family's entries into the shared batch
//! 5. Empty batch → done; otherwise commit and poll until terminal

pub mod commit;
pub mod plan;

pub use commit::{CommitOutcome, commit_and_wait};
pub use plan::{Action, plan};

use crate::batch::{ChangeBatch, ChangeEntry};
use crate::config::ReconcileConfig;
use crate::desired::{DesiredAddress, DesiredState};
use crate::error::{Error, Result};
use crate::record::{Family, PublishedRecord};
use crate::traits::{DnsProvider, NameResolver, Resolution};
use std::net::IpAddr;
use tracing::{debug, info, warn};

/// What happened to one family during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FamilyOutcome {
    /// Family switched off; nothing was looked up
    Disabled,
    /// Published state already matched
    Unchanged,
    /// Entries were added to the batch
    Planned(FamilyPlan),
}

/// Planned change of one family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyPlan {
    pub family: Family,
    /// Values published before the change
    pub before: Vec<String>,
    /// Address published after the change; `None` when the record is cleared
    pub after: Option<IpAddr>,
    /// Entries contributed to the batch, deletes first
    pub entries: Vec<ChangeEntry>,
}

/// Summary of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Outcome per family, in processing order
    pub families: Vec<(Family, FamilyOutcome)>,
    /// Present when a batch was submitted
    pub commit: Option<CommitOutcome>,
}

impl ReconcileReport {
    /// Whether any change was submitted
    pub fn changed(&self) -> bool {
        self.commit.is_some()
    }

    /// Outcome of `family`
    pub fn outcome(&self, family: Family) -> Option<&FamilyOutcome> {
        self.families
            .iter()
            .find(|(f, _)| *f == family)
            .map(|(_, outcome)| outcome)
    }

    /// Planned changes, in processing order
    pub fn plans(&self) -> impl Iterator<Item = &FamilyPlan> {
        self.families.iter().filter_map(|(_, outcome)| match outcome {
            FamilyOutcome::Planned(plan) => Some(plan),
            _ => None,
        })
    }
}

/// One-shot reconciler for a single domain name
///
/// ## Lifecycle
///
/// 1. Create with [`Reconciler::new()`]
/// 2. Call [`Reconciler::run()`] once per invocation
///
/// ## Threading
///
/// Strictly sequential: every lookup, read, write and status poll is awaited
/// before the next one starts, and no tasks are spawned.
pub struct Reconciler {
    /// DNS provider holding the records
    provider: Box<dyn DnsProvider>,

    /// Resolver used for the pre-check lookup
    resolver: Box<dyn NameResolver>,

    /// Run settings
    config: ReconcileConfig,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Returns
    ///
    /// - `Err(Error::Config)` if the configuration is invalid
    pub fn new(
        provider: Box<dyn DnsProvider>,
        resolver: Box<dyn NameResolver>,
        config: ReconcileConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            provider,
            resolver,
            config,
        })
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Reconcile both families against `desired`
    ///
    /// # Returns
    ///
    /// - `Ok(ReconcileReport)`: no change needed, or a change was accepted
    ///   (whatever its terminal status)
    /// - `Err(Error)`: the provider rejected the zone lookup, a record read,
    ///   or the batch
    pub async fn run(&self, desired: &DesiredState) -> Result<ReconcileReport> {
        let mut batch = ChangeBatch::new();
        let mut families = Vec::with_capacity(Family::ALL.len());
        let mut zone_verified = false;

        for family in Family::ALL {
            let outcome = self
                .reconcile_family(family, desired.get(family), &mut zone_verified)
                .await?;

            if let FamilyOutcome::Planned(plan) = &outcome {
                batch.extend(plan.entries.iter().cloned());
            }
            families.push((family, outcome));
        }

        let Some(sealed) = batch.seal() else {
            info!("No change detected for {}", self.config.domain_name);
            return Ok(ReconcileReport {
                families,
                commit: None,
            });
        };

        warn!(
            "Change detected, contacting {} API ({} entries)",
            self.provider.provider_name(),
            sealed.len()
        );

        let outcome = commit_and_wait(
            self.provider.as_ref(),
            &self.config.hosted_zone,
            &sealed,
            self.config.poll_interval(),
            self.config.max_poll_attempts,
        )
        .await?;

        let report = ReconcileReport {
            families,
            commit: Some(outcome),
        };
        self.log_terminal(&report);

        Ok(report)
    }

    /// Decide one family's contribution to the batch
    async fn reconcile_family(
        &self,
        family: Family,
        desired: DesiredAddress,
        zone_verified: &mut bool,
    ) -> Result<FamilyOutcome> {
        let domain = &self.config.domain_name;
        let kind = family.record_kind();

        if desired == DesiredAddress::Disabled {
            warn!("Family {} disabled", family);
            return Ok(FamilyOutcome::Disabled);
        }

        debug!("My {}: {:?}", family, desired);

        let resolved = self.resolver.resolve(domain, kind).await;
        // Only a resolved match skips the provider read; Unresolved may be a timeout
        let matches = matches!(
            (desired, resolved),
            (DesiredAddress::Literal(ip), Resolution::Address(published)) if ip == published
        );

        if matches {
            debug!("{} in DNS matches desired state for {}, nothing to do", family, domain);
            return Ok(FamilyOutcome::Unchanged);
        }
        debug!(
            "{} in DNS is different ({:?}), checking provider records",
            family,
            resolved.address()
        );

        if !*zone_verified {
            self.verify_zone().await?;
            *zone_verified = true;
        }

        let published = self
            .provider
            .list_records(&self.config.hosted_zone, domain, kind)
            .await
            .map_err(|e| match e {
                Error::RecordRead(_) => e,
                other => Error::record_read(other.to_string()),
            })?
            .unwrap_or_else(|| PublishedRecord::empty(self.config.default_ttl));
        debug!("Published {} record set for {}: {:?}", kind, domain, published);

        let action = plan(desired, &published);
        if action.is_noop() {
            debug!("Provider already holds desired {} state for {}", family, domain);
            return Ok(FamilyOutcome::Unchanged);
        }

        let after = desired.literal();
        if let Some(ip) = after {
            info!("Found new {}: {}", family, ip);
        } else {
            info!("No {} wanted, clearing {} {}", family, domain, kind);
        }

        Ok(FamilyOutcome::Planned(FamilyPlan {
            family,
            before: published.values,
            after,
            entries: action.entries(domain, kind),
        }))
    }

    /// Look up the hosted zone; failure ends the run
    async fn verify_zone(&self) -> Result<()> {
        let zone = self
            .provider
            .get_zone(&self.config.hosted_zone)
            .await
            .map_err(|e| match e {
                Error::ZoneLookup(_) => e,
                other => Error::zone_lookup(other.to_string()),
            })?;
        debug!("Hosted zone {} ({})", zone.id, zone.name);
        Ok(())
    }

    fn log_terminal(&self, report: &ReconcileReport) {
        let Some(commit) = &report.commit else {
            return;
        };
        let domain = &self.config.domain_name;

        if commit.is_in_sync() {
            for plan in report.plans() {
                let after = plan
                    .after
                    .map(|ip| ip.to_string())
                    .unwrap_or_else(|| "(none)".to_string());
                info!(
                    "Change {} {} from {} -> {}",
                    domain,
                    plan.family.record_kind(),
                    if plan.before.is_empty() {
                        "(none)".to_string()
                    } else {
                        plan.before.join(", ")
                    },
                    after
                );
                warn!("{} updated: {}", plan.family, after);
            }
        } else {
            warn!(
                "Unknown status for change {}: {}",
                commit.change_id, commit.status
            );
        }
    }
}
