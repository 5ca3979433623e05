//! Commit-and-wait
//!
//! Submits a sealed batch in one write call, then reads the change status
//! until it leaves PENDING. A rejected submission is an error; anything that
//! happens after acceptance (an odd terminal status, a failed status read, an
//! exhausted poll budget) is reported through the returned status instead,
//! because the write itself went through.

use crate::batch::{ChangeStatus, SealedBatch};
use crate::error::{Error, Result};
use crate::traits::DnsProvider;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Result of an accepted submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Provider change identifier
    pub change_id: String,
    /// Last observed status
    pub status: ChangeStatus,
    /// Number of status reads performed
    pub polls: u32,
}

impl CommitOutcome {
    pub fn is_in_sync(&self) -> bool {
        self.status.is_in_sync()
    }
}

/// Submit `batch` and wait for a terminal status.
///
/// The first status read happens right after acceptance; later reads are
/// spaced by `poll_interval`. With `max_polls` set, at most that many reads
/// are made and a change still PENDING afterwards is returned as such.
pub async fn commit_and_wait(
    provider: &dyn DnsProvider,
    zone_id: &str,
    batch: &SealedBatch,
    poll_interval: Duration,
    max_polls: Option<u32>,
) -> Result<CommitOutcome> {
    debug!("Submitting change batch: {}", batch);

    let change = match provider.submit(zone_id, batch).await {
        Ok(change) => change,
        Err(e) => {
            let err = match e {
                Error::CommitRejected { .. } => e,
                other => Error::commit_rejected(other.to_string(), batch.to_json()),
            };
            error!("Changes {} can't be made: {}", batch.to_json(), err);
            return Err(err);
        }
    };

    info!(
        "Change {} accepted by {} (status: {})",
        change.id,
        provider.provider_name(),
        change.status
    );

    let mut status = change.status;
    let mut polls: u32 = 0;

    loop {
        if max_polls.is_some_and(|max| polls >= max) {
            warn!(
                "Giving up on change {} after {} status reads, last status {}",
                change.id, polls, status
            );
            break;
        }

        if polls > 0 {
            tokio::time::sleep(poll_interval).await;
        }

        polls += 1;
        match provider.change_status(&change.id).await {
            Ok(current) => status = current,
            Err(e) => {
                warn!("Could not read status of change {}: {}", change.id, e);
                status = ChangeStatus::Unknown(e.to_string());
                break;
            }
        }

        debug!("Change {} status: {} (read {})", change.id, status, polls);

        if !status.is_pending() {
            break;
        }
    }

    Ok(CommitOutcome {
        change_id: change.id,
        status,
        polls,
    })
}
