//! Change batches and change status
//!
//! A [`ChangeBatch`] accumulates entries across families during one run.
//! Submission goes through [`ChangeBatch::seal`], which consumes the batch and
//! refuses to produce a [`SealedBatch`] when nothing was planned, so an empty
//! batch can never reach the provider and a submitted one can no longer grow.

use crate::record::{Family, RecordKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Action of a single change entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    Create,
    Delete,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeAction::Create => f.write_str("CREATE"),
            ChangeAction::Delete => f.write_str("DELETE"),
        }
    }
}

/// One (action, name, kind, ttl, values) change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub action: ChangeAction,
    pub name: String,
    pub kind: RecordKind,
    pub ttl: u32,
    pub values: Vec<String>,
}

impl ChangeEntry {
    /// Remove `values` from the record set (name, kind)
    pub fn delete(name: impl Into<String>, kind: RecordKind, ttl: u32, values: Vec<String>) -> Self {
        Self {
            action: ChangeAction::Delete,
            name: name.into(),
            kind,
            ttl,
            values,
        }
    }

    /// Create the record set (name, kind) holding a single value
    pub fn create(name: impl Into<String>, kind: RecordKind, ttl: u32, value: impl Into<String>) -> Self {
        Self {
            action: ChangeAction::Create,
            name: name.into(),
            kind,
            ttl,
            values: vec![value.into()],
        }
    }

    /// The family this entry touches
    pub fn family(&self) -> Family {
        self.kind.family()
    }
}

impl fmt::Display for ChangeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}({}, ttl {})",
            self.action,
            self.name,
            self.kind,
            self.values.join(", "),
            self.ttl
        )
    }
}

/// Change entries accumulated by one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeBatch {
    entries: Vec<ChangeEntry>,
}

impl ChangeBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one family's planned entries, keeping their order
    pub fn extend(&mut self, entries: impl IntoIterator<Item = ChangeEntry>) {
        self.entries.extend(entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[ChangeEntry] {
        &self.entries
    }

    /// Freeze the batch for submission.
    ///
    /// Returns `None` for an empty batch.
    pub fn seal(self) -> Option<SealedBatch> {
        if self.entries.is_empty() {
            None
        } else {
            Some(SealedBatch {
                entries: self.entries,
            })
        }
    }
}

/// A non-empty batch that can no longer change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SealedBatch {
    entries: Vec<ChangeEntry>,
}

impl SealedBatch {
    pub fn entries(&self) -> &[ChangeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: sealing rejects empty batches
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// JSON rendering used when logging a rejected batch
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.entries).unwrap_or_else(|_| self.to_string())
    }
}

impl fmt::Display for SealedBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for entry in &self.entries {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}", entry)?;
            first = false;
        }
        Ok(())
    }
}

/// Processing state of a submitted change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeStatus {
    /// Not yet propagated to all authoritative nameservers
    Pending,
    /// Propagated (terminal success)
    InSync,
    /// Any other state (terminal, not a success); carries the raw status or reason
    Unknown(String),
}

impl ChangeStatus {
    /// Map a provider status string
    pub fn from_provider(status: &str) -> Self {
        match status.trim().to_ascii_uppercase().as_str() {
            "PENDING" => ChangeStatus::Pending,
            "INSYNC" => ChangeStatus::InSync,
            _ => ChangeStatus::Unknown(status.to_string()),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ChangeStatus::Pending)
    }

    pub fn is_in_sync(&self) -> bool {
        matches!(self, ChangeStatus::InSync)
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeStatus::Pending => f.write_str("PENDING"),
            ChangeStatus::InSync => f.write_str("INSYNC"),
            ChangeStatus::Unknown(raw) => write!(f, "UNKNOWN({})", raw),
        }
    }
}

/// Identifier and status of an accepted change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeInfo {
    pub id: String,
    pub status: ChangeStatus,
}

impl ChangeInfo {
    /// Build from a provider change id, dropping any `/change/` path prefix
    pub fn new(id: &str, status: ChangeStatus) -> Self {
        Self {
            id: normalize_change_id(id),
            status,
        }
    }
}

/// Path prefix Route 53 puts in front of change ids
const CHANGE_ID_PREFIX: &str = "/change/";

/// Strip the `/change/` prefix and any trailing slash from a change id
pub fn normalize_change_id(id: &str) -> String {
    let id = id.trim().trim_end_matches('/');
    id.strip_prefix(CHANGE_ID_PREFIX).unwrap_or(id).to_string()
}
