//! Per-family diff
//!
//! [`plan`] is pure: given what the caller wants and what the provider
//! holds, it decides what to change. The reconciler does the lookups that
//! feed it.

use crate::batch::ChangeEntry;
use crate::desired::DesiredAddress;
use crate::record::{PublishedRecord, RecordKind};
use std::net::IpAddr;

/// What to do with one family's record set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Published state already matches
    NoOp,
    /// Remove every published value and create nothing
    Clear { stale: Vec<String>, ttl: u32 },
    /// Remove every stale value (possibly none), then create `desired`
    Replace {
        stale: Vec<String>,
        ttl: u32,
        desired: IpAddr,
    },
}

impl Action {
    /// Change entries for (name, kind), deletes first
    pub fn entries(&self, name: &str, kind: RecordKind) -> Vec<ChangeEntry> {
        match self {
            Action::NoOp => Vec::new(),
            Action::Clear { stale, ttl } => {
                vec![ChangeEntry::delete(name, kind, *ttl, stale.clone())]
            }
            Action::Replace {
                stale,
                ttl,
                desired,
            } => {
                let mut entries = Vec::with_capacity(2);
                if !stale.is_empty() {
                    entries.push(ChangeEntry::delete(name, kind, *ttl, stale.clone()));
                }
                entries.push(ChangeEntry::create(name, kind, *ttl, desired.to_string()));
                entries
            }
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Action::NoOp)
    }
}

/// Decide the change for one family.
///
/// A disabled family never reaches the provider, so it plans nothing here
/// either.
pub fn plan(desired: DesiredAddress, published: &PublishedRecord) -> Action {
    match desired {
        DesiredAddress::Disabled => Action::NoOp,
        DesiredAddress::Absent => {
            if published.is_empty() {
                Action::NoOp
            } else {
                Action::Clear {
                    stale: published.values.clone(),
                    ttl: published.ttl,
                }
            }
        }
        DesiredAddress::Literal(ip) => {
            if published.contains(&ip) {
                Action::NoOp
            } else {
                Action::Replace {
                    stale: published.values.clone(),
                    ttl: published.ttl,
                    desired: ip,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::ChangeAction;

    fn literal(ip: &str) -> DesiredAddress {
        DesiredAddress::Literal(ip.parse().unwrap())
    }

    fn published(ttl: u32, values: &[&str]) -> PublishedRecord {
        PublishedRecord::new(ttl, values.iter().map(|v| v.to_string()).collect())
    }

    #[test]
    fn literal_already_published_is_noop() {
        let action = plan(literal("203.0.113.9"), &published(60, &["203.0.113.9"]));
        assert!(action.is_noop());
        assert!(action.entries("home.example.com", RecordKind::A).is_empty());
    }

    #[test]
    fn literal_among_several_values_is_noop() {
        let action = plan(
            literal("203.0.113.9"),
            &published(60, &["203.0.113.5", "203.0.113.9"]),
        );
        assert!(action.is_noop());
    }

    #[test]
    fn new_literal_deletes_every_stale_value_then_creates() {
        let action = plan(
            literal("203.0.113.9"),
            &published(60, &["203.0.113.5", "203.0.113.6"]),
        );
        let entries = action.entries("home.example.com", RecordKind::A);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, ChangeAction::Delete);
        assert_eq!(entries[0].values, vec!["203.0.113.5", "203.0.113.6"]);
        assert_eq!(entries[0].ttl, 60);
        assert_eq!(entries[1].action, ChangeAction::Create);
        assert_eq!(entries[1].values, vec!["203.0.113.9"]);
        assert_eq!(entries[1].ttl, 60);
    }

    #[test]
    fn new_literal_without_published_values_only_creates() {
        let action = plan(literal("2001:db8::9"), &PublishedRecord::empty(300));
        let entries = action.entries("home.example.com", RecordKind::Aaaa);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, ChangeAction::Create);
        assert_eq!(entries[0].kind, RecordKind::Aaaa);
        assert_eq!(entries[0].ttl, 300);
    }

    #[test]
    fn absent_clears_published_values() {
        let action = plan(DesiredAddress::Absent, &published(120, &["2001:db8::5"]));
        let entries = action.entries("home.example.com", RecordKind::Aaaa);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, ChangeAction::Delete);
        assert_eq!(entries[0].values, vec!["2001:db8::5"]);
        assert!(entries.iter().all(|e| e.action != ChangeAction::Create));
    }

    #[test]
    fn absent_with_nothing_published_is_noop() {
        assert!(plan(DesiredAddress::Absent, &PublishedRecord::empty(300)).is_noop());
    }

    #[test]
    fn disabled_plans_nothing_whatever_is_published() {
        let action = plan(DesiredAddress::Disabled, &published(60, &["203.0.113.5"]));
        assert!(action.is_noop());
    }
}
