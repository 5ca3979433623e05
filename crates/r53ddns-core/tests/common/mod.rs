//! Test doubles and common utilities for reconciler contract tests
//!
//! The fake provider and fake resolver share one in-memory zone, so a
//! submitted batch becomes visible to the next lookup the way a propagated
//! Route 53 change would.

#![allow(dead_code)]

use async_trait::async_trait;
use r53ddns_core::batch::{ChangeAction, ChangeEntry, ChangeInfo, ChangeStatus, SealedBatch};
use r53ddns_core::error::{Error, Result};
use r53ddns_core::record::{PublishedRecord, RecordKind, normalize_name};
use r53ddns_core::traits::{DnsProvider, NameResolver, Resolution, ZoneInfo};
use r53ddns_core::ReconcileConfig;
use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ZONE_ID: &str = "Z0123456789ABC";
pub const DOMAIN: &str = "home.example.com";

/// In-memory record sets keyed by (normalized name, kind)
#[derive(Clone, Default)]
pub struct FakeZone {
    records: Arc<Mutex<HashMap<(String, RecordKind), PublishedRecord>>>,
}

impl FakeZone {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record set
    pub fn publish(&self, name: &str, kind: RecordKind, ttl: u32, values: &[&str]) {
        self.records.lock().unwrap().insert(
            (normalize_name(name), kind),
            PublishedRecord::new(ttl, values.iter().map(|v| v.to_string()).collect()),
        );
    }

    pub fn get(&self, name: &str, kind: RecordKind) -> Option<PublishedRecord> {
        self.records
            .lock()
            .unwrap()
            .get(&(normalize_name(name), kind))
            .cloned()
    }

    /// Apply entries the way the provider would
    fn apply(&self, entries: &[ChangeEntry]) {
        let mut records = self.records.lock().unwrap();
        for entry in entries {
            let key = (normalize_name(&entry.name), entry.kind);
            match entry.action {
                ChangeAction::Delete => {
                    records.remove(&key);
                }
                ChangeAction::Create => {
                    records.insert(key, PublishedRecord::new(entry.ttl, entry.values.clone()));
                }
            }
        }
    }
}

/// A DnsProvider backed by a [`FakeZone`] that records every call
#[derive(Clone)]
pub struct FakeProvider {
    zone: FakeZone,
    zone_exists: bool,
    reject_with: Option<String>,
    status_read_fails: bool,
    statuses: Arc<Mutex<VecDeque<ChangeStatus>>>,
    submitted: Arc<Mutex<Vec<Vec<ChangeEntry>>>>,
    get_zone_calls: Arc<AtomicUsize>,
    list_calls: Arc<AtomicUsize>,
    submit_calls: Arc<AtomicUsize>,
    status_calls: Arc<AtomicUsize>,
}

impl FakeProvider {
    pub fn new(zone: FakeZone) -> Self {
        Self {
            zone,
            zone_exists: true,
            reject_with: None,
            status_read_fails: false,
            statuses: Arc::new(Mutex::new(VecDeque::new())),
            submitted: Arc::new(Mutex::new(Vec::new())),
            get_zone_calls: Arc::new(AtomicUsize::new(0)),
            list_calls: Arc::new(AtomicUsize::new(0)),
            submit_calls: Arc::new(AtomicUsize::new(0)),
            status_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make zone lookups fail
    pub fn without_zone(mut self) -> Self {
        self.zone_exists = false;
        self
    }

    /// Make submissions fail with `message`
    pub fn rejecting(mut self, message: &str) -> Self {
        self.reject_with = Some(message.to_string());
        self
    }

    /// Make status reads fail
    pub fn failing_status_reads(mut self) -> Self {
        self.status_read_fails = true;
        self
    }

    /// Statuses returned by successive status reads; INSYNC once exhausted
    pub fn with_statuses(self, statuses: Vec<ChangeStatus>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into();
        self
    }

    pub fn get_zone_calls(&self) -> usize {
        self.get_zone_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    /// Total number of provider API calls
    pub fn total_calls(&self) -> usize {
        self.get_zone_calls() + self.list_calls() + self.submit_calls() + self.status_calls()
    }

    /// Entries of every submitted batch, in submission order
    pub fn submitted(&self) -> Vec<Vec<ChangeEntry>> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl DnsProvider for FakeProvider {
    async fn get_zone(&self, zone_id: &str) -> Result<ZoneInfo> {
        self.get_zone_calls.fetch_add(1, Ordering::SeqCst);
        if !self.zone_exists {
            return Err(Error::zone_lookup(format!("NoSuchHostedZone: {}", zone_id)));
        }
        Ok(ZoneInfo {
            id: zone_id.to_string(),
            name: "example.com.".to_string(),
        })
    }

    async fn list_records(
        &self,
        _zone_id: &str,
        record_name: &str,
        kind: RecordKind,
    ) -> Result<Option<PublishedRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.zone.get(record_name, kind))
    }

    async fn submit(&self, _zone_id: &str, batch: &SealedBatch) -> Result<ChangeInfo> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.reject_with {
            return Err(Error::commit_rejected(message.clone(), batch.to_json()));
        }
        self.submitted.lock().unwrap().push(batch.entries().to_vec());
        self.zone.apply(batch.entries());
        Ok(ChangeInfo::new(
            &format!("/change/C{}", self.submit_calls()),
            ChangeStatus::Pending,
        ))
    }

    async fn change_status(&self, change_id: &str) -> Result<ChangeStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if self.status_read_fails {
            return Err(Error::change_status(format!("NoSuchChange: {}", change_id)));
        }
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ChangeStatus::InSync))
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

/// A NameResolver answering from a [`FakeZone`]
#[derive(Clone)]
pub struct FakeResolver {
    zone: FakeZone,
    failing: bool,
    calls: Arc<AtomicUsize>,
}

impl FakeResolver {
    pub fn new(zone: FakeZone) -> Self {
        Self {
            zone,
            failing: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Every lookup returns Unresolved
    pub fn failing(zone: FakeZone) -> Self {
        Self {
            failing: true,
            ..Self::new(zone)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NameResolver for FakeResolver {
    async fn resolve(&self, name: &str, kind: RecordKind) -> Resolution {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Resolution::Unresolved;
        }
        self.zone
            .get(name, kind)
            .and_then(|record| record.values.first().and_then(|v| v.parse::<IpAddr>().ok()))
            .map(Resolution::Address)
            .unwrap_or(Resolution::Unresolved)
    }
}

/// Configuration pointing at the test zone and domain
pub fn test_config() -> ReconcileConfig {
    ReconcileConfig::new(ZONE_ID, DOMAIN).with_poll_interval_secs(10)
}

pub fn ip(s: &str) -> IpAddr {
    s.parse().expect("valid test address")
}
