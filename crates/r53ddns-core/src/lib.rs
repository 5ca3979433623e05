// # r53ddns-core
//
// Core library for the Route 53 dynamic DNS reconciler.
//
// ## Architecture Overview
//
// One run reconciles the A and AAAA records of a single name with the
// caller's current addresses:
// - **IpSource**: Trait for discovering the current address of a family
// - **NameResolver**: Trait for the pre-check lookup of the published address
// - **DnsProvider**: Trait for reading and changing record sets
// - **plan**: Per-family diff deciding deletes and creates
// - **commit_and_wait**: Batch submission and propagation polling
// - **Reconciler**: Orchestrates the above for IPv4 then IPv6
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **One-Shot**: A run reads, plans, commits at most once and returns
// 3. **Library-First**: All core functionality can be used as a library
// 4. **Idempotency**: A run against an up-to-date zone submits nothing

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;
pub mod record;
pub mod batch;
pub mod desired;

// Re-export core types for convenience
pub use traits::{IpSource, DnsProvider, NameResolver, Resolution, ZoneInfo};
pub use engine::{Reconciler, ReconcileReport, FamilyOutcome, FamilyPlan, CommitOutcome};
pub use config::ReconcileConfig;
pub use error::{Error, Result};
pub use record::{Family, RecordKind, PublishedRecord};
pub use batch::{ChangeAction, ChangeBatch, ChangeEntry, ChangeInfo, ChangeStatus, SealedBatch};
pub use desired::{DesiredAddress, DesiredSpec, DesiredState};
