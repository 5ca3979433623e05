//! Core traits for the reconciler
//!
//! This module defines the abstract collaborators of a run.
//!
//! - [`IpSource`]: Discover the caller's current address
//! - [`NameResolver`]: Look up the currently published address
//! - [`DnsProvider`]: Read and change record sets via the provider API

pub mod ip_source;
pub mod dns_provider;
pub mod resolver;

pub use ip_source::IpSource;
pub use dns_provider::{DnsProvider, ZoneInfo};
pub use resolver::{NameResolver, Resolution};
