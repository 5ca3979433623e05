//! Error types for the reconciler
//!
//! The variants follow the failure taxonomy of a run: resolution failures are
//! never surfaced as errors (the resolver logs them and reports `Unresolved`),
//! provider read and write failures are fatal, and propagation ambiguity is a
//! status, not an error.

use thiserror::Error;

/// Result type alias for reconciler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the reconciler
#[derive(Error, Debug)]
pub enum Error {
    /// IP source errors (address discovery)
    #[error("IP source error: {0}")]
    IpSource(String),

    /// The hosted zone could not be read from the provider
    #[error("Hosted zone lookup failed: {0}")]
    ZoneLookup(String),

    /// A record set could not be read from the provider
    #[error("Record set read failed: {0}")]
    RecordRead(String),

    /// The provider rejected a submitted change batch
    #[error("Change batch rejected: {message} (batch: {batch})")]
    CommitRejected {
        /// Provider error detail
        message: String,
        /// Serialized batch contents
        batch: String,
    },

    /// The status of a submitted change could not be read
    #[error("Change status read failed: {0}")]
    ChangeStatus(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Nothing found (e.g. no usable address on any interface)
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(String),
}

impl Error {
    /// Create an IP source error
    pub fn ip_source(msg: impl Into<String>) -> Self {
        Self::IpSource(msg.into())
    }

    /// Create a zone lookup error
    pub fn zone_lookup(msg: impl Into<String>) -> Self {
        Self::ZoneLookup(msg.into())
    }

    /// Create a record read error
    pub fn record_read(msg: impl Into<String>) -> Self {
        Self::RecordRead(msg.into())
    }

    /// Create a commit rejection error carrying the rejected batch
    pub fn commit_rejected(message: impl Into<String>, batch: impl Into<String>) -> Self {
        Self::CommitRejected {
            message: message.into(),
            batch: batch.into(),
        }
    }

    /// Create a change status error
    pub fn change_status(msg: impl Into<String>) -> Self {
        Self::ChangeStatus(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Whether this error is a provider read or write failure.
    ///
    /// These are the only failures that end a run with a nonzero status.
    pub fn is_fatal_provider(&self) -> bool {
        matches!(
            self,
            Self::ZoneLookup(_) | Self::RecordRead(_) | Self::CommitRejected { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_failures_are_fatal() {
        assert!(Error::zone_lookup("NoSuchHostedZone").is_fatal_provider());
        assert!(Error::record_read("throttled").is_fatal_provider());
        assert!(Error::commit_rejected("InvalidChangeBatch", "[]").is_fatal_provider());
    }

    #[test]
    fn other_failures_are_not_provider_fatal() {
        assert!(!Error::config("empty zone").is_fatal_provider());
        assert!(!Error::change_status("timeout").is_fatal_provider());
        assert!(!Error::ip_source("unreachable").is_fatal_provider());
    }

    #[test]
    fn commit_rejection_message_includes_batch() {
        let err = Error::commit_rejected("conflict", r#"[{"action":"CREATE"}]"#);
        let msg = err.to_string();
        assert!(msg.contains("conflict"));
        assert!(msg.contains("CREATE"));
    }
}
