//! Desired per-family state of a run
//!
//! The caller describes each family with a [`DesiredSpec`] (literal,
//! disabled, or auto-detect). Auto-detect specs are turned into concrete
//! [`DesiredAddress`] values by asking an [`IpSource`] once, before
//! reconciliation starts; the resulting [`DesiredState`] does not change for
//! the rest of the run.

use crate::error::{Error, Result};
use crate::record::Family;
use crate::traits::IpSource;
use std::net::IpAddr;
use tracing::{debug, info, warn};

/// Tokens accepted to switch a family off
const DISABLE_TOKENS: &[&str] = &["disable", "disabled"];

/// Caller-supplied description of one family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesiredSpec {
    /// Use this address
    Literal(IpAddr),
    /// Leave the family alone
    Disabled,
    /// Ask the family's IP source
    AutoDetect,
}

impl DesiredSpec {
    /// Parse an optional command-line value for `family`.
    ///
    /// Missing or blank means auto-detect; `disable`/`disabled` switches the
    /// family off; anything else must be an address of that family.
    pub fn parse(family: Family, value: Option<&str>) -> Result<Self> {
        let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(DesiredSpec::AutoDetect);
        };

        if DISABLE_TOKENS.iter().any(|t| raw.eq_ignore_ascii_case(t)) {
            return Ok(DesiredSpec::Disabled);
        }

        let ip: IpAddr = raw
            .parse()
            .map_err(|_| Error::invalid_input(format!("'{}' is not an {} address", raw, family)))?;

        if !family.matches(&ip) {
            return Err(Error::invalid_input(format!(
                "'{}' is not an {} address",
                raw, family
            )));
        }

        Ok(DesiredSpec::Literal(ip))
    }
}

/// Concrete desired value of one family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesiredAddress {
    /// Publish exactly this address
    Literal(IpAddr),
    /// Skip the family: no lookups, no changes
    Disabled,
    /// No address is wanted; any published value is removed
    Absent,
}

impl DesiredAddress {
    pub fn literal(self) -> Option<IpAddr> {
        match self {
            DesiredAddress::Literal(ip) => Some(ip),
            _ => None,
        }
    }
}

/// Desired state of both families for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesiredState {
    pub ipv4: DesiredAddress,
    pub ipv6: DesiredAddress,
}

impl DesiredState {
    pub fn new(ipv4: DesiredAddress, ipv6: DesiredAddress) -> Self {
        Self { ipv4, ipv6 }
    }

    /// Desired value of `family`
    pub fn get(&self, family: Family) -> DesiredAddress {
        match family {
            Family::V4 => self.ipv4,
            Family::V6 => self.ipv6,
        }
    }

    /// Resolve both specs, consulting each source only for auto-detect
    pub async fn detect(
        ipv4: DesiredSpec,
        ipv6: DesiredSpec,
        ipv4_source: &dyn IpSource,
        ipv6_source: &dyn IpSource,
    ) -> Result<Self> {
        let ipv4 = detect_family(Family::V4, ipv4, ipv4_source).await?;
        let ipv6 = detect_family(Family::V6, ipv6, ipv6_source).await?;
        debug!("Desired state: IPv4={:?}, IPv6={:?}", ipv4, ipv6);
        Ok(Self { ipv4, ipv6 })
    }
}

async fn detect_family(
    family: Family,
    spec: DesiredSpec,
    source: &dyn IpSource,
) -> Result<DesiredAddress> {
    match spec {
        DesiredSpec::Literal(ip) => Ok(DesiredAddress::Literal(ip)),
        DesiredSpec::Disabled => Ok(DesiredAddress::Disabled),
        DesiredSpec::AutoDetect => match source.current().await {
            Ok(ip) if family.matches(&ip) => {
                info!("Detected {} address via {}: {}", family, source.source_name(), ip);
                Ok(DesiredAddress::Literal(ip))
            }
            Ok(ip) => Err(Error::ip_source(format!(
                "{} returned {} while detecting {}",
                source.source_name(),
                ip,
                family
            ))),
            Err(Error::NotFound(reason)) => {
                warn!("No {} address found via {}: {}", family, source.source_name(), reason);
                Ok(DesiredAddress::Absent)
            }
            Err(e) => Err(e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedSource {
        answer: std::result::Result<IpAddr, &'static str>,
        calls: AtomicUsize,
    }

    impl FixedSource {
        fn ok(ip: &str) -> Self {
            Self {
                answer: Ok(ip.parse().unwrap()),
                calls: AtomicUsize::new(0),
            }
        }

        fn not_found() -> Self {
            Self {
                answer: Err("not-found"),
                calls: AtomicUsize::new(0),
            }
        }

        fn broken() -> Self {
            Self {
                answer: Err("broken"),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl IpSource for FixedSource {
        async fn current(&self) -> Result<IpAddr> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.answer {
                Ok(ip) => Ok(ip),
                Err("not-found") => Err(Error::not_found("no global address")),
                Err(other) => Err(Error::ip_source(other)),
            }
        }

        fn source_name(&self) -> &'static str {
            "fixed"
        }
    }

    #[test]
    fn parse_missing_or_blank_is_auto_detect() {
        assert_eq!(DesiredSpec::parse(Family::V4, None).unwrap(), DesiredSpec::AutoDetect);
        assert_eq!(DesiredSpec::parse(Family::V6, Some("  ")).unwrap(), DesiredSpec::AutoDetect);
    }

    #[test]
    fn parse_disable_tokens() {
        assert_eq!(DesiredSpec::parse(Family::V4, Some("disable")).unwrap(), DesiredSpec::Disabled);
        assert_eq!(DesiredSpec::parse(Family::V6, Some("Disabled")).unwrap(), DesiredSpec::Disabled);
    }

    #[test]
    fn parse_rejects_wrong_family_and_garbage() {
        assert!(DesiredSpec::parse(Family::V4, Some("2001:db8::1")).is_err());
        assert!(DesiredSpec::parse(Family::V6, Some("203.0.113.9")).is_err());
        assert!(DesiredSpec::parse(Family::V4, Some("home")).is_err());
    }

    #[tokio::test]
    async fn sources_are_only_asked_for_auto_detect() {
        let v4 = FixedSource::ok("198.51.100.7");
        let v6 = FixedSource::ok("2001:db8::7");
        let state = DesiredState::detect(
            DesiredSpec::Literal("203.0.113.9".parse().unwrap()),
            DesiredSpec::Disabled,
            &v4,
            &v6,
        )
        .await
        .unwrap();

        assert_eq!(state.ipv4, DesiredAddress::Literal("203.0.113.9".parse().unwrap()));
        assert_eq!(state.ipv6, DesiredAddress::Disabled);
        assert_eq!(v4.calls.load(Ordering::SeqCst), 0);
        assert_eq!(v6.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn not_found_becomes_absent() {
        let v4 = FixedSource::ok("198.51.100.7");
        let v6 = FixedSource::not_found();
        let state = DesiredState::detect(DesiredSpec::AutoDetect, DesiredSpec::AutoDetect, &v4, &v6)
            .await
            .unwrap();

        assert_eq!(state.ipv4, DesiredAddress::Literal("198.51.100.7".parse().unwrap()));
        assert_eq!(state.ipv6, DesiredAddress::Absent);
    }

    #[tokio::test]
    async fn source_failure_is_an_error() {
        let v4 = FixedSource::broken();
        let v6 = FixedSource::not_found();
        let result =
            DesiredState::detect(DesiredSpec::AutoDetect, DesiredSpec::Disabled, &v4, &v6).await;
        assert!(matches!(result, Err(Error::IpSource(_))));
    }

    #[tokio::test]
    async fn wrong_family_from_source_is_an_error() {
        let v4 = FixedSource::ok("2001:db8::1");
        let v6 = FixedSource::not_found();
        let result =
            DesiredState::detect(DesiredSpec::AutoDetect, DesiredSpec::Disabled, &v4, &v6).await;
        assert!(result.is_err());
    }
}
