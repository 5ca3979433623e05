// # HTTP IP Source
//
// This crate provides an HTTP-based IP source for the reconciler.
//
// ## Purpose
//
// Discovers the caller's public address as seen from outside: a single GET
// to a "what is my IP" service that answers with the bare address in the
// body. Used for IPv4, where the local interface address is usually a
// private one behind NAT.
//
// ## Behavior
//
// - One request per `current()` call, no caching and no retry
// - Body is trimmed and must parse as an address of the configured family

use r53ddns_core::traits::IpSource;
use r53ddns_core::{Error, Family, Result};

use std::net::IpAddr;
use std::time::Duration;

/// Default IPv4 discovery service
pub const DEFAULT_IPV4_URL: &str = "http://whatismyip.akamai.com";

/// Default HTTP timeout for discovery requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based public IP source
#[derive(Debug)]
pub struct HttpIpSource {
    /// URL to fetch the address from
    url: String,

    /// Family the answer must belong to
    family: Option<Family>,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL answering with a bare address (e.g. "http://whatismyip.akamai.com")
    /// - `family`: Family the answer must belong to (None = either)
    pub fn new(url: impl Into<String>, family: Option<Family>) -> Result<Self> {
        Self::with_timeout(url, family, DEFAULT_HTTP_TIMEOUT)
    }

    /// Create with a custom request timeout
    pub fn with_timeout(
        url: impl Into<String>,
        family: Option<Family>,
        timeout: Duration,
    ) -> Result<Self> {
        let url = url.into();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(Error::config(format!(
                "IP source URL must use HTTP or HTTPS scheme. Got: {}",
                url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url,
            family,
            client,
        })
    }

    /// IPv4 source against the default service
    pub fn ipv4_default() -> Result<Self> {
        Self::new(DEFAULT_IPV4_URL, Some(Family::V4))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the current address from the HTTP service
    async fn fetch_ip(&self) -> Result<IpAddr> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::ip_source(format!("Request to {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(Error::ip_source(format!(
                "HTTP error from {}: {}",
                self.url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::ip_source(format!("Failed to read response: {}", e)))?;

        parse_answer(&body, self.family)
    }
}

/// Parse a bare-address response body
fn parse_answer(body: &str, family: Option<Family>) -> Result<IpAddr> {
    let text = body.trim();

    let ip: IpAddr = text
        .parse()
        .map_err(|_| Error::ip_source(format!("Invalid IP address: {:?}", text)))?;

    if let Some(family) = family
        && !family.matches(&ip)
    {
        return Err(Error::ip_source(format!("Expected {}, got: {}", family, ip)));
    }

    Ok(ip)
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<IpAddr> {
        tracing::debug!("Fetching public address from {}", self.url);
        let ip = self.fetch_ip().await?;
        tracing::debug!("{} answered {}", self.url, ip);
        Ok(ip)
    }

    fn family(&self) -> Option<Family> {
        self.family
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}
