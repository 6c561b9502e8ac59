use crate::domain::ProxyType;
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

#[derive(Error, Debug)]
pub enum ProxyListError {
    #[error("Invalid proxy source URL: {0}")]
    InvalidSource(String),
    #[error("Proxy list request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Proxy list HTTP error: {status}")]
    HttpError { status: u16 },
    #[error("Proxy list parse error: {0}")]
    ParseError(String),
}

/// One proxy offered by the list, with the provider's quality score.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyCandidate {
    /// `host:port`, possibly prefixed with a scheme.
    pub endpoint: String,
    pub quality: f64,
}

impl ProxyCandidate {
    pub fn new(endpoint: impl Into<String>, quality: f64) -> Self {
        Self {
            endpoint: endpoint.into(),
            quality,
        }
    }
}

/// Supplies ranked proxy candidates of one transport type.
pub trait ProxyListProvider {
    fn fetch_candidates(
        &self,
        proxy_type: ProxyType,
    ) -> impl Future<Output = Result<Vec<ProxyCandidate>, ProxyListError>> + Send;
}

#[derive(Debug, Deserialize)]
struct ProxyScrapeBody {
    #[serde(default)]
    proxies: Vec<ProxyScrapeEntry>,
}

#[derive(Debug, Deserialize)]
struct ProxyScrapeEntry {
    ip: String,
    port: u16,
    #[serde(default = "default_alive")]
    alive: bool,
    #[serde(default)]
    uptime: f64,
}

fn default_alive() -> bool {
    true
}

/// Parse a proxy list body into candidates ranked by quality, best first.
///
/// Accepts the ProxyScrape v4 JSON document or plain `ip:port` lines.
pub fn parse_candidates(body: &str) -> Result<Vec<ProxyCandidate>, ProxyListError> {
    let trimmed = body.trim_start();
    let mut candidates = if trimmed.starts_with('{') {
        let parsed: ProxyScrapeBody = serde_json::from_str(trimmed)
            .map_err(|e| ProxyListError::ParseError(e.to_string()))?;
        parsed
            .proxies
            .into_iter()
            .filter(|entry| entry.alive)
            .map(|entry| ProxyCandidate::new(format!("{}:{}", entry.ip, entry.port), entry.uptime))
            .collect::<Vec<_>>()
    } else {
        body.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#') && line.contains(':'))
            .map(|line| ProxyCandidate::new(line, 0.0))
            .collect()
    };

    // Stable sort keeps provider order among equal scores.
    candidates.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    Ok(candidates)
}

/// Public proxy list served by the ProxyScrape v4 API.
#[derive(Debug, Clone)]
pub struct ProxyScrapeProvider {
    client: Client,
    source: Url,
}

impl ProxyScrapeProvider {
    pub fn new(source_url: &str, timeout: Duration) -> Result<Self, ProxyListError> {
        let source = Url::parse(source_url)
            .map_err(|e| ProxyListError::InvalidSource(format!("'{source_url}': {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tj-request-rotator/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, source })
    }

    /// Source URL with the protocol filter for `proxy_type` applied.
    pub fn source_for(&self, proxy_type: ProxyType) -> Url {
        let protocol = match proxy_type {
            ProxyType::Socks => "socks5",
            ProxyType::Http => "http",
        };
        let mut url = self.source.clone();
        let retained: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != "protocol")
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(retained)
            .append_pair("protocol", protocol);
        url
    }
}

impl ProxyListProvider for ProxyScrapeProvider {
    async fn fetch_candidates(
        &self,
        proxy_type: ProxyType,
    ) -> Result<Vec<ProxyCandidate>, ProxyListError> {
        let url = self.source_for(proxy_type);
        debug!(%url, "Fetching proxy list");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProxyListError::HttpError {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let candidates = parse_candidates(&body)?;
        info!(
            proxy_type = %proxy_type,
            count = candidates.len(),
            "Proxy list fetched"
        );
        Ok(candidates)
    }
}
