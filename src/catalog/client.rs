use super::outcome::ActionResult;
use super::search::{has_request_marker, parse_request_board, select_index};
use super::{CatalogConnector, Proposal, RemoteActionClient, SongQuery};
use crate::app::config::CatalogSettings;
use crate::domain::EgressPath;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use reqwest::{Client, ClientBuilder, Proxy, Response};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Invalid proxy '{url}': {reason}")]
    InvalidProxy { url: String, reason: String },
    #[error("HTTP error during {operation}: {status}")]
    HttpError { operation: &'static str, status: u16 },
    #[error("Parse error during {operation}: {message}")]
    ParseError {
        operation: &'static str,
        message: String,
    },
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

/// Resolved endpoint URLs for the catalog pages.
#[derive(Debug, Clone)]
pub struct CatalogEndpoints {
    pub search: Url,
    pub recommend: Url,
    pub request_status: Url,
    pub propose: Url,
}

/// Paging fields the recommend page expects alongside `idx`.
const RECOMMEND_PAGING: [(&str, &str); 4] = [
    ("intTotalCount", "0"),
    ("intPageCount", "0"),
    ("intPage", "1"),
    ("mode", "4"),
];

impl CatalogEndpoints {
    pub fn from_settings(settings: &CatalogSettings) -> Result<Self, ClientError> {
        let base = Url::parse(&settings.base_url).map_err(|e| {
            ClientError::InvalidConfiguration(format!(
                "Invalid catalog base URL '{}': {e}",
                settings.base_url
            ))
        })?;
        let join = |path: &str| {
            base.join(path).map_err(|e| {
                ClientError::InvalidConfiguration(format!("Invalid catalog path '{path}': {e}"))
            })
        };
        Ok(Self {
            search: join(&settings.search_path)?,
            recommend: join(&settings.recommend_path)?,
            request_status: join(&settings.request_status_path)?,
            propose: join(&settings.propose_path)?,
        })
    }
}

/// Builds one `HttpCatalogClient` per unit of work.
#[derive(Debug, Clone)]
pub struct HttpCatalogConnector {
    endpoints: CatalogEndpoints,
    user_agent: String,
    timeout: Duration,
}

impl HttpCatalogConnector {
    pub fn new(settings: &CatalogSettings, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            endpoints: CatalogEndpoints::from_settings(settings)?,
            user_agent: settings.user_agent.clone(),
            timeout,
        })
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("ko-KR,ko;q=0.9"));
        headers
    }
}

impl CatalogConnector for HttpCatalogConnector {
    type Client = HttpCatalogClient;

    fn connect(&self, egress: &EgressPath) -> Result<HttpCatalogClient, ClientError> {
        let mut builder = ClientBuilder::new()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .default_headers(Self::default_headers());

        // Environment proxies must never leak into the chosen route.
        builder = match egress.proxy_url() {
            Some(url) => {
                let proxy = Proxy::all(&url).map_err(|e| ClientError::InvalidProxy {
                    url: url.clone(),
                    reason: e.to_string(),
                })?;
                builder.no_proxy().proxy(proxy)
            }
            None => builder.no_proxy(),
        };

        let client = builder.build().map_err(|e| {
            ClientError::InvalidConfiguration(format!("Failed to build HTTP client: {e}"))
        })?;

        debug!(egress = %egress, "Catalog client bound");

        Ok(HttpCatalogClient {
            client,
            endpoints: self.endpoints.clone(),
            egress: egress.clone(),
        })
    }
}

/// reqwest-backed catalog client bound to a single egress path.
#[derive(Debug)]
pub struct HttpCatalogClient {
    client: Client,
    endpoints: CatalogEndpoints,
    egress: EgressPath,
}

impl HttpCatalogClient {
    async fn classify(operation: &'static str, response: Response) -> Result<ActionResult, ClientError> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        let result = ActionResult::from_response(status, &body);
        debug!(operation, status, ?result, "Catalog action response");
        Ok(result)
    }

    /// GET a catalog page and return its body, failing on non-2xx.
    async fn fetch_page(&self, operation: &'static str, url: Url) -> Result<String, ClientError> {
        let start = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::HttpError {
                operation,
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!(
            operation,
            bytes = body.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Catalog page fetched"
        );
        Ok(body)
    }

    fn page_url(base: &Url, query: &SongQuery<'_>) -> Url {
        let mut url = base.clone();
        url.query_pairs_mut().extend_pairs(query.query_pairs());
        url
    }
}

impl RemoteActionClient for HttpCatalogClient {
    async fn search_index(
        &self,
        query: SongQuery<'_>,
        exact: bool,
    ) -> Result<Option<u64>, ClientError> {
        let url = Self::page_url(&self.endpoints.search, &query);
        let body = self.fetch_page("search", url).await?;
        let rows = parse_request_board(&body).map_err(|message| ClientError::ParseError {
            operation: "search",
            message,
        })?;

        debug!(rows = rows.len(), "Catalog search rows");
        Ok(select_index(&rows, query.singer, query.title, exact))
    }

    async fn recommend(&self, index: u64, query: SongQuery<'_>) -> Result<ActionResult, ClientError> {
        let index = index.to_string();
        let mut url = Self::page_url(&self.endpoints.recommend, &query);
        url.query_pairs_mut()
            .extend_pairs(RECOMMEND_PAGING)
            .append_pair("idx", &index);

        let response = self.client.get(url).send().await?;
        Self::classify("recommend", response).await
    }

    async fn already_requested(&self, query: SongQuery<'_>) -> Result<bool, ClientError> {
        let url = Self::page_url(&self.endpoints.request_status, &query);
        let body = self.fetch_page("request_status", url).await?;
        has_request_marker(&body).map_err(|message| ClientError::ParseError {
            operation: "request_status",
            message,
        })
    }

    async fn propose(&self, proposal: Proposal<'_>) -> Result<ActionResult, ClientError> {
        let response = self
            .client
            .post(self.endpoints.propose.clone())
            .form(&[
                ("dt_code", proposal.catalog_code),
                ("song", proposal.singer),
                ("title", proposal.title),
                ("po_name", proposal.proposer_name),
                ("po_content", proposal.comment),
            ])
            .send()
            .await?;
        Self::classify("propose", response).await
    }

    async fn release(self) {
        debug!(egress = %self.egress, "Catalog client released");
    }

    fn egress(&self) -> &EgressPath {
        &self.egress
    }
}
