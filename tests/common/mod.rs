#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tj_request_rotator::catalog::{
    ActionResult, CatalogConnector, ClientError, Proposal, RemoteActionClient, SongQuery,
};
use tj_request_rotator::domain::{EgressPath, ProxyType, SongRecord};
use tj_request_rotator::egress::{
    PlatformFamily, PortProbe, ProxyCandidate, ProxyListError, ProxyListProvider,
    RelayServiceController,
};

/// Everything the fakes observed, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect(String),
    Search { singer: String, title: String },
    Recommend(u64),
    RequestStatus { code: Option<String> },
    Propose {
        code: String,
        singer: String,
        title: String,
        proposer: String,
        comment: String,
    },
    Release(String),
    FetchProxies(ProxyType),
    ServiceStart(String),
    ServiceRestart(String),
}

#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|c| predicate(c)).count()
    }

    pub fn connects(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Connect(egress) => Some(egress),
                _ => None,
            })
            .collect()
    }

    pub fn recommends(&self) -> Vec<u64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Recommend(index) => Some(index),
                _ => None,
            })
            .collect()
    }
}

/// Scripted catalog responses. `None` for an action means a transport error.
#[derive(Debug, Clone)]
pub struct Behavior {
    pub search_failures: u32,
    pub search_result: Option<u64>,
    pub recommend: Option<ActionResult>,
    pub already_requested: Option<bool>,
    pub propose: Option<ActionResult>,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            search_failures: 0,
            search_result: None,
            recommend: Some(ActionResult::Structured {
                result: "success".to_string(),
                code: Some("000".to_string()),
            }),
            already_requested: Some(false),
            propose: Some(ActionResult::StatusOnly { status: 201 }),
        }
    }
}

pub struct FakeClient {
    egress: EgressPath,
    log: CallLog,
    behavior: Behavior,
    searches: AtomicU32,
}

impl FakeClient {
    pub fn new(egress: EgressPath, log: CallLog, behavior: Behavior) -> Self {
        Self {
            egress,
            log,
            behavior,
            searches: AtomicU32::new(0),
        }
    }
}

fn transport_error(operation: &'static str) -> ClientError {
    ClientError::HttpError {
        operation,
        status: 503,
    }
}

impl RemoteActionClient for FakeClient {
    async fn search_index(
        &self,
        query: SongQuery<'_>,
        _exact: bool,
    ) -> Result<Option<u64>, ClientError> {
        self.log.push(Call::Search {
            singer: query.singer.to_string(),
            title: query.title.to_string(),
        });
        let n = self.searches.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= self.behavior.search_failures {
            return Err(transport_error("search"));
        }
        Ok(self.behavior.search_result)
    }

    async fn recommend(&self, index: u64, _query: SongQuery<'_>) -> Result<ActionResult, ClientError> {
        self.log.push(Call::Recommend(index));
        self.behavior
            .recommend
            .clone()
            .ok_or_else(|| transport_error("recommend"))
    }

    async fn already_requested(&self, query: SongQuery<'_>) -> Result<bool, ClientError> {
        self.log.push(Call::RequestStatus {
            code: query.catalog_code.map(str::to_string),
        });
        self.behavior
            .already_requested
            .ok_or_else(|| transport_error("request_status"))
    }

    async fn propose(&self, proposal: Proposal<'_>) -> Result<ActionResult, ClientError> {
        self.log.push(Call::Propose {
            code: proposal.catalog_code.to_string(),
            singer: proposal.singer.to_string(),
            title: proposal.title.to_string(),
            proposer: proposal.proposer_name.to_string(),
            comment: proposal.comment.to_string(),
        });
        self.behavior
            .propose
            .clone()
            .ok_or_else(|| transport_error("propose"))
    }

    async fn release(self) {
        self.log.push(Call::Release(self.egress.to_string()));
    }

    fn egress(&self) -> &EgressPath {
        &self.egress
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeConnector {
    pub log: CallLog,
    pub behavior: Behavior,
    pub fail_connect: bool,
}

impl FakeConnector {
    pub fn new(log: CallLog, behavior: Behavior) -> Self {
        Self {
            log,
            behavior,
            fail_connect: false,
        }
    }
}

impl CatalogConnector for FakeConnector {
    type Client = FakeClient;

    fn connect(&self, egress: &EgressPath) -> Result<FakeClient, ClientError> {
        self.log.push(Call::Connect(egress.to_string()));
        if self.fail_connect {
            return Err(ClientError::InvalidConfiguration("refused".to_string()));
        }
        Ok(FakeClient::new(
            egress.clone(),
            self.log.clone(),
            self.behavior.clone(),
        ))
    }
}

/// Proxy list that returns a fixed candidate set, or fails when `None`.
#[derive(Debug, Clone)]
pub struct FakeProxyList {
    pub log: CallLog,
    pub candidates: Option<Vec<ProxyCandidate>>,
}

impl FakeProxyList {
    pub fn with_endpoints(log: CallLog, endpoints: &[&str]) -> Self {
        let candidates = endpoints
            .iter()
            .enumerate()
            .map(|(i, e)| ProxyCandidate::new(*e, 100.0 - i as f64))
            .collect();
        Self {
            log,
            candidates: Some(candidates),
        }
    }

    pub fn failing(log: CallLog) -> Self {
        Self {
            log,
            candidates: None,
        }
    }
}

impl ProxyListProvider for FakeProxyList {
    async fn fetch_candidates(
        &self,
        proxy_type: ProxyType,
    ) -> Result<Vec<ProxyCandidate>, ProxyListError> {
        self.log.push(Call::FetchProxies(proxy_type));
        self.candidates
            .clone()
            .ok_or(ProxyListError::HttpError { status: 502 })
    }
}

#[derive(Debug, Clone)]
pub struct FakeRelay {
    pub log: CallLog,
    pub platform: PlatformFamily,
    pub succeed: bool,
}

impl FakeRelay {
    pub fn linux(log: CallLog) -> Self {
        Self {
            log,
            platform: PlatformFamily::Linux,
            succeed: true,
        }
    }
}

impl RelayServiceController for FakeRelay {
    fn platform(&self) -> PlatformFamily {
        self.platform
    }

    fn start(&self, service: &str) -> bool {
        self.log.push(Call::ServiceStart(service.to_string()));
        self.succeed
    }

    fn restart(&self, service: &str) -> bool {
        self.log.push(Call::ServiceRestart(service.to_string()));
        self.succeed
    }
}

/// Port probe with a fixed answer that counts how often it was asked.
#[derive(Debug, Clone, Default)]
pub struct FakeProbe {
    pub open: bool,
    pub checks: Arc<AtomicU32>,
}

impl FakeProbe {
    pub fn open() -> Self {
        Self {
            open: true,
            checks: Arc::default(),
        }
    }

    pub fn closed() -> Self {
        Self {
            open: false,
            checks: Arc::default(),
        }
    }

    pub fn check_count(&self) -> u32 {
        self.checks.load(Ordering::SeqCst)
    }
}

impl PortProbe for FakeProbe {
    async fn is_listening(&self, _host: &str, _port: u16, _timeout: Duration) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.open
    }
}

pub fn song_with_index(title: &str, singer: &str, idx: u64) -> SongRecord {
    SongRecord {
        idx: Some(idx),
        ..SongRecord::new(title, singer)
    }
}

pub fn song_with_genre(title: &str, singer: &str, genre: &str) -> SongRecord {
    SongRecord {
        genre: Some(genre.to_string()),
        ..SongRecord::new(title, singer)
    }
}
