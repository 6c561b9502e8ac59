//! Remote action client for the karaoke catalog site.
//!
//! A client is bound to exactly one egress path for its whole life. The
//! orchestration loop never rebinds a client; it asks a `CatalogConnector`
//! for a fresh one and releases it when the unit of work is done.

pub mod client;
pub mod outcome;
pub mod search;

pub use client::{ClientError, HttpCatalogClient, HttpCatalogConnector};
pub use outcome::{ActionResult, SuccessSignal};
pub use search::{SearchRow, parse_request_board, select_index};

use crate::domain::EgressPath;
use std::future::Future;

/// Song identity sent along with every catalog page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SongQuery<'a> {
    pub singer: &'a str,
    pub title: &'a str,
    /// Catalog category code; omitted from requests when unknown.
    pub catalog_code: Option<&'a str>,
}

impl<'a> SongQuery<'a> {
    pub fn new(singer: &'a str, title: &'a str, catalog_code: Option<&'a str>) -> Self {
        Self {
            singer,
            title,
            catalog_code,
        }
    }

    /// Query pairs in the order the request pages expect them.
    pub fn query_pairs(&self) -> Vec<(&'static str, &'a str)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(code) = self.catalog_code {
            pairs.push(("dt_code", code));
        }
        pairs.push(("song", self.singer));
        pairs.push(("title", self.title));
        pairs
    }
}

/// Fields of a new-song proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proposal<'a> {
    pub catalog_code: &'a str,
    pub singer: &'a str,
    pub title: &'a str,
    pub proposer_name: &'a str,
    pub comment: &'a str,
}

/// The remote operations plus teardown.
pub trait RemoteActionClient: Send + Sync {
    /// Find the catalog index for a song. `Ok(None)` means no rows.
    fn search_index(
        &self,
        query: SongQuery<'_>,
        exact: bool,
    ) -> impl Future<Output = Result<Option<u64>, ClientError>> + Send;

    fn recommend(
        &self,
        index: u64,
        query: SongQuery<'_>,
    ) -> impl Future<Output = Result<ActionResult, ClientError>> + Send;

    /// Whether the site reports the song as already requested.
    fn already_requested(
        &self,
        query: SongQuery<'_>,
    ) -> impl Future<Output = Result<bool, ClientError>> + Send;

    fn propose(
        &self,
        proposal: Proposal<'_>,
    ) -> impl Future<Output = Result<ActionResult, ClientError>> + Send;

    /// Tear down the client. Consumes it, so it runs once per client.
    fn release(self) -> impl Future<Output = ()> + Send
    where
        Self: Sized;

    fn egress(&self) -> &EgressPath;
}

/// Creates clients bound to a given egress path.
pub trait CatalogConnector {
    type Client: RemoteActionClient;

    fn connect(&self, egress: &EgressPath) -> Result<Self::Client, ClientError>;
}
