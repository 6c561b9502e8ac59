use crate::app::config::RunSettings;
use crate::catalog::{ActionResult, Proposal, RemoteActionClient, SongQuery};
use crate::domain::SongRecord;
use crate::reliability::RetryPolicy;
use std::fmt;
use tracing::{debug, info, warn};

/// Why a song was skipped without any remote action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingTitleOrSinger,
    ProposeDisabled,
    NoCatalogCode,
    AlreadyRequested,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::MissingTitleOrSinger => "missing_title_or_singer",
            SkipReason::ProposeDisabled => "propose_disabled",
            SkipReason::NoCatalogCode => "no_catalog_code",
            SkipReason::AlreadyRequested => "already_requested",
        }
    }
}

/// Step at which a song's processing was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Connect,
    Recommend,
    Propose,
}

impl FailureStage {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureStage::Connect => "connect",
            FailureStage::Recommend => "recommend",
            FailureStage::Propose => "propose",
        }
    }
}

/// What happened to one song on one egress path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SongOutcome {
    Skipped(SkipReason),
    Recommended { index: u64, accepted: bool },
    Proposed { code: String, accepted: bool },
    Failed { stage: FailureStage },
}

impl fmt::Display for SongOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SongOutcome::Skipped(reason) => write!(f, "skipped ({})", reason.as_str()),
            SongOutcome::Recommended { index, accepted } => {
                write!(f, "recommended idx={index} accepted={accepted}")
            }
            SongOutcome::Proposed { code, accepted } => {
                write!(f, "proposed dt_code={code} accepted={accepted}")
            }
            SongOutcome::Failed { stage } => write!(f, "failed at {}", stage.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOptions {
    pub allow_propose: bool,
    pub retry: RetryPolicy,
}

impl ProcessOptions {
    pub fn from_settings(settings: &RunSettings) -> Self {
        Self {
            allow_propose: settings.allow_propose_if_not_found,
            retry: settings.retry_policy(),
        }
    }
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            allow_propose: true,
            retry: RetryPolicy::default(),
        }
    }
}

/// Recommend the song if its catalog index is known or can be found,
/// otherwise propose it unless the site reports it as already requested. Never fails: every problem is logged and reported
/// through the returned outcome.
pub async fn process_song<C: RemoteActionClient>(
    client: &C,
    song: &SongRecord,
    options: &ProcessOptions,
) -> SongOutcome {
    let Some((title, singer)) = song.title_and_singer() else {
        warn!(?song, "Song record lacks title or singer, skipping");
        return SongOutcome::Skipped(SkipReason::MissingTitleOrSinger);
    };
    let egress = client.egress();
    let catalog_code = song.resolve_catalog_code();
    let query = SongQuery::new(singer, title, catalog_code.as_deref());

    let index = match song.given_index() {
        Some(index) => Some(index),
        None => search_index(client, query, options.retry).await,
    };

    if let Some(index) = index {
        return match client.recommend(index, query).await {
            Ok(result) => {
                let signal = result.recommend_signal();
                let accepted = signal.is_some();
                log_action("recommend", title, singer, &result, signal.map(|s| s.as_str()));
                info!(title, singer, index, %egress, accepted, "Recommend finished");
                SongOutcome::Recommended { index, accepted }
            }
            Err(e) => {
                warn!(title, singer, index, %egress, error = %e, "Recommend failed");
                SongOutcome::Failed {
                    stage: FailureStage::Recommend,
                }
            }
        };
    }

    if !options.allow_propose {
        info!(title, singer, "Not found in catalog and proposing is disabled, skipping");
        return SongOutcome::Skipped(SkipReason::ProposeDisabled);
    }

    let Some(code) = catalog_code.as_deref() else {
        warn!(
            title,
            singer,
            genre = song.genre.as_deref().unwrap_or(""),
            "Not found in catalog and no catalog code resolvable, cannot propose"
        );
        return SongOutcome::Skipped(SkipReason::NoCatalogCode);
    };

    match client.already_requested(query).await {
        Ok(true) => {
            info!(title, singer, dt_code = code, %egress, "Song already requested, not proposing");
            return SongOutcome::Skipped(SkipReason::AlreadyRequested);
        }
        Ok(false) => {}
        Err(e) => {
            warn!(title, singer, error = %e, "Request status check failed, proposing anyway");
        }
    }

    let proposal = Proposal {
        catalog_code: code,
        singer,
        title,
        proposer_name: song.proposer_name(),
        comment: song.proposal_comment(),
    };

    match client.propose(proposal).await {
        Ok(result) => {
            let signal = result.propose_signal();
            let accepted = signal.is_some();
            log_action("propose", title, singer, &result, signal.map(|s| s.as_str()));
            info!(title, singer, dt_code = code, %egress, accepted, "Propose finished");
            SongOutcome::Proposed {
                code: code.to_string(),
                accepted,
            }
        }
        Err(e) => {
            warn!(title, singer, dt_code = code, %egress, error = %e, "Propose failed");
            SongOutcome::Failed {
                stage: FailureStage::Propose,
            }
        }
    }
}

/// Search with the retry bound. Exhausted retries count as "not found".
async fn search_index<C: RemoteActionClient>(
    client: &C,
    query: SongQuery<'_>,
    retry: RetryPolicy,
) -> Option<u64> {
    let SongQuery { singer, title, .. } = query;
    let found = retry
        .run("search", |attempt| {
            debug!(title, singer, attempt, egress = %client.egress(), "Searching catalog");
            client.search_index(query, true)
        })
        .await;

    match found {
        Ok(index) => {
            debug!(title, singer, ?index, "Search finished");
            index
        }
        Err(e) => {
            warn!(
                title,
                singer,
                attempts = retry.max_attempts(),
                error = %e,
                "Search failed on every attempt, treating as not found"
            );
            None
        }
    }
}

fn log_action(
    operation: &str,
    title: &str,
    singer: &str,
    result: &ActionResult,
    signal: Option<&'static str>,
) {
    match signal {
        Some(branch) => debug!(operation, title, singer, ?result, branch, "Success signal"),
        None => warn!(operation, title, singer, ?result, "Response needs checking"),
    }
}
