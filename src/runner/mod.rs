//! Song processing and the egress rotation loops around it.

pub mod orchestrator;
pub mod processor;
pub mod report;

pub use orchestrator::{Orchestrator, select_candidates};
pub use processor::{FailureStage, ProcessOptions, SkipReason, SongOutcome, process_song};
pub use report::{RunReport, RunSummary};

use crate::domain::ProxyType;
use crate::egress::ProxyListError;
use thiserror::Error;

/// Conditions that abort a mode pass.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Proxy list fetch failed: {0}")]
    ProxyFetch(#[from] ProxyListError),
    #[error("No {proxy_type} proxy candidates available")]
    NoCandidates { proxy_type: ProxyType },
}
