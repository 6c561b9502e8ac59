use super::RunError;
use super::processor::SongOutcome;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// Tally of one mode pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub pass: &'static str,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub attempts: usize,
    pub recommended: usize,
    pub proposed: usize,
    pub accepted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunReport {
    pub fn start(pass: &'static str) -> Self {
        Self {
            pass,
            started_at: Utc::now(),
            finished_at: None,
            attempts: 0,
            recommended: 0,
            proposed: 0,
            accepted: 0,
            skipped: 0,
            failed: 0,
        }
    }

    pub fn record(&mut self, outcome: &SongOutcome) {
        self.attempts += 1;
        match outcome {
            SongOutcome::Skipped(_) => self.skipped += 1,
            SongOutcome::Recommended { accepted, .. } => {
                self.recommended += 1;
                self.accepted += usize::from(*accepted);
            }
            SongOutcome::Proposed { accepted, .. } => {
                self.proposed += 1;
                self.accepted += usize::from(*accepted);
            }
            SongOutcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Stamp the finish time and log the tally.
    pub fn finish(mut self) -> Self {
        let finished_at = Utc::now();
        self.finished_at = Some(finished_at);
        info!(
            pass = self.pass,
            attempts = self.attempts,
            recommended = self.recommended,
            proposed = self.proposed,
            accepted = self.accepted,
            skipped = self.skipped,
            failed = self.failed,
            elapsed_ms = (finished_at - self.started_at).num_milliseconds(),
            "Pass finished"
        );
        self
    }
}

/// Result of a whole run: the reports of every pass that completed, plus
/// the error that aborted a pass, if any.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<RunReport>,
    pub failure: Option<RunError>,
}

impl RunSummary {
    pub fn completed(reports: Vec<RunReport>) -> Self {
        Self {
            reports,
            failure: None,
        }
    }

    pub fn aborted(reports: Vec<RunReport>, failure: RunError) -> Self {
        Self {
            reports,
            failure: Some(failure),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Drop the partial reports of a failed run.
    pub fn into_result(self) -> Result<Vec<RunReport>, RunError> {
        match self.failure {
            None => Ok(self.reports),
            Some(e) => Err(e),
        }
    }
}
