//! # Batch retrieval
//!
//! Drives every identifier through resolve, find and verify on a bounded
//! pool of tasks and collects exactly one record per identifier.

mod orchestrator;
mod report;

pub use orchestrator::Orchestrator;
pub use report::BatchReport;

use crate::client::Pmid;
use std::fmt;
use std::path::PathBuf;

/// Lifecycle of one identifier.
///
/// `Pending -> Fetching -> {Succeeded | Retrying | Failed}`, and
/// `Retrying -> Fetching`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchState {
    Pending,
    Fetching,
    Retrying,
    Succeeded,
    Failed,
}

impl fmt::Display for FetchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Retrying => "retrying",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Terminal result for one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Saved(PathBuf),
    Failed(Pmid),
}

/// What happened to one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRecord {
    pub pmid: Pmid,
    pub outcome: Outcome,
    /// Pipeline attempts made, zero when skipped or never started
    pub attempts: u32,
    /// The reprint was already on disk
    pub skipped: bool,
    /// Last error for failed identifiers
    pub reason: Option<String>,
}

impl FetchRecord {
    #[must_use]
    pub const fn saved(pmid: Pmid, path: PathBuf, attempts: u32) -> Self {
        Self {
            pmid,
            outcome: Outcome::Saved(path),
            attempts,
            skipped: false,
            reason: None,
        }
    }

    #[must_use]
    pub const fn skipped(pmid: Pmid, path: PathBuf) -> Self {
        Self {
            pmid,
            outcome: Outcome::Saved(path),
            attempts: 0,
            skipped: true,
            reason: None,
        }
    }

    #[must_use]
    pub fn failed(pmid: Pmid, attempts: u32, reason: impl Into<String>) -> Self {
        Self {
            pmid,
            outcome: Outcome::Failed(pmid),
            attempts,
            skipped: false,
            reason: Some(reason.into()),
        }
    }

    #[must_use]
    pub const fn state(&self) -> FetchState {
        match self.outcome {
            Outcome::Saved(_) => FetchState::Succeeded,
            Outcome::Failed(_) => FetchState::Failed,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Saved(_))
    }
}
