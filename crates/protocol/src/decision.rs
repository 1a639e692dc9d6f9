use serde::Serialize;
use std::fmt;

use crate::Run;

/// Why the engine reached its verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Run metadata could not be fetched; fail open.
    FetchFailed,
    /// The trigger event is listed in `do_not_skip`.
    DoNotSkip,
    /// A completed, successful run checked the same tree.
    SkipAfterSuccessfulDuplicate,
    /// A run on the same tree is still in flight.
    ConcurrentSkipping,
    /// Another trigger (push vs pull_request) started a run on the same tree.
    ConcurrentTrigger,
    /// Every commit since a successful run is path-ignored or path-skipped.
    Paths,
    NoTransferableRun,
}

impl SkipReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FetchFailed => "fetch_failed",
            Self::DoNotSkip => "do_not_skip",
            Self::SkipAfterSuccessfulDuplicate => "skip_after_successful_duplicate",
            Self::ConcurrentSkipping => "concurrent_skipping",
            Self::ConcurrentTrigger => "concurrent_trigger",
            Self::Paths => "paths",
            Self::NoTransferableRun => "no_transferable_run",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compact reference to the run that made the current one redundant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunRef {
    pub id: u64,
    pub html_url: String,
    pub tree_hash: String,
    pub commit_hash: String,
    pub branch: Option<String>,
    pub status: &'static str,
    pub conclusion: &'static str,
}

impl From<&Run> for RunRef {
    fn from(run: &Run) -> Self {
        Self {
            id: run.run_id,
            html_url: run.html_url.clone(),
            tree_hash: run.tree_hash.clone(),
            commit_hash: run.commit_hash.clone(),
            branch: run.branch.clone(),
            status: run.status.as_str(),
            conclusion: run.conclusion.as_str(),
        }
    }
}

/// Terminal verdict. Once produced no further rule is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub should_skip: bool,
    pub reason: SkipReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped_by: Option<RunRef>,
}

impl Decision {
    pub fn skip(reason: SkipReason, run: &Run) -> Self {
        Self {
            should_skip: true,
            reason,
            skipped_by: Some(RunRef::from(run)),
        }
    }

    pub fn proceed(reason: SkipReason) -> Self {
        Self {
            should_skip: false,
            reason,
            skipped_by: None,
        }
    }
}
