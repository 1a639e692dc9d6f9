//! # Skipper Protocol
//!
//! Canonical in-memory model shared by the skipper crates:
//!
//! - **Runs** - one workflow execution, normalized from the raw GitHub record
//! - **Commits** - ancestry nodes walked by the history backtracer
//! - **Path filters** - glob include/exclude evaluation over changed files
//! - **Decisions** - the terminal skip/no-skip verdict and the run that justified it

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

mod decision;
pub mod path_filters;
mod run_model;

pub use decision::{Decision, RunRef, SkipReason};
pub use path_filters::{PathMatcher, PathVerdict, PatternError, PatternList};
pub use run_model::{
    parse_commit, parse_run, RawCommit, RawCommitDetail, RawCommitFile, RawCommitParent,
    RawCommitTree, RawHeadCommit, RawWorkflowRun, RawWorkflowRunList, RunModelError,
};

/// Event that triggered a workflow run.
///
/// Unknown event names are preserved verbatim so that `do_not_skip` can still name them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TriggerEvent {
    PullRequest,
    PullRequestTarget,
    Push,
    WorkflowDispatch,
    Schedule,
    MergeGroup,
    Release,
    WorkflowRun,
    RepositoryDispatch,
    Other(String),
}

impl TriggerEvent {
    pub fn as_str(&self) -> &str {
        match self {
            Self::PullRequest => "pull_request",
            Self::PullRequestTarget => "pull_request_target",
            Self::Push => "push",
            Self::WorkflowDispatch => "workflow_dispatch",
            Self::Schedule => "schedule",
            Self::MergeGroup => "merge_group",
            Self::Release => "release",
            Self::WorkflowRun => "workflow_run",
            Self::RepositoryDispatch => "repository_dispatch",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for TriggerEvent {
    fn from(raw: &str) -> Self {
        match raw {
            "pull_request" => Self::PullRequest,
            "pull_request_target" => Self::PullRequestTarget,
            "push" => Self::Push,
            "workflow_dispatch" => Self::WorkflowDispatch,
            "schedule" => Self::Schedule,
            "merge_group" => Self::MergeGroup,
            "release" => Self::Release,
            "workflow_run" => Self::WorkflowRun,
            "repository_dispatch" => Self::RepositoryDispatch,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for TriggerEvent {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<TriggerEvent> for String {
    fn from(event: TriggerEvent) -> Self {
        event.as_str().to_string()
    }
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    Waiting,
    Requested,
    Pending,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Waiting => "waiting",
            Self::Requested => "requested",
            Self::Pending => "pending",
            Self::Unknown => "unknown",
        }
    }
}

/// Outcome of a run. Only meaningful once the run is completed; `None` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    Success,
    Failure,
    Neutral,
    Cancelled,
    Skipped,
    TimedOut,
    ActionRequired,
    Stale,
    StartupFailure,
    #[default]
    None,
    #[serde(other)]
    Unknown,
}

impl Conclusion {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Neutral => "neutral",
            Self::Cancelled => "cancelled",
            Self::Skipped => "skipped",
            Self::TimedOut => "timed_out",
            Self::ActionRequired => "action_required",
            Self::Stale => "stale",
            Self::StartupFailure => "startup_failure",
            Self::None => "none",
            Self::Unknown => "unknown",
        }
    }
}

/// Snapshot of one workflow execution. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Run {
    pub event: TriggerEvent,
    pub tree_hash: String,
    pub commit_hash: String,
    pub status: RunStatus,
    pub conclusion: Conclusion,
    pub html_url: String,
    pub branch: Option<String>,
    pub run_id: u64,
    pub workflow_id: u64,
    pub created_at: DateTime<Utc>,
}

impl Run {
    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }

    pub fn is_successful(&self) -> bool {
        self.is_completed() && self.conclusion == Conclusion::Success
    }

    /// True unless both runs name a branch and the names differ.
    pub fn may_share_branch(&self, other: &Run) -> bool {
        match (self.branch.as_deref(), other.branch.as_deref()) {
            (Some(left), Some(right)) => left == right,
            _ => true,
        }
    }
}

/// Ancestry node visited by the backtracer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub sha: String,
    pub tree_hash: String,
    pub files: Vec<String>,
    /// Ordered; the first parent is the mainline.
    pub parents: Vec<String>,
    pub html_url: String,
}

impl Commit {
    pub fn first_parent(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }
}

/// Runs of the current workflow, as seen at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowRuns {
    /// Runs created strictly before the current run, excluding the current run itself.
    pub other_runs: Vec<Run>,
    /// Every listed run, including ones created after the current run started.
    pub all_runs: Vec<Run>,
}

impl WorkflowRuns {
    pub fn split(current: &Run, runs: Vec<Run>) -> Self {
        let other_runs = runs
            .iter()
            .filter(|run| run.run_id != current.run_id)
            .filter(|run| run.created_at < current.created_at)
            .cloned()
            .collect();
        Self {
            other_runs,
            all_runs: runs,
        }
    }
}
