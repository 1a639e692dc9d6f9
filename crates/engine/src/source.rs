use async_trait::async_trait;
use skipper_protocol::{Commit, Run, RunModelError, WorkflowRuns};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("{url} responded with status {status}")]
    Status { status: u16, url: String },

    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error(transparent)]
    Integrity(#[from] RunModelError),
}

/// Supplier of workflow runs and commits.
#[async_trait]
pub trait RunSource: Send + Sync {
    async fn get_current_run(&self) -> Result<Run, SourceError>;

    /// Runs of `current.workflow_id`, split with [`WorkflowRuns::split`].
    async fn list_runs_for_workflow(&self, current: &Run) -> Result<WorkflowRuns, SourceError>;

    /// `None` on any fetch failure.
    async fn get_commit(&self, sha: &str) -> Option<Commit>;

    /// Best effort. Returns the HTTP status code of the cancel request.
    async fn cancel_run(&self, run_id: u64) -> Result<u16, SourceError>;
}
