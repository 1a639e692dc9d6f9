use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::{Commit, Conclusion, Run, RunStatus, TriggerEvent};

/// A fetched record that cannot take part in any comparison.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunModelError {
    #[error("could not find the tree hash of run {run_id} ({label})")]
    MissingTreeHash { run_id: u64, label: String },

    #[error("could not find the workflow id of run {run_id} ({label})")]
    MissingWorkflowId { run_id: u64, label: String },

    #[error("could not find the tree hash of commit {sha}")]
    MissingCommitTree { sha: String },
}

/// Workflow run as returned by `GET /repos/{owner}/{repo}/actions/runs/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWorkflowRun {
    pub id: u64,
    pub event: String,
    pub head_sha: String,
    #[serde(default)]
    pub head_branch: Option<String>,
    #[serde(default)]
    pub head_commit: Option<RawHeadCommit>,
    pub status: RunStatus,
    #[serde(default)]
    pub conclusion: Option<Conclusion>,
    pub html_url: String,
    #[serde(default)]
    pub workflow_id: Option<u64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawHeadCommit {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub tree_id: Option<String>,
}

/// Body of `GET /repos/{owner}/{repo}/actions/workflows/{id}/runs`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWorkflowRunList {
    #[serde(default)]
    pub total_count: u64,
    pub workflow_runs: Vec<RawWorkflowRun>,
}

/// Commit as returned by `GET /repos/{owner}/{repo}/commits/{ref}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCommit {
    pub sha: String,
    pub html_url: String,
    pub commit: RawCommitDetail,
    #[serde(default)]
    pub parents: Vec<RawCommitParent>,
    #[serde(default)]
    pub files: Vec<RawCommitFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCommitDetail {
    #[serde(default)]
    pub tree: Option<RawCommitTree>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCommitTree {
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCommitParent {
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCommitFile {
    pub filename: String,
}

/// Normalize a raw run record. `label` names the record in error messages
/// (e.g. `current_run`, `others`).
pub fn parse_run(raw: RawWorkflowRun, label: &str) -> Result<Run, RunModelError> {
    let tree_hash = raw
        .head_commit
        .and_then(|commit| commit.tree_id)
        .filter(|tree| !tree.is_empty())
        .ok_or_else(|| RunModelError::MissingTreeHash {
            run_id: raw.id,
            label: label.to_string(),
        })?;
    let workflow_id = raw
        .workflow_id
        .filter(|id| *id != 0)
        .ok_or_else(|| RunModelError::MissingWorkflowId {
            run_id: raw.id,
            label: label.to_string(),
        })?;

    Ok(Run {
        event: TriggerEvent::from(raw.event),
        tree_hash,
        commit_hash: raw.head_sha,
        status: raw.status,
        conclusion: raw.conclusion.unwrap_or_default(),
        html_url: raw.html_url,
        branch: raw.head_branch.filter(|branch| !branch.is_empty()),
        run_id: raw.id,
        workflow_id,
        created_at: raw.created_at,
    })
}

pub fn parse_commit(raw: RawCommit) -> Result<Commit, RunModelError> {
    let tree_hash = raw
        .commit
        .tree
        .map(|tree| tree.sha)
        .filter(|sha| !sha.is_empty())
        .ok_or_else(|| RunModelError::MissingCommitTree {
            sha: raw.sha.clone(),
        })?;

    Ok(Commit {
        sha: raw.sha,
        tree_hash,
        files: raw.files.into_iter().map(|file| file.filename).collect(),
        parents: raw.parents.into_iter().map(|parent| parent.sha).collect(),
        html_url: raw.html_url,
    })
}
