#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use skipper_engine::{
    Commit, Conclusion, MapConfig, Run, RunSource, RunStatus, Settings, SourceError,
    TriggerEvent, WorkflowRuns,
};
use skipper_protocol::RunModelError;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub const CURRENT_ID: u64 = 100;

/// Completed, successful push run on `main`, created `minute` minutes past noon.
pub fn run(run_id: u64, tree: &str, minute: u32) -> Run {
    Run {
        event: TriggerEvent::Push,
        tree_hash: tree.to_string(),
        commit_hash: format!("sha-{run_id}"),
        status: RunStatus::Completed,
        conclusion: Conclusion::Success,
        html_url: format!("https://github.com/acme/app/actions/runs/{run_id}"),
        branch: Some("main".to_string()),
        run_id,
        workflow_id: 7,
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, minute, 0).unwrap(),
    }
}

pub fn in_progress(mut run: Run) -> Run {
    run.status = RunStatus::InProgress;
    run.conclusion = Conclusion::None;
    run
}

pub fn with_conclusion(mut run: Run, conclusion: Conclusion) -> Run {
    run.conclusion = conclusion;
    run
}

pub fn on_branch(mut run: Run, branch: Option<&str>) -> Run {
    run.branch = branch.map(str::to_string);
    run
}

pub fn with_event(mut run: Run, event: TriggerEvent) -> Run {
    run.event = event;
    run
}

pub fn with_commit(mut run: Run, sha: &str) -> Run {
    run.commit_hash = sha.to_string();
    run
}

/// The run being decided on: in progress, tree `T1`, created at 12:30.
pub fn current_run() -> Run {
    in_progress(run(CURRENT_ID, "T1", 30))
}

pub fn commit(sha: &str, parents: &[&str], files: &[&str]) -> Commit {
    Commit {
        sha: sha.to_string(),
        tree_hash: format!("tree-{sha}"),
        files: files.iter().map(|f| f.to_string()).collect(),
        parents: parents.iter().map(|p| p.to_string()).collect(),
        html_url: format!("https://github.com/acme/app/commit/{sha}"),
    }
}

pub fn settings(config: MapConfig) -> Settings {
    Settings::load(&config.with("github_token", "test-token")).expect("valid settings")
}

#[derive(Default)]
pub struct FakeRunSource {
    current: Option<Run>,
    runs: Vec<Run>,
    fail_listing: bool,
    integrity_error: bool,
    commits: HashMap<String, Commit>,
    failing_cancels: HashSet<u64>,
    fetched: Mutex<Vec<String>>,
    cancelled: Mutex<Vec<u64>>,
}

impl FakeRunSource {
    pub fn new(current: Run) -> Self {
        Self {
            current: Some(current.clone()),
            runs: vec![current],
            ..Self::default()
        }
    }

    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn with_run(mut self, run: Run) -> Self {
        self.runs.push(run);
        self
    }

    pub fn with_commit(mut self, commit: Commit) -> Self {
        self.commits.insert(commit.sha.clone(), commit);
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn corrupt_listing(mut self) -> Self {
        self.integrity_error = true;
        self
    }

    pub fn failing_cancel(mut self, run_id: u64) -> Self {
        self.failing_cancels.insert(run_id);
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn cancelled(&self) -> Vec<u64> {
        self.cancelled.lock().unwrap().clone()
    }
}

#[async_trait]
impl RunSource for FakeRunSource {
    async fn get_current_run(&self) -> Result<Run, SourceError> {
        self.current
            .clone()
            .ok_or_else(|| SourceError::Transport("connection refused".to_string()))
    }

    async fn list_runs_for_workflow(&self, current: &Run) -> Result<WorkflowRuns, SourceError> {
        if self.fail_listing {
            return Err(SourceError::Status {
                status: 502,
                url: "https://api.github.com/repos/acme/app/actions/workflows/7/runs"
                    .to_string(),
            });
        }
        if self.integrity_error {
            return Err(SourceError::Integrity(RunModelError::MissingTreeHash {
                run_id: 55,
                label: "others".to_string(),
            }));
        }
        Ok(WorkflowRuns::split(current, self.runs.clone()))
    }

    async fn get_commit(&self, sha: &str) -> Option<Commit> {
        self.fetched.lock().unwrap().push(sha.to_string());
        self.commits.get(sha).cloned()
    }

    async fn cancel_run(&self, run_id: u64) -> Result<u16, SourceError> {
        if self.failing_cancels.contains(&run_id) {
            return Err(SourceError::Status {
                status: 409,
                url: format!("https://api.github.com/repos/acme/app/actions/runs/{run_id}/cancel"),
            });
        }
        self.cancelled.lock().unwrap().push(run_id);
        Ok(202)
    }
}
