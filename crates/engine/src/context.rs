use skipper_protocol::{PathMatcher, Run, TriggerEvent, WorkflowRuns};

use crate::config::Settings;

/// Everything one invocation decides on. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct DecisionContext {
    pub current_run: Run,
    /// Strictly older than `current_run`.
    pub other_runs: Vec<Run>,
    /// Includes runs created after `current_run`; only used for concurrent-trigger detection.
    pub all_runs: Vec<Run>,
    pub path_matcher: PathMatcher,
    pub do_not_skip: Vec<TriggerEvent>,
    pub concurrent_skipping: bool,
}

impl DecisionContext {
    pub fn new(current_run: Run, runs: WorkflowRuns, settings: &Settings) -> Self {
        Self {
            current_run,
            other_runs: runs.other_runs,
            all_runs: runs.all_runs,
            path_matcher: settings.path_matcher.clone(),
            do_not_skip: settings.do_not_skip.clone(),
            concurrent_skipping: settings.concurrent_skipping,
        }
    }

    pub fn is_do_not_skip(&self, event: &TriggerEvent) -> bool {
        self.do_not_skip.contains(event)
    }

    /// Older, completed, successful run that checked `tree_hash`.
    pub fn successful_run_with_tree(&self, tree_hash: &str) -> Option<&Run> {
        self.other_runs
            .iter()
            .find(|run| run.tree_hash == tree_hash && run.is_successful())
    }

    /// Older, unfinished runs on the current branch that check a different tree.
    pub fn outdated_runs(&self) -> impl Iterator<Item = &Run> {
        self.other_runs.iter().filter(move |run| {
            !run.is_completed()
                && run.tree_hash != self.current_run.tree_hash
                && run.branch == self.current_run.branch
        })
    }
}
