use skipper_protocol::{Commit, Decision, PathVerdict, SkipReason};

use crate::context::DecisionContext;
use crate::reporter::Reporter;
use crate::source::RunSource;

/// Upper bound on commits fetched during one walk. Real histories stop after 1-3.
pub const MAX_BACKTRACE_DEPTH: usize = 50;

/// Walks first-parent ancestry while commits are skippable, looking for a successful
/// run on an ancestor tree.
pub struct Backtracer<'a> {
    source: &'a dyn RunSource,
    reporter: &'a dyn Reporter,
}

impl<'a> Backtracer<'a> {
    pub fn new(source: &'a dyn RunSource, reporter: &'a dyn Reporter) -> Self {
        Self { source, reporter }
    }

    /// `None` means the walk produced no verdict, never that it failed.
    pub async fn backtrace(&self, context: &DecisionContext) -> Option<Decision> {
        let mut sha = context.current_run.commit_hash.clone();

        for depth in 0..MAX_BACKTRACE_DEPTH {
            log::debug!("backtrace depth={depth} sha={sha}");
            let Some(commit) = self.source.get_commit(&sha).await else {
                self.reporter
                    .warning(&format!("Failed to retrieve commit {sha}"));
                return None;
            };

            if let Some(run) = context.successful_run_with_tree(&commit.tree_hash) {
                self.reporter.info(&format!(
                    "Skip execution because all changes since {} are in ignored or skipped paths",
                    run.html_url
                ));
                return Some(Decision::skip(SkipReason::Paths, run));
            }

            if !self.is_commit_skippable(&commit, context) {
                return None;
            }

            match commit.first_parent() {
                Some(parent) => sha = parent.to_string(),
                None => {
                    self.reporter.info(&format!(
                        "Stop backtracking at root commit {}",
                        commit.html_url
                    ));
                    return None;
                }
            }
        }

        self.reporter.warning(&format!(
            "Commit distance exceeds {MAX_BACKTRACE_DEPTH}: terminate path analysis"
        ));
        None
    }

    fn is_commit_skippable(&self, commit: &Commit, context: &DecisionContext) -> bool {
        let matcher = &context.path_matcher;
        let files = commit.files.join(", ");
        let verdict = matcher.classify(&commit.files);
        let message = match verdict {
            PathVerdict::Ignored => format!(
                "Commit {} is path-ignored: all of '{}' match against patterns '{}'",
                commit.html_url,
                files,
                matcher.exclude_patterns().join(", ")
            ),
            PathVerdict::Skipped => format!(
                "Commit {} is path-skipped: none of '{}' match against patterns '{}'",
                commit.html_url,
                files,
                matcher.include_patterns().join(", ")
            ),
            PathVerdict::Relevant => format!(
                "Stop backtracking at commit {} because '{}' are not skippable against paths '{}' or paths_ignore '{}'",
                commit.html_url,
                files,
                matcher.include_patterns().join(", "),
                matcher.exclude_patterns().join(", ")
            ),
        };
        self.reporter.info(&message);
        verdict.is_skippable()
    }
}
