use skipper_protocol::{Decision, Run, SkipReason, TriggerEvent};

use crate::backtrace::Backtracer;
use crate::config::Settings;
use crate::context::DecisionContext;
use crate::error::{EngineError, Result};
use crate::reporter::Reporter;
use crate::source::{RunSource, SourceError};

/// Runs the detection rules in priority order; the first rule that matches decides.
pub struct DecisionEngine<'a> {
    source: &'a dyn RunSource,
    reporter: &'a dyn Reporter,
    settings: &'a Settings,
}

impl<'a> DecisionEngine<'a> {
    pub fn new(
        source: &'a dyn RunSource,
        reporter: &'a dyn Reporter,
        settings: &'a Settings,
    ) -> Self {
        Self {
            source,
            reporter,
            settings,
        }
    }

    /// Fails only on data integrity errors. Fetch failures fail open.
    pub async fn decide(&self) -> Result<Decision> {
        let context = match self.load_context().await {
            Ok(context) => context,
            Err(SourceError::Integrity(err)) => return Err(EngineError::DataIntegrity(err)),
            Err(err) => {
                log::warn!("setup fetch failed: {err}");
                self.reporter.warning(&err.to_string());
                self.reporter
                    .warning("Failed to fetch the required workflow information");
                return Ok(Decision::proceed(SkipReason::FetchFailed));
            }
        };
        log::debug!(
            "context loaded: run={} other_runs={} all_runs={}",
            context.current_run.run_id,
            context.other_runs.len(),
            context.all_runs.len()
        );

        if self.settings.cancel_others {
            self.cancel_outdated_runs(&context).await;
        }

        if context.is_do_not_skip(&context.current_run.event) {
            self.reporter.info(&format!(
                "Do not skip execution because the workflow was triggered with '{}'",
                context.current_run.event
            ));
            return Ok(Decision::proceed(SkipReason::DoNotSkip));
        }

        if let Some(decision) = self.detect_duplicate_runs(&context) {
            return Ok(decision);
        }

        if let Some(decision) = self.detect_concurrent_trigger(&context) {
            return Ok(decision);
        }

        if context.path_matcher.is_active() {
            let backtracer = Backtracer::new(self.source, self.reporter);
            if let Some(decision) = backtracer.backtrace(&context).await {
                return Ok(decision);
            }
        }

        self.reporter
            .info("Do not skip execution because we did not find a transferable run");
        Ok(Decision::proceed(SkipReason::NoTransferableRun))
    }

    async fn load_context(&self) -> std::result::Result<DecisionContext, SourceError> {
        let current_run = self.source.get_current_run().await?;
        let runs = self.source.list_runs_for_workflow(&current_run).await?;
        Ok(DecisionContext::new(current_run, runs, self.settings))
    }

    async fn cancel_outdated_runs(&self, context: &DecisionContext) {
        let victims: Vec<&Run> = context.outdated_runs().collect();
        if victims.is_empty() {
            self.reporter
                .info("Did not find other workflow runs to be cancelled");
            return;
        }

        for victim in victims {
            match self.source.cancel_run(victim.run_id).await {
                Ok(status) => self.reporter.info(&format!(
                    "Cancelled run {} with response code {status}",
                    victim.html_url
                )),
                Err(err) => {
                    log::warn!("cancel of run {} failed: {err}", victim.run_id);
                    self.reporter.warning(&err.to_string());
                    self.reporter
                        .warning(&format!("Failed to cancel {}", victim.html_url));
                }
            }
        }
    }

    fn detect_duplicate_runs(&self, context: &DecisionContext) -> Option<Decision> {
        let current = &context.current_run;

        if let Some(run) = context.successful_run_with_tree(&current.tree_hash) {
            self.reporter.info(&format!(
                "Skip execution because the exact same files have been successfully checked in {}",
                run.html_url
            ));
            return Some(Decision::skip(SkipReason::SkipAfterSuccessfulDuplicate, run));
        }

        if !context.concurrent_skipping {
            return None;
        }

        // In-flight duplicates on a different named branch never count.
        let concurrent = context.other_runs.iter().find(|run| {
            run.tree_hash == current.tree_hash && !run.is_completed() && run.may_share_branch(current)
        })?;
        self.reporter.info(&format!(
            "Skip execution because the exact same files are concurrently checked in {}",
            concurrent.html_url
        ));
        Some(Decision::skip(SkipReason::ConcurrentSkipping, concurrent))
    }

    fn detect_concurrent_trigger(&self, context: &DecisionContext) -> Option<Decision> {
        let watches_trigger = context.is_do_not_skip(&TriggerEvent::PullRequest)
            || context.is_do_not_skip(&TriggerEvent::Push);
        if !watches_trigger || !context.concurrent_skipping {
            return None;
        }

        let current = &context.current_run;
        let concurrent = context
            .all_runs
            .iter()
            .find(|run| run.tree_hash == current.tree_hash && run.run_id != current.run_id)?;
        self.reporter.info(&format!(
            "Skip execution because the exact same files are concurrently checked in {} ({})",
            concurrent.html_url, concurrent.event
        ));
        Some(Decision::skip(SkipReason::ConcurrentTrigger, concurrent))
    }
}

/// Write the verdict to the host output channel.
pub fn publish_decision(reporter: &dyn Reporter, decision: &Decision) {
    reporter.set_output("should_skip", if decision.should_skip { "true" } else { "false" });
    reporter.set_output("reason", decision.reason.as_str());
    let skipped_by = match &decision.skipped_by {
        Some(run) => match serde_json::to_string(run) {
            Ok(json) => json,
            Err(err) => {
                log::warn!("failed to serialize skipped_by run {}: {err}", run.id);
                String::new()
            }
        },
        None => String::new(),
    };
    reporter.set_output("skipped_by", &skipped_by);
}
