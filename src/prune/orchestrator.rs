//! Runs the pruning stages in order and reports the outcome

use crate::error::Result;
use crate::logging::Logger;
use crate::prune::executor::{DeletionFailure, FailureKind};
use crate::prune::pruner::Pruner;

/// Counts reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total_tags: usize,
    pub eligible_groups: usize,
    pub deleted_tags: u64,
    pub failures: Vec<DeletionFailure>,
}

impl RunSummary {
    pub fn failed_groups(&self) -> usize {
        self.failures.len()
    }

    pub fn still_active_groups(&self) -> usize {
        self.failures
            .iter()
            .filter(|f| f.kind == FailureKind::ActiveTag)
            .count()
    }

    /// The single line printed at the end of a successful run
    pub fn headline(&self) -> String {
        format!(
            "Found {} images, {} of which are deletable and {} were deleted",
            self.total_tags, self.eligible_groups, self.deleted_tags
        )
    }
}

pub struct Orchestrator {
    output: Logger,
}

impl Orchestrator {
    pub fn new(output: Logger) -> Self {
        Self { output }
    }

    /// authenticate -> enumerate -> select -> execute -> summarize.
    ///
    /// Login, enumeration and malformed remote data abort the run. Deletion
    /// failures are contained to their group and show up in the summary.
    pub async fn run<P>(&self, pruner: &mut P) -> Result<RunSummary>
    where
        P: Pruner + ?Sized,
    {
        self.output
            .section(&format!("Running {} Pruner", pruner.registry_name()));

        pruner.authenticate().await?;
        self.output.debug("Login successful");

        let records = pruner.enumerate().await?;
        let plan = pruner.select_for_deletion(&records);
        let eligible_groups = plan.len();

        let report = if plan.is_empty() {
            self.output.info("Nothing to delete");
            Default::default()
        } else {
            pruner.execute(plan).await?
        };

        let summary = RunSummary {
            total_tags: records.len(),
            eligible_groups,
            deleted_tags: report.deleted_tags,
            failures: report.failures,
        };

        self.output.info(&summary.headline());
        if summary.failed_groups() > 0 {
            self.output.debug(&format!(
                "{} groups were not deleted ({} still active)",
                summary.failed_groups(),
                summary.still_active_groups()
            ));
        }

        Ok(summary)
    }
}
