//! Runner wiring configuration, transport and pruner together

use crate::cli::config::PrunerConfig;
use crate::error::Result;
use crate::logging::Logger;
use crate::prune::orchestrator::{Orchestrator, RunSummary};
use crate::prune::policy::RetentionPolicy;
use crate::prune::pruner::DockerHubPruner;
use crate::registry::transport::HttpTransport;
use chrono::Utc;

pub struct Runner {
    config: PrunerConfig,
    output: Logger,
}

impl Runner {
    pub fn new(config: PrunerConfig) -> Self {
        // Create output manager based on config
        let output = if config.quiet {
            Logger::new_quiet()
        } else {
            Logger::new(config.debug)
        };

        Self { config, output }
    }

    pub fn output(&self) -> &Logger {
        &self.output
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let policy = RetentionPolicy::new(self.config.retention, Utc::now());

        self.output.debug(&format!(
            "Target: {}/{} via {}",
            self.config.namespace, self.config.repository, self.config.api_url
        ));
        self.output.debug(&format!(
            "Retention window: {} (deleting tags last updated before {})",
            self.config.retention,
            policy.cutoff().format("%Y-%m-%d %H:%M:%S UTC")
        ));
        if self.config.dry_run {
            self.output
                .info("Dry run mode - the registry will only simulate deletions");
        }

        let transport = HttpTransport::new(
            &self.config.api_url,
            self.config.timeout,
            self.config.skip_tls,
            self.output.clone(),
        )?;
        let mut pruner =
            DockerHubPruner::new(transport, self.config.target(), policy, self.output.clone());

        let summary = Orchestrator::new(self.output.clone())
            .run(&mut pruner)
            .await?;

        self.output.success(&format!(
            "Pruning completed in {}",
            self.output.format_duration(self.output.elapsed())
        ));
        Ok(summary)
    }
}
