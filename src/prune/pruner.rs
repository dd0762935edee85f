//! Registry-specific pruners behind one capability interface

use crate::error::{PrunerError, Result};
use crate::logging::Logger;
use crate::prune::executor::{DeletionExecutor, DeletionReport, ExecutorOptions};
use crate::prune::policy::{DeletionPlan, RetentionPolicy};
use crate::prune::tag::TagRecord;
use crate::registry::catalog::TagCatalog;
use crate::registry::session::{Credentials, RegistrySession};
use crate::registry::transport::RegistryTransport;
use async_trait::async_trait;
use std::time::Duration;

/// The four stages every registry variant provides
#[async_trait]
pub trait Pruner: Send + Sync {
    /// Human readable registry name for log output
    fn registry_name(&self) -> &str;

    async fn authenticate(&mut self) -> Result<()>;

    async fn enumerate(&self) -> Result<Vec<TagRecord>>;

    fn select_for_deletion(&self, records: &[TagRecord]) -> DeletionPlan;

    async fn execute(&self, plan: DeletionPlan) -> Result<DeletionReport>;
}

/// What a Docker Hub run needs to know, fixed before it starts
#[derive(Debug, Clone)]
pub struct DockerHubTarget {
    pub namespace: String,
    pub repository: String,
    pub credentials: Credentials,
    pub dry_run: bool,
    pub max_rate_limit_wait: Duration,
}

/// Before login the pruner owns the bare transport, afterwards the session
enum Connection<T> {
    Anonymous(Option<T>),
    Authenticated(RegistrySession<T>),
}

pub struct DockerHubPruner<T> {
    target: DockerHubTarget,
    policy: RetentionPolicy,
    connection: Connection<T>,
    output: Logger,
}

impl<T: RegistryTransport> DockerHubPruner<T> {
    pub fn new(transport: T, target: DockerHubTarget, policy: RetentionPolicy, output: Logger) -> Self {
        Self {
            target,
            policy,
            connection: Connection::Anonymous(Some(transport)),
            output,
        }
    }

    pub fn session(&self) -> Option<&RegistrySession<T>> {
        match &self.connection {
            Connection::Authenticated(session) => Some(session),
            Connection::Anonymous(_) => None,
        }
    }

    fn require_session(&self, stage: &str) -> Result<&RegistrySession<T>> {
        self.session()
            .ok_or_else(|| PrunerError::NotAuthenticated(stage.to_string()))
    }
}

#[async_trait]
impl<T: RegistryTransport> Pruner for DockerHubPruner<T> {
    fn registry_name(&self) -> &str {
        "Docker Hub"
    }

    async fn authenticate(&mut self) -> Result<()> {
        let transport = match &mut self.connection {
            Connection::Anonymous(transport) => transport.take(),
            Connection::Authenticated(_) => return Ok(()),
        }
        .ok_or_else(|| {
            PrunerError::Authentication("a previous login attempt already failed".to_string())
        })?;

        let session =
            RegistrySession::login(transport, &self.target.credentials, &self.output).await?;
        self.connection = Connection::Authenticated(session);
        Ok(())
    }

    async fn enumerate(&self) -> Result<Vec<TagRecord>> {
        let session = self.require_session("enumerating tags")?;
        TagCatalog::new(
            session,
            &self.target.namespace,
            &self.target.repository,
            self.output.clone(),
        )
        .enumerate()
        .await
    }

    fn select_for_deletion(&self, records: &[TagRecord]) -> DeletionPlan {
        self.policy.select_for_deletion(records, &self.output)
    }

    async fn execute(&self, plan: DeletionPlan) -> Result<DeletionReport> {
        let session = self.require_session("deleting images")?;
        let options = ExecutorOptions {
            dry_run: self.target.dry_run,
            active_from: self.policy.cutoff(),
            max_rate_limit_wait: self.target.max_rate_limit_wait,
        };
        let executor = DeletionExecutor::new(
            session,
            &self.target.namespace,
            &self.target.repository,
            options,
            self.output.clone(),
        );
        Ok(executor.execute(plan).await)
    }
}
