//! Deletion protocol for digest groups
//!
//! Every group becomes one `delete-images` request. A 429 answer gets exactly one
//! wait-until-reset and one resubmission of the same request. Rejections are
//! classified per digest and recorded as [`DeletionFailure`] values; they never
//! stop the remaining groups from being processed.

use crate::error::PrunerError;
use crate::logging::Logger;
use crate::prune::policy::{DeletionGroup, DeletionPlan};
use crate::registry::models::{
    DeleteImagesRequest, DeleteImagesResponse, ErrorBody, IgnoreWarning, ManifestRef,
    WARNING_CURRENT_TAG, WARNING_IS_ACTIVE,
};
use crate::registry::session::RegistrySession;
use crate::registry::transport::{ApiResponse, RegistryTransport};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Default upper bound on a single rate-limit wait
pub const DEFAULT_MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The registry refuses to drop a digest that is still in active use
    ActiveTag,
    /// Any other warning, or a rejection body that could not be read
    UnknownWarning,
    /// Still throttled after the single retry, or the reset lies too far ahead
    RateLimited,
    /// The request never got an answer
    Transport,
}

/// A group the registry did not confirm as deleted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionFailure {
    pub digest: String,
    pub tags: Vec<String>,
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionReport {
    /// Sum of `tag_deletes` over confirmed groups
    pub deleted_tags: u64,
    pub confirmed_groups: usize,
    pub rate_limit_waits: usize,
    pub failures: Vec<DeletionFailure>,
}

#[derive(Debug, Clone)]
pub struct ExecutorOptions {
    pub dry_run: bool,
    /// Forwarded as `active_from`, the registry's own age guard
    pub active_from: DateTime<Utc>,
    pub max_rate_limit_wait: Duration,
}

pub struct DeletionExecutor<'a, T> {
    session: &'a RegistrySession<T>,
    namespace: &'a str,
    repository: &'a str,
    options: ExecutorOptions,
    output: Logger,
}

/// Format used by the registry for `active_from`
pub fn format_active_from(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

impl<'a, T: RegistryTransport> DeletionExecutor<'a, T> {
    pub fn new(
        session: &'a RegistrySession<T>,
        namespace: &'a str,
        repository: &'a str,
        options: ExecutorOptions,
        output: Logger,
    ) -> Self {
        Self {
            session,
            namespace,
            repository,
            options,
            output,
        }
    }

    pub fn build_request(&self, group: &DeletionGroup) -> DeleteImagesRequest {
        DeleteImagesRequest {
            dry_run: self.options.dry_run,
            active_from: format_active_from(self.options.active_from),
            manifests: vec![ManifestRef {
                repository: self.repository.to_string(),
                digest: group.digest().to_string(),
            }],
            ignore_warnings: vec![IgnoreWarning {
                repository: self.repository.to_string(),
                digest: group.digest().to_string(),
                warning: WARNING_CURRENT_TAG.to_string(),
                tags: group.tag_names(),
            }],
        }
    }

    /// Submit every group in digest order
    pub async fn execute(&self, plan: DeletionPlan) -> DeletionReport {
        let mut report = DeletionReport::default();

        for group in plan {
            match self.delete_group(&group, &mut report).await {
                Ok(deleted) => {
                    report.deleted_tags = report.deleted_tags.saturating_add(deleted);
                    report.confirmed_groups += 1;
                }
                Err(failure) => report.failures.push(failure),
            }
        }

        report
    }

    async fn delete_group(
        &self,
        group: &DeletionGroup,
        report: &mut DeletionReport,
    ) -> Result<u64, DeletionFailure> {
        let request = self.build_request(group);
        let body = serde_json::to_value(&request)
            .map_err(|e| self.failure(group, FailureKind::UnknownWarning, e.to_string()))?;
        let path = format!("namespaces/{}/delete-images", self.namespace);

        let first = self.session.post_json(&path, &body).await;
        let response = match first {
            Ok(response) if response.is_rate_limited() => {
                self.output.debug(
                    "Run out of rate limit.. waiting until we're allowed to make more calls...",
                );
                self.wait_for_reset(&response, group).await?;
                report.rate_limit_waits += 1;
                self.session.post_json(&path, &body).await
            }
            other => other,
        };

        self.handle_response(response, group, &request)
    }

    async fn wait_for_reset(
        &self,
        response: &ApiResponse,
        group: &DeletionGroup,
    ) -> Result<(), DeletionFailure> {
        let wait = rate_limit_wait(response, Utc::now()).ok_or_else(|| {
            self.failure(
                group,
                FailureKind::RateLimited,
                "rate limited without a readable x-ratelimit-reset header".to_string(),
            )
        })?;

        if wait > self.options.max_rate_limit_wait {
            return Err(self.failure(
                group,
                FailureKind::RateLimited,
                format!(
                    "rate limit resets in {}s, more than the allowed {}s wait",
                    wait.as_secs(),
                    self.options.max_rate_limit_wait.as_secs()
                ),
            ));
        }

        self.output
            .debug(&format!("Sleeping {}s until the rate limit resets", wait.as_secs()));
        tokio::time::sleep(wait).await;
        Ok(())
    }

    fn handle_response(
        &self,
        response: crate::error::Result<ApiResponse>,
        group: &DeletionGroup,
        request: &DeleteImagesRequest,
    ) -> Result<u64, DeletionFailure> {
        let response = response.map_err(|e: PrunerError| {
            self.output
                .warning(&format!("> Failed to remove tags: {}", e));
            self.failure(group, FailureKind::Transport, e.to_string())
        })?;

        if response.is_success() {
            let deleted = response
                .json::<DeleteImagesResponse>()
                .map_err(|e| {
                    self.output
                        .warning(&format!("> Failed to read deletion result: {}", e));
                    self.failure(group, FailureKind::UnknownWarning, e.to_string())
                })?
                .metrics
                .tag_deletes;
            let remaining = response.header("x-ratelimit-remaining").unwrap_or("unknown");
            self.output.debug(&format!(
                "> Removed {} tags, (request limit remaining: {})",
                deleted, remaining
            ));
            return Ok(deleted);
        }

        if response.is_rate_limited() {
            self.output.warning(&format!(
                "> Still rate limited after retry, skipping {}",
                group.digest()
            ));
            return Err(self.failure(
                group,
                FailureKind::RateLimited,
                "still rate limited after one retry".to_string(),
            ));
        }

        Err(self.classify_rejection(&response, group, request))
    }

    fn classify_rejection(
        &self,
        response: &ApiResponse,
        group: &DeletionGroup,
        request: &DeleteImagesRequest,
    ) -> DeletionFailure {
        let Ok(body) = response.json::<ErrorBody>() else {
            self.dump_exchange(request, response);
            self.output.warning(&format!(
                "> Failed to remove tags: HTTP {} with unreadable body",
                response.status
            ));
            return self.failure(
                group,
                FailureKind::UnknownWarning,
                format!("HTTP {}: {}", response.status, response.body),
            );
        };

        let message = body
            .message
            .clone()
            .unwrap_or_else(|| format!("HTTP {}", response.status));
        let warnings = body.warnings();
        let mut kind = if warnings.is_empty() {
            FailureKind::UnknownWarning
        } else {
            FailureKind::ActiveTag
        };

        for warning in warnings {
            if warning.warning == WARNING_IS_ACTIVE {
                self.output.notice(&format!(
                    "> Not removing {}@{}, it is still marked active by docker hub",
                    warning.repository, warning.digest
                ));
            } else {
                kind = FailureKind::UnknownWarning;
                self.dump_exchange(request, response);
                self.output
                    .warning(&format!("> Failed to remove tags: {}", message));
            }
        }
        if warnings.is_empty() {
            self.dump_exchange(request, response);
            self.output
                .warning(&format!("> Failed to remove tags: {}", message));
        }

        self.failure(group, kind, message)
    }

    fn dump_exchange(&self, request: &DeleteImagesRequest, response: &ApiResponse) {
        if let Ok(request) = serde_json::to_string(request) {
            self.output.debug(&format!("Delete request: {}", request));
        }
        self.output
            .debug(&format!("Delete response ({}): {}", response.status, response.body));
    }

    fn failure(&self, group: &DeletionGroup, kind: FailureKind, message: String) -> DeletionFailure {
        DeletionFailure {
            digest: group.digest().to_string(),
            tags: group.tag_names(),
            kind,
            message,
        }
    }
}

/// Time left until the `x-ratelimit-reset` instant (Unix seconds), zero if already past.
///
/// A reset too far ahead to represent saturates to [`Duration::MAX`].
pub fn rate_limit_wait(response: &ApiResponse, now: DateTime<Utc>) -> Option<Duration> {
    let reset: f64 = response.header("x-ratelimit-reset")?.trim().parse().ok()?;
    if !reset.is_finite() {
        return None;
    }
    let now = now.timestamp_millis() as f64 / 1000.0;
    Some(Duration::try_from_secs_f64((reset - now).max(0.0)).unwrap_or(Duration::MAX))
}
