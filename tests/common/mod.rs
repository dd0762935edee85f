//! Scripted registry transport shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use docker_image_pruner::Logger;
use docker_image_pruner::prune::{DockerHubPruner, DockerHubTarget, RetentionPolicy, RetentionWindow};
use docker_image_pruner::registry::{ApiResponse, Credentials, RegistryTransport};
use docker_image_pruner::{PrunerError, Result};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const LOGIN: &str = "users/login";
pub const TAGS: &str = "namespaces/acme/repositories/app/tags";
pub const DELETE: &str = "namespaces/acme/delete-images";

#[derive(Debug, Clone)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub token: Option<String>,
    pub body: Option<Value>,
}

/// Cloning shares the script and the call log, so a test can keep a handle
/// after moving the transport into a pruner.
#[derive(Clone, Default)]
pub struct FakeRegistry {
    replies: Arc<Mutex<Vec<(String, VecDeque<Result<ApiResponse>>)>>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, path_prefix: &str, response: ApiResponse) -> &Self {
        self.push(path_prefix, Ok(response));
        self
    }

    pub fn fail(&self, path_prefix: &str, error: PrunerError) -> &Self {
        self.push(path_prefix, Err(error));
        self
    }

    fn push(&self, path_prefix: &str, reply: Result<ApiResponse>) {
        let mut replies = self.replies.lock().unwrap();
        match replies.iter_mut().find(|(prefix, _)| prefix == path_prefix) {
            Some((_, queue)) => queue.push_back(reply),
            None => replies.push((path_prefix.to_string(), VecDeque::from([reply]))),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path_prefix: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.path.starts_with(path_prefix))
            .collect()
    }

    fn answer(&self, call: Call) -> Result<ApiResponse> {
        let path = call.path.clone();
        self.calls.lock().unwrap().push(call);
        self.replies
            .lock()
            .unwrap()
            .iter_mut()
            .filter(|(prefix, _)| path.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .and_then(|(_, queue)| queue.pop_front())
            .unwrap_or_else(|| Err(PrunerError::Network(format!("no scripted reply for {}", path))))
    }
}

#[async_trait]
impl RegistryTransport for FakeRegistry {
    async fn get(&self, path: &str, token: Option<&str>) -> Result<ApiResponse> {
        self.answer(Call {
            method: "GET",
            path: path.to_string(),
            token: token.map(str::to_string),
            body: None,
        })
    }

    async fn post_json(&self, path: &str, token: Option<&str>, body: &Value) -> Result<ApiResponse> {
        self.answer(Call {
            method: "POST",
            path: path.to_string(),
            token: token.map(str::to_string),
            body: Some(body.clone()),
        })
    }
}

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap()
}

pub fn days_ago(days: i64) -> String {
    (now() - Duration::days(days)).to_rfc3339()
}

pub fn tag(name: &str, digest: &str, last_updated: &str) -> Value {
    json!({"name": name, "digest": digest, "last_updated": last_updated})
}

pub fn login_ok() -> ApiResponse {
    ApiResponse::new(200, r#"{"token":"jwt-token"}"#)
}

pub fn page(count: usize, results: &[Value]) -> ApiResponse {
    ApiResponse::new(200, json!({"count": count, "results": results}).to_string())
}

pub fn deleted(tag_deletes: u64) -> ApiResponse {
    ApiResponse::new(200, json!({"metrics": {"tag_deletes": tag_deletes}}).to_string())
        .with_header("x-ratelimit-remaining", "180")
}

pub fn still_active(digest: &str) -> ApiResponse {
    ApiResponse::new(
        400,
        json!({
            "message": "delete failed",
            "errinfo": {"details": {"warnings": [
                {"repository": "app", "digest": digest, "warning": "is_active"}
            ]}}
        })
        .to_string(),
    )
}

/// Script the login and a paginated listing of `tags`
pub fn script_listing(registry: &FakeRegistry, tags: &[Value]) {
    registry.reply(LOGIN, login_ok());
    if tags.is_empty() {
        registry.reply(TAGS, page(0, &[]));
    }
    for chunk in tags.chunks(100) {
        registry.reply(TAGS, page(tags.len(), chunk));
    }
}

pub fn target(dry_run: bool) -> DockerHubTarget {
    DockerHubTarget {
        namespace: "acme".to_string(),
        repository: "app".to_string(),
        credentials: Credentials::new("robot", "dckr_pat_123"),
        dry_run,
        max_rate_limit_wait: std::time::Duration::from_secs(900),
    }
}

pub fn pruner(registry: &FakeRegistry, dry_run: bool) -> DockerHubPruner<FakeRegistry> {
    DockerHubPruner::new(
        registry.clone(),
        target(dry_run),
        RetentionPolicy::new(RetentionWindow::Months(1), now()),
        Logger::new_quiet(),
    )
}
