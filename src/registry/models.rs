//! Wire types of the Docker Hub management API

use serde::{Deserialize, Serialize};

/// Page size used by the tag listing endpoint
pub const TAG_PAGE_SIZE: u64 = 100;

/// Warning kind acknowledged when removing a digest that still carries a tag
pub const WARNING_CURRENT_TAG: &str = "current_tag";

/// Warning kind the registry reports for digests that are still in use
pub const WARNING_IS_ACTIVE: &str = "is_active";

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: Option<String>,
}

/// One page of `GET namespaces/{ns}/repositories/{repo}/tags`
#[derive(Debug, Deserialize)]
pub struct TagPage {
    pub count: u64,
    #[serde(default)]
    pub results: Vec<RawTag>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTag {
    /// The tag label
    pub name: String,
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default)]
    pub images: Vec<RawImage>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawImage {
    #[serde(default)]
    pub digest: Option<String>,
}

impl RawTag {
    /// Top-level digest first, then the digest of the first nested image
    pub fn resolve_digest(&self) -> Option<&str> {
        let direct = self.digest.as_deref().filter(|d| !d.is_empty());
        direct.or_else(|| {
            self.images
                .first()
                .and_then(|image| image.digest.as_deref())
                .filter(|d| !d.is_empty())
        })
    }
}

/// Body of `POST namespaces/{ns}/delete-images`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteImagesRequest {
    pub dry_run: bool,
    pub active_from: String,
    pub manifests: Vec<ManifestRef>,
    pub ignore_warnings: Vec<IgnoreWarning>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestRef {
    pub repository: String,
    pub digest: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IgnoreWarning {
    pub repository: String,
    pub digest: String,
    pub warning: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteImagesResponse {
    pub metrics: DeleteMetrics,
}

#[derive(Debug, Deserialize)]
pub struct DeleteMetrics {
    #[serde(default)]
    pub tag_deletes: u64,
}

/// Structured rejection body of the delete endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errinfo: Option<ErrorInfo>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorInfo {
    #[serde(default)]
    pub details: Option<ErrorDetails>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorDetails {
    #[serde(default)]
    pub warnings: Vec<DigestWarning>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DigestWarning {
    #[serde(default)]
    pub repository: String,
    #[serde(default)]
    pub digest: String,
    pub warning: String,
}

impl ErrorBody {
    pub fn warnings(&self) -> &[DigestWarning] {
        self.errinfo
            .as_ref()
            .and_then(|info| info.details.as_ref())
            .map(|details| details.warnings.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawTag {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn digest_prefers_top_level() {
        let tag = raw(r#"{"name":"v1","digest":"sha256:aaa","images":[{"digest":"sha256:bbb"}]}"#);
        assert_eq!(tag.resolve_digest(), Some("sha256:aaa"));
    }

    #[test]
    fn digest_falls_back_to_first_image() {
        let tag = raw(r#"{"name":"v1","images":[{"digest":"sha256:bbb"},{"digest":"sha256:ccc"}]}"#);
        assert_eq!(tag.resolve_digest(), Some("sha256:bbb"));

        let tag = raw(r#"{"name":"v1","digest":null,"images":[{"digest":"sha256:bbb"}]}"#);
        assert_eq!(tag.resolve_digest(), Some("sha256:bbb"));
    }

    #[test]
    fn digest_missing_everywhere() {
        assert_eq!(raw(r#"{"name":"v1"}"#).resolve_digest(), None);
        assert_eq!(raw(r#"{"name":"v1","images":[]}"#).resolve_digest(), None);
        assert_eq!(raw(r#"{"name":"v1","digest":"","images":[{}]}"#).resolve_digest(), None);
    }

    #[test]
    fn error_body_exposes_nested_warnings() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"message":"validation failed","errinfo":{"details":{"warnings":[
                {"repository":"app","digest":"sha256:aaa","warning":"is_active"}]}}}"#,
        )
        .unwrap();
        assert_eq!(body.message.as_deref(), Some("validation failed"));
        assert_eq!(body.warnings().len(), 1);
        assert_eq!(body.warnings()[0].warning, WARNING_IS_ACTIVE);

        let empty: ErrorBody = serde_json::from_str(r#"{"message":"nope"}"#).unwrap();
        assert!(empty.warnings().is_empty());
    }

    #[test]
    fn delete_request_wire_shape() {
        let request = DeleteImagesRequest {
            dry_run: true,
            active_from: "2026-09-15T00:00:00Z".to_string(),
            manifests: vec![ManifestRef {
                repository: "app".to_string(),
                digest: "sha256:aaa".to_string(),
            }],
            ignore_warnings: vec![IgnoreWarning {
                repository: "app".to_string(),
                digest: "sha256:aaa".to_string(),
                warning: WARNING_CURRENT_TAG.to_string(),
                tags: vec!["v1".to_string(), "latest".to_string()],
            }],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "dry_run": true,
                "active_from": "2026-09-15T00:00:00Z",
                "manifests": [{"repository": "app", "digest": "sha256:aaa"}],
                "ignore_warnings": [{
                    "repository": "app",
                    "digest": "sha256:aaa",
                    "warning": "current_tag",
                    "tags": ["v1", "latest"]
                }]
            })
        );
    }
}
