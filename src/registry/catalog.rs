//! Tag enumeration for one repository
//!
//! Walks `GET namespaces/{ns}/repositories/{repo}/tags` page by page and turns
//! every raw entry into a [`TagRecord`]. A single entry without a digest or with
//! an unreadable timestamp aborts the whole enumeration.

use crate::error::handlers::HttpErrorHandler;
use crate::error::{PrunerError, Result};
use crate::logging::Logger;
use crate::prune::tag::{TagRecord, parse_last_updated};
use crate::registry::models::{RawTag, TAG_PAGE_SIZE, TagPage};
use crate::registry::session::RegistrySession;
use crate::registry::transport::RegistryTransport;

pub struct TagCatalog<'a, T> {
    session: &'a RegistrySession<T>,
    namespace: &'a str,
    repository: &'a str,
    page_size: u64,
    output: Logger,
}

/// Number of pages needed to hold `total` entries
pub fn page_count(total: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

impl<'a, T: RegistryTransport> TagCatalog<'a, T> {
    pub fn new(
        session: &'a RegistrySession<T>,
        namespace: &'a str,
        repository: &'a str,
        output: Logger,
    ) -> Self {
        Self {
            session,
            namespace,
            repository,
            page_size: TAG_PAGE_SIZE,
            output,
        }
    }

    /// `namespace/repository`, the name carried by every record
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.namespace, self.repository)
    }

    /// Fetch every page in ascending order and materialize the records
    pub async fn enumerate(&self) -> Result<Vec<TagRecord>> {
        let first = self.fetch_page(1).await?;
        let total = first.count;
        let pages = page_count(total, self.page_size);

        self.output.debug(&format!(
            "Listing images... There are {} pages to load...",
            pages
        ));

        let mut raw_tags = first.results;
        for page in 2..=pages {
            self.output
                .debug(&format!("Loading page {}/{}", page, pages));
            let next = self.fetch_page(page).await?;
            raw_tags.extend(next.results);
        }

        self.output.debug(&format!(
            "Found {} images, {} loaded",
            total,
            raw_tags.len()
        ));
        if raw_tags.len() as u64 != total {
            self.output.warning(&format!(
                "Registry reported {} tags but {} were loaded; the repository changed during listing",
                total,
                raw_tags.len()
            ));
        }

        raw_tags
            .into_iter()
            .map(|raw| self.to_record(raw))
            .collect()
    }

    async fn fetch_page(&self, page: u64) -> Result<TagPage> {
        let path = format!(
            "namespaces/{}/repositories/{}/tags?page_size={}&page={}",
            self.namespace, self.repository, self.page_size, page
        );
        let response = self.session.get(&path).await?;

        if !response.is_success() {
            return Err(HttpErrorHandler::handle_registry_error(
                response.status,
                &response.body,
                "tag listing",
            ));
        }

        response.json::<TagPage>()
    }

    fn to_record(&self, raw: RawTag) -> Result<TagRecord> {
        let name = self.qualified_name();
        let full_name = format!("{}:{}", name, raw.name);

        let Some(digest) = raw.resolve_digest() else {
            if let Ok(dump) = serde_json::to_string(&raw) {
                self.output.debug(&format!("Entry without digest: {}", dump));
            }
            return Err(PrunerError::MissingDigest(full_name));
        };

        let last_updated = parse_last_updated(&full_name, raw.last_updated.as_deref())?;
        TagRecord::new(name, raw.name.as_str(), digest, last_updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::transport::ApiResponse;
    use crate::registry::transport::mock::ScriptedTransport;
    use serde_json::json;

    fn page(count: u64, range: std::ops::Range<u64>) -> ApiResponse {
        let results: Vec<_> = range
            .map(|i| {
                json!({
                    "name": format!("build-{}", i),
                    "digest": format!("sha256:{:04}", i),
                    "last_updated": "2024-01-01T00:00:00Z"
                })
            })
            .collect();
        ApiResponse::new(200, json!({"count": count, "results": results}).to_string())
    }

    const TAGS: &str = "namespaces/acme/repositories/app/tags";

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 100), 0);
        assert_eq!(page_count(1, 100), 1);
        assert_eq!(page_count(100, 100), 1);
        assert_eq!(page_count(101, 100), 2);
        assert_eq!(page_count(150, 100), 2);
    }

    #[tokio::test]
    async fn fetches_pages_in_order_and_concatenates() {
        let transport = ScriptedTransport::new()
            .reply(TAGS, page(250, 0..100))
            .reply(TAGS, page(250, 100..200))
            .reply(TAGS, page(250, 200..250));
        let session = RegistrySession::with_token(transport, "t");
        let catalog = TagCatalog::new(&session, "acme", "app", Logger::new_quiet());

        let records = catalog.enumerate().await.unwrap();

        assert_eq!(records.len(), 250);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.tag(), format!("build-{}", i));
            assert_eq!(record.name(), "acme/app");
        }
        let pages: Vec<_> = session
            .transport()
            .calls()
            .iter()
            .map(|c| c.path.rsplit("page=").next().unwrap().to_string())
            .collect();
        assert_eq!(pages, vec!["1", "2", "3"]);
        assert!(session.transport().calls()[0].path.contains("page_size=100"));
    }

    #[tokio::test]
    async fn empty_repository_needs_one_request() {
        let transport = ScriptedTransport::new().reply(TAGS, page(0, 0..0));
        let session = RegistrySession::with_token(transport, "t");
        let catalog = TagCatalog::new(&session, "acme", "app", Logger::new_quiet());

        assert!(catalog.enumerate().await.unwrap().is_empty());
        assert_eq!(session.transport().calls().len(), 1);
    }

    #[tokio::test]
    async fn missing_digest_aborts_enumeration() {
        let body = json!({
            "count": 2,
            "results": [
                {"name": "ok", "digest": "sha256:aaa", "last_updated": "2024-01-01T00:00:00Z"},
                {"name": "broken", "images": [], "last_updated": "2024-01-01T00:00:00Z"}
            ]
        });
        let transport = ScriptedTransport::new().reply(TAGS, ApiResponse::new(200, body.to_string()));
        let session = RegistrySession::with_token(transport, "t");
        let catalog = TagCatalog::new(&session, "acme", "app", Logger::new_quiet());

        match catalog.enumerate().await {
            Err(PrunerError::MissingDigest(name)) => assert_eq!(name, "acme/app:broken"),
            other => panic!("expected missing digest, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn listing_failure_is_registry_error() {
        let transport = ScriptedTransport::new().reply(TAGS, ApiResponse::new(404, "not found"));
        let session = RegistrySession::with_token(transport, "t");
        let catalog = TagCatalog::new(&session, "acme", "app", Logger::new_quiet());

        assert!(matches!(
            catalog.enumerate().await,
            Err(PrunerError::Registry(_))
        ));
    }
}
