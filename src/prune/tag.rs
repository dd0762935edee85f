//! Immutable tag record produced by enumeration

use crate::error::{PrunerError, Result};
use chrono::{DateTime, Utc};

/// One tag of one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRecord {
    name: String,
    tag: String,
    digest: String,
    last_updated: DateTime<Utc>,
}

impl TagRecord {
    /// `name` is the `namespace/repository` qualifier. The digest must be non-empty.
    pub fn new(
        name: impl Into<String>,
        tag: impl Into<String>,
        digest: impl Into<String>,
        last_updated: DateTime<Utc>,
    ) -> Result<Self> {
        let name = name.into();
        let tag = tag.into();
        let digest = digest.into();
        if digest.is_empty() {
            return Err(PrunerError::MissingDigest(format!("{}:{}", name, tag)));
        }
        Ok(Self {
            name,
            tag,
            digest,
            last_updated,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// `namespace/repository:tag`
    pub fn full_name(&self) -> String {
        format!("{}:{}", self.name, self.tag)
    }
}

/// Parse the registry's `last_updated` value. There is no fallback for bad input.
pub fn parse_last_updated(full_name: &str, value: Option<&str>) -> Result<DateTime<Utc>> {
    let value = value.ok_or_else(|| PrunerError::MalformedTimestamp {
        tag: full_name.to_string(),
        value: String::new(),
        reason: "last_updated is missing".to_string(),
    })?;

    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|e| PrunerError::MalformedTimestamp {
            tag: full_name.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}
