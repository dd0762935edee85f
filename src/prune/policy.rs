//! Age-based retention rule and digest grouping

use crate::error::{PrunerError, Result};
use crate::logging::Logger;
use crate::prune::tag::TagRecord;
use chrono::{DateTime, Duration, Months, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// How far back from "now" tags are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionWindow {
    Days(u32),
    Weeks(u32),
    /// Calendar months
    Months(u32),
}

impl Default for RetentionWindow {
    fn default() -> Self {
        RetentionWindow::Months(1)
    }
}

impl RetentionWindow {
    /// `now` minus one window, clamped to the earliest representable instant
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let cutoff = match *self {
            RetentionWindow::Days(n) => {
                Duration::try_days(i64::from(n)).and_then(|d| now.checked_sub_signed(d))
            }
            RetentionWindow::Weeks(n) => {
                Duration::try_weeks(i64::from(n)).and_then(|d| now.checked_sub_signed(d))
            }
            RetentionWindow::Months(n) => now.checked_sub_months(Months::new(n)),
        };
        cutoff.unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl fmt::Display for RetentionWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (n, unit) = match *self {
            RetentionWindow::Days(n) => (n, "day"),
            RetentionWindow::Weeks(n) => (n, "week"),
            RetentionWindow::Months(n) => (n, "month"),
        };
        if n == 1 {
            write!(f, "1 {}", unit)
        } else {
            write!(f, "{} {}s", n, unit)
        }
    }
}

impl FromStr for RetentionWindow {
    type Err = PrunerError;

    /// Accepts `<n><unit>` such as `30d`, `4weeks`, `1 month`
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(s.len());
        let (digits, unit) = s.split_at(split);

        let n: u32 = digits.parse().map_err(|_| {
            PrunerError::Validation(format!(
                "Invalid retention window '{}': expected e.g. 1month, 4weeks, 30days",
                s
            ))
        })?;
        if n == 0 {
            return Err(PrunerError::Validation(
                "Retention window must be greater than 0".to_string(),
            ));
        }

        match unit.trim().to_ascii_lowercase().as_str() {
            "d" | "day" | "days" => Ok(RetentionWindow::Days(n)),
            "w" | "week" | "weeks" => Ok(RetentionWindow::Weeks(n)),
            "m" | "month" | "months" => Ok(RetentionWindow::Months(n)),
            other => Err(PrunerError::Validation(format!(
                "Unknown retention unit '{}': use days, weeks or months",
                other
            ))),
        }
    }
}

/// Tags sharing one digest. They can only be deleted together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionGroup {
    digest: String,
    tags: Vec<TagRecord>,
}

impl DeletionGroup {
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn tags(&self) -> &[TagRecord] {
        &self.tags
    }

    pub fn tag_names(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.tag().to_string()).collect()
    }
}

/// Eligible groups keyed by digest, iterated in ascending digest order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionPlan {
    groups: BTreeMap<String, DeletionGroup>,
}

impl DeletionPlan {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, digest: &str) -> Option<&DeletionGroup> {
        self.groups.get(digest)
    }

    pub fn groups(&self) -> impl Iterator<Item = &DeletionGroup> {
        self.groups.values()
    }

    pub fn tag_count(&self) -> usize {
        self.groups.values().map(|g| g.tags.len()).sum()
    }
}

impl IntoIterator for DeletionPlan {
    type Item = DeletionGroup;
    type IntoIter = std::collections::btree_map::IntoValues<String, DeletionGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_values()
    }
}

/// Decides which tags fall outside the retention window
#[derive(Debug, Clone, Copy)]
pub struct RetentionPolicy {
    now: DateTime<Utc>,
    cutoff: DateTime<Utc>,
}

impl RetentionPolicy {
    pub fn new(window: RetentionWindow, now: DateTime<Utc>) -> Self {
        Self {
            now,
            cutoff: window.cutoff(now),
        }
    }

    pub fn cutoff(&self) -> DateTime<Utc> {
        self.cutoff
    }

    /// Strictly older than the cutoff; a tag updated exactly at the cutoff is kept
    pub fn is_eligible(&self, record: &TagRecord) -> bool {
        record.last_updated() < self.cutoff
    }

    pub fn select_for_deletion(&self, records: &[TagRecord], output: &Logger) -> DeletionPlan {
        let mut by_digest: BTreeMap<String, Vec<TagRecord>> = BTreeMap::new();

        for record in records.iter().filter(|r| self.is_eligible(r)) {
            output.info(&format!(
                "Image {} is from {} and will be deleted",
                record.full_name(),
                describe_age(record.last_updated(), self.now)
            ));
            by_digest
                .entry(record.digest().to_string())
                .or_default()
                .push(record.clone());
        }

        let groups: BTreeMap<String, DeletionGroup> = by_digest
            .into_iter()
            .map(|(digest, tags)| {
                let group = DeletionGroup {
                    digest: digest.clone(),
                    tags,
                };
                (digest, group)
            })
            .collect();

        output.debug(&format!("Found {} image digests to delete", groups.len()));
        DeletionPlan { groups }
    }
}

/// Relative age such as "3 months ago", for log output only
pub fn describe_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    if elapsed < Duration::zero() {
        return "the future".to_string();
    }

    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    let (n, unit) = if minutes < 1 {
        return "just now".to_string();
    } else if hours < 1 {
        (minutes, "minute")
    } else if days < 1 {
        (hours, "hour")
    } else if days < 7 {
        (days, "day")
    } else if days < 30 {
        (days / 7, "week")
    } else if days < 365 {
        (days / 30, "month")
    } else {
        (days / 365, "year")
    };

    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}
