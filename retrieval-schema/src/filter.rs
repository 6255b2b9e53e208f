//! Sparse metadata predicates.
//!
//! Every present field of a [`DocumentMetadataFilter`] narrows the candidate
//! set; there is no OR or NOT. Stores translate filters into their own
//! predicate language. [`DocumentMetadataFilter::matches`] is the reference
//! evaluation they are expected to agree with.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metadata::{DocumentChunkMetadata, Source};

/// Equality and date-range constraints over chunk metadata.
///
/// Dates are ISO-8601 strings. Both bounds are inclusive, and a date-only
/// `end_date` covers the whole of that day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadataFilter {
    /// Matches chunks owned by this document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    /// Restricted to the known sources, unlike
    /// [`DocumentMetadata::source`](crate::DocumentMetadata).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    /// Matches the identifier within the source system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    /// Matches the author exactly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Matches `created_at >= start_date`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Matches `created_at <= end_date`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl DocumentMetadataFilter {
    /// A filter that matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to chunks of one document.
    pub fn with_document_id(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }

    /// Restrict to one known source.
    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    /// Restrict to one source-system identifier.
    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    /// Restrict to one author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the inclusive lower date bound.
    pub fn with_start_date(mut self, start_date: impl Into<String>) -> Self {
        self.start_date = Some(start_date.into());
        self
    }

    /// Set the inclusive upper date bound.
    pub fn with_end_date(mut self, end_date: impl Into<String>) -> Self {
        self.end_date = Some(end_date.into());
        self
    }

    /// True when no field is set, i.e. the filter does not narrow anything.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Whether chunk metadata satisfies every present constraint.
    ///
    /// A date bound never matches metadata without `created_at`.
    pub fn matches(&self, metadata: &DocumentChunkMetadata) -> bool {
        let base = &metadata.base;

        if !equals(&self.document_id, metadata.document_id.as_deref()) {
            return false;
        }
        if let Some(source) = self.source {
            if base.source != source.as_str() {
                return false;
            }
        }
        if !equals(&self.source_id, base.source_id.as_deref())
            || !equals(&self.author, base.author.as_deref())
        {
            return false;
        }

        if self.start_date.is_none() && self.end_date.is_none() {
            return true;
        }
        let Some(created_at) = base.created_at.as_deref() else {
            return false;
        };
        if let Some(start) = self.start_date.as_deref() {
            if compare_dates(created_at, start, Bound::Start) == Ordering::Less {
                return false;
            }
        }
        if let Some(end) = self.end_date.as_deref() {
            if compare_dates(created_at, end, Bound::End) == Ordering::Greater {
                return false;
            }
        }
        true
    }
}

fn equals(expected: &Option<String>, actual: Option<&str>) -> bool {
    match expected {
        Some(expected) => actual == Some(expected.as_str()),
        None => true,
    }
}

#[derive(Debug, Clone, Copy)]
enum Bound {
    Start,
    End,
}

/// Compare a metadata timestamp against a filter bound.
///
/// Falls back to plain string comparison when either side is not ISO-8601.
fn compare_dates(value: &str, bound: &str, kind: Bound) -> Ordering {
    match (parse_instant(value, Bound::Start), parse_instant(bound, kind)) {
        (Some(value), Some(bound)) => value.cmp(&bound),
        _ => value.cmp(bound),
    }
}

/// Parse an RFC 3339 datetime, a naive `YYYY-MM-DDTHH:MM:SS`, or a bare date.
///
/// Naive values are taken as UTC. A bare date resolves to the first or last
/// instant of the day depending on `kind`.
fn parse_instant(raw: &str, kind: Bound) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let time = match kind {
        Bound::Start => NaiveTime::from_hms_opt(0, 0, 0)?,
        Bound::End => NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)?,
    };
    Some(date.and_time(time).and_utc())
}
