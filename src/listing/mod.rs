//! Job listing model
//!
//! A [`JobListing`] is created once per job card during extraction and is
//! never mutated afterwards. The [`DedupKey`] triple decides whether two
//! listings are the same posting.

mod dedup;

pub use dedup::DedupSet;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Fallback for a company or location that could not be extracted
pub const UNKNOWN: &str = "Unknown";

/// One job card extracted from a results page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobListing {
    /// Posting title, empty if the card had none
    pub title: String,

    /// Hiring company, `"Unknown"` if absent
    pub company: String,

    /// Job location, `"Unknown"` if absent
    pub location: String,

    /// Short description snippet, may be empty
    pub summary: String,

    /// Absolute link to the listing, empty if none could be resolved
    pub url: String,

    /// RFC 3339 UTC timestamp of extraction
    pub scraped_at: String,
}

impl JobListing {
    /// Builds a listing from optional field lookups, substituting defaults
    pub fn from_fields(
        title: Option<String>,
        company: Option<String>,
        location: Option<String>,
        summary: Option<String>,
        url: Option<String>,
        scraped_at: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.unwrap_or_default(),
            company: company.unwrap_or_else(|| UNKNOWN.to_string()),
            location: location.unwrap_or_else(|| UNKNOWN.to_string()),
            summary: summary.unwrap_or_default(),
            url: url.unwrap_or_default(),
            scraped_at: format_timestamp(scraped_at),
        }
    }

    /// Returns the `(title, company, url)` key used for deduplication
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            title: self.title.clone(),
            company: self.company.clone(),
            url: self.url.clone(),
        }
    }
}

/// The `(title, company, url)` triple identifying a posting
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DedupKey {
    pub title: String,
    pub company: String,
    pub url: String,
}

impl DedupKey {
    pub fn new(title: impl Into<String>, company: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            url: url.into(),
        }
    }
}

/// Formats a timestamp the way listings store it
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
