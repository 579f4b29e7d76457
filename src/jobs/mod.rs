// src/jobs/mod.rs
//! Job sources: one capability, two interchangeable implementations.
//!
//! The fan-out variant queries an external search API across a
//! query x location cross-product; the dataset variant scores a local
//! CSV against the resume text. The pipeline picks one at startup.

pub mod api_search;
pub mod dataset;

pub use api_search::ApiJobSearch;
pub use dataset::DatasetJobSearch;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::MatchError;

/// A single job posting, read-only once created.
#[derive(Debug, Clone, Serialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Bounded-length snippet with newlines flattened to spaces.
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl JobPosting {
    /// Stable identity used to collapse duplicates: the external
    /// listing id when present, otherwise title plus company.
    pub fn identity_key(external_id: Option<&str>, title: &str, company: &str) -> String {
        match external_id {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => format!("{}::{}", title.to_lowercase(), company.to_lowercase()),
        }
    }
}

#[async_trait]
pub trait JobSource: Send + Sync {
    /// Return at most `limit` postings, best first. An empty result
    /// is not an error.
    async fn find_jobs(
        &self,
        resume_text: &str,
        queries: &[String],
        limit: usize,
    ) -> Result<Vec<JobPosting>, MatchError>;
}

/// Truncate a description to a display snippet, flattening embedded
/// newlines to single spaces.
pub fn snippet(description: &str, max_chars: usize) -> String {
    let flattened = description
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if flattened.chars().count() <= max_chars {
        return flattened;
    }

    let mut cut: String = flattened.chars().take(max_chars).collect();
    cut.push('…');
    cut
}
