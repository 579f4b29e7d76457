// src/jobs/dataset.rs
//! Static-dataset job matching: score every posting description
//! against the resume text with a normalized sequence-similarity
//! ratio and return the best few.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::info;

use super::{snippet, JobPosting, JobSource};
use crate::error::MatchError;

#[derive(Debug, Deserialize)]
struct DatasetRow {
    title: String,
    company: String,
    description: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

pub struct DatasetJobSearch {
    path: PathBuf,
    snippet_chars: usize,
}

impl DatasetJobSearch {
    pub fn new(path: PathBuf, snippet_chars: usize) -> Self {
        Self {
            path,
            snippet_chars,
        }
    }

    /// Read the whole dataset. Missing or malformed files surface as
    /// a `Dataset` error; the pipeline degrades that to a warning
    /// plus an empty result set.
    fn load_rows(&self) -> Result<Vec<DatasetRow>, MatchError> {
        if !self.path.exists() {
            return Err(MatchError::Dataset(format!(
                "dataset file not found: {}",
                self.path.display()
            )));
        }

        let mut reader = csv::Reader::from_path(&self.path)
            .map_err(|e| MatchError::Dataset(format!("could not open dataset: {}", e)))?;

        let rows: Vec<DatasetRow> = reader
            .deserialize()
            .collect::<Result<_, _>>()
            .map_err(|e| MatchError::Dataset(format!("malformed dataset row: {}", e)))?;

        if rows.is_empty() {
            return Err(MatchError::Dataset("dataset contains no postings".to_string()));
        }

        Ok(rows)
    }
}

/// Case-insensitive whole-text similarity in [0, 1]. Deterministic,
/// so scoring the same inputs twice yields an identical ordering.
fn match_score(resume_text: &str, description: &str) -> f64 {
    strsim::normalized_levenshtein(&resume_text.to_lowercase(), &description.to_lowercase())
}

#[async_trait]
impl JobSource for DatasetJobSearch {
    async fn find_jobs(
        &self,
        resume_text: &str,
        _queries: &[String],
        limit: usize,
    ) -> Result<Vec<JobPosting>, MatchError> {
        let rows = self.load_rows()?;
        info!("Scoring {} dataset postings", rows.len());

        let mut scored: Vec<(f64, DatasetRow)> = rows
            .into_iter()
            .map(|row| (match_score(resume_text, &row.description), row))
            .collect();

        // Stable sort: ties keep the dataset's original row order.
        scored.sort_by(|(a, _), (b, _)| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(_, row)| JobPosting {
                title: row.title,
                company: row.company,
                location: row.location,
                description: snippet(&row.description, self.snippet_chars),
                url: row.url,
            })
            .collect())
    }
}
