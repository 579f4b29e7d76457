// src/pipeline.rs
//! Per-upload orchestration: extract -> feedback + summary ->
//! candidate queries -> job source -> report.
//!
//! Data flows strictly forward and every stage failure past
//! extraction degrades to a warning plus a partial result; a failed
//! request never takes the process down.

use serde::Serialize;
use tracing::{info, warn};

use crate::candidates::extract_candidates;
use crate::config::{AppConfig, JobSourceMode};
use crate::error::MatchError;
use crate::extraction::{extract_text, DocumentKind};
use crate::jobs::{ApiJobSearch, DatasetJobSearch, JobPosting, JobSource};
use crate::summarizer::Summarizer;

/// Everything one upload produces. Warnings carry the user-visible
/// text for each degraded stage.
#[derive(Debug, Serialize)]
pub struct MatchReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub candidates: Vec<String>,
    pub jobs: Vec<JobPosting>,
    pub warnings: Vec<String>,
}

pub struct Pipeline {
    config: AppConfig,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Run the full pipeline for one uploaded document.
    ///
    /// Only extraction failure aborts the run; it is returned as an
    /// error so the handler can reject the upload outright.
    pub async fn run(
        &self,
        bytes: &[u8],
        kind: DocumentKind,
        target_role: &str,
    ) -> Result<MatchReport, MatchError> {
        let resume_text = extract_text(bytes, kind)?;
        info!("Extracted {} characters of resume text", resume_text.len());

        let mut warnings = Vec::new();

        let (feedback, summary) = self.summarize(&resume_text, target_role, &mut warnings).await;

        // With no usable summary the heuristic runs over the resume
        // text itself and bottoms out at its first-tokens fallback.
        let candidates = match &summary {
            Some(summary) => extract_candidates(summary),
            None => extract_candidates(&resume_text),
        };
        info!("Derived {} candidate queries", candidates.len());

        let jobs = self.find_jobs(&resume_text, &candidates, &mut warnings).await;

        Ok(MatchReport {
            feedback,
            candidates,
            jobs,
            warnings,
        })
    }

    async fn summarize(
        &self,
        resume_text: &str,
        target_role: &str,
        warnings: &mut Vec<String>,
    ) -> (Option<String>, Option<String>) {
        let summarizer = match Summarizer::new(&self.config.openai) {
            Ok(summarizer) => summarizer,
            Err(e) => {
                warn!("Summarizer unavailable: {}", e);
                warnings.push(format!("Resume feedback unavailable: {}", e));
                return (None, None);
            }
        };

        let feedback = match summarizer.resume_feedback(resume_text, target_role).await {
            Ok(feedback) => Some(feedback),
            Err(e) => {
                warn!("Feedback call failed: {:#}", e);
                warnings.push("Resume feedback unavailable: the analysis service did not respond.".to_string());
                None
            }
        };

        let summary = match summarizer.profile_summary(resume_text).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!("Profile summary call failed: {:#}", e);
                warnings.push("Profile summary unavailable; matching on resume text directly.".to_string());
                None
            }
        };

        (feedback, summary)
    }

    async fn find_jobs(
        &self,
        resume_text: &str,
        candidates: &[String],
        warnings: &mut Vec<String>,
    ) -> Vec<JobPosting> {
        let result = match self.config.mode {
            JobSourceMode::Api => {
                let limit = self.config.search.max_results;
                match ApiJobSearch::new(&self.config.search_api, self.config.search.clone()) {
                    Ok(source) => source.find_jobs(resume_text, candidates, limit).await,
                    Err(e) => Err(e),
                }
            }
            JobSourceMode::Dataset => {
                let source = DatasetJobSearch::new(
                    self.config.dataset_path.clone(),
                    self.config.search.snippet_chars,
                );
                source
                    .find_jobs(resume_text, candidates, self.config.search.dataset_top_n)
                    .await
            }
        };

        match result {
            Ok(jobs) => jobs,
            Err(e @ MatchError::Auth { .. }) | Err(e @ MatchError::MissingCredential(_)) => {
                warn!("Job search aborted: {}", e);
                // Configuration problem, deliberately distinct from
                // "no jobs found".
                warnings.push(format!("Job search configuration error: {}", e));
                Vec::new()
            }
            Err(e) => {
                warn!("Job search failed: {}", e);
                warnings.push(format!("Job search unavailable: {}", e));
                Vec::new()
            }
        }
    }
}
