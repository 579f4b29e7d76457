// src/error.rs
//! Error taxonomy for the matching pipeline.
//!
//! Every variant here is user-visible and non-fatal to the hosting
//! process: the pipeline downgrades them to warnings or partial
//! results, never a crash.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatchError {
    /// Document could not be read, or extraction produced no text.
    #[error("could not extract text from the uploaded document: {0}")]
    ExtractionFailure(String),

    /// A required credential was absent at construction time.
    #[error("missing credential: {0} is not set")]
    MissingCredential(&'static str),

    /// The job-search endpoint rejected our credentials (401/403).
    /// Distinct from "no results" - this is a configuration problem.
    #[error("job search authentication failed (HTTP {status})")]
    Auth { status: u16 },

    /// Static dataset missing, malformed, or empty.
    #[error("jobs dataset unavailable: {0}")]
    Dataset(String),

    /// Network or protocol failure talking to an upstream service.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] anyhow::Error),
}

impl MatchError {
    /// Short machine-readable code used in API error responses.
    pub fn code(&self) -> &'static str {
        match self {
            MatchError::ExtractionFailure(_) => "EXTRACTION_FAILED",
            MatchError::MissingCredential(_) => "MISSING_CREDENTIAL",
            MatchError::Auth { .. } => "AUTH_ERROR",
            MatchError::Dataset(_) => "DATASET_ERROR",
            MatchError::Upstream(_) => "UPSTREAM_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            MatchError::ExtractionFailure("empty".into()).code(),
            "EXTRACTION_FAILED"
        );
        assert_eq!(
            MatchError::MissingCredential("OPENAI_API_KEY").code(),
            "MISSING_CREDENTIAL"
        );
        assert_eq!(MatchError::Auth { status: 401 }.code(), "AUTH_ERROR");
    }

    #[test]
    fn test_auth_display_mentions_status() {
        let err = MatchError::Auth { status: 403 };
        assert!(err.to_string().contains("403"));
    }
}
