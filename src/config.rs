// src/config.rs
//! Process-wide configuration, built once at startup and read-only
//! afterwards. Credentials come from the environment; search tuning
//! comes from an optional config.yaml next to the binary.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::info;

use crate::error::MatchError;

/// Which job source backs the matching stage. The two variants are
/// interchangeable implementations of the same capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobSourceMode {
    /// Fan-out search against the external paginated API.
    Api,
    /// Similarity scoring against a local CSV dataset.
    Dataset,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai: OpenAiConfig,
    pub search_api: SearchApiConfig,
    pub mode: JobSourceMode,
    pub dataset_path: PathBuf,
    pub search: SearchSettings,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct SearchApiConfig {
    pub app_id: Option<String>,
    pub app_key: Option<String>,
    pub base_url: String,
    pub country: String,
}

/// Tunable search behaviour. Defaults match the shipped behaviour;
/// a config.yaml can override any field per deployment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Locations ordered most specific to broadest; the trailing
    /// empty string means "any location".
    pub locations: Vec<String>,
    /// Roles tried after the candidate queries, before the generic
    /// fallback titles.
    pub priority_roles: Vec<String>,
    /// Last-resort generic titles so a search never runs with an
    /// empty query plan.
    pub fallback_titles: Vec<String>,
    /// Unique postings to collect in the fan-out variant.
    pub max_results: usize,
    /// Postings returned by the dataset variant.
    pub dataset_top_n: usize,
    /// Results requested per external API page.
    pub results_per_page: usize,
    /// Pause between external requests, to respect rate limits.
    pub pacing_ms: u64,
    /// Description snippet length cap, in characters.
    pub snippet_chars: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            locations: vec![
                "London".to_string(),
                "Manchester".to_string(),
                "United Kingdom".to_string(),
                String::new(),
            ],
            priority_roles: vec![
                "Software Engineer".to_string(),
                "Backend Developer".to_string(),
                "Data Engineer".to_string(),
            ],
            fallback_titles: vec!["Developer".to_string(), "Engineer".to_string()],
            max_results: 20,
            dataset_top_n: 5,
            results_per_page: 10,
            pacing_ms: 250,
            snippet_chars: 300,
        }
    }
}

impl AppConfig {
    /// Load configuration from the environment plus an optional
    /// config.yaml in the working directory.
    pub fn load() -> Result<Self> {
        let mode = match std::env::var("JOB_SOURCE").as_deref() {
            Ok("dataset") => JobSourceMode::Dataset,
            _ => JobSourceMode::Api,
        };

        let openai = OpenAiConfig {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            base_url: std::env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
            model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
        };

        let search_api = SearchApiConfig {
            app_id: std::env::var("ADZUNA_APP_ID").ok(),
            app_key: std::env::var("ADZUNA_APP_KEY").ok(),
            base_url: std::env::var("ADZUNA_API_URL")
                .unwrap_or_else(|_| "https://api.adzuna.com/v1/api/jobs".to_string()),
            country: std::env::var("ADZUNA_COUNTRY").unwrap_or_else(|_| "gb".to_string()),
        };

        let dataset_path =
            PathBuf::from(std::env::var("JOBS_DATASET").unwrap_or_else(|_| "jobs.csv".to_string()));

        let search = SearchSettings::load_from_file("config.yaml")?;

        info!("Loaded configuration, job source mode: {:?}", mode);

        Ok(Self {
            openai,
            search_api,
            mode,
            dataset_path,
            search,
        })
    }
}

impl SearchSettings {
    fn load_from_file(path: &str) -> Result<Self> {
        let config_path = PathBuf::from(path);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))
    }
}

impl OpenAiConfig {
    pub fn require_key(&self) -> Result<&str, MatchError> {
        self.api_key
            .as_deref()
            .ok_or(MatchError::MissingCredential("OPENAI_API_KEY"))
    }
}

impl SearchApiConfig {
    pub fn require_credentials(&self) -> Result<(&str, &str), MatchError> {
        let app_id = self
            .app_id
            .as_deref()
            .ok_or(MatchError::MissingCredential("ADZUNA_APP_ID"))?;
        let app_key = self
            .app_key
            .as_deref()
            .ok_or(MatchError::MissingCredential("ADZUNA_APP_KEY"))?;
        Ok((app_id, app_key))
    }
}
