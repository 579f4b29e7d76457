// src/jobs/api_search.rs
//! Fan-out job search against an Adzuna-style paginated endpoint.
//!
//! Queries run in priority order (candidate queries, then configured
//! priority roles, then generic fallback titles) across locations
//! ordered narrow-to-broad, one request per pair, short-circuiting
//! once enough unique postings are collected. The HTTP call sits
//! behind the `PageFetcher` seam so the accumulation loop is tested
//! without a live endpoint.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{info, warn};

use super::{snippet, JobPosting, JobSource};
use crate::config::{SearchApiConfig, SearchSettings};
use crate::error::MatchError;

const REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RawPosting>,
}

#[derive(Deserialize)]
struct RawPosting {
    id: Option<String>,
    title: Option<String>,
    company: Option<RawCompany>,
    location: Option<RawLocation>,
    description: Option<String>,
    redirect_url: Option<String>,
}

#[derive(Deserialize)]
struct RawCompany {
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct RawLocation {
    display_name: Option<String>,
}

/// One page of raw results for a (query, location) pair.
#[async_trait]
trait PageFetcher {
    async fn page(&self, query: &str, location: &str) -> Result<Vec<RawPosting>, MatchError>;
}

#[derive(Debug)]
pub struct ApiJobSearch {
    client: Client,
    app_id: String,
    app_key: String,
    base_url: String,
    country: String,
    settings: SearchSettings,
}

impl ApiJobSearch {
    /// Build the search client. Fails with `MissingCredential` when
    /// either application credential is absent.
    pub fn new(api: &SearchApiConfig, settings: SearchSettings) -> Result<Self, MatchError> {
        let (app_id, app_key) = api.require_credentials()?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            app_id: app_id.to_string(),
            app_key: app_key.to_string(),
            base_url: api.base_url.clone(),
            country: api.country.clone(),
            settings,
        })
    }

    /// The fixed-priority query order: supplied candidates first, then
    /// priority roles, then generic fallback titles, deduplicated
    /// case-insensitively so no pair is requested twice.
    fn query_plan(&self, candidates: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        candidates
            .iter()
            .chain(self.settings.priority_roles.iter())
            .chain(self.settings.fallback_titles.iter())
            .filter(|query| !query.trim().is_empty())
            .filter(|query| seen.insert(query.to_lowercase()))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PageFetcher for ApiJobSearch {
    async fn page(&self, query: &str, location: &str) -> Result<Vec<RawPosting>, MatchError> {
        let url = format!("{}/{}/search/1", self.base_url, self.country);
        let per_page = self.settings.results_per_page.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("app_id", self.app_id.as_str()),
                ("app_key", self.app_key.as_str()),
                ("results_per_page", per_page.as_str()),
                ("what", query),
                ("where", location),
            ])
            .send()
            .await
            .context("Job search request failed")?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(MatchError::Auth {
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MatchError::Upstream(anyhow::anyhow!(
                "job search returned {}: {}",
                status,
                body
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .context("Failed to parse job search response")?;

        Ok(parsed.results)
    }
}

/// Fold one page of raw results into the accumulator: drop postings
/// with neither title nor company, collapse duplicates by identity
/// key, stop at `limit`.
fn absorb_page(
    postings: &mut Vec<JobPosting>,
    seen: &mut HashSet<String>,
    results: Vec<RawPosting>,
    limit: usize,
    snippet_chars: usize,
) {
    for raw in results {
        if postings.len() >= limit {
            break;
        }
        let title = raw.title.unwrap_or_default();
        let company = raw
            .company
            .and_then(|c| c.display_name)
            .unwrap_or_default();
        if title.is_empty() && company.is_empty() {
            continue;
        }

        let key = JobPosting::identity_key(raw.id.as_deref(), &title, &company);
        if !seen.insert(key) {
            continue;
        }

        postings.push(JobPosting {
            title,
            company,
            location: raw.location.and_then(|l| l.display_name),
            description: snippet(
                raw.description.as_deref().unwrap_or_default(),
                snippet_chars,
            ),
            url: raw.redirect_url,
        });
    }
}

/// Walk the query x location cross-product in order, at most one page
/// per pair. Auth failures abort the whole search; any other failed
/// pair is abandoned, not retried.
async fn fan_out(
    fetcher: &(impl PageFetcher + Sync),
    plan: &[String],
    locations: &[String],
    limit: usize,
    snippet_chars: usize,
    pacing_ms: u64,
) -> Result<Vec<JobPosting>, MatchError> {
    let mut seen = HashSet::new();
    let mut postings: Vec<JobPosting> = Vec::new();

    'fan_out: for query in plan {
        for location in locations {
            if postings.len() >= limit {
                break 'fan_out;
            }

            let results = match fetcher.page(query, location).await {
                Ok(results) => results,
                Err(auth @ MatchError::Auth { .. }) => return Err(auth),
                Err(e) => {
                    warn!("Skipping query '{}' at '{}': {}", query, location, e);
                    continue;
                }
            };

            absorb_page(&mut postings, &mut seen, results, limit, snippet_chars);

            // Pace requests to stay inside the API rate limit.
            tokio::time::sleep(std::time::Duration::from_millis(pacing_ms)).await;
        }
    }

    Ok(postings)
}

#[async_trait]
impl JobSource for ApiJobSearch {
    async fn find_jobs(
        &self,
        _resume_text: &str,
        queries: &[String],
        limit: usize,
    ) -> Result<Vec<JobPosting>, MatchError> {
        let plan = self.query_plan(queries);
        info!(
            "Fanning out over {} queries x {} locations (target {})",
            plan.len(),
            self.settings.locations.len(),
            limit
        );

        let postings = fan_out(
            self,
            &plan,
            &self.settings.locations,
            limit,
            self.settings.snippet_chars,
            self.settings.pacing_ms,
        )
        .await?;

        info!("Collected {} unique postings", postings.len());
        Ok(postings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchApiConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn search(settings: SearchSettings) -> ApiJobSearch {
        let api = SearchApiConfig {
            app_id: Some("id".to_string()),
            app_key: Some("key".to_string()),
            base_url: "https://api.adzuna.com/v1/api/jobs".to_string(),
            country: "gb".to_string(),
        };
        ApiJobSearch::new(&api, settings).unwrap()
    }

    fn raw(id: &str, title: &str) -> RawPosting {
        RawPosting {
            id: Some(id.to_string()),
            title: Some(title.to_string()),
            company: Some(RawCompany {
                display_name: Some("Acme".to_string()),
            }),
            location: None,
            description: Some("Build things".to_string()),
            redirect_url: None,
        }
    }

    /// Answers the nth request with whatever the closure says,
    /// counting calls along the way.
    struct StubFetcher<F>
    where
        F: Fn(usize) -> Result<Vec<RawPosting>, MatchError> + Send + Sync,
    {
        calls: AtomicUsize,
        respond: F,
    }

    impl<F> StubFetcher<F>
    where
        F: Fn(usize) -> Result<Vec<RawPosting>, MatchError> + Send + Sync,
    {
        fn new(respond: F) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                respond,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl<F> PageFetcher for StubFetcher<F>
    where
        F: Fn(usize) -> Result<Vec<RawPosting>, MatchError> + Send + Sync,
    {
        async fn page(&self, _query: &str, _location: &str) -> Result<Vec<RawPosting>, MatchError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            (self.respond)(n)
        }
    }

    fn plan(queries: &[&str]) -> Vec<String> {
        queries.iter().map(|q| q.to_string()).collect()
    }

    #[tokio::test]
    async fn test_fan_out_requests_each_pair_at_most_once() {
        let fetcher = StubFetcher::new(|_| Ok(Vec::new()));
        let postings = fan_out(
            &fetcher,
            &plan(&["Backend Developer", "Data Engineer"]),
            &plan(&["London", ""]),
            20,
            300,
            0,
        )
        .await
        .unwrap();

        assert!(postings.is_empty());
        // 2 queries x 2 locations, no retries for empty pages.
        assert_eq!(fetcher.call_count(), 4);
    }

    #[tokio::test]
    async fn test_fan_out_stops_once_limit_reached() {
        let fetcher = StubFetcher::new(|n| {
            Ok((0..5)
                .map(|i| raw(&format!("page{}-{}", n, i), "Engineer"))
                .collect())
        });
        let postings = fan_out(
            &fetcher,
            &plan(&["Backend Developer", "Data Engineer"]),
            &plan(&["London", ""]),
            3,
            300,
            0,
        )
        .await
        .unwrap();

        assert_eq!(postings.len(), 3);
        // The first page already fills the target; no further pairs.
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fan_out_collapses_shared_id_across_pairs() {
        // Every pair returns the same listing under the same id.
        let fetcher = StubFetcher::new(|_| Ok(vec![raw("ad-1", "Engineer")]));
        let postings = fan_out(
            &fetcher,
            &plan(&["Engineer"]),
            &plan(&["London", "Manchester", ""]),
            20,
            300,
            0,
        )
        .await
        .unwrap();

        assert_eq!(postings.len(), 1);
        assert_eq!(fetcher.call_count(), 3);
    }

    #[tokio::test]
    async fn test_fan_out_aborts_on_auth_failure() {
        let fetcher = StubFetcher::new(|_| Err(MatchError::Auth { status: 401 }));
        let err = fan_out(
            &fetcher,
            &plan(&["Backend Developer", "Data Engineer"]),
            &plan(&["London", ""]),
            20,
            300,
            0,
        )
        .await
        .unwrap_err();

        assert_eq!(err.code(), "AUTH_ERROR");
        // Nothing after the failing request.
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fan_out_skips_failed_pair_and_continues() {
        let fetcher = StubFetcher::new(|n| {
            if n == 0 {
                Err(MatchError::Upstream(anyhow::anyhow!("connection reset")))
            } else {
                Ok(vec![raw(&format!("ad-{}", n), "Engineer")])
            }
        });
        let postings = fan_out(&fetcher, &plan(&["Engineer"]), &plan(&["London", ""]), 20, 300, 0)
            .await
            .unwrap();

        assert_eq!(postings.len(), 1);
        assert_eq!(fetcher.call_count(), 2);
    }

    #[test]
    fn test_absorb_page_dedupes_and_respects_limit() {
        let mut postings = Vec::new();
        let mut seen = HashSet::new();

        absorb_page(
            &mut postings,
            &mut seen,
            vec![raw("ad-1", "Engineer"), raw("ad-1", "Engineer (repost)")],
            5,
            300,
        );
        assert_eq!(postings.len(), 1);

        absorb_page(
            &mut postings,
            &mut seen,
            (0..10).map(|i| raw(&format!("ad-x{}", i), "Analyst")).collect(),
            3,
            300,
        );
        assert_eq!(postings.len(), 3);
        assert_eq!(postings[0].title, "Engineer");
    }

    #[test]
    fn test_missing_credentials_fail_at_construction() {
        let api = SearchApiConfig {
            app_id: Some("id".to_string()),
            app_key: None,
            base_url: String::new(),
            country: "gb".to_string(),
        };
        let err = ApiJobSearch::new(&api, SearchSettings::default()).unwrap_err();
        assert_eq!(err.code(), "MISSING_CREDENTIAL");
    }

    #[test]
    fn test_query_plan_priority_order() {
        let mut settings = SearchSettings::default();
        settings.priority_roles = vec!["Site Reliability Engineer".to_string()];
        settings.fallback_titles = vec!["Developer".to_string()];
        let search = search(settings);

        let plan = search.query_plan(&["Data Engineer".to_string(), "Rust".to_string()]);
        assert_eq!(
            plan,
            vec!["Data Engineer", "Rust", "Site Reliability Engineer", "Developer"]
        );
    }

    #[test]
    fn test_query_plan_dedupes_case_insensitively() {
        let mut settings = SearchSettings::default();
        settings.priority_roles = vec!["Backend Developer".to_string()];
        settings.fallback_titles = vec![];
        let search = search(settings);

        let plan = search.query_plan(&["backend developer".to_string()]);
        assert_eq!(plan, vec!["backend developer"]);
    }

    #[test]
    fn test_query_plan_skips_blank_entries() {
        let mut settings = SearchSettings::default();
        settings.priority_roles = vec![];
        settings.fallback_titles = vec!["Engineer".to_string()];
        let search = search(settings);

        let plan = search.query_plan(&["  ".to_string()]);
        assert_eq!(plan, vec!["Engineer"]);
    }

    #[test]
    fn test_response_parsing_tolerates_missing_fields() {
        let body = r#"{
            "results": [
                {"id": "1", "title": "Rust Engineer",
                 "company": {"display_name": "Acme"},
                 "location": {"display_name": "London"},
                 "description": "Build\nthings",
                 "redirect_url": "https://example.com/1"},
                {"title": "Mystery Role"}
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.results.len(), 2);
        assert_eq!(parsed.results[0].id.as_deref(), Some("1"));
        assert!(parsed.results[1].company.is_none());
    }

    #[test]
    fn test_empty_results_body_parses() {
        let parsed: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.results.is_empty());
    }
}
