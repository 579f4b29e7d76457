// src/summarizer.rs
//! Chat-completion client used for résumé feedback and profile
//! summarization. The response text is free-form and untrusted; the
//! candidate extractor downstream tolerates any formatting drift.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::OpenAiConfig;
use crate::error::MatchError;

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const MAX_FEEDBACK_TOKENS: u32 = 600;

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug)]
pub struct Summarizer {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl Summarizer {
    /// Build a client from explicit configuration. Fails immediately
    /// when the credential is absent instead of producing
    /// authentication errors downstream.
    pub fn new(config: &OpenAiConfig) -> Result<Self, MatchError> {
        let api_key = config.require_key()?.to_string();

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
        })
    }

    /// ATS-style feedback on the résumé for a target role: match
    /// score, missing keywords, improvements, rewritten bullets.
    pub async fn resume_feedback(&self, resume_text: &str, target_role: &str) -> Result<String> {
        let prompt = format!(
            "Resume Text: {resume_text}\n\n\
             Task:\n\
             1. Give an ATS Match Score (0-100) for the target role: {target_role}.\n\
             2. List 5 most important missing keywords.\n\
             3. Suggest 3 improvements to make it recruiter-friendly.\n\
             4. Rewrite 3 work experience bullet points using impact + keywords."
        );

        self.send_completion(
            "You are a professional resume coach and ATS expert.",
            &prompt,
        )
        .await
    }

    /// A short free-form profile summary, nudged to include the
    /// headings the candidate extractor looks for. No schema is
    /// guaranteed or assumed.
    pub async fn profile_summary(&self, resume_text: &str) -> Result<String> {
        let prompt = format!(
            "Summarize this resume for a job search.\n\n\
             Resume Text: {resume_text}\n\n\
             Include a line starting with 'Suggested job titles:' listing 3-5 roles, \
             and a line starting with 'Technical skills:' listing the main skills, \
             both comma-separated."
        );

        self.send_completion("You are a professional career advisor.", &prompt)
            .await
    }

    async fn send_completion(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            max_tokens: MAX_FEEDBACK_TOKENS,
            temperature: 0.7,
        };

        let url = format!("{}{}", self.base_url, CHAT_COMPLETIONS_PATH);
        info!("Calling chat completion endpoint: {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send chat completion request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Chat completion returned {}: {}", status, error_text);
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat completion response")?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .context("Chat completion response had no choices")?;

        Ok(content.trim().to_string())
    }
}
