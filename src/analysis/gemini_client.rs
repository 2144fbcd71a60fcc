// src/analysis/gemini_client.rs
//! Client for the generative-language `generateContent` endpoint

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::core::GeminiConfig;

const TEMPERATURE: f32 = 0.4;
const TOP_K: u32 = 32;
const TOP_P: f32 = 0.95;

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("Gemini API key is not configured")]
    MissingApiKey,
    #[error("Gemini API rate limit exceeded after {attempts} attempts")]
    RateLimited { attempts: u32 },
    #[error("Gemini API returned error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Failed to reach Gemini API: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Gemini response contained no text")]
    EmptyResponse,
    #[error("Failed to parse Gemini response: {0}")]
    Malformed(String),
}

/// Retries on HTTP 429 only, doubling the delay each time.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `retry` (0-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << retry.min(16))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(1000),
        }
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl GenerateContentResponse {
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    retry: RetryPolicy,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            retry: RetryPolicy {
                max_retries: config.max_retries,
                base_delay: Duration::from_millis(config.retry_base_delay_ms),
            },
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Send `prompt` and return the first candidate's text.
    pub async fn generate(&self, prompt: &str, max_output_tokens: u32) -> Result<String, GeminiError> {
        let api_key = self.api_key.as_deref().ok_or(GeminiError::MissingApiKey)?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                top_k: TOP_K,
                top_p: TOP_P,
                max_output_tokens,
            },
        };

        let mut retries = 0;
        loop {
            info!(
                "Sending request to Gemini model {} (attempt {})",
                self.model,
                retries + 1
            );

            let response = self
                .client
                .post(&url)
                .query(&[("key", api_key)])
                .json(&request)
                .send()
                .await?;

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                if retries < self.retry.max_retries {
                    let delay = self.retry.delay_for(retries);
                    warn!(
                        "Gemini API rate limited, retrying in {} ms ({}/{})",
                        delay.as_millis(),
                        retries + 1,
                        self.retry.max_retries
                    );
                    tokio::time::sleep(delay).await;
                    retries += 1;
                    continue;
                }

                error!("Gemini API still rate limited after {} retries", retries);
                return Err(GeminiError::RateLimited {
                    attempts: retries + 1,
                });
            }

            let body = response.text().await?;

            if !status.is_success() {
                let message = serde_json::from_str::<ApiErrorBody>(&body)
                    .map(|parsed| parsed.error.message)
                    .unwrap_or(body);
                error!("Gemini API error {}: {}", status, message);
                return Err(GeminiError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let parsed: GenerateContentResponse = serde_json::from_str(&body)
                .map_err(|e| GeminiError::Malformed(e.to_string()))?;

            info!("Received response from Gemini model {}", self.model);
            return parsed.into_text().ok_or(GeminiError::EmptyResponse);
        }
    }
}
