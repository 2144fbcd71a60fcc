// src/analysis/interview_analyzer.rs
use anyhow::{Context, Result};
use tracing::info;

use super::{json_extract::parse_model_json, prompts, GeminiClient, InterviewAnalysis, InterviewData};

pub const MAX_ITEMS_PER_LIST: usize = 5;
const MAX_OUTPUT_TOKENS: u32 = 2048;

/// Preparation guidance derived from a single interview report.
pub struct InterviewAnalyzer<'a> {
    client: &'a GeminiClient,
}

impl<'a> InterviewAnalyzer<'a> {
    pub fn new(client: &'a GeminiClient) -> Self {
        Self { client }
    }

    pub async fn analyze(&self, data: &InterviewData) -> Result<InterviewAnalysis> {
        info!(
            "Analyzing interview experience: {} - {}",
            data.company, data.position
        );

        let text = self
            .client
            .generate(&prompts::interview_analysis(data), MAX_OUTPUT_TOKENS)
            .await?;

        let analysis: InterviewAnalysis =
            parse_model_json(&text).context("Failed to read interview analysis")?;

        info!("Interview analysis completed for {}", data.company);
        Ok(analysis.truncated(MAX_ITEMS_PER_LIST))
    }
}
