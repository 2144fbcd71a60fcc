// src/analysis/skill_gap.rs
//! Résumé versus target role: skill gap analysis plus résumé suggestions.

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    fallback, json_extract::parse_model_json, prompts, GeminiClient, ResumeReview,
    SkillGapAnalysis, SkillGapReport,
};

pub const MAX_RESUME_CHARS: usize = 10_000;
const MAX_OUTPUT_TOKENS: u32 = 8192;

/// Cap the résumé at `MAX_RESUME_CHARS`, marking the cut with "...".
pub fn trim_resume(resume: &str) -> String {
    match resume.char_indices().nth(MAX_RESUME_CHARS) {
        Some((byte_index, _)) => format!("{}...", &resume[..byte_index]),
        None => resume.to_string(),
    }
}

pub struct SkillGapAnalyzer<'a> {
    client: &'a GeminiClient,
}

impl<'a> SkillGapAnalyzer<'a> {
    pub fn new(client: &'a GeminiClient) -> Self {
        Self { client }
    }

    pub async fn analyze_skill_gap(&self, resume: &str, job_role: &str) -> Result<SkillGapAnalysis> {
        let text = self
            .client
            .generate(&prompts::skill_gap(resume, job_role), MAX_OUTPUT_TOKENS)
            .await?;
        parse_model_json(&text).context("Failed to read skill gap analysis")
    }

    pub async fn analyze_resume(&self, resume: &str, job_role: &str) -> Result<ResumeReview> {
        let text = self
            .client
            .generate(&prompts::resume_review(resume, job_role), MAX_OUTPUT_TOKENS)
            .await?;
        parse_model_json(&text).context("Failed to read résumé review")
    }

    /// Run both analyses one after the other. Never fails: each part that
    /// cannot be produced is replaced by its static fallback.
    pub async fn run(&self, resume: &str, job_role: &str) -> SkillGapReport {
        let report_id = Uuid::new_v4();
        let resume = trim_resume(resume);
        let job_role = job_role.trim();
        let mut used_fallback = false;

        info!("Skill gap analysis {} started for role: {}", report_id, job_role);

        let analysis = match self.analyze_skill_gap(&resume, job_role).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!("Skill gap analysis {} failed, using fallback: {:#}", report_id, e);
                used_fallback = true;
                fallback::skill_gap()
            }
        };

        let review = match self.analyze_resume(&resume, job_role).await {
            Ok(review) => review,
            Err(e) => {
                warn!("Résumé review {} failed, using fallback: {:#}", report_id, e);
                used_fallback = true;
                fallback::resume_review()
            }
        };

        info!(
            "Skill gap analysis {} completed (fallback: {})",
            report_id, used_fallback
        );

        SkillGapReport {
            report_id,
            job_role: job_role.to_string(),
            generated_at: Utc::now(),
            analysis,
            resume_suggestions: review.suggestions,
            used_fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::gemini_client::tests::{candidate_body, test_config, GENERATE_PATH};
    use crate::core::GeminiConfig;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SKILL_GAP_OUTPUT: &str = r#"{
        "matchingSkills": ["Rust", "SQL"],
        "missingSkills": ["Kubernetes"],
        "industryTrends": ["Platform engineering"],
        "recommendations": ["Deploy a side project on a cluster"],
        "learningResources": [{"title": "CKAD", "description": "App developer cert", "type": "Certification"}]
    }"#;

    const RESUME_OUTPUT: &str = r#"```json
    {"suggestions": [{"title": "Quantify impact", "description": "Add numbers", "example": "Reduced p99 by 30%"}]}
    ```"#;

    async fn mount_skill_gap(server: &MockServer, template: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(body_string_contains("matchingSkills"))
            .respond_with(template)
            .expect(1)
            .mount(server)
            .await;
    }

    async fn mount_resume(server: &MockServer, template: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(body_string_contains("suggestions"))
            .respond_with(template)
            .expect(1)
            .mount(server)
            .await;
    }

    #[test]
    fn test_trim_resume() {
        assert_eq!(trim_resume("short"), "short");

        let exact = "a".repeat(MAX_RESUME_CHARS);
        assert_eq!(trim_resume(&exact), exact);

        let long = "é".repeat(MAX_RESUME_CHARS + 5);
        let trimmed = trim_resume(&long);
        assert!(trimmed.ends_with("..."));
        assert_eq!(trimmed.chars().count(), MAX_RESUME_CHARS + 3);
    }

    #[tokio::test]
    async fn test_report_combines_both_calls() {
        let server = MockServer::start().await;
        mount_skill_gap(
            &server,
            ResponseTemplate::new(200).set_body_json(candidate_body(SKILL_GAP_OUTPUT)),
        )
        .await;
        mount_resume(
            &server,
            ResponseTemplate::new(200).set_body_json(candidate_body(RESUME_OUTPUT)),
        )
        .await;

        let client = GeminiClient::new(&test_config(&server.uri())).unwrap();
        let report = SkillGapAnalyzer::new(&client)
            .run("Rust developer, five years of SQL", " Platform Engineer ")
            .await;

        assert!(!report.used_fallback);
        assert_eq!(report.job_role, "Platform Engineer");
        assert_eq!(report.analysis.matching_skills, vec!["Rust", "SQL"]);
        assert_eq!(report.resume_suggestions[0].title, "Quantify impact");
    }

    #[tokio::test]
    async fn test_unparseable_skill_gap_uses_fallback() {
        let server = MockServer::start().await;
        mount_skill_gap(
            &server,
            ResponseTemplate::new(200).set_body_json(candidate_body("Sorry, no JSON today")),
        )
        .await;
        mount_resume(
            &server,
            ResponseTemplate::new(200).set_body_json(candidate_body(RESUME_OUTPUT)),
        )
        .await;

        let client = GeminiClient::new(&test_config(&server.uri())).unwrap();
        let report = SkillGapAnalyzer::new(&client).run("resume", "Data Engineer").await;

        assert!(report.used_fallback);
        assert_eq!(report.analysis, fallback::skill_gap());
        assert_eq!(report.resume_suggestions[0].title, "Quantify impact");
    }

    #[tokio::test]
    async fn test_failed_calls_yield_fallback_content() {
        let server = MockServer::start().await;
        mount_skill_gap(&server, ResponseTemplate::new(500)).await;
        mount_resume(&server, ResponseTemplate::new(500)).await;

        let client = GeminiClient::new(&test_config(&server.uri())).unwrap();
        let report = SkillGapAnalyzer::new(&client).run("resume", "Data Engineer").await;

        assert!(report.used_fallback);
        assert_eq!(report.analysis, fallback::skill_gap());
        assert_eq!(report.resume_suggestions, fallback::resume_review().suggestions);
    }

    #[tokio::test]
    async fn test_unconfigured_client_yields_fallback() {
        let client = GeminiClient::new(&GeminiConfig::default()).unwrap();
        let report = SkillGapAnalyzer::new(&client).run("resume", "Designer").await;

        assert!(report.used_fallback);
        assert!(!report.analysis.matching_skills.is_empty());
    }
}
