// src/analysis/mod.rs
//! AI-backed analysis of interview experiences and résumés.
//!
//! Model output is free text that is expected to contain one JSON object.
//! Results deserialize from the model's camelCase keys and serialize in
//! snake_case like the rest of the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::experiences::InterviewExperience;

pub mod fallback;
pub mod gemini_client;
pub mod interview_analyzer;
pub mod json_extract;
pub mod prompts;
pub mod skill_gap;

pub use gemini_client::{GeminiClient, GeminiError, RetryPolicy};
pub use interview_analyzer::InterviewAnalyzer;
pub use json_extract::{extract_json_object, parse_model_json};
pub use skill_gap::SkillGapAnalyzer;

/// The parts of a record sent for interview analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewData {
    pub company: String,
    pub position: String,
    pub experience: String,
}

impl From<&InterviewExperience> for InterviewData {
    fn from(record: &InterviewExperience) -> Self {
        Self {
            company: record.company.clone(),
            position: record.position.clone(),
            experience: record.experience.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all(deserialize = "camelCase"))]
pub struct InterviewAnalysis {
    #[serde(deserialize_with = "null_as_default")]
    pub key_topics: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub important_questions: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub required_skills: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub preparation_tips: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub similar_companies: Vec<String>,
}

impl InterviewAnalysis {
    pub fn truncated(mut self, max_items: usize) -> Self {
        for list in [
            &mut self.key_topics,
            &mut self.important_questions,
            &mut self.required_skills,
            &mut self.preparation_tips,
            &mut self.similar_companies,
        ] {
            list.truncate(max_items);
        }
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all(deserialize = "camelCase"))]
pub struct SkillGapAnalysis {
    #[serde(deserialize_with = "null_as_default")]
    pub matching_skills: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub missing_skills: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub industry_trends: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub recommendations: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub learning_resources: Vec<LearningResource>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningResource {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub resource_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeReview {
    #[serde(deserialize_with = "null_as_default")]
    pub suggestions: Vec<ResumeSuggestion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeSuggestion {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub example: String,
}

/// Models sometimes answer `null` for an empty list or field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Combined result of the skill gap flow.
#[derive(Debug, Clone, Serialize)]
pub struct SkillGapReport {
    pub report_id: Uuid,
    pub job_role: String,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub analysis: SkillGapAnalysis,
    pub resume_suggestions: Vec<ResumeSuggestion>,
    pub used_fallback: bool,
}
