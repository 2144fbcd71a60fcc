// src/experiences/legacy.rs
//! Import of browser local-storage dumps and export envelopes.
//!
//! Older dumps are a bare JSON array stored under the `mockInterviews` key.
//! Depending on when they were written, elements carry either a flat
//! `experience` string or the decomposed camelCase fields
//! (`interviewRounds`, `technicalQuestions`, ...), sometimes both.
//! Exports written by this crate wrap the records in an envelope that
//! records the schema version.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{ExperienceSections, InterviewExperience};
use crate::core::SCHEMA_VERSION;

/// Local-storage key the browser app kept its records under.
pub const LEGACY_STORAGE_KEY: &str = "mockInterviews";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LegacyDocument {
    Envelope {
        #[serde(default)]
        schema_version: i64,
        experiences: Vec<LegacyRecord>,
    },
    Keyed(std::collections::HashMap<String, Vec<LegacyRecord>>),
    Bare(Vec<LegacyRecord>),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default, alias = "interview_rounds")]
    pub interview_rounds: Option<String>,
    #[serde(default, alias = "technical_questions")]
    pub technical_questions: Option<String>,
    #[serde(default, alias = "system_design")]
    pub system_design: Option<String>,
    #[serde(default, alias = "behavioral_questions")]
    pub behavioral_questions: Option<String>,
    #[serde(default, alias = "overall_experience")]
    pub overall_experience: Option<String>,
    #[serde(default)]
    pub sections: Option<ExperienceSections>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub comments: Option<i64>,
}

/// A normalized record ready for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    pub id: Option<i64>,
    pub company: String,
    pub position: String,
    pub experience: String,
    pub sections: ExperienceSections,
    pub date: Option<NaiveDate>,
    pub comments: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped_ids: Vec<i64>,
    pub rejected: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportDocument {
    pub schema_version: i64,
    pub exported_at: DateTime<Utc>,
    pub experiences: Vec<InterviewExperience>,
}

impl ExportDocument {
    pub fn new(experiences: Vec<InterviewExperience>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            exported_at: Utc::now(),
            experiences,
        }
    }
}

impl LegacyRecord {
    /// Normalize into the current shape. `None` when the record has no usable text.
    pub fn into_import_record(self) -> Option<ImportRecord> {
        let company = self.company.trim().to_string();
        let position = self.position.trim().to_string();
        if company.is_empty() || position.is_empty() {
            return None;
        }

        let nested = self.sections.unwrap_or_default();
        let sections = ExperienceSections {
            interview_rounds: self.interview_rounds.or(nested.interview_rounds),
            technical_questions: self.technical_questions.or(nested.technical_questions),
            system_design: self.system_design.or(nested.system_design),
            behavioral_questions: self.behavioral_questions.or(nested.behavioral_questions),
            overall_experience: self.overall_experience.or(nested.overall_experience),
        }
        .normalized();

        let experience = self
            .experience
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .or_else(|| sections.compose())?;

        Some(ImportRecord {
            id: self.id,
            company,
            position,
            experience,
            sections,
            date: self.date.as_deref().and_then(parse_legacy_date),
            comments: self.comments.unwrap_or(0).max(0),
        })
    }
}

/// Dates were written as `toISOString().split('T')[0]`; accept full timestamps too.
fn parse_legacy_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Parse a dump into import records plus the number of rejected elements.
pub fn parse_document(json: &str) -> Result<(Vec<ImportRecord>, usize)> {
    let document: LegacyDocument =
        serde_json::from_str(json).context("Failed to parse experience document")?;

    let records = match document {
        LegacyDocument::Envelope {
            schema_version,
            experiences,
        } => {
            if schema_version > SCHEMA_VERSION {
                anyhow::bail!(
                    "Document schema version {} is newer than supported version {}",
                    schema_version,
                    SCHEMA_VERSION
                );
            }
            experiences
        }
        LegacyDocument::Keyed(mut entries) => entries.remove(LEGACY_STORAGE_KEY).with_context(|| {
            format!("Document has no '{}' entry", LEGACY_STORAGE_KEY)
        })?,
        LegacyDocument::Bare(records) => records,
    };

    let total = records.len();
    let converted: Vec<ImportRecord> = records
        .into_iter()
        .filter_map(LegacyRecord::into_import_record)
        .collect();
    let rejected = total - converted.len();

    Ok((converted, rejected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_array_with_flat_experience() {
        let json = r#"[
            {"id": 1, "company": "Google", "position": "Senior Frontend Developer",
             "experience": "Phone screening then five rounds", "date": "2023-05-15"}
        ]"#;

        let (records, rejected) = parse_document(json).unwrap();
        assert_eq!(rejected, 0);
        assert_eq!(records[0].id, Some(1));
        assert_eq!(records[0].experience, "Phone screening then five rounds");
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2023, 5, 15));
        assert!(records[0].sections.is_empty());
    }

    #[test]
    fn test_decomposed_camel_case_fields() {
        let json = r#"[
            {"id": 4, "company": "Meta", "position": "E5",
             "interviewRounds": "Two coding, one design",
             "systemDesign": "News feed ranking",
             "date": "2024-02-01T10:00:00.000Z", "comments": 3}
        ]"#;

        let (records, _) = parse_document(json).unwrap();
        let record = &records[0];
        assert_eq!(
            record.experience,
            "Interview rounds: Two coding, one design\n\nSystem design: News feed ranking"
        );
        assert_eq!(record.sections.system_design.as_deref(), Some("News feed ranking"));
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(record.comments, 3);
    }

    #[test]
    fn test_keyed_local_storage_dump() {
        let json = r#"{"mockInterviews": [
            {"id": 7, "company": "Amazon", "position": "SDE II", "experience": "Bar raiser round"}
        ]}"#;

        let (records, _) = parse_document(json).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, None);
    }

    #[test]
    fn test_records_without_text_are_rejected() {
        let json = r#"[
            {"id": 1, "company": "Google", "position": "SWE"},
            {"id": 2, "company": "", "position": "SWE", "experience": "Some text here"},
            {"id": 3, "company": "Apple", "position": "SWE", "experience": "Kept record"}
        ]"#;

        let (records, rejected) = parse_document(json).unwrap();
        assert_eq!(rejected, 2);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, Some(3));
    }

    #[test]
    fn test_export_envelope_round_trip() {
        let record = InterviewExperience {
            id: 9,
            company: "Stripe".to_string(),
            position: "Backend Engineer".to_string(),
            experience: "API design round".to_string(),
            sections: ExperienceSections {
                overall_experience: Some("Positive".to_string()),
                ..Default::default()
            },
            date: NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
            comments: 1,
        };

        let json = serde_json::to_string(&ExportDocument::new(vec![record])).unwrap();
        let (records, rejected) = parse_document(&json).unwrap();

        assert_eq!(rejected, 0);
        assert_eq!(records[0].id, Some(9));
        assert_eq!(records[0].sections.overall_experience.as_deref(), Some("Positive"));
        assert_eq!(records[0].experience, "API design round");
    }

    #[test]
    fn test_newer_schema_version_refused() {
        let json = r#"{"schema_version": 99, "experiences": []}"#;
        let err = parse_document(json).unwrap_err();
        assert!(err.to_string().contains("newer than supported"));
    }
}
