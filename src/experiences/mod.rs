// src/experiences/mod.rs
//! Interview experience records: the entity, submissions and validation

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod legacy;
pub mod repository;
pub mod search;

pub use legacy::{ExportDocument, ImportSummary, LegacyDocument};
pub use repository::ExperienceRepository;
pub use search::{filter_experiences, matches_query};

const MIN_COMPANY_CHARS: usize = 2;
const MIN_POSITION_CHARS: usize = 2;
const MIN_EXPERIENCE_CHARS: usize = 10;

/// Optional breakdown of an experience into interview stages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceSections {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_rounds: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_questions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_design: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavioral_questions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_experience: Option<String>,
}

impl ExperienceSections {
    pub fn is_empty(&self) -> bool {
        self.labelled().iter().all(|(_, text)| text.is_none())
    }

    fn labelled(&self) -> [(&'static str, Option<&str>); 5] {
        [
            ("Interview rounds", self.interview_rounds.as_deref()),
            ("Technical questions", self.technical_questions.as_deref()),
            ("System design", self.system_design.as_deref()),
            ("Behavioral questions", self.behavioral_questions.as_deref()),
            ("Overall experience", self.overall_experience.as_deref()),
        ]
    }

    /// Trim every section and drop the blank ones.
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            interview_rounds: clean(self.interview_rounds),
            technical_questions: clean(self.technical_questions),
            system_design: clean(self.system_design),
            behavioral_questions: clean(self.behavioral_questions),
            overall_experience: clean(self.overall_experience),
        }
    }

    /// Flat narrative built from the non-empty sections, one paragraph each.
    pub fn compose(&self) -> Option<String> {
        let paragraphs: Vec<String> = self
            .labelled()
            .iter()
            .filter_map(|(label, text)| {
                text.map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(|t| format!("{}: {}", label, t))
            })
            .collect();

        if paragraphs.is_empty() {
            None
        } else {
            Some(paragraphs.join("\n\n"))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewExperience {
    pub id: i64,
    pub company: String,
    pub position: String,
    pub experience: String,
    #[serde(default, skip_serializing_if = "ExperienceSections::is_empty")]
    pub sections: ExperienceSections,
    pub date: NaiveDate,
    #[serde(default)]
    pub comments: i64,
}

/// A submission, before an id and date are assigned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewExperience {
    pub company: String,
    pub position: String,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub sections: ExperienceSections,
}

/// A submission that passed validation, with trimmed fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedExperience {
    pub company: String,
    pub position: String,
    pub experience: String,
    pub sections: ExperienceSections,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ExperienceValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ExperienceValidationError {
    fn too_short(field: &'static str, label: &str, min: usize) -> Self {
        Self {
            field,
            message: format!("{} must be at least {} characters.", label, min),
        }
    }
}

impl NewExperience {
    /// The flat experience text, composed from sections when absent.
    pub fn effective_experience(&self) -> Option<String> {
        self.experience
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .or_else(|| self.sections.compose())
    }

    pub fn validate(&self) -> Result<ValidatedExperience, ExperienceValidationError> {
        let company = self.company.trim();
        if company.chars().count() < MIN_COMPANY_CHARS {
            return Err(ExperienceValidationError::too_short(
                "company",
                "Company",
                MIN_COMPANY_CHARS,
            ));
        }

        let position = self.position.trim();
        if position.chars().count() < MIN_POSITION_CHARS {
            return Err(ExperienceValidationError::too_short(
                "position",
                "Position",
                MIN_POSITION_CHARS,
            ));
        }

        let experience = self.effective_experience().unwrap_or_default();
        if experience.chars().count() < MIN_EXPERIENCE_CHARS {
            return Err(ExperienceValidationError::too_short(
                "experience",
                "Experience",
                MIN_EXPERIENCE_CHARS,
            ));
        }

        Ok(ValidatedExperience {
            company: company.to_string(),
            position: position.to_string(),
            experience,
            sections: self.sections.clone().normalized(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(company: &str, position: &str, experience: &str) -> NewExperience {
        NewExperience {
            company: company.to_string(),
            position: position.to_string(),
            experience: Some(experience.to_string()),
            sections: ExperienceSections::default(),
        }
    }

    #[test]
    fn test_validate_trims_fields() {
        let validated = submission("  Stripe ", " Backend Engineer ", " Two rounds of pairing. ")
            .validate()
            .unwrap();

        assert_eq!(validated.company, "Stripe");
        assert_eq!(validated.position, "Backend Engineer");
        assert_eq!(validated.experience, "Two rounds of pairing.");
    }

    #[test]
    fn test_validate_rejects_short_fields() {
        let err = submission("X", "Engineer", "Long enough text").validate().unwrap_err();
        assert_eq!(err.field, "company");

        let err = submission("Meta", "E", "Long enough text").validate().unwrap_err();
        assert_eq!(err.field, "position");

        let err = submission("Meta", "Engineer", "too short").validate().unwrap_err();
        assert_eq!(err.field, "experience");
        assert_eq!(err.message, "Experience must be at least 10 characters.");
    }

    #[test]
    fn test_experience_composed_from_sections() {
        let new = NewExperience {
            company: "Netflix".to_string(),
            position: "SRE".to_string(),
            experience: None,
            sections: ExperienceSections {
                interview_rounds: Some("Phone screen then onsite".to_string()),
                system_design: Some("  Design a CDN  ".to_string()),
                overall_experience: Some("   ".to_string()),
                ..Default::default()
            },
        };

        let validated = new.validate().unwrap();
        assert_eq!(
            validated.experience,
            "Interview rounds: Phone screen then onsite\n\nSystem design: Design a CDN"
        );
        assert_eq!(validated.sections.overall_experience, None);
        assert_eq!(validated.sections.system_design.as_deref(), Some("Design a CDN"));
    }

    #[test]
    fn test_flat_experience_takes_precedence() {
        let mut new = submission("Apple", "iOS Engineer", "Flat narrative of the loop");
        new.sections.technical_questions = Some("Swift concurrency".to_string());

        assert_eq!(
            new.effective_experience().as_deref(),
            Some("Flat narrative of the loop")
        );
    }

    #[test]
    fn test_sections_skipped_when_empty_in_json() {
        let record = InterviewExperience {
            id: 1,
            company: "Google".to_string(),
            position: "SWE".to_string(),
            experience: "Five rounds".to_string(),
            sections: ExperienceSections::default(),
            date: NaiveDate::from_ymd_opt(2023, 5, 15).unwrap(),
            comments: 0,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("sections").is_none());
        assert_eq!(json["date"], "2023-05-15");
    }
}
