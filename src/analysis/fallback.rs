// src/analysis/fallback.rs
//! Static content returned when the model call fails or its output is unusable.

use super::{LearningResource, ResumeReview, ResumeSuggestion, SkillGapAnalysis};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn skill_gap() -> SkillGapAnalysis {
    SkillGapAnalysis {
        matching_skills: strings(&["Communication", "Problem solving", "Teamwork"]),
        missing_skills: strings(&[
            "Role-specific technical depth",
            "Cloud platforms",
            "System design",
        ]),
        industry_trends: strings(&[
            "AI-assisted tooling is becoming part of everyday workflows",
            "Cloud-native architectures keep displacing on-premise systems",
            "Employers weigh demonstrable projects over credentials alone",
        ]),
        recommendations: strings(&[
            "Compare your résumé line by line with several postings for the role",
            "Build a small portfolio project that exercises the missing skills",
            "Quantify the impact of your past work with concrete numbers",
        ]),
        learning_resources: vec![
            LearningResource {
                title: "Designing Data-Intensive Applications".to_string(),
                description: "Foundations of reliable, scalable and maintainable systems".to_string(),
                resource_type: "Book".to_string(),
            },
            LearningResource {
                title: "Cloud practitioner certification".to_string(),
                description: "Entry-level certification from any major cloud provider".to_string(),
                resource_type: "Certification".to_string(),
            },
        ],
    }
}

pub fn resume_review() -> ResumeReview {
    ResumeReview {
        suggestions: vec![
            ResumeSuggestion {
                title: "Lead with outcomes".to_string(),
                description: "Start each bullet with the result you delivered, then how.".to_string(),
                example: "Cut checkout latency by 40% by introducing a read-through cache".to_string(),
            },
            ResumeSuggestion {
                title: "Mirror the job description".to_string(),
                description: "Use the same keywords the posting uses for skills you actually have.".to_string(),
                example: "Rename \"web stuff\" to \"React, TypeScript, REST APIs\"".to_string(),
            },
            ResumeSuggestion {
                title: "Add a skills summary".to_string(),
                description: "A short section near the top helps screeners match you quickly.".to_string(),
                example: "Skills: Rust, PostgreSQL, Kubernetes, CI/CD".to_string(),
            },
        ],
    }
}
