// src/analysis/prompts.rs
//! Prompt builders. Each prompt ends with the exact JSON shape expected back.

use super::InterviewData;

pub fn interview_analysis(data: &InterviewData) -> String {
    format!(
        r#"You are a career coach reviewing an interview report shared by a candidate.

COMPANY: {}
POSITION: {}
REPORT:
{}

Summarize what future candidates for a similar role should expect and how they should prepare.

Reply with a single JSON object and nothing else, using exactly these keys:
{{
  "keyTopics": ["..."],
  "importantQuestions": ["..."],
  "requiredSkills": ["..."],
  "preparationTips": ["..."],
  "similarCompanies": ["..."]
}}

Each list holds at most 5 entries."#,
        data.company, data.position, data.experience
    )
}

pub fn skill_gap(resume: &str, job_role: &str) -> String {
    format!(
        r#"You are a career coach comparing a résumé against a target role.

TARGET ROLE: {}
RÉSUMÉ:
{}

Identify the skills the candidate already has for this role, the skills still missing,
relevant industry trends, concrete next steps, and learning resources
(courses, books or certifications).

Reply with a single JSON object and nothing else, using exactly these keys:
{{
  "matchingSkills": ["..."],
  "missingSkills": ["..."],
  "industryTrends": ["..."],
  "recommendations": ["..."],
  "learningResources": [
    {{ "title": "...", "description": "...", "type": "Course | Book | Certification" }}
  ]
}}"#,
        job_role, resume
    )
}

pub fn resume_review(resume: &str, job_role: &str) -> String {
    format!(
        r#"You are a hiring manager reviewing a résumé for the role below.

TARGET ROLE: {}
RÉSUMÉ:
{}

Give 5 to 7 specific improvements: stronger phrasing of experience, keywords to highlight,
structure and formatting, content to cut, and sections to add.

Reply with a single JSON object and nothing else, using exactly these keys:
{{
  "suggestions": [
    {{ "title": "...", "description": "...", "example": "..." }}
  ]
}}"#,
        job_role, resume
    )
}
