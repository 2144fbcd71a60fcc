// src/experiences/search.rs
use super::InterviewExperience;

/// Case-insensitive substring match over company, position and experience.
pub fn matches_query(record: &InterviewExperience, query: &str) -> bool {
    let needle = query.to_lowercase();
    [&record.company, &record.position, &record.experience]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Records matching `query`, in their original order. A blank query keeps
/// everything; any other query is matched as typed, surrounding spaces included.
pub fn filter_experiences(
    records: Vec<InterviewExperience>,
    query: Option<&str>,
) -> Vec<InterviewExperience> {
    match query.filter(|q| !q.trim().is_empty()) {
        None => records,
        Some(q) => records
            .into_iter()
            .filter(|record| matches_query(record, q))
            .collect(),
    }
}
