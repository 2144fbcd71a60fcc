// src/analysis/json_extract.rs
use anyhow::{Context, Result};
use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::LazyLock;

// Greedy: first '{' through last '}', so prose around the object is ignored.
static JSON_OBJECT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").unwrap());

/// The outermost `{...}` span of free-form model output.
pub fn extract_json_object(text: &str) -> Option<&str> {
    JSON_OBJECT.find(text).map(|m| m.as_str())
}

/// Locate the JSON object in `text` and deserialize it.
pub fn parse_model_json<T: DeserializeOwned>(text: &str) -> Result<T> {
    let json = extract_json_object(text).context("Could not extract JSON from the response")?;
    serde_json::from_str(json).context("Model response JSON did not match the expected shape")
}
