//! Result validation. Turns the completion text into a structured record or keeps it raw.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::llm_client::strip_json_fences;

/// Sentinel the prompt asks the model to use for fields it cannot find.
pub const MISSING_FIELD: &str = "No idea";

/// The six fields requested from the model, in prompt order.
pub const EXPECTED_FIELDS: [&str; 6] = [
    "Name",
    "LinkedIn",
    "Skills",
    "Education",
    "Experience",
    "Projects",
];

/// A candidate summary returned by the model.
///
/// Any JSON object is accepted. Expected fields that are absent or null are filled
/// with [`MISSING_FIELD`]; keys outside [`EXPECTED_FIELDS`] are kept as returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CandidateRecord {
    fields: Map<String, Value>,
}

impl CandidateRecord {
    pub fn from_fields(mut fields: Map<String, Value>) -> Self {
        for key in EXPECTED_FIELDS {
            let missing = fields.get(key).map_or(true, Value::is_null);
            if missing {
                fields.insert(key.to_string(), Value::String(MISSING_FIELD.to_string()));
            }
        }
        Self { fields }
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    #[cfg(test)]
    /// String value of `key`, if it holds one.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    #[cfg(test)]
    /// String items of `key`, if it holds an array. Non-string items are skipped.
    pub fn list(&self, key: &str) -> Option<Vec<&str>> {
        self.get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// Outcome of validating one completion response.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Structured(CandidateRecord),
    /// The response was not a JSON object; carries the response unchanged.
    RawText(String),
}

/// Parses `response_text` as a JSON object, or falls back to the raw text.
/// A single surrounding markdown code fence is ignored. Never fails.
pub fn validate(response_text: &str) -> ParseOutcome {
    match serde_json::from_str::<Map<String, Value>>(strip_json_fences(response_text)) {
        Ok(fields) => ParseOutcome::Structured(CandidateRecord::from_fields(fields)),
        Err(e) => {
            warn!(
                "Completion response is not a JSON object ({e}), returning raw text ({} chars)",
                response_text.chars().count()
            );
            ParseOutcome::RawText(response_text.to_string())
        }
    }
}
