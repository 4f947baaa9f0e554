//! Parsing of raw model output into a [`WorkoutBody`].

use fitgen_db::models::WorkoutBody;

/// Errors from interpreting model output.
#[derive(Debug, thiserror::Error)]
pub enum ResponseParseError {
    #[error("model returned an empty response")]
    Empty,

    #[error("model response is not valid workout JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("workout is missing a warm-up, main or cool-down segment")]
    MissingSegment,
}

/// Remove Markdown code fences the model tends to wrap JSON in.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Parse model text into a complete workout body.
pub fn parse_workout_response(raw: &str) -> Result<WorkoutBody, ResponseParseError> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return Err(ResponseParseError::Empty);
    }
    let body: WorkoutBody = serde_json::from_str(cleaned)?;
    if !body.has_all_segments() {
        return Err(ResponseParseError::MissingSegment);
    }
    Ok(body)
}
