//! Triage classification parsing from model output.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Response and inference errors.
#[derive(Error, Debug)]
pub enum ResponseError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    #[error("Model inference error: {0}")]
    Inference(String),
}

pub type ResponseResult<T> = Result<T, ResponseError>;

/// Raw triage judgement as returned by the model.
///
/// Numbers are kept as `f64` because providers are free to answer `7.5`
/// where an integer was asked for; range checks happen downstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriageResponse {
    #[serde(alias = "isValidMedicalSymptom")]
    pub is_valid_medical_symptom: bool,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default, alias = "urgencyScale")]
    pub urgency_scale: f64,
    #[serde(default)]
    pub justification: String,
}

/// Parse model output into a triage response.
pub fn parse_triage_response(text: &str) -> ResponseResult<TriageResponse> {
    // Models sometimes wrap the object in prose or code fences
    let json_start = text.find('{').ok_or_else(|| {
        ResponseError::InvalidFormat("No JSON object found in response".into())
    })?;
    let json_end = text.rfind('}').ok_or_else(|| {
        ResponseError::InvalidFormat("No closing brace found in response".into())
    })?;
    if json_end < json_start {
        return Err(ResponseError::InvalidFormat(
            "Closing brace precedes opening brace".into(),
        ));
    }

    let response: TriageResponse = serde_json::from_str(&text[json_start..=json_end])?;

    Ok(response)
}
