//! Classification gateway.
//!
//! Pipeline: length check → prompt → model call (bounded) → parse → outcome
//!
//! The gateway never invents a triage level. Service failures come back as
//! [`ClassificationOutcome::Unavailable`] and the fallback policy lives in
//! the triage engine, so every intake channel degrades the same way.

mod debounce;

pub use debounce::*;

use std::sync::Arc;
use std::time::Duration;

use qtriage_llm::{build_full_prompt, parse_triage_response, TriageModel};

use crate::config::ClassificationConfig;
use crate::models::{Classification, ClassificationOutcome, SymptomAssessment, TriageLevel};

/// Wraps a [`TriageModel`] and maps its answers to outcomes.
pub struct ClassificationGateway {
    model: Arc<dyn TriageModel>,
    min_symptom_chars: usize,
    timeout: Duration,
}

impl ClassificationGateway {
    /// Create a gateway with default thresholds.
    pub fn new(model: Arc<dyn TriageModel>) -> Self {
        Self::from_config(model, &ClassificationConfig::default())
    }

    /// Create a gateway from configuration.
    pub fn from_config(model: Arc<dyn TriageModel>, config: &ClassificationConfig) -> Self {
        Self {
            model,
            min_symptom_chars: config.min_symptom_chars,
            timeout: config.timeout(),
        }
    }

    /// Classify free-text symptoms and keep the text the outcome judged.
    pub async fn assess(&self, symptoms: &str) -> SymptomAssessment {
        SymptomAssessment {
            symptoms: symptoms.trim().to_string(),
            outcome: self.classify(symptoms).await,
        }
    }

    /// Classify free-text symptoms.
    pub async fn classify(&self, symptoms: &str) -> ClassificationOutcome {
        let symptoms = symptoms.trim();
        if symptoms.chars().count() < self.min_symptom_chars {
            return ClassificationOutcome::Pending;
        }

        let prompt = build_full_prompt(symptoms, true);
        let completion =
            match tokio::time::timeout(self.timeout, self.model.complete(&prompt)).await {
                Ok(Ok(completion)) => completion,
                Ok(Err(e)) => {
                    tracing::warn!(
                        model = self.model.name(),
                        error = %e,
                        "Classification service failed"
                    );
                    return ClassificationOutcome::Unavailable {
                        reason: e.to_string(),
                    };
                }
                Err(_) => {
                    tracing::warn!(
                        model = self.model.name(),
                        timeout_ms = self.timeout.as_millis() as u64,
                        "Classification timed out"
                    );
                    return ClassificationOutcome::Unavailable {
                        reason: format!("timed out after {} ms", self.timeout.as_millis()),
                    };
                }
            };

        interpret_completion(&completion)
    }
}

/// Map a raw model completion to an outcome.
pub fn interpret_completion(completion: &str) -> ClassificationOutcome {
    let response = match parse_triage_response(completion) {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(error = %e, "Unparseable classification response");
            return ClassificationOutcome::Unavailable {
                reason: e.to_string(),
            };
        }
    };

    if !response.is_valid_medical_symptom {
        tracing::info!(
            justification = %response.justification,
            "Symptom text rejected as non-medical"
        );
        return ClassificationOutcome::Invalid {
            justification: response.justification,
        };
    }

    let level: TriageLevel = match response.level.parse() {
        Ok(level) => level,
        Err(e) => {
            tracing::warn!(error = %e, "Classification returned unknown level");
            return ClassificationOutcome::Unavailable {
                reason: e.to_string(),
            };
        }
    };

    ClassificationOutcome::Valid(Classification {
        level,
        score: clamp_to(response.score, 1, 100),
        urgency_scale: clamp_to(response.urgency_scale, 1, 10),
        justification: response.justification,
    })
}

fn clamp_to(value: f64, min: u8, max: u8) -> u8 {
    value.round().clamp(f64::from(min), f64::from(max)) as u8
}
