//! Triage engine: classification outcome + self-reported urgency → ranking.
//!
//! | Outcome       | Result                                   |
//! |---------------|------------------------------------------|
//! | `Valid`       | level, score and urgency taken verbatim  |
//! | `Invalid`     | refused, nothing may be queued           |
//! | `Unavailable` | deterministic fallback from urgency      |
//! | `Pending`     | refused unless the caller opts into the fallback |
//!
//! The fallback never goes above CRITICAL: self-reported urgency alone is
//! not enough to place someone in the EMERGENCY band.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ClassificationOutcome, TriageLevel};

/// Lowest and highest accepted self-reported urgency.
pub const URGENCY_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

/// Highest level the fallback heuristic may assign.
pub const FALLBACK_CEILING: TriageLevel = TriageLevel::Critical;

/// Reasons the engine refuses to produce a ranking.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TriageError {
    #[error("Symptom description was not recognized as medical: {0}")]
    InvalidMedicalInput(String),

    #[error("Symptom classification has not completed")]
    AwaitingClassification,

    #[error("Urgency must be between 1 and 10, got {0}")]
    UrgencyOutOfRange(u8),

    #[error("Classification was made for different symptom text")]
    StaleClassification,
}

pub type TriageResult<T> = Result<T, TriageError>;

/// Where a decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionSource {
    /// Taken from a valid classification
    Classified,
    /// Derived from self-reported urgency
    Fallback,
}

/// Canonical ranking fixed onto a queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageDecision {
    pub level: TriageLevel,
    pub score: u8,
    pub urgency_scale: u8,
    pub source: DecisionSource,
}

/// Stateless triage rules.
pub struct TriageEngine;

impl TriageEngine {
    /// Resolve a classification outcome into a ranking.
    pub fn resolve(
        outcome: &ClassificationOutcome,
        self_reported_urgency: u8,
    ) -> TriageResult<TriageDecision> {
        check_urgency(self_reported_urgency)?;

        match outcome {
            ClassificationOutcome::Valid(classification) => Ok(TriageDecision {
                level: classification.level,
                score: classification.score,
                urgency_scale: classification.urgency_scale,
                source: DecisionSource::Classified,
            }),
            ClassificationOutcome::Invalid { justification } => {
                Err(TriageError::InvalidMedicalInput(justification.clone()))
            }
            ClassificationOutcome::Unavailable { reason } => {
                tracing::debug!(%reason, urgency = self_reported_urgency, "Applying urgency fallback");
                Self::fallback(self_reported_urgency)
            }
            ClassificationOutcome::Pending => Err(TriageError::AwaitingClassification),
        }
    }

    /// Rank from self-reported urgency alone.
    pub fn fallback(self_reported_urgency: u8) -> TriageResult<TriageDecision> {
        check_urgency(self_reported_urgency)?;

        Ok(TriageDecision {
            level: Self::fallback_level(self_reported_urgency),
            score: (u16::from(self_reported_urgency) * 10).clamp(1, 100) as u8,
            urgency_scale: self_reported_urgency,
            source: DecisionSource::Fallback,
        })
    }

    /// Level thresholds used by the fallback.
    pub fn fallback_level(self_reported_urgency: u8) -> TriageLevel {
        if self_reported_urgency > 8 {
            FALLBACK_CEILING
        } else if self_reported_urgency > 5 {
            TriageLevel::Intermediate
        } else {
            TriageLevel::Normal
        }
    }
}

fn check_urgency(urgency: u8) -> TriageResult<()> {
    if URGENCY_RANGE.contains(&urgency) {
        Ok(())
    } else {
        Err(TriageError::UrgencyOutOfRange(urgency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Classification;
    use proptest::prelude::*;

    fn unavailable() -> ClassificationOutcome {
        ClassificationOutcome::Unavailable {
            reason: "service down".into(),
        }
    }

    #[test]
    fn test_valid_is_taken_verbatim() {
        let outcome = ClassificationOutcome::Valid(Classification {
            level: TriageLevel::Emergency,
            score: 97,
            urgency_scale: 10,
            justification: "Stroke signs".into(),
        });

        // Self-reported urgency does not override the classification
        let decision = TriageEngine::resolve(&outcome, 2).unwrap();
        assert_eq!(decision.level, TriageLevel::Emergency);
        assert_eq!(decision.score, 97);
        assert_eq!(decision.urgency_scale, 10);
        assert_eq!(decision.source, DecisionSource::Classified);
    }

    #[test]
    fn test_invalid_is_refused() {
        let outcome = ClassificationOutcome::Invalid {
            justification: "Not a health complaint".into(),
        };
        assert_eq!(
            TriageEngine::resolve(&outcome, 9),
            Err(TriageError::InvalidMedicalInput("Not a health complaint".into()))
        );
    }

    #[test]
    fn test_pending_is_refused() {
        assert_eq!(
            TriageEngine::resolve(&ClassificationOutcome::Pending, 5),
            Err(TriageError::AwaitingClassification)
        );
    }

    #[test]
    fn test_unavailable_high_urgency_falls_back_to_critical() {
        let decision = TriageEngine::resolve(&unavailable(), 9).unwrap();
        assert_eq!(decision.level, TriageLevel::Critical);
        assert_eq!(decision.score, 90);
        assert_eq!(decision.source, DecisionSource::Fallback);
    }

    #[test]
    fn test_fallback_thresholds() {
        assert_eq!(TriageEngine::fallback_level(10), TriageLevel::Critical);
        assert_eq!(TriageEngine::fallback_level(9), TriageLevel::Critical);
        assert_eq!(TriageEngine::fallback_level(8), TriageLevel::Intermediate);
        assert_eq!(TriageEngine::fallback_level(6), TriageLevel::Intermediate);
        assert_eq!(TriageEngine::fallback_level(5), TriageLevel::Normal);
        assert_eq!(TriageEngine::fallback_level(1), TriageLevel::Normal);
    }

    #[test]
    fn test_urgency_out_of_range() {
        assert_eq!(
            TriageEngine::resolve(&unavailable(), 0),
            Err(TriageError::UrgencyOutOfRange(0))
        );
        assert_eq!(
            TriageEngine::fallback(11),
            Err(TriageError::UrgencyOutOfRange(11))
        );
    }

    proptest! {
        #[test]
        fn prop_fallback_is_deterministic(urgency in 1u8..=10) {
            let a = TriageEngine::resolve(&unavailable(), urgency).unwrap();
            let b = TriageEngine::resolve(&unavailable(), urgency).unwrap();
            prop_assert_eq!(a, b);
            prop_assert_eq!(a.score, urgency * 10);
            prop_assert!(a.level <= FALLBACK_CEILING);
        }

        #[test]
        fn prop_fallback_never_downgrades_with_more_urgency(a in 1u8..=10, b in 1u8..=10) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(TriageEngine::fallback_level(low) <= TriageEngine::fallback_level(high));
        }
    }
}
