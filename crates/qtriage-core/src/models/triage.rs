//! Triage levels and classification outcomes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Clinical urgency, declared in ascending order so the derived `Ord` matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriageLevel {
    /// Routine complaint
    Normal,
    /// Needs attention today
    Intermediate,
    /// Serious and time sensitive
    Critical,
    /// Immediately life threatening
    Emergency,
}

impl TriageLevel {
    /// Every level, most urgent first.
    pub const ALL: [TriageLevel; 4] = [
        TriageLevel::Emergency,
        TriageLevel::Critical,
        TriageLevel::Intermediate,
        TriageLevel::Normal,
    ];

    /// Integer weight used as the primary queue sort key.
    pub fn weight(&self) -> u8 {
        match self {
            TriageLevel::Normal => 1,
            TriageLevel::Intermediate => 2,
            TriageLevel::Critical => 3,
            TriageLevel::Emergency => 4,
        }
    }

    /// Canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TriageLevel::Normal => "NORMAL",
            TriageLevel::Intermediate => "INTERMEDIATE",
            TriageLevel::Critical => "CRITICAL",
            TriageLevel::Emergency => "EMERGENCY",
        }
    }

    /// Levels counted towards resource strain.
    pub fn is_high_acuity(&self) -> bool {
        matches!(self, TriageLevel::Critical | TriageLevel::Emergency)
    }
}

impl fmt::Display for TriageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for level names outside the four known values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown triage level: {0}")]
pub struct UnknownLevel(pub String);

impl FromStr for TriageLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NORMAL" => Ok(TriageLevel::Normal),
            "INTERMEDIATE" => Ok(TriageLevel::Intermediate),
            "CRITICAL" => Ok(TriageLevel::Critical),
            "EMERGENCY" => Ok(TriageLevel::Emergency),
            _ => Err(UnknownLevel(s.to_string())),
        }
    }
}

/// A usable classification of symptom text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub level: TriageLevel,
    /// 1..=100
    pub score: u8,
    /// 1..=10
    pub urgency_scale: u8,
    pub justification: String,
}

/// Result of asking the gateway to classify symptom text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassificationOutcome {
    /// Input too short to judge; show nothing and do not submit.
    Pending,
    /// Plausible medical description with a ranking.
    Valid(Classification),
    /// Text was judged non-medical. Carries no ranking.
    Invalid { justification: String },
    /// The classification service failed, timed out or answered nonsense.
    Unavailable { reason: String },
}

impl ClassificationOutcome {
    /// Whether this outcome must block submission.
    pub fn blocks_submission(&self) -> bool {
        matches!(self, ClassificationOutcome::Invalid { .. })
    }

    /// The classification, when valid.
    pub fn classification(&self) -> Option<&Classification> {
        match self {
            ClassificationOutcome::Valid(c) => Some(c),
            _ => None,
        }
    }
}

/// A classification outcome together with the text it judged.
#[derive(Debug, Clone, PartialEq)]
pub struct SymptomAssessment {
    /// Trimmed text that was classified
    pub symptoms: String,
    pub outcome: ClassificationOutcome,
}

impl SymptomAssessment {
    /// Whether this assessment was made for `symptoms`.
    pub fn describes(&self, symptoms: &str) -> bool {
        self.symptoms == symptoms.trim()
    }
}
