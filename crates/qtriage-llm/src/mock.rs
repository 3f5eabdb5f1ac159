//! Keyword classifier for offline use and tests.
//!
//! Not a clinical tool: it only recognizes a fixed lexicon of complaint
//! phrases and ranks by the most severe one found.

use strsim::jaro_winkler;

use crate::response::TriageResponse;

/// Minimum Jaro-Winkler similarity for a misspelled token to count as a term.
const FUZZY_THRESHOLD: f64 = 0.93;

/// Terms shorter than this only match exactly.
const FUZZY_MIN_LEN: usize = 5;

struct Tier {
    level: &'static str,
    base_score: u32,
    max_score: u32,
    urgency: u32,
    terms: &'static [&'static str],
}

// Ordered most severe first
const TIERS: &[Tier] = &[
    Tier {
        level: "EMERGENCY",
        base_score: 95,
        max_score: 100,
        urgency: 10,
        terms: &[
            "not breathing",
            "unconscious",
            "unresponsive",
            "stroke",
            "seizure",
            "anaphylaxis",
            "cardiac arrest",
            "overdose",
            "choking",
            "severe bleeding",
            "heavy bleeding",
            "suicidal",
        ],
    },
    Tier {
        level: "CRITICAL",
        base_score: 80,
        max_score: 89,
        urgency: 8,
        terms: &[
            "chest pain",
            "shortness of breath",
            "difficulty breathing",
            "fracture",
            "broken",
            "head injury",
            "high fever",
            "coughing blood",
            "vomiting blood",
            "severe pain",
            "fainted",
            "fainting",
            "numbness",
            "bleeding",
            "burn",
        ],
    },
    Tier {
        level: "INTERMEDIATE",
        base_score: 55,
        max_score: 69,
        urgency: 5,
        terms: &[
            "vomiting",
            "fever",
            "infection",
            "sprain",
            "sprained",
            "migraine",
            "abdominal pain",
            "stomach pain",
            "diarrhea",
            "dizziness",
            "dizzy",
            "swelling",
            "swollen",
            "wound",
            "earache",
            "asthma",
            "dehydrated",
            "cut",
        ],
    },
    Tier {
        level: "NORMAL",
        base_score: 25,
        max_score: 39,
        urgency: 2,
        terms: &[
            "cough",
            "cold",
            "flu",
            "rash",
            "headache",
            "sore throat",
            "runny nose",
            "itchy",
            "itching",
            "fatigue",
            "tired",
            "nausea",
            "sneezing",
            "congestion",
            "allergy",
            "allergies",
            "insomnia",
            "checkup",
            "prescription",
            "ache",
            "aches",
            "pain",
            "hurts",
            "sore",
        ],
    },
];

/// Deterministic lexicon-based classifier.
pub struct MockClassifier;

impl MockClassifier {
    /// Classify a free-text complaint.
    pub fn classify(symptoms: &str) -> TriageResponse {
        let normalized = normalize(symptoms);
        let tokens: Vec<&str> = normalized.split_whitespace().collect();
        let padded = format!(" {} ", normalized);

        let mut matched: Vec<&'static str> = Vec::new();
        let mut top: Option<&Tier> = None;

        for tier in TIERS {
            for term in tier.terms {
                if term_matches(term, &padded, &tokens) {
                    matched.push(term);
                    if top.is_none() {
                        top = Some(tier);
                    }
                }
            }
        }

        let Some(tier) = top else {
            return TriageResponse {
                is_valid_medical_symptom: false,
                level: "NORMAL".into(),
                score: 1.0,
                urgency_scale: 1.0,
                justification: "No recognizable health complaint in description".into(),
            };
        };

        let extra = matched.len().saturating_sub(1) as u32;
        let score = (tier.base_score + 2 * extra).min(tier.max_score);

        TriageResponse {
            is_valid_medical_symptom: true,
            level: tier.level.into(),
            score: f64::from(score),
            urgency_scale: f64::from(tier.urgency),
            justification: format!("Matched: {}", matched.join(", ")),
        }
    }
}

/// Lowercase and replace punctuation with spaces.
fn normalize(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn term_matches(term: &str, padded: &str, tokens: &[&str]) -> bool {
    if term.contains(' ') {
        return padded.contains(&format!(" {} ", term));
    }

    tokens.iter().any(|token| {
        *token == term
            || (term.len() >= FUZZY_MIN_LEN
                && token.len() >= FUZZY_MIN_LEN
                && jaro_winkler(token, term) >= FUZZY_THRESHOLD)
    })
}
