//! Clinician directory.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A clinician patients can request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub specialty: String,
    /// 0.0..=5.0
    pub rating: f64,
    pub education: String,
    pub experience_years: u32,
    /// `YYYY-MM-DD` -> `HH:MM` slot labels
    pub availability: BTreeMap<String, Vec<String>>,
}

impl Doctor {
    /// Whether the doctor lists `slot` on `date`.
    pub fn is_available(&self, date: &str, slot: &str) -> bool {
        self.availability
            .get(date)
            .is_some_and(|slots| slots.iter().any(|s| s == slot))
    }
}

fn doctor(
    id: &str,
    name: &str,
    specialty: &str,
    rating: f64,
    education: &str,
    experience_years: u32,
    availability: &[(&str, &[&str])],
) -> Doctor {
    Doctor {
        id: id.into(),
        name: name.into(),
        specialty: specialty.into(),
        rating,
        education: education.into(),
        experience_years,
        availability: availability
            .iter()
            .map(|(date, slots)| {
                (
                    date.to_string(),
                    slots.iter().map(|s| s.to_string()).collect(),
                )
            })
            .collect(),
    }
}

/// The clinic's standing roster.
pub fn default_roster() -> Vec<Doctor> {
    vec![
        doctor(
            "doc1",
            "Dr. Sarah Johnson",
            "Cardiology",
            4.9,
            "MD, Harvard Medical School",
            15,
            &[
                ("2025-01-24", &["09:00", "10:00", "14:00"]),
                ("2025-01-25", &["11:00", "13:00", "15:00"]),
            ],
        ),
        doctor(
            "doc2",
            "Dr. Michael Chen",
            "General Medicine",
            4.8,
            "MD, Johns Hopkins",
            12,
            &[
                ("2025-01-24", &["08:00", "12:00"]),
                ("2025-01-25", &["09:00", "14:00", "17:00"]),
            ],
        ),
        doctor(
            "doc3",
            "Dr. Emily Roberts",
            "Pediatrics",
            4.9,
            "MD, Stanford University",
            10,
            &[
                ("2025-01-25", &["10:30", "13:30"]),
                ("2025-01-26", &["08:30", "16:30"]),
            ],
        ),
        doctor(
            "doc4",
            "Dr. David Kumar",
            "Orthopedics",
            4.7,
            "MD, Yale School of Medicine",
            18,
            &[
                ("2025-01-24", &["10:00", "11:00"]),
                ("2025-01-25", &["12:30", "14:30"]),
            ],
        ),
    ]
}

/// Look up a doctor in a roster.
pub fn find_doctor<'a>(roster: &'a [Doctor], id: &str) -> Option<&'a Doctor> {
    roster.iter().find(|d| d.id == id)
}
