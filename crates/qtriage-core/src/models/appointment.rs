//! Queue entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::triage::TriageLevel;

/// One patient waiting in the clinic queue.
///
/// `id`, `registered_at` and the triage fields are fixed once the record is
/// queued.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    /// Queue entry ID
    pub id: String,
    /// Registered user ID, or a generated `offline-` ID for walk-ins
    pub patient_id: String,
    /// Display name
    pub patient_name: String,
    pub age: u32,
    pub gender: String,
    pub phone: String,
    /// Free-text complaint as entered
    pub symptoms: String,
    /// 1..=10, self-reported or model-derived
    pub urgency_scale: u8,
    pub triage_level: TriageLevel,
    /// 0..=100, tie-break within a level
    pub triage_score: u8,
    /// Requested slot label (not enforced)
    pub time_slot: String,
    /// Requested doctor (not validated)
    pub doctor_id: String,
    /// Queue arrival, used only as the final tie-break
    pub registered_at: DateTime<Utc>,
    /// Entered by staff rather than self-service
    pub is_offline: bool,
}

/// An appointment before the queue assigns its identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewAppointment {
    pub patient_id: String,
    pub patient_name: String,
    pub age: u32,
    pub gender: String,
    pub phone: String,
    pub symptoms: String,
    pub urgency_scale: u8,
    pub triage_level: TriageLevel,
    pub triage_score: u8,
    pub time_slot: String,
    pub doctor_id: String,
    pub is_offline: bool,
}

impl NewAppointment {
    /// Stamp identity and arrival time onto the candidate.
    pub fn into_appointment(self, id: String, registered_at: DateTime<Utc>) -> Appointment {
        Appointment {
            id,
            patient_id: self.patient_id,
            patient_name: self.patient_name,
            age: self.age,
            gender: self.gender,
            phone: self.phone,
            symptoms: self.symptoms,
            urgency_scale: self.urgency_scale,
            triage_level: self.triage_level,
            triage_score: self.triage_score,
            time_slot: self.time_slot,
            doctor_id: self.doctor_id,
            registered_at,
            is_offline: self.is_offline,
        }
    }
}
