//! Queue store: the canonical list of waiting patients.
//!
//! Reads hand out copies or shared slices; the canonical vector only
//! changes inside `insert` and `remove`, each of which ends by persisting
//! the whole collection.

mod ordering;

pub use ordering::*;

use chrono::Utc;

use crate::db::{load_or_empty, save_best_effort, SharedDatabase, APPOINTMENTS_KEY};
use crate::models::{Appointment, NewAppointment};

/// Owns the queued appointments and keeps them persisted.
pub struct QueueStore {
    db: SharedDatabase,
    appointments: Vec<Appointment>,
}

impl QueueStore {
    /// Open the store, loading whatever was persisted before.
    ///
    /// Missing or malformed data starts an empty queue.
    pub fn open(db: SharedDatabase) -> Self {
        let appointments: Vec<Appointment> = load_or_empty(&db, APPOINTMENTS_KEY);
        tracing::debug!(count = appointments.len(), "Loaded appointment queue");
        Self { db, appointments }
    }

    /// Queue a candidate, assigning its ID and arrival time.
    pub fn insert(&mut self, candidate: NewAppointment) -> Appointment {
        let now = Utc::now();
        // Arrival order must survive wall-clock steps backwards
        let registered_at = self
            .appointments
            .iter()
            .map(|a| a.registered_at)
            .max()
            .map_or(now, |latest| latest.max(now));

        let appointment = candidate.into_appointment(uuid::Uuid::new_v4().to_string(), registered_at);
        self.appointments.push(appointment.clone());
        self.persist();

        tracing::info!(
            id = %appointment.id,
            level = %appointment.triage_level,
            score = appointment.triage_score,
            offline = appointment.is_offline,
            "Patient queued"
        );
        appointment
    }

    /// Remove an entry. Returns whether anything was removed; removing an
    /// unknown ID is not an error.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.appointments.len();
        self.appointments.retain(|a| a.id != id);
        let removed = self.appointments.len() != before;

        if removed {
            self.persist();
            tracing::info!(id, "Patient checked out");
        }
        removed
    }

    /// Entries in insertion order.
    pub fn all(&self) -> &[Appointment] {
        &self.appointments
    }

    /// A fresh copy in priority order.
    pub fn sorted_view(&self) -> Vec<Appointment> {
        sort_by_priority(&self.appointments)
    }

    /// 1-based rank of an entry in the priority order.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.sorted_view()
            .iter()
            .position(|a| a.id == id)
            .map(|index| index + 1)
    }

    /// Estimated wait: patients ahead times minutes per patient.
    pub fn estimated_wait_minutes(&self, id: &str, minutes_per_patient: u32) -> Option<u32> {
        self.position_of(id)
            .map(|position| (position as u32 - 1).saturating_mul(minutes_per_patient))
    }

    /// The queued entry for a patient, if any.
    pub fn find_by_patient(&self, patient_id: &str) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.patient_id == patient_id)
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    fn persist(&self) {
        save_best_effort(&self.db, APPOINTMENTS_KEY, &self.appointments);
    }
}
