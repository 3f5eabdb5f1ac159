//! Queue priority ordering.
//!
//! 1. Triage level weight, descending
//! 2. Triage score, descending
//! 3. Registration time, ascending

use std::cmp::Ordering;

use crate::models::Appointment;

/// Compare two entries; `Less` means `a` is seen first.
pub fn priority_order(a: &Appointment, b: &Appointment) -> Ordering {
    b.triage_level
        .weight()
        .cmp(&a.triage_level.weight())
        .then_with(|| b.triage_score.cmp(&a.triage_score))
        .then_with(|| a.registered_at.cmp(&b.registered_at))
}

/// Return a new vector in priority order. The input is left untouched.
pub fn sort_by_priority(records: &[Appointment]) -> Vec<Appointment> {
    let mut sorted = records.to_vec();
    // Stable: exact ties keep their original order
    sorted.sort_by(priority_order);
    sorted
}
