//! Patient intake: turn a submitted form plus its classification into a
//! queued appointment.

use serde::{Deserialize, Serialize};

use crate::models::{Appointment, ClassificationOutcome, NewAppointment, SymptomAssessment};
use crate::queue::QueueStore;
use crate::triage::{TriageDecision, TriageEngine, TriageError, TriageResult};

/// Prefix for patient IDs generated for walk-ins without an account.
pub const OFFLINE_ID_PREFIX: &str = "offline-";

/// How the patient reached the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntakeChannel {
    /// Patient booked through the app; needs a finished classification
    SelfService,
    /// Staff rapid intake; falls back to self-reported urgency if needed
    WalkIn,
}

/// Submitted intake form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntakeForm {
    /// Empty for walk-ins without an account
    pub patient_id: String,
    pub patient_name: String,
    pub age: u32,
    pub gender: String,
    pub phone: String,
    pub symptoms: String,
    /// Self-reported, 1..=10
    pub urgency: u8,
    pub time_slot: String,
    pub doctor_id: String,
}

/// Rank the form and queue it.
///
/// The assessment must have been made for `form.symptoms`. Nothing is
/// inserted when the engine refuses, so an `Invalid` classification can
/// never reach the queue.
pub fn admit(
    store: &mut QueueStore,
    assessment: &SymptomAssessment,
    form: IntakeForm,
    channel: IntakeChannel,
) -> TriageResult<Appointment> {
    if !assessment.describes(&form.symptoms) {
        tracing::warn!(?channel, "Refusing intake with a classification of other text");
        return Err(TriageError::StaleClassification);
    }
    if assessment.outcome.blocks_submission() {
        tracing::info!(?channel, "Refusing intake of non-medical symptom text");
    }

    let decision = decide(&assessment.outcome, form.urgency, channel)?;
    Ok(store.insert(build_candidate(form, decision, channel)))
}

fn decide(
    outcome: &ClassificationOutcome,
    urgency: u8,
    channel: IntakeChannel,
) -> TriageResult<TriageDecision> {
    match (outcome, channel) {
        (ClassificationOutcome::Pending, IntakeChannel::WalkIn) => TriageEngine::fallback(urgency),
        _ => TriageEngine::resolve(outcome, urgency),
    }
}

fn build_candidate(form: IntakeForm, decision: TriageDecision, channel: IntakeChannel) -> NewAppointment {
    let is_offline = channel == IntakeChannel::WalkIn;
    let patient_id = if is_offline && form.patient_id.trim().is_empty() {
        format!("{}{}", OFFLINE_ID_PREFIX, uuid::Uuid::new_v4())
    } else {
        form.patient_id
    };

    NewAppointment {
        patient_id,
        patient_name: form.patient_name,
        age: form.age,
        gender: form.gender,
        phone: form.phone,
        symptoms: form.symptoms,
        urgency_scale: decision.urgency_scale,
        triage_level: decision.level,
        triage_score: decision.score,
        time_slot: form.time_slot,
        doctor_id: form.doctor_id,
        is_offline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::{Classification, TriageLevel};

    const SYMPTOMS: &str = "chest pain and shortness of breath";

    fn setup_store() -> QueueStore {
        QueueStore::open(Database::open_in_memory().unwrap().into_shared())
    }

    fn form(urgency: u8) -> IntakeForm {
        IntakeForm {
            patient_id: "user-1".into(),
            patient_name: "Jane Doe".into(),
            age: 34,
            gender: "Female".into(),
            phone: "555-0101".into(),
            symptoms: SYMPTOMS.into(),
            urgency,
            time_slot: "09:30".into(),
            doctor_id: "doc1".into(),
        }
    }

    fn assessed(outcome: ClassificationOutcome) -> SymptomAssessment {
        SymptomAssessment {
            symptoms: SYMPTOMS.into(),
            outcome,
        }
    }

    fn valid(level: TriageLevel, score: u8, urgency: u8) -> SymptomAssessment {
        assessed(ClassificationOutcome::Valid(Classification {
            level,
            score,
            urgency_scale: urgency,
            justification: "test".into(),
        }))
    }

    #[test]
    fn test_valid_classification_is_queued_verbatim() {
        let mut store = setup_store();
        let appointment = admit(
            &mut store,
            &valid(TriageLevel::Critical, 85, 8),
            form(3),
            IntakeChannel::SelfService,
        )
        .unwrap();

        assert_eq!(appointment.triage_level, TriageLevel::Critical);
        assert_eq!(appointment.triage_score, 85);
        assert_eq!(appointment.urgency_scale, 8);
        assert_eq!(appointment.patient_id, "user-1");
        assert!(!appointment.is_offline);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_invalid_never_inserts() {
        let mut store = setup_store();
        let invalid = assessed(ClassificationOutcome::Invalid {
            justification: "not medical".into(),
        });

        for channel in [IntakeChannel::SelfService, IntakeChannel::WalkIn] {
            let result = admit(&mut store, &invalid, form(9), channel);
            assert!(matches!(result, Err(TriageError::InvalidMedicalInput(_))));
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_classification_of_other_text_is_refused() {
        let mut store = setup_store();
        let mut gibberish = form(9);
        gibberish.symptoms = "asdkjh qweq".into();

        let unavailable = assessed(ClassificationOutcome::Unavailable {
            reason: "timeout".into(),
        });
        for (assessment, channel) in [
            (valid(TriageLevel::Critical, 85, 8), IntakeChannel::SelfService),
            (unavailable, IntakeChannel::WalkIn),
        ] {
            let result = admit(&mut store, &assessment, gibberish.clone(), channel);
            assert_eq!(result, Err(TriageError::StaleClassification));
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_surrounding_whitespace_still_matches() {
        let mut store = setup_store();
        let mut padded = form(3);
        padded.symptoms = format!("  {}\n", SYMPTOMS);

        let result = admit(
            &mut store,
            &valid(TriageLevel::Critical, 85, 8),
            padded,
            IntakeChannel::SelfService,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_self_service_waits_for_classification() {
        let mut store = setup_store();
        let result = admit(
            &mut store,
            &assessed(ClassificationOutcome::Pending),
            form(7),
            IntakeChannel::SelfService,
        );

        assert_eq!(result, Err(TriageError::AwaitingClassification));
        assert!(store.is_empty());
    }

    #[test]
    fn test_walk_in_pending_uses_fallback() {
        let mut store = setup_store();
        let mut walk_in = form(7);
        walk_in.patient_id = String::new();

        let appointment = admit(
            &mut store,
            &assessed(ClassificationOutcome::Pending),
            walk_in,
            IntakeChannel::WalkIn,
        )
        .unwrap();

        assert_eq!(appointment.triage_level, TriageLevel::Intermediate);
        assert_eq!(appointment.triage_score, 70);
        assert!(appointment.is_offline);
        assert!(appointment.patient_id.starts_with(OFFLINE_ID_PREFIX));
    }

    #[test]
    fn test_unavailable_falls_back_on_either_channel() {
        let mut store = setup_store();
        let unavailable = assessed(ClassificationOutcome::Unavailable {
            reason: "timeout".into(),
        });

        let appointment = admit(&mut store, &unavailable, form(9), IntakeChannel::SelfService).unwrap();
        assert_eq!(appointment.triage_level, TriageLevel::Critical);
        assert_eq!(appointment.triage_score, 90);
        assert_eq!(appointment.urgency_scale, 9);
    }

    #[test]
    fn test_walk_in_keeps_existing_patient_id() {
        let mut store = setup_store();
        let appointment = admit(
            &mut store,
            &valid(TriageLevel::Normal, 30, 2),
            form(2),
            IntakeChannel::WalkIn,
        )
        .unwrap();

        assert_eq!(appointment.patient_id, "user-1");
        assert!(appointment.is_offline);
    }

    #[test]
    fn test_out_of_range_urgency_rejected() {
        let mut store = setup_store();
        let result = admit(
            &mut store,
            &assessed(ClassificationOutcome::Pending),
            form(0),
            IntakeChannel::WalkIn,
        );

        assert_eq!(result, Err(TriageError::UrgencyOutOfRange(0)));
        assert!(store.is_empty());
    }
}
