//! Latest-request-wins classification for inputs that change while typing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ClassificationConfig;
use crate::models::SymptomAssessment;

use super::ClassificationGateway;

/// Sequence counter deciding which request may update visible state.
///
/// Every input edit takes a new ticket. A result may be applied only while
/// its ticket is still the latest one issued.
#[derive(Debug, Default)]
pub struct RequestGate {
    latest: AtomicU64,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an input edit and return its ticket.
    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether no newer edit has happened since `ticket` was issued.
    pub fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }

    /// Supersede every outstanding ticket (e.g. the form was reset).
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}

/// Classifies an input only after it has been stable for the debounce delay.
pub struct DebouncedClassifier {
    gateway: Arc<ClassificationGateway>,
    gate: RequestGate,
    delay: Duration,
}

impl DebouncedClassifier {
    pub fn new(gateway: Arc<ClassificationGateway>, delay: Duration) -> Self {
        Self {
            gateway,
            gate: RequestGate::new(),
            delay,
        }
    }

    pub fn from_config(gateway: Arc<ClassificationGateway>, config: &ClassificationConfig) -> Self {
        Self::new(gateway, config.debounce())
    }

    /// Handle one input edit.
    ///
    /// Returns `None` when a newer edit arrived before this one settled or
    /// before its classification completed. An in-flight call is not
    /// aborted; its result is dropped.
    pub async fn on_input(&self, symptoms: &str) -> Option<SymptomAssessment> {
        let ticket = self.gate.issue();

        tokio::time::sleep(self.delay).await;
        if !self.gate.is_current(ticket) {
            tracing::debug!(ticket, "Input superseded before debounce elapsed");
            return None;
        }

        let assessment = self.gateway.assess(symptoms).await;
        if !self.gate.is_current(ticket) {
            tracing::debug!(ticket, "Discarding stale classification result");
            return None;
        }

        Some(assessment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::ScriptedModel;
    use crate::models::{ClassificationOutcome, TriageLevel};
    use qtriage_llm::MockTriageModel;

    const VALID: &str = r#"{"is_valid_medical_symptom":true,"level":"INTERMEDIATE","score":60,"urgency_scale":6,"justification":"x"}"#;

    fn debounced(gateway: ClassificationGateway) -> Arc<DebouncedClassifier> {
        Arc::new(DebouncedClassifier::new(
            Arc::new(gateway),
            Duration::from_millis(1200),
        ))
    }

    #[test]
    fn test_gate_tracks_latest_ticket() {
        let gate = RequestGate::new();
        let first = gate.issue();
        assert!(gate.is_current(first));

        let second = gate.issue();
        assert!(!gate.is_current(first));
        assert!(gate.is_current(second));

        gate.invalidate();
        assert!(!gate.is_current(second));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_input_is_classified() {
        let classifier = debounced(ClassificationGateway::new(Arc::new(MockTriageModel)));

        let assessment = classifier.on_input("  sprained my wrist playing tennis ").await;
        let assessment = assessment.expect("settled input should produce a result");
        assert_eq!(assessment.symptoms, "sprained my wrist playing tennis");
        assert_eq!(
            assessment.outcome.classification().unwrap().level,
            TriageLevel::Intermediate
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_within_debounce_supersedes() {
        let classifier = debounced(ClassificationGateway::new(Arc::new(MockTriageModel)));

        let first = tokio::spawn({
            let classifier = classifier.clone();
            async move { classifier.on_input("chest pa").await }
        });
        tokio::time::sleep(Duration::from_millis(500)).await;
        let second = classifier.on_input("chest pain").await;

        assert!(first.await.unwrap().is_none());
        assert!(second.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_in_flight_result_is_discarded() {
        let slow = ScriptedModel {
            completion: VALID.into(),
            delay: Duration::from_secs(3),
        };
        let classifier = debounced(ClassificationGateway::new(Arc::new(slow)));

        let first = tokio::spawn({
            let classifier = classifier.clone();
            async move { classifier.on_input("mild fever today").await }
        });

        // Debounce elapses at 1.2s; the model call is then in flight until 4.2s
        tokio::time::sleep(Duration::from_millis(2000)).await;
        let second = tokio::spawn({
            let classifier = classifier.clone();
            async move { classifier.on_input("mild fever today and vomiting").await }
        });

        assert!(first.await.unwrap().is_none());
        assert!(second.await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_input_settles_to_pending() {
        let classifier = debounced(ClassificationGateway::new(Arc::new(MockTriageModel)));
        assert_eq!(
            classifier.on_input("ow").await.map(|a| a.outcome),
            Some(ClassificationOutcome::Pending)
        );
    }
}
