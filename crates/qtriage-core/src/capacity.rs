//! Capacity monitor: overcrowding and staffing load derived from the queue.
//!
//! Simulation toggles in [`MutationState`] change only the numbers reported
//! here, never the queued records.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::config::CapacityConfig;
use crate::models::{Appointment, TriageLevel};

/// Simulated operating conditions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationState {
    /// Report every count doubled
    pub is_volume_doubled: bool,
    /// Only part of the base staff is on duty
    pub is_staff_shortage: bool,
}

/// Partial update of [`MutationState`]; `None` leaves a toggle unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationUpdate {
    pub is_volume_doubled: Option<bool>,
    pub is_staff_shortage: Option<bool>,
}

impl MutationState {
    pub fn apply(&mut self, update: MutationUpdate) {
        if let Some(doubled) = update.is_volume_doubled {
            self.is_volume_doubled = doubled;
        }
        if let Some(shortage) = update.is_staff_shortage {
            self.is_staff_shortage = shortage;
        }
    }
}

/// Per-level patient counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCounts {
    pub emergency: u32,
    pub critical: u32,
    pub intermediate: u32,
    pub normal: u32,
}

impl LevelCounts {
    pub fn from_records(records: &[Appointment]) -> Self {
        let mut counts = Self::default();
        for record in records {
            *counts.slot_mut(record.triage_level) += 1;
        }
        counts
    }

    pub fn get(&self, level: TriageLevel) -> u32 {
        match level {
            TriageLevel::Emergency => self.emergency,
            TriageLevel::Critical => self.critical,
            TriageLevel::Intermediate => self.intermediate,
            TriageLevel::Normal => self.normal,
        }
    }

    pub fn total(&self) -> u32 {
        self.sum_where(|_| true)
    }

    /// EMERGENCY + CRITICAL.
    pub fn high_acuity(&self) -> u32 {
        self.sum_where(|level| level.is_high_acuity())
    }

    fn sum_where(&self, include: impl Fn(TriageLevel) -> bool) -> u32 {
        TriageLevel::ALL
            .into_iter()
            .filter(|level| include(*level))
            .fold(0u32, |sum, level| sum.saturating_add(self.get(level)))
    }

    fn scaled(self, factor: u32) -> Self {
        Self {
            emergency: self.emergency.saturating_mul(factor),
            critical: self.critical.saturating_mul(factor),
            intermediate: self.intermediate.saturating_mul(factor),
            normal: self.normal.saturating_mul(factor),
        }
    }

    fn slot_mut(&mut self, level: TriageLevel) -> &mut u32 {
        match level {
            TriageLevel::Emergency => &mut self.emergency,
            TriageLevel::Critical => &mut self.critical,
            TriageLevel::Intermediate => &mut self.intermediate,
            TriageLevel::Normal => &mut self.normal,
        }
    }
}

/// Staffing load category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadState {
    Optimal,
    Critical,
}

impl LoadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadState::Optimal => "OPTIMAL",
            LoadState::Critical => "CRITICAL",
        }
    }
}

/// Point-in-time capacity summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityReport {
    /// Counts as reported (doubled under simulation)
    pub counts: LevelCounts,
    pub total: u32,
    pub is_volume_overloaded: bool,
    pub is_resource_strained: bool,
    pub is_overcrowded: bool,
    pub active_staff: u32,
    /// Patients per active staff member; `None` when nobody is on duty
    pub capacity_ratio: Option<f64>,
    pub load_state: LoadState,
    pub estimated_wait_minutes: u32,
}

/// Derives [`CapacityReport`]s from queue contents.
#[derive(Debug, Default)]
pub struct CapacityMonitor {
    config: CapacityConfig,
    /// Overcrowding state at the previous snapshot
    overcrowded: AtomicBool,
}

impl CapacityMonitor {
    pub fn new(config: CapacityConfig) -> Self {
        Self {
            config,
            overcrowded: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &CapacityConfig {
        &self.config
    }

    /// Staff on duty under the given conditions.
    pub fn active_staff(&self, mutation: &MutationState) -> u32 {
        if mutation.is_staff_shortage {
            // Integer arithmetic floors, e.g. 10 staff at 60% -> 6
            let retained = u64::from(self.config.base_staff)
                * u64::from(self.config.shortage_retained_percent)
                / 100;
            u32::try_from(retained).unwrap_or(self.config.base_staff)
        } else {
            self.config.base_staff
        }
    }

    /// Summarize the queue.
    pub fn snapshot(&self, records: &[Appointment], mutation: &MutationState) -> CapacityReport {
        let factor = if mutation.is_volume_doubled { 2 } else { 1 };
        let counts = LevelCounts::from_records(records).scaled(factor);
        let total = counts.total();

        let is_volume_overloaded = total >= self.config.volume_threshold;
        let is_resource_strained = counts.high_acuity() >= self.config.strain_threshold;
        let is_overcrowded = is_volume_overloaded || is_resource_strained;

        let active_staff = self.active_staff(mutation);
        let capacity_ratio = (active_staff > 0).then(|| f64::from(total) / f64::from(active_staff));
        let load_state = match capacity_ratio {
            Some(ratio) if ratio <= self.config.critical_load_ratio => LoadState::Optimal,
            _ => LoadState::Critical,
        };

        if self.overcrowding_changed(is_overcrowded) {
            if is_overcrowded {
                tracing::info!(
                    total,
                    high_acuity = counts.high_acuity(),
                    is_volume_overloaded,
                    is_resource_strained,
                    "Clinic overcrowded"
                );
            } else {
                tracing::info!(total, "Clinic no longer overcrowded");
            }
        }

        CapacityReport {
            counts,
            total,
            is_volume_overloaded,
            is_resource_strained,
            is_overcrowded,
            active_staff,
            capacity_ratio,
            load_state,
            estimated_wait_minutes: total.saturating_mul(self.config.minutes_per_patient),
        }
    }

    /// Record the latest overcrowding state; true when it differs from the
    /// previous snapshot.
    fn overcrowding_changed(&self, overcrowded: bool) -> bool {
        self.overcrowded.swap(overcrowded, Ordering::Relaxed) != overcrowded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn records(levels: &[(TriageLevel, usize)]) -> Vec<Appointment> {
        let mut out = Vec::new();
        for (level, count) in levels {
            for _ in 0..*count {
                out.push(Appointment {
                    id: uuid::Uuid::new_v4().to_string(),
                    patient_id: "p".into(),
                    patient_name: "P".into(),
                    age: 50,
                    gender: "Male".into(),
                    phone: String::new(),
                    symptoms: "test".into(),
                    urgency_scale: 5,
                    triage_level: *level,
                    triage_score: 50,
                    time_slot: "ASAP".into(),
                    doctor_id: "doc1".into(),
                    registered_at: Utc::now(),
                    is_offline: true,
                });
            }
        }
        out
    }

    fn monitor() -> CapacityMonitor {
        CapacityMonitor::new(CapacityConfig::default())
    }

    #[test]
    fn test_empty_queue() {
        let report = monitor().snapshot(&[], &MutationState::default());
        assert_eq!(report.total, 0);
        assert!(!report.is_overcrowded);
        assert_eq!(report.active_staff, 10);
        assert_eq!(report.capacity_ratio, Some(0.0));
        assert_eq!(report.load_state, LoadState::Optimal);
    }

    #[test]
    fn test_emergency_concentration_and_volume() {
        let queue = records(&[(TriageLevel::Emergency, 6), (TriageLevel::Normal, 4)]);
        let report = monitor().snapshot(&queue, &MutationState::default());

        assert_eq!(report.counts.emergency, 6);
        assert_eq!(report.counts.critical, 0);
        assert!(report.is_resource_strained);
        assert!(report.is_volume_overloaded);
        assert!(report.is_overcrowded);
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        let queue = records(&[(TriageLevel::Critical, 4), (TriageLevel::Normal, 5)]);
        let report = monitor().snapshot(&queue, &MutationState::default());
        assert!(!report.is_volume_overloaded); // 9 < 10
        assert!(!report.is_resource_strained); // 4 < 5
        assert!(!report.is_overcrowded);

        let queue = records(&[(TriageLevel::Critical, 3), (TriageLevel::Emergency, 2)]);
        let report = monitor().snapshot(&queue, &MutationState::default());
        assert!(report.is_resource_strained); // 5 >= 5
        assert!(!report.is_volume_overloaded);
        assert!(report.is_overcrowded);
    }

    #[test]
    fn test_volume_doubling_only_affects_report() {
        let queue = records(&[(TriageLevel::Normal, 5)]);
        let doubled = MutationState {
            is_volume_doubled: true,
            is_staff_shortage: false,
        };

        let report = monitor().snapshot(&queue, &doubled);
        assert_eq!(report.total, 10);
        assert_eq!(report.counts.normal, 10);
        assert!(report.is_volume_overloaded);
        assert_eq!(queue.len(), 5);
    }

    #[test]
    fn test_shortage_ratio_boundary_is_optimal() {
        let queue = records(&[(TriageLevel::Intermediate, 15)]);
        let both = MutationState {
            is_volume_doubled: true,
            is_staff_shortage: true,
        };

        let report = monitor().snapshot(&queue, &both);
        assert_eq!(report.active_staff, 6);
        assert_eq!(report.total, 30);
        assert_eq!(report.capacity_ratio, Some(5.0));
        assert_eq!(report.load_state, LoadState::Optimal);
    }

    #[test]
    fn test_shortage_ratio_above_limit_is_critical() {
        let queue = records(&[(TriageLevel::Normal, 31)]);
        let shortage = MutationState {
            is_volume_doubled: false,
            is_staff_shortage: true,
        };

        let report = monitor().snapshot(&queue, &shortage);
        assert_eq!(report.load_state, LoadState::Critical);
    }

    #[test]
    fn test_no_staff_is_critical_without_ratio() {
        let monitor = CapacityMonitor::new(CapacityConfig {
            base_staff: 1,
            ..CapacityConfig::default()
        });
        let shortage = MutationState {
            is_volume_doubled: false,
            is_staff_shortage: true,
        };

        let report = monitor.snapshot(&records(&[(TriageLevel::Normal, 1)]), &shortage);
        assert_eq!(report.active_staff, 0);
        assert_eq!(report.capacity_ratio, None);
        assert_eq!(report.load_state, LoadState::Critical);
    }

    #[test]
    fn test_large_configured_values_do_not_overflow() {
        let monitor = CapacityMonitor::new(CapacityConfig {
            base_staff: 100_000_000,
            minutes_per_patient: u32::MAX,
            ..CapacityConfig::default()
        });
        let shortage = MutationState {
            is_volume_doubled: true,
            is_staff_shortage: true,
        };

        assert_eq!(monitor.active_staff(&shortage), 60_000_000);
        let report = monitor.snapshot(&records(&[(TriageLevel::Normal, 3)]), &shortage);
        assert_eq!(report.total, 6);
        assert_eq!(report.estimated_wait_minutes, u32::MAX);
        assert_eq!(report.load_state, LoadState::Optimal);
    }

    #[test]
    fn test_overcrowding_reported_once_per_change() {
        let monitor = monitor();
        let crowded = records(&[(TriageLevel::Emergency, 5)]);

        monitor.snapshot(&crowded, &MutationState::default());
        assert!(!monitor.overcrowding_changed(true));
        assert!(monitor.overcrowding_changed(false));
        assert!(!monitor.overcrowding_changed(false));
    }

    #[test]
    fn test_high_acuity_counts() {
        let counts = LevelCounts::from_records(&records(&[
            (TriageLevel::Emergency, 2),
            (TriageLevel::Critical, 1),
            (TriageLevel::Normal, 4),
        ]));
        assert_eq!(counts.high_acuity(), 3);
        assert_eq!(counts.total(), 7);
        assert_eq!(counts.get(TriageLevel::Intermediate), 0);
    }

    #[test]
    fn test_wait_estimate() {
        let report = monitor().snapshot(&records(&[(TriageLevel::Normal, 3)]), &MutationState::default());
        assert_eq!(report.estimated_wait_minutes, 36);
    }

    #[test]
    fn test_mutation_update_merges() {
        let mut state = MutationState::default();
        state.apply(MutationUpdate {
            is_volume_doubled: Some(true),
            is_staff_shortage: None,
        });
        state.apply(MutationUpdate {
            is_volume_doubled: None,
            is_staff_shortage: Some(true),
        });
        assert!(state.is_volume_doubled && state.is_staff_shortage);
    }
}
