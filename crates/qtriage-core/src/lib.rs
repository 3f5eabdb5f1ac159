//! Q-Triage Core Library
//!
//! Walk-in clinic triage: symptom classification, priority queueing and
//! overcrowding detection.
//!
//! # Architecture
//!
//! ```text
//! Symptom text ──(debounce)──► Classification Gateway ──► model (bounded)
//!                                        │
//!                    Pending / Valid / Invalid / Unavailable
//!                                        │
//!       self-reported urgency ──► Triage Engine (fallback when unavailable)
//!                                        │
//!                                 level + score
//!                                        │
//!                          ┌─────────────▼─────────────┐
//!                          │        Queue Store        │
//!                          │  level ▼  score ▼  time ▲ │
//!                          │  persisted after change   │
//!                          └─────────────┬─────────────┘
//!                                        │
//!                    ┌───────────────────┴───────────────────┐
//!                    ▼                                       ▼
//!              Sorted view                           Capacity Monitor
//!         (patients and staff)               (overcrowding, staffing load)
//! ```
//!
//! # Core Principle
//!
//! **Non-medical input never reaches the queue.** A service failure degrades
//! to the self-reported urgency; an `Invalid` classification never does.
//!
//! # Modules
//!
//! - [`gateway`]: Classification gateway and input debouncing
//! - [`triage`]: Triage engine and urgency fallback
//! - [`queue`]: Queue store and priority ordering
//! - [`capacity`]: Overcrowding and staffing load
//! - [`intake`]: Self-service and walk-in admission
//! - [`session`]: User directory and signed-in session
//! - [`db`]: SQLite-backed collection persistence
//! - [`models`]: Domain types (Appointment, TriageLevel, User, Doctor)
//! - [`config`]: TOML configuration
//! - [`logging`]: tracing subscriber setup

pub mod capacity;
pub mod config;
pub mod db;
pub mod gateway;
pub mod intake;
pub mod logging;
pub mod models;
pub mod queue;
pub mod session;
pub mod triage;

// Re-export commonly used types
pub use capacity::{CapacityMonitor, CapacityReport, LoadState, MutationState, MutationUpdate};
pub use config::ClinicConfig;
pub use db::Database;
pub use gateway::{ClassificationGateway, DebouncedClassifier};
pub use intake::{admit, IntakeChannel, IntakeForm};
pub use models::{
    Appointment, ClassificationOutcome, Doctor, SymptomAssessment, TriageLevel, User, UserRole,
};
pub use queue::QueueStore;
pub use session::{Session, UserDirectory};
pub use triage::{TriageDecision, TriageEngine};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use qtriage_llm::{MockTriageModel, ResponseError, ResponseResult, TriageModel};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ClinicError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Triage refused: {0}")]
    TriageRefused(String),

    #[error("Account error: {0}")]
    AccountError(String),

    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

impl From<db::DbError> for ClinicError {
    fn from(e: db::DbError) -> Self {
        ClinicError::DatabaseError(e.to_string())
    }
}

impl From<triage::TriageError> for ClinicError {
    fn from(e: triage::TriageError) -> Self {
        ClinicError::TriageRefused(e.to_string())
    }
}

impl From<session::DirectoryError> for ClinicError {
    fn from(e: session::DirectoryError) -> Self {
        ClinicError::AccountError(e.to_string())
    }
}

impl From<config::ConfigError> for ClinicError {
    fn from(e: config::ConfigError) -> Self {
        ClinicError::ConfigError(e.to_string())
    }
}

impl From<std::io::Error> for ClinicError {
    fn from(e: std::io::Error) -> Self {
        ClinicError::RuntimeError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for ClinicError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ClinicError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Foreign classification capability
// =========================================================================

/// Classification service supplied by the host app.
///
/// Receives a full prompt and returns the raw completion, or `None` when the
/// service could not answer. Called from a blocking worker thread.
#[uniffi::export(callback_interface)]
pub trait SymptomClassifier: Send + Sync {
    fn complete(&self, prompt: String) -> Option<String>;
}

struct ForeignModel {
    classifier: Arc<dyn SymptomClassifier>,
}

#[async_trait]
impl TriageModel for ForeignModel {
    fn name(&self) -> &str {
        "foreign"
    }

    async fn complete(&self, prompt: &str) -> ResponseResult<String> {
        let classifier = Arc::clone(&self.classifier);
        let prompt = prompt.to_string();

        tokio::task::spawn_blocking(move || classifier.complete(prompt))
            .await
            .map_err(|e| ResponseError::Inference(e.to_string()))?
            .ok_or_else(|| ResponseError::Inference("Classifier returned no completion".into()))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open the clinic using an optional TOML config file and the host's
/// classification service. The database location comes from the config.
#[uniffi::export]
pub fn open_clinic(
    config_path: Option<String>,
    classifier: Box<dyn SymptomClassifier>,
) -> Result<Arc<ClinicCore>, ClinicError> {
    let config = match config_path {
        Some(path) => ClinicConfig::load(&path)
            .map_err(|e| ClinicError::ConfigError(format!("{:#}", e)))?,
        None => ClinicConfig::default(),
    };
    let db = Database::open(&config.storage.database_path)?;
    let model = Arc::new(ForeignModel {
        classifier: Arc::from(classifier),
    });

    Ok(Arc::new(ClinicCore::with_model(config, db, model)?))
}

/// Open an in-memory clinic classified by the offline keyword model.
#[uniffi::export]
pub fn open_clinic_in_memory() -> Result<Arc<ClinicCore>, ClinicError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(ClinicCore::with_model(
        ClinicConfig::default(),
        db,
        Arc::new(MockTriageModel),
    )?))
}

/// Install the log subscriber. Returns `false` if one was already installed.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) -> bool {
    logging::init(filter.as_deref())
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe clinic state for FFI.
#[derive(uniffi::Object)]
pub struct ClinicCore {
    runtime: tokio::runtime::Runtime,
    config: ClinicConfig,
    gateway: Arc<ClassificationGateway>,
    classifier: DebouncedClassifier,
    last_assessment: Mutex<Option<SymptomAssessment>>,
    monitor: CapacityMonitor,
    roster: Vec<Doctor>,
    queue: Mutex<QueueStore>,
    users: Mutex<UserDirectory>,
    session: Mutex<Session>,
}

impl ClinicCore {
    /// Assemble a clinic around any model backend.
    pub fn with_model(
        config: ClinicConfig,
        db: Database,
        model: Arc<dyn TriageModel>,
    ) -> Result<Self, ClinicError> {
        config.validate()?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_time()
            .build()?;

        let model_name = model.name().to_string();
        let gateway = Arc::new(ClassificationGateway::from_config(
            model,
            &config.classification,
        ));
        let shared = db.into_shared();

        tracing::info!(model = %model_name, "Clinic core opened");

        Ok(Self {
            runtime,
            classifier: DebouncedClassifier::from_config(gateway.clone(), &config.classification),
            gateway,
            last_assessment: Mutex::new(None),
            monitor: CapacityMonitor::new(config.capacity.clone()),
            roster: models::default_roster(),
            queue: Mutex::new(QueueStore::open(shared.clone())),
            users: Mutex::new(UserDirectory::open(shared)),
            session: Mutex::new(Session::new()),
            config,
        })
    }

    /// The latest debounced assessment if it judged `symptoms`, otherwise a
    /// fresh classification of `symptoms`.
    fn assessment_for(&self, symptoms: &str) -> Result<SymptomAssessment, ClinicError> {
        let cached = self
            .last_assessment
            .lock()?
            .clone()
            .filter(|assessment| assessment.describes(symptoms));

        match cached {
            Some(assessment) => Ok(assessment),
            None => Ok(self.runtime.block_on(self.gateway.assess(symptoms))),
        }
    }
}

#[uniffi::export]
impl ClinicCore {
    // =========================================================================
    // Accounts
    // =========================================================================

    /// Register a patient account.
    pub fn register_user(
        &self,
        username: String,
        name: String,
        email: String,
    ) -> Result<FfiUser, ClinicError> {
        if email.trim().is_empty() {
            return Err(ClinicError::InvalidInput("Email is required".into()));
        }
        let mut users = self.users.lock()?;
        let user = users.register(User::new_patient(username, name, email))?;
        Ok(user.into())
    }

    /// Sign in by email.
    pub fn login(&self, email: String) -> Result<FfiUser, ClinicError> {
        let users = self.users.lock()?;
        let mut session = self.session.lock()?;
        Ok(session.login(&users, &email)?.into())
    }

    /// Sign out and reset simulation toggles.
    pub fn logout(&self) -> Result<(), ClinicError> {
        self.session.lock()?.logout();
        Ok(())
    }

    pub fn current_user(&self) -> Result<Option<FfiUser>, ClinicError> {
        Ok(self.session.lock()?.current_user().cloned().map(Into::into))
    }

    /// Change simulation toggles; `None` leaves a toggle as is.
    pub fn set_mutation(
        &self,
        is_volume_doubled: Option<bool>,
        is_staff_shortage: Option<bool>,
    ) -> Result<FfiMutationState, ClinicError> {
        let state = self.session.lock()?.update_mutation(MutationUpdate {
            is_volume_doubled,
            is_staff_shortage,
        });
        Ok(state.into())
    }

    // =========================================================================
    // Classification and intake
    // =========================================================================

    /// Classify symptom text after the debounce delay.
    ///
    /// Blocks the calling thread for the debounce delay plus the model call,
    /// so call it from a background thread, never the UI thread. Calls from
    /// different threads supersede each other; a superseded call returns
    /// `None`.
    pub fn classify_symptoms(
        &self,
        symptoms: String,
    ) -> Result<Option<FfiClassificationOutcome>, ClinicError> {
        let Some(assessment) = self.runtime.block_on(self.classifier.on_input(&symptoms)) else {
            return Ok(None);
        };

        let outcome = assessment.outcome.clone();
        *self.last_assessment.lock()? = Some(assessment);
        Ok(Some(outcome.into()))
    }

    /// Rank and queue an intake form.
    ///
    /// Reuses the latest [`ClinicCore::classify_symptoms`] result when it was
    /// made for `form.symptoms`; otherwise the symptoms are classified now.
    pub fn submit_intake(
        &self,
        form: FfiIntakeForm,
        walk_in: bool,
    ) -> Result<FfiAppointment, ClinicError> {
        let assessment = self.assessment_for(&form.symptoms)?;
        let channel = if walk_in {
            IntakeChannel::WalkIn
        } else {
            IntakeChannel::SelfService
        };

        let mut queue = self.queue.lock()?;
        let appointment = admit(&mut queue, &assessment, form.into(), channel)?;
        Ok(appointment.into())
    }

    /// Remove a queue entry. Unknown IDs return `false`.
    pub fn remove_appointment(&self, id: String) -> Result<bool, ClinicError> {
        Ok(self.queue.lock()?.remove(&id))
    }

    // =========================================================================
    // Queue views
    // =========================================================================

    /// Queue in priority order.
    pub fn sorted_queue(&self) -> Result<Vec<FfiAppointment>, ClinicError> {
        let queue = self.queue.lock()?;
        Ok(queue.sorted_view().into_iter().map(Into::into).collect())
    }

    /// 1-based position and estimated wait for an entry.
    pub fn queue_position(&self, id: String) -> Result<Option<FfiQueuePosition>, ClinicError> {
        let queue = self.queue.lock()?;
        let minutes_per_patient = self.config.capacity.minutes_per_patient;

        Ok(queue.position_of(&id).map(|position| FfiQueuePosition {
            position: position as u32,
            estimated_wait_minutes: (position as u32 - 1).saturating_mul(minutes_per_patient),
        }))
    }

    /// Overcrowding and staffing load under the session's toggles.
    pub fn capacity_report(&self) -> Result<FfiCapacityReport, ClinicError> {
        let mutation = self.session.lock()?.mutation();
        let queue = self.queue.lock()?;
        Ok(self.monitor.snapshot(queue.all(), &mutation).into())
    }

    pub fn list_doctors(&self) -> Vec<FfiDoctor> {
        self.roster.iter().cloned().map(Into::into).collect()
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe user.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiUser {
    pub id: String,
    pub username: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<User> for FfiUser {
    fn from(user: User) -> Self {
        let role = match user.role {
            UserRole::Patient => "PATIENT",
            UserRole::Staff => "STAFF",
            UserRole::Doctor => "DOCTOR",
        };
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            email: user.email,
            role: role.to_string(),
        }
    }
}

/// FFI-safe simulation toggles.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMutationState {
    pub is_volume_doubled: bool,
    pub is_staff_shortage: bool,
}

impl From<MutationState> for FfiMutationState {
    fn from(state: MutationState) -> Self {
        Self {
            is_volume_doubled: state.is_volume_doubled,
            is_staff_shortage: state.is_staff_shortage,
        }
    }
}

/// FFI-safe classification outcome.
#[derive(Debug, Clone, PartialEq, uniffi::Enum)]
pub enum FfiClassificationOutcome {
    Pending,
    Valid {
        level: String,
        score: u8,
        urgency_scale: u8,
        justification: String,
    },
    Invalid {
        justification: String,
    },
    Unavailable {
        reason: String,
    },
}

impl From<ClassificationOutcome> for FfiClassificationOutcome {
    fn from(outcome: ClassificationOutcome) -> Self {
        match outcome {
            ClassificationOutcome::Pending => Self::Pending,
            ClassificationOutcome::Valid(c) => Self::Valid {
                level: c.level.to_string(),
                score: c.score,
                urgency_scale: c.urgency_scale,
                justification: c.justification,
            },
            ClassificationOutcome::Invalid { justification } => Self::Invalid { justification },
            ClassificationOutcome::Unavailable { reason } => Self::Unavailable { reason },
        }
    }
}

/// FFI-safe intake form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiIntakeForm {
    pub patient_id: String,
    pub patient_name: String,
    pub age: u32,
    pub gender: String,
    pub phone: String,
    pub symptoms: String,
    pub urgency: u8,
    pub time_slot: String,
    pub doctor_id: String,
}

impl From<FfiIntakeForm> for IntakeForm {
    fn from(form: FfiIntakeForm) -> Self {
        IntakeForm {
            patient_id: form.patient_id,
            patient_name: form.patient_name,
            age: form.age,
            gender: form.gender,
            phone: form.phone,
            symptoms: form.symptoms,
            urgency: form.urgency,
            time_slot: form.time_slot,
            doctor_id: form.doctor_id,
        }
    }
}

/// FFI-safe queue entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointment {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub age: u32,
    pub gender: String,
    pub phone: String,
    pub symptoms: String,
    pub urgency_scale: u8,
    pub triage_level: String,
    pub triage_score: u8,
    pub time_slot: String,
    pub doctor_id: String,
    /// RFC 3339
    pub registered_at: String,
    pub is_offline: bool,
}

impl From<Appointment> for FfiAppointment {
    fn from(a: Appointment) -> Self {
        Self {
            id: a.id,
            patient_id: a.patient_id,
            patient_name: a.patient_name,
            age: a.age,
            gender: a.gender,
            phone: a.phone,
            symptoms: a.symptoms,
            urgency_scale: a.urgency_scale,
            triage_level: a.triage_level.to_string(),
            triage_score: a.triage_score,
            time_slot: a.time_slot,
            doctor_id: a.doctor_id,
            registered_at: a.registered_at.to_rfc3339(),
            is_offline: a.is_offline,
        }
    }
}

/// FFI-safe queue position.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiQueuePosition {
    pub position: u32,
    pub estimated_wait_minutes: u32,
}

/// FFI-safe capacity report.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCapacityReport {
    pub emergency_count: u32,
    pub critical_count: u32,
    pub intermediate_count: u32,
    pub normal_count: u32,
    pub total: u32,
    pub is_volume_overloaded: bool,
    pub is_resource_strained: bool,
    pub is_overcrowded: bool,
    pub active_staff: u32,
    pub capacity_ratio: Option<f64>,
    pub load_state: String,
    pub estimated_wait_minutes: u32,
}

impl From<CapacityReport> for FfiCapacityReport {
    fn from(report: CapacityReport) -> Self {
        Self {
            emergency_count: report.counts.emergency,
            critical_count: report.counts.critical,
            intermediate_count: report.counts.intermediate,
            normal_count: report.counts.normal,
            total: report.total,
            is_volume_overloaded: report.is_volume_overloaded,
            is_resource_strained: report.is_resource_strained,
            is_overcrowded: report.is_overcrowded,
            active_staff: report.active_staff,
            capacity_ratio: report.capacity_ratio,
            load_state: report.load_state.as_str().to_string(),
            estimated_wait_minutes: report.estimated_wait_minutes,
        }
    }
}

/// FFI-safe doctor.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDoctor {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub rating: f64,
    pub education: String,
    pub experience_years: u32,
    pub availability: Vec<FfiDaySlots>,
}

/// FFI-safe availability for one date.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDaySlots {
    pub date: String,
    pub slots: Vec<String>,
}

impl From<Doctor> for FfiDoctor {
    fn from(doctor: Doctor) -> Self {
        Self {
            id: doctor.id,
            name: doctor.name,
            specialty: doctor.specialty,
            rating: doctor.rating,
            education: doctor.education,
            experience_years: doctor.experience_years,
            availability: doctor
                .availability
                .into_iter()
                .map(|(date, slots)| FfiDaySlots { date, slots })
                .collect(),
        }
    }
}
