//! Model-facing side of symptom triage.
//!
//! This crate builds classification prompts, parses model completions into
//! [`TriageResponse`] values, and defines the [`TriageModel`] seam that
//! concrete backends (hosted APIs, on-device models, the offline keyword
//! classifier) implement.

pub mod mock;
pub mod model;
pub mod prompts;
pub mod response;

pub use mock::*;
pub use model::*;
pub use prompts::*;
pub use response::*;
