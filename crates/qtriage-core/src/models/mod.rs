//! Domain models for the clinic queue.

mod appointment;
mod doctor;
mod triage;
mod user;

pub use appointment::*;
pub use doctor::*;
pub use triage::*;
pub use user::*;
