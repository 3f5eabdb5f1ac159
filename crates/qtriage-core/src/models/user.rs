//! Clinic user accounts.

use serde::{Deserialize, Serialize};

/// What a signed-in user is allowed to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Patient,
    Staff,
    Doctor,
}

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Generated UUID
    pub id: String,
    pub username: String,
    /// Display name
    pub name: String,
    /// Login key, compared case-insensitively
    pub email: String,
    pub role: UserRole,
}

impl User {
    /// Create a new patient account.
    pub fn new_patient(username: String, name: String, email: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username,
            name,
            email: email.trim().to_string(),
            role: UserRole::Patient,
        }
    }

    /// Whether `email` identifies this account.
    pub fn has_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }
}
