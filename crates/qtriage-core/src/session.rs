//! Registered users and the signed-in session.

use thiserror::Error;

use crate::capacity::{MutationState, MutationUpdate};
use crate::db::{load_or_empty, save_best_effort, SharedDatabase, USERS_KEY};
use crate::models::User;

/// User directory errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("An account already exists for {0}")]
    DuplicateEmail(String),

    #[error("No account found for {0}")]
    UnknownEmail(String),
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Persisted list of registered accounts, keyed by email.
pub struct UserDirectory {
    db: SharedDatabase,
    users: Vec<User>,
}

impl UserDirectory {
    /// Open the directory. Missing or malformed data starts empty.
    pub fn open(db: SharedDatabase) -> Self {
        let users: Vec<User> = load_or_empty(&db, USERS_KEY);
        tracing::debug!(count = users.len(), "Loaded user directory");
        Self { db, users }
    }

    /// Add an account; emails must be unique ignoring case.
    pub fn register(&mut self, user: User) -> DirectoryResult<User> {
        if self.find_by_email(&user.email).is_some() {
            return Err(DirectoryError::DuplicateEmail(user.email));
        }

        self.users.push(user.clone());
        save_best_effort(&self.db, USERS_KEY, &self.users);
        tracing::info!(id = %user.id, role = ?user.role, "User registered");
        Ok(user)
    }

    pub fn find_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.has_email(email))
    }

    pub fn all(&self) -> &[User] {
        &self.users
    }
}

/// Who is signed in plus the simulation toggles.
#[derive(Debug, Clone, Default)]
pub struct Session {
    current_user: Option<User>,
    mutation: MutationState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sign in by email. A failed login leaves the session unchanged.
    pub fn login(&mut self, directory: &UserDirectory, email: &str) -> DirectoryResult<User> {
        let user = directory
            .find_by_email(email)
            .cloned()
            .ok_or_else(|| DirectoryError::UnknownEmail(email.trim().to_string()))?;

        self.current_user = Some(user.clone());
        tracing::info!(id = %user.id, "User signed in");
        Ok(user)
    }

    /// Sign out and reset every simulation toggle.
    pub fn logout(&mut self) {
        if let Some(user) = self.current_user.take() {
            tracing::info!(id = %user.id, "User signed out");
        }
        self.mutation = MutationState::default();
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn mutation(&self) -> MutationState {
        self.mutation
    }

    /// Merge a partial toggle update and return the result.
    pub fn update_mutation(&mut self, update: MutationUpdate) -> MutationState {
        self.mutation.apply(update);
        tracing::debug!(
            doubled = self.mutation.is_volume_doubled,
            shortage = self.mutation.is_staff_shortage,
            "Simulation toggles changed"
        );
        self.mutation
    }
}
