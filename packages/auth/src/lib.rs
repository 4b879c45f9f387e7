#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Local credential policy and the persisted signed-in session.
//!
//! [`credentials`] decides who may sign in and with which [`Role`]. It is
//! a fixed business rule, not a security mechanism: passwords are neither
//! hashed nor stored. [`SessionManager`] holds the one active session and
//! persists it through a [`crimes_database::SessionStore`] so it survives
//! restarts until [`SessionManager::logout`].
//!
//! [`Role`]: crimes_auth_models::Role

pub mod credentials;
pub mod manager;

use crimes_database::DbError;

pub use credentials::{authenticate, is_admin_email, is_valid_email, register_account};
pub use manager::SessionManager;

/// Address that is always granted [`crimes_auth_models::Role::Admin`].
pub const ADMIN_EMAIL: &str = "admin@crimes.com";

/// Password of the built-in admin account.
pub const ADMIN_PASSWORD: &str = "admin123";

/// Address of the built-in demo user.
pub const DEMO_USER_EMAIL: &str = "user@crimes.com";

/// Password of the built-in demo user.
pub const DEMO_USER_PASSWORD: &str = "user123";

/// Shortest password accepted by login and registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Reasons a login, registration, or logout is rejected.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Login with an empty email or password.
    #[error("Email and password are required")]
    MissingCredentials,

    /// Registration with an empty name, email, or password.
    #[error("All fields are required")]
    MissingFields,

    /// Registration with a malformed email.
    #[error("Invalid email format")]
    InvalidEmail,

    /// Registration with a password shorter than [`MIN_PASSWORD_LENGTH`].
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    /// Login that matched no rule.
    #[error("Invalid email format or password too short (minimum 6 characters)")]
    InvalidCredentials,

    /// The session could not be persisted or cleared.
    #[error("Session storage failed: {0}")]
    Store(#[from] DbError),
}
