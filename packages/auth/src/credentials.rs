//! Who may sign in, and as what.

use std::sync::LazyLock;

use crimes_auth_models::{Role, Session};
use regex::Regex;

use crate::{
    ADMIN_EMAIL, ADMIN_PASSWORD, AuthError, DEMO_USER_EMAIL, DEMO_USER_PASSWORD,
    MIN_PASSWORD_LENGTH,
};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9+._%\-]{1,256}@[a-zA-Z0-9][a-zA-Z0-9\-]{0,64}(\.[a-zA-Z0-9][a-zA-Z0-9\-]{0,25})+$",
    )
    .expect("valid regex")
});

/// Returns `true` if `email` is a syntactically valid address.
///
/// The whole string must match; surrounding whitespace is rejected.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Returns `true` if `email` is [`ADMIN_EMAIL`], ignoring ASCII case.
#[must_use]
pub fn is_admin_email(email: &str) -> bool {
    email.eq_ignore_ascii_case(ADMIN_EMAIL)
}

fn is_long_enough(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}

fn timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Applies the login rules to `email` and `password`.
///
/// In order:
///
/// 1. the admin pair yields an [`Role::Admin`] session for `admin_uid`;
/// 2. the demo pair yields a [`Role::User`] session for `user_uid`;
/// 3. any valid email with a password of at least
///    [`MIN_PASSWORD_LENGTH`] characters yields a `demo_<millis>` session,
///    admin only if the email is [`ADMIN_EMAIL`].
///
/// Email comparisons ignore ASCII case; passwords are compared exactly.
///
/// # Errors
///
/// [`AuthError::MissingCredentials`] if either value is empty, otherwise
/// [`AuthError::InvalidCredentials`] if no rule matches.
pub fn authenticate(email: &str, password: &str) -> Result<Session, AuthError> {
    if email.is_empty() || password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    if is_admin_email(email) && password == ADMIN_PASSWORD {
        return Ok(Session::new("admin_uid", "Admin User", email, Role::Admin));
    }

    if email.eq_ignore_ascii_case(DEMO_USER_EMAIL) && password == DEMO_USER_PASSWORD {
        return Ok(Session::new("user_uid", "Regular User", email, Role::User));
    }

    if is_valid_email(email) && is_long_enough(password) {
        let role = if is_admin_email(email) {
            Role::Admin
        } else {
            Role::User
        };
        return Ok(Session::new(
            format!("demo_{}", timestamp_millis()),
            "Demo User",
            email,
            role,
        ));
    }

    Err(AuthError::InvalidCredentials)
}

/// Validates a registration and builds the resulting session.
///
/// `requested_role` is kept unless the email is [`ADMIN_EMAIL`], which
/// always registers as [`Role::Admin`].
///
/// # Errors
///
/// [`AuthError::MissingFields`], [`AuthError::InvalidEmail`], or
/// [`AuthError::PasswordTooShort`], checked in that order.
pub fn register_account(
    full_name: &str,
    email: &str,
    password: &str,
    requested_role: Role,
) -> Result<Session, AuthError> {
    if full_name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields);
    }
    if !is_valid_email(email) {
        return Err(AuthError::InvalidEmail);
    }
    if !is_long_enough(password) {
        return Err(AuthError::PasswordTooShort);
    }

    let role = if is_admin_email(email) {
        Role::Admin
    } else {
        requested_role
    };

    Ok(Session::new(
        format!("user_{}", timestamp_millis()),
        full_name,
        email,
        role,
    ))
}
