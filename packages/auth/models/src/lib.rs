#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Session, role, and protected operation types.
//!
//! A [`Session`] is the authenticated actor. Its [`Role`] decides which
//! [`Operation`]s the service layer lets through: reads and searches need
//! any session, mutations need [`Role::Admin`].

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Access level of an authenticated user.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Role {
    /// May import, create, update, and delete records.
    Admin,
    /// Read and search only.
    #[default]
    User,
}

impl Role {
    /// Returns `true` for [`Role::Admin`].
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// An operation a presentation layer may request.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    /// Bulk CSV import or sample data load.
    Import,
    /// Add a single record.
    Create,
    /// Edit an existing record.
    Update,
    /// Remove records.
    Delete,
    /// List or view records.
    Read,
    /// Any-field or single-field search.
    Search,
}

impl Operation {
    /// Returns `true` if only admins may perform this operation.
    #[must_use]
    pub const fn requires_admin(self) -> bool {
        matches!(
            self,
            Self::Import | Self::Create | Self::Update | Self::Delete
        )
    }
}

/// The authenticated actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque user identifier.
    pub user_id: String,
    /// Name shown in greetings.
    pub display_name: String,
    /// Login email.
    pub email: String,
    /// Access level.
    pub role: Role,
}

impl Session {
    /// Creates a session.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        display_name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            email: email.into(),
            role,
        }
    }

    /// Returns `true` if this session may perform `operation`.
    #[must_use]
    pub const fn can(&self, operation: Operation) -> bool {
        !operation.requires_admin() || self.role.is_admin()
    }
}

/// Returns `true` if `session` may perform `operation`.
///
/// Without a session nothing is permitted.
#[must_use]
pub const fn is_authorized_for(operation: Operation, session: Option<&Session>) -> bool {
    match session {
        Some(session) => session.can(operation),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role) -> Session {
        Session {
            user_id: "u1".to_string(),
            display_name: "Test".to_string(),
            email: "test@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn admin_may_do_everything() {
        let admin = session(Role::Admin);
        for op in [
            Operation::Import,
            Operation::Create,
            Operation::Update,
            Operation::Delete,
            Operation::Read,
            Operation::Search,
        ] {
            assert!(is_authorized_for(op, Some(&admin)), "{op} denied");
        }
    }

    #[test]
    fn user_may_only_read_and_search() {
        let user = session(Role::User);
        assert!(is_authorized_for(Operation::Read, Some(&user)));
        assert!(is_authorized_for(Operation::Search, Some(&user)));
        assert!(!is_authorized_for(Operation::Import, Some(&user)));
        assert!(!is_authorized_for(Operation::Create, Some(&user)));
        assert!(!is_authorized_for(Operation::Update, Some(&user)));
        assert!(!is_authorized_for(Operation::Delete, Some(&user)));
    }

    #[test]
    fn anonymous_may_do_nothing() {
        assert!(!is_authorized_for(Operation::Read, None));
        assert!(!is_authorized_for(Operation::Search, None));
        assert!(!is_authorized_for(Operation::Import, None));
    }

    #[test]
    fn role_round_trips_through_strings() {
        assert_eq!(Role::Admin.to_string(), "Admin");
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("guest".parse::<Role>().is_err());
    }
}
