#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Operations a presentation layer calls, with access checks applied.
//!
//! [`CrimeService`] wraps a [`crimes_database::RecordStore`] and checks
//! every call against the caller's session before touching storage.
//! [`search`] maps user-facing field labels to store queries and [`sync`]
//! holds the remote-mirror boundary, which currently always runs offline.

pub mod crime_service;
pub mod search;
pub mod sync;

use crimes_auth_models::Operation;
use crimes_crime_models::ValidationError;
use crimes_database::DbError;
use crimes_import::ImportError;

pub use crime_service::CrimeService;
pub use search::SearchScope;
pub use sync::{SyncCoordinator, SyncMode, SyncStatus};

/// Why a service call did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The session's role may not perform the operation.
    #[error("Access denied: {operation} requires an admin account")]
    AccessDenied {
        /// The rejected operation.
        operation: Operation,
    },

    /// No one is signed in.
    #[error("Not signed in")]
    NotAuthenticated,

    /// The record failed validation; nothing was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No record has the requested id.
    #[error("Crime not found: {id}")]
    NotFound {
        /// The id that was looked up.
        id: String,
    },

    /// The store failed.
    #[error("Storage failed: {0}")]
    Store(#[from] DbError),

    /// The import aborted.
    #[error(transparent)]
    Import(#[from] ImportError),
}
