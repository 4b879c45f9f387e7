#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Crime record and session storage.
//!
//! Everything lives in a single `DuckDB` file (`data/crimes.duckdb` by
//! default): a `crimes` table keyed by record id and a `_session`
//! key/value table holding the signed-in user. The [`RecordStore`] and
//! [`SessionStore`] traits are the seams the importer, auth, and service
//! crates program against.

pub mod crime_db;
pub mod db;
pub mod paths;
pub mod session_db;

use crimes_auth_models::Session;
use crimes_crime_models::{CrimeRecord, SearchField};

pub use crime_db::DuckDbRecordStore;
pub use session_db::DuckDbSessionStore;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// `DuckDB` error.
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// I/O error (creating the data directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Durable keyed storage for crime records.
///
/// Writes are single-row upserts; batch inserts loop over them and are
/// not atomic. Rows written before a failing row stay written.
pub trait RecordStore: Send + Sync {
    /// Inserts `record`, replacing any existing record with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the write fails.
    fn insert(&self, record: &CrimeRecord) -> Result<(), DbError>;

    /// Inserts every record with [`RecordStore::insert`] semantics.
    ///
    /// Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on the first failing row.
    fn insert_batch(&self, records: &[CrimeRecord]) -> Result<u64, DbError>;

    /// Overwrites the record with the same id. Does nothing if the id is
    /// not stored.
    ///
    /// Returns `true` if a row was changed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the write fails.
    fn update(&self, record: &CrimeRecord) -> Result<bool, DbError>;

    /// Removes the record with `id`. Does nothing if absent.
    ///
    /// Returns `true` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the delete fails.
    fn delete(&self, id: &str) -> Result<bool, DbError>;

    /// Removes every record, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the delete fails.
    fn delete_all(&self) -> Result<u64, DbError>;

    /// Looks up a record by id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    fn get_by_id(&self, id: &str) -> Result<Option<CrimeRecord>, DbError>;

    /// Returns `true` if a record with `id` is stored.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    fn exists(&self, id: &str) -> Result<bool, DbError>;

    /// Returns every record ordered by id, descending (lexicographic).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    fn get_all(&self) -> Result<Vec<CrimeRecord>, DbError>;

    /// Returns the number of stored records.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    fn count(&self) -> Result<u64, DbError>;

    /// Returns records where `term` is a case-insensitive substring of the
    /// crime type, area name, outcome category, reporting force, or id.
    ///
    /// An empty term matches every record. Results are ordered like
    /// [`RecordStore::get_all`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    fn search_any_field(&self, term: &str) -> Result<Vec<CrimeRecord>, DbError>;

    /// Same as [`RecordStore::search_any_field`] restricted to one field.
    /// [`SearchField::Unknown`] searches the crime type.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    fn search_by_field(&self, field: &SearchField, term: &str)
    -> Result<Vec<CrimeRecord>, DbError>;
}

/// Persistence for the single signed-in [`Session`].
pub trait SessionStore: Send + Sync {
    /// Loads the persisted session, if the user is logged in.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the read fails.
    fn load(&self) -> Result<Option<Session>, DbError>;

    /// Persists `session`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the write fails.
    fn save(&self, session: &Session) -> Result<(), DbError>;

    /// Removes every persisted session key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the delete fails.
    fn clear(&self) -> Result<(), DbError>;
}
