#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! CSV import pipeline for crime records.
//!
//! Reads a header line followed by data lines in the fixed order
//! `id, crimeType, reportedBy, areaName, latitude, longitude,
//! outcomeCategory`, skips malformed lines and ids already in the store,
//! and writes new records in batches of [`IMPORT_BATCH_SIZE`].
//!
//! Callers observe the run through an [`ImportListener`]: any number of
//! [`ImportListener::on_progress`] calls with increasing counts, then
//! exactly one of [`ImportListener::on_success`] or
//! [`ImportListener::on_error`]. [`events::spawn_import`] exposes the same
//! run as a channel of [`events::ImportEvent`]s.

pub mod csv_line;
pub mod events;
pub mod pipeline;
pub mod sample;

use crimes_database::DbError;

pub use pipeline::{import_file, import_reader};

/// Number of new records written per `insert_batch` call.
pub const IMPORT_BATCH_SIZE: usize = 100;

/// Minimum number of fields a data line must have.
pub const MIN_FIELDS: usize = 7;

/// Month tag assigned to imported records (the CSV has no month column).
pub const DEFAULT_MONTH: &str = "2024-01";

/// Errors that abort an import.
///
/// Malformed lines and duplicate ids are not errors; they are counted in
/// [`ImportSummary`].
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The CSV source could not be opened or read.
    #[error("Failed to read CSV file: {0}")]
    Io(#[from] std::io::Error),

    /// The record store rejected a read or write.
    #[error("Import failed: {0}")]
    Store(#[from] DbError),
}

/// Receives progress and the terminal outcome of an import.
///
/// Implementations must be `Send + Sync` so a run can move to a blocking
/// task.
pub trait ImportListener: Send + Sync {
    /// Called after each full batch is written with the running total of
    /// imported records.
    fn on_progress(&self, imported: u64);

    /// Called once when the source is exhausted.
    fn on_success(&self, imported: u64);

    /// Called once when the run aborts. Batches written before the error
    /// stay in the store.
    fn on_error(&self, message: &str);
}

/// An [`ImportListener`] that ignores every callback.
pub struct NullListener;

impl ImportListener for NullListener {
    fn on_progress(&self, _imported: u64) {}
    fn on_success(&self, _imported: u64) {}
    fn on_error(&self, _message: &str) {}
}

/// Tuning knobs for an import run.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Records per batch write. Values below 1 are treated as 1.
    pub batch_size: usize,
    /// Month tag stamped on every imported record.
    pub month: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            batch_size: IMPORT_BATCH_SIZE,
            month: DEFAULT_MONTH.to_string(),
        }
    }
}

/// Counts from a finished import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Data lines read (header excluded).
    pub lines: u64,
    /// New records written to the store.
    pub imported: u64,
    /// Lines whose id was already stored or already seen in this run.
    pub duplicates: u64,
    /// Lines skipped for too few fields or a missing id/crime type.
    pub rejected: u64,
}
