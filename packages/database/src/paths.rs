#![allow(clippy::module_name_repetitions)]
//! Canonical file paths for the data directory.
//!
//! The data directory is `$CRIMES_DATA_DIR` when set, otherwise the
//! project root's `data/` directory.

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "CRIMES_DATA_DIR";

/// File name of the `DuckDB` database inside the data directory.
pub const DATABASE_FILE: &str = "crimes.duckdb";

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`. Falls back to the
/// manifest directory itself if it has fewer than two ancestors.
#[must_use]
pub fn project_root() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest
        .ancestors()
        .nth(2)
        .unwrap_or(manifest)
        .to_path_buf()
}

/// Returns the data directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV).map_or_else(|| project_root().join("data"), PathBuf::from)
}

/// Returns the path of the `DuckDB` file inside `data_dir`.
#[must_use]
pub fn database_path_in(data_dir: &Path) -> PathBuf {
    data_dir.join(DATABASE_FILE)
}

/// Returns the default `DuckDB` file path.
#[must_use]
pub fn database_path() -> PathBuf {
    database_path_in(&data_dir())
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
