//! Remote mirror boundary.
//!
//! The local store is authoritative. When a [`RemoteMirror`] reports
//! connectivity, local writes are pushed to it on a best-effort basis and
//! [`SyncCoordinator::sync_from_remote`] can pull its records down. The
//! only mirror shipped is [`OfflineRemote`], which never connects, so in
//! practice every coordinator runs in offline mode.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crimes_crime_models::CrimeRecord;
use crimes_database::{DbError, RecordStore};
use strum_macros::{AsRefStr, Display, EnumString};

/// Environment variable selecting the [`SyncMode`].
pub const SYNC_MODE_ENV: &str = "CRIMES_SYNC_MODE";

/// Which databases are in use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SyncMode {
    /// Local store only; the remote is never contacted.
    LocalOnly,
    /// Remote only.
    RemoteOnly,
    /// Local store with remote mirroring.
    #[default]
    Hybrid,
}

impl SyncMode {
    /// Reads [`SYNC_MODE_ENV`], falling back to [`SyncMode::Hybrid`] when
    /// unset or unrecognised.
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var(SYNC_MODE_ENV) {
            Ok(value) => value.parse().unwrap_or_else(|_| {
                log::warn!("Unknown {SYNC_MODE_ENV} value {value:?}, using hybrid");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    #[must_use]
    pub const fn is_remote_enabled(self) -> bool {
        matches!(self, Self::RemoteOnly | Self::Hybrid)
    }
}

/// Errors from remote operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The remote could not be reached.
    #[error("No internet connection")]
    Offline,

    /// The remote answered with an error.
    #[error("{0}")]
    Remote(String),

    /// Pulled records could not be written locally.
    #[error("Sync failed: {0}")]
    Store(#[from] DbError),
}

/// Human-readable synchronisation state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SyncStatus {
    #[default]
    NotSynced,
    /// Last connectivity check failed or remote is disabled.
    Offline,
    Connected,
    Syncing,
    Completed {
        /// Records pulled from the remote.
        count: u64,
    },
    Failed {
        /// Failure description.
        message: String,
    },
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotSynced => f.write_str("Not synced"),
            Self::Offline => f.write_str("Offline mode - using local database"),
            Self::Connected => f.write_str("Connected to remote database"),
            Self::Syncing => f.write_str("Syncing from remote database..."),
            Self::Completed { count } => write!(f, "Sync completed: {count} crimes"),
            Self::Failed { message } => write!(f, "Sync failed: {message}"),
        }
    }
}

/// A remote copy of the record store.
pub trait RemoteMirror: Send + Sync {
    /// Returns `true` if the remote is reachable.
    fn check_connectivity(&self) -> bool;

    /// Mirrors a newly created record.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if the remote rejects the write.
    fn push_create(&self, record: &CrimeRecord) -> Result<(), SyncError>;

    /// Mirrors an updated record.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if the remote rejects the write.
    fn push_update(&self, record: &CrimeRecord) -> Result<(), SyncError>;

    /// Mirrors a deletion.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if the remote rejects the delete.
    fn push_delete(&self, id: &str) -> Result<(), SyncError>;

    /// Fetches every remote record.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if the remote cannot be read.
    fn pull_all(&self) -> Result<Vec<CrimeRecord>, SyncError>;
}

/// A [`RemoteMirror`] that is never reachable. Pushes are no-ops.
pub struct OfflineRemote;

impl RemoteMirror for OfflineRemote {
    fn check_connectivity(&self) -> bool {
        false
    }

    fn push_create(&self, _record: &CrimeRecord) -> Result<(), SyncError> {
        Ok(())
    }

    fn push_update(&self, _record: &CrimeRecord) -> Result<(), SyncError> {
        Ok(())
    }

    fn push_delete(&self, _id: &str) -> Result<(), SyncError> {
        Ok(())
    }

    fn pull_all(&self) -> Result<Vec<CrimeRecord>, SyncError> {
        Err(SyncError::Offline)
    }
}

/// Tracks connectivity and mirrors local writes to a [`RemoteMirror`].
pub struct SyncCoordinator {
    remote: Box<dyn RemoteMirror>,
    mode: SyncMode,
    online: AtomicBool,
    status: Mutex<SyncStatus>,
}

impl SyncCoordinator {
    #[must_use]
    pub fn new(remote: Box<dyn RemoteMirror>, mode: SyncMode) -> Self {
        Self {
            remote,
            mode,
            online: AtomicBool::new(false),
            status: Mutex::new(SyncStatus::NotSynced),
        }
    }

    /// A coordinator over [`OfflineRemote`] using [`SyncMode::from_env`].
    #[must_use]
    pub fn offline() -> Self {
        Self::new(Box::new(OfflineRemote), SyncMode::from_env())
    }

    fn set_status(&self, status: SyncStatus) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
    }

    #[must_use]
    pub const fn mode(&self) -> SyncMode {
        self.mode
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether the last connectivity check succeeded.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Probes the remote and updates the online flag and status.
    ///
    /// [`SyncMode::LocalOnly`] never probes and is always offline.
    pub fn check_connectivity(&self) -> bool {
        let online = self.mode.is_remote_enabled() && self.remote.check_connectivity();
        self.online.store(online, Ordering::SeqCst);

        if online {
            log::info!("Connected to remote database");
            self.set_status(SyncStatus::Connected);
        } else {
            log::info!("Using offline mode with local database");
            self.set_status(SyncStatus::Offline);
        }

        online
    }

    fn mirror(
        &self,
        what: &str,
        id: &str,
        push: impl FnOnce(&dyn RemoteMirror) -> Result<(), SyncError>,
    ) {
        if !self.is_online() {
            return;
        }
        match push(self.remote.as_ref()) {
            Ok(()) => log::debug!("Mirrored {what} of {id}"),
            Err(e) => log::warn!("Failed to mirror {what} of {id}: {e}"),
        }
    }

    /// Pushes a created record when online. Failures are logged only.
    pub fn mirror_create(&self, record: &CrimeRecord) {
        self.mirror("create", &record.id, |remote| remote.push_create(record));
    }

    /// Pushes an updated record when online. Failures are logged only.
    pub fn mirror_update(&self, record: &CrimeRecord) {
        self.mirror("update", &record.id, |remote| remote.push_update(record));
    }

    /// Pushes a deletion when online. Failures are logged only.
    pub fn mirror_delete(&self, id: &str) {
        self.mirror("delete", id, |remote| remote.push_delete(id));
    }

    /// Copies every remote record into `store`, replacing local copies.
    ///
    /// # Errors
    ///
    /// [`SyncError::Offline`] without touching the status when the last
    /// connectivity check failed; otherwise any pull or write error, which
    /// is also recorded as [`SyncStatus::Failed`].
    pub fn sync_from_remote(&self, store: &dyn RecordStore) -> Result<u64, SyncError> {
        if !self.is_online() {
            return Err(SyncError::Offline);
        }

        self.set_status(SyncStatus::Syncing);

        let result = self
            .remote
            .pull_all()
            .and_then(|records| store.insert_batch(&records).map_err(SyncError::from));

        match result {
            Ok(count) => {
                log::info!("Synced {count} crimes from remote database");
                self.set_status(SyncStatus::Completed { count });
                Ok(count)
            }
            Err(e) => {
                log::error!("Error syncing from remote: {e}");
                let message = match &e {
                    SyncError::Store(inner) => inner.to_string(),
                    other => other.to_string(),
                };
                self.set_status(SyncStatus::Failed { message });
                Err(e)
            }
        }
    }
}
