//! Session-checked record operations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crimes_auth_models::{Operation, Session};
use crimes_crime_models::{CrimeRecord, validate_record};
use crimes_database::RecordStore;
use crimes_import::events::ImportEvent;
use crimes_import::{ImportError, ImportListener, ImportOptions, ImportSummary};
use tokio::sync::mpsc;

use crate::search::SearchScope;
use crate::sync::SyncCoordinator;
use crate::ServiceError;

/// Checks `session` against `operation`.
///
/// # Errors
///
/// [`ServiceError::NotAuthenticated`] without a session,
/// [`ServiceError::AccessDenied`] if the role is insufficient.
pub fn authorize(operation: Operation, session: Option<&Session>) -> Result<&Session, ServiceError> {
    let session = session.ok_or(ServiceError::NotAuthenticated)?;

    if !session.can(operation) {
        log::warn!(
            "{} ({}) denied {operation}",
            session.email,
            session.role
        );
        return Err(ServiceError::AccessDenied { operation });
    }

    Ok(session)
}

/// Record, search, and import operations for one store.
///
/// Every method takes the caller's session and rejects the call before
/// touching the store if [`authorize`] fails. Mutations are mirrored
/// through the optional [`SyncCoordinator`].
pub struct CrimeService {
    store: Arc<dyn RecordStore>,
    sync: Option<SyncCoordinator>,
    import_options: ImportOptions,
}

impl CrimeService {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            sync: None,
            import_options: ImportOptions::default(),
        }
    }

    /// Mirrors mutations through `sync`.
    #[must_use]
    pub fn with_sync(mut self, sync: SyncCoordinator) -> Self {
        self.sync = Some(sync);
        self
    }

    /// Overrides batch size and month tag for imports.
    #[must_use]
    pub fn with_import_options(mut self, options: ImportOptions) -> Self {
        self.import_options = options;
        self
    }

    #[must_use]
    pub const fn sync(&self) -> Option<&SyncCoordinator> {
        self.sync.as_ref()
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// All records, ids descending.
    ///
    /// # Errors
    ///
    /// Authorization or store failure.
    pub fn list(&self, session: Option<&Session>) -> Result<Vec<CrimeRecord>, ServiceError> {
        authorize(Operation::Read, session)?;
        Ok(self.store.get_all()?)
    }

    /// The record with `id`.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] if absent, or an authorization or store
    /// failure.
    pub fn get(&self, session: Option<&Session>, id: &str) -> Result<CrimeRecord, ServiceError> {
        authorize(Operation::Read, session)?;
        self.store
            .get_by_id(id)?
            .ok_or_else(|| ServiceError::NotFound { id: id.to_string() })
    }

    /// Number of stored records.
    ///
    /// # Errors
    ///
    /// Authorization or store failure.
    pub fn count(&self, session: Option<&Session>) -> Result<u64, ServiceError> {
        authorize(Operation::Read, session)?;
        Ok(self.store.count()?)
    }

    /// Records that can be placed on a map.
    ///
    /// # Errors
    ///
    /// Authorization or store failure.
    pub fn mappable_records(
        &self,
        session: Option<&Session>,
    ) -> Result<Vec<CrimeRecord>, ServiceError> {
        authorize(Operation::Read, session)?;
        let records = self.store.get_all()?;
        let total = records.len();

        let mappable: Vec<_> = records
            .into_iter()
            .filter(CrimeRecord::has_valid_coordinate)
            .collect();

        log::debug!("{} of {total} records have usable coordinates", mappable.len());
        Ok(mappable)
    }

    /// Searches with a field label as shown to users (see
    /// [`SearchScope::parse`]).
    ///
    /// # Errors
    ///
    /// Authorization or store failure.
    pub fn search(
        &self,
        session: Option<&Session>,
        field_label: &str,
        term: &str,
    ) -> Result<Vec<CrimeRecord>, ServiceError> {
        self.search_scope(session, &SearchScope::parse(field_label), term)
    }

    /// Searches within `scope`.
    ///
    /// # Errors
    ///
    /// Authorization or store failure.
    pub fn search_scope(
        &self,
        session: Option<&Session>,
        scope: &SearchScope,
        term: &str,
    ) -> Result<Vec<CrimeRecord>, ServiceError> {
        authorize(Operation::Search, session)?;
        let results = scope.run(self.store.as_ref(), term)?;
        log::debug!("Search {scope:?} for {term:?}: {} results", results.len());
        Ok(results)
    }

    /// Validates and stores a new record, replacing any with the same id.
    ///
    /// # Errors
    ///
    /// Authorization, validation, or store failure.
    pub fn create(
        &self,
        session: Option<&Session>,
        record: &CrimeRecord,
    ) -> Result<(), ServiceError> {
        authorize(Operation::Create, session)?;
        validate_record(record)?;

        self.store.insert(record)?;
        log::info!("Crime created: {}", record.id);

        if let Some(sync) = &self.sync {
            sync.mirror_create(record);
        }
        Ok(())
    }

    /// Validates and overwrites an existing record.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] if no record has the id, or an
    /// authorization, validation, or store failure.
    pub fn update(
        &self,
        session: Option<&Session>,
        record: &CrimeRecord,
    ) -> Result<(), ServiceError> {
        authorize(Operation::Update, session)?;
        validate_record(record)?;

        if !self.store.update(record)? {
            return Err(ServiceError::NotFound {
                id: record.id.clone(),
            });
        }
        log::info!("Crime updated: {}", record.id);

        if let Some(sync) = &self.sync {
            sync.mirror_update(record);
        }
        Ok(())
    }

    /// Removes the record with `id`.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] if absent, or an authorization or store
    /// failure.
    pub fn delete(&self, session: Option<&Session>, id: &str) -> Result<(), ServiceError> {
        authorize(Operation::Delete, session)?;

        if !self.store.delete(id)? {
            return Err(ServiceError::NotFound { id: id.to_string() });
        }
        log::info!("Crime deleted: {id}");

        if let Some(sync) = &self.sync {
            sync.mirror_delete(id);
        }
        Ok(())
    }

    /// Removes every record, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Authorization or store failure.
    pub fn delete_all(&self, session: Option<&Session>) -> Result<u64, ServiceError> {
        authorize(Operation::Delete, session)?;
        let removed = self.store.delete_all()?;
        log::info!("Deleted all {removed} crimes");
        Ok(removed)
    }

    /// Imports the CSV at `path` on the calling thread.
    ///
    /// An authorization failure is returned without calling `listener`.
    ///
    /// # Errors
    ///
    /// Authorization failure or [`ServiceError::Import`].
    pub fn import_file(
        &self,
        session: Option<&Session>,
        path: &Path,
        listener: &dyn ImportListener,
    ) -> Result<ImportSummary, ServiceError> {
        authorize(Operation::Import, session)?;
        Ok(crimes_import::import_file(
            path,
            self.store.as_ref(),
            listener,
            &self.import_options,
        )?)
    }

    /// Starts importing `path` on the blocking pool; see
    /// [`crimes_import::events::spawn_import`].
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Authorization failure; import errors arrive as events.
    #[allow(clippy::type_complexity)]
    pub fn spawn_import(
        &self,
        session: Option<&Session>,
        path: PathBuf,
    ) -> Result<
        (
            mpsc::Receiver<ImportEvent>,
            tokio::task::JoinHandle<Result<ImportSummary, ImportError>>,
        ),
        ServiceError,
    > {
        authorize(Operation::Import, session)?;
        Ok(crimes_import::events::spawn_import(
            path,
            self.store.clone(),
            self.import_options.clone(),
        ))
    }

    /// Loads the built-in sample records.
    ///
    /// # Errors
    ///
    /// Authorization failure or [`ServiceError::Import`].
    pub fn load_sample_data(
        &self,
        session: Option<&Session>,
        listener: &dyn ImportListener,
    ) -> Result<u64, ServiceError> {
        authorize(Operation::Import, session)?;
        Ok(crimes_import::sample::load_sample_data(
            self.store.as_ref(),
            listener,
        )?)
    }
}
