//! The single active session, loaded at startup and persisted on change.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use crimes_auth_models::{Operation, Role, Session, is_authorized_for};
use crimes_database::SessionStore;

use crate::AuthError;

/// Owns the signed-in [`Session`] for one process.
///
/// Create one at startup with [`SessionManager::load`] and pass it by
/// reference. Every change is written to the backing [`SessionStore`]
/// before it becomes visible.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    current: RwLock<Option<Session>>,
}

impl SessionManager {
    /// Restores whatever session `store` holds.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] if the stored session cannot be read.
    pub fn load(store: Arc<dyn SessionStore>) -> Result<Self, AuthError> {
        let current = store.load()?;

        match &current {
            Some(session) => log::debug!(
                "Restored session for {} ({})",
                session.display_name,
                session.role
            ),
            None => log::debug!("No stored session"),
        }

        Ok(Self {
            store,
            current: RwLock::new(current),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Session>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn replace(&self, session: Option<Session>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = session;
    }

    fn establish(&self, session: Session) -> Result<Session, AuthError> {
        self.store.save(&session)?;
        self.replace(Some(session.clone()));
        Ok(session)
    }

    /// Signs in with [`crate::authenticate`] and persists the session.
    ///
    /// A rejected login leaves any existing session in place.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] from the credential check, or
    /// [`AuthError::Store`] if the session cannot be saved.
    pub fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        log::info!("Login attempt for {email}");

        let session = crate::authenticate(email, password).inspect_err(|e| {
            log::info!("Login rejected for {email}: {e}");
        })?;

        self.establish(session)
    }

    /// Registers with [`crate::register_account`] and signs the new
    /// account in.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] from validation, or [`AuthError::Store`]
    /// if the session cannot be saved.
    pub fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
        requested_role: Role,
    ) -> Result<Session, AuthError> {
        log::info!("Registration attempt for {email}");

        let session = crate::register_account(full_name, email, password, requested_role)
            .inspect_err(|e| log::info!("Registration rejected for {email}: {e}"))?;

        self.establish(session)
    }

    /// Clears the session from memory and storage.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] if the stored session cannot be
    /// cleared. The in-memory session is kept in that case.
    pub fn logout(&self) -> Result<(), AuthError> {
        log::info!("Logging out");
        self.store.clear()?;
        self.replace(None);
        Ok(())
    }

    /// Returns a copy of the active session, if any.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.read().clone()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.read().is_some()
    }

    /// Role of the active session, [`Role::User`] when signed out.
    #[must_use]
    pub fn current_role(&self) -> Role {
        self.read().as_ref().map(|s| s.role).unwrap_or_default()
    }

    /// Display name of the active session, empty when signed out.
    #[must_use]
    pub fn current_name(&self) -> String {
        self.read()
            .as_ref()
            .map(|s| s.display_name.clone())
            .unwrap_or_default()
    }

    /// Email of the active session, empty when signed out.
    #[must_use]
    pub fn current_email(&self) -> String {
        self.read()
            .as_ref()
            .map(|s| s.email.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_current_user_admin(&self) -> bool {
        self.read().as_ref().is_some_and(|s| s.role.is_admin())
    }

    /// Returns `true` if the active session may perform `operation`.
    #[must_use]
    pub fn is_authorized_for(&self, operation: Operation) -> bool {
        is_authorized_for(operation, self.read().as_ref())
    }
}
