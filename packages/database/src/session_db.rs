//! Signed-in session persistence.
//!
//! The session is stored as key/value rows in the `_session` table so it
//! survives restarts until an explicit logout clears every key.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crimes_auth_models::{Role, Session};
use duckdb::Connection;

use crate::{DbError, SessionStore};

const KEY_IS_LOGGED_IN: &str = "is_logged_in";
const KEY_USER_ID: &str = "user_id";
const KEY_ROLE: &str = "role";
const KEY_NAME: &str = "name";
const KEY_EMAIL: &str = "email";

/// [`SessionStore`] backed by the `_session` table.
pub struct DuckDbSessionStore {
    conn: Mutex<Connection>,
}

impl DuckDbSessionStore {
    /// Wraps a connection whose schema has already been created (see
    /// [`crate::db::open`]).
    #[must_use]
    pub const fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Opens a store over a fresh in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection or schema creation fails.
    pub fn in_memory() -> Result<Self, DbError> {
        Ok(Self::new(crate::db::open_in_memory()?))
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Gets a value from the `_session` table.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn get_value(conn: &Connection, key: &str) -> Result<Option<String>, DbError> {
    let mut stmt = conn.prepare("SELECT value FROM _session WHERE key = ?")?;
    let result = stmt.query_row([key], |row| row.get(0));
    match result {
        Ok(v) => Ok(Some(v)),
        Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(DbError::DuckDb(e)),
    }
}

/// Sets a value in the `_session` table.
///
/// # Errors
///
/// Returns [`DbError`] if the upsert fails.
pub fn set_value(conn: &Connection, key: &str, value: &str) -> Result<(), DbError> {
    conn.execute(
        "INSERT INTO _session (key, value) VALUES (?, ?)
         ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value",
        duckdb::params![key, value],
    )?;
    Ok(())
}

fn write_session(conn: &Connection, session: &Session) -> Result<(), DbError> {
    set_value(conn, KEY_USER_ID, &session.user_id)?;
    set_value(conn, KEY_ROLE, session.role.as_ref())?;
    set_value(conn, KEY_NAME, &session.display_name)?;
    set_value(conn, KEY_EMAIL, &session.email)?;
    set_value(conn, KEY_IS_LOGGED_IN, "true")
}

impl SessionStore for DuckDbSessionStore {
    fn load(&self) -> Result<Option<Session>, DbError> {
        let conn = self.conn();

        if get_value(&conn, KEY_IS_LOGGED_IN)?.as_deref() != Some("true") {
            return Ok(None);
        }

        let role = get_value(&conn, KEY_ROLE)?
            .and_then(|r| r.parse::<Role>().ok())
            .unwrap_or_default();

        Ok(Some(Session {
            user_id: get_value(&conn, KEY_USER_ID)?.unwrap_or_default(),
            display_name: get_value(&conn, KEY_NAME)?.unwrap_or_default(),
            email: get_value(&conn, KEY_EMAIL)?.unwrap_or_default(),
            role,
        }))
    }

    fn save(&self, session: &Session) -> Result<(), DbError> {
        let conn = self.conn();

        // All keys change together or not at all.
        conn.execute_batch("BEGIN TRANSACTION")?;
        let written = write_session(&conn, session);
        match written {
            Ok(()) => conn.execute_batch("COMMIT")?,
            Err(e) => {
                if let Err(rollback) = conn.execute_batch("ROLLBACK") {
                    log::error!("Session rollback failed: {rollback}");
                }
                return Err(e);
            }
        }

        log::debug!(
            "Session saved: {} ({})",
            session.display_name,
            session.role
        );
        Ok(())
    }

    fn clear(&self) -> Result<(), DbError> {
        self.conn().execute("DELETE FROM _session", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Session {
        Session {
            user_id: "admin_uid".to_string(),
            display_name: "Admin User".to_string(),
            email: "admin@crimes.com".to_string(),
            role: Role::Admin,
        }
    }

    #[test]
    fn empty_store_has_no_session() {
        let store = DuckDbSessionStore::in_memory().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn save_then_load_returns_same_session() {
        let store = DuckDbSessionStore::in_memory().unwrap();
        store.save(&admin()).unwrap();
        assert_eq!(store.load().unwrap(), Some(admin()));
    }

    #[test]
    fn clear_removes_every_key() {
        let store = DuckDbSessionStore::in_memory().unwrap();
        store.save(&admin()).unwrap();
        store.clear().unwrap();

        assert_eq!(store.load().unwrap(), None);
        let conn = store.conn();
        assert_eq!(get_value(&conn, KEY_EMAIL).unwrap(), None);
        assert_eq!(get_value(&conn, KEY_ROLE).unwrap(), None);
    }

    #[test]
    fn unreadable_role_defaults_to_user() {
        let store = DuckDbSessionStore::in_memory().unwrap();
        store.save(&admin()).unwrap();
        set_value(&store.conn(), KEY_ROLE, "Superuser").unwrap();

        assert_eq!(store.load().unwrap().unwrap().role, Role::User);
    }

    #[test]
    fn failed_save_keeps_previous_session_intact() {
        let store = DuckDbSessionStore::in_memory().unwrap();
        store.save(&admin()).unwrap();

        store
            .conn()
            .execute_batch(
                "CREATE TABLE _session_copy AS SELECT * FROM _session;
                 DROP TABLE _session;
                 CREATE TABLE _session (
                     key TEXT PRIMARY KEY,
                     value TEXT NOT NULL CHECK (value <> 'User')
                 );
                 INSERT INTO _session SELECT * FROM _session_copy;
                 DROP TABLE _session_copy;",
            )
            .unwrap();

        let demo = Session {
            user_id: "demo_1".to_string(),
            display_name: "Demo User".to_string(),
            email: "demo@example.com".to_string(),
            role: Role::User,
        };
        assert!(store.save(&demo).is_err());

        assert_eq!(store.load().unwrap(), Some(admin()));
    }

    #[test]
    fn session_survives_reopening_the_file() {
        let dir = std::env::temp_dir().join(format!("crimes_session_{}", uuid::Uuid::new_v4()));
        let path = crate::paths::database_path_in(&dir);

        {
            let store = DuckDbSessionStore::new(crate::db::open(&path).unwrap());
            store.save(&admin()).unwrap();
        }

        let reopened = DuckDbSessionStore::new(crate::db::open(&path).unwrap());
        assert_eq!(reopened.load().unwrap(), Some(admin()));

        drop(reopened);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
