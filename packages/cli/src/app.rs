//! Shared state for one CLI invocation and the command handlers.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crimes_auth::SessionManager;
use crimes_auth_models::{Operation, Role, Session};
use crimes_cli_utils::{IndicatifProgress, MultiProgress};
use crimes_crime_models::SearchField;
use crimes_database::{DuckDbRecordStore, DuckDbSessionStore, db, paths};
use crimes_import::{ImportOptions, ImportSummary};
use crimes_service::crime_service::authorize;
use crimes_service::{CrimeService, SyncCoordinator};
use dialoguer::{Confirm, Password};

use crate::{form, output};

pub type CliResult<T = ()> = Result<T, Box<dyn Error>>;

/// The opened database, the signed-in session, and the progress area.
pub struct App {
    pub service: CrimeService,
    pub sessions: SessionManager,
    pub multi: MultiProgress,
    database_path: PathBuf,
}

impl App {
    /// Opens (creating if needed) the database in `data_dir` and restores
    /// any stored session. `import_options` apply to CSV imports.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the stored
    /// session cannot be read.
    pub fn open(
        data_dir: &Path,
        multi: MultiProgress,
        import_options: ImportOptions,
    ) -> CliResult<Self> {
        let database_path = paths::database_path_in(data_dir);
        let conn = db::open(&database_path)?;

        let sessions =
            SessionManager::load(Arc::new(DuckDbSessionStore::new(conn.try_clone()?)))?;

        let sync = SyncCoordinator::offline();
        sync.check_connectivity();

        let service = CrimeService::new(Arc::new(DuckDbRecordStore::new(conn)))
            .with_sync(sync)
            .with_import_options(import_options);

        Ok(Self {
            service,
            sessions,
            multi,
            database_path,
        })
    }

    fn session(&self) -> Option<Session> {
        self.sessions.session()
    }

    pub fn login(&self, email: &str, password: Option<String>) -> CliResult {
        let password = match password {
            Some(p) => p,
            None => Password::new().with_prompt("Password").interact()?,
        };

        let session = self.sessions.login(email, &password)?;
        println!("Welcome, {} ({})", session.display_name, session.role);
        Ok(())
    }

    pub fn register(
        &self,
        name: &str,
        email: &str,
        password: Option<String>,
        role: Role,
    ) -> CliResult {
        let password = match password {
            Some(p) => p,
            None => Password::new()
                .with_prompt("Password")
                .with_confirmation("Confirm password", "Passwords do not match")
                .interact()?,
        };

        let session = self.sessions.register(name, email, &password, role)?;
        println!(
            "Registered {} <{}> as {}",
            session.display_name, session.email, session.role
        );
        Ok(())
    }

    pub fn logout(&self) -> CliResult {
        self.sessions.logout()?;
        println!("Signed out");
        Ok(())
    }

    pub fn whoami(&self) {
        match self.session() {
            Some(session) => output::print_session(&session),
            None => println!("Not signed in"),
        }
    }

    pub async fn import(&self, path: PathBuf) -> CliResult<ImportSummary> {
        let session = self.session();
        let (mut rx, handle) = self.service.spawn_import(session.as_ref(), path.clone())?;

        let progress =
            IndicatifProgress::import_bar(&self.multi, &format!("Importing {}", path.display()));
        while let Some(event) = rx.recv().await {
            event.dispatch(progress.as_ref());
        }

        let summary = handle.await??;
        output::print_summary(&summary);
        Ok(summary)
    }

    pub fn load_sample(&self) -> CliResult {
        let session = self.session();
        let progress = IndicatifProgress::import_bar(&self.multi, "Loading sample data");
        self.service
            .load_sample_data(session.as_ref(), progress.as_ref())?;
        Ok(())
    }

    pub fn list(&self, limit: Option<usize>) -> CliResult {
        let records = self.service.list(self.session().as_ref())?;
        output::print_records(&records, limit);
        Ok(())
    }

    pub fn show(&self, id: &str) -> CliResult {
        let record = self.service.get(self.session().as_ref(), id)?;
        output::print_record(&record);
        Ok(())
    }

    pub fn search(&self, field: &str, term: &str) -> CliResult {
        let records = self.service.search(self.session().as_ref(), field, term)?;
        println!(
            "Search \"{term}\" in {}: {} results",
            describe_field(field),
            records.len()
        );
        output::print_records(&records, None);
        Ok(())
    }

    pub fn add(&self) -> CliResult {
        let session = self.session();
        authorize(Operation::Create, session.as_ref())?;

        let record = form::prompt_record(None)?;
        self.service.create(session.as_ref(), &record)?;
        println!("Crime {} added", record.id);
        Ok(())
    }

    pub fn update(&self, id: &str) -> CliResult {
        let session = self.session();
        authorize(Operation::Update, session.as_ref())?;

        let existing = self.service.get(session.as_ref(), id)?;
        let record = form::prompt_record(Some(&existing))?;
        self.service.update(session.as_ref(), &record)?;
        println!("Crime {} updated", record.id);
        Ok(())
    }

    pub fn delete(&self, id: &str, yes: bool) -> CliResult {
        if !yes
            && !Confirm::new()
                .with_prompt(format!("Delete crime {id}?"))
                .default(false)
                .interact()?
        {
            return Ok(());
        }

        self.service.delete(self.session().as_ref(), id)?;
        println!("Crime {id} deleted");
        Ok(())
    }

    pub fn clear(&self, yes: bool) -> CliResult {
        if !yes
            && !Confirm::new()
                .with_prompt("Delete ALL crimes?")
                .default(false)
                .interact()?
        {
            return Ok(());
        }

        let removed = self.service.delete_all(self.session().as_ref())?;
        println!("Deleted {removed} crimes");
        Ok(())
    }

    pub fn count(&self) -> CliResult {
        let count = self.service.count(self.session().as_ref())?;
        println!("{count} crimes");
        Ok(())
    }

    pub fn map(&self) -> CliResult {
        let records = self.service.mappable_records(self.session().as_ref())?;
        output::print_map_points(&records);
        Ok(())
    }

    pub fn status(&self) -> CliResult {
        self.whoami();
        println!("Database: {}", self.database_path.display());

        if let Some(sync) = self.service.sync() {
            println!("Sync mode: {}", sync.mode());
            println!("Sync: {}", sync.status());
        }

        if self.sessions.is_logged_in() {
            self.count()?;
        }
        Ok(())
    }
}

fn describe_field(field: &str) -> String {
    if field.eq_ignore_ascii_case(crimes_crime_models::ALL_FIELDS_LABEL) {
        return "all fields".to_string();
    }
    match SearchField::parse(field) {
        SearchField::Unknown(name) => format!("{name} (searching Crime Type)"),
        known => known.label().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hidden_multi() -> MultiProgress {
        MultiProgress::with_draw_target(crimes_cli_utils::ProgressDrawTarget::hidden())
    }

    fn temp_app() -> (App, PathBuf) {
        let dir = std::env::temp_dir().join(format!("crimes_cli_{}", uuid::Uuid::new_v4()));
        (
            App::open(&dir, hidden_multi(), ImportOptions::default()).unwrap(),
            dir,
        )
    }

    #[test]
    fn describes_search_fields() {
        assert_eq!(describe_field("All Fields"), "all fields");
        assert_eq!(describe_field("lsoaName"), "LSOA Name");
        assert_eq!(describe_field("Nope"), "Nope (searching Crime Type)");
    }

    #[tokio::test]
    async fn session_and_records_survive_reopening() {
        let (app, dir) = temp_app();
        app.login("admin@crimes.com", Some("admin123".to_string()))
            .unwrap();
        app.load_sample().unwrap();

        let csv = dir.join("extra.csv");
        std::fs::write(&csv, "h\nX1,Drugs,WYP,Leeds,53.8,-1.5,None\n").unwrap();
        let summary = app.import(csv).await.unwrap();
        assert_eq!(summary.imported, 1);
        drop(app);

        let reopened = App::open(&dir, hidden_multi(), ImportOptions::default()).unwrap();
        assert!(reopened.sessions.is_current_user_admin());
        let session = reopened.sessions.session();
        assert_eq!(reopened.service.count(session.as_ref()).unwrap(), 11);

        reopened.logout().unwrap();
        assert!(reopened.list(None).is_err());

        drop(reopened);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn import_uses_configured_month() {
        let dir = std::env::temp_dir().join(format!("crimes_cli_{}", uuid::Uuid::new_v4()));
        let options = ImportOptions {
            batch_size: 1,
            month: "2023-06".to_string(),
        };
        let app = App::open(&dir, hidden_multi(), options).unwrap();
        app.login("admin@crimes.com", Some("admin123".to_string()))
            .unwrap();

        let csv = dir.join("june.csv");
        std::fs::write(
            &csv,
            "h\nJ1,Drugs,WYP,Leeds,53.8,-1.5,None\nJ2,Robbery,WYP,Leeds,53.8,-1.5,None\n",
        )
        .unwrap();
        let summary = app.import(csv).await.unwrap();
        assert_eq!(summary.imported, 2);

        let session = app.sessions.session();
        let record = app.service.get(session.as_ref(), "J2").unwrap();
        assert_eq!(record.month, "2023-06");

        drop(app);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
