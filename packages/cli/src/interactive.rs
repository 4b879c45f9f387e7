//! Menu-driven mode used when no subcommand is given.

use std::path::PathBuf;

use crimes_auth_models::Role;
use crimes_crime_models::{ALL_FIELDS_LABEL, SearchField};
use dialoguer::{Input, Password, Select};

use crate::app::{App, CliResult};

#[derive(Clone, Copy)]
enum Action {
    List,
    Show,
    Search,
    Map,
    Import,
    Sample,
    Add,
    Update,
    Delete,
    Clear,
    Status,
    Login,
    Register,
    Logout,
    Quit,
}

impl Action {
    const SIGNED_OUT: &[Self] = &[Self::Login, Self::Register, Self::Status, Self::Quit];

    const USER: &[Self] = &[
        Self::List,
        Self::Show,
        Self::Search,
        Self::Map,
        Self::Status,
        Self::Logout,
        Self::Quit,
    ];

    const ADMIN: &[Self] = &[
        Self::List,
        Self::Show,
        Self::Search,
        Self::Map,
        Self::Import,
        Self::Sample,
        Self::Add,
        Self::Update,
        Self::Delete,
        Self::Clear,
        Self::Status,
        Self::Logout,
        Self::Quit,
    ];

    fn available(app: &App) -> &'static [Self] {
        if !app.sessions.is_logged_in() {
            Self::SIGNED_OUT
        } else if app.sessions.is_current_user_admin() {
            Self::ADMIN
        } else {
            Self::USER
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::List => "List crimes",
            Self::Show => "View a crime",
            Self::Search => "Search crimes",
            Self::Map => "Map points",
            Self::Import => "Import CSV",
            Self::Sample => "Load sample data",
            Self::Add => "Add crime",
            Self::Update => "Edit crime",
            Self::Delete => "Delete crime",
            Self::Clear => "Delete all crimes",
            Self::Status => "Status",
            Self::Login => "Log in",
            Self::Register => "Register",
            Self::Logout => "Log out",
            Self::Quit => "Quit",
        }
    }
}

fn prompt(label: &str) -> CliResult<String> {
    Ok(Input::<String>::new().with_prompt(label).interact_text()?)
}

async fn perform(app: &App, action: Action) -> CliResult {
    match action {
        Action::List => app.list(None)?,
        Action::Show => app.show(&prompt("Crime ID")?)?,
        Action::Search => {
            let mut labels = vec![ALL_FIELDS_LABEL];
            labels.extend(SearchField::SELECTABLE.iter().map(SearchField::label));

            let idx = Select::new()
                .with_prompt("Search in")
                .items(&labels)
                .default(0)
                .interact()?;
            let term: String = Input::new()
                .with_prompt("Search term")
                .allow_empty(true)
                .interact_text()?;

            app.search(labels[idx], &term)?;
        }
        Action::Map => app.map()?,
        Action::Import => {
            let path = prompt("CSV file")?;
            app.import(PathBuf::from(path.trim())).await?;
        }
        Action::Sample => app.load_sample()?,
        Action::Add => app.add()?,
        Action::Update => app.update(&prompt("Crime ID")?)?,
        Action::Delete => app.delete(&prompt("Crime ID")?, false)?,
        Action::Clear => app.clear(false)?,
        Action::Status => app.status()?,
        Action::Login => {
            let email = prompt("Email")?;
            let password = Password::new().with_prompt("Password").interact()?;
            app.login(&email, Some(password))?;
        }
        Action::Register => {
            let name = prompt("Full name")?;
            let email = prompt("Email")?;
            app.register(&name, &email, None, Role::User)?;
        }
        Action::Logout => app.logout()?,
        Action::Quit => {}
    }

    Ok(())
}

/// Shows the menu until the user quits. Failed actions are reported and
/// the menu is shown again.
///
/// # Errors
///
/// Returns an error only if the menu itself cannot be displayed.
pub async fn run(app: &App) -> CliResult {
    println!("Crimes Dataset");
    println!();

    loop {
        let actions = Action::available(app);
        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();

        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        let action = actions[idx];
        if matches!(action, Action::Quit) {
            return Ok(());
        }

        if let Err(e) = perform(app, action).await {
            log::debug!("{} failed: {e}", action.label());
            println!("Error: {e}");
        }
        println!();
    }
}
