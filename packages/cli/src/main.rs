#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the crimes dataset.
//!
//! Every operation is available as a subcommand; with no subcommand an
//! interactive menu is shown. The signed-in session is stored alongside
//! the records, so `crimes login` in one invocation carries over to the
//! next until `crimes logout`.
//!
//! Uses `indicatif-log-bridge` (via [`crimes_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod app;
mod form;
mod interactive;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use crimes_auth_models::Role;
use crimes_crime_models::ALL_FIELDS_LABEL;
use crimes_database::paths;
use crimes_import::{DEFAULT_MONTH, IMPORT_BATCH_SIZE, ImportOptions};

use crate::app::App;

#[derive(Parser)]
#[command(name = "crimes", about = "Crime incident dataset manager")]
struct Cli {
    /// Data directory holding `crimes.duckdb` (overrides `CRIMES_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Records written per batch during CSV import
    #[arg(long, global = true, default_value_t = IMPORT_BATCH_SIZE)]
    batch_size: usize,

    /// Month tag stamped on imported records
    #[arg(long, global = true, default_value = DEFAULT_MONTH)]
    month: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in
    Login {
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account and sign in
    Register {
        /// Full name
        name: String,
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
        /// Requested role (the admin address always registers as Admin)
        #[arg(long, default_value = "User")]
        role: Role,
    },
    /// Sign out and clear the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Import crimes from a CSV file (admin)
    Import {
        path: PathBuf,
    },
    /// Load the built-in West Yorkshire sample records (admin)
    Sample,
    /// List crimes, highest id first
    List {
        /// Show at most this many
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one crime
    Show {
        id: String,
    },
    /// Case-insensitive substring search
    Search {
        /// Field to search ("Crime Type", "LSOA Name", "Outcome Category",
        /// "Reported By"); unknown names search the crime type
        #[arg(long, default_value = ALL_FIELDS_LABEL)]
        field: String,
        /// Empty matches everything
        #[arg(default_value = "")]
        term: String,
    },
    /// Add a crime interactively (admin)
    Add,
    /// Edit a crime interactively (admin)
    Update {
        id: String,
    },
    /// Delete a crime (admin)
    Delete {
        id: String,
        /// Skip confirmation
        #[arg(long, short)]
        yes: bool,
    },
    /// Delete every crime (admin)
    Clear {
        /// Skip confirmation
        #[arg(long, short)]
        yes: bool,
    },
    /// Number of stored crimes
    Count,
    /// Coordinates of crimes that can be mapped
    Map,
    /// Session, database, and sync status
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = crimes_cli_utils::init_logger();
    let cli = Cli::parse();

    let data_dir = cli.data_dir.unwrap_or_else(paths::data_dir);
    let options = ImportOptions {
        batch_size: cli.batch_size,
        month: cli.month,
    };
    let app = App::open(&data_dir, multi, options)?;

    let Some(command) = cli.command else {
        return interactive::run(&app).await;
    };

    match command {
        Commands::Login { email, password } => app.login(&email, password)?,
        Commands::Register {
            name,
            email,
            password,
            role,
        } => app.register(&name, &email, password, role)?,
        Commands::Logout => app.logout()?,
        Commands::Whoami => app.whoami(),
        Commands::Import { path } => {
            app.import(path).await?;
        }
        Commands::Sample => app.load_sample()?,
        Commands::List { limit } => app.list(limit)?,
        Commands::Show { id } => app.show(&id)?,
        Commands::Search { field, term } => app.search(&field, &term)?,
        Commands::Add => app.add()?,
        Commands::Update { id } => app.update(&id)?,
        Commands::Delete { id, yes } => app.delete(&id, yes)?,
        Commands::Clear { yes } => app.clear(yes)?,
        Commands::Count => app.count()?,
        Commands::Map => app.map()?,
        Commands::Status => app.status()?,
    }

    Ok(())
}
