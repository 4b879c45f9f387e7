#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the crimes toolchain.
//!
//! Provides an `indicatif`-backed import progress bar behind the
//! [`ImportListener`] trait, plus [`init_logger`] which sets up
//! `indicatif-log-bridge` so that `log::info!` and friends are suspended
//! while progress bars redraw.

use std::sync::Arc;
use std::time::Duration;

use crimes_import::ImportListener;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::{MultiProgress, ProgressDrawTarget};

/// An `indicatif` [`ProgressBar`] that implements [`ImportListener`].
///
/// The import total is not known up front, so the bar stays a spinner
/// showing the running count.
pub struct IndicatifProgress {
    bar: ProgressBar,
    label: String,
}

impl IndicatifProgress {
    /// Creates a spinner labelled `message` and adds it to `multi`.
    #[must_use]
    pub fn import_bar(multi: &MultiProgress, message: &str) -> Arc<Self> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed_precise}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());

        Arc::new(Self {
            bar,
            label: message.to_string(),
        })
    }
}

impl ImportListener for IndicatifProgress {
    fn on_progress(&self, imported: u64) {
        self.bar.set_position(imported);
        self.bar
            .set_message(format!("{} -- {imported} records", self.label));
    }

    fn on_success(&self, imported: u64) {
        self.bar.set_position(imported);
        self.bar.finish_with_message(format!(
            "{} complete -- {imported} records imported",
            self.label
        ));
    }

    fn on_error(&self, message: &str) {
        self.bar
            .abandon_with_message(format!("{} failed: {message}", self.label));
    }
}

/// Initializes the global logger wrapped in `indicatif-log-bridge` so that
/// `log::info!` and friends are suspended while progress bars redraw.
///
/// Returns the [`MultiProgress`] that all progress bars must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // already set (e.g. in tests)

    log::set_max_level(level);

    multi
}
