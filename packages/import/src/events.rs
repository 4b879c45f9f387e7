//! Background imports that report through a channel.
//!
//! [`spawn_import`] runs [`crate::import_file`] on the blocking thread pool
//! and forwards every listener callback as an [`ImportEvent`], so an async
//! caller can render progress while the import runs.

use std::path::PathBuf;
use std::sync::Arc;

use crimes_database::RecordStore;
use tokio::sync::mpsc;

use crate::{ImportError, ImportListener, ImportOptions, ImportSummary};

/// Number of events buffered before the importer waits on the receiver.
const EVENT_CHANNEL_BUFFER: usize = 16;

/// One listener callback, as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportEvent {
    /// A batch was written; `imported` is the running total.
    Progress {
        /// Records imported so far.
        imported: u64,
    },
    /// The import finished.
    Succeeded {
        /// Total records imported.
        imported: u64,
    },
    /// The import aborted.
    Failed {
        /// User-facing error message.
        message: String,
    },
}

impl ImportEvent {
    /// Returns `true` for [`Self::Succeeded`] and [`Self::Failed`].
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }

    /// Replays this event as the matching [`ImportListener`] callback.
    pub fn dispatch(&self, listener: &dyn ImportListener) {
        match self {
            Self::Progress { imported } => listener.on_progress(*imported),
            Self::Succeeded { imported } => listener.on_success(*imported),
            Self::Failed { message } => listener.on_error(message),
        }
    }
}

/// Forwards callbacks into a channel. Send failures (receiver dropped) are
/// ignored.
struct ChannelListener {
    tx: mpsc::Sender<ImportEvent>,
}

impl ImportListener for ChannelListener {
    fn on_progress(&self, imported: u64) {
        self.tx.blocking_send(ImportEvent::Progress { imported }).ok();
    }

    fn on_success(&self, imported: u64) {
        self.tx.blocking_send(ImportEvent::Succeeded { imported }).ok();
    }

    fn on_error(&self, message: &str) {
        self.tx
            .blocking_send(ImportEvent::Failed {
                message: message.to_string(),
            })
            .ok();
    }
}

/// Starts importing `path` on the blocking pool and returns a receiver of
/// its events.
///
/// The receiver yields zero or more [`ImportEvent::Progress`] events and
/// then exactly one terminal event before closing. The summary (or error)
/// is also available from the [`tokio::task::JoinHandle`].
///
/// Must be called from within a tokio runtime.
#[must_use]
pub fn spawn_import(
    path: PathBuf,
    store: Arc<dyn RecordStore>,
    options: ImportOptions,
) -> (
    mpsc::Receiver<ImportEvent>,
    tokio::task::JoinHandle<Result<ImportSummary, ImportError>>,
) {
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_BUFFER);

    let handle = tokio::task::spawn_blocking(move || {
        let listener = ChannelListener { tx };
        crate::import_file(&path, store.as_ref(), &listener, &options)
    });

    (rx, handle)
}

#[cfg(test)]
mod tests {
    use crimes_database::DuckDbRecordStore;

    use super::*;

    fn temp_csv(rows: usize) -> PathBuf {
        let path =
            std::env::temp_dir().join(format!("crimes_events_{}.csv", uuid::Uuid::new_v4()));
        let mut csv = String::from("id,type,by,area,lat,lon,outcome\n");
        for i in 0..rows {
            csv.push_str(&format!("E{i},Drugs,WYP,Leeds,53.8,-1.5,None\n"));
        }
        std::fs::write(&path, csv).unwrap();
        path
    }

    async fn drain(mut rx: mpsc::Receiver<ImportEvent>) -> Vec<ImportEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn streams_progress_then_success() {
        let path = temp_csv(120);
        let store: Arc<dyn RecordStore> = Arc::new(DuckDbRecordStore::in_memory().unwrap());

        let (rx, handle) = spawn_import(path.clone(), store.clone(), ImportOptions::default());
        let events = drain(rx).await;
        let summary = handle.await.unwrap().unwrap();

        assert_eq!(
            events,
            vec![
                ImportEvent::Progress { imported: 100 },
                ImportEvent::Succeeded { imported: 120 },
            ]
        );
        assert_eq!(summary.imported, 120);
        assert_eq!(store.count().unwrap(), 120);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn missing_file_yields_single_failure() {
        let path =
            std::env::temp_dir().join(format!("crimes_events_missing_{}.csv", uuid::Uuid::new_v4()));
        let store: Arc<dyn RecordStore> = Arc::new(DuckDbRecordStore::in_memory().unwrap());

        let (rx, handle) = spawn_import(path, store, ImportOptions::default());
        let events = drain(rx).await;

        assert_eq!(events.len(), 1);
        assert!(events[0].is_terminal());
        assert!(matches!(events[0], ImportEvent::Failed { .. }));
        assert!(handle.await.unwrap().is_err());
    }
}
