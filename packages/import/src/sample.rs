//! Built-in demo dataset used when no CSV is available.

use crimes_crime_models::CrimeRecord;
use crimes_database::RecordStore;

use crate::{ImportError, ImportListener};

const FORCE: &str = "West Yorkshire Police";
const NO_SUSPECT: &str = "Investigation complete; no suspect identified";

/// Returns the ten West Yorkshire demo records `CRIME001`..`CRIME010`.
#[must_use]
pub fn sample_records() -> Vec<CrimeRecord> {
    [
        ("CRIME001", "Burglary", "Leeds 001A", 53.8008, -1.5491, NO_SUSPECT, "2024-01"),
        ("CRIME002", "Vehicle crime", "Bradford 002B", 53.7960, -1.7594, "Under investigation", "2024-01"),
        ("CRIME003", "Anti-social behaviour", "Wakefield 003C", 53.6833, -1.5000, "No further action", "2024-01"),
        ("CRIME004", "Violence and sexual offences", "Huddersfield 004D", 53.6458, -1.7850, "Awaiting court outcome", "2024-01"),
        ("CRIME005", "Shoplifting", "Halifax 005E", 53.7248, -1.8583, "Offender given penalty notice", "2024-01"),
        ("CRIME006", "Public order", "Dewsbury 006F", 53.6900, -1.6300, NO_SUSPECT, "2024-02"),
        ("CRIME007", "Criminal damage and arson", "Keighley 007G", 53.8671, -2.0000, "Under investigation", "2024-02"),
        ("CRIME008", "Drugs", "Batley 008H", 53.7167, -1.6333, "Offender given a caution", "2024-02"),
        ("CRIME009", "Bicycle theft", "Castleford 009I", 53.7167, -1.3667, NO_SUSPECT, "2024-02"),
        ("CRIME010", "Robbery", "Pontefract 010J", 53.6833, -1.3167, "Awaiting court outcome", "2024-02"),
    ]
    .into_iter()
    .map(|(id, crime_type, area, lat, lon, outcome, month)| {
        CrimeRecord::new(id, crime_type, FORCE, area, lat, lon, outcome, month)
    })
    .collect()
}

/// Upserts [`sample_records`] into `store` and reports the count through
/// `listener`.
///
/// Existing records with the same ids are replaced.
///
/// # Errors
///
/// Returns [`ImportError::Store`] if the batch write fails.
pub fn load_sample_data(
    store: &dyn RecordStore,
    listener: &dyn ImportListener,
) -> Result<u64, ImportError> {
    let records = sample_records();

    match store.insert_batch(&records) {
        Ok(written) => {
            log::info!("Loaded {written} sample records");
            listener.on_success(written);
            Ok(written)
        }
        Err(e) => {
            log::error!("Error creating sample data: {e}");
            listener.on_error(&format!("Failed to create sample data: {e}"));
            Err(ImportError::Store(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crimes_database::DuckDbRecordStore;

    use super::*;

    #[derive(Default)]
    struct Outcome {
        success: Mutex<Option<u64>>,
    }

    impl ImportListener for Outcome {
        fn on_progress(&self, _imported: u64) {}

        fn on_success(&self, imported: u64) {
            *self.success.lock().unwrap() = Some(imported);
        }

        fn on_error(&self, message: &str) {
            panic!("unexpected error: {message}");
        }
    }

    #[test]
    fn sample_set_is_ten_mappable_records() {
        let records = sample_records();

        assert_eq!(records.len(), 10);
        assert_eq!(records[0].id, "CRIME001");
        assert_eq!(records[9].id, "CRIME010");
        assert!(records.iter().all(CrimeRecord::has_valid_coordinate));
        assert!(records.iter().all(|r| r.reported_by == FORCE));
    }

    #[test]
    fn loading_twice_keeps_ten_records() {
        let store = DuckDbRecordStore::in_memory().unwrap();
        let outcome = Outcome::default();

        assert_eq!(load_sample_data(&store, &outcome).unwrap(), 10);
        assert_eq!(*outcome.success.lock().unwrap(), Some(10));

        load_sample_data(&store, &outcome).unwrap();
        assert_eq!(store.count().unwrap(), 10);
        assert_eq!(
            store.get_by_id("CRIME007").unwrap().unwrap().area_name,
            "Keighley 007G"
        );
    }
}
