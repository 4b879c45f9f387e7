//! `DuckDB` crime record storage.
//!
//! Records live in the `crimes` table keyed by `id`. Inserts are
//! `ON CONFLICT` upserts, one row per statement, so a failed batch leaves
//! the rows before the failure in place.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crimes_crime_models::{CrimeRecord, SearchField};
use duckdb::{Connection, Row, Statement};

use crate::{DbError, RecordStore};

const SELECT_COLUMNS: &str = "SELECT id, crime_type, reported_by, area_name, latitude, longitude, \
     outcome_category, month FROM crimes";

const UPSERT_SQL: &str = "INSERT INTO crimes (
        id, crime_type, reported_by, area_name,
        latitude, longitude, outcome_category, month
    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT (id) DO UPDATE SET
        crime_type = EXCLUDED.crime_type,
        reported_by = EXCLUDED.reported_by,
        area_name = EXCLUDED.area_name,
        latitude = EXCLUDED.latitude,
        longitude = EXCLUDED.longitude,
        outcome_category = EXCLUDED.outcome_category,
        month = EXCLUDED.month";

/// [`RecordStore`] backed by a `DuckDB` connection.
///
/// `duckdb::Connection` is `Send` but not `Sync`, so the connection is
/// wrapped in a `Mutex`; this also serializes writers.
pub struct DuckDbRecordStore {
    conn: Mutex<Connection>,
}

impl DuckDbRecordStore {
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

    fn query_records(
        &self,
        sql: &str,
        params: &[&dyn duckdb::ToSql],
    ) -> Result<Vec<CrimeRecord>, DbError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, row_to_record)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn row_to_record(row: &Row<'_>) -> duckdb::Result<CrimeRecord> {
    Ok(CrimeRecord {
        id: row.get(0)?,
        crime_type: row.get(1)?,
        reported_by: row.get(2)?,
        area_name: row.get(3)?,
        latitude: row.get(4)?,
        longitude: row.get(5)?,
        outcome_category: row.get(6)?,
        month: row.get(7)?,
    })
}

fn upsert(stmt: &mut Statement<'_>, record: &CrimeRecord) -> Result<(), DbError> {
    stmt.execute(duckdb::params![
        record.id,
        record.crime_type,
        record.reported_by,
        record.area_name,
        record.latitude,
        record.longitude,
        record.outcome_category,
        record.month,
    ])?;
    Ok(())
}

fn to_count(value: i64) -> Result<u64, DbError> {
    u64::try_from(value).map_err(|_| DbError::Conversion {
        message: format!("negative row count {value}"),
    })
}

impl RecordStore for DuckDbRecordStore {
    fn insert(&self, record: &CrimeRecord) -> Result<(), DbError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(UPSERT_SQL)?;
        upsert(&mut stmt, record)
    }

    fn insert_batch(&self, records: &[CrimeRecord]) -> Result<u64, DbError> {
        if records.is_empty() {
            return Ok(0);
        }

        let conn = self.conn();
        let mut stmt = conn.prepare(UPSERT_SQL)?;
        let mut written = 0u64;

        for record in records {
            upsert(&mut stmt, record)?;
            written += 1;
        }

        log::debug!("Upserted {written} crime records");
        Ok(written)
    }

    fn update(&self, record: &CrimeRecord) -> Result<bool, DbError> {
        let rows = self.conn().execute(
            "UPDATE crimes SET
                crime_type = ?,
                reported_by = ?,
                area_name = ?,
                latitude = ?,
                longitude = ?,
                outcome_category = ?,
                month = ?
             WHERE id = ?",
            duckdb::params![
                record.crime_type,
                record.reported_by,
                record.area_name,
                record.latitude,
                record.longitude,
                record.outcome_category,
                record.month,
                record.id,
            ],
        )?;
        Ok(rows > 0)
    }

    fn delete(&self, id: &str) -> Result<bool, DbError> {
        let rows = self
            .conn()
            .execute("DELETE FROM crimes WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    fn delete_all(&self) -> Result<u64, DbError> {
        let rows = self.conn().execute("DELETE FROM crimes", [])?;
        Ok(u64::try_from(rows).unwrap_or(0))
    }

    fn get_by_id(&self, id: &str) -> Result<Option<CrimeRecord>, DbError> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?");
        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        match stmt.query_row([id], row_to_record) {
            Ok(record) => Ok(Some(record)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DbError::DuckDb(e)),
        }
    }

    fn exists(&self, id: &str) -> Result<bool, DbError> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT EXISTS(SELECT 1 FROM crimes WHERE id = ?)")?;
        Ok(stmt.query_row([id], |row| row.get(0))?)
    }

    fn get_all(&self) -> Result<Vec<CrimeRecord>, DbError> {
        self.query_records(&format!("{SELECT_COLUMNS} ORDER BY id DESC"), &[])
    }

    fn count(&self) -> Result<u64, DbError> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT COUNT(*) FROM crimes")?;
        let count: i64 = stmt.query_row([], |row| row.get(0))?;
        to_count(count)
    }

    fn search_any_field(&self, term: &str) -> Result<Vec<CrimeRecord>, DbError> {
        let needle = term.to_lowercase();
        let sql = format!(
            "{SELECT_COLUMNS} WHERE
                contains(lower(crime_type), ?)
                OR contains(lower(area_name), ?)
                OR contains(lower(outcome_category), ?)
                OR contains(lower(reported_by), ?)
                OR contains(lower(id), ?)
             ORDER BY id DESC"
        );
        self.query_records(&sql, &[&needle, &needle, &needle, &needle, &needle])
    }

    fn search_by_field(
        &self,
        field: &SearchField,
        term: &str,
    ) -> Result<Vec<CrimeRecord>, DbError> {
        if let SearchField::Unknown(name) = field {
            log::debug!("Unknown search field {name:?}, searching crime type");
        }

        let needle = term.to_lowercase();
        let sql = format!(
            "{SELECT_COLUMNS} WHERE contains(lower({}), ?) ORDER BY id DESC",
            field.column()
        );
        self.query_records(&sql, &[&needle])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, crime_type: &str) -> CrimeRecord {
        CrimeRecord::new(
            id,
            crime_type,
            "West Yorkshire Police",
            "Leeds 001A",
            53.8,
            -1.5,
            "Under investigation",
            "2024-01",
        )
    }

    fn ids(records: &[CrimeRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn insert_replaces_existing_id() {
        let store = DuckDbRecordStore::in_memory().unwrap();
        store.insert(&record("C1", "Burglary")).unwrap();
        store.insert(&record("C1", "Robbery")).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(
            store.get_by_id("C1").unwrap().unwrap().crime_type,
            "Robbery"
        );
    }

    #[test]
    fn batch_insert_writes_every_row() {
        let store = DuckDbRecordStore::in_memory().unwrap();
        let batch: Vec<_> = (0..5).map(|i| record(&format!("C{i}"), "Drugs")).collect();

        assert_eq!(store.insert_batch(&batch).unwrap(), 5);
        assert_eq!(store.insert_batch(&[]).unwrap(), 0);
        assert_eq!(store.count().unwrap(), 5);
    }

    #[test]
    fn failing_row_keeps_rows_written_before_it() {
        let store = DuckDbRecordStore::in_memory().unwrap();
        store
            .conn()
            .execute_batch(
                "DROP TABLE crimes;
                 CREATE TABLE crimes (
                     id TEXT NOT NULL PRIMARY KEY,
                     crime_type TEXT NOT NULL CHECK (crime_type <> 'Rejected'),
                     reported_by TEXT NOT NULL DEFAULT '',
                     area_name TEXT NOT NULL DEFAULT '',
                     latitude DOUBLE NOT NULL DEFAULT 0,
                     longitude DOUBLE NOT NULL DEFAULT 0,
                     outcome_category TEXT NOT NULL DEFAULT '',
                     month TEXT NOT NULL DEFAULT ''
                 );",
            )
            .unwrap();

        let existing = record("A", "Burglary");
        store.insert(&existing).unwrap();

        let batch = [
            record("B", "Drugs"),
            record("C", "Rejected"),
            record("D", "Robbery"),
        ];
        assert!(store.insert_batch(&batch).is_err());

        assert_eq!(store.get_by_id("A").unwrap(), Some(existing));
        assert_eq!(store.get_by_id("B").unwrap(), Some(record("B", "Drugs")));
        assert!(!store.exists("C").unwrap());
        assert!(!store.exists("D").unwrap());
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn update_is_noop_for_unknown_id() {
        let store = DuckDbRecordStore::in_memory().unwrap();
        assert!(!store.update(&record("MISSING", "Burglary")).unwrap());
        assert_eq!(store.count().unwrap(), 0);

        store.insert(&record("C1", "Burglary")).unwrap();
        let mut changed = record("C1", "Shoplifting");
        changed.latitude = 54.0;
        assert!(store.update(&changed).unwrap());
        assert_eq!(store.get_by_id("C1").unwrap(), Some(changed));
    }

    #[test]
    fn delete_removes_by_id_and_tolerates_absent() {
        let store = DuckDbRecordStore::in_memory().unwrap();
        store.insert(&record("C1", "Burglary")).unwrap();

        assert!(store.delete("C1").unwrap());
        assert!(!store.delete("C1").unwrap());
        assert!(!store.exists("C1").unwrap());
        assert_eq!(store.get_by_id("C1").unwrap(), None);
    }

    #[test]
    fn delete_all_reports_removed_rows() {
        let store = DuckDbRecordStore::in_memory().unwrap();
        store
            .insert_batch(&[record("A", "Drugs"), record("B", "Drugs")])
            .unwrap();
        assert_eq!(store.delete_all().unwrap(), 2);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn exists_agrees_with_get_by_id() {
        let store = DuckDbRecordStore::in_memory().unwrap();
        assert!(!store.exists("C1").unwrap());
        store.insert(&record("C1", "Burglary")).unwrap();
        assert!(store.exists("C1").unwrap());
        assert!(store.get_by_id("C1").unwrap().is_some());
    }

    #[test]
    fn get_all_orders_ids_descending_lexicographically() {
        let store = DuckDbRecordStore::in_memory().unwrap();
        for id in ["C2", "C10", "C1", "B9"] {
            store.insert(&record(id, "Drugs")).unwrap();
        }

        let all = store.get_all().unwrap();
        assert_eq!(ids(&all), vec!["C2", "C10", "C1", "B9"]);
    }

    #[test]
    fn any_field_search_is_case_insensitive_across_columns() {
        let store = DuckDbRecordStore::in_memory().unwrap();
        let mut a = record("A1", "Burglary");
        a.area_name = "Bradford 002B".to_string();
        let mut b = record("B1", "Vehicle crime");
        b.outcome_category = "Awaiting court outcome".to_string();
        let c = record("XBURG", "Drugs");
        store.insert_batch(&[a, b, c]).unwrap();

        assert_eq!(
            ids(&store.search_any_field("BURG").unwrap()),
            vec!["XBURG", "A1"]
        );
        assert_eq!(ids(&store.search_any_field("bradford").unwrap()), vec!["A1"]);
        assert_eq!(ids(&store.search_any_field("COURT").unwrap()), vec!["B1"]);
        assert!(store.search_any_field("no such thing").unwrap().is_empty());
    }

    #[test]
    fn empty_term_matches_everything() {
        let store = DuckDbRecordStore::in_memory().unwrap();
        store
            .insert_batch(&[record("A", "Drugs"), record("B", "Robbery")])
            .unwrap();
        assert_eq!(ids(&store.search_any_field("").unwrap()), vec!["B", "A"]);
        assert_eq!(
            ids(&store
                .search_by_field(&SearchField::CrimeType, "")
                .unwrap()),
            vec!["B", "A"]
        );
    }

    #[test]
    fn field_search_only_looks_at_one_column() {
        let store = DuckDbRecordStore::in_memory().unwrap();
        let mut a = record("A", "Burglary");
        a.area_name = "Robbery Lane".to_string();
        let b = record("B", "Robbery");
        store.insert_batch(&[a, b]).unwrap();

        assert_eq!(
            ids(&store
                .search_by_field(&SearchField::CrimeType, "robbery")
                .unwrap()),
            vec!["B"]
        );
        assert_eq!(
            ids(&store
                .search_by_field(&SearchField::AreaName, "robbery")
                .unwrap()),
            vec!["A"]
        );
    }

    #[test]
    fn unknown_field_searches_crime_type() {
        let store = DuckDbRecordStore::in_memory().unwrap();
        let mut a = record("A", "Burglary");
        a.reported_by = "x-force".to_string();
        let b = record("B", "Box theft");
        store.insert_batch(&[a, b]).unwrap();

        let unknown = store
            .search_by_field(&SearchField::parse("NotAField"), "x")
            .unwrap();
        let crime_type = store
            .search_by_field(&SearchField::parse("Crime Type"), "x")
            .unwrap();
        assert_eq!(unknown, crime_type);
        assert_eq!(ids(&unknown), vec!["B"]);
    }
}
