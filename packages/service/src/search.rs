//! Mapping user-facing search selections to store queries.

use crimes_crime_models::{ALL_FIELDS_LABEL, CrimeRecord, SearchField};
use crimes_database::{DbError, RecordStore};

/// What a search looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SearchScope {
    /// Id, crime type, area name, outcome, and reporting force.
    #[default]
    AnyField,
    /// One column. [`SearchField::Unknown`] searches the crime type.
    Field(SearchField),
}

impl SearchScope {
    /// Parses a selection label.
    ///
    /// [`ALL_FIELDS_LABEL`] (any case) selects every field. Anything else
    /// goes through [`SearchField::parse`], so unknown names fall back to
    /// the crime type instead of failing.
    #[must_use]
    pub fn parse(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case(ALL_FIELDS_LABEL) {
            Self::AnyField
        } else {
            Self::Field(SearchField::parse(label))
        }
    }

    /// Runs the search against `store`, returning rows in store order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    pub fn run(&self, store: &dyn RecordStore, term: &str) -> Result<Vec<CrimeRecord>, DbError> {
        match self {
            Self::AnyField => store.search_any_field(term),
            Self::Field(field) => store.search_by_field(field, term),
        }
    }
}

#[cfg(test)]
mod tests {
    use crimes_database::DuckDbRecordStore;

    use super::*;

    fn store() -> DuckDbRecordStore {
        let store = DuckDbRecordStore::in_memory().unwrap();
        store
            .insert_batch(&[
                CrimeRecord::new("1", "Drugs", "WYP", "Leeds 001", 53.8, -1.5, "Caution", "2024-01"),
                CrimeRecord::new("2", "Burglary", "WYP", "Drighlington", 53.7, -1.6, "None", "2024-01"),
            ])
            .unwrap();
        store
    }

    fn ids(records: &[CrimeRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn parses_all_fields_label() {
        assert_eq!(SearchScope::parse("All Fields"), SearchScope::AnyField);
        assert_eq!(SearchScope::parse("all fields"), SearchScope::AnyField);
        assert_eq!(
            SearchScope::parse("LSOA Name"),
            SearchScope::Field(SearchField::AreaName)
        );
    }

    #[test]
    fn any_field_matches_across_columns() {
        let store = store();
        let found = SearchScope::AnyField.run(&store, "dr").unwrap();
        assert_eq!(ids(&found), vec!["2", "1"]);
    }

    #[test]
    fn single_field_is_narrower() {
        let store = store();
        let found = SearchScope::parse("Crime Type").run(&store, "dr").unwrap();
        assert_eq!(ids(&found), vec!["1"]);
    }

    #[test]
    fn unknown_field_behaves_like_crime_type() {
        let store = store();
        let unknown = SearchScope::parse("NotAField").run(&store, "burg").unwrap();
        let crime_type = SearchScope::parse("Crime Type").run(&store, "burg").unwrap();
        assert_eq!(unknown, crime_type);
        assert_eq!(ids(&unknown), vec!["2"]);
    }
}
