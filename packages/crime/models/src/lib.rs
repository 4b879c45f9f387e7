#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Crime record types, searchable field selectors, and record validation.
//!
//! This crate defines the canonical [`CrimeRecord`] shared by the store,
//! the CSV importer, and the service layer. Each record mirrors one row of
//! the regional incident dataset
//! (`id, crimeType, reportedBy, areaName, latitude, longitude,
//! outcomeCategory`) plus a coarse `month` tag.

use serde::{Deserialize, Serialize};
use strum_macros::EnumString;

/// Inclusive latitude range accepted for display.
pub const LATITUDE_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;

/// Inclusive longitude range accepted for display.
pub const LONGITUDE_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// One crime incident.
///
/// Coordinates outside their valid ranges are tolerated in storage; use
/// [`CrimeRecord::has_valid_coordinate`] before plotting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeRecord {
    /// Primary key. Immutable once stored.
    pub id: String,
    /// Free-text crime type (e.g. "Burglary").
    pub crime_type: String,
    /// Reporting force, may be empty.
    pub reported_by: String,
    /// LSOA / location-area name, may be empty.
    pub area_name: String,
    /// Latitude (WGS84). `0.0` when unknown.
    pub latitude: f64,
    /// Longitude (WGS84). `0.0` when unknown.
    pub longitude: f64,
    /// Outcome category, may be empty.
    pub outcome_category: String,
    /// Coarse temporal tag such as `"2024-01"`. Not parsed as a date.
    pub month: String,
}

impl CrimeRecord {
    /// Creates a record from its individual fields.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        crime_type: impl Into<String>,
        reported_by: impl Into<String>,
        area_name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        outcome_category: impl Into<String>,
        month: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            crime_type: crime_type.into(),
            reported_by: reported_by.into(),
            area_name: area_name.into(),
            latitude,
            longitude,
            outcome_category: outcome_category.into(),
            month: month.into(),
        }
    }

    /// Returns `true` if the record can be plotted on a map: both
    /// coordinates are in range and the point is not the `(0, 0)`
    /// placeholder.
    #[must_use]
    pub fn has_valid_coordinate(&self) -> bool {
        is_valid_latitude(self.latitude)
            && is_valid_longitude(self.longitude)
            && (self.latitude != 0.0 || self.longitude != 0.0)
    }
}

/// Returns `true` if `latitude` lies in [`LATITUDE_RANGE`].
#[must_use]
pub fn is_valid_latitude(latitude: f64) -> bool {
    LATITUDE_RANGE.contains(&latitude)
}

/// Returns `true` if `longitude` lies in [`LONGITUDE_RANGE`].
#[must_use]
pub fn is_valid_longitude(longitude: f64) -> bool {
    LONGITUDE_RANGE.contains(&longitude)
}

/// Label used by presentation layers for the "search every field" option.
pub const ALL_FIELDS_LABEL: &str = "All Fields";

/// A single searchable text column.
///
/// Parsing accepts both the display labels (`"Crime Type"`) and the
/// camelCase field names (`"crimeType"`). Anything else parses to
/// [`SearchField::Unknown`], which searches the crime type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString)]
pub enum SearchField {
    /// The `crime_type` column.
    #[strum(serialize = "Crime Type", serialize = "crimeType")]
    CrimeType,
    /// The `area_name` (LSOA name) column.
    #[strum(serialize = "LSOA Name", serialize = "lsoaName", serialize = "areaName")]
    AreaName,
    /// The `outcome_category` column.
    #[strum(serialize = "Outcome Category", serialize = "outcomeCategory")]
    OutcomeCategory,
    /// The `reported_by` column.
    #[strum(serialize = "Reported By", serialize = "reportedBy")]
    ReportedBy,
    /// Unrecognized field name, kept for logging. Falls back to the
    /// crime type column.
    #[strum(default)]
    Unknown(String),
}

impl SearchField {
    /// The fields offered to users, in display order.
    pub const SELECTABLE: &[Self] = &[
        Self::CrimeType,
        Self::AreaName,
        Self::OutcomeCategory,
        Self::ReportedBy,
    ];

    /// Parses a field name, never failing: unknown names become
    /// [`SearchField::Unknown`].
    #[must_use]
    pub fn parse(name: &str) -> Self {
        name.trim()
            .parse()
            .unwrap_or_else(|_| Self::Unknown(name.to_string()))
    }

    /// Returns the field actually searched, applying the crime type
    /// fallback for unknown names.
    #[must_use]
    pub fn resolve(&self) -> &Self {
        static FALLBACK: SearchField = SearchField::CrimeType;

        match self {
            Self::Unknown(_) => &FALLBACK,
            other => other,
        }
    }

    /// Returns the storage column name of the resolved field.
    #[must_use]
    pub const fn column(&self) -> &'static str {
        match self {
            Self::AreaName => "area_name",
            Self::OutcomeCategory => "outcome_category",
            Self::ReportedBy => "reported_by",
            Self::CrimeType | Self::Unknown(_) => "crime_type",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::CrimeType => "Crime Type",
            Self::AreaName => "LSOA Name",
            Self::OutcomeCategory => "Outcome Category",
            Self::ReportedBy => "Reported By",
            Self::Unknown(name) => name,
        }
    }
}

/// Reasons a record is rejected before reaching the store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The primary key is empty.
    #[error("Crime ID is required")]
    MissingId,

    /// The crime type is empty.
    #[error("Crime type is required")]
    MissingCrimeType,

    /// Another required text field is empty.
    #[error("{field} is required")]
    MissingField {
        /// Display name of the missing field.
        field: &'static str,
    },

    /// Latitude outside [-90, 90].
    #[error("Invalid latitude {value}: expected -90 to 90")]
    InvalidLatitude {
        /// The rejected latitude.
        value: f64,
    },

    /// Longitude outside [-180, 180].
    #[error("Invalid longitude {value}: expected -180 to 180")]
    InvalidLongitude {
        /// The rejected longitude.
        value: f64,
    },

    /// A coordinate could not be parsed as a number.
    #[error("Invalid latitude or longitude: {input:?}")]
    InvalidCoordinate {
        /// The unparseable input.
        input: String,
    },
}

/// Checks the minimum a record needs to be stored: a non-empty id and
/// crime type.
///
/// # Errors
///
/// Returns [`ValidationError::MissingId`] or
/// [`ValidationError::MissingCrimeType`].
pub fn validate_required(record: &CrimeRecord) -> Result<(), ValidationError> {
    if record.id.trim().is_empty() {
        return Err(ValidationError::MissingId);
    }
    if record.crime_type.trim().is_empty() {
        return Err(ValidationError::MissingCrimeType);
    }
    Ok(())
}

/// Validates a record entered interactively: every text field must be
/// non-empty and both coordinates must be within range.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered.
pub fn validate_record(record: &CrimeRecord) -> Result<(), ValidationError> {
    validate_required(record)?;

    for (field, value) in [
        ("Reported by", &record.reported_by),
        ("LSOA name", &record.area_name),
        ("Outcome", &record.outcome_category),
        ("Month", &record.month),
    ] {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField { field });
        }
    }

    if !is_valid_latitude(record.latitude) {
        return Err(ValidationError::InvalidLatitude {
            value: record.latitude,
        });
    }
    if !is_valid_longitude(record.longitude) {
        return Err(ValidationError::InvalidLongitude {
            value: record.longitude,
        });
    }

    Ok(())
}

/// Parses a coordinate typed by a user.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidCoordinate`] if `input` is not a
/// number.
pub fn parse_coordinate(input: &str) -> Result<f64, ValidationError> {
    input
        .trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::InvalidCoordinate {
            input: input.to_string(),
        })
}
