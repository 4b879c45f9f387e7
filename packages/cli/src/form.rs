//! Interactive add/edit form for a single record.

use crimes_crime_models::{
    CrimeRecord, ValidationError, is_valid_latitude, is_valid_longitude, parse_coordinate,
    validate_record,
};
use crimes_import::DEFAULT_MONTH;
use dialoguer::Input;

use crate::app::CliResult;

fn text(prompt: &str, initial: Option<&str>) -> CliResult<String> {
    let mut input = Input::<String>::new()
        .with_prompt(prompt)
        .validate_with(|value: &String| -> Result<(), &str> {
            if value.trim().is_empty() {
                Err("required")
            } else {
                Ok(())
            }
        });

    if let Some(initial) = initial {
        input = input.with_initial_text(initial);
    }

    Ok(input.interact_text()?.trim().to_string())
}

fn coordinate(prompt: &str, initial: Option<f64>, in_range: fn(f64) -> bool) -> CliResult<f64> {
    let mut input = Input::<String>::new()
        .with_prompt(prompt)
        .validate_with(move |value: &String| -> Result<(), String> {
            check_coordinate(value, in_range).map(|_| ()).map_err(|e| e.to_string())
        });

    if let Some(initial) = initial {
        input = input.with_initial_text(initial.to_string());
    }

    Ok(parse_coordinate(&input.interact_text()?)?)
}

/// Parses `value` and checks it with `in_range`.
fn check_coordinate(value: &str, in_range: fn(f64) -> bool) -> Result<f64, ValidationError> {
    let parsed = parse_coordinate(value)?;
    if in_range(parsed) {
        Ok(parsed)
    } else {
        Err(ValidationError::InvalidCoordinate {
            input: value.to_string(),
        })
    }
}

/// Prompts for every field of a record.
///
/// With `existing`, fields start from its values and the id is kept.
///
/// # Errors
///
/// Returns an error if a prompt fails or the record does not validate.
pub fn prompt_record(existing: Option<&CrimeRecord>) -> CliResult<CrimeRecord> {
    let id = match existing {
        Some(record) => {
            println!("Crime ID: {}", record.id);
            record.id.clone()
        }
        None => text("Crime ID", None)?,
    };

    let record = CrimeRecord {
        id,
        crime_type: text("Crime type", existing.map(|r| r.crime_type.as_str()))?,
        reported_by: text("Reported by", existing.map(|r| r.reported_by.as_str()))?,
        area_name: text("LSOA name", existing.map(|r| r.area_name.as_str()))?,
        latitude: coordinate("Latitude", existing.map(|r| r.latitude), is_valid_latitude)?,
        longitude: coordinate("Longitude", existing.map(|r| r.longitude), is_valid_longitude)?,
        outcome_category: text("Outcome", existing.map(|r| r.outcome_category.as_str()))?,
        month: text(
            "Month",
            Some(existing.map_or(DEFAULT_MONTH, |r| r.month.as_str())),
        )?,
    };

    validate_record(&record)?;
    Ok(record)
}
