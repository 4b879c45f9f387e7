//! Streaming CSV-to-store import.
//!
//! Lines are read one at a time, split with [`parse_line`], and mapped to
//! [`CrimeRecord`]s. New records accumulate in a buffer that is flushed
//! to the store every `batch_size` records and once more at end of input.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crimes_crime_models::{CrimeRecord, validate_required};
use crimes_database::RecordStore;

use crate::csv_line::parse_line;
use crate::{ImportError, ImportListener, ImportOptions, ImportSummary, MIN_FIELDS};

/// Why a data line was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRejection {
    /// Fewer than [`MIN_FIELDS`] fields.
    TooFewFields {
        /// Number of fields found.
        found: usize,
    },
    /// The id or crime type is blank.
    MissingRequired,
}

/// Maps the fields of one data line to a record.
///
/// Text fields are trimmed; coordinates that fail to parse become `0.0`.
/// Fields past the seventh are ignored.
///
/// # Errors
///
/// Returns a [`LineRejection`] for short lines or a blank id/crime type.
pub fn parse_record(fields: &[String], month: &str) -> Result<CrimeRecord, LineRejection> {
    if fields.len() < MIN_FIELDS {
        return Err(LineRejection::TooFewFields {
            found: fields.len(),
        });
    }

    let text = |i: usize| fields[i].trim().to_string();
    let coordinate = |i: usize| fields[i].trim().parse::<f64>().unwrap_or(0.0);

    let record = CrimeRecord::new(
        text(0),
        text(1),
        text(2),
        text(3),
        coordinate(4),
        coordinate(5),
        text(6),
        month,
    );

    validate_required(&record).map_err(|_| LineRejection::MissingRequired)?;
    Ok(record)
}

/// Imports CSV text from `reader` into `store`.
///
/// The first line is a header and is discarded. Exactly one of
/// [`ImportListener::on_success`] or [`ImportListener::on_error`] is
/// called before returning; records flushed before an error stay stored.
///
/// # Errors
///
/// Returns [`ImportError`] if reading fails or the store rejects a
/// lookup or write.
pub fn import_reader<R: BufRead>(
    reader: R,
    store: &dyn RecordStore,
    listener: &dyn ImportListener,
    options: &ImportOptions,
) -> Result<ImportSummary, ImportError> {
    match run(reader, store, listener, options) {
        Ok(summary) => {
            log::info!(
                "Import complete: {} imported, {} duplicates, {} rejected ({} lines)",
                summary.imported,
                summary.duplicates,
                summary.rejected,
                summary.lines
            );
            listener.on_success(summary.imported);
            Ok(summary)
        }
        Err(e) => {
            log::error!("{e}");
            listener.on_error(&e.to_string());
            Err(e)
        }
    }
}

/// Opens `path` and imports it with [`import_reader`].
///
/// A file that cannot be opened is reported through
/// [`ImportListener::on_error`] like any other read failure.
///
/// # Errors
///
/// Returns [`ImportError`] if the file cannot be opened or the import
/// fails.
pub fn import_file(
    path: &Path,
    store: &dyn RecordStore,
    listener: &dyn ImportListener,
    options: &ImportOptions,
) -> Result<ImportSummary, ImportError> {
    log::info!("Importing {}", path.display());

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            let e = ImportError::Io(e);
            log::error!("{}: {e}", path.display());
            listener.on_error(&e.to_string());
            return Err(e);
        }
    };

    import_reader(BufReader::new(file), store, listener, options)
}

/// Reads one line into `buf`, returning `None` at end of input.
///
/// One trailing `\n` or `\r\n` is stripped. Invalid UTF-8 is replaced rather
/// than failing the whole import.
fn next_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }

    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

fn flush(
    store: &dyn RecordStore,
    batch: &mut Vec<CrimeRecord>,
    summary: &mut ImportSummary,
) -> Result<(), ImportError> {
    if batch.is_empty() {
        return Ok(());
    }

    store.insert_batch(batch)?;
    summary.imported += batch.len() as u64;
    log::info!("Flushed {} records ({} total)", batch.len(), summary.imported);
    batch.clear();

    Ok(())
}

fn run<R: BufRead>(
    mut reader: R,
    store: &dyn RecordStore,
    listener: &dyn ImportListener,
    options: &ImportOptions,
) -> Result<ImportSummary, ImportError> {
    let batch_size = options.batch_size.max(1);
    let mut summary = ImportSummary::default();
    let mut buf = Vec::new();

    match next_line(&mut reader, &mut buf)? {
        Some(header) => log::debug!("Header: {header}"),
        None => {
            log::warn!("CSV source is empty");
            return Ok(summary);
        }
    }

    let mut seen = BTreeSet::new();
    let mut batch = Vec::with_capacity(batch_size);
    let mut line_number: u64 = 1;

    while let Some(line) = next_line(&mut reader, &mut buf)? {
        line_number += 1;
        summary.lines += 1;

        let record = match parse_record(&parse_line(&line), &options.month) {
            Ok(record) => record,
            Err(LineRejection::TooFewFields { found }) => {
                log::warn!("Line {line_number}: skipping, only {found} fields");
                summary.rejected += 1;
                continue;
            }
            Err(LineRejection::MissingRequired) => {
                log::warn!("Line {line_number}: skipping, blank id or crime type");
                summary.rejected += 1;
                continue;
            }
        };

        if seen.contains(&record.id) || store.exists(&record.id)? {
            log::debug!("Line {line_number}: {} already present", record.id);
            summary.duplicates += 1;
            continue;
        }

        seen.insert(record.id.clone());
        batch.push(record);

        if batch.len() >= batch_size {
            flush(store, &mut batch, &mut summary)?;
            listener.on_progress(summary.imported);
        }
    }

    flush(store, &mut batch, &mut summary)?;

    Ok(summary)
}
