//! Plain-text rendering of records and results.

use crimes_auth_models::Session;
use crimes_crime_models::CrimeRecord;
use crimes_import::ImportSummary;

/// One line per record.
pub fn print_records(records: &[CrimeRecord], limit: Option<usize>) {
    if records.is_empty() {
        println!("No crimes found");
        return;
    }

    let shown = limit.unwrap_or(records.len()).min(records.len());
    for record in &records[..shown] {
        println!("{}", summary_line(record));
    }

    if shown < records.len() {
        println!("... {} more", records.len() - shown);
    }
}

fn summary_line(record: &CrimeRecord) -> String {
    format!(
        "{:<12} {:<30} {:<20} {} [{}]",
        record.id, record.crime_type, record.area_name, record.outcome_category, record.month
    )
}

pub fn print_record(record: &CrimeRecord) {
    println!("Crime ID:    {}", record.id);
    println!("Crime type:  {}", record.crime_type);
    println!("Reported by: {}", record.reported_by);
    println!("LSOA name:   {}", record.area_name);
    println!("Location:    {:.4}, {:.4}", record.latitude, record.longitude);
    println!("Outcome:     {}", record.outcome_category);
    println!("Month:       {}", record.month);
}

/// Coordinates of each record, for pasting into a mapping tool.
pub fn print_map_points(records: &[CrimeRecord]) {
    println!("{} crimes with valid coordinates", records.len());
    for record in records {
        println!(
            "{:.6},{:.6}  {} ({})",
            record.latitude, record.longitude, record.crime_type, record.id
        );
    }
}

pub fn print_session(session: &Session) {
    println!(
        "{} <{}> ({})",
        session.display_name, session.email, session.role
    );
}

pub fn print_summary(summary: &ImportSummary) {
    println!(
        "Imported {} new crimes ({} lines read, {} duplicates skipped, {} malformed)",
        summary.imported, summary.lines, summary.duplicates, summary.rejected
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_line_has_id_first() {
        let record = CrimeRecord::new(
            "CRIME001", "Burglary", "WYP", "Leeds 001A", 53.8, -1.5, "None", "2024-01",
        );
        let line = summary_line(&record);
        assert!(line.starts_with("CRIME001 "));
        assert!(line.ends_with("None [2024-01]"));
    }
}
