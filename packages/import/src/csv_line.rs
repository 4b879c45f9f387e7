//! Quote-aware CSV line splitting.
//!
//! A `"` toggles quoted mode and is dropped; a `,` ends a field only
//! outside quotes. Doubled quotes are not unescaped, they simply toggle
//! twice, so `a,""b"",c` splits into `a`, `b`, `c`.

/// Splits one CSV line into its fields.
///
/// Always returns at least one field; an empty line yields `[""]` and a
/// trailing comma yields a trailing empty field.
#[must_use]
pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    fields.push(current);
    fields
}
