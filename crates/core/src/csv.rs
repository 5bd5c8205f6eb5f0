//! CSV rendering for dashboard exports.
//!
//! Every field is double-quoted and embedded quotes are doubled, so values
//! containing commas or newlines survive a round trip through spreadsheets.

use crate::types::CalendarDate;

/// Quote a single field.
pub fn quote_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Render one line (terminated by `\n`) from a list of fields.
pub fn row<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = fields
        .iter()
        .map(|f| quote_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

/// Render a header row followed by one row per record.
pub fn render<S: AsRef<str>>(header: &[&str], rows: impl IntoIterator<Item = Vec<S>>) -> String {
    let mut out = row(header);
    for fields in rows {
        out.push_str(&row(&fields));
    }
    out
}

/// Download filename embedding the export date, e.g. `policies-2026-10-16.csv`.
pub fn export_filename(prefix: &str, date: CalendarDate) -> String {
    format!("{prefix}-{}.csv", date.format("%Y-%m-%d"))
}
