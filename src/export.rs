use crate::models::{EntryType, IntakeCategory, LogEntry};
use crate::settings::NONE_CATEGORY;
use crate::stats::local_time;
use chrono::{NaiveDateTime, TimeZone};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use thiserror::Error;

pub const CSV_HEADER: [&str; 5] = ["Type", "Intake Type", "Amount (ml)", "Timestamp", "Notes"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No data to export.")]
    NoData,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("export is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A CSV export plus the name it should be downloaded under.
#[derive(Debug)]
pub struct CsvExport {
    pub filename: String,
    pub body: String,
}

pub fn build_export<Tz: TimeZone>(
    entries: &[LogEntry],
    categories: &[IntakeCategory],
    now: NaiveDateTime,
    tz: &Tz,
) -> Result<CsvExport, ExportError> {
    if entries.is_empty() {
        return Err(ExportError::NoData);
    }
    Ok(CsvExport {
        filename: export_filename(now),
        body: csv_serialize(entries, categories, tz)?,
    })
}

/// Notes are always quoted; the other columns only when they must be.
/// Rows are joined by `\n` with no terminator after the last one.
pub fn csv_serialize<Tz: TimeZone>(
    entries: &[LogEntry],
    categories: &[IntakeCategory],
    tz: &Tz,
) -> Result<String, ExportError> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    wtr.write_record(CSV_HEADER)?;

    for entry in entries {
        let amount = match entry.entry_type {
            EntryType::Note => String::new(),
            _ => entry.amount.to_string(),
        };
        wtr.write_record([
            entry.entry_type.display_name().to_string(),
            quote_if_needed(intake_label(entry, categories)),
            amount,
            local_time(&entry.timestamp, tz)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            quote(&entry.notes),
        ])?;
    }

    let mut bytes = wtr.into_inner().map_err(|err| err.into_error())?;
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    Ok(String::from_utf8(bytes)?)
}

pub fn export_filename(now: NaiveDateTime) -> String {
    format!("aquaflow_export_{}.csv", now.format("%Y%m%d_%H%M"))
}

fn intake_label<'a>(entry: &LogEntry, categories: &'a [IntakeCategory]) -> &'a str {
    entry
        .intake_type_id
        .as_deref()
        .filter(|id| *id != NONE_CATEGORY)
        .and_then(|id| categories.iter().find(|c| c.id == id))
        .map(|c| c.label.as_str())
        .unwrap_or("")
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn quote_if_needed(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        quote(field)
    } else {
        field.to_string()
    }
}
