//! Output formatting and persistence for dashboards.
//!
//! Supports pretty-printing, a JSON bundle, the table as CSV and a one-line
//! metrics row for terminals.

use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use tracing::{debug, info};

use crate::error::ReportResult;
use crate::model::{NormalizedRecord, TimeOfDay};
use crate::report::Dashboard;
use crate::stats::SummaryStats;
use csv::WriterBuilder;

/// Shown wherever a statistic is undefined.
pub const NOT_AVAILABLE: &str = "n/a";

/// Logs a dashboard using Rust's debug pretty-print format.
pub fn print_pretty(dashboard: &Dashboard) {
    debug!("{:#?}", dashboard);
}

/// Serializes a dashboard as pretty-printed JSON.
pub fn to_json(dashboard: &Dashboard) -> ReportResult<String> {
    Ok(serde_json::to_string_pretty(dashboard)?)
}

/// Writes the dashboard JSON bundle to `path`, replacing any existing file.
pub fn write_json(path: &str, dashboard: &Dashboard) -> ReportResult<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, dashboard)?;
    info!(path, "Dashboard JSON written");
    Ok(())
}

/// A table row in the sheet's own display convention.
#[derive(Serialize)]
struct TableRow<'a> {
    #[serde(rename = "Data")]
    date: String,
    #[serde(rename = "Giorno")]
    day_label: &'a str,
    #[serde(rename = "Ora")]
    time: String,
    #[serde(rename = "Peso (Kg)")]
    weight: String,
    #[serde(rename = "Peso medio della settimana (Kg)")]
    weekly_avg: String,
    #[serde(rename = "Media mobile (Kg)")]
    rolling_avg: String,
    #[serde(rename = "Intake calorico giornaliero")]
    kcal: String,
}

impl<'a> From<&'a NormalizedRecord> for TableRow<'a> {
    fn from(r: &'a NormalizedRecord) -> Self {
        Self {
            date: r.date.format("%d/%m/%Y").to_string(),
            day_label: &r.day_label,
            time: r.time_of_day.map(|t| t.to_string()).unwrap_or_default(),
            weight: cell(r.weight_kg),
            weekly_avg: cell(r.weekly_avg_kg.filter(|v| *v > 0.0)),
            rolling_avg: cell(r.rolling_avg),
            kcal: cell(r.nutrition_kcal),
        }
    }
}

/// Missing values become empty cells, never `0`.
fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Writes the records as a CSV table to any writer.
pub fn write_table<W: std::io::Write>(writer: W, records: &[NormalizedRecord]) -> ReportResult<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    for record in records {
        writer.serialize(TableRow::from(record))?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the records as a CSV table at `path`.
pub fn write_table_file(path: &str, records: &[NormalizedRecord]) -> ReportResult<()> {
    debug!(path, rows = records.len(), "Writing table CSV");
    write_table(File::create(path)?, records)
}

fn time_or_na(t: Option<TimeOfDay>) -> String {
    t.map(|t| t.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn weight_of(record: Option<&NormalizedRecord>) -> String {
    match record.and_then(|r| r.weight_kg.map(|w| (w, r.date))) {
        Some((w, date)) => format!("{w:.2} kg ({})", date.format("%d/%m/%Y")),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Renders the headline metrics as a single line.
pub fn metrics_row(summary: &SummaryStats) -> String {
    let recent = summary
        .last_7_days_mean_weight
        .map(|w| format!("{w:.2} kg"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    format!(
        "mean time {} | earliest {} | latest {} | min {} | max {} | last 7 days {}",
        time_or_na(summary.mean_time_of_day),
        time_or_na(summary.min_time_of_day),
        time_or_na(summary.max_time_of_day),
        weight_of(summary.min_weight_record.as_ref()),
        weight_of(summary.max_weight_record.as_ref()),
        recent,
    )
}
