//! CSV ingest for the weighing spreadsheet export.
//!
//! The sheet uses Italian column labels, `DD/MM/YYYY` dates, `HH:MM` times
//! and `,` as the decimal separator. Fatal problems (encoding, missing
//! columns) abort the ingest; a bad cell only affects its own row.

use chrono::{NaiveDate, NaiveTime, Timelike};
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, warn};

use crate::error::{ReportError, ReportResult};
use crate::model::{NormalizedRecord, TimeOfDay};

pub const COL_DAY: &str = "Giorno";
pub const COL_DATE: &str = "Data";
pub const COL_TIME: &str = "Ora";
pub const COL_WEIGHT: &str = "Kg";
pub const COL_WEEKLY_AVG: &str = "Media settimanale (Kg)";
pub const COL_KCAL: &str = "Kcal Piano nutrizionale";

const EXPECTED_COLUMNS: [&str; 6] = [
    COL_DAY,
    COL_DATE,
    COL_TIME,
    COL_WEIGHT,
    COL_WEEKLY_AVG,
    COL_KCAL,
];

/// Result of a successful ingest.
#[derive(Debug)]
pub struct Ingested {
    /// Kept rows, ascending by date; same-date rows keep source order.
    pub records: Vec<NormalizedRecord>,
    /// Row-scoped [`ReportError::ParseFailure`]s, in source order.
    pub issues: Vec<ReportError>,
    pub rows_read: usize,
}

impl Ingested {
    pub fn rows_dropped(&self) -> usize {
        self.rows_read - self.records.len()
    }
}

struct ColumnIndex {
    day: usize,
    date: usize,
    time: usize,
    weight: usize,
    weekly_avg: usize,
    kcal: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> ReportResult<Self> {
        let names: Vec<&str> = headers.iter().map(str::trim).collect();
        let position = |name: &str| names.iter().position(|h| *h == name);

        let missing: Vec<String> = EXPECTED_COLUMNS
            .iter()
            .copied()
            .filter(|&c| position(c).is_none())
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(ReportError::SchemaMismatch { missing });
        }

        let index = |name: &str| position(name).unwrap_or_default();
        Ok(Self {
            day: index(COL_DAY),
            date: index(COL_DATE),
            time: index(COL_TIME),
            weight: index(COL_WEIGHT),
            weekly_avg: index(COL_WEEKLY_AVG),
            kcal: index(COL_KCAL),
        })
    }
}

/// Parses a decimal that may use `,` as separator. Blank cells are `Ok(None)`.
fn parse_decimal(raw: &str) -> Result<Option<f64>, ()> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.replace(',', ".").parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(()),
    }
}

/// Parses a `DD/MM/YYYY` calendar date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%d/%m/%Y").ok()
}

/// Parses `HH:MM`; a trailing `:SS` is accepted and dropped.
pub fn parse_time(raw: &str) -> Option<TimeOfDay> {
    let trimmed = raw.trim();
    let time = NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .ok()?;
    TimeOfDay::from_hm(time.hour(), time.minute())
}

fn push_issue(issues: &mut Vec<ReportError>, line: u64, field: &'static str, value: &str) {
    warn!(line, field, value, "Unparseable cell");
    issues.push(ReportError::ParseFailure {
        line,
        field,
        value: value.to_string(),
    });
}

fn read_decimal(
    issues: &mut Vec<ReportError>,
    line: u64,
    field: &'static str,
    raw: &str,
) -> Option<f64> {
    parse_decimal(raw).unwrap_or_else(|()| {
        push_issue(issues, line, field, raw);
        None
    })
}

/// Decodes the raw export and returns its rows as typed records.
///
/// # Errors
///
/// [`ReportError::Encoding`] if the bytes are not UTF-8,
/// [`ReportError::SchemaMismatch`] if any expected column is absent and
/// [`ReportError::Csv`] if the table itself is malformed. Cells that fail to
/// parse are reported in [`Ingested::issues`]: a bad date drops the row, a
/// bad time or number leaves that field missing.
#[tracing::instrument(skip(bytes), fields(bytes = bytes.len()))]
pub fn ingest_and_normalize(bytes: &[u8]) -> ReportResult<Ingested> {
    let text = std::str::from_utf8(bytes)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let columns = ColumnIndex::from_headers(reader.headers()?)?;

    let mut records = Vec::new();
    let mut issues = Vec::new();
    let mut rows_read = 0;

    for result in reader.records() {
        let row = result?;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            debug!("Skipping blank row");
            continue;
        }
        rows_read += 1;

        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let cell = |idx: usize| row.get(idx).unwrap_or("");

        let Some(date) = parse_date(cell(columns.date)) else {
            push_issue(&mut issues, line, COL_DATE, cell(columns.date));
            continue;
        };

        let raw_time = cell(columns.time);
        let time_of_day = parse_time(raw_time);
        if time_of_day.is_none() && !raw_time.trim().is_empty() {
            push_issue(&mut issues, line, COL_TIME, raw_time);
        }

        let raw_weight = cell(columns.weight);
        let weight_kg = match read_decimal(&mut issues, line, COL_WEIGHT, raw_weight) {
            Some(w) if w <= 0.0 => {
                push_issue(&mut issues, line, COL_WEIGHT, raw_weight);
                None
            }
            other => other,
        };
        let weekly_avg_kg =
            read_decimal(&mut issues, line, COL_WEEKLY_AVG, cell(columns.weekly_avg));
        let nutrition_kcal = read_decimal(&mut issues, line, COL_KCAL, cell(columns.kcal));

        records.push(NormalizedRecord {
            day_label: cell(columns.day).trim().to_string(),
            date,
            time_of_day,
            weight_kg,
            weekly_avg_kg,
            nutrition_kcal,
            rolling_avg: None,
        });
    }

    // stable: same-date rows keep their sheet order
    records.sort_by_key(|r| r.date);

    debug!(
        rows_read,
        kept = records.len(),
        issues = issues.len(),
        "Export normalized"
    );

    Ok(Ingested {
        records,
        issues,
        rows_read,
    })
}
