//! Crate-wide error type.
//!
//! Fatal conditions (fetch, encoding, schema) abort a render. `ParseFailure`
//! is row-scoped and is collected by the parser instead of being returned.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetch of {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("source is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("missing expected columns: {}", .missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    #[error("line {line}: invalid {field} value {value:?}")]
    ParseFailure {
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("no weighings available")]
    EmptyDataset,

    #[error("invalid date range: end {end} is before start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ReportError {
    /// True for network errors and non-200 responses alike.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, ReportError::Fetch { .. } | ReportError::HttpStatus { .. })
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
