//! Dashboard tuning constants.
//!
//! Stored as an optional JSON file on disk; every field has a default:
//! ```json
//! {
//!   "source_url": "https://docs.google.com/spreadsheets/d/<id>/export?format=csv",
//!   "rolling_window": 7,
//!   "y_axis": { "min": 68.0, "max": 75.0 },
//!   "fetch_timeout_secs": 30,
//!   "connect_timeout_secs": 10
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ReportError, ReportResult};

/// CSV export of the spreadsheet the dashboard was built around.
pub const DEFAULT_SOURCE_URL: &str = "https://docs.google.com/spreadsheets/d/15zspXv1dM__F0uunaG9hT_PsrPfU5MZJ-0IzjULzDXI/export?format=csv";

/// Fixed vertical display window of the weight chart, in kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl Default for AxisRange {
    fn default() -> Self {
        Self {
            min: 68.0,
            max: 75.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub source_url: Option<String>,
    pub rolling_window: usize,
    pub y_axis: AxisRange,
    pub fetch_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source_url: None,
            rolling_window: 7,
            y_axis: AxisRange::default(),
            fetch_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl DashboardConfig {
    /// Loads the config from a JSON file at `path` and validates it.
    pub fn load(path: &str) -> ReportResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DashboardConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ReportResult<()> {
        if self.rolling_window == 0 {
            return Err(ReportError::Config(
                "rolling_window must be at least 1".to_string(),
            ));
        }
        if !(self.y_axis.min < self.y_axis.max) {
            return Err(ReportError::Config(format!(
                "y_axis.min ({}) must be below y_axis.max ({})",
                self.y_axis.min, self.y_axis.max
            )));
        }
        if self.fetch_timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(ReportError::Config(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
