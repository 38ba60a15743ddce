//! One full render pass: normalize, derive, filter, summarize.
//!
//! A [`Dashboard`] is rebuilt from scratch on every request; the selected
//! date range comes in as a parameter and nothing is retained between calls.

use serde::Serialize;
use tracing::{info, warn};

use crate::chart::ChartData;
use crate::config::DashboardConfig;
use crate::error::{ReportError, ReportResult};
use crate::model::{DateRange, DateSelection, NormalizedRecord};
use crate::parser::ingest_and_normalize;
use crate::series::{compute_rolling_average, filter_by_date_range};
use crate::stats::{SummaryStats, summarize};

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    /// Range actually applied; `None` when the source holds no rows.
    pub range: Option<DateRange>,
    pub records: Vec<NormalizedRecord>,
    pub summary: SummaryStats,
    pub chart: ChartData,
    pub rows_read: usize,
    pub parse_issues: Vec<String>,
}

impl Dashboard {
    /// Builds the dashboard from already-normalized, date-ordered records.
    ///
    /// The rolling average is computed over the whole series before the
    /// range is applied, so the first days of a range still get a value.
    /// Open ends of `selection` take the first/last date in the data.
    ///
    /// # Errors
    ///
    /// [`ReportError::InvalidRange`] if the resolved range ends before it starts.
    pub fn build(
        mut records: Vec<NormalizedRecord>,
        selection: &DateSelection,
        config: &DashboardConfig,
    ) -> ReportResult<Self> {
        let rows_read = records.len();
        compute_rolling_average(&mut records, config.rolling_window);

        let range = selection.resolve(&records);
        let records = match &range {
            Some(range) => filter_by_date_range(&records, range)?,
            None => Vec::new(),
        };

        let summary = summarize(&records);
        if summary.is_empty() {
            warn!("No weighings in the selected range");
        }
        let chart = ChartData::from_records(&records, config.y_axis);

        Ok(Self {
            range,
            records,
            summary,
            chart,
            rows_read,
            parse_issues: Vec::new(),
        })
    }

    /// Runs ingest and [`Dashboard::build`] over the raw export bytes.
    #[tracing::instrument(skip(bytes, config), fields(bytes = bytes.len()))]
    pub fn from_export(
        bytes: &[u8],
        selection: &DateSelection,
        config: &DashboardConfig,
    ) -> ReportResult<Self> {
        let ingested = ingest_and_normalize(bytes)?;
        if !ingested.issues.is_empty() {
            warn!(
                issues = ingested.issues.len(),
                dropped = ingested.rows_dropped(),
                "Some rows could not be fully parsed"
            );
        }

        let mut dashboard = Self::build(ingested.records, selection, config)?;
        dashboard.rows_read = ingested.rows_read;
        dashboard.parse_issues = ingested.issues.iter().map(ToString::to_string).collect();

        info!(
            rows_read = dashboard.rows_read,
            shown = dashboard.records.len(),
            markers = dashboard.chart.markers.len(),
            "Dashboard built"
        );
        Ok(dashboard)
    }

    /// Fails with [`ReportError::EmptyDataset`] when there is nothing to show.
    pub fn require_data(&self) -> ReportResult<&Self> {
        if self.summary.is_empty() {
            Err(ReportError::EmptyDataset)
        } else {
            Ok(self)
        }
    }
}
