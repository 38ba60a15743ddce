//! Chart-ready series and annotations derived from normalized records.
//!
//! Nothing here draws; the presentation layer consumes [`ChartData`].

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::AxisRange;
use crate::model::NormalizedRecord;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A vertical line marking a change of nutrition plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerEvent {
    pub date: NaiveDate,
    pub kcal: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub daily_weight: Vec<SeriesPoint>,
    pub weekly_average: Vec<SeriesPoint>,
    pub rolling_average: Vec<SeriesPoint>,
    pub markers: Vec<MarkerEvent>,
    pub y_axis: AxisRange,
    /// Height at which marker labels sit: the top of the visible range.
    pub marker_label_y: f64,
}

impl ChartData {
    pub fn from_records(records: &[NormalizedRecord], y_axis: AxisRange) -> Self {
        Self {
            daily_weight: series(records, |r| r.weight_kg),
            weekly_average: positive_series(records, |r| r.weekly_avg_kg),
            rolling_average: positive_series(records, |r| r.rolling_avg),
            markers: marker_events(records),
            y_axis,
            marker_label_y: y_axis.max,
        }
    }
}

/// `(date, value)` pairs for every record where `value` is present.
pub fn series(
    records: &[NormalizedRecord],
    value: impl Fn(&NormalizedRecord) -> Option<f64>,
) -> Vec<SeriesPoint> {
    records
        .iter()
        .filter_map(|r| value(r).map(|v| SeriesPoint { date: r.date, value: v }))
        .collect()
}

/// Like [`series`], keeping only strictly positive values.
pub fn positive_series(
    records: &[NormalizedRecord],
    value: impl Fn(&NormalizedRecord) -> Option<f64>,
) -> Vec<SeriesPoint> {
    series(records, |r| value(r).filter(|v| *v > 0.0))
}

/// One marker per record carrying a kcal value, zero included.
pub fn marker_events(records: &[NormalizedRecord]) -> Vec<MarkerEvent> {
    records
        .iter()
        .filter_map(|r| {
            r.nutrition_kcal.map(|kcal| MarkerEvent {
                date: r.date,
                kcal,
                label: kcal_label(kcal),
            })
        })
        .collect()
}

/// Formats a kcal value, dropping the fraction when it is zero.
pub fn kcal_label(kcal: f64) -> String {
    if kcal.fract() == 0.0 {
        format!("{kcal:.0}")
    } else {
        kcal.to_string()
    }
}
