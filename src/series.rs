//! Operations over the date-ordered record sequence.

use tracing::debug;

use crate::error::{ReportError, ReportResult};
use crate::model::{DateRange, NormalizedRecord};

/// Rounds to 2 decimal places, halves away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fills `rolling_avg` with the trailing mean of `weight_kg` over the last
/// `window` rows (current row included).
///
/// A row gets a value only when `window` rows exist up to and including it
/// and every one of them has a weight; otherwise it is `None`. Records must
/// already be ascending by date.
pub fn compute_rolling_average(records: &mut [NormalizedRecord], window: usize) {
    let weights: Vec<Option<f64>> = records.iter().map(|r| r.weight_kg).collect();

    for (i, record) in records.iter_mut().enumerate() {
        record.rolling_avg = if window == 0 || i + 1 < window {
            None
        } else {
            weights[i + 1 - window..=i]
                .iter()
                .copied()
                .sum::<Option<f64>>()
                .map(|sum| round2(sum / window as f64))
        };
    }
}

/// Keeps the records whose date lies in `range`, bounds included.
///
/// # Errors
///
/// [`ReportError::InvalidRange`] when `range.end` precedes `range.start`.
/// A valid range with nothing in it returns `Ok` with an empty vector.
pub fn filter_by_date_range(
    records: &[NormalizedRecord],
    range: &DateRange,
) -> ReportResult<Vec<NormalizedRecord>> {
    if range.is_inverted() {
        return Err(ReportError::InvalidRange {
            start: range.start,
            end: range.end,
        });
    }

    let kept: Vec<NormalizedRecord> = records
        .iter()
        .filter(|r| range.contains(r.date))
        .cloned()
        .collect();

    debug!(
        start = %range.start,
        end = %range.end,
        kept = kept.len(),
        total = records.len(),
        "Date range applied"
    );
    Ok(kept)
}
