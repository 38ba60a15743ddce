use serde::Serialize;

use crate::model::{DateRange, NormalizedRecord, TimeOfDay};

/// Length of the trailing window used for the recent mean weight.
pub const RECENT_WINDOW_DAYS: u64 = 7;

/// Summary metrics over a (possibly filtered) record set.
///
/// Every statistic is `None` when it cannot be computed; a computed value
/// is never replaced by zero.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub record_count: usize,
    pub weighed_count: usize,

    // time of day
    pub mean_time_of_day: Option<TimeOfDay>,
    pub min_time_of_day: Option<TimeOfDay>,
    pub max_time_of_day: Option<TimeOfDay>,

    // weight extremes, earliest row wins ties
    pub min_weight_record: Option<NormalizedRecord>,
    pub max_weight_record: Option<NormalizedRecord>,

    // anchored on the latest date in the set, not on today
    pub last_7_days_window: Option<DateRange>,
    pub last_7_days_mean_weight: Option<f64>,
}

impl SummaryStats {
    pub fn from_records(records: &[NormalizedRecord]) -> Self {
        let mut s = SummaryStats {
            record_count: records.len(),
            ..Default::default()
        };

        let mut minutes_total = 0u64;
        let mut timed = 0u64;

        for r in records {
            if let Some(t) = r.time_of_day {
                minutes_total += u64::from(t.minutes_since_midnight());
                timed += 1;

                if s.min_time_of_day.is_none_or(|min| t < min) {
                    s.min_time_of_day = Some(t);
                }
                if s.max_time_of_day.is_none_or(|max| t > max) {
                    s.max_time_of_day = Some(t);
                }
            }

            if let Some(w) = r.weight_kg {
                s.weighed_count += 1;

                if s.min_weight_record
                    .as_ref()
                    .and_then(|m| m.weight_kg)
                    .is_none_or(|min| w < min)
                {
                    s.min_weight_record = Some(r.clone());
                }
                if s.max_weight_record
                    .as_ref()
                    .and_then(|m| m.weight_kg)
                    .is_none_or(|max| w > max)
                {
                    s.max_weight_record = Some(r.clone());
                }
            }
        }

        if timed > 0 {
            let mean = (minutes_total as f64 / timed as f64).round() as u32;
            s.mean_time_of_day = TimeOfDay::from_minutes(mean);
        }

        if let Some(latest) = records.iter().map(|r| r.date).max() {
            let window = DateRange::trailing(latest, RECENT_WINDOW_DAYS);
            let recent: Vec<f64> = records
                .iter()
                .filter(|r| window.contains(r.date))
                .filter_map(|r| r.weight_kg)
                .collect();

            s.last_7_days_window = Some(window);
            s.last_7_days_mean_weight = mean(&recent);
        }

        s
    }

    /// True when no record survived normalization and filtering.
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}

/// Computes the summary bundle for `records`.
pub fn summarize(records: &[NormalizedRecord]) -> SummaryStats {
    SummaryStats::from_records(records)
}

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(date: NaiveDate, hm: Option<(u32, u32)>, weight: Option<f64>) -> NormalizedRecord {
        NormalizedRecord {
            day_label: date.format("%A").to_string(),
            date,
            time_of_day: hm.and_then(|(h, m)| TimeOfDay::from_hm(h, m)),
            weight_kg: weight,
            weekly_avg_kg: None,
            nutrition_kcal: None,
            rolling_avg: None,
        }
    }

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[70.0, 72.0]), Some(71.0));
    }

    #[test]
    fn test_summarize_empty_is_all_undefined() {
        let stats = summarize(&[]);

        assert!(stats.is_empty());
        assert_eq!(stats.mean_time_of_day, None);
        assert_eq!(stats.min_time_of_day, None);
        assert_eq!(stats.max_time_of_day, None);
        assert_eq!(stats.min_weight_record, None);
        assert_eq!(stats.max_weight_record, None);
        assert_eq!(stats.last_7_days_window, None);
        assert_eq!(stats.last_7_days_mean_weight, None);
    }

    #[test]
    fn test_time_of_day_stats() {
        let records = vec![
            record(date(2024, 1, 1), Some((7, 0)), Some(70.0)),
            record(date(2024, 1, 2), Some((6, 30)), Some(70.0)),
            record(date(2024, 1, 3), Some((8, 15)), Some(70.0)),
            record(date(2024, 1, 4), None, Some(70.0)),
        ];
        let stats = summarize(&records);

        // (420 + 390 + 495) / 3 = 435
        assert_eq!(stats.mean_time_of_day, TimeOfDay::from_hm(7, 15));
        assert_eq!(stats.min_time_of_day, TimeOfDay::from_hm(6, 30));
        assert_eq!(stats.max_time_of_day, TimeOfDay::from_hm(8, 15));
    }

    #[test]
    fn test_mean_time_rounds_to_nearest_minute() {
        let records = vec![
            record(date(2024, 1, 1), Some((7, 0)), None),
            record(date(2024, 1, 2), Some((7, 1)), None),
        ];
        assert_eq!(summarize(&records).mean_time_of_day, TimeOfDay::from_hm(7, 1));
    }

    #[test]
    fn test_no_times_leaves_time_stats_undefined() {
        let records = vec![record(date(2024, 1, 1), None, Some(70.0))];
        let stats = summarize(&records);
        assert!(!stats.is_empty());
        assert_eq!(stats.mean_time_of_day, None);
        assert_eq!(stats.min_time_of_day, None);
    }

    #[test]
    fn test_weight_extremes_earliest_wins_ties() {
        let records = vec![
            record(date(2024, 1, 1), None, Some(71.0)),
            record(date(2024, 1, 2), None, Some(69.5)),
            record(date(2024, 1, 3), None, Some(72.0)),
            record(date(2024, 1, 4), None, Some(69.5)),
            record(date(2024, 1, 5), None, Some(72.0)),
            record(date(2024, 1, 6), None, None),
        ];
        let stats = summarize(&records);

        assert_eq!(stats.min_weight_record.unwrap().date, date(2024, 1, 2));
        assert_eq!(stats.max_weight_record.unwrap().date, date(2024, 1, 3));
        assert_eq!(stats.weighed_count, 5);
    }

    #[test]
    fn test_last_7_days_anchored_on_latest_date() {
        let records = vec![
            record(date(2024, 1, 1), None, Some(80.0)),
            record(date(2024, 1, 3), None, Some(80.0)),
            record(date(2024, 1, 4), None, Some(70.0)),
            record(date(2024, 1, 7), None, Some(71.0)),
            record(date(2024, 1, 10), None, Some(72.0)),
        ];
        let stats = summarize(&records);

        assert_eq!(
            stats.last_7_days_window,
            Some(DateRange::new(date(2024, 1, 4), date(2024, 1, 10)))
        );
        assert_eq!(stats.last_7_days_mean_weight, Some(71.0));
    }

    #[test]
    fn test_last_7_days_without_weights_is_undefined() {
        let records = vec![
            record(date(2024, 1, 1), None, Some(70.0)),
            record(date(2024, 1, 10), Some((7, 0)), None),
        ];
        let stats = summarize(&records);
        assert!(stats.last_7_days_window.is_some());
        assert_eq!(stats.last_7_days_mean_weight, None);
    }
}
