//! Core data types shared by the pipeline stages.

use chrono::{Days, NaiveDate};
use serde::{Serialize, Serializer};
use std::fmt;

/// A time of day at minute resolution, stored as minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MINUTES_PER_DAY: u32 = 24 * 60;

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self((hour * 60 + minute) as u16))
        } else {
            None
        }
    }

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        (minutes < Self::MINUTES_PER_DAY).then_some(Self(minutes as u16))
    }

    pub fn minutes_since_midnight(self) -> u32 {
        u32::from(self.0)
    }

    pub fn hour(self) -> u32 {
        self.minutes_since_midnight() / 60
    }

    pub fn minute(self) -> u32 {
        self.minutes_since_midnight() % 60
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One weighing after type coercion and date/time parsing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    /// Weekday name as typed in the sheet; not derived from `date`.
    pub day_label: String,
    pub date: NaiveDate,
    pub time_of_day: Option<TimeOfDay>,
    pub weight_kg: Option<f64>,
    pub weekly_avg_kg: Option<f64>,
    pub nutrition_kcal: Option<f64>,
    /// Trailing mean filled in by [`crate::series::compute_rolling_average`].
    pub rolling_avg: Option<f64>,
}

impl NormalizedRecord {
    pub fn minutes_since_midnight(&self) -> Option<u32> {
        self.time_of_day.map(TimeOfDay::minutes_since_midnight)
    }
}

/// Inclusive calendar-date bounds selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The `days`-long window ending on `end`, both ends included.
    pub fn trailing(end: NaiveDate, days: u64) -> Self {
        let start = end
            .checked_sub_days(Days::new(days.saturating_sub(1)))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    /// Smallest range holding every record, or `None` for an empty slice.
    pub fn spanning(records: &[NormalizedRecord]) -> Option<Self> {
        let start = records.iter().map(|r| r.date).min()?;
        let end = records.iter().map(|r| r.date).max()?;
        Some(Self { start, end })
    }

    pub fn is_inverted(&self) -> bool {
        self.end < self.start
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Optional bounds picked by the user; open ends fall back to the data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateSelection {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateSelection {
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Fills open ends with the earliest/latest record date. `None` when an
    /// end is open and there are no records to take it from.
    ///
    /// Only a selection with both ends given can come out inverted. With one
    /// open end lying past the data, the range collapses onto the given day.
    pub fn resolve(&self, records: &[NormalizedRecord]) -> Option<DateRange> {
        let span = DateRange::spanning(records);
        let start = self.from.or(span.map(|s| s.start))?;
        let end = self.to.or(span.map(|s| s.end))?;

        let range = match (self.from, self.to) {
            (Some(from), None) if end < from => DateRange::new(from, from),
            (None, Some(to)) if to < start => DateRange::new(to, to),
            _ => DateRange { start, end },
        };
        Some(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_time_of_day_recovers_hour_and_minute() {
        for (h, m) in [(0, 0), (6, 5), (7, 59), (23, 59)] {
            let t = TimeOfDay::from_hm(h, m).unwrap();
            assert_eq!(t.minutes_since_midnight(), h * 60 + m);
            assert_eq!((t.hour(), t.minute()), (h, m));
        }
    }

    #[test]
    fn test_time_of_day_rejects_out_of_range() {
        assert!(TimeOfDay::from_hm(24, 0).is_none());
        assert!(TimeOfDay::from_hm(7, 60).is_none());
        assert!(TimeOfDay::from_minutes(1440).is_none());
    }

    #[test]
    fn test_time_of_day_display_and_json() {
        let t = TimeOfDay::from_hm(7, 5).unwrap();
        assert_eq!(t.to_string(), "07:05");
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"07:05\"");
    }

    #[test]
    fn test_trailing_window_is_seven_days_inclusive() {
        let range = DateRange::trailing(date(2024, 1, 10), 7);
        assert_eq!(range.start, date(2024, 1, 4));
        assert_eq!(range.end, date(2024, 1, 10));
        assert!(range.contains(date(2024, 1, 4)));
        assert!(!range.contains(date(2024, 1, 3)));
    }

    #[test]
    fn test_spanning_empty_is_none() {
        assert!(DateRange::spanning(&[]).is_none());
    }

    #[test]
    fn test_selection_fills_open_ends_from_data() {
        let records: Vec<NormalizedRecord> = [date(2024, 1, 3), date(2024, 1, 9)]
            .into_iter()
            .map(|d| NormalizedRecord {
                day_label: String::new(),
                date: d,
                time_of_day: None,
                weight_kg: None,
                weekly_avg_kg: None,
                nutrition_kcal: None,
                rolling_avg: None,
            })
            .collect();

        let open = DateSelection::default().resolve(&records);
        assert_eq!(open, Some(DateRange::new(date(2024, 1, 3), date(2024, 1, 9))));

        let half = DateSelection {
            from: Some(date(2024, 1, 5)),
            to: None,
        };
        assert_eq!(
            half.resolve(&records),
            Some(DateRange::new(date(2024, 1, 5), date(2024, 1, 9)))
        );

        let past_the_end = DateSelection {
            from: Some(date(2024, 6, 1)),
            to: None,
        };
        let range = past_the_end.resolve(&records).unwrap();
        assert!(!range.is_inverted());
        assert!(records.iter().all(|r| !range.contains(r.date)));

        let before_the_start = DateSelection {
            from: None,
            to: Some(date(2023, 6, 1)),
        };
        let range = before_the_start.resolve(&records).unwrap();
        assert!(!range.is_inverted());
        assert!(records.iter().all(|r| !range.contains(r.date)));

        assert_eq!(DateSelection::default().resolve(&[]), None);
        let closed = DateSelection::between(date(2024, 2, 1), date(2024, 1, 1));
        assert!(closed.resolve(&[]).unwrap().is_inverted());
    }

    #[test]
    fn test_inverted_range() {
        assert!(DateRange::new(date(2024, 3, 1), date(2024, 2, 1)).is_inverted());
        assert!(!DateRange::new(date(2024, 3, 1), date(2024, 3, 1)).is_inverted());
    }
}
