// Core data types shared by the analytics modules
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned to a set by whoever owns the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SetId(pub u64);

/// Identifier of an exercise. Hevy exports use the exercise title.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExerciseId(pub String);

impl ExerciseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single logged set.
///
/// `timestamp` is local wall-clock time, so calendar-day grouping does not
/// depend on the machine running the analysis. Records are read-only input;
/// nothing in this crate creates or edits them on behalf of the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
    pub id: SetId,
    pub exercise: ExerciseId,
    pub timestamp: NaiveDateTime,
    pub weight: f64,
    pub reps: u32,
    #[serde(default)]
    pub is_warm_up: bool,
    #[serde(default)]
    pub is_drop_set: bool,
}

impl SetRecord {
    /// Build a record from a zoned timestamp, keeping its local wall-clock time.
    pub fn at<Tz: TimeZone>(
        id: SetId,
        exercise: ExerciseId,
        timestamp: DateTime<Tz>,
        weight: f64,
        reps: u32,
    ) -> Self {
        Self {
            id,
            exercise,
            timestamp: timestamp.naive_local(),
            weight,
            reps,
            is_warm_up: false,
            is_drop_set: false,
        }
    }

    /// Working sets are everything except warm-ups. Drop sets count.
    pub fn is_working(&self) -> bool {
        !self.is_warm_up
    }

    pub fn volume(&self) -> f64 {
        self.weight * self.reps as f64
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Whether an exercise is tracked by load or by repetitions alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    #[default]
    Weighted,
    BodyweightReps,
}

/// Bucket size used when grouping sets by time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Daily,
    /// Buckets start on the configured first day of the week.
    Weekly,
    /// Buckets start on the first day of the calendar month.
    Monthly,
}

/// Derived metrics for one bucket of working sets.
///
/// `volume` is always the sum of `weight * reps` over `sets` and
/// `max_weight` is 0 when there are no sets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionAggregate {
    pub date: NaiveDate,
    pub sets: Vec<SetRecord>,
    pub volume: f64,
    pub max_weight: f64,
    pub reps_at_max_weight: u32,
    pub max_reps: u32,
    pub total_reps: u32,
    pub set_count: usize,
}

impl SessionAggregate {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            sets: Vec::new(),
            volume: 0.0,
            max_weight: 0.0,
            reps_at_max_weight: 0,
            max_reps: 0,
            total_reps: 0,
            set_count: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.set_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};

    #[test]
    fn zoned_timestamp_keeps_wall_clock() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let dt = tz.with_ymd_and_hms(2024, 3, 1, 23, 59, 0).unwrap();
        let rec = SetRecord::at(SetId(1), ExerciseId::new("Squat"), dt, 100.0, 5);
        assert_eq!(rec.date(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(rec.timestamp.format("%H:%M").to_string(), "23:59");
        assert!(rec.is_working());
        assert!((rec.volume() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn granularity_defaults_to_daily() {
        assert_eq!(Granularity::default(), Granularity::Daily);
    }

    #[test]
    fn drop_sets_are_working_sets() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let mut rec = SetRecord {
            id: SetId(2),
            exercise: ExerciseId::new("Curl"),
            timestamp: dt,
            weight: 10.0,
            reps: 12,
            is_warm_up: false,
            is_drop_set: true,
        };
        assert!(rec.is_working());
        rec.is_warm_up = true;
        assert!(!rec.is_working());
    }
}
