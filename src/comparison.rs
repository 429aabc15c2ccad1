// Session-over-session progress comparison
use crate::model::{ExerciseKind, SessionAggregate};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Direction of a metric change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Same,
}

impl Direction {
    pub fn of(delta: f64) -> Self {
        if delta > 0.0 {
            Direction::Up
        } else if delta < 0.0 {
            Direction::Down
        } else {
            Direction::Same
        }
    }
}

/// Change of one metric between a current and a reference aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricDelta {
    pub direction: Direction,
    pub delta: f64,
    /// Change relative to the reference value. Absent when that value is 0.
    pub percent: Option<f64>,
}

impl MetricDelta {
    pub fn between(current: f64, reference: f64) -> Self {
        let delta = current - reference;
        let percent = if reference != 0.0 {
            Some(delta / reference * 100.0)
        } else {
            None
        };
        MetricDelta {
            direction: Direction::of(delta),
            delta,
            percent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub weight: MetricDelta,
    pub reps: MetricDelta,
    pub volume: MetricDelta,
    pub total_reps: MetricDelta,
}

/// Which earlier session today is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
    /// The most recent session before today.
    #[default]
    LastSession,
    /// The strongest session before today.
    AllTimeBest,
}

/// Outcome of comparing today's session for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TodayComparison {
    /// Nothing logged today, so there is nothing to compare.
    NoData,
    /// Today has sets but there is no usable earlier session.
    Baseline,
    Compared {
        reference_date: NaiveDate,
        result: ComparisonResult,
    },
}

/// Compare `current` against `reference`.
///
/// Returns `None` when there is no reference or the reference carries no
/// work for this kind of exercise (zero volume for weighted, zero total reps
/// for bodyweight). "Reps" compares the reps achieved at the top weight.
pub fn compare(
    current: &SessionAggregate,
    reference: Option<&SessionAggregate>,
    kind: ExerciseKind,
) -> Option<ComparisonResult> {
    let reference = reference?;
    let empty = match kind {
        ExerciseKind::Weighted => reference.volume == 0.0,
        ExerciseKind::BodyweightReps => reference.total_reps == 0,
    };
    if empty {
        return None;
    }
    Some(ComparisonResult {
        weight: MetricDelta::between(current.max_weight, reference.max_weight),
        reps: MetricDelta::between(
            current.reps_at_max_weight as f64,
            reference.reps_at_max_weight as f64,
        ),
        volume: MetricDelta::between(current.volume, reference.volume),
        total_reps: MetricDelta::between(current.total_reps as f64, reference.total_reps as f64),
    })
}

/// The latest session dated strictly before `today`.
pub fn last_session(sessions: &[SessionAggregate], today: NaiveDate) -> Option<&SessionAggregate> {
    sessions
        .iter()
        .filter(|s| s.date < today)
        .max_by_key(|s| s.date)
}

/// The strongest session dated strictly before `today`.
///
/// Weighted exercises rank by top weight, then volume. Bodyweight exercises
/// rank by total reps. Remaining ties go to the most recent session.
pub fn all_time_best(
    sessions: &[SessionAggregate],
    today: NaiveDate,
    kind: ExerciseKind,
) -> Option<&SessionAggregate> {
    let mut best: Option<&SessionAggregate> = None;
    for s in sessions.iter().filter(|s| s.date < today) {
        best = match best {
            Some(b) if !outranks(s, b, kind) => Some(b),
            _ => Some(s),
        };
    }
    best
}

fn outranks(a: &SessionAggregate, b: &SessionAggregate, kind: ExerciseKind) -> bool {
    let (primary_a, primary_b, secondary_a, secondary_b) = match kind {
        ExerciseKind::Weighted => (a.max_weight, b.max_weight, a.volume, b.volume),
        ExerciseKind::BodyweightReps => (
            a.total_reps as f64,
            b.total_reps as f64,
            a.total_reps as f64,
            b.total_reps as f64,
        ),
    };
    if primary_a != primary_b {
        return primary_a > primary_b;
    }
    if secondary_a != secondary_b {
        return secondary_a > secondary_b;
    }
    a.date > b.date
}

/// Pick the reference session for `mode`.
pub fn select_reference(
    sessions: &[SessionAggregate],
    today: NaiveDate,
    mode: ComparisonMode,
    kind: ExerciseKind,
) -> Option<&SessionAggregate> {
    match mode {
        ComparisonMode::LastSession => last_session(sessions, today),
        ComparisonMode::AllTimeBest => all_time_best(sessions, today, kind),
    }
}

/// Compare today's session against the reference chosen by `mode`.
///
/// `sessions` are daily aggregates. A missing or empty session for today
/// yields [`TodayComparison::NoData`] rather than a flat comparison.
pub fn compare_today(
    sessions: &[SessionAggregate],
    now: NaiveDateTime,
    mode: ComparisonMode,
    kind: ExerciseKind,
) -> TodayComparison {
    let today = now.date();
    let Some(current) = sessions.iter().find(|s| s.date == today && !s.is_empty()) else {
        return TodayComparison::NoData;
    };
    let Some(reference) = select_reference(sessions, today, mode, kind) else {
        log::debug!("No session before {today} to compare against ({mode:?})");
        return TodayComparison::Baseline;
    };
    log::debug!("Comparing {today} against {} ({mode:?})", reference.date);
    match compare(current, Some(reference), kind) {
        Some(result) => TodayComparison::Compared {
            reference_date: reference.date,
            result,
        },
        None => TodayComparison::Baseline,
    }
}
