// Module for analyzing workout logs
use crate::chart::{self, ChartRange, ChartSeries};
use crate::comparison::{ComparisonMode, TodayComparison, compare_today};
use crate::metrics::{daily_sessions, exercise_kind};
use crate::model::{ExerciseId, ExerciseKind, SessionAggregate, SetId, SetRecord};
use crate::records::{ExerciseRecord, exercise_record, mark_pbs};
use crate::settings::AnalysisSettings;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Summary statistics about a workout log.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct LogSummary {
    pub total_workouts: usize,
    pub avg_sets_per_workout: f64,
    pub avg_reps_per_set: f64,
    pub avg_days_between: f64,
    pub most_common_exercise: Option<ExerciseId>,
}

/// Everything derived for one exercise at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseReport {
    pub exercise: ExerciseId,
    pub kind: ExerciseKind,
    pub sessions: Vec<SessionAggregate>,
    pub personal_bests: BTreeSet<SetId>,
    pub last_session: TodayComparison,
    pub all_time_best: TodayComparison,
    pub chart: ChartSeries,
    pub record: ExerciseRecord,
}

impl ExerciseReport {
    /// The comparison for the requested mode.
    pub fn comparison(&self, mode: ComparisonMode) -> &TodayComparison {
        match mode {
            ComparisonMode::LastSession => &self.last_session,
            ComparisonMode::AllTimeBest => &self.all_time_best,
        }
    }

    pub fn is_pb(&self, id: SetId) -> bool {
        self.personal_bests.contains(&id)
    }
}

/// Run the full analysis pass for `exercise`.
///
/// `records` may hold the whole log; only sets of `exercise` are used. The
/// exercise kind is determined once here and handed to every step.
pub fn analyze_exercise(
    records: &[SetRecord],
    exercise: &ExerciseId,
    now: NaiveDateTime,
    range: ChartRange,
    settings: &AnalysisSettings,
) -> ExerciseReport {
    let sets: Vec<SetRecord> = records
        .iter()
        .filter(|r| &r.exercise == exercise)
        .cloned()
        .collect();
    log::info!("Analyzing {} sets of {}", sets.len(), exercise);

    let kind = exercise_kind(&sets);
    let sessions = daily_sessions(&sets);
    let last_session = compare_today(&sessions, now, ComparisonMode::LastSession, kind);
    let all_time_best = compare_today(&sessions, now, ComparisonMode::AllTimeBest, kind);

    ExerciseReport {
        exercise: exercise.clone(),
        kind,
        personal_bests: mark_pbs(&sets, kind),
        chart: chart::build(&sets, kind, range, now, settings),
        record: exercise_record(&sets, kind, settings.one_rm_formula),
        sessions,
        last_session,
        all_time_best,
    }
}

/// Distinct exercises in the log, sorted by name.
pub fn unique_exercises(records: &[SetRecord]) -> Vec<ExerciseId> {
    let set: BTreeSet<&ExerciseId> = records.iter().map(|r| &r.exercise).collect();
    set.into_iter().cloned().collect()
}

/// Compute overall statistics for the working sets in `records`.
///
/// Only sets dated inside the optional inclusive `start`/`end` range count.
/// If no workout days remain an empty [`LogSummary`] is returned.
pub fn summarize_log(
    records: &[SetRecord],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> LogSummary {
    if records.is_empty() {
        return LogSummary::default();
    }

    log::info!("Computing statistics for {} sets", records.len());

    let mut sets_per_day: HashMap<NaiveDate, usize> = HashMap::new();
    let mut total_reps = 0u64;
    let mut exercise_counts: HashMap<&ExerciseId, usize> = HashMap::new();

    for r in records.iter().filter(|r| r.is_working()) {
        let d = r.date();
        if start.map_or(true, |s| d >= s) && end.map_or(true, |e| d <= e) {
            *sets_per_day.entry(d).or_insert(0) += 1;
            total_reps += r.reps as u64;
            *exercise_counts.entry(&r.exercise).or_insert(0) += 1;
        }
    }

    let total_workouts = sets_per_day.len();
    let total_sets: usize = sets_per_day.values().sum();

    if total_workouts == 0 {
        log::warn!("No working sets in the selected range");
        return LogSummary::default();
    }

    let avg_sets_per_workout = total_sets as f64 / total_workouts as f64;
    let avg_reps_per_set = total_reps as f64 / total_sets as f64;

    let mut dates: Vec<NaiveDate> = sets_per_day.keys().cloned().collect();
    dates.sort();
    let total_gap_days: i64 = dates.windows(2).map(|w| (w[1] - w[0]).num_days()).sum();
    let avg_days_between = if dates.len() > 1 {
        total_gap_days as f64 / (dates.len() as f64 - 1.0)
    } else {
        0.0
    };

    // ties go to the alphabetically first exercise so the result is stable
    let most_common_exercise = exercise_counts
        .into_iter()
        .max_by(|(a_ex, a), (b_ex, b)| a.cmp(b).then_with(|| b_ex.cmp(a_ex)))
        .map(|(ex, _)| ex.clone());

    LogSummary {
        total_workouts,
        avg_sets_per_workout,
        avg_reps_per_set,
        avg_days_between,
        most_common_exercise,
    }
}
