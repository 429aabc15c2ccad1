// Per-bucket workout metrics
use crate::grouping::group_working;
use crate::model::{ExerciseKind, Granularity, SessionAggregate, SetRecord};
use chrono::{NaiveDate, Weekday};

/// Compute the aggregate for one bucket of sets.
///
/// Warm-ups are removed before anything is counted, so callers may pass raw
/// records. When several sets share the top weight, `reps_at_max_weight`
/// takes the highest rep count among them.
pub fn aggregate<'a, I>(date: NaiveDate, sets: I) -> SessionAggregate
where
    I: IntoIterator<Item = &'a SetRecord>,
{
    let mut agg = SessionAggregate::empty(date);
    for s in sets.into_iter().filter(|s| s.is_working()) {
        agg.volume += s.volume();
        agg.total_reps += s.reps;
        agg.max_reps = agg.max_reps.max(s.reps);
        if agg.set_count == 0 || s.weight > agg.max_weight {
            agg.max_weight = s.weight;
            agg.reps_at_max_weight = s.reps;
        } else if s.weight == agg.max_weight {
            agg.reps_at_max_weight = agg.reps_at_max_weight.max(s.reps);
        }
        agg.set_count += 1;
        agg.sets.push(s.clone());
    }
    agg
}

/// One aggregate per calendar day with at least one working set, oldest first.
pub fn daily_sessions(sets: &[SetRecord]) -> Vec<SessionAggregate> {
    bucket_aggregates(sets, Granularity::Daily, Weekday::Mon)
}

/// Aggregates for every non-empty bucket at `granularity`, oldest first.
pub fn bucket_aggregates(
    sets: &[SetRecord],
    granularity: Granularity,
    week_start: Weekday,
) -> Vec<SessionAggregate> {
    group_working(sets, granularity, week_start)
        .into_iter()
        .map(|(date, bucket)| {
            let mut ordered = bucket;
            ordered.sort_by_key(|s| s.timestamp);
            aggregate(date, ordered)
        })
        .collect()
}

/// Classify an exercise from its working sets.
///
/// It is `BodyweightReps` only when there is at least one working set and
/// every working set has zero weight.
pub fn exercise_kind(sets: &[SetRecord]) -> ExerciseKind {
    let mut working = sets.iter().filter(|s| s.is_working()).peekable();
    if working.peek().is_none() {
        return ExerciseKind::Weighted;
    }
    if working.all(|s| s.weight == 0.0) {
        ExerciseKind::BodyweightReps
    } else {
        ExerciseKind::Weighted
    }
}
