// Personal best detection and per-exercise records
use crate::metrics::exercise_kind;
use crate::model::{ExerciseId, ExerciseKind, SetId, SetRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Available formulas for estimating a one-rep max.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OneRmFormula {
    /// Epley formula: `weight * (1 + reps / 30)`.
    #[default]
    Epley,
    /// Brzycki formula: `weight * 36 / (37 - reps)`.
    Brzycki,
}

impl OneRmFormula {
    /// Estimated one-rep max for a set, `None` where the formula breaks down.
    pub fn estimate(self, weight: f64, reps: u32) -> Option<f64> {
        match self {
            OneRmFormula::Epley => Some(weight * (1.0 + reps as f64 / 30.0)),
            OneRmFormula::Brzycki => {
                if reps >= 37 {
                    None
                } else {
                    Some(weight * 36.0 / (37.0 - reps as f64))
                }
            }
        }
    }
}

/// Best values observed for a single exercise.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ExerciseRecord {
    pub max_weight: Option<f64>,
    pub max_reps: Option<u32>,
    pub max_volume: Option<f64>,
    pub best_est_1rm: Option<f64>,
    pub pb_count: usize,
}

fn comparison_value(set: &SetRecord, kind: ExerciseKind) -> f64 {
    match kind {
        ExerciseKind::Weighted => set.weight,
        ExerciseKind::BodyweightReps => set.reps as f64,
    }
}

/// Working sets of `history` in chronological order.
///
/// Logs arrive in insertion order, so this sorts stably by timestamp and
/// keeps insertion order for sets logged at the same instant.
pub fn chronological(history: &[SetRecord]) -> Vec<&SetRecord> {
    let mut sets: Vec<&SetRecord> = history.iter().filter(|s| s.is_working()).collect();
    sets.sort_by_key(|s| s.timestamp);
    sets
}

/// Ids of sets that beat every earlier working set of the same exercise.
///
/// Weight is compared for weighted exercises and reps for bodyweight ones.
/// Only a strictly greater value counts, so matching the previous best is
/// not a PB. The first working set is always a PB. Warm-ups are ignored.
pub fn mark_pbs(history: &[SetRecord], kind: ExerciseKind) -> BTreeSet<SetId> {
    let mut pbs = BTreeSet::new();
    let mut best: Option<f64> = None;
    for s in chronological(history) {
        let value = comparison_value(s, kind);
        if best.map_or(true, |b| value > b) {
            pbs.insert(s.id);
            best = Some(value);
        }
    }
    pbs
}

/// Run [`mark_pbs`] for every exercise found in `records`.
///
/// Each exercise is classified on its own sets before scanning.
pub fn mark_pbs_by_exercise(records: &[SetRecord]) -> HashMap<ExerciseId, BTreeSet<SetId>> {
    let mut by_exercise: HashMap<&ExerciseId, Vec<SetRecord>> = HashMap::new();
    for r in records {
        by_exercise.entry(&r.exercise).or_default().push(r.clone());
    }
    by_exercise
        .into_iter()
        .map(|(ex, sets)| {
            let kind = exercise_kind(&sets);
            (ex.clone(), mark_pbs(&sets, kind))
        })
        .collect()
}

/// Summarize the best values of one exercise's history.
pub fn exercise_record(
    history: &[SetRecord],
    kind: ExerciseKind,
    formula: OneRmFormula,
) -> ExerciseRecord {
    let mut rec = ExerciseRecord {
        pb_count: mark_pbs(history, kind).len(),
        ..ExerciseRecord::default()
    };
    for s in history.iter().filter(|s| s.is_working()) {
        rec.max_weight = Some(rec.max_weight.map_or(s.weight, |w| w.max(s.weight)));
        rec.max_reps = Some(rec.max_reps.map_or(s.reps, |r| r.max(s.reps)));
        rec.max_volume = Some(rec.max_volume.map_or(s.volume(), |v| v.max(s.volume())));
        if kind == ExerciseKind::Weighted {
            if let Some(est) = formula.estimate(s.weight, s.reps) {
                rec.best_est_1rm = match rec.best_est_1rm {
                    Some(current) if current >= est => Some(current),
                    _ => Some(est),
                };
            }
        }
    }
    rec
}
