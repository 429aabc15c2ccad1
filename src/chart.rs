// Chart series with adaptive granularity and trend lines
use crate::grouping::group_working;
use crate::model::{ExerciseKind, Granularity, SetId, SetRecord};
use crate::records::mark_pbs;
use crate::settings::AnalysisSettings;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Lookback windows selectable for charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartRange {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    #[default]
    All,
}

pub const ALL_CHART_RANGES: [ChartRange; 6] = [
    ChartRange::OneMonth,
    ChartRange::ThreeMonths,
    ChartRange::SixMonths,
    ChartRange::OneYear,
    ChartRange::TwoYears,
    ChartRange::All,
];

/// Position of a range on the granularity ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum RangeTier {
    Shortest,
    Middle,
    Longer,
}

impl ChartRange {
    /// Days covered by the window, `None` for everything.
    pub fn lookback_days(self) -> Option<i64> {
        match self {
            ChartRange::OneMonth => Some(30),
            ChartRange::ThreeMonths => Some(90),
            ChartRange::SixMonths => Some(180),
            ChartRange::OneYear => Some(365),
            ChartRange::TwoYears => Some(730),
            ChartRange::All => None,
        }
    }

    /// Earliest timestamp included when charting at `now`.
    pub fn cutoff(self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        self.lookback_days()
            .and_then(|days| now.date().checked_sub_signed(Duration::days(days)))
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    fn tier(self) -> RangeTier {
        match self {
            ChartRange::OneMonth => RangeTier::Shortest,
            ChartRange::ThreeMonths | ChartRange::SixMonths => RangeTier::Middle,
            ChartRange::OneYear | ChartRange::TwoYears | ChartRange::All => RangeTier::Longer,
        }
    }
}

/// Values that can be plotted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Weight,
    Reps,
    Volume,
    TotalReps,
}

/// Pair of metrics plotted together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartMode {
    /// Top weight and top reps.
    Strength,
    /// Volume and total reps.
    Workload,
}

impl ChartMode {
    pub fn metrics(self, kind: ExerciseKind) -> &'static [Metric] {
        match (self, kind) {
            (ChartMode::Strength, ExerciseKind::Weighted) => &[Metric::Weight, Metric::Reps],
            (ChartMode::Strength, ExerciseKind::BodyweightReps) => &[Metric::Reps],
            (ChartMode::Workload, ExerciseKind::Weighted) => &[Metric::Volume, Metric::TotalReps],
            (ChartMode::Workload, ExerciseKind::BodyweightReps) => &[Metric::TotalReps],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct NormalizedValues {
    pub max_weight: f64,
    pub max_reps: f64,
    pub total_volume: f64,
    pub total_reps: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub index: usize,
    pub bucket_date: NaiveDate,
    pub max_weight: f64,
    pub max_reps: u32,
    pub total_volume: f64,
    pub total_reps: u32,
    pub normalized: NormalizedValues,
    pub is_pb: bool,
}

impl ChartPoint {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Weight => self.max_weight,
            Metric::Reps => self.max_reps as f64,
            Metric::Volume => self.total_volume,
            Metric::TotalReps => self.total_reps as f64,
        }
    }

    pub fn normalized_value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Weight => self.normalized.max_weight,
            Metric::Reps => self.normalized.max_reps,
            Metric::Volume => self.normalized.total_volume,
            Metric::TotalReps => self.normalized.total_reps,
        }
    }
}

/// Least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    pub fn value_at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub granularity: Granularity,
    pub points: Vec<ChartPoint>,
    pub trends: BTreeMap<Metric, Option<TrendLine>>,
}

impl ChartSeries {
    pub fn trend(&self, metric: Metric) -> Option<TrendLine> {
        self.trends.get(&metric).copied().flatten()
    }
}

/// Pick the bucket size for a chart.
///
/// Short spans stay daily. Past `weekly_span_days` only the shortest range
/// stays daily; past `monthly_span_days` the middle ranges go weekly and the
/// longer ones monthly.
pub fn choose_granularity(
    span_days: i64,
    range: ChartRange,
    settings: &AnalysisSettings,
) -> Granularity {
    let tier = range.tier();
    if span_days < settings.weekly_span_days || tier == RangeTier::Shortest {
        Granularity::Daily
    } else if span_days < settings.monthly_span_days || tier == RangeTier::Middle {
        Granularity::Weekly
    } else {
        Granularity::Monthly
    }
}

/// Map `values` onto `[0, 1]` with padding on both sides of the range.
///
/// Padding is `padding_fraction` of the range but never less than
/// `min_padding`, so a flat series lands on 0.5. Negative settings count as
/// zero, and a range that still has no width maps every value to 0.5.
pub fn normalize(values: &[f64], padding_fraction: f64, min_padding: f64) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let padding = ((max - min) * padding_fraction.max(0.0)).max(min_padding.max(0.0));
    let lower = min - padding;
    let width = max - min + 2.0 * padding;
    if !(width > 0.0 && width.is_finite()) {
        return vec![0.5; values.len()];
    }
    values.iter().map(|v| (v - lower) / width).collect()
}

/// Ordinary least squares fit of `y` against `x`.
///
/// Needs at least two points, a non-zero denominator and finite results.
pub fn fit_trend(points: &[(f64, f64)]) -> Option<TrendLine> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for (x, y) in points {
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }
    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return None;
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    if !slope.is_finite() || !intercept.is_finite() {
        return None;
    }
    Some(TrendLine { slope, intercept })
}

fn applicable_metrics(kind: ExerciseKind) -> BTreeSet<Metric> {
    [ChartMode::Strength, ChartMode::Workload]
        .iter()
        .flat_map(|m| m.metrics(kind).iter().copied())
        .collect()
}

/// Build chart points and trend lines for one exercise.
///
/// PB flags come from the full history so a set keeps its PB status when
/// the window hides the sets before it.
pub fn build(
    sets: &[SetRecord],
    kind: ExerciseKind,
    range: ChartRange,
    now: NaiveDateTime,
    settings: &AnalysisSettings,
) -> ChartSeries {
    let pbs: BTreeSet<SetId> = mark_pbs(sets, kind);
    let cutoff = range.cutoff(now);
    let visible: Vec<SetRecord> = sets
        .iter()
        .filter(|s| s.is_working())
        .filter(|s| cutoff.map_or(true, |c| s.timestamp >= c))
        .cloned()
        .collect();

    let span_days = match (
        visible.iter().map(|s| s.timestamp).min(),
        visible.iter().map(|s| s.timestamp).max(),
    ) {
        (Some(first), Some(last)) => (last - first).num_days(),
        _ => 0,
    };
    let granularity = choose_granularity(span_days, range, settings);
    log::debug!(
        "Charting {} sets over {} days with {:?} buckets ({:?})",
        visible.len(),
        span_days,
        granularity,
        range
    );

    let mut points: Vec<ChartPoint> = group_working(&visible, granularity, settings.week_start)
        .into_iter()
        .enumerate()
        .map(|(index, (bucket_date, bucket))| ChartPoint {
            index,
            bucket_date,
            max_weight: bucket.iter().map(|s| s.weight).fold(0.0, f64::max),
            max_reps: bucket.iter().map(|s| s.reps).max().unwrap_or(0),
            total_volume: bucket.iter().map(|s| s.volume()).sum(),
            total_reps: bucket.iter().map(|s| s.reps).sum(),
            normalized: NormalizedValues::default(),
            is_pb: bucket.iter().any(|s| pbs.contains(&s.id)),
        })
        .collect();

    let (fraction, min_pad) = (settings.padding_fraction, settings.min_padding);
    for metric in [Metric::Weight, Metric::Reps, Metric::Volume, Metric::TotalReps] {
        let raw: Vec<f64> = points.iter().map(|p| p.value(metric)).collect();
        for (p, n) in points.iter_mut().zip(normalize(&raw, fraction, min_pad)) {
            match metric {
                Metric::Weight => p.normalized.max_weight = n,
                Metric::Reps => p.normalized.max_reps = n,
                Metric::Volume => p.normalized.total_volume = n,
                Metric::TotalReps => p.normalized.total_reps = n,
            }
        }
    }

    let trends = applicable_metrics(kind)
        .into_iter()
        .map(|metric| {
            let pairs: Vec<(f64, f64)> = points
                .iter()
                .map(|p| (p.index as f64, p.normalized_value(metric)))
                .collect();
            (metric, fit_trend(&pairs))
        })
        .collect();

    ChartSeries {
        granularity,
        points,
        trends,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExerciseId;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
    }

    fn set(id: u64, offset_days: i64, weight: f64, reps: u32) -> SetRecord {
        SetRecord {
            id: SetId(id),
            exercise: ExerciseId::new("Squat"),
            timestamp: (start() + Duration::days(offset_days))
                .and_hms_opt(17, 0, 0)
                .unwrap(),
            weight,
            reps,
            is_warm_up: false,
            is_drop_set: false,
        }
    }

    fn now_after(offset_days: i64) -> NaiveDateTime {
        (start() + Duration::days(offset_days))
            .and_hms_opt(21, 0, 0)
            .unwrap()
    }

    fn spanning(days: i64) -> Vec<SetRecord> {
        vec![set(1, 0, 100.0, 5), set(2, days / 2, 105.0, 5), set(3, days, 110.0, 5)]
    }

    #[test]
    fn regression_on_perfect_line() {
        let pts: Vec<(f64, f64)> = [0.0, 0.25, 0.5, 0.75, 1.0]
            .iter()
            .enumerate()
            .map(|(i, y)| (i as f64, *y))
            .collect();
        let t = fit_trend(&pts).unwrap();
        assert!((t.slope - 0.25).abs() < 1e-9);
        assert!(t.intercept.abs() < 1e-9);
        assert!((t.value_at(4.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn regression_needs_two_distinct_x() {
        assert!(fit_trend(&[]).is_none());
        assert!(fit_trend(&[(0.0, 0.5)]).is_none());
        assert!(fit_trend(&[(1.0, 0.2), (1.0, 0.8)]).is_none());
    }

    #[test]
    fn normalize_pads_range() {
        let n = normalize(&[100.0, 200.0], 0.1, 1.0);
        // padding 10 on each side of a 100 wide range
        assert!((n[0] - 10.0 / 120.0).abs() < 1e-9);
        assert!((n[1] - 110.0 / 120.0).abs() < 1e-9);
        assert!(n.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn normalize_flat_series_hits_midpoint() {
        assert_eq!(normalize(&[42.0], 0.1, 1.0), vec![0.5]);
        assert_eq!(normalize(&[3.0, 3.0, 3.0], 0.1, 1.0), vec![0.5, 0.5, 0.5]);
        assert!(normalize(&[], 0.1, 1.0).is_empty());
    }

    #[test]
    fn normalize_without_padding_stays_in_range() {
        assert_eq!(normalize(&[100.0, 100.0], 0.1, 0.0), vec![0.5, 0.5]);
        assert_eq!(normalize(&[7.0], -0.5, -1.0), vec![0.5]);
        let n = normalize(&[0.0, 10.0], -0.1, 0.0);
        assert_eq!(n, vec![0.0, 1.0]);
    }

    #[test]
    fn regression_rejects_non_finite_values() {
        assert!(fit_trend(&[(0.0, f64::NAN), (1.0, 0.5)]).is_none());
        assert!(fit_trend(&[(0.0, f64::INFINITY), (1.0, 0.5)]).is_none());
    }

    #[test]
    fn flat_series_without_min_padding_has_no_nan() {
        let mut s = AnalysisSettings::default();
        s.min_padding = 0.0;
        let sets = vec![set(1, 0, 100.0, 5), set(2, 1, 100.0, 5), set(3, 2, 100.0, 5)];
        let series = build(&sets, ExerciseKind::Weighted, ChartRange::All, now_after(2), &s);
        assert_eq!(series.points.len(), 3);
        for p in &series.points {
            for m in [Metric::Weight, Metric::Reps, Metric::Volume, Metric::TotalReps] {
                assert!((0.0..=1.0).contains(&p.normalized_value(m)));
            }
        }
        let t = series.trend(Metric::Weight).unwrap();
        assert!(t.slope.abs() < 1e-9);
        assert!((t.intercept - 0.5).abs() < 1e-9);
    }

    #[test]
    fn short_spans_are_always_daily() {
        let settings = AnalysisSettings::default();
        for range in ALL_CHART_RANGES {
            assert_eq!(choose_granularity(179, range, &settings), Granularity::Daily);
        }
    }

    #[test]
    fn granularity_ladder() {
        let s = AnalysisSettings::default();
        assert_eq!(choose_granularity(181, ChartRange::OneMonth, &s), Granularity::Daily);
        assert_eq!(choose_granularity(181, ChartRange::SixMonths, &s), Granularity::Weekly);
        assert_eq!(choose_granularity(181, ChartRange::All, &s), Granularity::Weekly);
        assert_eq!(choose_granularity(400, ChartRange::OneMonth, &s), Granularity::Daily);
        assert_eq!(choose_granularity(400, ChartRange::ThreeMonths, &s), Granularity::Weekly);
        assert_eq!(choose_granularity(400, ChartRange::OneYear, &s), Granularity::Monthly);
        assert_eq!(choose_granularity(800, ChartRange::All, &s), Granularity::Monthly);
    }

    #[test]
    fn build_resolves_granularity_from_data_span() {
        let s = AnalysisSettings::default();
        let short = build(
            &spanning(179),
            ExerciseKind::Weighted,
            ChartRange::All,
            now_after(179),
            &s,
        );
        assert_eq!(short.granularity, Granularity::Daily);
        assert_eq!(short.points.len(), 3);

        let long = build(
            &spanning(181),
            ExerciseKind::Weighted,
            ChartRange::All,
            now_after(181),
            &s,
        );
        assert_eq!(long.granularity, Granularity::Weekly);

        let longer = build(
            &spanning(400),
            ExerciseKind::Weighted,
            ChartRange::All,
            now_after(400),
            &s,
        );
        assert_eq!(longer.granularity, Granularity::Monthly);
    }

    #[test]
    fn range_cutoff_filters_sets() {
        let s = AnalysisSettings::default();
        let sets = spanning(400);
        let series = build(&sets, ExerciseKind::Weighted, ChartRange::OneMonth, now_after(400), &s);
        assert_eq!(series.granularity, Granularity::Daily);
        assert_eq!(series.points.len(), 1);
        assert_eq!(series.points[0].index, 0);
        // the last set is still a PB even though earlier sets are hidden
        assert!(series.points[0].is_pb);
    }

    #[test]
    fn points_aggregate_buckets_and_flag_pbs() {
        let s = AnalysisSettings::default();
        let mut warm = set(9, 0, 200.0, 1);
        warm.is_warm_up = true;
        let sets = vec![
            warm,
            set(1, 0, 100.0, 5),
            set(2, 0, 90.0, 8),
            set(3, 1, 95.0, 6),
            set(4, 2, 100.0, 6),
            set(5, 3, 102.5, 3),
        ];
        let series = build(&sets, ExerciseKind::Weighted, ChartRange::All, now_after(3), &s);
        assert_eq!(series.points.len(), 4);
        let first = &series.points[0];
        assert_eq!(first.bucket_date, start());
        assert!((first.max_weight - 100.0).abs() < 1e-9);
        assert_eq!(first.max_reps, 8);
        assert!((first.total_volume - 1220.0).abs() < 1e-9);
        assert_eq!(first.total_reps, 13);
        let flags: Vec<bool> = series.points.iter().map(|p| p.is_pb).collect();
        assert_eq!(flags, vec![true, false, false, true]);
        let idx: Vec<usize> = series.points.iter().map(|p| p.index).collect();
        assert_eq!(idx, vec![0, 1, 2, 3]);
        for p in &series.points {
            for m in [Metric::Weight, Metric::Reps, Metric::Volume, Metric::TotalReps] {
                assert!((0.0..=1.0).contains(&p.normalized_value(m)));
            }
        }
        assert_eq!(series.trends.len(), 4);
        assert!(series.trend(Metric::Weight).is_some());
    }

    #[test]
    fn bodyweight_trends_only_cover_reps() {
        let s = AnalysisSettings::default();
        let sets = vec![set(1, 0, 0.0, 8), set(2, 1, 0.0, 10), set(3, 2, 0.0, 12)];
        let series = build(&sets, ExerciseKind::BodyweightReps, ChartRange::All, now_after(2), &s);
        let metrics: Vec<Metric> = series.trends.keys().copied().collect();
        assert_eq!(metrics, vec![Metric::Reps, Metric::TotalReps]);
        let t = series.trend(Metric::Reps).unwrap();
        assert!(t.slope > 0.0);
    }

    #[test]
    fn single_point_has_no_trend() {
        let s = AnalysisSettings::default();
        let sets = vec![set(1, 0, 60.0, 5)];
        let series = build(&sets, ExerciseKind::Weighted, ChartRange::All, now_after(0), &s);
        assert_eq!(series.points.len(), 1);
        assert!((series.points[0].normalized.max_weight - 0.5).abs() < 1e-9);
        assert!(series.trends.values().all(|t| t.is_none()));
    }

    #[test]
    fn empty_log_builds_empty_series() {
        let s = AnalysisSettings::default();
        let series = build(&[], ExerciseKind::Weighted, ChartRange::All, now_after(0), &s);
        assert!(series.points.is_empty());
        assert_eq!(series.granularity, Granularity::Daily);
    }

    #[test]
    fn chart_mode_metrics() {
        assert_eq!(
            ChartMode::Strength.metrics(ExerciseKind::Weighted),
            &[Metric::Weight, Metric::Reps]
        );
        assert_eq!(
            ChartMode::Workload.metrics(ExerciseKind::BodyweightReps),
            &[Metric::TotalReps]
        );
    }
}
