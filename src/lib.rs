//! Progress analytics for strength-training logs.
//!
//! The log is a list of [`SetRecord`]s. Everything here is a pure function of
//! that log plus a reference time: daily sessions, personal bests, comparison
//! against an earlier session and chart series with trend lines.

pub mod analysis;
pub mod chart;
pub mod comparison;
pub mod grouping;
pub mod import;
pub mod metrics;
pub mod model;
pub mod records;
pub mod settings;

pub use analysis::{ExerciseReport, LogSummary, analyze_exercise, summarize_log};
pub use chart::{ChartMode, ChartPoint, ChartRange, ChartSeries, Metric, TrendLine};
pub use comparison::{ComparisonMode, ComparisonResult, Direction, MetricDelta, TodayComparison};
pub use model::{ExerciseId, ExerciseKind, Granularity, SessionAggregate, SetId, SetRecord};
pub use records::{ExerciseRecord, OneRmFormula};
pub use settings::AnalysisSettings;
