use chrono::{Local, NaiveDateTime};
use hevy_progress::analysis::unique_exercises;
use hevy_progress::{
    AnalysisSettings, ExerciseId, SetRecord, analyze_exercise, import, summarize_log,
};
use log::info;
use serde_json::{Value, json};

const USAGE: &str = "usage: hevy_progress <workouts.csv> [exercise]";

/// JSON document printed for `records`. The `comparison` entry follows the
/// configured comparison mode; `report` still carries both.
fn render(
    records: &[SetRecord],
    exercise: Option<&ExerciseId>,
    now: NaiveDateTime,
    settings: &AnalysisSettings,
) -> Value {
    let summary = summarize_log(records, None, None);
    let report = exercise.map(|ex| {
        info!("Building report for {ex} ({:?})", settings.chart_range);
        analyze_exercise(records, ex, now, settings.chart_range, settings)
    });
    let comparison = report
        .as_ref()
        .map(|r| r.comparison(settings.comparison_mode).clone());

    json!({
        "summary": summary,
        "exercises": unique_exercises(records),
        "comparison_mode": settings.comparison_mode,
        "comparison": comparison,
        "report": report,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };
    let exercise = args.next().map(ExerciseId::new);

    let settings = AnalysisSettings::load();
    let records = import::load_csv(&path)?;
    let now = Local::now().naive_local();

    let output = render(&records, exercise.as_ref(), now, &settings);
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
