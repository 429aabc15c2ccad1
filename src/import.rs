// Hevy CSV export ingestion
use crate::model::{ExerciseId, SetId, SetRecord};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::path::Path;

const HEVY_TIME_FORMAT: &str = "%d %b %Y, %H:%M";

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(e) => write!(f, "I/O error: {e}"),
            ImportError::Csv(e) => write!(f, "CSV error: {e}"),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(e) => Some(e),
            ImportError::Csv(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(e: std::io::Error) -> Self {
        ImportError::Io(e)
    }
}

impl From<csv::Error> for ImportError {
    fn from(e: csv::Error) -> Self {
        ImportError::Csv(e)
    }
}

/// The subset of Hevy export columns the analysis needs.
#[derive(Debug, Deserialize)]
struct HevyRow {
    start_time: String,
    exercise_title: String,
    set_type: Option<String>,
    weight_kg: Option<f64>,
    weight_lbs: Option<f64>,
    reps: Option<u32>,
}

impl HevyRow {
    fn into_record(self, id: u64) -> Option<SetRecord> {
        let timestamp = NaiveDateTime::parse_from_str(&self.start_time, HEVY_TIME_FORMAT).ok()?;
        let set_type = self.set_type.as_deref().unwrap_or("normal");
        Some(SetRecord {
            id: SetId(id),
            exercise: ExerciseId(self.exercise_title),
            timestamp,
            weight: self.weight_kg.or(self.weight_lbs).unwrap_or(0.0),
            reps: self.reps.unwrap_or(0),
            is_warm_up: set_type.eq_ignore_ascii_case("warmup"),
            is_drop_set: set_type.eq_ignore_ascii_case("dropset"),
        })
    }
}

/// Parse a Hevy workout export.
///
/// Set ids are the zero-based data row index. Rows that fail to deserialize
/// or carry an unparseable `start_time` are skipped with a warning; read
/// failures of the underlying reader abort the import.
pub fn parse_workout_csv<R: std::io::Read>(reader: R) -> Result<Vec<SetRecord>, ImportError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for (idx, result) in rdr.deserialize::<HevyRow>().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                log::warn!("Skipping row {idx}: {e}");
                continue;
            }
        };
        let start_time = row.start_time.clone();
        match row.into_record(idx as u64) {
            Some(rec) => records.push(rec),
            None => log::warn!("Skipping row {idx}: bad start_time {start_time:?}"),
        }
    }
    Ok(records)
}

/// Read and parse a Hevy export from disk.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<SetRecord>, ImportError> {
    let file = std::fs::File::open(path.as_ref())?;
    let records = parse_workout_csv(file)?;
    log::info!(
        "Loaded {} sets from {}",
        records.len(),
        path.as_ref().display()
    );
    Ok(records)
}
