use crate::chart::ChartRange;
use crate::comparison::ComparisonMode;
use crate::records::OneRmFormula;
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use dirs_next as dirs;

fn default_week_start() -> Weekday {
    Weekday::Mon
}

fn default_weekly_span_days() -> i64 {
    180
}

fn default_monthly_span_days() -> i64 {
    365
}

fn default_padding_fraction() -> f64 {
    0.1
}

fn default_min_padding() -> f64 {
    1.0
}

/// Persistent configuration for the analysis passes.
///
/// Every field carries a serde default, so a configuration written by an
/// older version (or an empty `{}`) still loads with sensible values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisSettings {
    /// First day of a weekly bucket.
    #[serde(default = "default_week_start")]
    pub week_start: Weekday,
    /// Data spans at or above this many days stop being charted daily.
    #[serde(default = "default_weekly_span_days")]
    pub weekly_span_days: i64,
    /// Data spans at or above this many days allow monthly buckets.
    #[serde(default = "default_monthly_span_days")]
    pub monthly_span_days: i64,
    #[serde(default = "default_padding_fraction")]
    pub padding_fraction: f64,
    #[serde(default = "default_min_padding")]
    pub min_padding: f64,
    #[serde(default)]
    pub chart_range: ChartRange,
    #[serde(default)]
    pub comparison_mode: ComparisonMode,
    #[serde(default)]
    pub one_rm_formula: OneRmFormula,
}

impl AnalysisSettings {
    const FILE: &'static str = "hevy_progress_settings.json";

    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(Self::FILE))
    }

    /// Load settings from the config directory, falling back to defaults.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("Ignoring unreadable settings {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        serde_json::from_str(&data)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Persist the settings to the config directory.
    pub fn save(&self) -> std::io::Result<()> {
        match Self::path() {
            Some(path) => self.save_to(path),
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no config directory available",
            )),
        }
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, data)
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            week_start: default_week_start(),
            weekly_span_days: default_weekly_span_days(),
            monthly_span_days: default_monthly_span_days(),
            padding_fraction: default_padding_fraction(),
            min_padding: default_min_padding(),
            chart_range: ChartRange::default(),
            comparison_mode: ComparisonMode::default(),
            one_rm_formula: OneRmFormula::default(),
        }
    }
}
