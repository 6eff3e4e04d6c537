use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::calendar::{default_filter_options, FilterOption, YearMonth};
use crate::exam::{DateMode, DayOrder, NormalizeOptions};
use crate::ingest::IngestOptions;

/// Sheet that holds the timetable in exported workbooks
pub const DEFAULT_SHEET_NAME: &str = "All papers";

const CONFIG_DIR: &str = "exam-calendar";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// User settings; every field falls back to its default when absent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub sheet_name: String,
    pub accepted_extensions: Vec<String>,
    pub date_mode: DateMode,
    pub day_order: DayOrder,
    pub initial_month: YearMonth,
    pub filter_options: Vec<FilterOption>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        CalendarConfig {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            accepted_extensions: vec!["xlsx".to_string(), "xls".to_string()],
            date_mode: DateMode::default(),
            day_order: DayOrder::default(),
            initial_month: YearMonth::default(),
            filter_options: default_filter_options(),
        }
    }
}

impl CalendarConfig {
    /// `<config dir>/exam-calendar/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from the default location, falling back to defaults on any error
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "loaded config");
                config
            }
            Err(e) => {
                tracing::warn!(error = %e, "using default config");
                Self::default()
            }
        }
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            date_mode: self.date_mode,
            day_order: self.day_order,
        }
    }

    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            sheet_name: self.sheet_name.clone(),
            accepted_extensions: self.accepted_extensions.clone(),
            normalize: self.normalize_options(),
        }
    }
}
