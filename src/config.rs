use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::ViewMode;

/// Application-level constants
pub const APP_NAME: &str = "CounselDesk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// File name of the calendar settings inside the data directory.
pub const SETTINGS_FILE: &str = "calendar.json";

/// File name of the appointment database inside the data directory.
pub const DATABASE_FILE: &str = "appointments.db";

/// Get the application data directory
/// ~/CounselDesk/ on all platforms. Falls back to the working directory
/// when no home directory can be determined.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Path of the SQLite appointment store.
pub fn database_path() -> PathBuf {
    app_data_dir().join(DATABASE_FILE)
}

/// Default `tracing` filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,counseldesk_lib=debug"
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// User-tunable calendar behaviour. Every field has a default so partial
/// JSON files are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalendarSettings {
    /// View shown when the calendar opens.
    pub default_view: ViewMode,
    /// Number of days covered by the agenda view.
    pub agenda_length_days: u32,
    /// Grid step in minutes: slot granularity and the length of a new appointment.
    pub step_minutes: u32,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            default_view: ViewMode::Month,
            agenda_length_days: 30,
            step_minutes: 30,
        }
    }
}

impl CalendarSettings {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let mut settings: Self = serde_json::from_str(raw)?;
        if settings.agenda_length_days == 0 {
            settings.agenda_length_days = Self::default().agenda_length_days;
        }
        if settings.step_minutes == 0 {
            settings.step_minutes = Self::default().step_minutes;
        }
        Ok(settings)
    }
}

/// Load settings from `dir/calendar.json`, or defaults when the file is absent.
pub fn load_settings(dir: &Path) -> Result<CalendarSettings, ConfigError> {
    let path = dir.join(SETTINGS_FILE);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No settings file, using defaults");
        return Ok(CalendarSettings::default());
    }
    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    CalendarSettings::from_json(&raw)
}
