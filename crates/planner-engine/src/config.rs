//! TOML configuration for the planner.
//!
//! Every field has a default, so an empty file (or no file) gives the
//! standard policy: a 09:00–18:00 working window, 60 minute suggestions and
//! reminders ten minutes ahead.
//!
//! ```toml
//! default_duration_minutes = 30
//!
//! [window]
//! start = "08:30"
//! end = "17:00"
//!
//! [reminder]
//! lead_minutes = 15
//! permission_timeout_secs = 20
//! ```

use std::path::Path;
use std::time::Duration;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::event::{hhmm, to_minutes};
use crate::freebusy::{WorkingWindow, DEFAULT_DURATION_MINUTES};
use crate::reminder::{ReminderSettings, DEFAULT_LEAD_MINUTES, MAX_LEAD_MINUTES};

/// Longest accepted wait for a permission answer: one day.
pub const MAX_PERMISSION_TIMEOUT_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(with = "hhmm", default = "default_window_start")]
    pub start: NaiveTime,
    #[serde(with = "hhmm", default = "default_window_end")]
    pub end: NaiveTime,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            start: default_window_start(),
            end: default_window_end(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderConfig {
    #[serde(default = "default_lead_minutes")]
    pub lead_minutes: i64,
    #[serde(default = "default_permission_timeout_secs")]
    pub permission_timeout_secs: u64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            lead_minutes: default_lead_minutes(),
            permission_timeout_secs: default_permission_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default = "default_duration_minutes")]
    pub default_duration_minutes: i64,
    #[serde(default)]
    pub reminder: ReminderConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            default_duration_minutes: default_duration_minutes(),
            reminder: ReminderConfig::default(),
        }
    }
}

fn default_window_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}
fn default_window_end() -> NaiveTime {
    NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN)
}
fn default_duration_minutes() -> i64 {
    DEFAULT_DURATION_MINUTES
}
fn default_lead_minutes() -> i64 {
    DEFAULT_LEAD_MINUTES
}
fn default_permission_timeout_secs() -> u64 {
    30
}

impl PlannerConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| PlannerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_toml_str(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(PlannerError::Config(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.window.start >= self.window.end {
            return Err(PlannerError::Config(
                "window.start must be before window.end".to_string(),
            ));
        }
        if self.default_duration_minutes <= 0 {
            return Err(PlannerError::Config(
                "default_duration_minutes must be positive".to_string(),
            ));
        }
        if !(1..=MAX_LEAD_MINUTES).contains(&self.reminder.lead_minutes) {
            return Err(PlannerError::Config(format!(
                "reminder.lead_minutes must be between 1 and {MAX_LEAD_MINUTES}"
            )));
        }
        if self.reminder.permission_timeout_secs > MAX_PERMISSION_TIMEOUT_SECS {
            return Err(PlannerError::Config(format!(
                "reminder.permission_timeout_secs must be at most {MAX_PERMISSION_TIMEOUT_SECS}"
            )));
        }
        Ok(())
    }

    pub fn working_window(&self) -> WorkingWindow {
        WorkingWindow {
            start: to_minutes(self.window.start),
            end: to_minutes(self.window.end),
        }
    }

    pub fn reminder_settings(&self) -> ReminderSettings {
        ReminderSettings {
            lead_minutes: self.reminder.lead_minutes,
            permission_timeout: Duration::from_secs(self.reminder.permission_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_standard_policy() {
        let config = PlannerConfig::from_toml_str("").unwrap();
        assert_eq!(config, PlannerConfig::default());
        assert_eq!(config.working_window(), WorkingWindow::STANDARD);
        assert_eq!(config.reminder_settings().lead_minutes, 10);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = PlannerConfig::from_toml_str("[window]\nstart = \"08:30\"\n").unwrap();
        assert_eq!(config.working_window(), WorkingWindow { start: 510, end: 1080 });
        assert_eq!(config.default_duration_minutes, 60);
    }

    #[test]
    fn inverted_window_is_rejected() {
        let err = PlannerConfig::from_toml_str("[window]\nstart = \"18:00\"\nend = \"09:00\"\n")
            .unwrap_err();
        assert!(matches!(err, PlannerError::Config(_)));
    }

    #[test]
    fn reminder_bounds_are_enforced() {
        for raw in [
            "[reminder]\nlead_minutes = 0\n",
            "[reminder]\nlead_minutes = 9223372036854775807\n",
            "[reminder]\nlead_minutes = 10081\n",
            "[reminder]\npermission_timeout_secs = 86401\n",
        ] {
            assert!(
                matches!(PlannerConfig::from_toml_str(raw), Err(PlannerError::Config(_))),
                "accepted {raw:?}"
            );
        }
        let week = PlannerConfig::from_toml_str("[reminder]\nlead_minutes = 10080\n").unwrap();
        assert_eq!(week.reminder.lead_minutes, MAX_LEAD_MINUTES);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PlannerConfig::load(&dir.path().join("planner.toml")).unwrap();
        assert_eq!(config, PlannerConfig::default());
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planner.toml");
        std::fs::write(&path, "default_duration_minutes = 25\n[reminder]\nlead_minutes = 5\n").unwrap();
        let config = PlannerConfig::load(&path).unwrap();
        assert_eq!(config.default_duration_minutes, 25);
        assert_eq!(config.reminder.lead_minutes, 5);
    }
}
