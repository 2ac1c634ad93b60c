//! Configuration management for Nightcharge
//!
//! This module handles loading, validation and saving of the application
//! configuration from YAML files, and converts it into the typed
//! [`ChargerSettings`] consumed by the charger core.

use crate::charger::{ChargeWindow, ChargerSettings, MINUTES_PER_DAY};
use crate::clock::parse_hhmm;
use crate::error::{NightchargeError, Result};
use crate::estimator::ChargeLevelSettings;
use crate::timeline::TimelineSettings;
use chrono::Duration;
#[cfg(feature = "openapi")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod defaults;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(JsonSchema))]
#[serde(default)]
pub struct Config {
    /// Automatic charging window
    pub schedule: ScheduleConfig,

    /// Boost (manual override) sessions
    pub boost: BoostConfig,

    /// Projected timeline axis
    pub timeline: TimelineConfig,

    /// Simulated state of charge
    pub charge_level: ChargeLevelConfig,

    /// Simulation session registry
    pub sessions: SessionsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Web server binding configuration
    pub web: WebConfig,
}

/// Daily automatic charging window
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(JsonSchema))]
#[serde(default)]
pub struct ScheduleConfig {
    /// Window start in HH:MM format (inclusive)
    pub start_time: String,

    /// Window end in HH:MM format (exclusive)
    pub end_time: String,
}

/// Boost session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(JsonSchema))]
#[serde(default)]
pub struct BoostConfig {
    /// Length of a boost session in minutes
    pub duration_minutes: u32,
}

/// Timeline projection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(JsonSchema))]
#[serde(default)]
pub struct TimelineConfig {
    /// First slot of the axis in HH:MM format
    pub anchor_time: String,

    /// Slot granularity in minutes
    pub slot_minutes: u32,

    /// Axis length in hours
    pub horizon_hours: u32,
}

/// State-of-charge estimation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(JsonSchema))]
#[serde(default)]
pub struct ChargeLevelConfig {
    /// Level reported at the first slot
    pub baseline_percent: u8,

    /// Increase after each charging slot
    pub step_percent: u8,

    /// Upper clamp
    pub max_percent: u8,
}

/// Session registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(JsonSchema))]
#[serde(default)]
pub struct SessionsConfig {
    /// Maximum simultaneously tracked simulation sessions
    pub max_sessions: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(JsonSchema))]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Optional console level override
    pub console_level: Option<String>,

    /// Optional file level override
    pub file_level: Option<String>,

    /// Optional level for the web log stream
    pub web_level: Option<String>,

    /// Path to log file (or directory)
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(JsonSchema))]
#[serde(default)]
pub struct WebConfig {
    /// Bind address
    pub host: String,

    /// TCP port
    pub port: u16,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var("NIGHTCHARGE_CONFIG") {
            return Self::from_file(path);
        }

        let default_paths = [
            "nightcharge_config.yaml",
            "/etc/nightcharge/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        Ok(Config::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.charger_settings()?;

        if self.charge_level.step_percent == 0 {
            return Err(NightchargeError::validation(
                "charge_level.step_percent",
                "Must be greater than 0",
            ));
        }

        if self.sessions.max_sessions == 0 {
            return Err(NightchargeError::validation(
                "sessions.max_sessions",
                "Must be greater than 0",
            ));
        }

        if self.web.port == 0 {
            return Err(NightchargeError::validation(
                "web.port",
                "Port must be greater than 0",
            ));
        }

        crate::logging::parse_log_level(&self.logging.level)?;

        Ok(())
    }

    /// Convert into the typed settings used by the charger core
    pub fn charger_settings(&self) -> Result<ChargerSettings> {
        let start = parse_hhmm(&self.schedule.start_time)
            .map_err(|_| invalid_time("schedule.start_time", &self.schedule.start_time))?;
        let end = parse_hhmm(&self.schedule.end_time)
            .map_err(|_| invalid_time("schedule.end_time", &self.schedule.end_time))?;
        let window = ChargeWindow::new(start, end)?;

        let boost_minutes = i64::from(self.boost.duration_minutes);
        if boost_minutes == 0 || boost_minutes >= MINUTES_PER_DAY {
            return Err(NightchargeError::validation(
                "boost.duration_minutes",
                "Must be between 1 and 1439",
            ));
        }

        let anchor = parse_hhmm(&self.timeline.anchor_time)
            .map_err(|_| invalid_time("timeline.anchor_time", &self.timeline.anchor_time))?;
        if self.timeline.horizon_hours == 0 || self.timeline.horizon_hours > 24 {
            return Err(NightchargeError::validation(
                "timeline.horizon_hours",
                "Must be between 1 and 24",
            ));
        }
        let horizon_minutes = i64::from(self.timeline.horizon_hours) * 60;
        let slot_minutes = i64::from(self.timeline.slot_minutes);
        if slot_minutes == 0 || horizon_minutes % slot_minutes != 0 {
            return Err(NightchargeError::validation(
                "timeline.slot_minutes",
                "Must be positive and divide the horizon evenly",
            ));
        }

        let level = &self.charge_level;
        if level.max_percent > 100 || level.baseline_percent > level.max_percent {
            return Err(NightchargeError::validation(
                "charge_level",
                "Require baseline_percent <= max_percent <= 100",
            ));
        }

        Ok(ChargerSettings {
            window,
            boost_duration: Duration::minutes(boost_minutes),
            timeline: TimelineSettings {
                anchor,
                slot: Duration::minutes(slot_minutes),
                horizon: Duration::minutes(horizon_minutes),
            },
            charge_level: ChargeLevelSettings {
                baseline_percent: level.baseline_percent,
                step_percent: level.step_percent,
                max_percent: level.max_percent,
            },
        })
    }
}

fn invalid_time(field: &str, value: &str) -> NightchargeError {
    NightchargeError::validation(field, format!("'{}' is not a HH:MM time", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.schedule.start_time, "02:00");
        assert_eq!(config.boost.duration_minutes, 60);
        assert_eq!(config.web.port, 8088);
    }

    #[test]
    fn test_default_settings_match_core_defaults() {
        let settings = Config::default().charger_settings().unwrap();
        assert_eq!(settings, ChargerSettings::default());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.schedule.end_time = "01:00".to_string();
        assert!(config.validate().is_err());

        config = Config::default();
        config.timeline.slot_minutes = 7;
        assert!(config.validate().is_err());

        config = Config::default();
        config.logging.level = "LOUD".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("boost:\n  duration_minutes: 90\n").unwrap();
        assert_eq!(config.boost.duration_minutes, 90);
        assert_eq!(config.timeline.slot_minutes, 30);
    }
}
