//! Configuration loading and typed config structures for the Almanac engine.
//!
//! The canonical configuration lives in `almanac-config.yaml` at the project
//! root. It stands in for the controller's parameter store: location,
//! timezone, summer-time policy, and the holiday selection mask are read
//! once at startup and never change afterwards.

use std::path::Path;

use almanac_types::{Location, SummertimeSource};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but lies outside its allowed range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
///
/// Mirrors the structure of `almanac-config.yaml`. All fields have defaults,
/// so an empty document is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AlmanacConfig {
    /// Observer location and timezone.
    #[serde(default)]
    pub location: LocationConfig,

    /// Summer-time policy.
    #[serde(default)]
    pub summertime: SummertimeConfig,

    /// Holiday table selection.
    #[serde(default)]
    pub holidays: HolidayConfig,

    /// Clock validity and tick cadence.
    #[serde(default)]
    pub clock: ClockConfig,

    /// Host binary settings.
    #[serde(default)]
    pub host: HostConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AlmanacConfig {
    /// Load and validate configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document carries no mapping to deserialize.
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every value against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let loc = &self.location;
        if !(-180.0..=180.0).contains(&loc.longitude) {
            return Err(invalid(format!(
                "location.longitude {} outside [-180, 180]",
                loc.longitude
            )));
        }
        if !(-90.0..=90.0).contains(&loc.latitude) {
            return Err(invalid(format!(
                "location.latitude {} outside [-90, 90]",
                loc.latitude
            )));
        }
        if !(-12..=14).contains(&loc.timezone) {
            return Err(invalid(format!(
                "location.timezone {} outside [-12, 14]",
                loc.timezone
            )));
        }
        if self.clock.tick_interval_ms == 0 {
            return Err(invalid("clock.tick_interval_ms must be at least 1".to_owned()));
        }
        if self.host.poll_interval_ms == 0 {
            return Err(invalid("host.poll_interval_ms must be at least 1".to_owned()));
        }
        Ok(())
    }
}

fn invalid(reason: String) -> ConfigError {
    ConfigError::Invalid { reason }
}

/// Observer location configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LocationConfig {
    /// Longitude in degrees, east positive.
    #[serde(default = "default_longitude")]
    pub longitude: f64,

    /// Latitude in degrees, north positive.
    #[serde(default = "default_latitude")]
    pub latitude: f64,

    /// Standard-time offset from UTC in whole hours.
    #[serde(default = "default_timezone")]
    pub timezone: i8,
}

impl LocationConfig {
    /// Convert to the shared [`Location`] value.
    pub const fn to_location(&self) -> Location {
        Location {
            longitude: self.longitude,
            latitude: self.latitude,
            timezone: self.timezone,
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            longitude: default_longitude(),
            latitude: default_latitude(),
            timezone: default_timezone(),
        }
    }
}

/// Summer-time policy configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct SummertimeConfig {
    /// Where the summer-time flag comes from.
    #[serde(default)]
    pub source: SummertimeSource,
}

/// Holiday table configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HolidayConfig {
    /// Enabled entries of the holiday table; bit 31 selects entry 0.
    #[serde(default = "default_enabled_mask")]
    pub enabled_mask: u32,
}

impl Default for HolidayConfig {
    fn default() -> Self {
        Self {
            enabled_mask: default_enabled_mask(),
        }
    }
}

/// Clock configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ClockConfig {
    /// External dates before this year do not confirm the date.
    #[serde(default = "default_min_valid_year")]
    pub min_valid_year: i32,

    /// Monotonic milliseconds per simulated second.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            min_valid_year: default_min_valid_year(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// Host binary configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HostConfig {
    /// Feed the host wall clock into the engine as an external date-time
    /// update at startup.
    #[serde(default = "default_true")]
    pub seed_from_system_clock: bool,

    /// How often the host polls the engine, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            seed_from_system_clock: true,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_longitude() -> f64 {
    10.0
}

const fn default_latitude() -> f64 {
    50.0
}

const fn default_timezone() -> i8 {
    1
}

const fn default_enabled_mask() -> u32 {
    u32::MAX
}

const fn default_min_valid_year() -> i32 {
    2022
}

const fn default_tick_interval_ms() -> u64 {
    1000
}

const fn default_poll_interval_ms() -> u64 {
    50
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}
