//! Dashboard configuration.
//!
//! Every field has a default matching the clinic's display settings, so an
//! empty file (or no file at all) yields a working dashboard. Overrides are
//! read from TOML, with JSON accepted for convenience.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable pointing at a config file.
pub const CONFIG_PATH_ENV: &str = "CLINIC_QUEUE_CONFIG";

/// Longest accepted timer interval: one day.
pub const MAX_INTERVAL_SECS: u64 = 86_400;

const DEFAULT_NAME_POOL: &[&str] = &[
    "Ana Silva",
    "Bruno Costa",
    "Carla Dias",
    "Daniel Farias",
    "Elisa Gomes",
    "Fábio Lima",
    "Gabriel Martins",
    "Helena Nunes",
    "Igor Oliveira",
    "Joana Pereira",
    "Lucas Ribeiro",
    "Mariana Santos",
    "Nelson Teixeira",
    "Olívia Vieira",
    "Paulo Almeida",
];

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("Invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    #[default]
    Default,
    Explicit(PathBuf),
    EnvPath(PathBuf),
    File(PathBuf),
}

/// Top-level dashboard settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub roster: RosterConfig,
    pub simulation: SimulationConfig,
    pub display: DisplayConfig,
    pub report: ReportConfig,
}

/// Roster limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RosterConfig {
    /// Live-record count at which automated admission stops adding patients.
    pub capacity: usize,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self { capacity: 15 }
    }
}

/// Timer and generator settings for the simulated arrivals and departures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Admission ticks run once at startup to fill the board.
    pub initial_patients: usize,
    pub admission_interval_secs: u64,
    pub discharge_interval_secs: u64,
    pub clock_interval_secs: u64,
    /// Fixed seed for reproducible runs; OS entropy when absent.
    pub seed: Option<u64>,
    /// First names and surnames the admission generator draws from.
    pub name_pool: Vec<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_patients: 7,
            admission_interval_secs: 15,
            discharge_interval_secs: 25,
            clock_interval_secs: 1,
            seed: None,
            name_pool: DEFAULT_NAME_POOL.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SimulationConfig {
    pub fn admission_interval(&self) -> Duration {
        Duration::from_secs(self.admission_interval_secs)
    }

    pub fn discharge_interval(&self) -> Duration {
        Duration::from_secs(self.discharge_interval_secs)
    }

    pub fn clock_interval(&self) -> Duration {
        Duration::from_secs(self.clock_interval_secs)
    }
}

/// Presentation settings for rendered rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Shown in place of absent values.
    pub placeholder: String,
    /// `chrono` format string for entry/exit timestamps.
    pub timestamp_format: String,
    /// Offset of the clinic's local time from UTC.
    pub utc_offset_minutes: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            placeholder: "---".to_string(),
            timestamp_format: "%d/%m/%Y %H:%M".to_string(),
            utc_offset_minutes: -180,
        }
    }
}

impl DisplayConfig {
    /// The clinic's local offset. Falls back to UTC for out-of-range values,
    /// which [`DashboardConfig::validate`] rejects anyway.
    pub fn offset(&self) -> FixedOffset {
        offset_from_minutes(self.utc_offset_minutes).unwrap_or_else(|| Utc.fix())
    }
}

/// Report export settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
    /// Artifact names are `<file_prefix>_<YYYY-MM-DD>.<ext>`.
    pub file_prefix: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Relatório de Pacientes - UPA Zona Norte".to_string(),
            file_prefix: "relatorio_pacientes".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Resolve configuration in order:
    /// 1) `explicit` path, if given,
    /// 2) `$CLINIC_QUEUE_CONFIG`,
    /// 3) `clinic-queue.toml` or `config/clinic-queue.toml` in the working directory,
    /// 4) defaults.
    pub fn load(explicit: Option<&Path>) -> ConfigResult<(Self, ConfigSource)> {
        if let Some(path) = explicit {
            let config = Self::load_from_file(path)?;
            return Ok((config, ConfigSource::Explicit(path.to_path_buf())));
        }

        if let Ok(path_str) = env::var(CONFIG_PATH_ENV) {
            if !path_str.trim().is_empty() {
                let path = PathBuf::from(path_str);
                let config = Self::load_from_file(&path)?;
                return Ok((config, ConfigSource::EnvPath(path)));
            }
        }

        if let Some(path) = Self::find_default_file() {
            let config = Self::load_from_file(&path)?;
            return Ok((config, ConfigSource::File(path)));
        }

        Ok((Self::default(), ConfigSource::Default))
    }

    /// Read and validate a config file. `.json` files are parsed as JSON,
    /// everything else as TOML.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let origin = path.display().to_string();

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&contents).map_err(|err| ConfigError::Parse {
                origin,
                message: err.to_string(),
            })?,
            _ => Self::parse_toml(&contents, &origin)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let config = Self::parse_toml(contents, "<inline>")?;
        config.validate()?;
        Ok(config)
    }

    fn parse_toml(contents: &str, origin: &str) -> ConfigResult<Self> {
        toml::from_str(contents).map_err(|err| ConfigError::Parse {
            origin: origin.to_string(),
            message: err.to_string(),
        })
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.roster.capacity == 0 {
            return Err(invalid("roster.capacity", "must be at least 1"));
        }
        if self.simulation.initial_patients > self.roster.capacity {
            return Err(invalid(
                "simulation.initial_patients",
                format!("exceeds roster capacity {}", self.roster.capacity),
            ));
        }
        let intervals = [
            ("simulation.admission_interval_secs", self.simulation.admission_interval_secs),
            ("simulation.discharge_interval_secs", self.simulation.discharge_interval_secs),
            ("simulation.clock_interval_secs", self.simulation.clock_interval_secs),
        ];
        for (field, secs) in intervals {
            if secs == 0 {
                return Err(invalid(field, "must be positive"));
            }
            if secs > MAX_INTERVAL_SECS {
                return Err(invalid(
                    field,
                    format!("{secs} exceeds the {MAX_INTERVAL_SECS} second limit"),
                ));
            }
        }
        if self.simulation.name_pool.iter().all(|n| n.trim().is_empty()) {
            return Err(invalid("simulation.name_pool", "needs at least one name"));
        }
        if StrftimeItems::new(&self.display.timestamp_format).any(|item| item == Item::Error) {
            return Err(invalid(
                "display.timestamp_format",
                format!("{:?} is not a valid strftime pattern", self.display.timestamp_format),
            ));
        }
        if offset_from_minutes(self.display.utc_offset_minutes).is_none() {
            return Err(invalid(
                "display.utc_offset_minutes",
                format!("{} is outside ±24h", self.display.utc_offset_minutes),
            ));
        }
        Ok(())
    }

    fn find_default_file() -> Option<PathBuf> {
        const CANDIDATES: &[&str] = &["clinic-queue.toml", "config/clinic-queue.toml"];

        CANDIDATES
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }
}

fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    minutes.checked_mul(60).and_then(FixedOffset::east_opt)
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
