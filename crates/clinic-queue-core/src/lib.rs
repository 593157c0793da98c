//! Clinic Queue Core Library
//!
//! Patient-queue state machine behind a walk-in clinic's waiting-room display.
//!
//! # Architecture
//!
//! ```text
//!   admission timer        discharge timer         staff edit / delete
//!         │                       │                         │
//!         ▼                       ▼                         ▼
//! AdmissionGenerator      DischargeSelector            EditGateway
//!         │                       │                         │
//!         └───────────────┬───────┴─────────────────────────┘
//!                         ▼
//!                ┌─────────────────┐
//!                │     Roster      │  ids, lifecycle, capacity cap
//!                └────────┬────────┘
//!                         │ snapshot
//!             ┌───────────┴────────────┐
//!             ▼                        ▼
//!      display_order              export_order
//!   (waiting first, newest)     (newest first only)
//!             │                        │
//!             ▼                        ▼
//!        DisplaySink             PatientReport
//! ```
//!
//! # Core Principle
//!
//! **Nothing in the queue fails loudly.** A full roster skips admission, a
//! stale id makes an edit a no-op, a bad age becomes "unset". Errors exist
//! only at the edges: loading configuration and writing reports.
//!
//! # Modules
//!
//! - [`models`]: Domain types (Patient, RiskLevel)
//! - [`roster`]: Patient roster and the manual edit gateway
//! - [`simulation`]: Admission generator, discharge selector, tick scheduler
//! - [`projection`]: Display and export orderings, row formatting
//! - [`export`]: Patient report (CSV/JSON)
//! - [`dashboard`]: Facade tying the roster to its timers and display sink
//! - [`config`]: TOML configuration
//! - [`clock`], [`random`]: Injectable time and randomness

pub mod clock;
pub mod config;
pub mod dashboard;
pub mod export;
pub mod models;
pub mod projection;
pub mod random;
pub mod roster;
pub mod simulation;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, ConfigSource, DashboardConfig};
pub use dashboard::{Dashboard, DisplaySink, NullSink, RecordingSink};
pub use export::{ExportError, PatientReport, ReportFormat};
pub use models::{NewPatient, Patient, PatientId, RiskLevel, RiskParseError};
pub use projection::{display_order, export_order, DisplayRow, RowFormatter};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use roster::{
    ConfirmGate, DeleteOutcome, EditForm, EditGateway, EditOutcome, Roster, RosterError,
};
pub use simulation::{AdmissionGenerator, DischargeSelector, Scheduler, Tick};

/// Crate-level error.
#[derive(Debug, thiserror::Error)]
pub enum ClinicQueueError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClinicQueueError>;

/// Build a dashboard from configuration with the system clock, seeding the
/// random source from `config.simulation.seed` when set.
pub fn dashboard_from_config(config: DashboardConfig, sink: Box<dyn DisplaySink>) -> Dashboard {
    let random: Box<dyn RandomSource> = match config.simulation.seed {
        Some(seed) => Box::new(SeededRandom::from_seed(seed)),
        None => Box::new(SeededRandom::from_os()),
    };
    Dashboard::new(config, Box::new(SystemClock), random, sink)
}
