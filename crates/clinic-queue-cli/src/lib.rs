//! Terminal front-end for the clinic queue dashboard.
//!
//! - [`live`]: real-time display driven by the system clock
//! - [`session`]: interactive console over a manual clock
//! - [`render`]: table and clock banner drawing
//! - [`commands`], [`theme`]: console commands and the persisted theme

pub mod commands;
pub mod live;
pub mod render;
pub mod session;
pub mod theme;

use std::path::Path;

use anyhow::Context;
use clinic_queue_core::{Dashboard, DashboardConfig};
use tracing::info;

/// Load configuration, letting a command-line seed override the file.
pub fn load_config(path: Option<&Path>, seed: Option<u64>) -> anyhow::Result<DashboardConfig> {
    let (mut config, source) = DashboardConfig::load(path)?;
    info!(?source, "configuration loaded");
    if seed.is_some() {
        config.simulation.seed = seed;
    }
    Ok(config)
}

/// Fill a fresh dashboard: import records from a JSON file when given,
/// otherwise run the startup admissions.
pub fn populate(dashboard: &mut Dashboard, import: Option<&Path>) -> anyhow::Result<()> {
    match import {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let count = dashboard
                .import_json(&json)
                .with_context(|| format!("failed to import {}", path.display()))?;
            info!(count, path = %path.display(), "imported patients");
        }
        None => {
            dashboard.seed();
        }
    }
    Ok(())
}
