//! Synthetic departures.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::models::PatientId;
use crate::random::RandomSource;
use crate::roster::Roster;

/// Reason recorded for a regular discharge.
pub const REASON_DISCHARGE: &str = "Alta";
/// Reason recorded for a transfer to another unit.
pub const REASON_TRANSFER: &str = "Transferência";

pub const DISCHARGE_REASONS: [&str; 2] = [REASON_DISCHARGE, REASON_TRANSFER];

/// Picks a waiting patient and marks them as departed.
#[derive(Debug, Clone, Copy, Default)]
pub struct DischargeSelector;

impl DischargeSelector {
    pub fn new() -> Self {
        Self
    }

    /// One discharge tick. No-op when nobody is waiting.
    ///
    /// Draw order: patient, reason.
    pub fn tick(
        &self,
        roster: &mut Roster,
        random: &mut dyn RandomSource,
        now: DateTime<Utc>,
    ) -> Option<PatientId> {
        let candidates = roster.active_ids();
        if candidates.is_empty() {
            debug!("discharge skipped: no active patients");
            return None;
        }

        let id = candidates[random.pick_index(candidates.len())];
        let reason = DISCHARGE_REASONS[random.pick_index(DISCHARGE_REASONS.len())];
        let patient = roster.find_by_id_mut(id)?;
        patient.discharge(now, reason);
        info!(%id, name = %patient.name, reason, "patient discharged");
        Some(id)
    }
}
