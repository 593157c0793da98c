//! Synthetic patient arrivals.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::models::{NewPatient, PatientId, RiskLevel};
use crate::random::RandomSource;
use crate::roster::Roster;

pub const MIN_AGE: u32 = 1;
pub const MAX_AGE: u32 = 80;

/// Fabricates arrivals from a pool of names.
#[derive(Debug, Clone)]
pub struct AdmissionGenerator {
    name_pool: Vec<String>,
}

impl AdmissionGenerator {
    pub fn new(name_pool: Vec<String>) -> Self {
        let name_pool = name_pool
            .into_iter()
            .filter(|n| !n.trim().is_empty())
            .collect();
        Self { name_pool }
    }

    pub fn name_pool(&self) -> &[String] {
        &self.name_pool
    }

    /// Synthesize one arrival without touching a roster.
    ///
    /// Draw order: name, risk tier, surname initial, age.
    pub fn generate(&self, random: &mut dyn RandomSource, now: DateTime<Utc>) -> NewPatient {
        let base = if self.name_pool.is_empty() {
            "Paciente"
        } else {
            self.name_pool[random.pick_index(self.name_pool.len())].as_str()
        };
        let risk = RiskLevel::ALL[random.pick_index(RiskLevel::ALL.len())];
        let initial = char::from(b'A' + random.pick_index(26) as u8);
        let age = random.range_inclusive(MIN_AGE, MAX_AGE);

        NewPatient {
            name: format!("{} {}.", base, initial),
            age: Some(age),
            risk,
            entry_time: Some(now),
        }
    }

    /// One admission tick. Full rosters are skipped silently.
    pub fn tick(
        &self,
        roster: &mut Roster,
        random: &mut dyn RandomSource,
        now: DateTime<Utc>,
    ) -> Option<PatientId> {
        if roster.is_full() {
            debug!(capacity = roster.capacity(), "admission skipped: roster full");
            return None;
        }

        let new_patient = self.generate(random, now);
        let name = new_patient.name.clone();
        let risk = new_patient.risk;
        match roster.admit(new_patient) {
            Ok(id) => {
                info!(%id, %name, %risk, "patient admitted");
                Some(id)
            }
            Err(err) => {
                debug!(error = %err, "admission skipped");
                None
            }
        }
    }
}
