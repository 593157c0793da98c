//! Patient models.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::risk::RiskLevel;

/// Roster-assigned patient identifier. Never reused within a process.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct PatientId(pub u64);

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A patient in the waiting-room queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Roster-assigned identifier
    pub id: PatientId,
    /// Display name
    pub name: String,
    /// Age in years; `None` when unknown
    pub age: Option<u32>,
    /// Arrival time; `None` only for imported records without a known arrival
    pub entry_time: Option<DateTime<Utc>>,
    /// Departure time; `None` while the patient is still waiting
    pub exit_time: Option<DateTime<Utc>>,
    /// Triage classification
    pub risk: RiskLevel,
    /// Why the patient left (e.g. "Alta", "Transferência")
    pub exit_reason: Option<String>,
    /// Staff member responsible, set by manual edit
    pub staff_name: Option<String>,
    /// Sector of the responsible staff member, set by manual edit
    pub staff_sector: Option<String>,
}

impl Patient {
    /// Create an active patient with only the required fields.
    pub fn new(id: PatientId, name: impl Into<String>, risk: RiskLevel) -> Self {
        Self {
            id,
            name: name.into(),
            age: None,
            entry_time: None,
            exit_time: None,
            risk,
            exit_reason: None,
            staff_name: None,
            staff_sector: None,
        }
    }

    /// A patient is active until an exit time is recorded.
    pub fn is_active(&self) -> bool {
        self.exit_time.is_none()
    }

    /// Record a departure.
    pub fn discharge(&mut self, at: DateTime<Utc>, reason: impl Into<String>) {
        self.exit_time = Some(at);
        self.exit_reason = Some(reason.into());
    }
}

/// Fields for a patient about to be admitted; the roster assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub name: String,
    pub age: Option<u32>,
    pub risk: RiskLevel,
    pub entry_time: Option<DateTime<Utc>>,
}

impl NewPatient {
    /// Build the stored record under the given id. Exit and staff fields start empty.
    pub fn into_patient(self, id: PatientId) -> Patient {
        Patient {
            age: self.age,
            entry_time: self.entry_time,
            ..Patient::new(id, self.name, self.risk)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_patient_is_active() {
        let patient = Patient::new(PatientId(1), "Ana Silva K.", RiskLevel::Green);
        assert!(patient.is_active());
        assert!(patient.exit_reason.is_none());
        assert!(patient.staff_name.is_none());
    }

    #[test]
    fn test_discharge_sets_exit_fields() {
        let mut patient = Patient::new(PatientId(1), "Ana Silva K.", RiskLevel::Green);
        let now = Utc::now();
        patient.discharge(now, "Alta");
        assert!(!patient.is_active());
        assert_eq!(patient.exit_time, Some(now));
        assert_eq!(patient.exit_reason.as_deref(), Some("Alta"));
    }

    #[test]
    fn test_new_patient_into_patient() {
        let now = Utc::now();
        let draft = NewPatient {
            name: "Bruno Costa T.".into(),
            age: Some(42),
            risk: RiskLevel::Red,
            entry_time: Some(now),
        };
        let patient = draft.into_patient(PatientId(9));
        assert_eq!(patient.id, PatientId(9));
        assert_eq!(patient.age, Some(42));
        assert_eq!(patient.entry_time, Some(now));
        assert!(patient.is_active());
    }

    #[test]
    fn test_id_serializes_as_number() {
        let patient = Patient::new(PatientId(3), "Carla Dias A.", RiskLevel::Blue);
        let json = serde_json::to_value(&patient).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["risk"], "Azul");
    }
}
