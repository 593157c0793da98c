//! The patient roster: sole owner of patient records and their identity.

mod edit;

pub use edit::*;

use thiserror::Error;

use crate::models::{NewPatient, Patient, PatientId};

/// Roster errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("Roster is at capacity ({0} patients)")]
    AtCapacity(usize),

    #[error("Patient id already in use: {0}")]
    DuplicateId(PatientId),

    #[error("Patient id out of range: {0}")]
    IdOutOfRange(PatientId),
}

pub type RosterResult<T> = Result<T, RosterError>;

/// In-memory collection of patients, bounded by a live-record cap.
///
/// Iteration order is insertion-dependent and carries no meaning; use the
/// projection functions to get a display or export ordering.
#[derive(Debug, Clone)]
pub struct Roster {
    patients: Vec<Patient>,
    capacity: usize,
    next_id: u64,
}

impl Roster {
    /// Create an empty roster. Ids start at 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            patients: Vec::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.patients.len() >= self.capacity
    }

    /// Id the next admission will receive.
    pub fn peek_next_id(&self) -> PatientId {
        PatientId(self.next_id)
    }

    /// Admit a new patient, assigning the next id. The id is only consumed
    /// when the patient is actually inserted.
    pub fn admit(&mut self, new_patient: NewPatient) -> RosterResult<PatientId> {
        if self.is_full() {
            return Err(RosterError::AtCapacity(self.capacity));
        }
        let id = PatientId(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or(RosterError::IdOutOfRange(id))?;
        self.patients.insert(0, new_patient.into_patient(id));
        Ok(id)
    }

    /// Insert a record that already carries an id (seeding, import).
    ///
    /// Later admissions never reuse the inserted id.
    pub fn add(&mut self, patient: Patient) -> RosterResult<()> {
        if self.is_full() {
            return Err(RosterError::AtCapacity(self.capacity));
        }
        if self.find_by_id(patient.id).is_some() {
            return Err(RosterError::DuplicateId(patient.id));
        }
        let after = patient
            .id
            .0
            .checked_add(1)
            .ok_or(RosterError::IdOutOfRange(patient.id))?;
        self.next_id = self.next_id.max(after);
        self.patients.insert(0, patient);
        Ok(())
    }

    pub fn find_by_id(&self, id: PatientId) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == id)
    }

    pub fn find_by_id_mut(&mut self, id: PatientId) -> Option<&mut Patient> {
        self.patients.iter_mut().find(|p| p.id == id)
    }

    /// Remove a patient. Returns the removed record; absent ids are a no-op.
    pub fn remove(&mut self, id: PatientId) -> Option<Patient> {
        let index = self.patients.iter().position(|p| p.id == id)?;
        Some(self.patients.remove(index))
    }

    /// All current records, in no particular order.
    pub fn list_all(&self) -> &[Patient] {
        &self.patients
    }

    /// Records still waiting (no exit time).
    pub fn active_records(&self) -> Vec<&Patient> {
        self.patients.iter().filter(|p| p.is_active()).collect()
    }

    /// Ids of active records, in iteration order.
    pub fn active_ids(&self) -> Vec<PatientId> {
        self.patients
            .iter()
            .filter(|p| p.is_active())
            .map(|p| p.id)
            .collect()
    }
}
