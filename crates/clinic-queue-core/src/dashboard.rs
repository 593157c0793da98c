//! The dashboard: one roster, its collaborators, and the refresh loop.
//!
//! Every mutation (admission, discharge, edit, delete) runs to completion and
//! then recomputes the display projection and hands the full row list to the
//! display sink before control returns.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::config::DashboardConfig;
use crate::export::PatientReport;
use crate::models::{Patient, PatientId};
use crate::projection::{display_rows, DisplayRow, RowFormatter};
use crate::random::RandomSource;
use crate::roster::{ConfirmGate, DeleteOutcome, EditForm, EditGateway, EditOutcome, Roster};
use crate::simulation::{AdmissionGenerator, DischargeSelector, Tick};

/// Consumer of rendered rows. Receives the whole table on every refresh.
pub trait DisplaySink {
    fn render(&mut self, rows: &[DisplayRow]);
}

/// Keeps every rendered frame in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub frames: Vec<Vec<DisplayRow>>,
}

impl RecordingSink {
    pub fn last(&self) -> Option<&[DisplayRow]> {
        self.frames.last().map(Vec::as_slice)
    }
}

impl DisplaySink for RecordingSink {
    fn render(&mut self, rows: &[DisplayRow]) {
        self.frames.push(rows.to_vec());
    }
}

impl<S: DisplaySink + ?Sized> DisplaySink for Rc<RefCell<S>> {
    fn render(&mut self, rows: &[DisplayRow]) {
        self.borrow_mut().render(rows);
    }
}

/// Discards rendered rows.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DisplaySink for NullSink {
    fn render(&mut self, _rows: &[DisplayRow]) {}
}

/// Owns the roster and wires the generator, selector and edit gateway to it.
pub struct Dashboard {
    config: DashboardConfig,
    roster: Roster,
    formatter: RowFormatter,
    admission: AdmissionGenerator,
    discharge: DischargeSelector,
    clock: Box<dyn Clock>,
    random: Box<dyn RandomSource>,
    sink: Box<dyn DisplaySink>,
}

impl Dashboard {
    pub fn new(
        config: DashboardConfig,
        clock: Box<dyn Clock>,
        random: Box<dyn RandomSource>,
        sink: Box<dyn DisplaySink>,
    ) -> Self {
        Self {
            roster: Roster::new(config.roster.capacity),
            formatter: RowFormatter::new(&config.display),
            admission: AdmissionGenerator::new(config.simulation.name_pool.clone()),
            discharge: DischargeSelector::new(),
            config,
            clock,
            random,
            sink,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn formatter(&self) -> &RowFormatter {
        &self.formatter
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Startup fill: `initial_patients` admissions, then one render.
    pub fn seed(&mut self) -> Vec<PatientId> {
        let now = self.clock.now();
        let admitted: Vec<PatientId> = (0..self.config.simulation.initial_patients)
            .filter_map(|_| self.admission.tick(&mut self.roster, self.random.as_mut(), now))
            .collect();
        info!(count = admitted.len(), "roster seeded");
        self.refresh();
        admitted
    }

    /// Insert a record with a known id (import, fixtures).
    pub fn import(&mut self, patient: Patient) -> crate::roster::RosterResult<()> {
        self.roster.add(patient)?;
        self.refresh();
        Ok(())
    }

    /// Import a JSON array of patient records. Stops at the first record the
    /// roster refuses; records before it stay imported and are rendered.
    pub fn import_json(&mut self, json: &str) -> crate::Result<usize> {
        let patients: Vec<Patient> = serde_json::from_str(json)?;
        let mut count = 0;
        let mut outcome = Ok(());
        for patient in patients {
            if let Err(err) = self.roster.add(patient) {
                outcome = Err(err);
                break;
            }
            count += 1;
        }
        info!(count, "patients imported");
        if count > 0 {
            self.refresh();
        }
        outcome?;
        Ok(count)
    }

    pub fn admission_tick(&mut self) -> Option<PatientId> {
        let now = self.clock.now();
        let admitted = self
            .admission
            .tick(&mut self.roster, self.random.as_mut(), now);
        if admitted.is_some() {
            self.refresh();
        }
        admitted
    }

    pub fn discharge_tick(&mut self) -> Option<PatientId> {
        let now = self.clock.now();
        let discharged = self
            .discharge
            .tick(&mut self.roster, self.random.as_mut(), now);
        if discharged.is_some() {
            self.refresh();
        }
        discharged
    }

    /// Dispatch a scheduler tick. Clock ticks do not touch the roster.
    pub fn handle_tick(&mut self, tick: Tick) -> Option<PatientId> {
        match tick {
            Tick::Clock => None,
            Tick::Admission => self.admission_tick(),
            Tick::Discharge => self.discharge_tick(),
        }
    }

    /// Prefilled edit form, or `None` if the record is gone.
    pub fn open_edit(&self, id: PatientId) -> Option<EditForm> {
        self.roster
            .find_by_id(id)
            .map(|patient| EditForm::from_patient(patient, self.formatter.offset()))
    }

    pub fn apply_edit(&mut self, id: PatientId, form: &EditForm) -> EditOutcome {
        let outcome =
            EditGateway::new(&mut self.roster, self.formatter.offset()).apply_edit(id, form);
        self.refresh();
        outcome
    }

    pub fn delete_record(&mut self, id: PatientId, gate: &mut dyn ConfirmGate) -> DeleteOutcome {
        let outcome =
            EditGateway::new(&mut self.roster, self.formatter.offset()).delete_record(id, gate);
        self.refresh();
        outcome
    }

    /// Current display rows, computed fresh from the roster.
    pub fn display_rows(&self) -> Vec<DisplayRow> {
        display_rows(self.roster.list_all(), &self.formatter)
    }

    /// Recompute the projection and push it to the sink.
    pub fn refresh(&mut self) {
        let rows = self.display_rows();
        debug!(rows = rows.len(), "display refreshed");
        self.sink.render(&rows);
    }

    /// Report of the current roster in export order.
    pub fn report(&self) -> PatientReport {
        PatientReport::build(
            self.roster.list_all(),
            &self.formatter,
            &self.config.report,
            self.clock.now(),
        )
    }
}
