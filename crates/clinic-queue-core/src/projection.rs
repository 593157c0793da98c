//! Read-only projections of the roster for display and export.
//!
//! Both orderings are pure functions of a roster snapshot and use a stable
//! sort, so records that compare equal keep the order they were encountered in.

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::config::DisplayConfig;
use crate::models::{Patient, PatientId, RiskLevel};

/// One rendered table row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayRow {
    pub id: PatientId,
    pub name: String,
    pub age: String,
    pub entry: String,
    pub exit: String,
    pub risk: RiskLevel,
    pub risk_label: String,
    pub risk_class: String,
    pub exit_reason: String,
    pub active: bool,
}

/// Turns optional values into display strings.
#[derive(Debug, Clone)]
pub struct RowFormatter {
    placeholder: String,
    timestamp_format: String,
    offset: FixedOffset,
}

impl RowFormatter {
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            placeholder: config.placeholder.clone(),
            timestamp_format: config.timestamp_format.clone(),
            offset: config.offset(),
        }
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Local date and time, or the placeholder when absent.
    pub fn timestamp(&self, value: Option<DateTime<Utc>>) -> String {
        match value {
            Some(dt) => dt
                .with_timezone(&self.offset)
                .format(&self.timestamp_format)
                .to_string(),
            None => self.placeholder.clone(),
        }
    }

    pub fn age(&self, age: Option<u32>) -> String {
        age.map(|a| a.to_string())
            .unwrap_or_else(|| self.placeholder.clone())
    }

    pub fn text(&self, value: Option<&str>) -> String {
        match value {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => self.placeholder.clone(),
        }
    }

    pub fn row(&self, patient: &Patient) -> DisplayRow {
        DisplayRow {
            id: patient.id,
            name: patient.name.clone(),
            age: self.age(patient.age),
            entry: self.timestamp(patient.entry_time),
            exit: self.timestamp(patient.exit_time),
            risk: patient.risk,
            risk_label: patient.risk.label().to_string(),
            risk_class: patient.risk.css_class().to_string(),
            exit_reason: self.text(patient.exit_reason.as_deref()),
            active: patient.is_active(),
        }
    }
}

impl Default for RowFormatter {
    fn default() -> Self {
        Self::new(&DisplayConfig::default())
    }
}

/// Most recent arrival first; unknown arrivals after known ones, tied among
/// themselves.
fn by_entry_desc(a: &Patient, b: &Patient) -> Ordering {
    b.entry_time.cmp(&a.entry_time)
}

/// On-screen order: waiting patients first, then departed ones, each group by
/// most recent arrival.
pub fn display_order(patients: &[Patient]) -> Vec<&Patient> {
    let mut ordered: Vec<&Patient> = patients.iter().collect();
    ordered.sort_by(|a, b| {
        a.exit_time
            .is_some()
            .cmp(&b.exit_time.is_some())
            .then_with(|| by_entry_desc(a, b))
    });
    ordered
}

/// Report order: most recent arrival first, regardless of departure.
pub fn export_order(patients: &[Patient]) -> Vec<&Patient> {
    let mut ordered: Vec<&Patient> = patients.iter().collect();
    ordered.sort_by(|a, b| by_entry_desc(a, b));
    ordered
}

/// Display rows for a roster snapshot.
pub fn display_rows(patients: &[Patient], formatter: &RowFormatter) -> Vec<DisplayRow> {
    display_order(patients)
        .into_iter()
        .map(|p| formatter.row(p))
        .collect()
}
