//! Manual edits and deletions entered by staff.
//!
//! Edits arrive as a flat field-name → string form, the same shape the
//! dashboard's edit dialog submits. Every submit is a full overwrite of the
//! editable fields: an empty value clears the field, it never means "keep".
//! There is no staleness check against automated changes made while the form
//! was open; the last write wins.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use tracing::{debug, info, warn};

use super::Roster;
use crate::models::{Patient, PatientId};

pub const FIELD_NAME: &str = "patient-name";
pub const FIELD_AGE: &str = "patient-age";
pub const FIELD_ENTRY: &str = "entry-datetime";
pub const FIELD_EXIT: &str = "exit-datetime";
pub const FIELD_EXIT_REASON: &str = "exit-reason";
pub const FIELD_STAFF_NAME: &str = "staff-name";
pub const FIELD_STAFF_SECTOR: &str = "staff-sector";

/// Editable fields in form order.
pub const EDIT_FIELDS: [&str; 7] = [
    FIELD_NAME,
    FIELD_AGE,
    FIELD_ENTRY,
    FIELD_EXIT,
    FIELD_EXIT_REASON,
    FIELD_STAFF_NAME,
    FIELD_STAFF_SECTOR,
];

/// Question put to the operator before a record is deleted.
pub const DELETE_CONFIRMATION_PROMPT: &str = "Tem certeza de que deseja deletar este paciente?";

/// Datetime layout used by the form (`YYYY-MM-DDTHH:MM`, clinic local time).
const FORM_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";
const FORM_DATETIME_FORMAT_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";

/// Flat form submitted by the edit dialog. Missing keys read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditForm {
    fields: BTreeMap<String, String>,
}

impl EditForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefill the form from a stored record, as the dialog does when opened.
    pub fn from_patient(patient: &Patient, offset: FixedOffset) -> Self {
        let mut form = Self::new();
        form.set(FIELD_NAME, patient.name.clone());
        form.set(
            FIELD_AGE,
            patient.age.map(|a| a.to_string()).unwrap_or_default(),
        );
        form.set(FIELD_ENTRY, format_form_datetime(patient.entry_time, offset));
        form.set(FIELD_EXIT, format_form_datetime(patient.exit_time, offset));
        form.set(FIELD_EXIT_REASON, patient.exit_reason.clone().unwrap_or_default());
        form.set(FIELD_STAFF_NAME, patient.staff_name.clone().unwrap_or_default());
        form.set(FIELD_STAFF_SECTOR, patient.staff_sector.clone().unwrap_or_default());
        form
    }

    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EditForm {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A form parsed into typed values, ready to overwrite a record.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientEdit {
    pub name: String,
    pub age: Option<u32>,
    pub entry_time: Option<DateTime<Utc>>,
    pub exit_time: Option<DateTime<Utc>>,
    pub exit_reason: Option<String>,
    pub staff_name: Option<String>,
    pub staff_sector: Option<String>,
}

impl PatientEdit {
    /// Parse a submitted form. Never fails: unusable values degrade to "unset".
    pub fn parse(form: &EditForm, offset: FixedOffset) -> Self {
        Self {
            name: form.get(FIELD_NAME).to_string(),
            age: parse_age(form.get(FIELD_AGE)),
            entry_time: parse_form_datetime_lenient(FIELD_ENTRY, form.get(FIELD_ENTRY), offset),
            exit_time: parse_form_datetime_lenient(FIELD_EXIT, form.get(FIELD_EXIT), offset),
            exit_reason: non_empty(form.get(FIELD_EXIT_REASON)),
            staff_name: non_empty(form.get(FIELD_STAFF_NAME)),
            staff_sector: non_empty(form.get(FIELD_STAFF_SECTOR)),
        }
    }

    /// Overwrite every editable field. Id and risk are untouched.
    pub fn apply_to(self, patient: &mut Patient) {
        patient.name = self.name;
        patient.age = self.age;
        patient.entry_time = self.entry_time;
        patient.exit_time = self.exit_time;
        patient.exit_reason = self.exit_reason;
        patient.staff_name = self.staff_name;
        patient.staff_sector = self.staff_sector;
    }
}

/// Result of submitting an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    /// The id no longer resolves (e.g. deleted while the dialog was open).
    NotFound,
}

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Deleted(Patient),
    /// The operator declined the confirmation.
    Cancelled,
    NotFound,
}

/// Synchronous yes/no challenge shown before destructive actions.
pub trait ConfirmGate {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> ConfirmGate for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Applies operator edits and deletions to a roster.
pub struct EditGateway<'a> {
    roster: &'a mut Roster,
    offset: FixedOffset,
}

impl<'a> EditGateway<'a> {
    /// `offset` is the clinic's local time, used to read and write form datetimes.
    pub fn new(roster: &'a mut Roster, offset: FixedOffset) -> Self {
        Self { roster, offset }
    }

    /// Prefilled form for a record, or `None` if the id is gone.
    pub fn open_edit(&self, id: PatientId) -> Option<EditForm> {
        self.roster
            .find_by_id(id)
            .map(|patient| EditForm::from_patient(patient, self.offset))
    }

    /// Overwrite a record from a submitted form.
    pub fn apply_edit(&mut self, id: PatientId, form: &EditForm) -> EditOutcome {
        let Some(patient) = self.roster.find_by_id_mut(id) else {
            debug!(%id, "edit ignored: patient not found");
            return EditOutcome::NotFound;
        };

        let was_active = patient.is_active();
        PatientEdit::parse(form, self.offset).apply_to(patient);
        info!(
            %id,
            was_active,
            active = patient.is_active(),
            "patient record edited"
        );
        EditOutcome::Applied
    }

    /// Delete a record after the operator confirms.
    pub fn delete_record(&mut self, id: PatientId, gate: &mut dyn ConfirmGate) -> DeleteOutcome {
        if self.roster.find_by_id(id).is_none() {
            debug!(%id, "delete ignored: patient not found");
            return DeleteOutcome::NotFound;
        }
        if !gate.confirm(DELETE_CONFIRMATION_PROMPT) {
            debug!(%id, "delete cancelled by operator");
            return DeleteOutcome::Cancelled;
        }
        match self.roster.remove(id) {
            Some(patient) => {
                info!(%id, name = %patient.name, "patient record deleted");
                DeleteOutcome::Deleted(patient)
            }
            None => DeleteOutcome::NotFound,
        }
    }
}

/// Read an age the way the form does: leading digits only, zero or no digits
/// means unset.
pub fn parse_age(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..digits_end]
        .parse::<u32>()
        .ok()
        .filter(|age| *age > 0)
}

/// Parse a form datetime in clinic local time. Empty input is `Ok(None)`.
pub fn parse_form_datetime(
    raw: &str,
    offset: FixedOffset,
) -> Result<Option<DateTime<Utc>>, chrono::ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let naive = NaiveDateTime::parse_from_str(trimmed, FORM_DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, FORM_DATETIME_FORMAT_SECONDS))?;
    Ok(offset
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc)))
}

/// Render a timestamp for the form, in clinic local time.
pub fn format_form_datetime(value: Option<DateTime<Utc>>, offset: FixedOffset) -> String {
    value
        .map(|dt| dt.with_timezone(&offset).format(FORM_DATETIME_FORMAT).to_string())
        .unwrap_or_default()
}

fn parse_form_datetime_lenient(
    field: &str,
    raw: &str,
    offset: FixedOffset,
) -> Option<DateTime<Utc>> {
    match parse_form_datetime(raw, offset) {
        Ok(value) => value,
        Err(err) => {
            warn!(field, value = raw, error = %err, "unreadable datetime, clearing field");
            None
        }
    }
}

fn non_empty(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskLevel;
    use chrono::Duration;

    fn brt() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    fn roster_with_discharged() -> Roster {
        let mut roster = Roster::new(15);
        let mut patient = Patient::new(PatientId(1), "Ana Silva K.", RiskLevel::Yellow);
        patient.age = Some(34);
        patient.entry_time = Some(Utc::now() - Duration::minutes(30));
        patient.discharge(Utc::now(), "Alta");
        roster.add(patient).unwrap();
        roster
    }

    #[test]
    fn test_parse_age() {
        assert_eq!(parse_age("42"), Some(42));
        assert_eq!(parse_age(" 7 "), Some(7));
        assert_eq!(parse_age("12 anos"), Some(12));
        assert_eq!(parse_age(""), None);
        assert_eq!(parse_age("abc"), None);
        assert_eq!(parse_age("0"), None);
        assert_eq!(parse_age("-5"), None);
    }

    #[test]
    fn test_form_datetime_uses_local_offset() {
        let parsed = parse_form_datetime("2024-03-01T09:30", brt()).unwrap().unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-01T12:30:00+00:00");
        assert_eq!(format_form_datetime(Some(parsed), brt()), "2024-03-01T09:30");
    }

    #[test]
    fn test_form_datetime_empty_is_none() {
        assert_eq!(parse_form_datetime("", brt()).unwrap(), None);
        assert_eq!(parse_form_datetime("   ", brt()).unwrap(), None);
        assert_eq!(format_form_datetime(None, brt()), "");
    }

    #[test]
    fn test_form_datetime_garbage_is_error() {
        assert!(parse_form_datetime("ontem", brt()).is_err());
    }

    #[test]
    fn test_open_edit_prefills_form() {
        let mut roster = roster_with_discharged();
        let gateway = EditGateway::new(&mut roster, brt());
        let form = gateway.open_edit(PatientId(1)).unwrap();
        assert_eq!(form.get(FIELD_NAME), "Ana Silva K.");
        assert_eq!(form.get(FIELD_AGE), "34");
        assert_eq!(form.get(FIELD_EXIT_REASON), "Alta");
        assert!(!form.get(FIELD_EXIT).is_empty());
        assert_eq!(form.get(FIELD_STAFF_NAME), "");
        assert!(gateway.open_edit(PatientId(2)).is_none());
    }

    #[test]
    fn test_clearing_exit_reactivates_patient() {
        let mut roster = roster_with_discharged();
        let mut gateway = EditGateway::new(&mut roster, brt());
        let mut form = gateway.open_edit(PatientId(1)).unwrap();
        form.set(FIELD_EXIT, "");

        assert_eq!(gateway.apply_edit(PatientId(1), &form), EditOutcome::Applied);
        let patient = roster.find_by_id(PatientId(1)).unwrap();
        assert!(patient.is_active());
        assert_eq!(roster.active_ids(), vec![PatientId(1)]);
    }

    #[test]
    fn test_setting_exit_discharges_patient() {
        let mut roster = Roster::new(15);
        roster
            .add(Patient::new(PatientId(3), "Igor Oliveira B.", RiskLevel::Red))
            .unwrap();
        let form = EditForm::new()
            .with(FIELD_NAME, "Igor Oliveira B.")
            .with(FIELD_EXIT, "2024-03-01T10:00")
            .with(FIELD_EXIT_REASON, "Óbito");

        let mut gateway = EditGateway::new(&mut roster, brt());
        gateway.apply_edit(PatientId(3), &form);

        let patient = roster.find_by_id(PatientId(3)).unwrap();
        assert!(!patient.is_active());
        assert_eq!(patient.exit_reason.as_deref(), Some("Óbito"));
    }

    #[test]
    fn test_edit_is_full_overwrite() {
        let mut roster = roster_with_discharged();
        roster.find_by_id_mut(PatientId(1)).unwrap().staff_name = Some("Dra. Lia".into());

        let form = EditForm::new().with(FIELD_NAME, "Ana S.");
        let mut gateway = EditGateway::new(&mut roster, brt());
        gateway.apply_edit(PatientId(1), &form);

        let patient = roster.find_by_id(PatientId(1)).unwrap();
        assert_eq!(patient.name, "Ana S.");
        assert_eq!(patient.age, None);
        assert_eq!(patient.entry_time, None);
        assert_eq!(patient.exit_time, None);
        assert_eq!(patient.exit_reason, None);
        assert_eq!(patient.staff_name, None);
        assert_eq!(patient.risk, RiskLevel::Yellow);
    }

    #[test]
    fn test_empty_age_is_unset_not_zero() {
        let mut roster = roster_with_discharged();
        let mut gateway = EditGateway::new(&mut roster, brt());
        let mut form = gateway.open_edit(PatientId(1)).unwrap();
        form.set(FIELD_AGE, "");
        gateway.apply_edit(PatientId(1), &form);
        assert_eq!(roster.find_by_id(PatientId(1)).unwrap().age, None);
    }

    #[test]
    fn test_unreadable_datetime_clears_field() {
        let mut roster = roster_with_discharged();
        let mut gateway = EditGateway::new(&mut roster, brt());
        let mut form = gateway.open_edit(PatientId(1)).unwrap();
        form.set(FIELD_ENTRY, "amanhã");
        gateway.apply_edit(PatientId(1), &form);
        assert_eq!(roster.find_by_id(PatientId(1)).unwrap().entry_time, None);
    }

    #[test]
    fn test_edit_missing_id_is_noop() {
        let mut roster = roster_with_discharged();
        let before = roster.list_all().to_vec();
        let mut gateway = EditGateway::new(&mut roster, brt());
        let form = EditForm::new().with(FIELD_NAME, "ghost");
        assert_eq!(gateway.apply_edit(PatientId(42), &form), EditOutcome::NotFound);
        assert_eq!(roster.list_all(), before.as_slice());
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut roster = roster_with_discharged();
        let mut gateway = EditGateway::new(&mut roster, brt());

        let mut asked = Vec::new();
        let outcome = gateway.delete_record(PatientId(1), &mut |prompt: &str| {
            asked.push(prompt.to_string());
            false
        });
        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert_eq!(asked, vec![DELETE_CONFIRMATION_PROMPT.to_string()]);
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_delete_confirmed() {
        let mut roster = roster_with_discharged();
        let mut gateway = EditGateway::new(&mut roster, brt());
        let outcome = gateway.delete_record(PatientId(1), &mut |_: &str| true);
        assert!(matches!(outcome, DeleteOutcome::Deleted(p) if p.id == PatientId(1)));
        assert!(roster.is_empty());
    }

    #[test]
    fn test_delete_missing_does_not_prompt() {
        let mut roster = roster_with_discharged();
        let mut gateway = EditGateway::new(&mut roster, brt());
        let mut prompted = false;
        let outcome = gateway.delete_record(PatientId(9), &mut |_: &str| {
            prompted = true;
            true
        });
        assert_eq!(outcome, DeleteOutcome::NotFound);
        assert!(!prompted);
    }

    #[test]
    fn test_form_from_iterator() {
        let form: EditForm = [(FIELD_NAME, "Paulo A."), (FIELD_AGE, "61")].into_iter().collect();
        let edit = PatientEdit::parse(&form, brt());
        assert_eq!(edit.name, "Paulo A.");
        assert_eq!(edit.age, Some(61));
        assert_eq!(edit.exit_time, None);
    }
}
