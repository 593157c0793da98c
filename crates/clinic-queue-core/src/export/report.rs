//! Printable patient report.
//!
//! The report is the row list a document renderer consumes: a title, a
//! generation stamp, six fixed column labels and one row per patient in
//! export order (most recent arrival first, departed patients interleaved).

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::ReportConfig;
use crate::models::Patient;
use crate::projection::{export_order, RowFormatter};

/// Column labels, in row order.
pub const REPORT_COLUMNS: [&str; 6] = [
    "Paciente",
    "Idade",
    "Entrada",
    "Saída",
    "Class. Risco",
    "Motivo da Saída",
];

const GENERATED_AT_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Export errors.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Output encoding for a report file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Csv,
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }
}

/// Report header information.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportMetadata {
    /// Document title
    pub title: String,
    /// "Gerado em: ..." line, clinic local time
    pub generated_label: String,
    /// Generation instant
    pub generated_at: DateTime<Utc>,
    /// Suggested artifact name, without extension
    pub file_stem: String,
}

/// Patient report ready for a document sink.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientReport {
    pub metadata: ReportMetadata,
    pub columns: Vec<String>,
    pub rows: Vec<[String; 6]>,
}

impl PatientReport {
    /// Build a report from a roster snapshot.
    pub fn build(
        patients: &[Patient],
        formatter: &RowFormatter,
        config: &ReportConfig,
        now: DateTime<Utc>,
    ) -> Self {
        let rows = export_order(patients)
            .into_iter()
            .map(|p| {
                [
                    p.name.clone(),
                    formatter.age(p.age),
                    formatter.timestamp(p.entry_time),
                    formatter.timestamp(p.exit_time),
                    p.risk.label().to_string(),
                    formatter.text(p.exit_reason.as_deref()),
                ]
            })
            .collect();

        let local = now.with_timezone(&formatter.offset());
        Self {
            metadata: ReportMetadata {
                title: config.title.clone(),
                generated_label: format!("Gerado em: {}", local.format(GENERATED_AT_FORMAT)),
                generated_at: now,
                file_stem: format!("{}_{}", config.file_prefix, now.format("%Y-%m-%d")),
            },
            columns: REPORT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    /// Artifact file name for the given format.
    pub fn file_name(&self, format: ReportFormat) -> String {
        format!("{}.{}", self.metadata.file_stem, format.extension())
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV: title and stamp as leading lines, then header and rows.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        csv.push_str(&escape_csv(&self.metadata.title));
        csv.push('\n');
        csv.push_str(&escape_csv(&self.metadata.generated_label));
        csv.push('\n');

        let header: Vec<String> = self.columns.iter().map(|c| escape_csv(c)).collect();
        csv.push_str(&header.join(","));
        csv.push('\n');

        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|c| escape_csv(c)).collect();
            csv.push_str(&cells.join(","));
            csv.push('\n');
        }

        csv
    }

    /// Render in the given format.
    pub fn render(&self, format: ReportFormat) -> ExportResult<String> {
        match format {
            ReportFormat::Csv => Ok(self.to_csv()),
            ReportFormat::Json => Ok(self.to_json()?),
        }
    }

    /// Write the report into `dir` under its dated file name.
    pub fn write_to_dir(&self, dir: &Path, format: ReportFormat) -> ExportResult<PathBuf> {
        let path = dir.join(self.file_name(format));
        let contents = self.render(format)?;
        fs::write(&path, contents).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), rows = self.rows.len(), "patient report written");
        Ok(path)
    }
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PatientId, RiskLevel};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 2, 1, 30, 0).unwrap()
    }

    fn patients() -> Vec<Patient> {
        let mut a = Patient::new(PatientId(1), "Ana Silva K.", RiskLevel::Red);
        a.entry_time = Some(now() - Duration::minutes(10));
        a.age = Some(30);

        let mut d = Patient::new(PatientId(2), "Bruno Costa T.", RiskLevel::Blue);
        d.entry_time = Some(now() - Duration::minutes(5));
        d.discharge(now(), "Transferência");

        let c = Patient::new(PatientId(3), "Carla, Dias", RiskLevel::Green);
        vec![a, c, d]
    }

    fn report() -> PatientReport {
        PatientReport::build(
            &patients(),
            &RowFormatter::default(),
            &ReportConfig::default(),
            now(),
        )
    }

    #[test]
    fn test_rows_in_export_order() {
        let report = report();
        let names: Vec<_> = report.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(names, vec!["Bruno Costa T.", "Ana Silva K.", "Carla, Dias"]);
    }

    #[test]
    fn test_row_cells() {
        let report = report();
        assert_eq!(
            report.rows[1],
            [
                "Ana Silva K.".to_string(),
                "30".into(),
                "01/03/2024 22:20".into(),
                "---".into(),
                "Vermelho".into(),
                "---".into(),
            ]
        );
        assert_eq!(report.rows[0][5], "Transferência");
    }

    #[test]
    fn test_metadata() {
        let report = report();
        assert_eq!(report.columns, REPORT_COLUMNS.to_vec());
        assert_eq!(report.metadata.title, "Relatório de Pacientes - UPA Zona Norte");
        assert_eq!(report.metadata.generated_label, "Gerado em: 01/03/2024 22:30:00");
        // artifact name uses the UTC date
        assert_eq!(report.file_name(ReportFormat::Csv), "relatorio_pacientes_2024-03-02.csv");
    }

    #[test]
    fn test_report_csv() {
        let csv = report().to_csv();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 6); // title + stamp + header + 3 rows
        assert_eq!(lines[2], "Paciente,Idade,Entrada,Saída,Class. Risco,Motivo da Saída");
        assert!(lines[5].starts_with("\"Carla, Dias\""));
    }

    #[test]
    fn test_report_json() {
        let json = report().to_json().unwrap();
        assert!(json.contains("Bruno Costa T."));
        let back: PatientReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.rows.len(), 3);
    }

    #[test]
    fn test_csv_escaping() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
    }

    #[test]
    fn test_write_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = report().write_to_dir(dir.path(), ReportFormat::Json).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "relatorio_pacientes_2024-03-02.json"
        );
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains("Gerado em"));
    }

    #[test]
    fn test_write_to_missing_dir_fails() {
        let err = report()
            .write_to_dir(Path::new("/nonexistent/reports"), ReportFormat::Csv)
            .unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
