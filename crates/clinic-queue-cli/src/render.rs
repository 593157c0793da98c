//! Terminal rendering of the queue table and the clock banner.

use std::io::{self, Write};

use chrono::{DateTime, FixedOffset, Locale, Utc};
use clinic_queue_core::{DisplayRow, DisplaySink, RiskLevel};

use crate::theme::Theme;

const HEADERS: [&str; 7] = [
    "ID",
    "Paciente",
    "Idade",
    "Entrada",
    "Saída",
    "Class. Risco",
    "Motivo da Saída",
];

const RESET: &str = "\x1b[0m";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// How the table is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStyle {
    pub theme: Theme,
    pub color: bool,
}

impl TableStyle {
    pub fn plain() -> Self {
        Self {
            theme: Theme::Light,
            color: false,
        }
    }

    fn header_code(&self) -> &'static str {
        match self.theme {
            Theme::Light => "\x1b[1;97;44m",
            Theme::Dark => "\x1b[1;97;100m",
        }
    }
}

fn risk_code(risk: RiskLevel) -> &'static str {
    match risk {
        RiskLevel::Red => "\x1b[1;97;41m",
        RiskLevel::Yellow => "\x1b[1;30;43m",
        RiskLevel::Green => "\x1b[1;30;42m",
        RiskLevel::Blue => "\x1b[1;97;44m",
    }
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

fn paint(text: String, code: &str, enabled: bool) -> String {
    if enabled {
        format!("{code}{text}{RESET}")
    } else {
        text
    }
}

fn cells(row: &DisplayRow) -> [String; 7] {
    [
        row.id.to_string(),
        row.name.clone(),
        row.age.clone(),
        row.entry.clone(),
        row.exit.clone(),
        row.risk_label.clone(),
        row.exit_reason.clone(),
    ]
}

/// Render rows as a fixed-width table.
pub fn render_table(rows: &[DisplayRow], style: TableStyle) -> String {
    let body: Vec<[String; 7]> = rows.iter().map(cells).collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &body {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = HEADERS
        .iter()
        .zip(widths.iter())
        .map(|(h, w)| pad(h, *w))
        .collect();
    out.push_str(&paint(header.join(" | "), style.header_code(), style.color));
    out.push('\n');

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');

    for (row, text) in rows.iter().zip(body.iter()) {
        let line: Vec<String> = text
            .iter()
            .zip(widths.iter())
            .enumerate()
            .map(|(column, (cell, width))| {
                let padded = pad(cell, *width);
                if column == 5 {
                    paint(padded, risk_code(row.risk), style.color)
                } else {
                    padded
                }
            })
            .collect();
        out.push_str(&line.join(" | "));
        out.push('\n');
    }

    if rows.is_empty() {
        out.push_str("(fila vazia)\n");
    }
    out
}

/// Long pt-BR date and time, as shown above the table.
pub fn clock_banner(now: DateTime<Utc>, offset: FixedOffset) -> String {
    let local = now.with_timezone(&offset);
    format!(
        "{}  {}",
        local.format_localized("%A, %-d de %B de %Y", Locale::pt_BR),
        local.format("%H:%M:%S")
    )
}

/// Writes each refreshed table to a terminal.
pub struct TerminalSink<W: Write> {
    out: W,
    style: TableStyle,
    clear: bool,
}

impl TerminalSink<io::Stdout> {
    pub fn stdout(style: TableStyle) -> Self {
        Self::new(io::stdout(), style)
    }
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, style: TableStyle) -> Self {
        Self {
            out,
            style,
            clear: false,
        }
    }

    /// Clear the screen before each table so it redraws in place.
    pub fn clearing(mut self, clear: bool) -> Self {
        self.clear = clear;
        self
    }
}

impl<W: Write> DisplaySink for TerminalSink<W> {
    fn render(&mut self, rows: &[DisplayRow]) {
        let mut table = render_table(rows, self.style);
        if self.clear {
            table.insert_str(0, CLEAR_SCREEN);
        }
        if let Err(err) = self
            .out
            .write_all(table.as_bytes())
            .and_then(|_| self.out.flush())
        {
            tracing::warn!(error = %err, "failed to draw table");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use clinic_queue_core::{Patient, PatientId, RowFormatter};

    fn rows() -> Vec<DisplayRow> {
        let formatter = RowFormatter::default();
        let mut ana = Patient::new(PatientId(1), "Ana Silva K.", RiskLevel::Red);
        ana.age = Some(30);
        let fabio = Patient::new(PatientId(12), "Fábio Lima Z.", RiskLevel::Blue);
        vec![formatter.row(&ana), formatter.row(&fabio)]
    }

    #[test]
    fn test_plain_table_layout() {
        let table = render_table(&rows(), TableStyle::plain());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID | Paciente"));
        assert!(lines[2].starts_with("1  | Ana Silva K."));
        assert!(lines[3].contains("Azul"));
        assert!(!table.contains('\x1b'));
        // accented names still align
        let bar = |line: &str| line.chars().filter(|c| *c == '|').count();
        assert_eq!(bar(lines[2]), 6);
        let second_bar = |line: &str| {
            line.chars()
                .enumerate()
                .filter(|(_, c)| *c == '|')
                .nth(1)
                .map(|(i, _)| i)
        };
        assert_eq!(second_bar(lines[2]), second_bar(lines[3]));
    }

    #[test]
    fn test_colored_table_tags_risk() {
        let style = TableStyle {
            theme: Theme::Dark,
            color: true,
        };
        let table = render_table(&rows(), style);
        assert!(table.contains("\x1b[1;97;41mVermelho"));
        assert!(table.starts_with("\x1b[1;97;100m"));
    }

    #[test]
    fn test_empty_table() {
        let table = render_table(&[], TableStyle::plain());
        assert!(table.ends_with("(fila vazia)\n"));
    }

    #[test]
    fn test_clock_banner_pt_br() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 15, 4, 5).unwrap();
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        assert_eq!(
            clock_banner(now, offset),
            "sexta-feira, 1 de março de 2024  12:04:05"
        );
    }

    #[test]
    fn test_terminal_sink_writes_table() {
        let mut buffer = Vec::new();
        {
            let mut sink = TerminalSink::new(&mut buffer, TableStyle::plain());
            sink.render(&rows());
        }
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("Fábio Lima Z."));
        assert!(!text.contains(CLEAR_SCREEN));
    }

    #[test]
    fn test_clearing_sink_redraws_from_top() {
        let mut buffer = Vec::new();
        {
            let mut sink = TerminalSink::new(&mut buffer, TableStyle::plain()).clearing(true);
            sink.render(&rows());
        }
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with(CLEAR_SCREEN));
    }
}
