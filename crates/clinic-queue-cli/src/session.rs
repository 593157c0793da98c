//! Interactive console over a manually advanced clock.
//!
//! Timers only move when the operator runs `advance`, which makes a session
//! a convenient way to walk the queue through a scripted scenario.

use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::rc::Rc;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use clinic_queue_core::roster::{
    EDIT_FIELDS, FIELD_AGE, FIELD_ENTRY, FIELD_EXIT, FIELD_EXIT_REASON, FIELD_NAME,
    FIELD_STAFF_NAME, FIELD_STAFF_SECTOR,
};
use clinic_queue_core::{
    Clock, ConfirmGate, Dashboard, DashboardConfig, DeleteOutcome, DisplayRow, DisplaySink,
    EditOutcome, ManualClock, PatientId, RandomSource, ReportFormat, Scheduler, Tick,
};
use tracing::debug;

use crate::commands::{SessionCommand, HELP};
use crate::render::{clock_banner, render_table, TableStyle};
use crate::theme::ThemeStore;

/// Input that clears a field in the edit prompts.
const CLEAR_MARKER: &str = "-";

fn field_label(field: &str) -> &'static str {
    match field {
        FIELD_NAME => "Nome",
        FIELD_AGE => "Idade",
        FIELD_ENTRY => "Entrada (AAAA-MM-DDTHH:MM)",
        FIELD_EXIT => "Saída (AAAA-MM-DDTHH:MM)",
        FIELD_EXIT_REASON => "Motivo da saída",
        FIELD_STAFF_NAME => "Profissional",
        FIELD_STAFF_SECTOR => "Setor",
        _ => "Campo",
    }
}

/// Read one line; `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Asks the operator on the console. Only an explicit yes confirms.
struct PromptGate<'a, R: BufRead, W: Write> {
    input: &'a mut R,
    output: &'a mut W,
}

impl<R: BufRead, W: Write> ConfirmGate for PromptGate<'_, R, W> {
    fn confirm(&mut self, prompt: &str) -> bool {
        if write!(self.output, "{prompt} (s/n) ")
            .and_then(|_| self.output.flush())
            .is_err()
        {
            return false;
        }
        match read_line(self.input) {
            Ok(Some(answer)) => matches!(
                answer.trim().to_ascii_lowercase().as_str(),
                "s" | "sim" | "y" | "yes"
            ),
            _ => false,
        }
    }
}

/// Holds the newest rendered frame until the session prints it.
#[derive(Debug, Default)]
struct LatestFrame {
    rows: Option<Vec<DisplayRow>>,
}

impl DisplaySink for LatestFrame {
    fn render(&mut self, rows: &[DisplayRow]) {
        self.rows = Some(rows.to_vec());
    }
}

/// A console session driving one dashboard.
pub struct Session<R: BufRead, W: Write> {
    dashboard: Dashboard,
    clock: Rc<ManualClock>,
    scheduler: Scheduler,
    frames: Rc<RefCell<LatestFrame>>,
    themes: ThemeStore,
    style: TableStyle,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(
        config: DashboardConfig,
        random: Box<dyn RandomSource>,
        start: DateTime<Utc>,
        themes: ThemeStore,
        color: bool,
        input: R,
        output: W,
    ) -> Self {
        let clock = Rc::new(ManualClock::new(start));
        let frames = Rc::new(RefCell::new(LatestFrame::default()));
        let scheduler = Scheduler::new(start, &config.simulation);
        let dashboard = Dashboard::new(
            config,
            Box::new(clock.clone()),
            random,
            Box::new(frames.clone()),
        );
        let style = TableStyle {
            theme: themes.load(),
            color,
        };
        Self {
            dashboard,
            clock,
            scheduler,
            frames,
            themes,
            style,
            input,
            output,
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn dashboard_mut(&mut self) -> &mut Dashboard {
        &mut self.dashboard
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.output
    }

    /// Hand the output back, e.g. to inspect what a scripted session printed.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Read and execute commands until `quit` or end of input.
    pub fn run(&mut self) -> anyhow::Result<()> {
        self.banner()?;
        self.flush_frames()?;
        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;
            let Some(line) = read_line(&mut self.input)? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            let command = match line.parse::<SessionCommand>() {
                Ok(command) => command,
                Err(err) => {
                    writeln!(self.output, "erro: {err}")?;
                    continue;
                }
            };
            if command == SessionCommand::Quit {
                break;
            }
            if let Err(err) = self.execute(command) {
                writeln!(self.output, "erro: {err:#}")?;
            }
            self.flush_frames()?;
        }
        Ok(())
    }

    /// Run a single command.
    pub fn execute(&mut self, command: SessionCommand) -> anyhow::Result<()> {
        debug!(?command, "session command");
        match command {
            SessionCommand::Show => {
                let table = render_table(&self.dashboard.display_rows(), self.style);
                write!(self.output, "{table}")?;
            }
            SessionCommand::Admit => {
                if self.dashboard.admission_tick().is_none() {
                    writeln!(self.output, "fila cheia, nenhuma chegada")?;
                }
            }
            SessionCommand::Discharge => {
                if self.dashboard.discharge_tick().is_none() {
                    writeln!(self.output, "nenhum paciente aguardando")?;
                }
            }
            SessionCommand::Advance { seconds } => self.advance(seconds)?,
            SessionCommand::Edit { id } => self.edit(id)?,
            SessionCommand::Delete { id } => self.delete(id)?,
            SessionCommand::Export { format, dir } => self.export(format, &dir)?,
            SessionCommand::Theme(choice) => {
                let theme = self.themes.apply(choice)?;
                self.style.theme = theme;
                writeln!(self.output, "tema: {theme}")?;
            }
            SessionCommand::Help => writeln!(self.output, "{HELP}")?,
            SessionCommand::Quit => {}
        }
        Ok(())
    }

    fn advance(&mut self, seconds: u64) -> anyhow::Result<()> {
        let target = i64::try_from(seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|delta| self.clock.now().checked_add_signed(delta))
            .context("intervalo grande demais")?;
        self.clock.set(target);
        for tick in self.scheduler.due(target) {
            if tick != Tick::Clock {
                self.dashboard.handle_tick(tick);
            }
        }
        self.banner()
    }

    fn edit(&mut self, id: PatientId) -> anyhow::Result<()> {
        let Some(mut form) = self.dashboard.open_edit(id) else {
            writeln!(self.output, "paciente {id} não encontrado")?;
            return Ok(());
        };

        writeln!(
            self.output,
            "Editando paciente {id} (Enter mantém, '{CLEAR_MARKER}' limpa)"
        )?;
        for field in EDIT_FIELDS {
            write!(self.output, "{} [{}]: ", field_label(field), form.get(field))?;
            self.output.flush()?;
            let Some(answer) = read_line(&mut self.input)? else {
                writeln!(self.output, "edição cancelada")?;
                return Ok(());
            };
            match answer.trim() {
                "" => {}
                CLEAR_MARKER => form.set(field, ""),
                value => form.set(field, value),
            }
        }

        match self.dashboard.apply_edit(id, &form) {
            EditOutcome::Applied => writeln!(self.output, "paciente {id} atualizado")?,
            EditOutcome::NotFound => writeln!(self.output, "paciente {id} não encontrado")?,
        }
        Ok(())
    }

    fn delete(&mut self, id: PatientId) -> anyhow::Result<()> {
        let mut gate = PromptGate {
            input: &mut self.input,
            output: &mut self.output,
        };
        let outcome = self.dashboard.delete_record(id, &mut gate);
        match outcome {
            DeleteOutcome::Deleted(patient) => {
                writeln!(self.output, "paciente {} removido", patient.name)?
            }
            DeleteOutcome::Cancelled => writeln!(self.output, "remoção cancelada")?,
            DeleteOutcome::NotFound => writeln!(self.output, "paciente {id} não encontrado")?,
        }
        Ok(())
    }

    fn export(&mut self, format: ReportFormat, dir: &Path) -> anyhow::Result<()> {
        let report = self.dashboard.report();
        let path = report.write_to_dir(dir, format)?;
        writeln!(
            self.output,
            "relatório gravado em {} ({} pacientes)",
            path.display(),
            report.rows.len()
        )?;
        Ok(())
    }

    fn banner(&mut self) -> anyhow::Result<()> {
        let offset = self.dashboard.formatter().offset();
        writeln!(self.output, "{}", clock_banner(self.clock.now(), offset))?;
        Ok(())
    }

    /// Print the newest frame if the dashboard re-rendered since the last flush.
    fn flush_frames(&mut self) -> anyhow::Result<()> {
        let latest = self.frames.borrow_mut().rows.take();
        if let Some(rows) = latest {
            write!(self.output, "{}", render_table(&rows, self.style))?;
        }
        self.output.flush()?;
        Ok(())
    }
}
