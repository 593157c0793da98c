use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use clinic_queue_core::{dashboard_from_config, NullSink, RandomSource, ReportFormat, SeededRandom};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clinic_queue_cli::live::{self, LiveOptions};
use clinic_queue_cli::render::TableStyle;
use clinic_queue_cli::session::Session;
use clinic_queue_cli::theme::{ThemeStore, DEFAULT_THEME_FILE};
use clinic_queue_cli::{load_config, populate};

#[derive(Parser)]
#[command(name = "clinic-queue", about = "Simulated waiting-room queue for a walk-in clinic")]
struct Cli {
    /// Configuration file (TOML, or JSON by extension)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Seed for the simulated arrivals and departures
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Start from a JSON array of patient records instead of random arrivals
    #[arg(long, global = true)]
    import: Option<PathBuf>,
    #[arg(long, global = true, default_value = DEFAULT_THEME_FILE)]
    theme_file: PathBuf,
    #[arg(long, global = true)]
    no_color: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the queue in real time
    Run {
        /// Stop after this many seconds
        #[arg(long)]
        duration_secs: Option<u64>,
    },
    /// Interactive console with a manually advanced clock
    Session,
    /// Write the patient report for a freshly populated queue
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: FormatArg,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Csv => ReportFormat::Csv,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    // Logs go to stderr so they never interleave with the table.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.seed)?;
    let themes = ThemeStore::new(&cli.theme_file);
    let color = !cli.no_color && io::stdout().is_terminal();

    match cli.command {
        Command::Run { duration_secs } => {
            let options = LiveOptions {
                duration: duration_secs.map(Duration::from_secs),
                style: TableStyle {
                    theme: themes.load(),
                    color,
                },
                import: cli.import,
            };
            live::run(config, &options)?;
        }
        Command::Session => {
            let random: Box<dyn RandomSource> = match config.simulation.seed {
                Some(seed) => Box::new(SeededRandom::from_seed(seed)),
                None => Box::new(SeededRandom::from_os()),
            };
            let stdin = io::stdin();
            let mut session = Session::new(
                config,
                random,
                Utc::now(),
                themes,
                color,
                stdin.lock(),
                io::stdout(),
            );
            populate(session.dashboard_mut(), cli.import.as_deref())?;
            session.run()?;
        }
        Command::Export { format, out_dir } => {
            let mut dashboard = dashboard_from_config(config, Box::new(NullSink));
            populate(&mut dashboard, cli.import.as_deref())?;
            let report = dashboard.report();
            let path = report.write_to_dir(&out_dir, format.into())?;
            println!("{} ({} pacientes)", path.display(), report.rows.len());
        }
    }

    Ok(())
}
