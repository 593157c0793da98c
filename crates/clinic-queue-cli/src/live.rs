//! Real-time display: the system clock drives the timers.

use std::io::{self, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use clinic_queue_core::{dashboard_from_config, DashboardConfig, Scheduler, Tick};
use tracing::info;

use crate::populate;
use crate::render::{clock_banner, TableStyle, TerminalSink};

/// Upper bound on a single sleep so a stopped clock cannot stall the loop.
const MAX_SLEEP: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct LiveOptions {
    /// Stop after this long; run until interrupted when unset.
    pub duration: Option<Duration>,
    pub style: TableStyle,
    pub import: Option<PathBuf>,
}

/// Print the banner. In color mode it sits on the line under the table and
/// is rewritten in place each second.
fn show_banner(now: DateTime<Utc>, offset: FixedOffset, in_place: bool) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if in_place {
        write!(out, "\r{}", clock_banner(now, offset))?;
    } else {
        writeln!(out, "{}", clock_banner(now, offset))?;
    }
    out.flush()
}

pub fn run(config: DashboardConfig, options: &LiveOptions) -> anyhow::Result<()> {
    let in_place = options.style.color;
    let offset = config.display.offset();
    let scheduler_config = config.simulation.clone();
    let sink = TerminalSink::stdout(options.style).clearing(in_place);
    let mut dashboard = dashboard_from_config(config, Box::new(sink));

    populate(&mut dashboard, options.import.as_deref())?;
    let start = dashboard.now();
    show_banner(start, offset, in_place)?;

    let mut scheduler = Scheduler::new(start, &scheduler_config);
    let deadline = options
        .duration
        .and_then(|d| chrono::Duration::from_std(d).ok())
        .map(|d| start + d);
    info!(?deadline, "live display started");

    loop {
        let now = Utc::now();
        if deadline.is_some_and(|deadline| now >= deadline) {
            break;
        }

        for tick in scheduler.due(now) {
            match tick {
                Tick::Clock => {
                    if in_place {
                        show_banner(now, offset, true)?;
                    }
                }
                other => {
                    if dashboard.handle_tick(other).is_some() {
                        show_banner(now, offset, in_place)?;
                    }
                }
            }
        }

        let wait = scheduler
            .next_due()
            .and_then(|next| (next - Utc::now()).to_std().ok())
            .unwrap_or(Duration::ZERO)
            .min(MAX_SLEEP);
        thread::sleep(wait);
    }

    if in_place {
        println!();
    }
    info!(patients = dashboard.roster().len(), "live display stopped");
    Ok(())
}
