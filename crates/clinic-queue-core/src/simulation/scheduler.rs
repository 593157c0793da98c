//! Independent periodic timers reduced to explicit ticks.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::config::{SimulationConfig, MAX_INTERVAL_SECS};

/// Most missed firings an admission or discharge timer replays per call.
pub const MAX_CATCH_UP: i64 = 1_000;

/// Which timer fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tick {
    /// Refresh the clock banner.
    Clock,
    Admission,
    Discharge,
}

#[derive(Debug, Clone)]
struct Timer {
    tick: Tick,
    interval: Duration,
    next_due: DateTime<Utc>,
}

/// Tracks when each timer is next due.
///
/// Timers are uncoordinated: each fires on its own interval counted from the
/// scheduler's start, with no jitter or backoff.
#[derive(Debug, Clone)]
pub struct Scheduler {
    timers: Vec<Timer>,
}

impl Scheduler {
    pub fn new(start: DateTime<Utc>, config: &SimulationConfig) -> Self {
        let timers = [
            (Tick::Clock, config.clock_interval_secs),
            (Tick::Admission, config.admission_interval_secs),
            (Tick::Discharge, config.discharge_interval_secs),
        ]
        .into_iter()
        .map(|(tick, secs)| {
            let secs = secs.clamp(1, MAX_INTERVAL_SECS) as i64;
            let interval = Duration::seconds(secs);
            Timer {
                tick,
                interval,
                next_due: start + interval,
            }
        })
        .collect();
        Self { timers }
    }

    /// Every tick due at or before `now`, in firing order.
    ///
    /// A lagging clock timer fires once. Admission and discharge timers
    /// replay each missed interval, at most [`MAX_CATCH_UP`] of them; the
    /// rest are dropped.
    pub fn due(&mut self, now: DateTime<Utc>) -> Vec<Tick> {
        let mut fired: Vec<(DateTime<Utc>, Tick)> = Vec::new();
        for timer in &mut self.timers {
            if timer.next_due > now {
                continue;
            }
            let step = timer.interval.num_seconds();
            let missed = (now - timer.next_due).num_seconds() / step + 1;
            // Keep the most recent firings.
            let replay = match timer.tick {
                Tick::Clock => 1,
                _ => missed.min(MAX_CATCH_UP),
            };
            if replay < missed {
                debug!(tick = ?timer.tick, dropped = missed - replay, "timer catch-up capped");
            }
            for k in (missed - replay)..missed {
                fired.push((timer.next_due + Duration::seconds(step * k), timer.tick));
            }
            timer.next_due = timer
                .next_due
                .checked_add_signed(Duration::seconds(step * missed))
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
        }
        fired.sort_by_key(|(at, _)| *at);
        fired.into_iter().map(|(_, tick)| tick).collect()
    }

    /// Earliest instant at which any timer fires.
    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.timers.iter().map(|t| t.next_due).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn config() -> SimulationConfig {
        SimulationConfig {
            clock_interval_secs: 10,
            admission_interval_secs: 15,
            discharge_interval_secs: 25,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_nothing_due_before_first_interval() {
        let mut scheduler = Scheduler::new(start(), &config());
        assert!(scheduler.due(start() + Duration::seconds(9)).is_empty());
        assert_eq!(scheduler.next_due(), Some(start() + Duration::seconds(10)));
    }

    #[test]
    fn test_ticks_fire_in_time_order() {
        let mut scheduler = Scheduler::new(start(), &config());
        let ticks = scheduler.due(start() + Duration::seconds(30));
        // 15 admission, 25 discharge, 30 clock (10 and 20 collapsed), 30 admission
        assert_eq!(
            ticks,
            vec![Tick::Admission, Tick::Discharge, Tick::Clock, Tick::Admission]
        );
    }

    #[test]
    fn test_lagging_clock_fires_once() {
        let mut scheduler = Scheduler::new(start(), &config());
        let ticks = scheduler.due(start() + Duration::seconds(100));
        assert_eq!(ticks.iter().filter(|t| **t == Tick::Clock).count(), 1);
        assert_eq!(ticks.iter().filter(|t| **t == Tick::Admission).count(), 6);
        assert_eq!(ticks.iter().filter(|t| **t == Tick::Discharge).count(), 4);
        assert_eq!(scheduler.next_due(), Some(start() + Duration::seconds(105)));
    }

    #[test]
    fn test_huge_gap_is_bounded() {
        let mut scheduler = Scheduler::new(start(), &config());
        let later = start() + Duration::seconds(1_000_000_000);
        let ticks = scheduler.due(later);
        assert_eq!(ticks.len() as i64, 2 * MAX_CATCH_UP + 1);
        assert!(scheduler.next_due().unwrap() > later);
        assert!(scheduler.due(later).is_empty());
    }

    #[test]
    fn test_oversized_interval_is_clamped() {
        let config = SimulationConfig {
            admission_interval_secs: u64::MAX,
            ..config()
        };
        let mut scheduler = Scheduler::new(start(), &config);
        assert!(scheduler.next_due().unwrap() > start());
        assert!(!scheduler
            .due(start() + Duration::seconds(MAX_INTERVAL_SECS as i64))
            .is_empty());
    }

    #[test]
    fn test_ticks_do_not_repeat() {
        let mut scheduler = Scheduler::new(start(), &config());
        let t = start() + Duration::seconds(15);
        assert_eq!(scheduler.due(t), vec![Tick::Clock, Tick::Admission]);
        assert!(scheduler.due(t).is_empty());
    }
}
