//! Random sources for the simulation.
//!
//! Every random decision goes through [`RandomSource`], so tests can replace
//! the generator with a scripted sequence and assert exact outcomes.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform random choices.
pub trait RandomSource {
    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick_index(&mut self, len: usize) -> usize;

    /// Uniform integer in `low..=high`. An inverted range yields `low`.
    fn range_inclusive(&mut self, low: u32, high: u32) -> u32;
}

/// `rand`-backed source. Seed it for reproducible simulations.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_os() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }

    fn range_inclusive(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        self.rng.random_range(low..=high)
    }
}

/// Replays a fixed sequence of raw values.
///
/// Each call consumes the next value and reduces it into the requested range,
/// so `pick_index(5)` after pushing `7` yields `2`. When the script runs out,
/// every call returns the low end of its range.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    values: VecDeque<u64>,
}

impl ScriptedRandom {
    pub fn new(values: impl IntoIterator<Item = u64>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn push(&mut self, value: u64) {
        self.values.push_back(value);
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        let raw = self.values.pop_front().unwrap_or(0);
        (raw % len as u64) as usize
    }

    fn range_inclusive(&mut self, low: u32, high: u32) -> u32 {
        let raw = self.values.pop_front().unwrap_or(0);
        if high <= low {
            return low;
        }
        let span = u64::from(high - low) + 1;
        low + (raw % span) as u32
    }
}
