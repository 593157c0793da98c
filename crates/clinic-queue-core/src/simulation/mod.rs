//! Simulated patient flow: arrivals, departures and the timers that drive them.
//!
//! Each timer is a plain tick function. Callers decide when to invoke them,
//! either from [`Scheduler`] against a clock or directly from a test.

mod admission;
mod discharge;
mod scheduler;

pub use admission::*;
pub use discharge::*;
pub use scheduler::*;
