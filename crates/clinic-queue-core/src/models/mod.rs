//! Domain models for the clinic queue.

mod patient;
mod risk;

pub use patient::*;
pub use risk::*;
