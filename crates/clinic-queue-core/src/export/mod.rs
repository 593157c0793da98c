//! Patient list export.

mod report;

pub use report::*;
