//! Utilities shared by the Irori crates: logging setup and a testable clock.

pub mod logger;
pub mod time;
