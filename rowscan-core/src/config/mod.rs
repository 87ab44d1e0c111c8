//! Configuration types
//!
//! Board wiring constants, supplied when the firmware is built rather than
//! discovered at runtime.

pub mod board;

pub use board::*;
