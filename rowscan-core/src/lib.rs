//! Board-agnostic core logic for the LED matrix row-scan firmware
//!
//! This crate contains everything that does not depend on a specific
//! microcontroller:
//!
//! - Hardware seam traits (shift bus, tick timer, clock output)
//! - Gamma table and serial word encoding
//! - Phase schedules and interval modes
//! - The phase state machine and its timer scheduler
//! - Button sampling, contrast handoff and diagnostic counters
//! - Double-buffered frame storage
//! - Start-up chain self-test and fault codes
//! - Persisted display settings

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod buttons;
pub mod config;
pub mod contrast;
pub mod encode;
pub mod engine;
pub mod fault;
pub mod framebuffer;
pub mod gamma;
pub mod schedule;
pub mod selftest;
pub mod settings;
pub mod stats;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;
