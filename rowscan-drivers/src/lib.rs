//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in rowscan-core on top of the traits from rowscan-hal:
//!
//! - Staged shift bus over a background burst output
//! - Bit-banged chain access for the loopback self-test
//! - Status LED fault blinker

#![no_std]
#![deny(unsafe_code)]

pub mod bitbang;
pub mod staged;
pub mod status_led;

pub use bitbang::BitBangBus;
pub use staged::StagedBus;
pub use status_led::StatusLed;
