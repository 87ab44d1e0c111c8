//! RP2040-specific HAL for the LED matrix firmware
//!
//! This crate provides RP2040 implementations of the shared `rowscan-hal`
//! pin traits and the `rowscan-core` hardware seams:
//!
//! - GPIO wrappers (plain output, input, and the bidirectional data line)
//! - PWM slice as the driver brightness clock
//! - PIO state machine with DMA as the background chain bus output
//! - embassy-time backed scan timer
//! - Flash settings store (implements `rowscan_hal::FlashStorage`)

#![no_std]

pub mod flash;
pub mod gpio;
pub mod pwm;
pub mod shift;
pub mod timer;
