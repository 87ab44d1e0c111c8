//! rowscan Hardware Abstraction Layer
//!
//! This crate defines the pin and storage traits that chip-specific HALs
//! implement, so the scan engine and its drivers stay portable across
//! microcontrollers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  rowscan-core / rowscan-drivers         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  rowscan-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!            ┌─────────────────┐
//!            │  rowscan-hal-   │
//!            │     rp2040      │
//!            └─────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`], [`gpio::DirectionalPin`] - Digital I/O
//! - [`burst::BurstOutput`] - Background word shift-out (PIO/DMA)
//! - [`flash::FlashStorage`] - Persistent settings storage

#![no_std]
#![deny(unsafe_code)]

pub mod burst;
pub mod flash;
pub mod gpio;

// Re-export key traits at crate root for convenience
pub use burst::BurstOutput;
pub use flash::{FlashError, FlashStorage, StorageKey};
pub use gpio::{DirectionalPin, InputPin, IoPin, OutputPin};
