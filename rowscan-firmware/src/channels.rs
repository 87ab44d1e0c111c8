//! Inter-task communication channels
//!
//! The scan engine shares its state through `ScanShared`; the signals here
//! only connect background tasks with each other.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use rowscan_core::schedule::IntervalMode;

/// Interval mode to persist (sent after the user changes it)
pub static MODE_SAVE: Signal<CriticalSectionRawMutex, IntervalMode> = Signal::new();
