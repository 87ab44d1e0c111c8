//! Button input task
//!
//! Debounces the scan engine's raw button bitmap and maps presses to
//! display settings:
//!
//! - button 0 cycles the interval mode (persisted)
//! - button 1 steps the contrast

use defmt::*;
use embassy_time::{Duration, Ticker};

use rowscan_core::contrast::MAX_CONTRAST;
use rowscan_core::engine::ScanShared;
use rowscan_core::schedule::IntervalMode;

use crate::channels::MODE_SAVE;

/// Poll period; one full scan cycle is at most 24 rows × 800 us
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Consecutive equal samples before a change is accepted
const STABLE_POLLS: u8 = 3;

/// Contrast change per press
const CONTRAST_STEP: u8 = 8;

const BUTTON_MODE: u32 = 1 << 0;
const BUTTON_CONTRAST: u32 = 1 << 1;

/// Bitmap debouncer
struct Debouncer {
    stable: u32,
    candidate: u32,
    count: u8,
}

impl Debouncer {
    const fn new() -> Self {
        Self {
            stable: 0,
            candidate: 0,
            count: 0,
        }
    }

    /// Feed one raw sample; returns newly pressed bits
    fn update(&mut self, raw: u32) -> u32 {
        if raw != self.candidate {
            self.candidate = raw;
            self.count = 0;
            return 0;
        }
        if self.count < STABLE_POLLS {
            self.count += 1;
            if self.count == STABLE_POLLS {
                let pressed = raw & !self.stable;
                self.stable = raw;
                return pressed;
            }
        }
        0
    }
}

/// Interval mode after `mode` in persisted order, wrapping to Auto
fn next_mode(mode: IntervalMode) -> IntervalMode {
    IntervalMode::from_persisted((mode.to_persisted() + 1) % 5).unwrap_or_default()
}

#[embassy_executor::task]
pub async fn input_task(shared: &'static ScanShared) {
    let mut ticker = Ticker::every(POLL_INTERVAL);
    let mut debouncer = Debouncer::new();

    loop {
        ticker.next().await;

        let pressed = debouncer.update(shared.buttons());

        if pressed & BUTTON_MODE != 0 {
            let mode = next_mode(shared.interval_mode());
            shared.set_interval_mode(mode);
            MODE_SAVE.signal(mode);
            info!("Interval mode -> {:?}", mode);
        }

        if pressed & BUTTON_CONTRAST != 0 {
            let next = (shared.contrast() + CONTRAST_STEP) % (MAX_CONTRAST + 1);
            let applied = shared.set_contrast(next);
            info!("Contrast -> {}", applied);
        }
    }
}
