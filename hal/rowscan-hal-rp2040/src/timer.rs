//! Scan timer on the embassy time driver
//!
//! The RP2040 time driver counts microseconds in 64 bits; the scan engine
//! works on the low 32 bits. A scan task awaits [`ScanTimer::wait`] and
//! calls the engine's timer entry point, standing in for a compare
//! interrupt.

use embassy_time::{Instant, Timer};
use rowscan_core::engine::ticks;
use rowscan_core::traits::TickTimer;

// Schedules are written in microseconds
const _: () = assert!(embassy_time::TICK_HZ == 1_000_000);

/// One-shot compare on the 1 MHz system tick
pub struct ScanTimer {
    compare: u32,
}

impl Default for ScanTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanTimer {
    pub const fn new() -> Self {
        Self { compare: 0 }
    }

    /// Armed compare as a full 64-bit instant
    pub fn deadline(&self) -> Instant {
        let now = Instant::now().as_ticks();
        let lead = ticks::lead(self.compare, now as u32);
        Instant::from_ticks(now.wrapping_add_signed(i64::from(lead)))
    }

    /// Wait for the armed compare
    pub async fn wait(&self) {
        Timer::at(self.deadline()).await;
    }
}

impl TickTimer for ScanTimer {
    #[inline]
    fn now(&self) -> u32 {
        Instant::now().as_ticks() as u32
    }

    fn set_compare(&mut self, tick: u32) {
        self.compare = tick;
    }
}
