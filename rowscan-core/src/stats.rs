//! Scan diagnostics

use portable_atomic::{AtomicU32, AtomicU8, Ordering};

use crate::engine::Phase;

const NO_PHASE: u8 = 0xFF;

/// Snapshot of the scan counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OverrunStats {
    /// Timer interrupts taken
    pub interrupts: u32,
    /// Overruns detected (before or after phase work)
    pub overruns: u32,
    /// Phase during which the most recent overrun was detected
    pub last_overrun_phase: Option<Phase>,
}

/// Counters written by the scan interrupt
#[derive(Debug)]
pub struct ScanStats {
    interrupts: AtomicU32,
    overruns: AtomicU32,
    last_overrun_phase: AtomicU8,
}

impl Default for ScanStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanStats {
    /// All counters zero
    pub const fn new() -> Self {
        Self {
            interrupts: AtomicU32::new(0),
            overruns: AtomicU32::new(0),
            last_overrun_phase: AtomicU8::new(NO_PHASE),
        }
    }

    pub(crate) fn count_interrupt(&self) {
        let count = self.interrupts.load(Ordering::Relaxed);
        self.interrupts.store(count.wrapping_add(1), Ordering::Relaxed);
    }

    pub(crate) fn record_overrun(&self, phase: Phase) {
        let count = self.overruns.load(Ordering::Relaxed);
        self.overruns.store(count.wrapping_add(1), Ordering::Relaxed);
        self.last_overrun_phase
            .store(phase.index() as u8, Ordering::Relaxed);
    }

    /// Read all counters
    pub fn snapshot(&self) -> OverrunStats {
        OverrunStats {
            interrupts: self.interrupts.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
            last_overrun_phase: Phase::from_index(self.last_overrun_phase.load(Ordering::Relaxed)),
        }
    }
}
