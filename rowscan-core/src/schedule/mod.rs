//! Phase schedules
//!
//! A schedule assigns a tick count to every phase of the ring. Its total is
//! the time to scan one row; the four schedules differ in total length and
//! in the matching driver clock profile.

pub mod interval;

pub use interval::{IntervalMode, ResolvedMode, CHANNEL_CALIBRATION};

use crate::engine::Phase;

/// Tick durations for one pass around the phase ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhaseSchedule {
    durations: [u16; Phase::COUNT],
    total: u32,
}

impl PhaseSchedule {
    /// Create a schedule
    ///
    /// # Panics
    ///
    /// Panics (at compile time for constants) if the durations do not sum
    /// to `total` or a phase has zero length.
    pub const fn new(durations: [u16; Phase::COUNT], total: u32) -> Self {
        let mut sum = 0u32;
        let mut i = 0;
        while i < Phase::COUNT {
            assert!(durations[i] > 0, "phase duration must be non-zero");
            sum += durations[i] as u32;
            i += 1;
        }
        assert!(sum == total, "phase durations must sum to the interval");
        Self { durations, total }
    }

    /// Ticks allotted to `phase`
    #[inline]
    pub fn duration(&self, phase: Phase) -> u32 {
        u32::from(self.durations[phase.index()])
    }

    /// Ticks for one full row
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Per-phase durations in ring order
    pub fn durations(&self) -> &[u16; Phase::COUNT] {
        &self.durations
    }

    /// Shortest phase duration
    pub fn shortest(&self) -> u32 {
        self.durations
            .iter()
            .copied()
            .min()
            .map(u32::from)
            .unwrap_or(0)
    }

    /// Ticks per row during which the LEDs are dark
    pub fn dark_ticks(&self) -> u32 {
        Phase::ALL
            .iter()
            .filter(|phase| phase.is_dark())
            .map(|&phase| self.duration(phase))
            .sum()
    }
}

/// 400-tick row interval
pub const MODE0: PhaseSchedule = PhaseSchedule::new([24, 80, 80, 80, 16, 40, 8, 72], 400);

/// 432-tick row interval
pub const MODE1: PhaseSchedule = PhaseSchedule::new([24, 88, 88, 88, 16, 40, 8, 80], 432);

/// 464-tick row interval
pub const MODE2: PhaseSchedule = PhaseSchedule::new([24, 96, 96, 96, 16, 40, 8, 88], 464);

/// Slow interval used while the driver clock runs at its minimal rate
pub const OFF: PhaseSchedule =
    PhaseSchedule::new([40, 160, 160, 160, 24, 64, 16, 176], 800);
