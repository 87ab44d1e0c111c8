//! Driver brightness clock

/// Profile for the free-running driver PWM clock
///
/// The source clock is divided by `divider`, then one output cycle spans
/// `period` divided ticks at roughly 50% duty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockProfile {
    /// Integer clock divider (1..=255)
    pub divider: u8,
    /// Output period in divided ticks
    pub period: u16,
}

impl ClockProfile {
    /// Output frequency for a given source clock
    pub const fn frequency_hz(&self, source_hz: u32) -> u32 {
        source_hz / (self.divider as u32 * self.period as u32)
    }
}

/// Peripheral emitting the driver chips' brightness clock
///
/// The clock never stops; the slowest profile stands in for "off" so the
/// drivers' internal counters keep running.
pub trait ClockOutput {
    /// Switch the output to `profile`
    fn apply(&mut self, profile: ClockProfile);
}
