//! Periodic scan timer

/// Free-running tick counter with one compare channel
///
/// Ticks wrap at `u32::MAX`; the scheduler only ever compares them with
/// wrapping differences.
pub trait TickTimer {
    /// Current counter value
    fn now(&self) -> u32;

    /// Fire the next interrupt when the counter reaches `tick`
    fn set_compare(&mut self, tick: u32);
}
