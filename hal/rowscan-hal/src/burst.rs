//! Background shift-out abstraction
//!
//! A burst output shifts a run of 32-bit words out of its own staging
//! buffer without the CPU, e.g. a PIO state machine fed by DMA. The CPU
//! only stages the words and starts the burst.

/// Word burst shifted out in the background
pub trait BurstOutput {
    /// Staging buffer for the next burst
    ///
    /// Must only be written while [`is_active`](BurstOutput::is_active)
    /// returns false.
    fn buffer(&mut self) -> &mut [u32];

    /// Start shifting out the first `len` words of the staging buffer
    fn start(&mut self, len: usize);

    /// Check whether the last burst is still being shifted out
    ///
    /// Stays true until the final bit has left the output, not just
    /// until the words have been handed to it.
    fn is_active(&self) -> bool;
}
