//! Serial shift bus traits

use crate::encode::BusWord;

/// Synchronous shift-out bus feeding the driver and row-select chain
///
/// One transaction is a run of [`BusWord`]s clocked out back to back. At most
/// one transaction is in flight; implementations that shift in the
/// background (DMA, PIO) report it through [`is_busy`](ShiftBus::is_busy)
/// until its last bit has left.
pub trait ShiftBus {
    /// Start a transaction of `words` bus words
    ///
    /// Waits (bounded) for any previous transaction to finish first.
    fn begin_transaction(&mut self, words: u16);

    /// Push the next word of the current transaction
    fn write_word(&mut self, word: BusWord);

    /// Check whether a transaction is still being shifted out
    fn is_busy(&self) -> bool;

    /// Busy-wait until the bus is idle
    fn wait_idle(&mut self);

    /// Drive the row-select register latch line
    fn set_row_latch(&mut self, high: bool);

    /// Strobe the row-select latch, committing the shifted row pattern
    fn commit_row(&mut self) {
        self.set_row_latch(true);
        self.set_row_latch(false);
    }
}

/// Raw access to the chain for the start-up loopback test
///
/// The data line doubles as the loopback input: it is released between
/// transactions and the far end of the chain is read back on it.
pub trait SelfTestPort {
    /// Drive the data line to `high`
    fn drive_data(&mut self, high: bool);

    /// Stop driving the data line so the chain output can be read
    fn release_data(&mut self);

    /// Sample the (released) data line
    fn sample_data(&mut self) -> bool;

    /// Emit one shift clock pulse
    fn pulse_clock(&mut self);
}
