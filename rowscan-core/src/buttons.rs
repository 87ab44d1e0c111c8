//! Button sampler
//!
//! Buttons share the row-select lines with the matrix: a button wired to
//! row `k` pulls the common sense line while row `k` is selected. One sample
//! per scan cycle goes into bit `k` of the bitmap. Debouncing is left to the
//! reader, which polls the bitmap at a coarse interval.

use portable_atomic::{AtomicU32, Ordering};

/// Raw per-row button bits
#[derive(Debug, Default)]
pub struct ButtonBitmap {
    bits: AtomicU32,
}

impl ButtonBitmap {
    /// All buttons released
    pub const fn new() -> Self {
        Self {
            bits: AtomicU32::new(0),
        }
    }

    /// Store the sample taken while `row` was selected
    ///
    /// Only the scan interrupt calls this, so a plain load/store pair is
    /// enough.
    pub fn record(&self, row: u8, pressed: bool) {
        let Some(mask) = 1u32.checked_shl(u32::from(row)) else {
            return;
        };
        let bits = self.bits.load(Ordering::Relaxed);
        let bits = if pressed { bits | mask } else { bits & !mask };
        self.bits.store(bits, Ordering::Relaxed);
    }

    /// Snapshot of all bits
    pub fn get(&self) -> u32 {
        self.bits.load(Ordering::Relaxed)
    }
}
