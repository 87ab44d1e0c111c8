//! Start-up chain self-test
//!
//! Shifts a pseudo-random pattern through the whole chain (driver chips,
//! then row registers) and reads it back on the released data pin. Any
//! mismatch means the chain is broken or miswired; scanning it would only
//! show garbage, so the caller treats this as fatal.

use heapless::Vec;

use crate::traits::SelfTestPort;

/// Mismatch positions kept in a report
pub const MAX_REPORTED: usize = 8;

/// LFSR start state
pub const LFSR_SEED: u16 = 0xACE1;

/// 16-bit Galois LFSR (taps 16, 14, 13, 11)
#[derive(Debug, Clone)]
pub struct Lfsr {
    state: u16,
}

impl Lfsr {
    pub const fn new(seed: u16) -> Self {
        // An all-zero state never leaves zero
        let state = if seed == 0 { LFSR_SEED } else { seed };
        Self { state }
    }

    /// Next output bit
    pub fn next_bit(&mut self) -> bool {
        let out = self.state & 1 != 0;
        self.state >>= 1;
        if out {
            self.state ^= 0xB400;
        }
        out
    }
}

/// Loopback mismatch report
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SelfTestError {
    /// Bits shifted through the chain
    pub chain_bits: u16,
    /// Total mismatching bits
    pub mismatches: u16,
    /// First mismatching bit positions (0 = first bit shifted)
    pub positions: Vec<u16, MAX_REPORTED>,
}

/// Run the loopback test over a chain of `chain_bits` bits
///
/// Leaves the data line driven low.
pub fn run_self_test<P: SelfTestPort>(port: &mut P, chain_bits: u16) -> Result<(), SelfTestError> {
    let mut pattern = Lfsr::new(LFSR_SEED);
    for _ in 0..chain_bits {
        port.drive_data(pattern.next_bit());
        port.pulse_clock();
    }

    port.release_data();

    let mut expected = Lfsr::new(LFSR_SEED);
    let mut mismatches = 0u16;
    let mut positions = Vec::new();
    for position in 0..chain_bits {
        if port.sample_data() != expected.next_bit() {
            mismatches += 1;
            // Only the first few positions are kept
            let _ = positions.push(position);
        }
        port.pulse_clock();
    }

    port.drive_data(false);

    if mismatches == 0 {
        Ok(())
    } else {
        Err(SelfTestError {
            chain_bits,
            mismatches,
            positions,
        })
    }
}
