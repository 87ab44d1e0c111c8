//! Bus word layout
//!
//! The chain is fed by two lines sampled on the same shift clock: SER (pixel
//! or register data) and LE (driver latch enable). A bus word carries 16
//! clock slots for both lines, interleaved MSB first so that slot `s`
//! (0 = shifted first) sits in bits `31 - 2s` (SER) and `30 - 2s` (LE).

/// SER bits of a bus word
pub const SER_MASK: u32 = 0xAAAA_AAAA;

/// LE bits of a bus word
pub const LE_MASK: u32 = 0x5555_5555;

/// Clock slots per bus word
pub const SLOTS: u8 = 16;

/// Driver latch commands
///
/// A driver chip decodes the command from the number of shift clocks seen
/// while LE is high at the end of a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Latch {
    /// Plain shift, no latch
    None = 0,
    /// Write the output switch register
    Switch = 1,
    /// Move the shift register into one channel's brightness latch
    Data = 3,
    /// Data latch for the last channel, then transfer all latches to PWM
    Global = 5,
    /// Write the configuration register
    Config = 7,
}

impl Latch {
    /// Number of LE clocks for this command
    pub const fn clocks(self) -> u8 {
        self as u8
    }

    /// Decode a clock count back into a command
    pub const fn from_clocks(clocks: u8) -> Option<Self> {
        match clocks {
            0 => Some(Latch::None),
            1 => Some(Latch::Switch),
            3 => Some(Latch::Data),
            5 => Some(Latch::Global),
            7 => Some(Latch::Config),
            _ => None,
        }
    }
}

/// One 16-slot word in the bus's native interleaved layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusWord(pub u32);

impl BusWord {
    /// All lines low for 16 clocks
    pub const ZERO: Self = BusWord(0);

    /// Spread a 16-bit driver word onto the SER slots, LE low
    pub const fn from_data(data: u16) -> Self {
        let mut raw = 0u32;
        let mut bit = 0;
        while bit < 16 {
            if data & (1 << bit) != 0 {
                raw |= 1 << (2 * bit + 1);
            }
            bit += 1;
        }
        BusWord(raw)
    }

    /// Assert LE during the final `latch.clocks()` slots
    pub const fn with_latch(self, latch: Latch) -> Self {
        self.with_latch_clocks(latch.clocks())
    }

    /// Recover the 16-bit driver word from the SER slots
    pub const fn data(self) -> u16 {
        let mut data = 0u16;
        let mut bit = 0;
        while bit < 16 {
            if self.0 & (1 << (2 * bit + 1)) != 0 {
                data |= 1 << bit;
            }
            bit += 1;
        }
        data
    }

    /// Number of slots with LE asserted
    pub const fn latch_clocks(self) -> u8 {
        (self.0 & LE_MASK).count_ones() as u8
    }

    /// Latch command carried by this word, if the LE pattern is well formed
    pub const fn latch(self) -> Option<Latch> {
        let clocks = self.latch_clocks();
        // LE must be a contiguous run at the end of the word
        if self.0 & LE_MASK != BusWord::ZERO.with_latch_clocks(clocks).0 {
            return None;
        }
        Latch::from_clocks(clocks)
    }

    /// SER and LE levels for clock slot `slot` (0 = shifted first)
    pub const fn slot(self, slot: u8) -> (bool, bool) {
        let ser = 31 - 2 * slot as u32;
        let le = ser - 1;
        (self.0 & (1 << ser) != 0, self.0 & (1 << le) != 0)
    }

    const fn with_latch_clocks(self, clocks: u8) -> Self {
        let span = ((1u64 << (2 * clocks as u32)) - 1) as u32;
        BusWord((self.0 & SER_MASK) | (span & LE_MASK))
    }
}
