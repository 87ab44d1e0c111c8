//! Board wiring configuration
//!
//! Several scan-protocol variants differ only in matrix size, chain length
//! and how the per-row transfer is split across phases. They are unified
//! here as one validated configuration struct.

use core::ops::Range;

use crate::schedule::ResolvedMode;

/// Maximum rows (one button bit per row in a `u32` bitmap)
pub const MAX_ROWS: u8 = 32;

/// Maximum driver chips per row
pub const MAX_CHIPS: u8 = 16;

/// Output channels per driver chip (one 16-bit shift word each)
pub const CHANNELS_PER_CHIP: u8 = 16;

/// Number of phases that carry pixel data
pub const DATA_GROUP_COUNT: usize = 4;

/// Upper bound on the words of any single bus transaction
///
/// Every channel round in one group on the longest chain, plus the row
/// pattern for the full row range. Sizes DMA staging buffers.
pub const MAX_TRANSACTION_WORDS: usize =
    CHANNELS_PER_CHIP as usize * MAX_CHIPS as usize + (MAX_ROWS as usize).div_ceil(16);

/// Bits per row-select shift register
const ROW_REGISTER_BITS: u16 = 8;

/// Errors found while validating a [`BoardConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Row count outside 1..=32
    RowCount,
    /// Chip count outside 1..=16
    ChipCount,
    /// Channels per chip is not 16
    ChannelCount,
    /// Column count does not equal chips × channels
    ColumnMismatch,
    /// Data groups are empty or do not cover every channel round
    GroupSplit,
    /// Safety margin is not smaller than every phase duration
    SafetyMargin,
}

/// Board wiring and scan layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardConfig {
    /// Multiplexed rows (row-select shift register outputs)
    pub row_count: u8,
    /// Pixel columns per row
    pub col_count: u16,
    /// Driver chips chained per row
    pub chips_per_row: u8,
    /// Channels per driver chip
    pub channels_per_chip: u8,
    /// Channel rounds sent by each data phase, in phase order
    pub rounds_per_group: [u8; DATA_GROUP_COUNT],
    /// Minimum distance (ticks) the next compare must keep from "now"
    pub safety_margin_ticks: u16,
    /// Delay (ticks) from `start()` to the first scan interrupt
    pub start_delay_ticks: u16,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::CANONICAL
    }
}

impl BoardConfig {
    /// 24 × 128 matrix, eight chips per row
    pub const CANONICAL: Self = Self {
        row_count: 24,
        col_count: 128,
        chips_per_row: 8,
        channels_per_chip: CHANNELS_PER_CHIP,
        rounds_per_group: [5, 5, 5, 1],
        safety_margin_ticks: 4,
        start_delay_ticks: 1000,
    };

    /// Check the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.row_count == 0 || self.row_count > MAX_ROWS {
            return Err(ConfigError::RowCount);
        }
        if self.chips_per_row == 0 || self.chips_per_row > MAX_CHIPS {
            return Err(ConfigError::ChipCount);
        }
        if self.channels_per_chip != CHANNELS_PER_CHIP {
            return Err(ConfigError::ChannelCount);
        }
        if u32::from(self.col_count)
            != u32::from(self.chips_per_row) * u32::from(self.channels_per_chip)
        {
            return Err(ConfigError::ColumnMismatch);
        }

        let rounds: u16 = self.rounds_per_group.iter().map(|&r| u16::from(r)).sum();
        if self.rounds_per_group.contains(&0) || rounds != u16::from(self.channels_per_chip) {
            return Err(ConfigError::GroupSplit);
        }

        let margin = u32::from(self.safety_margin_ticks);
        let tightest = ResolvedMode::ALL
            .iter()
            .map(|mode| mode.schedule().shortest())
            .min()
            .unwrap_or(0);
        if margin >= tightest {
            return Err(ConfigError::SafetyMargin);
        }

        Ok(())
    }

    /// Channel rounds carried by data group `group` (0-based)
    ///
    /// Rounds are numbered in transmit order; round `r` loads channel
    /// `channels_per_chip - 1 - r` of every chip.
    pub fn group_rounds(&self, group: usize) -> Range<u8> {
        let start: u8 = self.rounds_per_group.iter().take(group).sum();
        let len = self.rounds_per_group.get(group).copied().unwrap_or(0);
        start..start + len
    }

    /// Bus words needed to carry the one-hot row pattern
    pub fn row_words(&self) -> u16 {
        u16::from(self.row_count).div_ceil(16)
    }

    /// Words in the longest transaction the scan sends on this board
    ///
    /// Either a data group (the final one also carries the row pattern) or
    /// a full row-select transfer.
    pub fn longest_transaction(&self) -> u16 {
        let chips = u16::from(self.chips_per_row);
        let last = DATA_GROUP_COUNT - 1;
        let longest_group = self
            .rounds_per_group
            .iter()
            .enumerate()
            .map(|(group, &rounds)| {
                let data = u16::from(rounds) * chips;
                if group == last {
                    data + self.row_words()
                } else {
                    data
                }
            })
            .max()
            .unwrap_or(0);
        longest_group.max(self.row_words() + chips)
    }

    /// Total shift-register length from the data pin to the loopback
    ///
    /// Driver chips first, then the row-select registers (8 bits each).
    pub fn chain_bits(&self) -> u16 {
        let driver_bits = u16::from(self.chips_per_row) * u16::from(self.channels_per_chip);
        let row_bits = u16::from(self.row_count).div_ceil(ROW_REGISTER_BITS) * ROW_REGISTER_BITS;
        driver_bits + row_bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_is_valid() {
        assert_eq!(BoardConfig::CANONICAL.validate(), Ok(()));
    }

    #[test]
    fn test_column_mismatch() {
        let config = BoardConfig {
            col_count: 120,
            ..BoardConfig::CANONICAL
        };
        assert_eq!(config.validate(), Err(ConfigError::ColumnMismatch));
    }

    #[test]
    fn test_row_limits() {
        let none = BoardConfig {
            row_count: 0,
            ..BoardConfig::CANONICAL
        };
        assert_eq!(none.validate(), Err(ConfigError::RowCount));

        let too_many = BoardConfig {
            row_count: 33,
            ..BoardConfig::CANONICAL
        };
        assert_eq!(too_many.validate(), Err(ConfigError::RowCount));
    }

    #[test]
    fn test_group_split() {
        let short = BoardConfig {
            rounds_per_group: [4, 4, 4, 1],
            ..BoardConfig::CANONICAL
        };
        assert_eq!(short.validate(), Err(ConfigError::GroupSplit));

        let empty = BoardConfig {
            rounds_per_group: [8, 8, 0, 0],
            ..BoardConfig::CANONICAL
        };
        assert_eq!(empty.validate(), Err(ConfigError::GroupSplit));
    }

    #[test]
    fn test_margin_must_fit_shortest_phase() {
        let config = BoardConfig {
            safety_margin_ticks: 8,
            ..BoardConfig::CANONICAL
        };
        assert_eq!(config.validate(), Err(ConfigError::SafetyMargin));
    }

    #[test]
    fn test_group_rounds() {
        let config = BoardConfig::CANONICAL;
        assert_eq!(config.group_rounds(0), 0..5);
        assert_eq!(config.group_rounds(1), 5..10);
        assert_eq!(config.group_rounds(2), 10..15);
        assert_eq!(config.group_rounds(3), 15..16);
    }

    #[test]
    fn test_chain_lengths() {
        let config = BoardConfig::CANONICAL;
        assert_eq!(config.row_words(), 2);
        // 8 chips × 16 bits + three 8-bit row registers
        assert_eq!(config.chain_bits(), 152);
    }

    #[test]
    fn test_longest_transaction_fits_bound() {
        assert_eq!(BoardConfig::CANONICAL.longest_transaction(), 40);

        // Largest chain with everything but three rounds in the last group
        let widest = BoardConfig {
            row_count: MAX_ROWS,
            col_count: 256,
            chips_per_row: MAX_CHIPS,
            rounds_per_group: [1, 1, 1, 13],
            ..BoardConfig::CANONICAL
        };
        assert_eq!(widest.validate(), Ok(()));
        assert_eq!(widest.longest_transaction(), 13 * 16 + 2);
        assert!(usize::from(widest.longest_transaction()) <= MAX_TRANSACTION_WORDS);
    }
}
