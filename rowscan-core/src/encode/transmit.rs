//! Transaction builders
//!
//! Chain layout, as seen from the data pin:
//!
//! ```text
//! MCU -> chip 0 -> chip 1 -> ... -> chip N-1 -> row register(s)
//! ```
//!
//! The first word shifted travels farthest, so every transaction starts with
//! the farthest chip's word and ends with chip 0's. LE is shared by all
//! chips, so asserting it during the last word latches the whole chain at
//! once.

use core::ops::Range;

use super::word::{BusWord, Latch, SLOTS};
use crate::config::BoardConfig;
use crate::framebuffer::FrameSource;
use crate::gamma::GammaTable;
use crate::traits::ShiftBus;

/// Write the same 16-bit value into one register of every chip
pub fn send_register<B: ShiftBus>(bus: &mut B, chips: u8, value: u16, latch: Latch) {
    let word = BusWord::from_data(value);
    bus.begin_transaction(u16::from(chips));
    for chip in (0..chips).rev() {
        if chip == 0 {
            bus.write_word(word.with_latch(latch));
        } else {
            bus.write_word(word);
        }
    }
}

/// Word `index` of the row-select pattern
///
/// The pattern fills `config.row_words()` words. Leading slots are padding
/// that falls off the end of the row registers; slot `padding + r` is high
/// iff `r == row`. `None` selects no row.
pub fn row_pattern_word(config: &BoardConfig, row: Option<u8>, index: u16) -> BusWord {
    let slots = config.row_words() * u16::from(SLOTS);
    let padding = slots - u16::from(config.row_count);

    match row {
        Some(row) if row < config.row_count => {
            let position = padding + u16::from(row);
            if position / u16::from(SLOTS) == index {
                BusWord::from_data(0x8000 >> (position % u16::from(SLOTS)))
            } else {
                BusWord::ZERO
            }
        }
        _ => BusWord::ZERO,
    }
}

/// Shift a row selection all the way into the row registers
///
/// Used outside the scan ring: the pattern is followed by one blank word
/// per chip (no latch) so it clears the driver chain. Strobes the row latch
/// when done.
pub fn send_row_select<B: ShiftBus>(bus: &mut B, config: &BoardConfig, row: Option<u8>) {
    let row_words = config.row_words();
    bus.begin_transaction(row_words + u16::from(config.chips_per_row));
    for index in 0..row_words {
        bus.write_word(row_pattern_word(config, row, index));
    }
    for _ in 0..config.chips_per_row {
        bus.write_word(BusWord::ZERO);
    }
    bus.wait_idle();
    bus.commit_row();
}

/// Encodes frame rows into data-group transactions
pub struct RowEncoder<'a, F: ?Sized> {
    config: &'a BoardConfig,
    gamma: &'a GammaTable,
    frame: &'a F,
}

impl<'a, F: FrameSource + ?Sized> RowEncoder<'a, F> {
    pub fn new(config: &'a BoardConfig, gamma: &'a GammaTable, frame: &'a F) -> Self {
        Self {
            config,
            gamma,
            frame,
        }
    }

    /// Driver channel loaded by round `round`
    pub fn channel(&self, round: u8) -> u8 {
        self.config.channels_per_chip - 1 - round
    }

    /// Latch command closing round `round`
    pub fn round_latch(&self, round: u8) -> Latch {
        if round + 1 == self.config.channels_per_chip {
            Latch::Global
        } else {
            Latch::Data
        }
    }

    /// Bus word for one chip in one round, latch included on chip 0
    pub fn word(&self, row: u8, round: u8, chip: u8) -> BusWord {
        let channel = self.channel(round);
        let col = u16::from(chip) * u16::from(self.config.channels_per_chip) + u16::from(channel);
        let word = self.gamma.encode(self.frame.level(row, col));
        if chip == 0 {
            word.with_latch(self.round_latch(round))
        } else {
            word
        }
    }

    /// Whether `rounds` ends the row (and so carries the row selection)
    pub fn ends_row(&self, rounds: &Range<u8>) -> bool {
        rounds.end == self.config.channels_per_chip
    }

    /// Number of bus words `rounds` occupies
    pub fn transaction_words(&self, rounds: &Range<u8>) -> u16 {
        let data = u16::from(rounds.end - rounds.start) * u16::from(self.config.chips_per_row);
        if self.ends_row(rounds) {
            data + self.config.row_words()
        } else {
            data
        }
    }

    /// Send data group `group` of `row` as one transaction
    ///
    /// The group that ends the row is preceded by the row-select pattern, so
    /// its final round pushes the pattern exactly into the row registers.
    pub fn send_group<B: ShiftBus>(&self, bus: &mut B, row: u8, group: usize) {
        let rounds = self.config.group_rounds(group);
        bus.begin_transaction(self.transaction_words(&rounds));

        if self.ends_row(&rounds) {
            for index in 0..self.config.row_words() {
                bus.write_word(row_pattern_word(self.config, Some(row), index));
            }
        }

        for round in rounds {
            for chip in (0..self.config.chips_per_row).rev() {
                bus.write_word(self.word(row, round, chip));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{BusEvent, FakeBus, GridFrame};

    fn words_of(bus: &FakeBus) -> Vec<Vec<BusWord>> {
        bus.transactions().into_iter().map(|t| t.words).collect()
    }

    #[test]
    fn test_register_latch_on_last_word_only() {
        let mut bus = FakeBus::new();
        send_register(&mut bus, 4, 0x8040, Latch::Config);

        let words = words_of(&bus);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].len(), 4);
        for word in &words[0][..3] {
            assert_eq!(word.latch(), Some(Latch::None));
            assert_eq!(word.data(), 0x8040);
        }
        assert_eq!(words[0][3].latch(), Some(Latch::Config));
        assert_eq!(words[0][3].data(), 0x8040);
    }

    #[test]
    fn test_row_pattern_one_hot() {
        let config = BoardConfig::CANONICAL;
        // 24 rows in two words: 8 padding slots, then rows 0..24
        assert_eq!(row_pattern_word(&config, Some(0), 0).data(), 0x0080);
        assert_eq!(row_pattern_word(&config, Some(0), 1).data(), 0x0000);
        assert_eq!(row_pattern_word(&config, Some(7), 0).data(), 0x0001);
        assert_eq!(row_pattern_word(&config, Some(8), 1).data(), 0x8000);
        assert_eq!(row_pattern_word(&config, Some(23), 1).data(), 0x0001);

        for index in 0..2 {
            assert_eq!(row_pattern_word(&config, None, index), BusWord::ZERO);
            assert_eq!(row_pattern_word(&config, Some(24), index), BusWord::ZERO);
        }
    }

    #[test]
    fn test_row_select_pushes_through_chain() {
        let config = BoardConfig::CANONICAL;
        let mut bus = FakeBus::new();
        send_row_select(&mut bus, &config, None);

        let words = words_of(&bus);
        assert_eq!(words[0].len(), 2 + 8);
        assert!(words[0].iter().all(|w| *w == BusWord::ZERO));
        assert_eq!(bus.row_commits(), 1);
        assert_eq!(bus.events().last(), Some(&BusEvent::RowLatch(false)));
    }

    #[test]
    fn test_column_order() {
        let config = BoardConfig {
            row_count: 2,
            col_count: 32,
            chips_per_row: 2,
            rounds_per_group: [1, 1, 1, 13],
            ..BoardConfig::CANONICAL
        };
        let gamma = GammaTable::new();
        let frame = GridFrame::new(2, 32, |_, col| col as u8 * 8);
        let encoder = RowEncoder::new(&config, &gamma, &frame);

        let mut bus = FakeBus::new();
        encoder.send_group(&mut bus, 1, 0);

        // Round 0 loads channel 15: chip 1 (column 31) first, chip 0 (column 15) last
        let words = words_of(&bus);
        assert_eq!(words[0].len(), 2);
        assert_eq!(words[0][0].data(), gamma.duty(31 * 8));
        assert_eq!(words[0][1].data(), gamma.duty(15 * 8));
        assert_eq!(words[0][1].latch(), Some(Latch::Data));
    }

    #[test]
    fn test_final_group_carries_row_and_global_latch() {
        let config = BoardConfig::CANONICAL;
        let gamma = GammaTable::new();
        let frame = GridFrame::new(24, 128, |row, col| (row as u8) ^ (col as u8));
        let encoder = RowEncoder::new(&config, &gamma, &frame);

        let mut bus = FakeBus::new();
        encoder.send_group(&mut bus, 5, 3);

        let words = &words_of(&bus)[0];
        assert_eq!(words.len(), 2 + 8);
        assert_eq!(words[0], row_pattern_word(&config, Some(5), 0));
        assert_eq!(words[1], row_pattern_word(&config, Some(5), 1));

        // Round 15 loads channel 0
        for (i, word) in words[2..].iter().enumerate() {
            let chip = 7 - i as u16;
            assert_eq!(word.data(), gamma.duty(5 ^ (chip * 16) as u8));
        }
        assert_eq!(words[9].latch(), Some(Latch::Global));
        assert!(words[..9]
            .iter()
            .all(|w| w.latch() == Some(Latch::None)));
    }

    #[test]
    fn test_transaction_sizes() {
        let config = BoardConfig::CANONICAL;
        let gamma = GammaTable::new();
        let frame = GridFrame::new(24, 128, |_, _| 0);
        let encoder = RowEncoder::new(&config, &gamma, &frame);

        assert_eq!(encoder.transaction_words(&config.group_rounds(0)), 40);
        assert_eq!(encoder.transaction_words(&config.group_rounds(3)), 10);
        assert_eq!(encoder.channel(0), 15);
        assert_eq!(encoder.channel(15), 0);
        assert_eq!(encoder.round_latch(14), Latch::Data);
        assert_eq!(encoder.round_latch(15), Latch::Global);
    }
}
