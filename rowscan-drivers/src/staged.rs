//! Staged shift bus over a background burst output
//!
//! Words of a transaction are staged in the burst output's buffer and
//! handed over as one burst once the announced count is reached. The CPU
//! cost of a data phase is the word encoding only; the shifting itself
//! runs in the background and shows up through [`ShiftBus::is_busy`].
//!
//! The row-select latch is a plain GPIO strobed by the CPU, after the
//! burst carrying the row pattern has drained.

use core::hint::spin_loop;

use rowscan_core::encode::BusWord;
use rowscan_core::traits::ShiftBus;
use rowscan_hal::{BurstOutput, OutputPin};

/// Shift bus staging whole transactions into a [`BurstOutput`]
pub struct StagedBus<O, R> {
    output: O,
    row_latch: R,
    /// Words announced by the current transaction
    declared: usize,
    /// Words staged so far
    staged: usize,
}

impl<O: BurstOutput, R: OutputPin> StagedBus<O, R> {
    /// Create the bus with the row latch low
    pub fn new(output: O, mut row_latch: R) -> Self {
        row_latch.set_low();
        Self {
            output,
            row_latch,
            declared: 0,
            staged: 0,
        }
    }

    /// Hand the staged words to the output
    fn flush(&mut self) {
        if self.staged > 0 {
            self.output.start(self.staged);
        }
        self.staged = 0;
        self.declared = 0;
    }
}

impl<O: BurstOutput, R: OutputPin> ShiftBus for StagedBus<O, R> {
    fn begin_transaction(&mut self, words: u16) {
        self.wait_idle();
        self.declared = usize::from(words);
    }

    fn write_word(&mut self, word: BusWord) {
        // Words past the announced length or the buffer are dropped
        if self.staged >= self.declared {
            return;
        }
        let Some(slot) = self.output.buffer().get_mut(self.staged) else {
            return;
        };
        *slot = word.0;
        self.staged += 1;
        if self.staged == self.declared {
            self.flush();
        }
    }

    fn is_busy(&self) -> bool {
        self.output.is_active()
    }

    fn wait_idle(&mut self) {
        // A short transaction is sent as far as it got
        self.flush();
        while self.output.is_active() {
            spin_loop();
        }
    }

    fn set_row_latch(&mut self, high: bool) {
        self.row_latch.set_state(high);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use core::cell::Cell;
    use rowscan_core::config::BoardConfig;
    use rowscan_core::encode::{send_register, send_row_select, Latch, RowEncoder};
    use rowscan_core::engine::{Phase, ScanEngine, ScanHardware, ScanShared};
    use rowscan_core::framebuffer::FrameSource;
    use rowscan_core::gamma::GammaTable;
    use rowscan_core::traits::{ClockOutput, ClockProfile, TickTimer};
    use rowscan_hal::InputPin;
    use std::rc::Rc;
    use std::vec::Vec;

    static GAMMA: GammaTable = GammaTable::new();

    /// Burst output that stays active for a fixed number of polls
    struct MockBurst {
        buffer: [u32; 64],
        bursts: Vec<Vec<u32>>,
        /// Polls left before the current burst completes
        remaining_polls: Rc<Cell<u32>>,
        polls_per_burst: u32,
        /// Buffer accesses while a burst was still in flight
        touched_while_active: usize,
    }

    impl MockBurst {
        fn new(polls_per_burst: u32) -> Self {
            Self {
                buffer: [0; 64],
                bursts: Vec::new(),
                remaining_polls: Rc::new(Cell::new(0)),
                polls_per_burst,
                touched_while_active: 0,
            }
        }
    }

    impl BurstOutput for MockBurst {
        fn buffer(&mut self) -> &mut [u32] {
            if self.remaining_polls.get() > 0 {
                self.touched_while_active += 1;
            }
            &mut self.buffer
        }

        fn start(&mut self, len: usize) {
            self.bursts.push(self.buffer[..len].to_vec());
            self.remaining_polls.set(self.polls_per_burst);
        }

        fn is_active(&self) -> bool {
            let left = self.remaining_polls.get();
            if left > 0 {
                self.remaining_polls.set(left - 1);
            }
            left > 0
        }
    }

    /// Row latch recording strobes and whether a burst was in flight
    struct MockRowLatch {
        high: bool,
        strobes: usize,
        strobed_while_active: usize,
        remaining_polls: Rc<Cell<u32>>,
    }

    impl OutputPin for MockRowLatch {
        fn set_high(&mut self) {
            if !self.high {
                self.strobes += 1;
                if self.remaining_polls.get() > 0 {
                    self.strobed_while_active += 1;
                }
            }
            self.high = true;
        }
        fn set_low(&mut self) {
            self.high = false;
        }
        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    fn bus(polls_per_burst: u32) -> StagedBus<MockBurst, MockRowLatch> {
        let output = MockBurst::new(polls_per_burst);
        let latch = MockRowLatch {
            high: false,
            strobes: 0,
            strobed_while_active: 0,
            remaining_polls: output.remaining_polls.clone(),
        };
        StagedBus::new(output, latch)
    }

    struct Flat(u8);

    impl FrameSource for Flat {
        fn level(&self, _row: u8, _col: u16) -> u8 {
            self.0
        }
    }

    #[test]
    fn test_data_group_is_one_background_burst() {
        let config = BoardConfig::CANONICAL;
        let frame = Flat(200);
        let mut bus = bus(5);

        RowEncoder::new(&config, &GAMMA, &frame).send_group(&mut bus, 0, 0);

        // Five rounds of eight chips, started only once the last word is staged
        assert_eq!(bus.output.bursts.len(), 1);
        let burst = &bus.output.bursts[0];
        assert_eq!(burst.len(), 40);
        assert_eq!(burst[7], GAMMA.encode(200).with_latch(Latch::Data).0);
        assert_eq!(burst[0], GAMMA.encode(200).0);
        // Still shifting after the CPU returned
        assert!(bus.is_busy());
        assert_eq!(bus.output.touched_while_active, 0);
    }

    #[test]
    fn test_begin_waits_for_previous_burst() {
        let mut bus = bus(50);
        send_register(&mut bus, 8, 0x1234, Latch::Config);
        send_register(&mut bus, 8, 0xFFFF, Latch::Switch);

        assert_eq!(bus.output.bursts.len(), 2);
        assert_eq!(bus.output.touched_while_active, 0);
        let last = BusWord::from_data(0xFFFF).with_latch(Latch::Switch);
        assert_eq!(bus.output.bursts[1][7], last.0);
    }

    #[test]
    fn test_wait_idle_flushes_short_transaction() {
        let mut bus = bus(3);
        bus.begin_transaction(5);
        bus.write_word(BusWord::from_data(1));
        bus.write_word(BusWord::from_data(2));
        assert!(bus.output.bursts.is_empty());

        bus.wait_idle();
        assert_eq!(bus.output.bursts.len(), 1);
        assert_eq!(bus.output.bursts[0].len(), 2);
        assert!(!bus.is_busy());
    }

    #[test]
    fn test_words_beyond_transaction_are_dropped() {
        let mut bus = bus(0);
        bus.begin_transaction(1);
        bus.write_word(BusWord::from_data(1));
        bus.write_word(BusWord::from_data(2));
        assert_eq!(bus.output.bursts, [std::vec![BusWord::from_data(1).0]]);

        // Larger than the staging buffer: the overflow is dropped, the rest sent
        bus.begin_transaction(70);
        for i in 0..70 {
            bus.write_word(BusWord::from_data(i));
        }
        bus.wait_idle();
        assert_eq!(bus.output.bursts.len(), 2);
        assert_eq!(bus.output.bursts[1].len(), 64);
        assert_eq!(bus.output.bursts[1][63], BusWord::from_data(63).0);
    }

    #[test]
    fn test_row_latch_strobed_after_burst_drains() {
        let config = BoardConfig::CANONICAL;
        let mut bus = bus(20);
        send_row_select(&mut bus, &config, Some(3));

        assert_eq!(bus.output.bursts.len(), 1);
        assert_eq!(bus.output.bursts[0].len(), 10);
        assert_eq!(bus.row_latch.strobes, 1);
        assert_eq!(bus.row_latch.strobed_while_active, 0);
        assert!(!bus.row_latch.high);
    }

    struct StillTimer {
        now: u32,
        compare: u32,
    }

    impl TickTimer for StillTimer {
        fn now(&self) -> u32 {
            self.now
        }
        fn set_compare(&mut self, tick: u32) {
            self.compare = tick;
        }
    }

    struct NoClock;

    impl ClockOutput for NoClock {
        fn apply(&mut self, _profile: ClockProfile) {}
    }

    struct Released;

    impl InputPin for Released {
        fn is_high(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_engine_skips_phase_while_burst_in_flight() {
        let config = BoardConfig::CANONICAL;
        let frame = Flat(128);
        let shared = ScanShared::new();
        let hardware = ScanHardware {
            bus: bus(10_000),
            timer: StillTimer { now: 0, compare: 0 },
            clock: NoClock,
            sense: Released,
        };
        let mut engine = ScanEngine::new(config, hardware, &frame, &GAMMA, &shared)
            .expect("canonical board is valid");
        engine.start();

        // Configure, then SampleAndSend hands group 0 to the output
        for _ in 0..2 {
            let hw = engine.hardware_mut();
            hw.timer.now = hw.timer.compare;
            engine.on_timer();
        }
        assert!(engine.hardware().bus.is_busy());
        assert_eq!(shared.stats().overruns, 0);

        // Next phase fires while group 0 is still shifting
        let hw = engine.hardware_mut();
        hw.timer.now = hw.timer.compare;
        engine.on_timer();
        let stats = shared.stats();
        assert_eq!(stats.overruns, 1);
        assert_eq!(stats.last_overrun_phase, Some(Phase::SendGroup1));
    }
}
