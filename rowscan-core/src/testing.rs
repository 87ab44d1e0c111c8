//! Test doubles for the hardware seams

use std::cell::Cell;

use rowscan_hal::InputPin;

use crate::encode::BusWord;
use crate::framebuffer::FrameSource;
use crate::traits::{ClockOutput, ClockProfile, SelfTestPort, ShiftBus, TickTimer};

/// Everything a [`FakeBus`] was asked to do, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    Begin(u16),
    Word(BusWord),
    WaitIdle,
    RowLatch(bool),
}

/// One recorded transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Word count announced by `begin_transaction`
    pub declared: u16,
    pub words: Vec<BusWord>,
}

/// Recording shift bus
#[derive(Debug, Default)]
pub struct FakeBus {
    events: Vec<BusEvent>,
    busy: bool,
}

impl FakeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report busy until the next `wait_idle`
    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub fn events(&self) -> &[BusEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        let mut out: Vec<Transaction> = Vec::new();
        for event in &self.events {
            match event {
                BusEvent::Begin(declared) => out.push(Transaction {
                    declared: *declared,
                    words: Vec::new(),
                }),
                BusEvent::Word(word) => {
                    if let Some(current) = out.last_mut() {
                        current.words.push(*word);
                    }
                }
                _ => {}
            }
        }
        out
    }

    /// Completed row-latch strobes
    pub fn row_commits(&self) -> usize {
        self.events
            .iter()
            .filter(|e| **e == BusEvent::RowLatch(true))
            .count()
    }
}

impl ShiftBus for FakeBus {
    fn begin_transaction(&mut self, words: u16) {
        self.events.push(BusEvent::Begin(words));
    }

    fn write_word(&mut self, word: BusWord) {
        self.events.push(BusEvent::Word(word));
    }

    fn is_busy(&self) -> bool {
        self.busy
    }

    fn wait_idle(&mut self) {
        self.busy = false;
        self.events.push(BusEvent::WaitIdle);
    }

    fn set_row_latch(&mut self, high: bool) {
        self.events.push(BusEvent::RowLatch(high));
    }
}

/// Tick timer with a hand-driven clock
#[derive(Debug, Default)]
pub struct FakeTimer {
    pub now: u32,
    pub compares: Vec<u32>,
    /// Ticks the clock moves on after every compare write (simulated work)
    pub drift_per_compare: u32,
}

impl FakeTimer {
    pub fn starting_at(now: u32) -> Self {
        Self {
            now,
            ..Self::default()
        }
    }

    /// Advance the clock to the armed compare value
    pub fn fire(&mut self) {
        if let Some(&tick) = self.compares.last() {
            self.now = tick;
        }
    }
}

impl TickTimer for FakeTimer {
    fn now(&self) -> u32 {
        self.now
    }

    fn set_compare(&mut self, tick: u32) {
        self.compares.push(tick);
        self.now = self.now.wrapping_add(self.drift_per_compare);
    }
}

/// Clock output recording every applied profile
#[derive(Debug, Default)]
pub struct FakeClock {
    pub applied: Vec<ClockProfile>,
}

impl ClockOutput for FakeClock {
    fn apply(&mut self, profile: ClockProfile) {
        self.applied.push(profile);
    }
}

/// Sense line driven from the test body
#[derive(Clone, Copy)]
pub struct SharedSense<'a>(pub &'a Cell<bool>);

impl InputPin for SharedSense<'_> {
    fn is_high(&self) -> bool {
        self.0.get()
    }
}

/// Frame computed from a function of (row, col)
pub struct GridFrame {
    cols: usize,
    pixels: Vec<u8>,
}

impl GridFrame {
    pub fn new(rows: usize, cols: usize, f: impl Fn(u8, u16) -> u8) -> Self {
        let mut pixels = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                pixels.push(f(row as u8, col as u16));
            }
        }
        Self { cols, pixels }
    }

    pub fn constant(rows: usize, cols: usize, level: u8) -> Self {
        Self::new(rows, cols, |_, _| level)
    }
}

impl FrameSource for GridFrame {
    fn level(&self, row: u8, col: u16) -> u8 {
        let col = usize::from(col);
        if col >= self.cols {
            return 0;
        }
        self.pixels
            .get(usize::from(row) * self.cols + col)
            .copied()
            .unwrap_or(0)
    }
}

/// Serial chain simulated as a shift register of `len` bits
///
/// The data pin feeds bit 0; the released pin reads the last bit.
pub struct LoopbackChain {
    bits: Vec<bool>,
    data: bool,
    driving: bool,
    /// Chain position forced to read as this value (simulates a broken link)
    pub stuck: Option<(usize, bool)>,
}

impl LoopbackChain {
    pub fn new(len: usize) -> Self {
        Self {
            bits: vec![false; len],
            data: false,
            driving: true,
            stuck: None,
        }
    }
}

impl SelfTestPort for LoopbackChain {
    fn drive_data(&mut self, high: bool) {
        self.driving = true;
        self.data = high;
    }

    fn release_data(&mut self) {
        self.driving = false;
    }

    fn sample_data(&mut self) -> bool {
        self.bits.last().copied().unwrap_or(false)
    }

    fn pulse_clock(&mut self) {
        let input = if self.driving { self.data } else { false };
        self.bits.rotate_right(1);
        if let Some(first) = self.bits.first_mut() {
            *first = input;
        }
        if let Some((position, level)) = self.stuck {
            if let Some(bit) = self.bits.get_mut(position) {
                *bit = level;
            }
        }
    }
}
