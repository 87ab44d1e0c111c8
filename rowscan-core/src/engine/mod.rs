//! Row-scan engine
//!
//! The engine is driven by a single periodic timer interrupt. Each call to
//! [`ScanEngine::on_timer`] reprograms the timer for the next phase and runs
//! exactly one phase of the ring; eight calls scan one row.
//!
//! # Overrun handling
//!
//! Before doing any work the handler checks that the bus is idle and that
//! the current phase can still finish with `safety_margin_ticks` to spare.
//! If not, the phase is skipped and rescheduled whole row intervals later.
//! The same correction runs after the work if the next phase's start has
//! already come too close. Either way the counter in [`OverrunStats`]
//! goes up and the wire protocol stays intact; the only visible effect is a
//! dropped row.
//!
//! [`OverrunStats`]: crate::stats::OverrunStats

pub mod phase;
pub mod shared;
pub mod ticks;

pub use phase::Phase;
pub use shared::{HandlerGuard, ScanShared};

use rowscan_hal::InputPin;

use crate::config::{BoardConfig, ConfigError};
use crate::encode::{send_register, send_row_select, Latch, RowEncoder, OUTPUTS_OFF, OUTPUTS_ON};
use crate::framebuffer::FrameSource;
use crate::gamma::GammaTable;
use crate::schedule::{PhaseSchedule, ResolvedMode};
use crate::traits::{ClockOutput, ShiftBus, TickTimer};

/// Position of the scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanState {
    /// Row currently (or about to be) displayed
    pub row: u8,
    /// Phase the next interrupt runs
    pub phase: Phase,
}

impl ScanState {
    /// State before the first row: the first cycle advances onto row 0
    pub fn initial(config: &BoardConfig) -> Self {
        Self {
            row: config.row_count - 1,
            phase: Phase::Configure,
        }
    }
}

/// Peripherals owned by the engine
pub struct ScanHardware<B, T, C, S> {
    /// Serial chain bus
    pub bus: B,
    /// Scan timer
    pub timer: T,
    /// Driver brightness clock
    pub clock: C,
    /// Button sense line
    pub sense: S,
}

/// Fixed-phase row-scan state machine and its timer scheduler
pub struct ScanEngine<'a, B, T, C, S, F: ?Sized> {
    config: BoardConfig,
    hw: ScanHardware<B, T, C, S>,
    frame: &'a F,
    gamma: &'a GammaTable,
    shared: &'a ScanShared,
    mode: ResolvedMode,
    schedule: &'static PhaseSchedule,
    state: ScanState,
    next_tick: u32,
}

impl<'a, B, T, C, S, F> ScanEngine<'a, B, T, C, S, F>
where
    B: ShiftBus,
    T: TickTimer,
    C: ClockOutput,
    S: InputPin,
    F: FrameSource + ?Sized,
{
    /// Create an engine for a validated board configuration
    ///
    /// Nothing is sent until [`start`](Self::start).
    pub fn new(
        config: BoardConfig,
        hw: ScanHardware<B, T, C, S>,
        frame: &'a F,
        gamma: &'a GammaTable,
        shared: &'a ScanShared,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mode = shared.effective_mode();
        Ok(Self {
            config,
            hw,
            frame,
            gamma,
            shared,
            mode,
            schedule: mode.schedule(),
            state: ScanState::initial(&config),
            next_tick: 0,
        })
    }

    /// Bring the drivers up and arm the first interrupt
    ///
    /// Writes the configuration register with the current contrast, clears
    /// the row selection, enables every output and applies the driver clock.
    pub fn start(&mut self) {
        let chips = self.config.chips_per_row;

        let _ = self.shared.take_mode_change();
        self.set_mode(self.shared.effective_mode());

        let _ = self.shared.contrast.take();
        send_register(&mut self.hw.bus, chips, self.shared.contrast.word(), Latch::Config);
        send_row_select(&mut self.hw.bus, &self.config, None);
        send_register(&mut self.hw.bus, chips, OUTPUTS_ON, Latch::Switch);
        self.hw.bus.wait_idle();

        self.state = ScanState::initial(&self.config);
        self.next_tick = self
            .hw
            .timer
            .now()
            .wrapping_add(u32::from(self.config.start_delay_ticks));
        self.hw.timer.set_compare(self.next_tick);
    }

    /// Timer interrupt entry point
    ///
    /// Bounded and non-blocking apart from short bus waits. Does nothing if
    /// the previous invocation is still running.
    pub fn on_timer(&mut self) {
        let shared = self.shared;
        let Some(_guard) = shared.try_enter() else {
            return;
        };
        shared.stats.count_interrupt();

        let phase = self.state.phase;
        if phase == Phase::Configure {
            if let Some(mode) = shared.take_mode_change() {
                if mode != self.mode {
                    self.set_mode(mode);
                }
            }
        }

        let margin = u32::from(self.config.safety_margin_ticks);
        let interval = self.schedule.total();
        let now = self.hw.timer.now();
        let phase_end = self.next_tick.wrapping_add(self.schedule.duration(phase));

        if self.hw.bus.is_busy() || !ticks::has_margin(phase_end, now, margin) {
            self.next_tick = ticks::catch_up(self.next_tick, now, margin, interval);
            self.hw.timer.set_compare(self.next_tick);
            shared.stats.record_overrun(phase);
            return;
        }

        self.next_tick = phase_end;
        self.hw.timer.set_compare(self.next_tick);
        self.run_phase(phase);
        self.state.phase = phase.next();

        let now = self.hw.timer.now();
        if !ticks::has_margin(self.next_tick, now, margin) {
            self.next_tick = ticks::catch_up(self.next_tick, now, margin, interval);
            self.hw.timer.set_compare(self.next_tick);
            shared.stats.record_overrun(phase);
        }
    }

    fn set_mode(&mut self, mode: ResolvedMode) {
        self.mode = mode;
        self.schedule = mode.schedule();
        self.hw.clock.apply(mode.clock());
    }

    fn run_phase(&mut self, phase: Phase) {
        let chips = self.config.chips_per_row;
        match phase {
            Phase::Configure => {
                if let Some(word) = self.shared.contrast.take() {
                    send_register(&mut self.hw.bus, chips, word, Latch::Config);
                }
            }
            Phase::SampleAndSend => {
                let row = (self.state.row + 1) % self.config.row_count;
                self.state.row = row;
                self.shared.buttons.record(row, self.hw.sense.is_high());
                self.send_group(0);
            }
            Phase::SendGroup1 => self.send_group(1),
            Phase::SendGroup2 => self.send_group(2),
            Phase::Blank => send_register(&mut self.hw.bus, chips, OUTPUTS_OFF, Latch::Switch),
            Phase::SendFinal => self.send_group(3),
            Phase::CommitRow => {
                self.hw.bus.wait_idle();
                self.hw.bus.commit_row();
            }
            Phase::Unblank => send_register(&mut self.hw.bus, chips, OUTPUTS_ON, Latch::Switch),
        }
    }

    fn send_group(&mut self, group: usize) {
        RowEncoder::new(&self.config, self.gamma, self.frame).send_group(
            &mut self.hw.bus,
            self.state.row,
            group,
        );
    }

    /// Current row and next phase
    pub fn scan_state(&self) -> ScanState {
        self.state
    }

    /// Tick of the next scheduled interrupt
    pub fn next_tick(&self) -> u32 {
        self.next_tick
    }

    /// Concrete interval mode in effect
    pub fn mode(&self) -> ResolvedMode {
        self.mode
    }

    /// Access the owned peripherals
    pub fn hardware(&self) -> &ScanHardware<B, T, C, S> {
        &self.hw
    }

    /// Mutably access the owned peripherals
    pub fn hardware_mut(&mut self) -> &mut ScanHardware<B, T, C, S> {
        &mut self.hw
    }
}
