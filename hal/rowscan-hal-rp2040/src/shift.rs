//! PIO shift-out of bus words, fed by DMA
//!
//! One PIO0 state machine turns each 32-bit bus word into 16 slots: the
//! top two bits of the shift register go to LE and SER, and the shift
//! clock rises on the side-set pin. After the last slot LE and SER drop,
//! which executes the driver latch. A DMA channel paced by the state
//! machine's TX request feeds the words from a static staging buffer.
//!
//! Activity is the DMA busy bit, a non-empty TX FIFO, or the state
//! machine's idle flag still clear. The program raises that flag only
//! when it finds the FIFO empty after a word, so the flag covers the
//! word still in the shift register.
//!
//! LE and SER must be consecutive GPIOs (LE first).

use core::sync::atomic::{compiler_fence, Ordering};

use embassy_rp::dma::Channel;
use embassy_rp::gpio::Level;
use embassy_rp::pac;
use embassy_rp::pac::dma::vals::{DataSize, TreqSel};
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::{
    Common, Config, Direction, FifoJoin, PioPin, ShiftConfig, ShiftDirection, StateMachine,
    StatusSource,
};
use embassy_rp::Peri;
use fixed::types::U24F8;
use rowscan_core::config::MAX_TRANSACTION_WORDS;
use rowscan_hal::BurstOutput;

/// System clocks per PIO cycle; two PIO cycles per shift clock
pub const PIO_CLOCK_DIVIDER: u8 = 3;

/// Staging buffer large enough for any transaction
pub type BurstBuffer = [u32; MAX_TRANSACTION_WORDS];

/// Background word output on a PIO0 state machine and a DMA channel
pub struct PioBurst<'d, D: Channel, const SM: usize> {
    /// Kept so the state machine stays enabled
    _sm: StateMachine<'d, PIO0, SM>,
    dma: Peri<'d, D>,
    buffer: &'d mut BurstBuffer,
}

impl<'d, D: Channel, const SM: usize> PioBurst<'d, D, SM> {
    /// Load the shift program and start the state machine, idle
    ///
    /// # Arguments
    /// * `common` - PIO0 common resources (for loading the program)
    /// * `sm` - State machine to use
    /// * `clock` - Shift clock (side-set)
    /// * `latch` - LE; `data` (SER) must be the next GPIO
    /// * `dma` - Channel moving words into the TX FIFO
    /// * `buffer` - Staging buffer the DMA reads from
    pub fn new<CLK: PioPin, LE: PioPin, SER: PioPin>(
        common: &mut Common<'d, PIO0>,
        mut sm: StateMachine<'d, PIO0, SM>,
        clock: Peri<'d, CLK>,
        latch: Peri<'d, LE>,
        data: Peri<'d, SER>,
        dma: Peri<'d, D>,
        buffer: &'d mut BurstBuffer,
    ) -> Self {
        let prg = pio::pio_asm!(
            ".side_set 1",
            ".wrap_target",
            "    mov y, status      side 0", // all ones while the TX FIFO is empty
            "    jmp !y word        side 0",
            "    irq set 0 rel      side 0", // idle
            "word:",
            "    pull block         side 0",
            "    irq clear 0 rel    side 0",
            "    set x, 15          side 0",
            "slot:",
            "    out pins, 2        side 0", // SER, LE
            "    jmp x-- slot       side 1", // rising shift clock
            "    mov pins, null     side 0", // LE low executes the latch
            ".wrap"
        );
        let installed = common.load_program(&prg.program);

        let clock = common.make_pio_pin(clock);
        let latch = common.make_pio_pin(latch);
        let data = common.make_pio_pin(data);

        let mut cfg = Config::default();
        cfg.use_program(&installed, &[&clock]);
        cfg.set_out_pins(&[&latch, &data]);
        cfg.shift_out = ShiftConfig {
            auto_fill: false,
            threshold: 32,
            direction: ShiftDirection::Left,
        };
        cfg.fifo_join = FifoJoin::TxOnly;
        cfg.status_sel = StatusSource::TxFifoLevel;
        cfg.status_n = 1;
        cfg.clock_divider = U24F8::from_num(PIO_CLOCK_DIVIDER);

        sm.set_config(&cfg);
        sm.set_pins(Level::Low, &[&clock, &latch, &data]);
        sm.set_pin_dirs(Direction::Out, &[&clock, &latch, &data]);
        sm.set_enable(true);

        Self {
            _sm: sm,
            dma,
            buffer,
        }
    }

    fn idle_flag() -> u8 {
        1 << SM
    }

    fn channel(&self) -> pac::dma::Channel {
        pac::DMA.ch(usize::from(self.dma.number()))
    }
}

impl<D: Channel, const SM: usize> BurstOutput for PioBurst<'_, D, SM> {
    fn buffer(&mut self) -> &mut [u32] {
        &mut self.buffer[..]
    }

    fn start(&mut self, len: usize) {
        let len = len.min(self.buffer.len());
        if len == 0 {
            return;
        }

        // Raised again by the program once the last word has left
        pac::PIO0.irq().write(|w| w.set_irq(Self::idle_flag()));

        let ch = self.channel();
        ch.read_addr().write_value(self.buffer.as_ptr() as u32);
        ch.write_addr()
            .write_value(pac::PIO0.txf(SM).as_ptr() as u32);
        ch.trans_count().write_value(len as u32);

        // Staged words must be in memory before the channel reads them
        compiler_fence(Ordering::SeqCst);

        ch.ctrl_trig().write(|w| {
            w.set_data_size(DataSize::SIZE_WORD);
            w.set_incr_read(true);
            w.set_incr_write(false);
            w.set_treq_sel(TreqSel(SM as u8));
            w.set_irq_quiet(true);
            w.set_chain_to(self.dma.number());
            w.set_en(true);
        });
        compiler_fence(Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        let pio = pac::PIO0;
        self.channel().ctrl_trig().read().busy()
            || pio.fstat().read().txempty() & Self::idle_flag() == 0
            || pio.irq().read().irq() & Self::idle_flag() == 0
    }
}
