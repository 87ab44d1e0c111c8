//! LED matrix row-scan firmware
//!
//! Main firmware binary for RP2040 boards driving a multiplexed LED matrix
//! through chained constant-current drivers and a shift-register row stage.
//!
//! Start-up order:
//! 1. Load persisted display settings
//! 2. Bit-bang a test pattern through the chain and halt with a blink code
//!    on a wiring fault
//! 3. Hand the chain pins to the PIO/DMA bus
//! 4. Start the scan engine on a high-priority interrupt executor
//! 5. Spawn the background tasks (input, settings, telemetry, test pattern)

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Flex, Input, Level, Output, Pull};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::Pio;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use rowscan_core::config::MAX_TRANSACTION_WORDS;
use rowscan_core::engine::{ScanEngine, ScanHardware, ScanShared};
use rowscan_core::fault::PanicCode;
use rowscan_core::framebuffer::{FoldedFrame, FrameBuffers};
use rowscan_core::gamma::GammaTable;
use rowscan_core::selftest::run_self_test;
use rowscan_core::settings::{load_settings, SettingsError};
use rowscan_drivers::{BitBangBus, StagedBus, StatusLed};
use rowscan_hal::FlashError;
use rowscan_hal_rp2040::flash::Rp2040FlashStorage;
use rowscan_hal_rp2040::gpio::{FlexLine, InputLine, OutputLine};
use rowscan_hal_rp2040::pwm::PwmClock;
use rowscan_hal_rp2040::shift::{BurstBuffer, PioBurst};
use rowscan_hal_rp2040::timer::ScanTimer;

use crate::board::{BOARD, CONTRAST, FRAME_COLS, FRAME_ROWS, STATUS_LED_INVERTED};

mod channels;
mod tasks;

/// Board description generated from board.toml
mod board {
    include!(concat!(env!("OUT_DIR"), "/board.rs"));
}

/// Encoded gamma curve, built at compile time
static GAMMA: GammaTable = GammaTable::new();

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
});

/// Double-buffered logical frame; the renderer draws here
static FRAMES: FrameBuffers<FRAME_ROWS, FRAME_COLS> = FrameBuffers::new();

/// The logical frame as the scan reads it
static FOLDED: FoldedFrame<'static, FrameBuffers<FRAME_ROWS, FRAME_COLS>> =
    FoldedFrame::new(&FRAMES, BOARD.row_count, FRAME_COLS as u16);

/// DMA staging buffer for the chain bus
static BURST_BUFFER: StaticCell<BurstBuffer> = StaticCell::new();

/// State shared between the scan task and background tasks
static SHARED: ScanShared = ScanShared::with_contrast(CONTRAST);

/// Executor for the scan task, driven by a software interrupt
static EXECUTOR_SCAN: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_SCAN.on_interrupt()
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("rowscan firmware starting...");

    let mut p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let mut status = StatusLed::new(
        OutputLine::new(Output::new(p.PIN_25, Level::Low)),
        STATUS_LED_INVERTED,
    );
    status.set(true);

    // Persisted interval mode
    let mut storage = Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0);
    match load_settings(&mut storage).await {
        Ok(settings) => match settings.interval_mode() {
            Some(mode) => {
                SHARED.set_interval_mode(mode);
                info!("Loaded interval mode {:?} from flash", mode);
            }
            None => {
                warn!("Ignoring unknown interval mode in flash, using Auto");
            }
        },
        Err(SettingsError::Flash(FlashError::NotFound)) => {
            info!("No settings in flash, using defaults");
        }
        Err(e) => {
            warn!("Failed to load settings ({:?}), using defaults", e);
        }
    }

    // Serial chain: GPIO2 shift clock, GPIO3 LE, GPIO4 SER (+ loopback),
    // GPIO5 row latch. LE and SER are consecutive for the PIO out pins.
    {
        let mut chain = BitBangBus::new(
            FlexLine::new(Flex::new(p.PIN_4.reborrow())),
            OutputLine::new(Output::new(p.PIN_2.reborrow(), Level::Low)),
            OutputLine::new(Output::new(p.PIN_3.reborrow(), Level::Low)),
        );

        if let Err(e) = run_self_test(&mut chain, BOARD.chain_bits()) {
            error!(
                "Chain self-test failed: {} of {} bits wrong, first at {}",
                e.mismatches,
                e.chain_bits,
                e.positions.as_slice()
            );
            error!("{}", PanicCode::ChainLoopback.message());
            status.halt(PanicCode::ChainLoopback, &mut Delay);
        }
    }
    info!("Chain self-test passed ({} bits)", BOARD.chain_bits());

    // Hand the chain pins to PIO0 SM0, fed by DMA channel 1
    let Pio {
        mut common, sm0, ..
    } = Pio::new(p.PIO0, Irqs);
    let burst = PioBurst::new(
        &mut common,
        sm0,
        p.PIN_2,
        p.PIN_3,
        p.PIN_4,
        p.DMA_CH1,
        BURST_BUFFER.init([0; MAX_TRANSACTION_WORDS]),
    );
    let bus = StagedBus::new(burst, OutputLine::new(Output::new(p.PIN_5, Level::Low)));

    // Driver brightness clock on GPIO8 (PWM slice 4, channel A)
    let pwm = Pwm::new_output_a(p.PWM_SLICE4, p.PIN_8, PwmConfig::default());

    let hardware = ScanHardware {
        bus,
        timer: ScanTimer::new(),
        clock: PwmClock::new(pwm),
        // Buttons pull the shared sense line high through the selected row
        sense: InputLine::new(Input::new(p.PIN_6, Pull::Down)),
    };

    let engine = match ScanEngine::new(BOARD, hardware, &FOLDED, &GAMMA, &SHARED) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Invalid board configuration: {:?}", e);
            status.halt(PanicCode::BoardConfig, &mut Delay);
        }
    };

    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let scan_spawner = EXECUTOR_SCAN.start(interrupt::SWI_IRQ_1);
    scan_spawner.spawn(tasks::scan_task(engine)).unwrap();
    info!(
        "Scan started: {} rows x {} columns, frame {} x {}",
        BOARD.row_count, BOARD.col_count, FRAME_ROWS, FRAME_COLS
    );
    let mode = SHARED.effective_mode();
    info!(
        "Interval mode {:?}, driver clock {} Hz",
        mode,
        mode.clock().frequency_hz(embassy_rp::clocks::clk_sys_freq())
    );

    spawner.spawn(tasks::settings_task(storage)).unwrap();
    spawner.spawn(tasks::input_task(&SHARED)).unwrap();
    spawner.spawn(tasks::telemetry_task(&SHARED)).unwrap();
    spawner.spawn(tasks::pattern_task(&FRAMES)).unwrap();

    info!("All tasks spawned, firmware running");
    status.set(false);

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
