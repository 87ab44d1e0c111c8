//! Scan task
//!
//! Stands in for the timer compare interrupt: waits for the deadline the
//! engine armed, then runs one phase. Runs on the interrupt executor, so
//! it preempts every other task.

use embassy_rp::peripherals::DMA_CH1;
use rowscan_core::engine::ScanEngine;
use rowscan_core::framebuffer::{FoldedFrame, FrameBuffers};
use rowscan_drivers::StagedBus;
use rowscan_hal_rp2040::gpio::{InputLine, OutputLine};
use rowscan_hal_rp2040::pwm::PwmClock;
use rowscan_hal_rp2040::shift::PioBurst;
use rowscan_hal_rp2040::timer::ScanTimer;

use crate::board::{FRAME_COLS, FRAME_ROWS};

/// Serial chain on PIO0 SM0 with DMA, row latch on a GPIO
pub type ScanBus = StagedBus<PioBurst<'static, DMA_CH1, 0>, OutputLine<'static>>;

/// Engine with the RP2040 hardware plugged in
pub type Engine = ScanEngine<
    'static,
    ScanBus,
    ScanTimer,
    PwmClock<'static>,
    InputLine<'static>,
    FoldedFrame<'static, FrameBuffers<FRAME_ROWS, FRAME_COLS>>,
>;

#[embassy_executor::task]
pub async fn scan_task(mut engine: Engine) {
    engine.start();

    loop {
        engine.hardware().timer.wait().await;
        engine.on_timer();
    }
}
