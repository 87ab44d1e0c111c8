//! Status LED fault blinker
//!
//! Plays a [`PanicCode`] blink pattern on a plain GPIO LED. Used only after
//! a fatal start-up fault, so it blocks on a delay provider instead of
//! going through the async runtime.

use embedded_hal::delay::DelayNs;
use rowscan_core::fault::PanicCode;
use rowscan_hal::OutputPin;

/// Single status LED
pub struct StatusLed<P> {
    pin: P,
    /// If true, LED on = pin low
    inverted: bool,
}

impl<P: OutputPin> StatusLed<P> {
    /// Create the LED, initially off
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut led = Self { pin, inverted };
        led.set(false);
        led
    }

    /// Switch the LED
    pub fn set(&mut self, on: bool) {
        self.pin.set_state(on != self.inverted);
    }

    /// Check whether the LED is lit
    pub fn is_on(&self) -> bool {
        self.pin.is_set_high() != self.inverted
    }

    /// Play one cycle of the blink pattern for `code`
    pub fn blink_code<D: DelayNs>(&mut self, code: PanicCode, delay: &mut D) {
        for step in code.pattern() {
            self.set(step.on);
            delay.delay_ms(step.duration_ms);
        }
    }

    /// Blink `code` forever
    pub fn halt<D: DelayNs>(&mut self, code: PanicCode, delay: &mut D) -> ! {
        loop {
            self.blink_code(code, delay);
        }
    }
}
