//! GPIO pin abstractions
//!
//! Provides traits for digital input and output pins that can be implemented
//! by chip-specific HALs. The row latch strobe and the button sense line are
//! used from the scan interrupt, so implementations must be cheap.

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Emit one high-then-low pulse
    fn pulse(&mut self) {
        self.set_high();
        self.set_low();
    }
}

/// Digital input pin
///
/// Implementations should handle the actual hardware register reading
/// for the specific chip.
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// Pin that can be used for both input and output
pub trait IoPin: OutputPin + InputPin {}

// Blanket implementation for types that implement both traits
impl<T: OutputPin + InputPin> IoPin for T {}

/// Pin whose direction can be switched at runtime
///
/// The serial data line doubles as the loopback input during the start-up
/// chain test: it is driven while shifting and released to read back the
/// far end of the chain.
pub trait DirectionalPin: IoPin {
    /// Drive the pin (output mode)
    fn set_as_output(&mut self);

    /// Release the pin (input mode, high impedance)
    fn set_as_input(&mut self);
}
