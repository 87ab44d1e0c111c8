//! GPIO wrappers
//!
//! Newtypes over the embassy-rp pin drivers implementing the `rowscan-hal`
//! pin traits.

use embassy_rp::gpio::{Flex, Input, Output};
use rowscan_hal::{DirectionalPin, InputPin, OutputPin};

/// Push-pull output line
pub struct OutputLine<'d>(Output<'d>);

impl<'d> OutputLine<'d> {
    pub fn new(output: Output<'d>) -> Self {
        Self(output)
    }
}

impl OutputPin for OutputLine<'_> {
    #[inline]
    fn set_high(&mut self) {
        self.0.set_high();
    }

    #[inline]
    fn set_low(&mut self) {
        self.0.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.0.is_set_high()
    }
}

/// Input line
pub struct InputLine<'d>(Input<'d>);

impl<'d> InputLine<'d> {
    pub fn new(input: Input<'d>) -> Self {
        Self(input)
    }
}

impl InputPin for InputLine<'_> {
    #[inline]
    fn is_high(&self) -> bool {
        self.0.is_high()
    }
}

/// Line switched between driving and reading at runtime
///
/// Carries SER while shifting and the chain loopback during the self-test.
pub struct FlexLine<'d>(Flex<'d>);

impl<'d> FlexLine<'d> {
    /// Wrap a flex pin; it starts as an output driven low
    pub fn new(mut flex: Flex<'d>) -> Self {
        flex.set_low();
        flex.set_as_output();
        Self(flex)
    }
}

impl OutputPin for FlexLine<'_> {
    #[inline]
    fn set_high(&mut self) {
        self.0.set_high();
    }

    #[inline]
    fn set_low(&mut self) {
        self.0.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.0.is_set_high()
    }
}

impl InputPin for FlexLine<'_> {
    #[inline]
    fn is_high(&self) -> bool {
        self.0.is_high()
    }
}

impl DirectionalPin for FlexLine<'_> {
    fn set_as_output(&mut self) {
        self.0.set_as_output();
    }

    fn set_as_input(&mut self) {
        self.0.set_as_input();
    }
}
