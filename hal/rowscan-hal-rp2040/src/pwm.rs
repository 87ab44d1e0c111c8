//! PWM driver brightness clock
//!
//! One PWM slice output feeds the drivers' PWCLK input. A profile maps to
//! an integer divider and a wrap value, with the compare at half period.

use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use fixed::FixedU16;
use rowscan_core::traits::{ClockOutput, ClockProfile};

/// Driver clock on a PWM slice (channel A)
pub struct PwmClock<'d> {
    pwm: Pwm<'d>,
}

impl<'d> PwmClock<'d> {
    /// Take over a PWM slice; the output stays idle until the first `apply`
    pub fn new(pwm: Pwm<'d>) -> Self {
        Self { pwm }
    }
}

/// Slice configuration for a profile
pub fn slice_config(profile: ClockProfile) -> PwmConfig {
    let period = profile.period.max(2);
    let mut config = PwmConfig::default();
    config.divider = FixedU16::from_num(profile.divider.max(1));
    config.top = period - 1;
    config.compare_a = period / 2;
    config
}

impl ClockOutput for PwmClock<'_> {
    fn apply(&mut self, profile: ClockProfile) {
        self.pwm.set_config(&slice_config(profile));
    }
}
