//! Fatal fault codes
//!
//! A fatal fault stops the firmware and blinks the status LED: `N` short
//! blinks, a long pause, forever. The code is chosen so it can be read off
//! the board without a debugger attached.

/// Status LED on-time per blink
pub const BLINK_ON_MS: u32 = 250;

/// Status LED off-time between blinks
pub const BLINK_OFF_MS: u32 = 250;

/// Pause after each group of blinks
pub const PAUSE_MS: u32 = 2000;

/// Unrecoverable start-up faults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PanicCode {
    /// Serial chain loopback mismatch
    ChainLoopback = 1,
    /// Board configuration rejected
    BoardConfig = 2,
}

impl PanicCode {
    /// Number of blinks per group
    pub const fn blinks(self) -> u8 {
        self as u8
    }

    /// Short description for the log
    pub const fn message(self) -> &'static str {
        match self {
            PanicCode::ChainLoopback => "serial chain loopback mismatch",
            PanicCode::BoardConfig => "invalid board configuration",
        }
    }

    /// One cycle of the blink pattern
    pub fn pattern(self) -> BlinkPattern {
        BlinkPattern {
            blinks: self.blinks(),
            step: 0,
        }
    }
}

/// One LED level held for a duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BlinkStep {
    pub on: bool,
    pub duration_ms: u32,
}

/// Steps of one blink cycle (iterate again to repeat)
#[derive(Debug, Clone)]
pub struct BlinkPattern {
    blinks: u8,
    step: u16,
}

impl Iterator for BlinkPattern {
    type Item = BlinkStep;

    fn next(&mut self) -> Option<BlinkStep> {
        let blink_steps = u16::from(self.blinks) * 2;
        let step = self.step;
        if step > blink_steps {
            return None;
        }
        self.step += 1;

        Some(if step == blink_steps {
            BlinkStep {
                on: false,
                duration_ms: PAUSE_MS,
            }
        } else if step % 2 == 0 {
            BlinkStep {
                on: true,
                duration_ms: BLINK_ON_MS,
            }
        } else {
            BlinkStep {
                on: false,
                duration_ms: BLINK_OFF_MS,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_shape() {
        let steps: Vec<BlinkStep> = PanicCode::BoardConfig.pattern().collect();
        assert_eq!(steps.len(), 5);
        assert_eq!(steps.iter().filter(|s| s.on).count(), 2);
        assert_eq!(
            steps.last(),
            Some(&BlinkStep {
                on: false,
                duration_ms: PAUSE_MS
            })
        );
    }

    #[test]
    fn test_codes_are_distinct() {
        let one: u32 = PanicCode::ChainLoopback
            .pattern()
            .map(|s| s.duration_ms)
            .sum();
        let two: u32 = PanicCode::BoardConfig
            .pattern()
            .map(|s| s.duration_ms)
            .sum();
        assert_eq!(one, 500 + PAUSE_MS);
        assert_eq!(two, 1000 + PAUSE_MS);
    }
}
