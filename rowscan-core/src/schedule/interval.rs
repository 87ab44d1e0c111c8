//! Interval modes
//!
//! An interval mode picks both the phase schedule and the driver clock
//! profile. The three active modes shift the clock's harmonics around so
//! one of them can be chosen per radio channel; `Off` slows the clock to a
//! minimal rate instead of stopping it.

use super::{PhaseSchedule, MODE0, MODE1, MODE2, OFF};
use crate::traits::ClockProfile;

/// Requested interval mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum IntervalMode {
    /// Pick from the radio channel via [`CHANNEL_CALIBRATION`]
    #[default]
    Auto = 0,
    Mode0 = 1,
    Mode1 = 2,
    Mode2 = 3,
    /// Minimal-rate driver clock
    Off = 4,
}

/// Concrete mode after resolving [`IntervalMode::Auto`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResolvedMode {
    Mode0,
    Mode1,
    Mode2,
    Off,
}

/// Mode chosen by `Auto` for radio channels 1..=14 (index 0 is "no channel")
///
/// Measured on the reference board; re-measure when the radio module or the
/// board layout changes.
pub const CHANNEL_CALIBRATION: [ResolvedMode; 15] = [
    ResolvedMode::Mode0,
    ResolvedMode::Mode2,
    ResolvedMode::Mode2,
    ResolvedMode::Mode1,
    ResolvedMode::Mode1,
    ResolvedMode::Mode0,
    ResolvedMode::Mode0,
    ResolvedMode::Mode2,
    ResolvedMode::Mode2,
    ResolvedMode::Mode1,
    ResolvedMode::Mode1,
    ResolvedMode::Mode0,
    ResolvedMode::Mode0,
    ResolvedMode::Mode2,
    ResolvedMode::Mode1,
];

impl IntervalMode {
    /// Decode the persisted integer form; unknown values yield `None`
    pub const fn from_persisted(value: u8) -> Option<Self> {
        match value {
            0 => Some(IntervalMode::Auto),
            1 => Some(IntervalMode::Mode0),
            2 => Some(IntervalMode::Mode1),
            3 => Some(IntervalMode::Mode2),
            4 => Some(IntervalMode::Off),
            _ => None,
        }
    }

    /// Integer form written to settings storage
    pub const fn to_persisted(self) -> u8 {
        self as u8
    }

    /// Resolve to a concrete mode for the given radio channel
    pub fn resolve(self, channel: u8) -> ResolvedMode {
        match self {
            IntervalMode::Auto => CHANNEL_CALIBRATION
                .get(usize::from(channel))
                .copied()
                .unwrap_or(ResolvedMode::Mode0),
            IntervalMode::Mode0 => ResolvedMode::Mode0,
            IntervalMode::Mode1 => ResolvedMode::Mode1,
            IntervalMode::Mode2 => ResolvedMode::Mode2,
            IntervalMode::Off => ResolvedMode::Off,
        }
    }
}

impl ResolvedMode {
    /// All concrete modes
    pub const ALL: [ResolvedMode; 4] = [
        ResolvedMode::Mode0,
        ResolvedMode::Mode1,
        ResolvedMode::Mode2,
        ResolvedMode::Off,
    ];

    /// Phase schedule for this mode
    pub fn schedule(self) -> &'static PhaseSchedule {
        match self {
            ResolvedMode::Mode0 => &MODE0,
            ResolvedMode::Mode1 => &MODE1,
            ResolvedMode::Mode2 => &MODE2,
            ResolvedMode::Off => &OFF,
        }
    }

    /// Driver clock profile for this mode
    pub fn clock(self) -> ClockProfile {
        match self {
            ResolvedMode::Mode0 => ClockProfile {
                divider: 1,
                period: 6,
            },
            ResolvedMode::Mode1 => ClockProfile {
                divider: 1,
                period: 7,
            },
            ResolvedMode::Mode2 => ClockProfile {
                divider: 1,
                period: 8,
            },
            ResolvedMode::Off => ClockProfile {
                divider: 250,
                period: 250,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_explicit_modes_ignore_channel() {
        for channel in 0..20 {
            assert_eq!(IntervalMode::Mode1.resolve(channel), ResolvedMode::Mode1);
            assert_eq!(IntervalMode::Off.resolve(channel), ResolvedMode::Off);
        }
    }

    #[test]
    fn test_auto_uses_calibration() {
        assert_eq!(IntervalMode::Auto.resolve(1), ResolvedMode::Mode2);
        assert_eq!(IntervalMode::Auto.resolve(3), ResolvedMode::Mode1);
        assert_eq!(IntervalMode::Auto.resolve(14), ResolvedMode::Mode1);
        // Out of table
        assert_eq!(IntervalMode::Auto.resolve(15), ResolvedMode::Mode0);
        assert_eq!(IntervalMode::Auto.resolve(255), ResolvedMode::Mode0);
    }

    #[test]
    fn test_off_clock_is_slowest() {
        let source = 125_000_000;
        let off = ResolvedMode::Off.clock().frequency_hz(source);
        for mode in [ResolvedMode::Mode0, ResolvedMode::Mode1, ResolvedMode::Mode2] {
            assert!(mode.clock().frequency_hz(source) > off * 1000);
        }
        assert_eq!(off, 2000);
    }

    #[test]
    fn test_default_is_auto() {
        assert_eq!(IntervalMode::default(), IntervalMode::Auto);
    }

    proptest! {
        #[test]
        fn prop_persisted_decoding(value in any::<u8>()) {
            match IntervalMode::from_persisted(value) {
                Some(mode) => prop_assert_eq!(mode.to_persisted(), value),
                None => prop_assert!(value > 4),
            }
        }
    }
}
