//! Contrast controller
//!
//! Background code sets the contrast at any time; the scan interrupt picks
//! the change up at its next Configure phase and writes the drivers'
//! configuration register once.

use portable_atomic::{AtomicBool, AtomicU16, AtomicU8, Ordering};

/// Highest contrast (current gain) step
pub const MAX_CONTRAST: u8 = 63;

/// Contrast used until something else is requested
pub const DEFAULT_CONTRAST: u8 = 20;

/// Configuration register: 4096-step PWM counter
pub const CONFIG_PWM_4096: u16 = 1 << 15;

/// Configuration register: high output-current range
pub const CONFIG_HIGH_CURRENT: u16 = 1 << 6;

/// Configuration register word for a contrast step (clamped)
pub const fn config_word(contrast: u8) -> u16 {
    let gain = if contrast > MAX_CONTRAST {
        MAX_CONTRAST
    } else {
        contrast
    };
    CONFIG_PWM_4096 | CONFIG_HIGH_CURRENT | gain as u16
}

/// Single-writer contrast handoff
#[derive(Debug)]
pub struct ContrastState {
    raw: AtomicU8,
    word: AtomicU16,
    changed: AtomicBool,
}

impl Default for ContrastState {
    fn default() -> Self {
        Self::new(DEFAULT_CONTRAST)
    }
}

impl ContrastState {
    /// Start at `initial` with nothing pending
    pub const fn new(initial: u8) -> Self {
        let raw = if initial > MAX_CONTRAST {
            MAX_CONTRAST
        } else {
            initial
        };
        Self {
            raw: AtomicU8::new(raw),
            word: AtomicU16::new(config_word(raw)),
            changed: AtomicBool::new(false),
        }
    }

    /// Request a new contrast, clamped to `0..=63`; returns the stored value
    pub fn set(&self, value: u8) -> u8 {
        let raw = value.min(MAX_CONTRAST);
        self.raw.store(raw, Ordering::Relaxed);
        self.word.store(config_word(raw), Ordering::Relaxed);
        self.changed.store(true, Ordering::Release);
        raw
    }

    /// Current contrast step
    pub fn raw(&self) -> u8 {
        self.raw.load(Ordering::Relaxed)
    }

    /// Current configuration register word
    pub fn word(&self) -> u16 {
        self.word.load(Ordering::Relaxed)
    }

    /// Whether a change is waiting for the next Configure phase
    pub fn is_changed(&self) -> bool {
        self.changed.load(Ordering::Acquire)
    }

    /// Consume a pending change, returning the word to write
    pub fn take(&self) -> Option<u16> {
        if self.changed.swap(false, Ordering::Acquire) {
            Some(self.word())
        } else {
            None
        }
    }
}
