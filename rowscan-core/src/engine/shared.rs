//! State shared between the scan interrupt and background code
//!
//! Every field has exactly one writer. Background code owns the contrast and
//! interval requests; the interrupt owns the button bitmap and the counters.
//! No locks: each handoff is a small atomic plus a `changed` flag.

use portable_atomic::{AtomicBool, AtomicU8, Ordering};

use crate::buttons::ButtonBitmap;
use crate::contrast::{ContrastState, DEFAULT_CONTRAST};
use crate::schedule::{IntervalMode, ResolvedMode};
use crate::stats::{OverrunStats, ScanStats};

/// Interval mode request and the inputs `Auto` resolves from
#[derive(Debug)]
struct IntervalRequest {
    requested: AtomicU8,
    channel: AtomicU8,
    quiet: AtomicBool,
    changed: AtomicBool,
}

impl IntervalRequest {
    const fn new() -> Self {
        Self {
            requested: AtomicU8::new(IntervalMode::Auto as u8),
            channel: AtomicU8::new(0),
            quiet: AtomicBool::new(false),
            changed: AtomicBool::new(false),
        }
    }

    fn requested(&self) -> IntervalMode {
        IntervalMode::from_persisted(self.requested.load(Ordering::Relaxed)).unwrap_or_default()
    }

    fn effective(&self) -> ResolvedMode {
        if self.quiet.load(Ordering::Relaxed) {
            ResolvedMode::Off
        } else {
            self.requested()
                .resolve(self.channel.load(Ordering::Relaxed))
        }
    }

    fn mark_changed(&self) {
        self.changed.store(true, Ordering::Release);
    }
}

/// Handle for the scan interrupt's exclusive section
///
/// Dropping it clears the in-handler flag.
pub struct HandlerGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for HandlerGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Engine context visible to the rest of the firmware
///
/// Const-constructible so it can live in a `static`.
#[derive(Debug)]
pub struct ScanShared {
    pub(crate) buttons: ButtonBitmap,
    pub(crate) contrast: ContrastState,
    interval: IntervalRequest,
    pub(crate) stats: ScanStats,
    in_handler: AtomicBool,
}

impl Default for ScanShared {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanShared {
    pub const fn new() -> Self {
        Self::with_contrast(DEFAULT_CONTRAST)
    }

    /// Shared state with a boot contrast other than the default
    pub const fn with_contrast(contrast: u8) -> Self {
        Self {
            buttons: ButtonBitmap::new(),
            contrast: ContrastState::new(contrast),
            interval: IntervalRequest::new(),
            stats: ScanStats::new(),
            in_handler: AtomicBool::new(false),
        }
    }

    /// Raw button bitmap, one bit per row
    pub fn buttons(&self) -> u32 {
        self.buttons.get()
    }

    /// Request a contrast step (clamped to 0..=63); returns the stored value
    pub fn set_contrast(&self, value: u8) -> u8 {
        self.contrast.set(value)
    }

    /// Current contrast step
    pub fn contrast(&self) -> u8 {
        self.contrast.raw()
    }

    /// Request an interval mode, applied at the start of the next row
    pub fn set_interval_mode(&self, mode: IntervalMode) {
        self.interval
            .requested
            .store(mode.to_persisted(), Ordering::Relaxed);
        self.interval.mark_changed();
    }

    /// Request an interval mode by its persisted integer
    ///
    /// Unknown values are ignored and leave the current request in place.
    pub fn set_persisted_interval_mode(&self, value: u8) -> Option<IntervalMode> {
        let mode = IntervalMode::from_persisted(value)?;
        self.set_interval_mode(mode);
        Some(mode)
    }

    /// Currently requested interval mode (before quiet hold and `Auto`)
    pub fn interval_mode(&self) -> IntervalMode {
        self.interval.requested()
    }

    /// Update the radio channel `Auto` resolves from
    pub fn set_radio_channel(&self, channel: u8) {
        if self.interval.channel.swap(channel, Ordering::Relaxed) != channel {
            self.interval.mark_changed();
        }
    }

    /// Hold the driver clock at its minimal rate without touching the request
    pub fn set_quiet(&self, quiet: bool) {
        if self.interval.quiet.swap(quiet, Ordering::Relaxed) != quiet {
            self.interval.mark_changed();
        }
    }

    /// Whether the quiet hold is active
    pub fn is_quiet(&self) -> bool {
        self.interval.quiet.load(Ordering::Relaxed)
    }

    /// Mode the engine runs once pending changes are applied
    pub fn effective_mode(&self) -> ResolvedMode {
        self.interval.effective()
    }

    /// Diagnostic counters
    pub fn stats(&self) -> OverrunStats {
        self.stats.snapshot()
    }

    /// Consume a pending interval change
    pub(crate) fn take_mode_change(&self) -> Option<ResolvedMode> {
        if self.interval.changed.swap(false, Ordering::Acquire) {
            Some(self.interval.effective())
        } else {
            None
        }
    }

    /// Enter the scan handler; `None` if it is already running
    pub(crate) fn try_enter(&self) -> Option<HandlerGuard<'_>> {
        if self.in_handler.swap(true, Ordering::Acquire) {
            None
        } else {
            Some(HandlerGuard {
                flag: &self.in_handler,
            })
        }
    }
}
