//! Telemetry task
//!
//! Periodically logs the scan counters and the button bitmap.

use defmt::*;
use embassy_time::{Duration, Ticker};

use rowscan_core::engine::ScanShared;

/// Reporting period
const REPORT_INTERVAL: Duration = Duration::from_secs(5);

#[embassy_executor::task]
pub async fn telemetry_task(shared: &'static ScanShared) {
    let mut ticker = Ticker::every(REPORT_INTERVAL);
    let mut last_buttons = shared.buttons();
    let mut last_overruns = 0;

    loop {
        ticker.next().await;

        let stats = shared.stats();
        if stats.overruns != last_overruns {
            warn!(
                "Scan overruns: {} of {} interrupts, last in {:?}",
                stats.overruns, stats.interrupts, stats.last_overrun_phase
            );
            last_overruns = stats.overruns;
        } else {
            info!(
                "Scan: {} interrupts, mode {:?}, contrast {}",
                stats.interrupts,
                shared.effective_mode(),
                shared.contrast()
            );
        }

        let buttons = shared.buttons();
        if buttons != last_buttons {
            info!("Buttons: {=u32:#x}", buttons);
            last_buttons = buttons;
        }
    }
}
