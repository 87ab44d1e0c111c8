//! Settings persistence task
//!
//! Owns the flash store and writes the interval mode whenever it is
//! changed. Flash writes stall the thread executor, never the scan task.

use defmt::*;

use rowscan_core::settings::{save_settings, DisplaySettings};
use rowscan_hal_rp2040::flash::Rp2040FlashStorage;

use crate::channels::MODE_SAVE;

#[embassy_executor::task]
pub async fn settings_task(mut storage: Rp2040FlashStorage<'static>) {
    info!("Settings task started");

    loop {
        let mode = MODE_SAVE.wait().await;

        info!("Saving interval mode {}", mode);

        match save_settings(&mut storage, &DisplaySettings::new(mode)).await {
            Ok(()) => {
                info!("Settings saved");
            }
            Err(e) => {
                error!("Failed to save settings: {:?}", e);
            }
        }
    }
}
