//! Persisted display settings
//!
//! The interval mode survives reboots as a small postcard record in the
//! settings store. The record keeps the mode in its integer form, so a value
//! written by a newer firmware that this one does not know is ignored
//! rather than misread.

use rowscan_hal::{FlashError, FlashStorage, StorageKey};
use serde::{Deserialize, Serialize};

use crate::schedule::IntervalMode;

/// Current record layout
pub const SETTINGS_VERSION: u8 = 1;

/// Upper bound for an encoded record
pub const MAX_SETTINGS_SIZE: usize = 16;

/// Settings persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// Flash operation failed
    Flash(FlashError),
    /// Serialization failed
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// Record written by an unknown layout version
    Version(u8),
}

impl From<FlashError> for SettingsError {
    fn from(e: FlashError) -> Self {
        SettingsError::Flash(e)
    }
}

/// Stored display settings record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplaySettings {
    /// Record layout version
    pub version: u8,
    /// Interval mode in persisted integer form
    pub interval_mode: u8,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self::new(IntervalMode::Auto)
    }
}

impl DisplaySettings {
    pub fn new(mode: IntervalMode) -> Self {
        Self {
            version: SETTINGS_VERSION,
            interval_mode: mode.to_persisted(),
        }
    }

    /// Decoded interval mode, `None` for unknown values
    pub fn interval_mode(&self) -> Option<IntervalMode> {
        IntervalMode::from_persisted(self.interval_mode)
    }

    /// Serialize into `buffer`, returning the used part
    pub fn encode<'b>(&self, buffer: &'b mut [u8]) -> Result<&'b mut [u8], SettingsError> {
        postcard::to_slice(self, buffer).map_err(|_| SettingsError::Serialize)
    }

    /// Deserialize and check the layout version
    pub fn decode(bytes: &[u8]) -> Result<Self, SettingsError> {
        let settings: DisplaySettings =
            postcard::from_bytes(bytes).map_err(|_| SettingsError::Deserialize)?;
        if settings.version != SETTINGS_VERSION {
            return Err(SettingsError::Version(settings.version));
        }
        Ok(settings)
    }
}

/// Read the settings record
pub async fn load_settings<S: FlashStorage>(storage: &mut S) -> Result<DisplaySettings, SettingsError> {
    let mut buffer = [0u8; MAX_SETTINGS_SIZE];
    let len = storage
        .read(StorageKey::DisplaySettings, &mut buffer)
        .await?;
    let bytes = buffer.get(..len).ok_or(SettingsError::Deserialize)?;
    DisplaySettings::decode(bytes)
}

/// Write the settings record
pub async fn save_settings<S: FlashStorage>(
    storage: &mut S,
    settings: &DisplaySettings,
) -> Result<(), SettingsError> {
    let mut buffer = [0u8; MAX_SETTINGS_SIZE];
    let bytes = settings.encode(&mut buffer)?;
    storage.write(StorageKey::DisplaySettings, bytes).await?;
    Ok(())
}
