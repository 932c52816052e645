//! User settings for Eyeshade.
//!
//! This module provides:
//! - `AlarmClockConfig`, the validated settings value object
//! - `UserConfig`, which owns the values together with their store
//! - Settings storage backends (JSON file, in-memory)

pub mod error;
pub mod store;

use std::time::Duration;

use tracing::{debug, warn};

use crate::types::{format_duration, parse_duration, TrayPopupCloseMode, TrayPopupShowMode};

pub use error::{ConfigError, StoreError};
pub use store::{
    default_config_path, JsonSettingsStore, MemorySettingsStore, Settings, SettingsStore,
    CONFIG_FILE_NAME,
};

// ============================================================================
// Setting keys
// ============================================================================

pub const KEY_WORK_TIME: &str = "WorkTime";
pub const KEY_RESTING_TIME: &str = "RestingTime";
pub const KEY_NOTIFY_TIME: &str = "NotifyTime";
pub const KEY_RINGER_VOLUME: &str = "RingerVolume";
pub const KEY_AUTO_PAUSE_WHEN_USER_LEAVE: &str = "AutoPauseWhenUserLeave";
pub const KEY_TRAY_POPUP_SHOW_MODE: &str = "TrayPopupShowMode";
pub const KEY_TRAY_POPUP_CLOSE_MODE: &str = "TrayPopupCloseMode";

/// Shortest allowed work or resting phase.
pub const MIN_PHASE_TIME: Duration = Duration::from_secs(60);

/// Longest allowed work or resting phase.
pub const MAX_PHASE_TIME: Duration = Duration::from_secs(24 * 60 * 60);

/// Shortest allowed pre-alert lead time.
pub const MIN_NOTIFY_TIME: Duration = Duration::from_secs(1);

/// Longest allowed pre-alert lead time.
pub const MAX_NOTIFY_TIME: Duration = Duration::from_secs(60 * 60);

/// Loudest ringer volume.
pub const MAX_RINGER_VOLUME: u32 = 100;

// ============================================================================
// Validation
// ============================================================================

pub fn validate_work_time(value: Duration) -> Result<(), ConfigError> {
    if !(MIN_PHASE_TIME..=MAX_PHASE_TIME).contains(&value) {
        return Err(ConfigError::InvalidWorkTime(value));
    }
    Ok(())
}

pub fn validate_resting_time(value: Duration) -> Result<(), ConfigError> {
    if !(MIN_PHASE_TIME..=MAX_PHASE_TIME).contains(&value) {
        return Err(ConfigError::InvalidRestingTime(value));
    }
    Ok(())
}

pub fn validate_notify_time(value: Duration) -> Result<(), ConfigError> {
    if !(MIN_NOTIFY_TIME..=MAX_NOTIFY_TIME).contains(&value) {
        return Err(ConfigError::InvalidNotifyTime(value));
    }
    Ok(())
}

pub fn validate_ringer_volume(value: u32) -> Result<(), ConfigError> {
    if value > MAX_RINGER_VOLUME {
        return Err(ConfigError::InvalidRingerVolume(value));
    }
    Ok(())
}

// ============================================================================
// AlarmClockConfig
// ============================================================================

/// Settings consumed by the alarm clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmClockConfig {
    /// Length of a work phase (at least one minute)
    pub work_time: Duration,
    /// Length of a resting phase (at least one minute)
    pub resting_time: Duration,
    /// How long before the end of work the pre-alert fires (at least one second)
    pub notify_time: Duration,
    /// Ringer volume (0-100)
    pub ringer_volume: u32,
    /// Whether the idle detector may pause the work phase
    pub auto_pause_when_user_leave: bool,
    /// How the tray popup opens
    pub tray_popup_show_mode: TrayPopupShowMode,
    /// How the tray popup closes
    pub tray_popup_close_mode: TrayPopupCloseMode,
}

impl Default for AlarmClockConfig {
    fn default() -> Self {
        Self {
            work_time: Duration::from_secs(45 * 60),
            resting_time: Duration::from_secs(4 * 60),
            notify_time: Duration::from_secs(20),
            ringer_volume: 100,
            auto_pause_when_user_leave: true,
            tray_popup_show_mode: TrayPopupShowMode::default(),
            tray_popup_close_mode: TrayPopupCloseMode::default(),
        }
    }
}

impl AlarmClockConfig {
    /// Creates a new configuration with the specified work time.
    pub fn with_work_time(mut self, value: Duration) -> Self {
        self.work_time = value;
        self
    }

    /// Creates a new configuration with the specified resting time.
    pub fn with_resting_time(mut self, value: Duration) -> Self {
        self.resting_time = value;
        self
    }

    /// Creates a new configuration with the specified notify time.
    pub fn with_notify_time(mut self, value: Duration) -> Self {
        self.notify_time = value;
        self
    }

    /// Validates every bounded field.
    ///
    /// # Errors
    ///
    /// Returns the first field found out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_work_time(self.work_time)?;
        validate_resting_time(self.resting_time)?;
        validate_notify_time(self.notify_time)?;
        validate_ringer_volume(self.ringer_volume)?;
        Ok(())
    }

    /// Builds a configuration from raw settings.
    ///
    /// Unknown keys are ignored. Missing, malformed or out-of-range values
    /// fall back to their defaults.
    pub fn from_settings(settings: &Settings) -> Self {
        let defaults = Self::default();

        Self {
            work_time: load_field(settings, KEY_WORK_TIME, defaults.work_time, |s| {
                parse_duration(s).filter(|v| validate_work_time(*v).is_ok())
            }),
            resting_time: load_field(settings, KEY_RESTING_TIME, defaults.resting_time, |s| {
                parse_duration(s).filter(|v| validate_resting_time(*v).is_ok())
            }),
            notify_time: load_field(settings, KEY_NOTIFY_TIME, defaults.notify_time, |s| {
                parse_duration(s).filter(|v| validate_notify_time(*v).is_ok())
            }),
            ringer_volume: load_field(settings, KEY_RINGER_VOLUME, defaults.ringer_volume, |s| {
                s.trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|v| validate_ringer_volume(*v).is_ok())
            }),
            auto_pause_when_user_leave: load_field(
                settings,
                KEY_AUTO_PAUSE_WHEN_USER_LEAVE,
                defaults.auto_pause_when_user_leave,
                parse_bool,
            ),
            tray_popup_show_mode: load_field(
                settings,
                KEY_TRAY_POPUP_SHOW_MODE,
                defaults.tray_popup_show_mode,
                |s| s.parse().ok(),
            ),
            tray_popup_close_mode: load_field(
                settings,
                KEY_TRAY_POPUP_CLOSE_MODE,
                defaults.tray_popup_close_mode,
                |s| s.parse().ok(),
            ),
        }
    }

    /// Serializes every field into raw settings.
    pub fn to_settings(&self) -> Settings {
        let mut settings = Settings::new();
        settings.insert(KEY_WORK_TIME.to_string(), format_duration(self.work_time));
        settings.insert(KEY_RESTING_TIME.to_string(), format_duration(self.resting_time));
        settings.insert(KEY_NOTIFY_TIME.to_string(), format_duration(self.notify_time));
        settings.insert(KEY_RINGER_VOLUME.to_string(), self.ringer_volume.to_string());
        settings.insert(
            KEY_AUTO_PAUSE_WHEN_USER_LEAVE.to_string(),
            self.auto_pause_when_user_leave.to_string(),
        );
        settings.insert(
            KEY_TRAY_POPUP_SHOW_MODE.to_string(),
            self.tray_popup_show_mode.as_str().to_string(),
        );
        settings.insert(
            KEY_TRAY_POPUP_CLOSE_MODE.to_string(),
            self.tray_popup_close_mode.as_str().to_string(),
        );
        settings
    }
}

fn load_field<T>(
    settings: &Settings,
    key: &str,
    default: T,
    parse: impl FnOnce(&str) -> Option<T>,
) -> T {
    let Some(raw) = settings.get(key) else {
        return default;
    };
    match parse(raw) {
        Some(value) => value,
        None => {
            warn!("Ignoring invalid setting {}={:?}, using default", key, raw);
            default
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

// ============================================================================
// UserConfig
// ============================================================================

/// Settings values bound to the store they are persisted in.
///
/// Setters validate before mutating, return whether the value changed, and
/// persist on change. Store failures are logged and never surface from the
/// setters.
pub struct UserConfig {
    values: AlarmClockConfig,
    store: Box<dyn SettingsStore>,
}

impl UserConfig {
    /// Loads settings from the store, falling back to defaults on any failure.
    pub fn load(store: Box<dyn SettingsStore>) -> Self {
        let values = match store.read() {
            Ok(settings) => AlarmClockConfig::from_settings(&settings),
            Err(e) => {
                warn!(
                    "Failed to load settings from {}: {}, using defaults",
                    store.location(),
                    e
                );
                AlarmClockConfig::default()
            }
        };
        debug!("Loaded settings from {}: {:?}", store.location(), values);

        Self { values, store }
    }

    /// Creates a config over an empty in-memory store.
    pub fn in_memory() -> Self {
        Self::load(Box::new(MemorySettingsStore::new()))
    }

    /// Creates a config with the given values over an in-memory store.
    pub fn with_values(values: AlarmClockConfig) -> Self {
        Self {
            values,
            store: Box::new(MemorySettingsStore::new()),
        }
    }

    /// Returns the current values.
    pub fn values(&self) -> &AlarmClockConfig {
        &self.values
    }

    /// Returns where the settings are persisted.
    pub fn location(&self) -> String {
        self.store.location()
    }

    /// Persists every field, propagating store failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn try_save(&self) -> Result<(), StoreError> {
        self.store.write(&self.values.to_settings())
    }

    /// Persists every field, logging store failures.
    pub fn save(&self) {
        if let Err(e) = self.try_save() {
            warn!("Failed to save settings to {}: {}", self.store.location(), e);
        }
    }

    pub fn set_work_time(&mut self, value: Duration) -> Result<bool, ConfigError> {
        validate_work_time(value)?;
        Ok(self.update(|v| &mut v.work_time, value))
    }

    pub fn set_resting_time(&mut self, value: Duration) -> Result<bool, ConfigError> {
        validate_resting_time(value)?;
        Ok(self.update(|v| &mut v.resting_time, value))
    }

    pub fn set_notify_time(&mut self, value: Duration) -> Result<bool, ConfigError> {
        validate_notify_time(value)?;
        Ok(self.update(|v| &mut v.notify_time, value))
    }

    pub fn set_ringer_volume(&mut self, value: u32) -> Result<bool, ConfigError> {
        validate_ringer_volume(value)?;
        Ok(self.update(|v| &mut v.ringer_volume, value))
    }

    pub fn set_auto_pause_when_user_leave(&mut self, value: bool) -> bool {
        self.update(|v| &mut v.auto_pause_when_user_leave, value)
    }

    pub fn set_tray_popup_show_mode(&mut self, value: TrayPopupShowMode) -> bool {
        self.update(|v| &mut v.tray_popup_show_mode, value)
    }

    pub fn set_tray_popup_close_mode(&mut self, value: TrayPopupCloseMode) -> bool {
        self.update(|v| &mut v.tray_popup_close_mode, value)
    }

    fn update<T: PartialEq>(
        &mut self,
        field: impl FnOnce(&mut AlarmClockConfig) -> &mut T,
        value: T,
    ) -> bool {
        let slot = field(&mut self.values);
        if *slot == value {
            return false;
        }
        *slot = value;
        self.save();
        true
    }
}

// ============================================================================
// Tests
// ============================================================================
