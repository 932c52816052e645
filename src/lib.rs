//! Eyeshade Library
//!
//! This library provides the core functionality for the Eyeshade break
//! reminder. It includes:
//! - The work/rest alarm clock state machine and its timer driver
//! - Persisted user settings with permissive loading
//! - CLI command parsing and display utilities
//! - Shared type definitions for phases, pauses and status snapshots

pub mod cli;
pub mod config;
pub mod daemon;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    AlarmClockState, AlarmClockStatus, AlarmCommand, PauseReason, TrayPopupCloseMode,
    TrayPopupShowMode,
};

pub use config::{
    AlarmClockConfig, ConfigError, JsonSettingsStore, MemorySettingsStore, SettingsStore,
    StoreError, UserConfig,
};

pub use daemon::{AlarmClock, AlarmClockEvent, AlarmClockService, Clock, ManualClock, TokioClock};
