//! Core data types for Eyeshade.
//!
//! This module defines the data structures shared by the alarm clock,
//! the settings layer and the terminal host:
//! - Phase and pause-reason enums
//! - Tray popup behaviour enums (persisted alongside the timer settings)
//! - Status snapshots and commands exchanged with adapters
//! - The textual duration format used by the settings file

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ============================================================================
// AlarmClockState
// ============================================================================

/// The phase the alarm clock is currently counting down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmClockState {
    /// Working; the countdown ends with a break.
    #[default]
    Work,
    /// Resting the eyes; the countdown ends with the next work phase.
    Resting,
}

impl AlarmClockState {
    /// Returns the string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmClockState::Work => "work",
            AlarmClockState::Resting => "resting",
        }
    }

    /// Returns the phase that follows this one.
    #[must_use]
    pub fn toggled(&self) -> Self {
        match self {
            AlarmClockState::Work => AlarmClockState::Resting,
            AlarmClockState::Resting => AlarmClockState::Work,
        }
    }
}

impl fmt::Display for AlarmClockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// PauseReason
// ============================================================================

/// Why the countdown was asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseReason {
    /// Explicit request from the UI, the tray, or a system suspend/lock.
    User,
    /// Automatic pause requested by the user-idle detector.
    Smart,
}

impl PauseReason {
    /// Returns the string representation of the reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            PauseReason::User => "user",
            PauseReason::Smart => "smart",
        }
    }
}

impl fmt::Display for PauseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Tray popup modes
// ============================================================================

/// How the tray popup is opened.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum TrayPopupShowMode {
    /// Show when the pointer hovers the tray icon.
    #[default]
    TrayIconHover,
    /// Show when the tray icon is clicked.
    TrayIconClick,
}

impl TrayPopupShowMode {
    /// Returns the name used in the settings file.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrayPopupShowMode::TrayIconHover => "TrayIconHover",
            TrayPopupShowMode::TrayIconClick => "TrayIconClick",
        }
    }
}

impl FromStr for TrayPopupShowMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "TrayIconHover" => Ok(TrayPopupShowMode::TrayIconHover),
            "TrayIconClick" => Ok(TrayPopupShowMode::TrayIconClick),
            other => Err(format!("unknown tray popup show mode: {other}")),
        }
    }
}

/// How the tray popup is dismissed.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum TrayPopupCloseMode {
    /// Close when the tray icon is clicked again.
    TrayIconClick,
    /// Close when the popup loses focus.
    #[default]
    Deactivated,
}

impl TrayPopupCloseMode {
    /// Returns the name used in the settings file.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrayPopupCloseMode::TrayIconClick => "TrayIconClick",
            TrayPopupCloseMode::Deactivated => "Deactivated",
        }
    }
}

impl FromStr for TrayPopupCloseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "TrayIconClick" => Ok(TrayPopupCloseMode::TrayIconClick),
            // older settings files carry the misspelled name
            "Deactivated" | "Deactived" => Ok(TrayPopupCloseMode::Deactivated),
            other => Err(format!("unknown tray popup close mode: {other}")),
        }
    }
}

// ============================================================================
// AlarmClockStatus
// ============================================================================

/// Point-in-time snapshot of the alarm clock, handed to adapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmClockStatus {
    /// Current phase
    pub state: AlarmClockState,
    /// Time left in the current phase
    pub remaining: Duration,
    /// Full length of the current phase
    pub total: Duration,
    /// `remaining / total`, within `[0, 1]`
    pub progress: f64,
    /// Whether the countdown is currently halted
    #[serde(rename = "isPaused")]
    pub is_paused: bool,
    /// Whether the user asked for a pause
    #[serde(rename = "isUserPaused")]
    pub is_user_paused: bool,
    /// Whether the idle detector asked for a pause
    #[serde(rename = "isSmartPaused")]
    pub is_smart_paused: bool,
}

// ============================================================================
// AlarmCommand
// ============================================================================

/// Commands an adapter can send to the alarm clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlarmCommand {
    /// Start a work phase now
    Work,
    /// Start a resting phase now
    Rest,
    /// Jump to the next phase as if the countdown had expired
    Skip,
    /// Move the end of the current phase (negative values bring it closer)
    Defer {
        /// Signed offset in milliseconds
        delta_ms: i64,
    },
    /// Explicit pause
    UserPause,
    /// Explicit resume
    UserResume,
    /// Idle detector reports the user left
    SmartPause,
    /// Idle detector reports the user is back
    SmartAwake,
    /// Query only
    Status,
    /// Change the work phase length
    SetWorkTime(Duration),
    /// Change the resting phase length
    SetRestingTime(Duration),
    /// Change the pre-alert lead time
    SetNotifyTime(Duration),
    /// Change the ringer volume
    SetRingerVolume(u32),
    /// Toggle the idle detector integration
    SetAutoPauseWhenUserLeave(bool),
}

// ============================================================================
// Duration text format
// ============================================================================

/// Formats a duration as `[d.]hh:mm:ss[.fraction]`.
///
/// The fraction is only written when the duration has sub-second precision,
/// with trailing zeros trimmed.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let days = total / 86_400;
    let rem = total % 86_400;
    let clock = format!("{:02}:{:02}:{:02}", rem / 3600, rem % 3600 / 60, rem % 60);

    let mut text = if days > 0 {
        format!("{days}.{clock}")
    } else {
        clock
    };

    let nanos = duration.subsec_nanos();
    if nanos > 0 {
        let fraction = format!("{nanos:09}");
        text.push('.');
        text.push_str(fraction.trim_end_matches('0'));
    }
    text
}

/// Parses `[d.]hh:mm[:ss][.fraction]` into a duration.
///
/// Hours must stay below 24; longer spans need the day component. Returns
/// `None` for anything malformed; callers fall back to defaults.
pub fn parse_duration(text: &str) -> Option<Duration> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('-') {
        return None;
    }

    let (days, clock) = match text.find('.') {
        Some(i) if !text[..i].contains(':') => (text[..i].parse::<u64>().ok()?, &text[i + 1..]),
        _ => (0, text),
    };

    let (hms, fraction) = match clock.split_once('.') {
        Some((hms, fraction)) => (hms, Some(fraction)),
        None => (clock, None),
    };

    let mut parts = hms.split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: u64 = match parts.next() {
        Some(s) => s.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() || hours >= 24 || minutes >= 60 || seconds >= 60 {
        return None;
    }

    let nanos = match fraction {
        Some(f) if !f.is_empty() && f.len() <= 9 && f.bytes().all(|b| b.is_ascii_digit()) => {
            format!("{f:0<9}").parse::<u32>().ok()?
        }
        Some(_) => return None,
        None => 0,
    };

    let secs = days
        .checked_mul(86_400)?
        .checked_add(hours.checked_mul(3600)?)?
        .checked_add(minutes * 60 + seconds)?;
    Some(Duration::new(secs, nanos))
}

// ============================================================================
// Tests
// ============================================================================
