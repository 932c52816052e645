//! Display utilities for the Eyeshade CLI.
//!
//! This module provides formatted output for:
//! - Alarm clock events
//! - Status display
//! - Settings display
//! - Error messages

use std::time::Duration;

use crate::config::{AlarmClockConfig, ConfigError};
use crate::daemon::AlarmClockEvent;
use crate::types::{format_duration, AlarmClockState, AlarmClockStatus, PauseReason};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows an alarm clock event as one line.
    pub fn show_event(event: &AlarmClockEvent) {
        println!("{}", Self::event_line(event));
    }

    /// Shows the current status.
    pub fn show_status(status: &AlarmClockStatus) {
        for line in Self::status_lines(status) {
            println!("{}", line);
        }
    }

    /// Shows the persisted settings.
    pub fn show_config(config: &AlarmClockConfig, location: &str) {
        for line in Self::config_lines(config, location) {
            println!("{}", line);
        }
    }

    /// Shows a rejected setting together with a hint.
    pub fn show_config_error(error: &ConfigError) {
        eprintln!("エラー: {}", error);
        eprintln!("  ヒント: {}", error.suggestion());
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("エラー: {}", message);
    }

    /// Shows an informational message.
    pub fn show_notice(message: &str) {
        println!("  {}", message);
    }

    /// Shows the console prompt help line.
    pub fn show_console_banner() {
        println!("コマンドを入力してください（help で一覧, quit で終了）");
    }

    fn event_line(event: &AlarmClockEvent) -> String {
        match event {
            AlarmClockEvent::StateChanged { state } => match state {
                AlarmClockState::Work => "> 作業を開始しました".to_string(),
                AlarmClockState::Resting => "* 休憩の時間です。目を休ませましょう".to_string(),
            },
            AlarmClockEvent::ProgressChanged {
                remaining,
                pre_alert: true,
                ..
            } => {
                let (minutes, seconds) = Self::format_time(*remaining);
                format!("! まもなく休憩です（残り {}:{:02}）", minutes, seconds)
            }
            AlarmClockEvent::ProgressChanged {
                progress,
                remaining,
                ..
            } => {
                let (minutes, seconds) = Self::format_time(*remaining);
                format!(
                    "  残り時間: {}:{:02} ({:.0}%)",
                    minutes,
                    seconds,
                    progress * 100.0
                )
            }
            AlarmClockEvent::IsPausedChanged { reason, is_paused } => {
                let who = match reason {
                    PauseReason::User => "",
                    PauseReason::Smart => "（離席）",
                };
                if *is_paused {
                    format!("|| 一時停止しました{}", who)
                } else {
                    format!("> 再開しました{}", who)
                }
            }
        }
    }

    fn status_lines(status: &AlarmClockStatus) -> Vec<String> {
        let state = match status.state {
            AlarmClockState::Work => "作業中",
            AlarmClockState::Resting => "休憩中",
        };
        let (minutes, seconds) = Self::format_time(status.remaining);
        let (total_minutes, total_seconds) = Self::format_time(status.total);

        let mut lines = vec![
            "Eyeshade ステータス".to_string(),
            "─────────────────────────────".to_string(),
            format!("状態: {}", state),
            format!(
                "残り時間: {}:{:02} / {}:{:02}",
                minutes, seconds, total_minutes, total_seconds
            ),
        ];
        if status.is_paused {
            lines.push("一時停止中".to_string());
        }
        if status.is_user_paused {
            lines.push("  ユーザーによる一時停止".to_string());
        }
        if status.is_smart_paused {
            lines.push("  離席による一時停止".to_string());
        }
        lines
    }

    fn config_lines(config: &AlarmClockConfig, location: &str) -> Vec<String> {
        vec![
            format!("設定ファイル: {}", location),
            format!("作業時間: {}", format_duration(config.work_time)),
            format!("休憩時間: {}", format_duration(config.resting_time)),
            format!("事前通知: {}", format_duration(config.notify_time)),
            format!("音量: {}", config.ringer_volume),
            format!(
                "離席時に自動一時停止: {}",
                if config.auto_pause_when_user_leave {
                    "on"
                } else {
                    "off"
                }
            ),
            format!("ポップアップ表示: {}", config.tray_popup_show_mode.as_str()),
            format!("ポップアップを閉じる: {}", config.tray_popup_close_mode.as_str()),
        ]
    }

    /// Formats a duration as (minutes, seconds), rounding partial seconds up.
    fn format_time(duration: Duration) -> (u64, u64) {
        let total_seconds = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
        (total_seconds / 60, total_seconds % 60)
    }
}

// ============================================================================
// Tests
// ============================================================================
