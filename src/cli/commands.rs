//! Command definitions for the Eyeshade CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{ConfigError, UserConfig};
use crate::types::{TrayPopupCloseMode, TrayPopupShowMode};

// ============================================================================
// CLI Structure
// ============================================================================

/// Eyeshade CLI - a work/rest break reminder
#[derive(Parser, Debug)]
#[command(
    name = "eyeshade",
    version,
    about = "目を休ませるための作業/休憩リマインダー",
    long_about = "作業時間と休憩時間を交互にカウントダウンし、休憩のタイミングを知らせます。\n\
                  `run` で前面に常駐し、標準入力からコマンドを受け付けます。",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the work/rest timer in the foreground
    Run,

    /// Show or edit the persisted settings
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Settings subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Print the current settings
    Show,

    /// Print the settings file location
    Path,

    /// Change one or more settings
    Set(SetArgs),
}

// ============================================================================
// Config Set Arguments
// ============================================================================

/// On/off switch for boolean settings
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        self == Toggle::On
    }
}

/// Arguments for `config set`
#[derive(Args, Debug, Clone, Default)]
pub struct SetArgs {
    /// Work duration in minutes (1-1440)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..=1440))]
    pub work: Option<u64>,

    /// Resting duration in minutes (1-1440)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..=1440))]
    pub rest: Option<u64>,

    /// Pre-alert lead time in seconds (1-3600)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub notify: Option<u64>,

    /// Ringer volume (0-100)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    pub volume: Option<u32>,

    /// Pause work automatically while the user is away
    #[arg(long, value_enum)]
    pub auto_pause: Option<Toggle>,

    /// How the tray popup opens
    #[arg(long, value_enum)]
    pub popup_show: Option<TrayPopupShowMode>,

    /// How the tray popup closes
    #[arg(long, value_enum)]
    pub popup_close: Option<TrayPopupCloseMode>,
}

impl SetArgs {
    /// Returns true if no setting was given.
    pub fn is_empty(&self) -> bool {
        self.work.is_none()
            && self.rest.is_none()
            && self.notify.is_none()
            && self.volume.is_none()
            && self.auto_pause.is_none()
            && self.popup_show.is_none()
            && self.popup_close.is_none()
    }

    /// Applies every given setting through the validated setters.
    ///
    /// # Errors
    ///
    /// Stops at the first rejected value. Earlier settings stay applied.
    pub fn apply_to(&self, config: &mut UserConfig) -> Result<(), ConfigError> {
        if let Some(minutes) = self.work {
            config.set_work_time(Duration::from_secs(minutes * 60))?;
        }
        if let Some(minutes) = self.rest {
            config.set_resting_time(Duration::from_secs(minutes * 60))?;
        }
        if let Some(seconds) = self.notify {
            config.set_notify_time(Duration::from_secs(seconds))?;
        }
        if let Some(volume) = self.volume {
            config.set_ringer_volume(volume)?;
        }
        if let Some(toggle) = self.auto_pause {
            config.set_auto_pause_when_user_leave(toggle.enabled());
        }
        if let Some(mode) = self.popup_show {
            config.set_tray_popup_show_mode(mode);
        }
        if let Some(mode) = self.popup_close {
            config.set_tray_popup_close_mode(mode);
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
