//! Interactive commands read from stdin while `eyeshade run` is active.
//!
//! Each line is parsed with clap, without a binary name, so the usual
//! `help` output and error messages come for free.

use std::time::Duration;

use clap::{Parser, Subcommand};

use super::commands::Toggle;
use crate::types::AlarmCommand;

/// One console line.
#[derive(Parser, Debug)]
#[command(name = "eyeshade", no_binary_name = true, disable_version_flag = true)]
pub struct ConsoleLine {
    #[command(subcommand)]
    pub command: ConsoleCommand,
}

/// Commands accepted on the console.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Start a work phase now
    Work,
    /// Start a resting phase now
    Rest,
    /// Jump to the next phase
    Skip,
    /// Move the end of the current phase by MINUTES (negative shortens)
    Defer {
        #[arg(allow_negative_numbers = true)]
        minutes: i64,
    },
    /// Pause the countdown
    Pause,
    /// Resume the countdown
    Resume,
    /// Report that you stepped away (pauses work when auto-pause is on)
    Away,
    /// Report that you are back
    Back,
    /// Show the current status
    Status,
    /// Change a setting
    Set {
        #[command(subcommand)]
        setting: ConsoleSetting,
    },
    /// Leave the console
    #[command(alias = "exit")]
    Quit,
}

/// Settings that can be changed from the console.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleSetting {
    /// Work duration in minutes
    Work {
        #[arg(value_parser = clap::value_parser!(u64).range(1..=1440))]
        minutes: u64,
    },
    /// Resting duration in minutes
    Rest {
        #[arg(value_parser = clap::value_parser!(u64).range(1..=1440))]
        minutes: u64,
    },
    /// Pre-alert lead time in seconds
    Notify {
        #[arg(value_parser = clap::value_parser!(u64).range(1..=3600))]
        seconds: u64,
    },
    /// Ringer volume (0-100)
    Volume {
        #[arg(value_parser = clap::value_parser!(u32).range(0..=100))]
        value: u32,
    },
    /// Pause work automatically while you are away
    AutoPause {
        #[arg(value_enum)]
        value: Toggle,
    },
}

/// Parses one input line. Blank lines yield `Ok(None)`.
///
/// # Errors
///
/// Returns the clap error (which includes `help` output) for anything else.
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, clap::Error> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(None);
    }
    ConsoleLine::try_parse_from(words).map(|parsed| Some(parsed.command))
}

impl ConsoleCommand {
    /// Translates the line into an alarm command. `quit` has none.
    pub fn to_alarm_command(&self) -> Option<AlarmCommand> {
        let command = match self {
            ConsoleCommand::Work => AlarmCommand::Work,
            ConsoleCommand::Rest => AlarmCommand::Rest,
            ConsoleCommand::Skip => AlarmCommand::Skip,
            ConsoleCommand::Defer { minutes } => AlarmCommand::Defer {
                delta_ms: minutes.saturating_mul(60_000),
            },
            ConsoleCommand::Pause => AlarmCommand::UserPause,
            ConsoleCommand::Resume => AlarmCommand::UserResume,
            ConsoleCommand::Away => AlarmCommand::SmartPause,
            ConsoleCommand::Back => AlarmCommand::SmartAwake,
            ConsoleCommand::Status => AlarmCommand::Status,
            ConsoleCommand::Set { setting } => match setting {
                ConsoleSetting::Work { minutes } => {
                    AlarmCommand::SetWorkTime(Duration::from_secs(minutes * 60))
                }
                ConsoleSetting::Rest { minutes } => {
                    AlarmCommand::SetRestingTime(Duration::from_secs(minutes * 60))
                }
                ConsoleSetting::Notify { seconds } => {
                    AlarmCommand::SetNotifyTime(Duration::from_secs(*seconds))
                }
                ConsoleSetting::Volume { value } => AlarmCommand::SetRingerVolume(*value),
                ConsoleSetting::AutoPause { value } => {
                    AlarmCommand::SetAutoPauseWhenUserLeave(value.enabled())
                }
            },
            ConsoleCommand::Quit => return None,
        };
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> ConsoleCommand {
        parse_line(line).unwrap().unwrap()
    }

    #[test]
    fn test_blank_line_is_none() {
        assert!(parse_line("").unwrap().is_none());
        assert!(parse_line("   \t").unwrap().is_none());
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse("work"), ConsoleCommand::Work);
        assert_eq!(parse("  rest  "), ConsoleCommand::Rest);
        assert_eq!(parse("away"), ConsoleCommand::Away);
        assert_eq!(parse("exit"), ConsoleCommand::Quit);
    }

    #[test]
    fn test_defer_accepts_negative_minutes() {
        assert_eq!(parse("defer 5"), ConsoleCommand::Defer { minutes: 5 });
        assert_eq!(parse("defer -3"), ConsoleCommand::Defer { minutes: -3 });
        assert_eq!(
            parse("defer -3").to_alarm_command(),
            Some(AlarmCommand::Defer { delta_ms: -180_000 })
        );
    }

    #[test]
    fn test_set_commands() {
        assert_eq!(
            parse("set work 30").to_alarm_command(),
            Some(AlarmCommand::SetWorkTime(Duration::from_secs(1800)))
        );
        assert_eq!(
            parse("set notify 15").to_alarm_command(),
            Some(AlarmCommand::SetNotifyTime(Duration::from_secs(15)))
        );
        assert_eq!(
            parse("set auto-pause off").to_alarm_command(),
            Some(AlarmCommand::SetAutoPauseWhenUserLeave(false))
        );
    }

    #[test]
    fn test_pause_commands_map_to_reasons() {
        assert_eq!(parse("pause").to_alarm_command(), Some(AlarmCommand::UserPause));
        assert_eq!(parse("back").to_alarm_command(), Some(AlarmCommand::SmartAwake));
        assert_eq!(parse("quit").to_alarm_command(), None);
    }

    #[test]
    fn test_invalid_lines_are_errors() {
        assert!(parse_line("sleep").is_err());
        assert!(parse_line("defer").is_err());
        assert!(parse_line("set volume 101").is_err());
        assert!(parse_line("set work 0").is_err());
    }

    #[test]
    fn test_help_is_reported_as_error_kind() {
        let err = parse_line("help").unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
