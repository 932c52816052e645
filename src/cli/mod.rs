//! CLI module for Eyeshade.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `console`: Interactive commands read while the timer runs
//! - `display`: Output formatting and display logic

pub mod commands;
pub mod console;
pub mod display;

pub use commands::{Cli, Commands, ConfigCommand, SetArgs, Toggle};
pub use console::{parse_line, ConsoleCommand};
pub use display::Display;
