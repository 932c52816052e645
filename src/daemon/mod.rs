//! Daemon module for Eyeshade.
//!
//! This module contains the countdown machinery:
//! - `clock`: Monotonic time sources (tokio-backed and manual)
//! - `schedule`: Adaptive progress-notification delays
//! - `alarm`: The work/rest state machine and its events
//! - `service`: Shared async handle and the timer driver task

pub mod alarm;
pub mod clock;
pub mod schedule;
pub mod service;

pub use alarm::{AlarmClock, AlarmClockEvent};
pub use clock::{Clock, ManualClock, TokioClock};
pub use service::AlarmClockService;
