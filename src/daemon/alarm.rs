//! Alarm clock state machine for Eyeshade.
//!
//! This module provides the work/rest countdown:
//! - Phase transitions (Work ⇄ Resting) on expiry or on demand
//! - Remaining time derived from a monotonic clock, never tick-counted
//! - Two pause flags (user, smart) combined into one timer state
//! - Adaptive progress notifications and the work-end pre-alert
//!
//! `AlarmClock` is synchronous. A driver asks it for `next_deadline()`,
//! sleeps until then and calls `on_timer()`; see `daemon::service`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info};

use super::clock::Clock;
use super::schedule::{next_progress_delay, should_reschedule, MIN_DELAY};
use crate::config::{AlarmClockConfig, ConfigError, UserConfig};
use crate::types::{
    AlarmClockState, AlarmClockStatus, PauseReason, TrayPopupCloseMode, TrayPopupShowMode,
};

/// Deferring never leaves less than this (or the whole phase, if shorter).
pub const DEFER_FLOOR: Duration = Duration::from_secs(60);

/// Timer spans are capped at this horizon before being added to an instant.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

// ============================================================================
// AlarmClockEvent
// ============================================================================

/// Notifications for UI and tray adapters.
#[derive(Debug, Clone, PartialEq)]
pub enum AlarmClockEvent {
    /// A new phase started
    StateChanged {
        /// Phase now counting down
        state: AlarmClockState,
    },
    /// Progress crossed a reporting boundary
    ProgressChanged {
        /// `remaining / total`
        progress: f64,
        /// Time left in the phase
        remaining: Duration,
        /// Whether this sample just crossed below the notify time
        pre_alert: bool,
    },
    /// One of the pause flags flipped
    IsPausedChanged {
        /// Which flag
        reason: PauseReason,
        /// New value of that flag
        is_paused: bool,
    },
}

// ============================================================================
// AlarmClock
// ============================================================================

/// Work/rest countdown with pause flags and progress scheduling.
pub struct AlarmClock {
    config: UserConfig,
    clock: Arc<dyn Clock>,
    event_tx: mpsc::UnboundedSender<AlarmClockEvent>,

    state: AlarmClockState,
    total_time: Duration,
    /// Remaining time as of the last (re)arm
    timer_due_time: Duration,
    /// When the timer was last (re)armed
    timer_start_time: Instant,
    /// Whether the one-shot timer is disarmed
    timer_paused: bool,
    is_user_paused: bool,
    is_smart_paused: bool,

    progress_deadline: Option<Instant>,
    /// Remaining time at the previous progress sample
    last_remaining: Duration,
}

impl AlarmClock {
    /// Creates an alarm clock counting down a fresh work phase.
    pub fn new(
        config: UserConfig,
        clock: Arc<dyn Clock>,
        event_tx: mpsc::UnboundedSender<AlarmClockEvent>,
    ) -> Self {
        let now = clock.now();
        let total_time = config.values().work_time;

        let mut alarm = Self {
            config,
            clock,
            event_tx,
            state: AlarmClockState::Work,
            total_time,
            timer_due_time: total_time,
            timer_start_time: now,
            timer_paused: false,
            is_user_paused: false,
            is_smart_paused: false,
            progress_deadline: None,
            last_remaining: total_time,
        };
        alarm.schedule_progress(now);
        info!("Alarm clock started, work: {:?}", total_time);
        alarm
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Starts a work phase now.
    ///
    /// Cancels a user pause. A recorded smart pause stays and halts the
    /// new phase immediately.
    pub fn work(&mut self) {
        info!("Work {:?}", self.config.values().work_time);
        self.enter(AlarmClockState::Work);
    }

    /// Starts a resting phase now, cancelling a user pause.
    pub fn rest(&mut self) {
        info!("Rest {:?}", self.config.values().resting_time);
        self.enter(AlarmClockState::Resting);
    }

    /// Jumps to the next phase as if the countdown had expired.
    pub fn skip(&mut self) {
        info!("Skip {}", self.state);
        self.enter(self.state.toggled());
    }

    /// Moves the end of the current phase by `delta_ms` (negative shortens).
    ///
    /// The result is clamped to `[min(1 min, total), total]`.
    pub fn defer(&mut self, delta_ms: i64) {
        let now = self.clock.now();
        let remaining = self.remaining_at(now);
        info!("Defer {}ms, remaining: {:?}", delta_ms, remaining);

        let delta = Duration::from_millis(delta_ms.unsigned_abs());
        let target = if delta_ms >= 0 {
            remaining.saturating_add(delta)
        } else {
            remaining.saturating_sub(delta)
        };
        let floor = DEFER_FLOOR.min(self.total_time);

        self.rearm(now, target.clamp(floor, self.total_time));
    }

    pub fn user_pause(&mut self) {
        self.set_pause_flag(PauseReason::User, true);
    }

    pub fn user_resume(&mut self) {
        self.set_pause_flag(PauseReason::User, false);
    }

    /// Records that the user left. Only halts the work phase.
    pub fn smart_pause(&mut self) {
        self.set_pause_flag(PauseReason::Smart, true);
    }

    pub fn smart_awake(&mut self) {
        self.set_pause_flag(PauseReason::Smart, false);
    }

    // ------------------------------------------------------------------------
    // Setters
    // ------------------------------------------------------------------------

    /// Changes the work phase length, adjusting a running work phase.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidWorkTime` below one minute.
    pub fn set_work_time(&mut self, value: Duration) -> Result<(), ConfigError> {
        if self.config.set_work_time(value)? {
            info!("Set WorkTime {:?}", value);
            if self.state == AlarmClockState::Work {
                self.change_total(value);
            }
        }
        Ok(())
    }

    /// Changes the resting phase length, adjusting a running rest phase.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRestingTime` below one minute.
    pub fn set_resting_time(&mut self, value: Duration) -> Result<(), ConfigError> {
        if self.config.set_resting_time(value)? {
            info!("Set RestingTime {:?}", value);
            if self.state == AlarmClockState::Resting {
                self.change_total(value);
            }
        }
        Ok(())
    }

    /// Changes the pre-alert lead time.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidNotifyTime` below one second.
    pub fn set_notify_time(&mut self, value: Duration) -> Result<(), ConfigError> {
        if self.config.set_notify_time(value)? {
            info!("Set NotifyTime {:?}", value);
            if !self.timer_paused {
                // the notify boundary is one of the schedule candidates
                self.schedule_progress(self.clock.now());
            }
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRingerVolume` above 100.
    pub fn set_ringer_volume(&mut self, value: u32) -> Result<(), ConfigError> {
        if self.config.set_ringer_volume(value)? {
            info!("Set RingerVolume {}", value);
        }
        Ok(())
    }

    pub fn set_auto_pause_when_user_leave(&mut self, value: bool) {
        if self.config.set_auto_pause_when_user_leave(value) {
            info!("Set AutoPauseWhenUserLeave {}", value);
        }
    }

    pub fn set_tray_popup_show_mode(&mut self, value: TrayPopupShowMode) {
        if self.config.set_tray_popup_show_mode(value) {
            info!("Set TrayPopupShowMode {}", value.as_str());
        }
    }

    pub fn set_tray_popup_close_mode(&mut self, value: TrayPopupCloseMode) {
        if self.config.set_tray_popup_close_mode(value) {
            info!("Set TrayPopupCloseMode {}", value.as_str());
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn state(&self) -> AlarmClockState {
        self.state
    }

    pub fn total_time(&self) -> Duration {
        self.total_time
    }

    pub fn remaining_time(&self) -> Duration {
        self.remaining_at(self.clock.now())
    }

    /// Fraction of the phase left, within `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.progress_of(self.remaining_time())
    }

    /// Whether the countdown is halted.
    pub fn is_paused(&self) -> bool {
        self.timer_paused
    }

    pub fn is_user_paused(&self) -> bool {
        self.is_user_paused
    }

    pub fn is_smart_paused(&self) -> bool {
        self.is_smart_paused
    }

    pub fn config(&self) -> &AlarmClockConfig {
        self.config.values()
    }

    /// Returns a snapshot of every query at one instant.
    pub fn status(&self) -> AlarmClockStatus {
        let remaining = self.remaining_time();
        AlarmClockStatus {
            state: self.state,
            remaining,
            total: self.total_time,
            progress: self.progress_of(remaining),
            is_paused: self.timer_paused,
            is_user_paused: self.is_user_paused,
            is_smart_paused: self.is_smart_paused,
        }
    }

    // ------------------------------------------------------------------------
    // Timer driver
    // ------------------------------------------------------------------------

    /// Earliest instant at which `on_timer` has work to do.
    ///
    /// `None` while the countdown is halted.
    pub fn next_deadline(&self) -> Option<Instant> {
        let expiry = self.expiry_deadline()?;
        Some(match self.progress_deadline {
            Some(progress) => progress.min(expiry),
            None => expiry,
        })
    }

    /// Processes whatever is due now. Expiry wins over a progress tick.
    pub fn on_timer(&mut self) {
        let now = self.clock.now();

        if self.expiry_deadline().is_some_and(|expiry| now >= expiry) {
            debug!("Countdown expired in {}", self.state);
            self.enter(self.state.toggled());
            return;
        }

        if self.progress_deadline.is_some_and(|deadline| now >= deadline) {
            self.progress_tick(now);
        }
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn remaining_at(&self, now: Instant) -> Duration {
        if self.timer_paused {
            self.timer_due_time
        } else {
            self.timer_due_time
                .saturating_sub(now.saturating_duration_since(self.timer_start_time))
        }
    }

    fn progress_of(&self, remaining: Duration) -> f64 {
        if self.total_time.is_zero() {
            return 1.0;
        }
        (remaining.as_secs_f64() / self.total_time.as_secs_f64()).clamp(0.0, 1.0)
    }

    fn expiry_deadline(&self) -> Option<Instant> {
        if self.timer_paused {
            None
        } else {
            Some(instant_after(self.timer_start_time, self.timer_due_time))
        }
    }

    fn phase_time(&self, state: AlarmClockState) -> Duration {
        match state {
            AlarmClockState::Work => self.config.values().work_time,
            AlarmClockState::Resting => self.config.values().resting_time,
        }
    }

    /// The timer runs iff no applicable pause flag is set.
    fn should_pause(&self) -> bool {
        self.is_user_paused || (self.is_smart_paused && self.state == AlarmClockState::Work)
    }

    fn pre_alert_pending(&self) -> bool {
        self.state == AlarmClockState::Work
            && self.last_remaining > self.config.values().notify_time
    }

    fn enter(&mut self, state: AlarmClockState) {
        let now = self.clock.now();

        if self.is_user_paused {
            self.is_user_paused = false;
            self.emit(AlarmClockEvent::IsPausedChanged {
                reason: PauseReason::User,
                is_paused: false,
            });
        }

        self.state = state;
        self.total_time = self.phase_time(state);
        self.timer_due_time = self.total_time;
        self.timer_start_time = now;
        self.last_remaining = self.total_time;
        self.timer_paused = self.should_pause();
        if self.timer_paused {
            self.progress_deadline = None;
        } else {
            self.schedule_progress(now);
        }

        info!(
            "Entered {}, total: {:?}, smart_paused: {}",
            state, self.total_time, self.is_smart_paused
        );
        self.emit(AlarmClockEvent::StateChanged { state });
    }

    /// Sets the due time to `remaining`, restarting the countdown if running.
    fn rearm(&mut self, now: Instant, remaining: Duration) {
        self.timer_due_time = remaining;
        if !self.timer_paused {
            self.timer_start_time = now;
            self.schedule_progress(now);
        }
    }

    fn change_total(&mut self, total: Duration) {
        let now = self.clock.now();
        let remaining = self.remaining_at(now).min(total);
        self.total_time = total;
        self.rearm(now, remaining);
    }

    fn set_pause_flag(&mut self, reason: PauseReason, value: bool) {
        let flag = match reason {
            PauseReason::User => &mut self.is_user_paused,
            PauseReason::Smart => &mut self.is_smart_paused,
        };
        if *flag == value {
            debug!("{} pause already {}", reason, value);
            return;
        }
        *flag = value;

        self.sync_timer(self.clock.now());
        info!(
            "{} {}, user_paused: {}, smart_paused: {}, state: {}, remaining: {:?}",
            reason,
            if value { "pause" } else { "resume" },
            self.is_user_paused,
            self.is_smart_paused,
            self.state,
            self.remaining_time()
        );
        self.emit(AlarmClockEvent::IsPausedChanged {
            reason,
            is_paused: value,
        });
    }

    /// Freezes or rearms the timer when the pause combinator changes.
    fn sync_timer(&mut self, now: Instant) {
        let should_pause = self.should_pause();
        if should_pause == self.timer_paused {
            return;
        }

        if should_pause {
            self.timer_due_time = self.remaining_at(now);
            self.timer_paused = true;
            self.progress_deadline = None;
            debug!("Timer disarmed at {:?}", self.timer_due_time);
        } else {
            self.timer_start_time = now;
            self.timer_paused = false;
            self.schedule_progress(now);
            debug!("Timer rearmed with {:?}", self.timer_due_time);
        }
    }

    fn schedule_progress(&mut self, now: Instant) {
        let remaining = self.remaining_at(now);
        let mut delay = next_progress_delay(remaining, self.total_time);

        if self.pre_alert_pending() {
            let lead = remaining.saturating_sub(self.config.values().notify_time);
            delay = delay.min(lead.max(MIN_DELAY));
        }

        debug!("Next progress tick in {:?}", delay);
        self.progress_deadline = Some(instant_after(now, delay));
    }

    fn progress_tick(&mut self, now: Instant) {
        let remaining = self.remaining_at(now);
        let progress = self.progress_of(remaining);
        let notify_time = self.config.values().notify_time;
        let pre_alert = self.state == AlarmClockState::Work
            && self.last_remaining > notify_time
            && remaining <= notify_time;
        self.last_remaining = remaining;

        self.emit(AlarmClockEvent::ProgressChanged {
            progress,
            remaining,
            pre_alert,
        });

        if should_reschedule(progress, remaining) || self.pre_alert_pending() {
            self.schedule_progress(now);
        } else {
            self.progress_deadline = None;
        }
    }

    fn emit(&self, event: AlarmClockEvent) {
        // nobody listening is not an error
        let _ = self.event_tx.send(event);
    }
}

fn instant_after(base: Instant, span: Duration) -> Instant {
    base.checked_add(span.min(FAR_FUTURE)).unwrap_or(base)
}

// ============================================================================
// Tests
// ============================================================================
