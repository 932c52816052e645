//! Async host for the alarm clock.
//!
//! `AlarmClockService` shares one `AlarmClock` behind a tokio mutex and
//! drives it with a single task that sleeps until the next deadline. Every
//! command wakes the task so it can recompute that deadline.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{mpsc, Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::sleep_until;
use tracing::debug;

use super::alarm::{AlarmClock, AlarmClockEvent};
use super::clock::TokioClock;
use crate::config::{ConfigError, UserConfig};
use crate::types::{AlarmClockStatus, AlarmCommand};

/// Cloneable handle to a running alarm clock.
#[derive(Clone)]
pub struct AlarmClockService {
    alarm: Arc<Mutex<AlarmClock>>,
    rearm: Arc<Notify>,
}

impl AlarmClockService {
    /// Wraps an existing alarm clock.
    pub fn new(alarm: AlarmClock) -> Self {
        Self {
            alarm: Arc::new(Mutex::new(alarm)),
            rearm: Arc::new(Notify::new()),
        }
    }

    /// Creates a service on the tokio clock and returns its event stream.
    pub fn start(config: UserConfig) -> (Self, mpsc::UnboundedReceiver<AlarmClockEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let alarm = AlarmClock::new(config, Arc::new(TokioClock), event_tx);
        (Self::new(alarm), event_rx)
    }

    /// Spawns the driver task.
    ///
    /// The task exits once every handle to the service is dropped. Aborting
    /// the returned handle cancels the timer at once.
    pub fn spawn(&self) -> JoinHandle<()> {
        tokio::spawn(drive(Arc::downgrade(&self.alarm), Arc::clone(&self.rearm)))
    }

    /// Applies a command and returns the resulting status.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a setter command carries an invalid value.
    /// Nothing is changed in that case.
    pub async fn execute(&self, command: AlarmCommand) -> Result<AlarmClockStatus, ConfigError> {
        let status = {
            let mut alarm = self.alarm.lock().await;
            match command {
                AlarmCommand::Work => alarm.work(),
                AlarmCommand::Rest => alarm.rest(),
                AlarmCommand::Skip => alarm.skip(),
                AlarmCommand::Defer { delta_ms } => alarm.defer(delta_ms),
                AlarmCommand::UserPause => alarm.user_pause(),
                AlarmCommand::UserResume => alarm.user_resume(),
                AlarmCommand::SmartPause => alarm.smart_pause(),
                AlarmCommand::SmartAwake => alarm.smart_awake(),
                AlarmCommand::Status => {}
                AlarmCommand::SetWorkTime(value) => alarm.set_work_time(value)?,
                AlarmCommand::SetRestingTime(value) => alarm.set_resting_time(value)?,
                AlarmCommand::SetNotifyTime(value) => alarm.set_notify_time(value)?,
                AlarmCommand::SetRingerVolume(value) => alarm.set_ringer_volume(value)?,
                AlarmCommand::SetAutoPauseWhenUserLeave(value) => {
                    alarm.set_auto_pause_when_user_leave(value)
                }
            }
            alarm.status()
        };

        self.rearm.notify_one();
        Ok(status)
    }

    pub async fn status(&self) -> AlarmClockStatus {
        self.alarm.lock().await.status()
    }

    /// Runs `f` with exclusive access to the alarm clock, then rearms.
    pub async fn with_alarm<R>(&self, f: impl FnOnce(&mut AlarmClock) -> R) -> R {
        let result = f(&mut *self.alarm.lock().await);
        self.rearm.notify_one();
        result
    }

    /// Shorthand for a signed defer in whole minutes.
    pub async fn defer_minutes(&self, minutes: i64) -> AlarmClockStatus {
        let delta_ms = minutes.saturating_mul(Duration::from_secs(60).as_millis() as i64);
        self.with_alarm(|alarm| {
            alarm.defer(delta_ms);
            alarm.status()
        })
        .await
    }
}

impl Drop for AlarmClockService {
    fn drop(&mut self) {
        // lets the driver notice when this was the last handle
        self.rearm.notify_one();
    }
}

/// Sleeps until the next deadline and fires it, until the clock is gone.
async fn drive(alarm: Weak<Mutex<AlarmClock>>, rearm: Arc<Notify>) {
    loop {
        let Some(strong) = alarm.upgrade() else {
            debug!("Alarm clock service dropped, stopping driver");
            return;
        };
        let deadline = strong.lock().await.next_deadline();
        drop(strong);

        match deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = sleep_until(deadline) => {
                        if let Some(strong) = alarm.upgrade() {
                            strong.lock().await.on_timer();
                        }
                    }
                    _ = rearm.notified() => {
                        debug!("Rearming alarm timer");
                    }
                }
            }
            None => {
                debug!("Alarm timer disarmed, waiting for a command");
                rearm.notified().await;
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
