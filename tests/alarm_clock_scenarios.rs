//! Scenario tests for the alarm clock.
//!
//! These drive `AlarmClock` on a `ManualClock` through whole phases and
//! check the observable event stream:
//! - Full work phase with quartile ticks, pre-alert and expiry
//! - Pause composition across user and smart pauses
//! - Defer clamping at both ends
//! - Phase transition with a shortened work time

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use eyeshade::{
    AlarmClock, AlarmClockConfig, AlarmClockEvent, AlarmClockState, Clock, ManualClock,
    MemorySettingsStore, PauseReason, UserConfig,
};

const MINUTE: Duration = Duration::from_secs(60);

// ============================================================================
// Test Helpers
// ============================================================================

fn create_alarm(
    values: AlarmClockConfig,
) -> (
    AlarmClock,
    Arc<ManualClock>,
    mpsc::UnboundedReceiver<AlarmClockEvent>,
) {
    let clock = Arc::new(ManualClock::new());
    let (tx, rx) = mpsc::unbounded_channel();
    let alarm = AlarmClock::new(UserConfig::with_values(values), clock.clone(), tx);
    (alarm, clock, rx)
}

/// Advances the clock by `span`, firing every deadline on the way.
fn run_for(alarm: &mut AlarmClock, clock: &ManualClock, span: Duration) {
    let target = clock.now() + span;
    while let Some(deadline) = alarm.next_deadline() {
        if deadline > target {
            break;
        }
        let now = clock.now();
        if deadline > now {
            clock.advance(deadline - now);
        }
        alarm.on_timer();
    }
    let now = clock.now();
    if target > now {
        clock.advance(target - now);
    }
}

fn drain(rx: &mut mpsc::UnboundedReceiver<AlarmClockEvent>) -> Vec<AlarmClockEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn full_work_phase_reports_quartiles_then_rests() {
    let (mut alarm, clock, mut rx) = create_alarm(AlarmClockConfig::default());
    assert_eq!(alarm.state(), AlarmClockState::Work);
    assert_eq!(alarm.progress(), 1.0);

    run_for(&mut alarm, &clock, Duration::from_millis(33 * 60_000 + 45_000));
    let events = drain(&mut rx);
    match events.last() {
        Some(AlarmClockEvent::ProgressChanged { progress, .. }) => {
            assert!((progress - 0.25).abs() < 1e-9);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    run_for(&mut alarm, &clock, Duration::from_millis(11 * 60_000 + 15_000));
    let events = drain(&mut rx);
    let pre_alerts = events
        .iter()
        .filter(|e| matches!(e, AlarmClockEvent::ProgressChanged { pre_alert: true, .. }))
        .count();
    assert_eq!(pre_alerts, 1);
    assert_eq!(
        events.last(),
        Some(&AlarmClockEvent::StateChanged {
            state: AlarmClockState::Resting
        })
    );
    assert_eq!(alarm.total_time(), 4 * MINUTE);
}

#[test]
fn user_resume_does_not_cancel_smart_pause() {
    let (mut alarm, clock, mut rx) = create_alarm(AlarmClockConfig::default());

    alarm.smart_pause();
    alarm.user_pause();
    alarm.user_resume();
    assert!(alarm.is_paused());

    run_for(&mut alarm, &clock, 10 * MINUTE);
    assert_eq!(alarm.remaining_time(), 45 * MINUTE);

    alarm.smart_awake();
    assert!(!alarm.is_paused());
    run_for(&mut alarm, &clock, 10 * MINUTE);
    assert_eq!(alarm.remaining_time(), 35 * MINUTE);

    let flags: Vec<_> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            AlarmClockEvent::IsPausedChanged { reason, is_paused } => Some((reason, is_paused)),
            _ => None,
        })
        .collect();
    assert_eq!(
        flags,
        vec![
            (PauseReason::Smart, true),
            (PauseReason::User, true),
            (PauseReason::User, false),
            (PauseReason::Smart, false),
        ]
    );
}

#[test]
fn defer_is_clamped_to_phase_bounds() {
    let (mut alarm, clock, _rx) = create_alarm(AlarmClockConfig::default());

    run_for(&mut alarm, &clock, 35 * MINUTE);
    alarm.defer(60 * 60 * 1000);
    assert_eq!(alarm.remaining_time(), 45 * MINUTE);

    run_for(&mut alarm, &clock, 45 * MINUTE - Duration::from_secs(30));
    alarm.defer(-60 * 1000);
    assert_eq!(alarm.remaining_time(), MINUTE);
    assert!(alarm.remaining_time() <= alarm.total_time());
}

#[test]
fn shortest_work_phase_transitions_once() {
    let values = AlarmClockConfig::default()
        .with_work_time(MINUTE)
        .with_resting_time(2 * MINUTE);
    let (mut alarm, clock, mut rx) = create_alarm(values);

    run_for(&mut alarm, &clock, MINUTE);

    let transitions: Vec<_> = drain(&mut rx)
        .into_iter()
        .filter(|e| matches!(e, AlarmClockEvent::StateChanged { .. }))
        .collect();
    assert_eq!(
        transitions,
        vec![AlarmClockEvent::StateChanged {
            state: AlarmClockState::Resting
        }]
    );
    assert_eq!(alarm.total_time(), 2 * MINUTE);
}

#[test]
fn settings_changed_on_the_clock_reach_the_store() {
    let store = MemorySettingsStore::new();
    let clock = Arc::new(ManualClock::new());
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut alarm = AlarmClock::new(UserConfig::load(Box::new(store.clone())), clock, tx);

    alarm.set_work_time(25 * MINUTE).unwrap();
    alarm.set_notify_time(Duration::from_secs(45)).unwrap();

    let reloaded = UserConfig::load(Box::new(store));
    assert_eq!(reloaded.values().work_time, 25 * MINUTE);
    assert_eq!(reloaded.values().notify_time, Duration::from_secs(45));
}
