//! Adaptive progress-notification schedule.
//!
//! Instead of ticking every second, progress is reported when the remaining
//! time crosses 75%, 50% and 25% of the phase, then once more when it drops
//! to the final ten seconds. The rest is left to the expiry itself.

use std::time::Duration;

/// Remaining time below which no further quartile ticks are scheduled.
pub const TAIL: Duration = Duration::from_secs(10);

/// Shortest delay ever scheduled.
pub const MIN_DELAY: Duration = Duration::from_secs(1);

const QUARTILES: [f64; 3] = [0.75, 0.50, 0.25];

/// Returns how long to wait before the next progress notification.
pub fn next_progress_delay(remaining: Duration, total: Duration) -> Duration {
    let remaining_ms = remaining.as_secs_f64() * 1000.0;
    let total_ms = total.as_secs_f64() * 1000.0;

    let next_ms = QUARTILES
        .iter()
        .map(|q| total_ms * q)
        .find(|boundary| remaining_ms > *boundary)
        .map(|boundary| remaining_ms - boundary)
        .unwrap_or_else(|| {
            let tail_ms = TAIL.as_secs_f64() * 1000.0;
            if remaining_ms > tail_ms {
                remaining_ms - tail_ms
            } else {
                remaining_ms
            }
        });

    Duration::from_millis(next_ms.ceil() as u64).max(MIN_DELAY)
}

/// Whether another progress tick should follow one reported at `progress`.
///
/// Past the last quartile and inside the tail, the expiry covers the rest.
pub fn should_reschedule(progress: f64, remaining: Duration) -> bool {
    progress > 0.25 || remaining > TAIL
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn test_fresh_phase_waits_for_first_quartile() {
        let total = 45 * MINUTE;
        assert_eq!(
            next_progress_delay(total, total),
            Duration::from_millis(675_000)
        );
    }

    #[test]
    fn test_each_quartile_boundary() {
        let total = 40 * MINUTE;
        // 30 min left: exactly at 75%, so the next boundary is 50%
        assert_eq!(next_progress_delay(30 * MINUTE, total), 10 * MINUTE);
        assert_eq!(next_progress_delay(15 * MINUTE, total), 5 * MINUTE);
        assert_eq!(next_progress_delay(10 * MINUTE, total), 10 * MINUTE - TAIL);
    }

    #[test]
    fn test_tail_fires_at_expiry() {
        let total = 4 * MINUTE;
        assert_eq!(
            next_progress_delay(Duration::from_secs(8), total),
            Duration::from_secs(8)
        );
    }

    #[test]
    fn test_delay_floor_is_one_second() {
        let total = 4 * MINUTE;
        assert_eq!(next_progress_delay(Duration::from_millis(300), total), MIN_DELAY);
        assert_eq!(next_progress_delay(Duration::ZERO, total), MIN_DELAY);
        // 100ms above the 75% boundary
        assert_eq!(
            next_progress_delay(Duration::from_millis(180_100), total),
            MIN_DELAY
        );
    }

    #[test]
    fn test_fractional_millis_round_up() {
        let total = Duration::from_millis(60_002);
        // 75% of 60002ms is 45001.5ms
        assert_eq!(
            next_progress_delay(total, total),
            Duration::from_millis(15_001)
        );
    }

    #[test]
    fn test_should_reschedule() {
        assert!(should_reschedule(0.5, Duration::from_secs(5)));
        assert!(should_reschedule(0.1, Duration::from_secs(11)));
        assert!(!should_reschedule(0.25, TAIL));
        assert!(!should_reschedule(0.0, Duration::ZERO));
    }
}
