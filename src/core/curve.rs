//! Brightness curves for the fade windows.
//!
//! Both curves map the time elapsed since a window started onto a device
//! level. They are only evaluated once a window has started (`elapsed > 0`).
//!
//! The two directions are intentionally asymmetric: the rising curve folds
//! back modulo 256 when the scaled value overshoots 255, while the falling
//! curve clamps at 0.

use std::time::Duration;

use crate::constants::{BRIGHTNESS_LEVELS, MAX_BRIGHTNESS};
use crate::duration::TransitionPeriod;

/// Level-per-second rate multiplied by the elapsed time.
fn scaled(elapsed: Duration, period: TransitionPeriod) -> f64 {
    (f64::from(MAX_BRIGHTNESS) / period.as_secs() as f64) * elapsed.as_secs_f64()
}

/// Level for a fade-in window: `ceil(255 * elapsed / period) mod 256`.
pub fn rise_level(elapsed: Duration, period: TransitionPeriod) -> u8 {
    let raw = scaled(elapsed, period).ceil() as u64;
    (raw % u64::from(BRIGHTNESS_LEVELS)) as u8
}

/// Level for a fade-out window: `255 - floor(255 * elapsed / period)`, never below 0.
pub fn fall_level(elapsed: Duration, period: TransitionPeriod) -> u8 {
    let drop = scaled(elapsed, period).floor();
    (f64::from(MAX_BRIGHTNESS) - drop).max(0.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(secs: u64) -> TransitionPeriod {
        TransitionPeriod::from_secs(secs).unwrap()
    }

    #[test]
    fn test_rise_starts_dark() {
        for secs in [1, 60, 3600, 86400] {
            assert_eq!(rise_level(Duration::ZERO, period(secs)), 0);
        }
    }

    #[test]
    fn test_rise_rounds_up() {
        // 127.5 rounds up
        assert_eq!(rise_level(Duration::from_secs(30), period(60)), 128);
        // Any positive elapsed time already lights the first level
        assert_eq!(rise_level(Duration::from_millis(1), period(60)), 1);
    }

    #[test]
    fn test_rise_reaches_full_at_period() {
        assert_eq!(rise_level(Duration::from_secs(60), period(60)), 255);
        assert_eq!(rise_level(Duration::from_secs(3600), period(3600)), 255);
    }

    #[test]
    fn test_rise_wraps_past_period() {
        // Overshooting the period folds back instead of clamping
        assert_eq!(rise_level(Duration::from_millis(60_100), period(60)), 0);
        assert_eq!(rise_level(Duration::from_millis(60_300), period(60)), 1);
        assert_eq!(rise_level(Duration::from_secs(120), period(60)), 254);
    }

    #[test]
    fn test_fall_starts_full() {
        for secs in [1, 60, 3600, 86400] {
            assert_eq!(fall_level(Duration::ZERO, period(secs)), 255);
        }
    }

    #[test]
    fn test_fall_rounds_down_the_drop() {
        // 255 - floor(127.5)
        assert_eq!(fall_level(Duration::from_secs(30), period(60)), 128);
        assert_eq!(fall_level(Duration::from_millis(100), period(60)), 255);
    }

    #[test]
    fn test_fall_clamps_at_zero() {
        for elapsed in [60, 61, 120, 10_000] {
            assert_eq!(fall_level(Duration::from_secs(elapsed), period(60)), 0);
        }
    }

    #[test]
    fn test_rise_is_monotonic_within_period() {
        let period = period(600);
        let mut previous = 0;
        for ms in (0..=600_000).step_by(250) {
            let level = rise_level(Duration::from_millis(ms), period);
            assert!(level >= previous, "rise dropped at {ms}ms");
            previous = level;
        }
        assert_eq!(previous, 255);
    }
}
