//! Time source abstraction for real and simulated time.
//!
//! The control loop, the ramp and the probe thread never call `Local::now()`
//! or `thread::sleep` directly; they go through a [`TimeSource`] handed to
//! them at construction. Production uses [`RealTimeSource`]. The `--simulate`
//! flag and the test-suite use [`SimulatedTimeSource`], which jumps forward
//! by exactly the requested amount on every sleep so a whole evening of
//! fading can be replayed in milliseconds.

use chrono::{DateTime, Duration as ChronoDuration, Local, TimeZone};
use std::sync::Mutex;
use std::time::Duration as StdDuration;

/// Trait for abstracting time operations
pub trait TimeSource: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Local>;

    /// Sleep for the specified duration (or simulate it)
    fn sleep(&self, duration: StdDuration);

    /// Check if this is a simulated time source
    fn is_simulated(&self) -> bool;

    /// Check if simulation has ended (always false for real time)
    fn is_ended(&self) -> bool {
        false
    }
}

/// Real-time implementation that uses actual system time
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: StdDuration) {
        std::thread::sleep(duration);
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

/// Fast-forward simulated clock.
///
/// Every `sleep` advances the clock by exactly the requested duration and
/// returns almost immediately. An optional end time caps the clock and marks
/// the simulation as ended once reached.
pub struct SimulatedTimeSource {
    current: Mutex<DateTime<Local>>,
    end_time: Option<DateTime<Local>>,
}

impl SimulatedTimeSource {
    /// Simulation between two instants, used by `--simulate`.
    pub fn new(start_time: DateTime<Local>, end_time: DateTime<Local>) -> Self {
        Self {
            current: Mutex::new(start_time),
            end_time: Some(end_time),
        }
    }

    /// Open-ended simulation starting at `start_time`.
    pub fn starting_at(start_time: DateTime<Local>) -> Self {
        Self {
            current: Mutex::new(start_time),
            end_time: None,
        }
    }

    /// Move the clock forward without going through `sleep`.
    pub fn advance(&self, duration: StdDuration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        let step =
            ChronoDuration::from_std(duration).unwrap_or_else(|_| ChronoDuration::days(36_500));
        let mut next = current.checked_add_signed(step).unwrap_or(*current);
        if let Some(end) = self.end_time {
            next = next.min(end);
        }
        *current = next;
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now(&self) -> DateTime<Local> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn sleep(&self, duration: StdDuration) {
        self.advance(duration);
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn is_ended(&self) -> bool {
        self.end_time.is_some_and(|end| self.now() >= end)
    }
}

/// Parse a datetime string in the format "YYYY-MM-DD HH:MM:SS"
pub fn parse_datetime(s: &str) -> Result<DateTime<Local>, String> {
    use chrono::NaiveDateTime;

    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| {
            Local
                .from_local_datetime(&naive)
                .single()
                .ok_or_else(|| "Ambiguous or invalid local time".to_string())
        })
        .map_err(|e| format!("Invalid datetime format: {e}. Use YYYY-MM-DD HH:MM:SS"))
        .and_then(|r| r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_sleep_advances_exactly() {
        let start = parse_datetime("2026-06-21 18:00:00").unwrap();
        let clock = SimulatedTimeSource::starting_at(start);

        clock.sleep(StdDuration::from_millis(1500));
        assert_eq!(clock.now() - start, ChronoDuration::milliseconds(1500));
        assert!(clock.is_simulated());
        assert!(!clock.is_ended());
    }

    #[test]
    fn test_simulated_clock_caps_at_end() {
        let start = parse_datetime("2026-06-21 18:00:00").unwrap();
        let end = parse_datetime("2026-06-21 18:01:00").unwrap();
        let clock = SimulatedTimeSource::new(start, end);

        clock.sleep(StdDuration::from_secs(3600));
        assert_eq!(clock.now(), end);
        assert!(clock.is_ended());
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        assert!(parse_datetime("yesterday").is_err());
        assert!(parse_datetime("2026-06-21").is_err());
    }

    #[test]
    fn test_real_time_source_is_not_simulated() {
        let clock = RealTimeSource;
        assert!(!clock.is_simulated());
        assert!(!clock.is_ended());
    }
}
