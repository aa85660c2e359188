//! Sunrise and sunset lookups.
//!
//! The fade engine only needs "when is the next sunset / sunrise after this
//! instant". That question is answered by a [`SolarEvents`] implementation so
//! tests can substitute fixed event times.
//!
//! ## Longitude convention
//!
//! [`SolarEvents`] takes longitude **west-positive** (the traditional
//! astronomical almanac convention). Configuration stores longitude the usual
//! east-positive way, so callers must negate the configured value before every
//! lookup. [`fade_windows::FadeWindowCalculator`] does this; nothing else
//! should call a `SolarEvents` directly.

pub mod fade_windows;

#[cfg(test)]
mod tests;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Days, Local, NaiveDate, Utc};
use sunrise::{Coordinates, SolarDay, SolarEvent};

pub use fade_windows::{FadeDirection, FadeWindow, FadeWindowCalculator};

/// How far ahead to look for the next event before giving up (polar night/day).
const SEARCH_DAYS: u64 = 3;

/// Source of upcoming solar events.
pub trait SolarEvents: Send + Sync {
    /// First sunset strictly after `now`. `longitude_west` is west-positive.
    fn next_sunset(
        &self,
        now: DateTime<Local>,
        latitude: f64,
        longitude_west: f64,
    ) -> Result<DateTime<Local>>;

    /// First sunrise strictly after `now`. `longitude_west` is west-positive.
    fn next_sunrise(
        &self,
        now: DateTime<Local>,
        latitude: f64,
        longitude_west: f64,
    ) -> Result<DateTime<Local>>;
}

/// Astronomical calculations backed by the `sunrise` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct SunriseCalculator;

impl SunriseCalculator {
    fn next_event(
        &self,
        event: SolarEvent,
        now: DateTime<Local>,
        latitude: f64,
        longitude_west: f64,
    ) -> Result<DateTime<Local>> {
        // The sunrise crate is east-positive
        let coord = Coordinates::new(latitude, -longitude_west).ok_or_else(|| {
            anyhow!("Invalid coordinates: lat={latitude:.4}, lon={:.4}", -longitude_west)
        })?;

        let now_utc = now.with_timezone(&Utc);
        // Start a day early: west of UTC the local evening belongs to the previous UTC date
        let first_day = now_utc
            .date_naive()
            .checked_sub_days(Days::new(1))
            .ok_or_else(|| anyhow!("Date out of range"))?;

        (0..=SEARCH_DAYS)
            .filter_map(|offset| first_day.checked_add_days(Days::new(offset)))
            .filter_map(|day| plausible_event(&SolarDay::new(coord, day), event, day))
            .filter(|time| *time > now_utc)
            .min()
            .map(|time| time.with_timezone(&Local))
            .ok_or_else(|| {
                anyhow!(
                    "No {} within {SEARCH_DAYS} days for lat={latitude:.4}, lon={:.4}",
                    event_name(event),
                    -longitude_west
                )
            })
    }
}

/// Event time for `day`, discarding results the algorithm produces when the
/// sun never crosses the horizon that day.
fn plausible_event(
    solar_day: &SolarDay,
    event: SolarEvent,
    day: NaiveDate,
) -> Option<DateTime<Utc>> {
    let time = solar_day.event_time(event);
    let distance = (time.date_naive() - day).num_days().abs();
    (distance <= 1).then_some(time)
}

fn event_name(event: SolarEvent) -> &'static str {
    match event {
        SolarEvent::Sunrise => "sunrise",
        SolarEvent::Sunset => "sunset",
        _ => "solar event",
    }
}

impl SolarEvents for SunriseCalculator {
    fn next_sunset(
        &self,
        now: DateTime<Local>,
        latitude: f64,
        longitude_west: f64,
    ) -> Result<DateTime<Local>> {
        self.next_event(SolarEvent::Sunset, now, latitude, longitude_west)
    }

    fn next_sunrise(
        &self,
        now: DateTime<Local>,
        latitude: f64,
        longitude_west: f64,
    ) -> Result<DateTime<Local>> {
        self.next_event(SolarEvent::Sunrise, now, latitude, longitude_west)
    }
}
