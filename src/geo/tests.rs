use super::*;
use chrono::{Duration as ChronoDuration, TimeZone, Timelike};
use std::sync::{Arc, Mutex};

use crate::duration::TransitionPeriod;

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .unwrap()
        .with_timezone(&Local)
}

/// Solar source returning fixed instants and recording the longitudes it saw.
struct FixedSolar {
    sunset: DateTime<Local>,
    sunrise: DateTime<Local>,
    longitudes: Mutex<Vec<f64>>,
}

impl SolarEvents for FixedSolar {
    fn next_sunset(&self, _now: DateTime<Local>, _lat: f64, lon: f64) -> Result<DateTime<Local>> {
        self.longitudes.lock().unwrap().push(lon);
        Ok(self.sunset)
    }

    fn next_sunrise(&self, _now: DateTime<Local>, _lat: f64, lon: f64) -> Result<DateTime<Local>> {
        self.longitudes.lock().unwrap().push(lon);
        Ok(self.sunrise)
    }
}

struct FailingSolar;

impl SolarEvents for FailingSolar {
    fn next_sunset(&self, _now: DateTime<Local>, _lat: f64, _lon: f64) -> Result<DateTime<Local>> {
        anyhow::bail!("ephemeris unavailable")
    }

    fn next_sunrise(&self, _now: DateTime<Local>, _lat: f64, _lon: f64) -> Result<DateTime<Local>> {
        anyhow::bail!("ephemeris unavailable")
    }
}

#[test]
fn test_sunset_amsterdam_midsummer() {
    let now = utc(2026, 6, 21, 12, 0);
    // Amsterdam is 4.90° east, i.e. -4.90 in the west-positive convention
    let sunset = SunriseCalculator
        .next_sunset(now, 52.37, -4.90)
        .unwrap()
        .with_timezone(&Utc);

    assert_eq!(sunset.date_naive(), now.with_timezone(&Utc).date_naive());
    let minutes = sunset.hour() * 60 + sunset.minute();
    assert!(
        (19 * 60 + 50..=20 * 60 + 25).contains(&minutes),
        "unexpected sunset {sunset}"
    );
}

#[test]
fn test_sunrise_is_next_morning_after_noon() {
    let now = utc(2026, 6, 21, 12, 0);
    let sunrise = SunriseCalculator
        .next_sunrise(now, 52.37, -4.90)
        .unwrap()
        .with_timezone(&Utc);

    assert_eq!(sunrise.format("%Y-%m-%d").to_string(), "2026-06-22");
    let minutes = sunrise.hour() * 60 + sunrise.minute();
    assert!(
        (3 * 60..=3 * 60 + 35).contains(&minutes),
        "unexpected sunrise {sunrise}"
    );
}

#[test]
fn test_sunset_west_of_utc_crosses_date() {
    // New York sunset on 21 June falls after midnight UTC
    let now = utc(2026, 6, 21, 18, 0);
    let sunset = SunriseCalculator
        .next_sunset(now, 40.71, 74.00)
        .unwrap()
        .with_timezone(&Utc);

    assert!(sunset > now.with_timezone(&Utc));
    assert!(sunset - now.with_timezone(&Utc) < ChronoDuration::hours(8));
}

#[test]
fn test_next_event_is_strictly_after_now() {
    let start = utc(2026, 3, 1, 0, 0);
    let mut now = start;
    for _ in 0..5 {
        let sunset = SunriseCalculator.next_sunset(now, 52.37, -4.90).unwrap();
        assert!(sunset > now);
        assert!(sunset - now <= ChronoDuration::hours(25));
        now = sunset;
    }
    assert!(now - start > ChronoDuration::days(3));
}

#[test]
fn test_invalid_latitude_is_an_error() {
    let now = utc(2026, 6, 21, 12, 0);
    assert!(SunriseCalculator.next_sunset(now, 123.0, 0.0).is_err());
}

#[test]
fn test_calculator_negates_longitude() {
    let sunset = utc(2026, 6, 21, 20, 0);
    let sunrise = utc(2026, 6, 22, 3, 0);
    let solar = Arc::new(FixedSolar {
        sunset,
        sunrise,
        longitudes: Mutex::new(Vec::new()),
    });
    let calc = FadeWindowCalculator::new(
        solar.clone(),
        52.37,
        4.90,
        TransitionPeriod::from_secs(3600).unwrap(),
    );

    calc.next_fade_in(sunset).unwrap();
    calc.next_fade_out(sunset).unwrap();

    assert_eq!(*solar.longitudes.lock().unwrap(), vec![-4.90, -4.90]);
}

#[test]
fn test_windows_start_half_period_before_event() {
    let sunset = utc(2026, 6, 21, 20, 0);
    let sunrise = utc(2026, 6, 22, 3, 0);
    let solar = Arc::new(FixedSolar {
        sunset,
        sunrise,
        longitudes: Mutex::new(Vec::new()),
    });
    let calc = FadeWindowCalculator::new(
        solar,
        52.37,
        4.90,
        TransitionPeriod::from_secs(3600).unwrap(),
    );
    let now = utc(2026, 6, 21, 12, 0);

    let fade_in = calc.next_fade_in(now).unwrap();
    assert_eq!(fade_in.direction, FadeDirection::Rising);
    assert_eq!(fade_in.start, sunset - ChronoDuration::minutes(30));

    let fade_out = calc.next_fade_out(now).unwrap();
    assert_eq!(fade_out.direction, FadeDirection::Falling);
    assert_eq!(fade_out.start, sunrise - ChronoDuration::minutes(30));

    assert_eq!(calc.reschedule(&fade_in, now).unwrap(), fade_in);
    assert_eq!(calc.reschedule(&fade_out, now).unwrap(), fade_out);
}

#[test]
fn test_window_elapsed_only_after_start() {
    let start = utc(2026, 6, 21, 19, 30);
    let window = FadeWindow {
        start,
        direction: FadeDirection::Rising,
    };

    assert_eq!(window.elapsed(start - ChronoDuration::seconds(1)), None);
    assert_eq!(window.elapsed(start), None);
    assert_eq!(
        window.elapsed(start + ChronoDuration::milliseconds(1500)),
        Some(std::time::Duration::from_millis(1500))
    );
}

#[test]
fn test_lookup_failure_carries_context() {
    let calc = FadeWindowCalculator::new(
        Arc::new(FailingSolar),
        10.0,
        20.0,
        TransitionPeriod::from_secs(60).unwrap(),
    );
    let err = calc.next_fade_in(utc(2026, 1, 1, 0, 0)).unwrap_err();
    assert!(err.to_string().contains("next sunset"));
    assert!(calc.next_fade_out(utc(2026, 1, 1, 0, 0)).is_err());
}

#[test]
fn test_describe_format() {
    let start = Local.with_ymd_and_hms(2026, 3, 7, 6, 5, 9).unwrap();
    let window = FadeWindow {
        start,
        direction: FadeDirection::Falling,
    };
    assert_eq!(window.describe(), "06:05:09 on 3/7/2026");
}
