//! Fade windows anchored on sunset and sunrise.
//!
//! A fade window is the stretch of time over which the light ramps fully up
//! (around sunset) or fully down (around sunrise). Its `start` is the solar
//! event minus half the transition period, so the ramp straddles the event
//! symmetrically: with a 60 minute period and sunset at 20:00 the light starts
//! rising at 19:30 and is fully on at 20:30.

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Local, Timelike};
use std::sync::Arc;
use std::time::Duration;

use super::SolarEvents;
use crate::duration::TransitionPeriod;

/// Which way a window moves the brightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeDirection {
    /// Fade-in around sunset, 0 → 255
    Rising,
    /// Fade-out around sunrise, 255 → 0
    Falling,
}

impl FadeDirection {
    pub fn label(&self) -> &'static str {
        match self {
            FadeDirection::Rising => "fadeIn",
            FadeDirection::Falling => "fadeOut",
        }
    }
}

/// A scheduled brightness transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeWindow {
    /// When the ramp begins (solar event minus half the period)
    pub start: DateTime<Local>,
    pub direction: FadeDirection,
}

impl FadeWindow {
    /// Time since the window started, or `None` while it is still in the future.
    pub fn elapsed(&self, now: DateTime<Local>) -> Option<Duration> {
        (now - self.start)
            .to_std()
            .ok()
            .filter(|elapsed| !elapsed.is_zero())
    }

    /// Start time formatted as `HH:MM:SS on M/D/YYYY`.
    pub fn describe(&self) -> String {
        let start = self.start;
        format!(
            "{:02}:{:02}:{:02} on {}/{}/{}",
            start.hour(),
            start.minute(),
            start.second(),
            start.month(),
            start.day(),
            start.year()
        )
    }
}

/// Computes the next fade windows for a fixed location and period.
///
/// Longitude is stored east-positive as configured and negated on every call
/// into the [`SolarEvents`] source, which expects west-positive longitude.
#[derive(Clone)]
pub struct FadeWindowCalculator {
    solar: Arc<dyn SolarEvents>,
    latitude: f64,
    longitude: f64,
    period: TransitionPeriod,
}

impl FadeWindowCalculator {
    pub fn new(
        solar: Arc<dyn SolarEvents>,
        latitude: f64,
        longitude: f64,
        period: TransitionPeriod,
    ) -> Self {
        Self {
            solar,
            latitude,
            longitude,
            period,
        }
    }

    pub fn period(&self) -> TransitionPeriod {
        self.period
    }

    /// Longitude in the west-positive convention of the solar source.
    fn source_longitude(&self) -> f64 {
        -self.longitude
    }

    /// Window centred on the next sunset after `now`.
    pub fn next_fade_in(&self, now: DateTime<Local>) -> Result<FadeWindow> {
        let sunset = self
            .solar
            .next_sunset(now, self.latitude, self.source_longitude())
            .with_context(|| {
                format!(
                    "Failed to calculate next sunset for lat={:.4}, lon={:.4}",
                    self.latitude, self.longitude
                )
            })?;

        Ok(FadeWindow {
            start: sunset - self.period.half(),
            direction: FadeDirection::Rising,
        })
    }

    /// Window centred on the next sunrise after `now`.
    pub fn next_fade_out(&self, now: DateTime<Local>) -> Result<FadeWindow> {
        let sunrise = self
            .solar
            .next_sunrise(now, self.latitude, self.source_longitude())
            .with_context(|| {
                format!(
                    "Failed to calculate next sunrise for lat={:.4}, lon={:.4}",
                    self.latitude, self.longitude
                )
            })?;

        Ok(FadeWindow {
            start: sunrise - self.period.half(),
            direction: FadeDirection::Falling,
        })
    }

    /// Next window of the same direction as `window`.
    pub fn reschedule(&self, window: &FadeWindow, now: DateTime<Local>) -> Result<FadeWindow> {
        match window.direction {
            FadeDirection::Rising => self.next_fade_in(now),
            FadeDirection::Falling => self.next_fade_out(now),
        }
    }
}
