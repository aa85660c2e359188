//! Fixed-length brightness ramps for pause and resume.
//!
//! A ramp moves the light from one level to another in [`RAMP_STEPS`] equal
//! steps spread over a fixed duration, independent of how far it has to go.
//! Step `i` is applied at `start + i * duration / steps`, so the final level
//! lands exactly when the ramp ends. Steps that would not change the level
//! are not sent to the device, but their time still passes.
//!
//! Once started, a ramp always runs to completion; shutdown requests are
//! only observed by the control loop between ticks.

use anyhow::Result;
use std::time::Duration;

use crate::backend::LightBackend;
use crate::constants::RAMP_STEPS;
use crate::time_source::TimeSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ramp {
    from: u8,
    to: u8,
    steps: u32,
    duration: Duration,
}

impl Ramp {
    pub fn new(from: u8, to: u8, duration: Duration) -> Self {
        Self {
            from,
            to,
            steps: RAMP_STEPS,
            duration,
        }
    }

    /// Level reached after `step` of `steps` steps.
    fn level_at(&self, step: u32) -> u8 {
        let progress = f64::from(step) / f64::from(self.steps);
        let delta = f64::from(self.to) - f64::from(self.from);
        (f64::from(self.from) + delta * progress).round() as u8
    }

    /// Every step's level, ending with `to`.
    pub fn levels(&self) -> Vec<u8> {
        (1..=self.steps).map(|step| self.level_at(step)).collect()
    }

    pub fn step_interval(&self) -> Duration {
        self.duration / self.steps
    }

    /// Run the ramp against `backend`, sleeping on `clock` between steps.
    ///
    /// Returns the final level. A device error aborts the ramp.
    pub fn run(&self, backend: &mut dyn LightBackend, clock: &dyn TimeSource) -> Result<u8> {
        if self.from == self.to {
            return Ok(self.to);
        }

        let interval = self.step_interval();
        let mut current = self.from;
        for level in self.levels() {
            clock.sleep(interval);
            if level != current {
                backend.set_all(level);
                backend.apply()?;
                current = level;
            }
        }
        Ok(current)
    }
}
