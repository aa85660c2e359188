//! Ambient light control loop.
//!
//! [`AmbientController`] owns the output device and drives it from two
//! inputs: the fade windows computed from sunset and sunrise, and the
//! pause/resume edges published by the liveness task. It is the only code
//! that writes brightness or touches the device.
//!
//! Each tick:
//!
//! 1. A pending `Pause` while running ramps the light down to 0 and pauses.
//! 2. A pending `Resume` while paused ramps from 0 up to full brightness and
//!    resumes. Normal scheduling picks up on the next tick.
//! 3. While paused nothing else happens. The fade-window clocks keep running.
//! 4. While running, every fade window that has started computes a level from
//!    its curve, fade-in first. When both windows are active the fade-out
//!    level wins, and only that one level is applied. A fade-in that reaches
//!    255 (or a fade-out that reaches 0) is rescheduled to the next sunset
//!    (sunrise).
//!
//! The loop then sleeps one tick interval on the injected clock.

pub mod curve;
pub mod ramp;


use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::{
    backend::LightBackend,
    constants::*,
    duration::TransitionPeriod,
    geo::{FadeWindow, FadeWindowCalculator},
    liveness::{EdgeSlot, LivenessEdge},
    time_source::TimeSource,
};
use curve::{fall_level, rise_level};
use ramp::Ramp;

/// Tick interval for a transition period: `min(1s, 0.9 * period / 255)`.
///
/// Short enough that consecutive ticks never skip a brightness level.
pub fn tick_interval(period: TransitionPeriod) -> Duration {
    let per_level = period.as_secs() as f64 / f64::from(MAX_BRIGHTNESS);
    Duration::from_secs_f64(per_level * TICK_LEVEL_FRACTION).min(MAX_TICK_INTERVAL)
}

/// Whether scheduled fades are being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Running,
    Paused,
}

/// Everything an [`AmbientController`] needs, bundled to keep `new` readable.
pub struct ControllerParams {
    pub backend: Box<dyn LightBackend>,
    pub calculator: FadeWindowCalculator,
    pub clock: Arc<dyn TimeSource>,
    pub edges: EdgeSlot,
    pub running: Arc<AtomicBool>,
    pub pause_fade: Duration,
    pub debug_enabled: bool,
}

pub struct AmbientController {
    backend: Box<dyn LightBackend>,
    calculator: FadeWindowCalculator,
    clock: Arc<dyn TimeSource>,
    edges: EdgeSlot,
    running: Arc<AtomicBool>,
    pause_fade: Duration,
    debug_enabled: bool,
    tick_interval: Duration,
    fade_in: FadeWindow,
    fade_out: FadeWindow,
    /// Level last applied to the device
    level: u8,
    state: ControllerState,
}

impl AmbientController {
    /// Compute the first fade windows from the clock's current time.
    ///
    /// Fails when either solar lookup fails.
    pub fn new(params: ControllerParams) -> Result<Self> {
        let now = params.clock.now();
        let fade_in = params.calculator.next_fade_in(now)?;
        let fade_out = params.calculator.next_fade_out(now)?;
        let tick_interval = tick_interval(params.calculator.period());

        Ok(Self {
            backend: params.backend,
            calculator: params.calculator,
            clock: params.clock,
            edges: params.edges,
            running: params.running,
            pause_fade: params.pause_fade,
            debug_enabled: params.debug_enabled,
            tick_interval,
            fade_in,
            fade_out,
            level: 0,
            state: ControllerState::Running,
        })
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn fade_in(&self) -> FadeWindow {
        self.fade_in
    }

    pub fn fade_out(&self) -> FadeWindow {
        self.fade_out
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    /// Switch the light off, whatever it showed before.
    pub fn initialize(&mut self) -> Result<()> {
        self.show(0, true)
    }

    /// Stage and apply `level`. Unchanged levels are skipped unless `force`.
    fn show(&mut self, level: u8, force: bool) -> Result<()> {
        if level == self.level && !force {
            return Ok(());
        }
        self.backend.set_all(level);
        self.backend.apply()?;
        self.level = level;
        Ok(())
    }

    /// Run ticks until shutdown is requested or a simulation ends.
    pub fn run(&mut self) -> Result<()> {
        while self.running.load(Ordering::SeqCst) && !self.clock.is_ended() {
            self.tick()?;
            self.clock.sleep(self.tick_interval);
        }
        Ok(())
    }

    /// One control loop iteration, without the trailing sleep.
    pub fn tick(&mut self) -> Result<()> {
        if let Some(edge) = self.edges.take() {
            match (edge, self.state) {
                (LivenessEdge::Pause, ControllerState::Running) => return self.pause(),
                (LivenessEdge::Resume, ControllerState::Paused) => return self.resume(),
                (edge, state) => {
                    if self.debug_enabled {
                        log_debug!("Ignoring {edge:?} edge while {state:?}");
                    }
                }
            }
        }

        if self.state == ControllerState::Paused {
            return Ok(());
        }

        self.evaluate_windows()
    }

    fn pause(&mut self) -> Result<()> {
        log_block_start!("Pausing: fading out from level {}", self.level);
        self.ramp_to(0)?;
        self.state = ControllerState::Paused;
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        log_block_start!("Resuming: fading in to level {MAX_BRIGHTNESS}");
        self.ramp_to(MAX_BRIGHTNESS)?;
        self.state = ControllerState::Running;
        Ok(())
    }

    fn ramp_to(&mut self, target: u8) -> Result<()> {
        let ramp = Ramp::new(self.level, target, self.pause_fade);
        self.level = ramp.run(self.backend.as_mut(), self.clock.as_ref())?;
        Ok(())
    }

    fn evaluate_windows(&mut self) -> Result<()> {
        let period = self.calculator.period();
        let now = self.clock.now();
        let mut target = None;

        let rise_done = match self.fade_in.elapsed(now) {
            Some(elapsed) => {
                let level = rise_level(elapsed, period);
                target = Some(level);
                level == MAX_BRIGHTNESS
            }
            None => false,
        };

        let fall_done = match self.fade_out.elapsed(now) {
            Some(elapsed) => {
                let level = fall_level(elapsed, period);
                target = Some(level);
                level == 0
            }
            None => false,
        };

        // One write per tick, even while both windows overlap
        if let Some(level) = target {
            self.show(level, false)?;
        }

        if rise_done {
            self.fade_in = self.reschedule(self.fade_in)?;
        }
        if fall_done {
            self.fade_out = self.reschedule(self.fade_out)?;
        }

        Ok(())
    }

    fn reschedule(&self, window: FadeWindow) -> Result<FadeWindow> {
        let next = self.calculator.reschedule(&window, self.clock.now())?;
        log_block_start!("{}", describe_next(&next));
        Ok(next)
    }

    /// Switch the device off and release it.
    pub fn shutdown(mut self) -> Result<()> {
        self.backend.cleanup(self.debug_enabled)
    }
}

/// `The next fadeIn  is HH:MM:SS on M/D/YYYY`, padded so both lines align.
pub fn describe_next(window: &FadeWindow) -> String {
    format!(
        "The next {:<7} is {}",
        window.direction.label(),
        window.describe()
    )
}
