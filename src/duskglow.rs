//! Application coordinator that manages the complete lifecycle of duskglow.
//!
//! Handles resource acquisition and orchestration around the control loop:
//!
//! - Clock selection (real time, or a fast-forwarded simulation)
//! - Configuration loading
//! - PID file locking
//! - Backend detection, creation and device initialisation
//! - Signal handler and liveness probe threads
//! - Clean shutdown of the device and background threads
//!
//! ```no_run
//! use duskglow::Duskglow;
//! use duskglow::args::RunOptions;
//!
//! # fn main() -> anyhow::Result<()> {
//! Duskglow::new(RunOptions::default()).run()?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result, anyhow};
use std::sync::Arc;
use std::sync::atomic::Ordering;

use crate::{
    args::RunOptions,
    backend::{create_backend, detect_backend},
    config::{self, Config},
    core::{AmbientController, ControllerParams, describe_next},
    geo::{FadeWindowCalculator, SunriseCalculator},
    io::pidfile::PidFile,
    io::signals::setup_signal_handler,
    liveness::{EdgeSlot, PingProbe, resolve_target, spawn_liveness_task},
    logger::Log,
    time_source::{RealTimeSource, SimulatedTimeSource, TimeSource, parse_datetime},
};

/// Builder-style entry point for running duskglow.
pub struct Duskglow {
    options: RunOptions,
}

impl Duskglow {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    /// Clock for this run: simulated between the `--simulate` bounds, real otherwise.
    fn clock(&self) -> Result<Arc<dyn TimeSource>> {
        let Some((start, end)) = &self.options.simulate else {
            return Ok(Arc::new(RealTimeSource));
        };

        let start = parse_datetime(start).map_err(|e| anyhow!("Invalid start time: {e}"))?;
        let end = parse_datetime(end).map_err(|e| anyhow!("Invalid end time: {e}"))?;
        if end <= start {
            anyhow::bail!("Simulation end time must be after its start time");
        }

        Ok(Arc::new(SimulatedTimeSource::new(start, end)))
    }

    /// Execute the application until shutdown, a simulation end, or a fatal error.
    pub fn run(self) -> Result<()> {
        let debug_enabled = self.options.debug_enabled;
        let clock = self.clock()?;
        if clock.is_simulated() {
            Log::set_simulated_clock(clock.clone());
        }

        log_version!();
        if debug_enabled {
            log_pipe!();
            log_debug!("Debug mode enabled");
        }
        if clock.is_simulated() {
            log_block_start!("Simulating from {}", clock.now().format("%Y-%m-%d %H:%M:%S"));
        }

        let config = config::load(self.options.config_path.as_deref())?;
        config.log_config();

        let period = config.transition_period()?;
        let pause_fade = config.pause_fade()?;

        let _pid_file = match &self.options.pidfile {
            Some(path) if !self.options.test_only => Some(PidFile::acquire(path)?),
            _ => None,
        };

        let target = resolve_target(&config.ping_target)?;

        let backend_type = detect_backend(&config)?;
        let backend = create_backend(backend_type, &config, debug_enabled)?;
        log_block_start!("Using {} backend", backend_type.name());

        let signal_state = setup_signal_handler(debug_enabled)?;
        let running = signal_state.running;
        let edges = EdgeSlot::new();

        let calculator = FadeWindowCalculator::new(
            Arc::new(SunriseCalculator),
            config.latitude,
            config.longitude,
            period,
        );

        let mut controller = AmbientController::new(ControllerParams {
            backend,
            calculator,
            clock: clock.clone(),
            edges: edges.clone(),
            running: running.clone(),
            pause_fade,
            debug_enabled,
        })?;
        controller
            .initialize()
            .context("Failed to switch the light off at startup")?;

        announce(&controller, &config, period.as_secs());

        if self.options.test_only {
            log_end!();
            return Ok(());
        }

        let probe = PingProbe::new(target, config.ping_timeout());
        let liveness = spawn_liveness_task(
            Box::new(probe),
            config.ping_interval(),
            edges,
            running.clone(),
            debug_enabled,
        )?;
        log_block_start!(
            "Watching {} every {}s",
            target,
            config.ping_interval().as_secs()
        );

        let result = controller.run();

        running.store(false, Ordering::SeqCst);
        if liveness.join().is_err() {
            log_pipe!();
            log_critical!("Liveness probe thread panicked");
        }

        if let Err(e) = controller.shutdown() {
            log_pipe!();
            log_error!("Failed to switch the light off: {e:#}");
        }

        result?;

        log_block_start!("Stopped");
        log_end!();
        Ok(())
    }
}

/// Startup summary: timing, location and the first fade windows.
fn announce(controller: &AmbientController, config: &Config, period_secs: u64) {
    log_block_start!(
        "Transition time in seconds: {}, Sleep duration: {:.4}",
        period_secs,
        controller.tick_interval().as_secs_f64()
    );
    log_decorated!(
        "Latitude: {:.6}, Longitude: {:.6}",
        config.latitude,
        config.longitude
    );
    log_decorated!("Output device: {}", controller.backend_name());
    log_decorated!("{}", describe_next(&controller.fade_in()));
    log_decorated!("{}", describe_next(&controller.fade_out()));
}
