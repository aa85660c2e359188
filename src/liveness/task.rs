//! Background probe thread.
//!
//! Runs one probe round per interval, feeds the result into a
//! [`LivenessMonitor`] owned by the thread, and publishes any edge into the
//! shared [`EdgeSlot`]. The monitor state never leaves this thread.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::{EdgeSlot, LivenessMonitor, LivenessProbe};
use crate::constants::SHUTDOWN_POLL_INTERVAL;

/// Run a single probe round and publish the resulting edge, if any.
pub(crate) fn run_probe_round(
    probe: &mut dyn LivenessProbe,
    monitor: &mut LivenessMonitor,
    edges: &EdgeSlot,
    debug_enabled: bool,
) {
    let edge = match probe.probe() {
        Ok(Some(rtt)) => {
            if debug_enabled {
                log_debug!(
                    "Ping reply from {} in {:.1} ms",
                    probe.target(),
                    rtt.as_secs_f64() * 1000.0
                );
            }
            monitor.on_receive(probe.target(), rtt)
        }
        Ok(None) => {
            if debug_enabled {
                log_debug!("No ping reply from {}", probe.target());
            }
            monitor.on_idle()
        }
        Err(e) => {
            // Cannot tell whether the host is there; count it as silence
            log_warning!("Ping round failed: {e}");
            monitor.on_idle()
        }
    };

    if let Some(edge) = edge {
        edges.publish(edge);
    }
}

/// Sleep for `interval`, waking early when `running` is cleared.
fn wait_interval(interval: Duration, running: &AtomicBool) {
    let start = Instant::now();
    while running.load(Ordering::SeqCst) {
        let remaining = interval.saturating_sub(start.elapsed());
        if remaining.is_zero() {
            break;
        }
        thread::sleep(remaining.min(SHUTDOWN_POLL_INTERVAL));
    }
}

/// Start the probe thread. It exits once `running` goes false.
pub fn spawn_liveness_task(
    mut probe: Box<dyn LivenessProbe>,
    interval: Duration,
    edges: EdgeSlot,
    running: Arc<AtomicBool>,
    debug_enabled: bool,
) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("liveness".to_string())
        .spawn(move || {
            let mut monitor = LivenessMonitor::new();
            while running.load(Ordering::SeqCst) {
                run_probe_round(probe.as_mut(), &mut monitor, &edges, debug_enabled);
                wait_interval(interval, &running);
            }
        })
        .context("Failed to start liveness probe thread")
}
