//! Reachability monitoring of a watched host.
//!
//! The light is paused while the watched host (typically a media box or a
//! desktop) stops answering pings and resumed when it answers again. This
//! module holds the pure state machine ([`LivenessMonitor`]) and the single
//! slot ([`EdgeSlot`]) through which the probe thread hands edges to the
//! control loop. The probe itself lives in [`probe`] and the thread that
//! drives it in [`task`].

pub mod probe;
pub mod task;

use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

pub use probe::{LivenessProbe, PingProbe, resolve_target};
pub use task::spawn_liveness_task;

/// Last observed reachability of the watched host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LivenessState {
    #[default]
    Unknown,
    Up,
    Down,
}

/// One-time notification that reachability changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessEdge {
    /// The host went away: fade the light off
    Pause,
    /// The host came back: fade the light back in
    Resume,
}

/// Edge-triggered state machine fed by probe results.
///
/// Starts in `Unknown`; a first reply moves to `Up` and a first silence moves
/// to `Down` without emitting anything, so a host that is already down at
/// startup never causes a pause.
#[derive(Debug, Default)]
pub struct LivenessMonitor {
    state: LivenessState,
}

impl LivenessMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn state(&self) -> LivenessState {
        self.state
    }

    /// The probe got an answer from `addr`.
    pub fn on_receive(&mut self, addr: IpAddr, rtt: Duration) -> Option<LivenessEdge> {
        let edge = (self.state == LivenessState::Down).then_some(LivenessEdge::Resume);
        if edge.is_some() {
            log_pipe!();
            log_info!("Host {addr} is back (rtt {:.1} ms)", rtt.as_secs_f64() * 1000.0);
        }
        self.state = LivenessState::Up;
        edge
    }

    /// A probe round finished without any answer.
    pub fn on_idle(&mut self) -> Option<LivenessEdge> {
        let edge = (self.state == LivenessState::Up).then_some(LivenessEdge::Pause);
        if edge.is_some() {
            log_pipe!();
            log_info!("Watched host stopped responding");
        }
        self.state = LivenessState::Down;
        edge
    }
}

const SLOT_EMPTY: u8 = 0;
const SLOT_PAUSE: u8 = 1;
const SLOT_RESUME: u8 = 2;

/// Single-slot mailbox for the latest liveness edge.
///
/// Publishing overwrites whatever is pending (only the latest direction
/// matters) and taking clears the slot in the same atomic operation, so an
/// edge is consumed at most once and never lost between read and clear.
#[derive(Debug, Clone, Default)]
pub struct EdgeSlot {
    slot: Arc<AtomicU8>,
}

impl EdgeSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, edge: LivenessEdge) {
        let value = match edge {
            LivenessEdge::Pause => SLOT_PAUSE,
            LivenessEdge::Resume => SLOT_RESUME,
        };
        self.slot.store(value, Ordering::SeqCst);
    }

    pub fn take(&self) -> Option<LivenessEdge> {
        match self.slot.swap(SLOT_EMPTY, Ordering::SeqCst) {
            SLOT_PAUSE => Some(LivenessEdge::Pause),
            SLOT_RESUME => Some(LivenessEdge::Resume),
            _ => None,
        }
    }
}
