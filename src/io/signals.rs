//! Unix signal handling for duskglow.
//!
//! A background thread blocks on signal delivery and turns each signal into a
//! [`SignalMessage`]. Shutdown requests clear the shared `running` flag, which
//! the control loop and the liveness task both poll.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM},
    iterator::Signals,
};
use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    thread,
};

/// What a received signal asks the daemon to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMessage {
    /// SIGINT, SIGTERM or SIGQUIT
    Shutdown,
    /// SIGHUP. Configuration is fixed for the process lifetime, so this is
    /// only acknowledged.
    ReloadRequested,
}

impl SignalMessage {
    /// Map a raw signal number, `None` for signals we never registered.
    pub fn from_signal(sig: i32) -> Option<Self> {
        match sig {
            SIGINT | SIGTERM | SIGQUIT => Some(SignalMessage::Shutdown),
            SIGHUP => Some(SignalMessage::ReloadRequested),
            _ => None,
        }
    }
}

/// Signal handling state shared between threads
pub struct SignalState {
    /// Atomic flag indicating if the application should keep running
    pub running: Arc<AtomicBool>,
}

/// Apply a signal message to the shared state.
pub fn handle_signal_message(message: SignalMessage, running: &AtomicBool) {
    match message {
        SignalMessage::Shutdown => {
            log_pipe!();
            log_info!("Received shutdown signal, stopping");
            running.store(false, Ordering::SeqCst);
        }
        SignalMessage::ReloadRequested => {
            log_pipe!();
            log_warning!("Received SIGHUP: configuration reload is not supported, ignoring");
        }
    }
}

/// Set up signal handling for the application.
///
/// Spawns the signal thread and returns the `running` flag it controls.
pub fn setup_signal_handler(debug_enabled: bool) -> Result<SignalState> {
    let running = Arc::new(AtomicBool::new(true));

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGQUIT, SIGHUP])
        .context("failed to register signal handlers")?;

    let running_clone = running.clone();

    thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            for sig in signals.forever() {
                let Some(message) = SignalMessage::from_signal(sig) else {
                    continue;
                };

                if debug_enabled {
                    log_debug!("Signal {sig} received: {message:?}");
                }

                handle_signal_message(message, &running_clone);

                if message == SignalMessage::Shutdown {
                    break;
                }
            }
        })
        .context("failed to start signal handler thread")?;

    Ok(SignalState { running })
}
