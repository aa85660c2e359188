//! In-memory backend that records every applied level.
//!
//! Used by the controller tests and the integration tests in `tests/`. Each
//! `apply` stores the staged level together with the (possibly simulated)
//! time at which it was applied.

use anyhow::Result;
use chrono::{DateTime, Local};
use std::sync::{Arc, Mutex};

use super::LightBackend;
use crate::time_source::TimeSource;

/// One `apply` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedLevel {
    pub level: u8,
    pub at: DateTime<Local>,
}

/// Shared view of what a [`RecordingBackend`] has applied.
#[derive(Debug, Clone, Default)]
pub struct AppliedLog {
    entries: Arc<Mutex<Vec<AppliedLevel>>>,
}

impl AppliedLog {
    pub fn entries(&self) -> Vec<AppliedLevel> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn levels(&self) -> Vec<u8> {
        self.entries().iter().map(|e| e.level).collect()
    }

    pub fn last_level(&self) -> Option<u8> {
        self.entries().last().map(|e| e.level)
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    fn push(&self, entry: AppliedLevel) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }
}

pub struct RecordingBackend {
    clock: Arc<dyn TimeSource>,
    staged: u8,
    log: AppliedLog,
    cleaned_up: Arc<Mutex<bool>>,
}

impl RecordingBackend {
    /// Create a backend and the log handle that observes it.
    pub fn new(clock: Arc<dyn TimeSource>) -> (Self, AppliedLog) {
        let log = AppliedLog::default();
        let backend = Self {
            clock,
            staged: 0,
            log: log.clone(),
            cleaned_up: Arc::new(Mutex::new(false)),
        };
        (backend, log)
    }

    /// Flag that turns true once `cleanup` ran.
    pub fn cleanup_flag(&self) -> Arc<Mutex<bool>> {
        self.cleaned_up.clone()
    }
}

impl LightBackend for RecordingBackend {
    fn set_all(&mut self, level: u8) {
        self.staged = level;
    }

    fn apply(&mut self) -> Result<()> {
        self.log.push(AppliedLevel {
            level: self.staged,
            at: self.clock.now(),
        });
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }

    fn cleanup(&mut self, _debug_enabled: bool) -> Result<()> {
        if let Ok(mut flag) = self.cleaned_up.lock() {
            *flag = true;
        }
        Ok(())
    }
}
