//! Configuration for duskglow.
//!
//! Settings are read once at startup from a TOML file and never change for
//! the lifetime of the process (a SIGHUP is logged and ignored).
//!
//! ```toml
//! latitude = 52.3676            # Geographic latitude (-90 to +90)
//! longitude = 4.9041            # Geographic longitude, east positive (-180 to +180)
//! transition_speed = "60m"      # Length of a full fade: "<n>s", "<n>m", "<n>h" or bare seconds
//! ping_target = "192.168.1.20"  # Host whose presence keeps the light running
//!
//! #[Optional]
//! backend = "auto"              # "auto", "piglow" or "sysfs"
//! sysfs_leds = ["pwr", "act"]   # LED names under /sys/class/leds (sysfs backend)
//! ping_interval = 60            # Seconds between probe rounds (5-3600)
//! ping_timeout = 2              # Seconds to wait for a reply (1-30)
//! pause_fade = "3s"             # Length of the pause/resume fade (1s-60s)
//! ```
//!
//! ## Search order
//!
//! 1. The path given with `--config`
//! 2. `/etc/duskglow.toml`
//! 3. `$XDG_CONFIG_HOME/duskglow/duskglow.toml`

pub mod loading;
pub mod validation;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::constants::*;
use crate::duration::{TransitionPeriod, parse_duration};

pub use loading::{find_config_path, load, load_from_path};
pub use validation::validate_config;

/// Output device selection.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// PiGlow when its I2C bus is present, sysfs LEDs otherwise
    #[default]
    Auto,
    /// Pimoroni PiGlow (SN3218 driver on the Raspberry Pi I2C bus)
    PiGlow,
    /// Linux LED class devices under /sys/class/leds
    Sysfs,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Auto => "auto",
            Backend::PiGlow => "piglow",
            Backend::Sysfs => "sysfs",
        }
    }
}

/// Settings loaded from `duskglow.toml`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Geographic latitude in degrees (-90 to +90)
    pub latitude: f64,
    /// Geographic longitude in degrees, east positive (-180 to +180)
    pub longitude: f64,
    /// Length of a full 0→255 fade, e.g. "60m"
    pub transition_speed: Option<String>,
    /// Host name or IP address whose reachability drives pause/resume
    pub ping_target: String,

    pub backend: Option<Backend>,
    pub sysfs_leds: Option<Vec<String>>,
    pub ping_interval: Option<u64>, // seconds
    pub ping_timeout: Option<u64>,  // seconds
    pub pause_fade: Option<String>,
}

impl Config {
    /// Configured transition period. Fails when missing, malformed or zero.
    pub fn transition_period(&self) -> Result<TransitionPeriod> {
        let speed = self.transition_speed.as_deref().unwrap_or_default();
        TransitionPeriod::parse(speed)
            .with_context(|| format!("Invalid transition_speed '{speed}'"))
    }

    /// Length of the pause/resume fade.
    pub fn pause_fade(&self) -> Result<Duration> {
        let fade = self.pause_fade.as_deref().unwrap_or(DEFAULT_PAUSE_FADE);
        let secs = parse_duration(fade).with_context(|| format!("Invalid pause_fade '{fade}'"))?;
        Ok(Duration::from_secs(secs))
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval.unwrap_or(DEFAULT_PING_INTERVAL))
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_secs(self.ping_timeout.unwrap_or(DEFAULT_PING_TIMEOUT))
    }

    pub fn backend(&self) -> Backend {
        self.backend.unwrap_or_default()
    }

    /// Log the effective settings.
    pub fn log_config(&self) {
        log_block_start!("Loaded configuration");
        log_indented!("Latitude: {:.6}, Longitude: {:.6}", self.latitude, self.longitude);
        log_indented!(
            "Transition speed: {}",
            self.transition_speed.as_deref().unwrap_or("<unset>")
        );
        log_indented!("Ping target: {}", self.ping_target);
        log_indented!(
            "Ping interval: {}s (timeout {}s)",
            self.ping_interval().as_secs(),
            self.ping_timeout().as_secs()
        );
        log_indented!(
            "Pause fade: {}",
            self.pause_fade.as_deref().unwrap_or(DEFAULT_PAUSE_FADE)
        );
        log_indented!("Backend: {}", self.backend().as_str());
    }
}
