//! Application constants and default values.
//!
//! Defaults for optional configuration fields, validation limits and the
//! fixed parameters of the brightness engine live here so the rest of the
//! code never hard-codes them.

use std::time::Duration;

// # Brightness

/// Highest brightness level the output device accepts.
pub const MAX_BRIGHTNESS: u8 = 255;

/// Number of discrete brightness levels (0..=255).
pub const BRIGHTNESS_LEVELS: u32 = 256;

// # Control loop

/// Upper bound for the control loop tick interval.
pub const MAX_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Fraction of the per-level time used as the tick interval.
pub const TICK_LEVEL_FRACTION: f64 = 0.9;

// # Pause / resume ramp

/// Number of steps in a pause or resume ramp.
pub const RAMP_STEPS: u32 = 51;

pub const DEFAULT_PAUSE_FADE: &str = "3s";
pub const MINIMUM_PAUSE_FADE_SECS: u64 = 1;
pub const MAXIMUM_PAUSE_FADE_SECS: u64 = 60;

// # Liveness probe

pub const DEFAULT_PING_INTERVAL: u64 = 60; // seconds
pub const MINIMUM_PING_INTERVAL: u64 = 5;
pub const MAXIMUM_PING_INTERVAL: u64 = 3600;

pub const DEFAULT_PING_TIMEOUT: u64 = 2; // seconds
pub const MINIMUM_PING_TIMEOUT: u64 = 1;
pub const MAXIMUM_PING_TIMEOUT: u64 = 30;

/// How often background threads re-check the running flag while idle.
pub const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(250);

// # Files and paths

pub const SYSTEM_CONFIG_PATH: &str = "/etc/duskglow.toml";
pub const CONFIG_DIR_NAME: &str = "duskglow";
pub const CONFIG_FILE_NAME: &str = "duskglow.toml";

// # PiGlow (SN3218 LED driver)

pub const PIGLOW_I2C_BUS: &str = "/dev/i2c-1";
pub const PIGLOW_I2C_ADDRESS: u16 = 0x54;
pub const PIGLOW_LED_COUNT: usize = 18;

// # Sysfs LED class

pub const SYSFS_LEDS_DIR: &str = "/sys/class/leds";

// # Exit codes

pub const EXIT_FAILURE: i32 = 1;
