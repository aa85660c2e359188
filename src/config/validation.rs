//! Configuration validation functionality.
//!
//! Everything that can make the daemon misbehave later is rejected here, at
//! startup, so the control loop can assume a sane configuration.

use anyhow::Result;

use super::{Backend, Config};
use crate::constants::*;

/// Validate a parsed configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    if !(-90.0..=90.0).contains(&config.latitude) {
        anyhow::bail!(
            "latitude must be between -90 and 90 degrees (got {})",
            config.latitude
        );
    }

    if !(-180.0..=180.0).contains(&config.longitude) {
        anyhow::bail!(
            "longitude must be between -180 and 180 degrees (got {})",
            config.longitude
        );
    }

    // Missing, malformed and zero periods all fail here
    config.transition_period()?;

    if config.ping_target.trim().is_empty() {
        anyhow::bail!("ping_target must not be empty");
    }

    let interval = config.ping_interval().as_secs();
    if !(MINIMUM_PING_INTERVAL..=MAXIMUM_PING_INTERVAL).contains(&interval) {
        anyhow::bail!(
            "ping_interval ({} seconds) must be between {} and {} seconds",
            interval,
            MINIMUM_PING_INTERVAL,
            MAXIMUM_PING_INTERVAL
        );
    }

    let timeout = config.ping_timeout().as_secs();
    if !(MINIMUM_PING_TIMEOUT..=MAXIMUM_PING_TIMEOUT).contains(&timeout) {
        anyhow::bail!(
            "ping_timeout ({} seconds) must be between {} and {} seconds",
            timeout,
            MINIMUM_PING_TIMEOUT,
            MAXIMUM_PING_TIMEOUT
        );
    }

    if timeout >= interval {
        anyhow::bail!(
            "ping_timeout ({timeout}s) must be shorter than ping_interval ({interval}s)"
        );
    }

    let pause_fade = config.pause_fade()?.as_secs();
    if !(MINIMUM_PAUSE_FADE_SECS..=MAXIMUM_PAUSE_FADE_SECS).contains(&pause_fade) {
        anyhow::bail!(
            "pause_fade ({} seconds) must be between {} and {} seconds",
            pause_fade,
            MINIMUM_PAUSE_FADE_SECS,
            MAXIMUM_PAUSE_FADE_SECS
        );
    }

    if config.backend() == Backend::Sysfs
        && config.sysfs_leds.as_ref().is_none_or(|leds| leds.is_empty())
    {
        anyhow::bail!("backend = \"sysfs\" requires at least one entry in sysfs_leds");
    }

    if let Some(leds) = &config.sysfs_leds
        && let Some(bad) = leds
            .iter()
            .find(|name| name.is_empty() || name.contains('/') || name.contains(".."))
    {
        anyhow::bail!("sysfs_leds entry '{bad}' is not a plain LED name");
    }

    Ok(())
}
