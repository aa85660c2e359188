//! Light output backends.
//!
//! The control loop only ever needs two things from a device: stage one
//! brightness level for every LED, and push it out. Backends implement
//! [`LightBackend`] and are selected by [`detect_backend`] from the
//! configuration and the hardware that is actually present.
//!
//! ## Available Backends
//!
//! - **PiGlow**: Pimoroni PiGlow board, an SN3218 LED driver on `/dev/i2c-1`
//! - **Sysfs**: Any Linux LED class device under `/sys/class/leds`

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::{Backend, Config};
use crate::constants::*;

pub mod piglow;
pub mod sysfs;

#[cfg(any(test, feature = "testing-support"))]
pub mod recording;

/// A device that displays one brightness level.
#[cfg_attr(test, mockall::automock)]
pub trait LightBackend {
    /// Stage `level` for every LED. Nothing is visible until [`apply`].
    ///
    /// [`apply`]: LightBackend::apply
    fn set_all(&mut self, level: u8);

    /// Push the staged level to the hardware.
    fn apply(&mut self) -> Result<()>;

    /// Human-readable backend name for log output.
    fn backend_name(&self) -> &'static str;

    /// Release the device on shutdown.
    ///
    /// The default implementation does nothing.
    fn cleanup(&mut self, debug_enabled: bool) -> Result<()> {
        let _ = debug_enabled;
        Ok(())
    }
}

/// Enumeration of available backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    PiGlow,
    Sysfs,
}

impl BackendType {
    /// Get the human-readable name for this backend type.
    pub fn name(&self) -> &'static str {
        match self {
            BackendType::PiGlow => "PiGlow",
            BackendType::Sysfs => "sysfs LEDs",
        }
    }
}

/// Pick the backend for this configuration and machine.
pub fn detect_backend(config: &Config) -> Result<BackendType> {
    detect_backend_at(config, Path::new(PIGLOW_I2C_BUS))
}

pub(crate) fn detect_backend_at(config: &Config, i2c_bus: &Path) -> Result<BackendType> {
    let has_sysfs_leds = config
        .sysfs_leds
        .as_ref()
        .is_some_and(|leds| !leds.is_empty());

    match config.backend() {
        Backend::PiGlow => {
            if !i2c_bus.exists() {
                anyhow::bail!(
                    "backend = \"piglow\" but {} does not exist (is I2C enabled?)",
                    i2c_bus.display()
                );
            }
            Ok(BackendType::PiGlow)
        }
        Backend::Sysfs => Ok(BackendType::Sysfs),
        Backend::Auto => {
            if i2c_bus.exists() {
                Ok(BackendType::PiGlow)
            } else if has_sysfs_leds {
                Ok(BackendType::Sysfs)
            } else {
                anyhow::bail!(
                    "No output device found: {} does not exist and no sysfs_leds are configured",
                    i2c_bus.display()
                )
            }
        }
    }
}

/// Open the selected backend.
pub fn create_backend(
    backend_type: BackendType,
    config: &Config,
    debug_enabled: bool,
) -> Result<Box<dyn LightBackend>> {
    match backend_type {
        BackendType::PiGlow => Ok(Box::new(
            piglow::PiGlowBackend::open(Path::new(PIGLOW_I2C_BUS), debug_enabled)
                .context("Failed to initialise PiGlow")?,
        ) as Box<dyn LightBackend>),
        BackendType::Sysfs => {
            let names = config.sysfs_leds.clone().unwrap_or_default();
            Ok(Box::new(
                sysfs::SysfsBackend::open(Path::new(SYSFS_LEDS_DIR), &names, debug_enabled)
                    .context("Failed to open sysfs LEDs")?,
            ) as Box<dyn LightBackend>)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::test_constants::*;
    use tempfile::tempdir;

    fn config_with(backend: Option<Backend>, sysfs_leds: Option<Vec<&str>>) -> Config {
        Config {
            latitude: TEST_LATITUDE,
            longitude: TEST_LONGITUDE,
            transition_speed: Some(TEST_TRANSITION_SPEED.to_string()),
            ping_target: TEST_PING_TARGET.to_string(),
            backend,
            sysfs_leds: sysfs_leds.map(|leds| leds.into_iter().map(String::from).collect()),
            ping_interval: None,
            ping_timeout: None,
            pause_fade: None,
        }
    }

    #[test]
    fn test_auto_prefers_piglow_when_bus_exists() {
        let dir = tempdir().unwrap();
        let bus = dir.path().join("i2c-1");
        std::fs::write(&bus, "").unwrap();

        let config = config_with(None, Some(vec!["led0"]));
        assert_eq!(detect_backend_at(&config, &bus).unwrap(), BackendType::PiGlow);
    }

    #[test]
    fn test_auto_falls_back_to_sysfs() {
        let dir = tempdir().unwrap();
        let bus = dir.path().join("i2c-1");

        let config = config_with(Some(Backend::Auto), Some(vec!["led0"]));
        assert_eq!(detect_backend_at(&config, &bus).unwrap(), BackendType::Sysfs);
    }

    #[test]
    fn test_auto_without_any_device_fails() {
        let dir = tempdir().unwrap();
        let bus = dir.path().join("i2c-1");

        let config = config_with(None, None);
        assert!(detect_backend_at(&config, &bus).is_err());
    }

    #[test]
    fn test_explicit_piglow_requires_bus() {
        let dir = tempdir().unwrap();
        let bus = dir.path().join("i2c-1");

        let config = config_with(Some(Backend::PiGlow), None);
        let err = detect_backend_at(&config, &bus).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_explicit_sysfs() {
        let dir = tempdir().unwrap();
        let bus = dir.path().join("i2c-1");
        std::fs::write(&bus, "").unwrap();

        let config = config_with(Some(Backend::Sysfs), Some(vec!["led0"]));
        assert_eq!(detect_backend_at(&config, &bus).unwrap(), BackendType::Sysfs);
    }
}
