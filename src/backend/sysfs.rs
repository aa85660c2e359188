//! Linux LED class backend.
//!
//! Drives `/sys/class/leds/<name>/brightness` for every configured LED. LED
//! drivers expose their own `max_brightness` (often 1 for GPIO LEDs, 255 for
//! PWM ones), so the 0-255 level is scaled per LED with rounding.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::LightBackend;
use crate::constants::MAX_BRIGHTNESS;

struct SysfsLed {
    name: String,
    brightness_path: PathBuf,
    max_brightness: u32,
}

pub struct SysfsBackend {
    leds: Vec<SysfsLed>,
    level: u8,
    debug_enabled: bool,
}

/// Scale a 0-255 level to a device range of 0..=`max`, rounding to nearest.
pub(crate) fn scale_level(level: u8, max: u32) -> u32 {
    let max_level = u64::from(MAX_BRIGHTNESS);
    ((u64::from(level) * u64::from(max) + max_level / 2) / max_level) as u32
}

impl SysfsBackend {
    /// Open every named LED below `leds_dir`.
    pub fn open(leds_dir: &Path, names: &[String], debug_enabled: bool) -> Result<Self> {
        if names.is_empty() {
            anyhow::bail!("No sysfs LEDs configured");
        }

        let mut leds = Vec::with_capacity(names.len());
        for name in names {
            let led_dir = leds_dir.join(name);
            let max_path = led_dir.join("max_brightness");
            let max_brightness = fs::read_to_string(&max_path)
                .with_context(|| format!("Failed to read {}", max_path.display()))?
                .trim()
                .parse::<u32>()
                .with_context(|| format!("Invalid max_brightness in {}", max_path.display()))?;

            if debug_enabled {
                log_debug!("LED {name}: max_brightness {max_brightness}");
            }

            leds.push(SysfsLed {
                name: name.clone(),
                brightness_path: led_dir.join("brightness"),
                max_brightness,
            });
        }

        Ok(Self {
            leds,
            level: 0,
            debug_enabled,
        })
    }
}

impl LightBackend for SysfsBackend {
    fn set_all(&mut self, level: u8) {
        self.level = level;
    }

    fn apply(&mut self) -> Result<()> {
        for led in &self.leds {
            let value = scale_level(self.level, led.max_brightness);
            fs::write(&led.brightness_path, value.to_string())
                .with_context(|| format!("Failed to set brightness of LED {}", led.name))?;
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sysfs"
    }

    fn cleanup(&mut self, debug_enabled: bool) -> Result<()> {
        self.level = 0;
        self.apply()?;
        if debug_enabled || self.debug_enabled {
            log_debug!("Switched off {} sysfs LED(s)", self.leds.len());
        }
        Ok(())
    }
}
