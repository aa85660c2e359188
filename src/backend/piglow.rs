//! Pimoroni PiGlow backend.
//!
//! The PiGlow carries an SN3218 18-channel LED driver at I2C address 0x54.
//! Talking to it through `/dev/i2c-N` only needs the `I2C_SLAVE` ioctl to
//! bind the file to the device address; after that every `write` is one I2C
//! transaction whose first byte selects the register.
//!
//! Register map used here:
//!
//! | Register    | Purpose                                   |
//! |-------------|-------------------------------------------|
//! | `0x00`      | Shutdown (0 = off, 1 = normal operation)  |
//! | `0x01-0x12` | PWM value for LED 1-18                    |
//! | `0x13-0x15` | LED enable bits, six LEDs per register    |
//! | `0x16`      | Update: latch the PWM registers           |

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::unix::io::AsRawFd;
use std::path::Path;

use super::LightBackend;
use crate::constants::{PIGLOW_I2C_ADDRESS, PIGLOW_LED_COUNT};

const REG_SHUTDOWN: u8 = 0x00;
const REG_PWM_BASE: u8 = 0x01;
const REG_LED_CONTROL: u8 = 0x13;
const REG_UPDATE: u8 = 0x16;

const ALL_LEDS_ENABLED: u8 = 0x3F;

/// `I2C_SLAVE` from `<linux/i2c-dev.h>`.
const I2C_SLAVE: u16 = 0x0703;

nix::ioctl_write_int_bad!(i2c_set_slave, I2C_SLAVE);

/// SN3218 driver over any byte sink that frames one write per transaction.
pub struct PiGlowBackend<W: Write = File> {
    bus: W,
    levels: [u8; PIGLOW_LED_COUNT],
    debug_enabled: bool,
}

impl PiGlowBackend<File> {
    /// Open the I2C bus device, bind it to the PiGlow address and enable
    /// every LED.
    pub fn open(bus_path: &Path, debug_enabled: bool) -> Result<Self> {
        let bus = OpenOptions::new()
            .read(true)
            .write(true)
            .open(bus_path)
            .with_context(|| format!("Failed to open {}", bus_path.display()))?;

        // SAFETY: the fd is valid for the lifetime of `bus`, and I2C_SLAVE
        // takes the device address by value.
        unsafe { i2c_set_slave(bus.as_raw_fd(), i32::from(PIGLOW_I2C_ADDRESS)) }
            .with_context(|| {
                format!(
                    "Failed to select I2C address {PIGLOW_I2C_ADDRESS:#04x} on {}",
                    bus_path.display()
                )
            })?;

        if debug_enabled {
            log_debug!(
                "Opened {} at address {PIGLOW_I2C_ADDRESS:#04x}",
                bus_path.display()
            );
        }

        Self::with_bus(bus, debug_enabled)
    }
}

impl<W: Write> PiGlowBackend<W> {
    /// Initialise the driver on an already-addressed bus.
    pub fn with_bus(mut bus: W, debug_enabled: bool) -> Result<Self> {
        bus.write_all(&[REG_SHUTDOWN, 0x01])
            .context("Failed to wake SN3218")?;
        bus.write_all(&[
            REG_LED_CONTROL,
            ALL_LEDS_ENABLED,
            ALL_LEDS_ENABLED,
            ALL_LEDS_ENABLED,
        ])
        .context("Failed to enable PiGlow LEDs")?;

        Ok(Self {
            bus,
            levels: [0; PIGLOW_LED_COUNT],
            debug_enabled,
        })
    }

    /// Push all PWM registers and latch them.
    fn write_levels(&mut self) -> Result<()> {
        let mut frame = [0u8; PIGLOW_LED_COUNT + 1];
        frame[0] = REG_PWM_BASE;
        frame[1..].copy_from_slice(&self.levels);

        self.bus
            .write_all(&frame)
            .context("Failed to write PiGlow PWM registers")?;
        self.bus
            .write_all(&[REG_UPDATE, 0xFF])
            .context("Failed to latch PiGlow PWM registers")?;
        Ok(())
    }

    #[cfg(test)]
    fn into_bus(self) -> W {
        self.bus
    }
}

impl<W: Write> LightBackend for PiGlowBackend<W> {
    fn set_all(&mut self, level: u8) {
        self.levels = [level; PIGLOW_LED_COUNT];
    }

    fn apply(&mut self) -> Result<()> {
        self.write_levels()
    }

    fn backend_name(&self) -> &'static str {
        "PiGlow"
    }

    fn cleanup(&mut self, debug_enabled: bool) -> Result<()> {
        self.levels = [0; PIGLOW_LED_COUNT];
        self.write_levels()?;
        self.bus
            .write_all(&[REG_SHUTDOWN, 0x00])
            .context("Failed to shut down SN3218")?;

        if debug_enabled || self.debug_enabled {
            log_debug!("PiGlow switched off");
        }
        Ok(())
    }
}
