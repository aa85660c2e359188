//! # duskglow Library
//!
//! Internal library for the duskglow binary application.
//!
//! Exists so the control loop can be tested with a simulated clock and a
//! recording backend, and to keep `main.rs` down to CLI dispatch.
//!
//! ## Architecture
//!
//! - **Entry Point**: [`Duskglow`] acquires resources and runs the loop
//! - **Core Logic**: `core` holds the [`core::AmbientController`], the brightness
//!   curves and the pause/resume ramp
//! - **Backends**: `backend` with PiGlow (I2C) and sysfs LED output
//! - **Geographic**: `geo` for sunset/sunrise lookups and fade windows
//! - **Liveness**: `liveness` for the ping probe thread and pause/resume edges
//! - **Configuration**: `config` for TOML settings and validation
//! - **Infrastructure**: signal handling, PID file, logging, clocks

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod args;
pub mod backend;
pub mod config;
pub mod constants;
pub mod core;
pub mod duration;
pub mod geo;
pub mod io;
pub mod liveness;
pub mod time_source;
pub mod utils;

mod duskglow;

pub use duskglow::Duskglow;
