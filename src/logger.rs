//! Structured logging system with visual formatting.
//!
//! This module provides a logging system designed for duskglow's visual output style.
//! It includes different log levels and special formatting functions for creating
//! visually appealing, structured output with Unicode box drawing characters.
//!
//! The logger supports runtime enable/disable functionality for quiet operation
//! during automated processes or testing.

use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};
use std::sync::{Arc, OnceLock};

use crate::time_source::TimeSource;

// Use an AtomicBool instead of thread_local for thread safety
static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

// Simulated clock whose time prefixes every line during --simulate
static SIMULATED_CLOCK: OnceLock<Arc<dyn TimeSource>> = OnceLock::new();

// Channel for routing output to file when --logfile is active
static LOG_CHANNEL: OnceLock<Sender<LogMessage>> = OnceLock::new();

enum LogMessage {
    Formatted(String),
    Shutdown,
}

/// Main logging interface providing structured output formatting.
///
/// ## Logging Conventions
///
/// - **`log_block_start!`**: starts a new conceptual block (state changes,
///   rescheduled windows, pause/resume). Prints an empty `┃` line, then
///   `┣ message`.
/// - **`log_decorated!`**: a line belonging to the current block, `┣ message`.
/// - **`log_indented!`**: nested details under a block, `┃   message`.
/// - **`log_pipe!`**: a single `┃` spacer, used before the semantic macros
///   when they open a block of their own.
/// - **`log_version!`**: the startup header, `┏ duskglow vX.Y.Z ━━╸`.
/// - **`log_end!`**: the final `╹` marker at shutdown.
/// - **`log_info!`, `log_warning!`, `log_error!`, `log_debug!`,
///   `log_critical!`**: semantic messages with a coloured `[LEVEL]` tag.
/// - **`log_error_exit!`**: the last line before a fatal exit, `┗[ERROR] ...`.
pub struct Log;

impl Log {
    /// Enable or disable logging temporarily.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// Check if logging is currently enabled.
    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Prefix every following line with the simulated time.
    ///
    /// Only the first registered clock is used.
    pub fn set_simulated_clock(clock: Arc<dyn TimeSource>) {
        let _ = SIMULATED_CLOCK.set(clock);
    }

    /// Start appending log output to `file_path`.
    ///
    /// The file is opened before this returns, so an unwritable path is
    /// reported to the caller. Each line written to the file carries a
    /// wall-clock timestamp and has its ANSI colour codes removed.
    pub fn start_file_logging(file_path: &Path) -> anyhow::Result<LoggerGuard> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)
            .map_err(|e| {
                anyhow::anyhow!("Failed to open log file {}: {e}", file_path.display())
            })?;

        let (tx, rx) = channel();

        // Install the channel
        LOG_CHANNEL
            .set(tx.clone())
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        // Spawn logger thread
        let handle = std::thread::Builder::new()
            .name("logger".to_string())
            .spawn(move || {
                loop {
                    match rx.recv() {
                        Ok(LogMessage::Formatted(text)) => {
                            let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
                            file.write_all(stamp_lines(&text, &stamp.to_string()).as_bytes())?;
                        }
                        Ok(LogMessage::Shutdown) | Err(_) => {
                            file.flush()?;
                            break;
                        }
                    }
                }

                Ok::<(), anyhow::Error>(())
            })?;

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    // # Helper Functions

    /// Get timestamp prefix for simulation mode, `[HH:MM:SS] `.
    ///
    /// Returns an empty string unless a simulated clock was registered.
    pub fn get_timestamp_prefix() -> String {
        match SIMULATED_CLOCK.get() {
            Some(clock) => format!("[{}] ", clock.now().format("%H:%M:%S")),
            None => String::new(),
        }
    }
}

/// Guard for file logging that ensures clean shutdown.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        // LOG_CHANNEL stays set; the process exits right after
    }
}

/// Prefix every line of `text` with `[stamp] ` and strip colour codes.
fn stamp_lines(text: &str, stamp: &str) -> String {
    let clean = strip_ansi_codes(text);
    let mut result = String::with_capacity(clean.len() + 24);
    for line in clean.lines() {
        result.push('[');
        result.push_str(stamp);
        result.push_str("] ");
        result.push_str(line);
        result.push('\n');
    }
    result
}

// Helper function to strip ANSI color codes from text
fn strip_ansi_codes(text: &str) -> String {
    // Regex pattern for ANSI escape sequences
    // Matches: ESC [ ... m where ... is any sequence of digits and semicolons
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            // Check if this is the start of an ANSI sequence
            if chars.peek() == Some(&'[') {
                chars.next(); // consume '['
                // Skip until we find 'm'
                for ch in chars.by_ref() {
                    if ch == 'm' {
                        break;
                    }
                }
            } else {
                result.push(ch);
            }
        } else {
            result.push(ch);
        }
    }

    result
}

// Public function that routes output (needed by macros)
pub fn write_output(text: &str) {
    if let Some(tx) = LOG_CHANNEL.get() {
        // The logger thread strips colours and adds timestamps
        let _ = tx.send(LogMessage::Formatted(text.to_string()));
    } else {
        // Normal output with colors
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
}

/// Shape of one log line, selected by the logging macros.
#[doc(hidden)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Version,
    Block,
    Decorated,
    Indented,
    Pipe,
    Info,
    Debug,
    Warning,
    Error,
    Critical,
    Fatal,
    End,
}

/// `┣[TAG] message` with the tag in an ANSI colour.
fn tagged(prefix: &str, tag: &str, colour: u8, message: &str) -> String {
    format!("{prefix}┣[\x1b[{colour}m{tag}\x1b[0m] {message}\n")
}

/// Lay out `message` as a `line`, with `prefix` on every physical line.
fn render(line: Line, prefix: &str, message: &str) -> String {
    match line {
        Line::Version => format!("{prefix}┏ duskglow v{message} ━━╸\n"),
        Line::Block => format!("{prefix}┃\n{prefix}┣ {message}\n"),
        Line::Decorated => format!("{prefix}┣ {message}\n"),
        Line::Indented => format!("{prefix}┃   {message}\n"),
        Line::Pipe => format!("{prefix}┃\n"),
        Line::Info => tagged(prefix, "INFO", 32, message),
        Line::Debug => tagged(prefix, "DEBUG", 32, message),
        Line::Warning => tagged(prefix, "WARNING", 33, message),
        Line::Error => tagged(prefix, "ERROR", 31, message),
        Line::Critical => tagged(prefix, "CRITICAL", 31, message),
        Line::Fatal => format!("{prefix}┃\n{prefix}┗[\x1b[31mERROR\x1b[0m] {message}\n"),
        Line::End => format!("{prefix}╹\n"),
    }
}

/// Backing function of every logging macro.
#[doc(hidden)]
pub fn emit(line: Line, message: std::fmt::Arguments<'_>) {
    if !Log::is_enabled() {
        return;
    }
    let prefix = Log::get_timestamp_prefix();
    write_output(&render(line, &prefix, &message.to_string()));
}

// # Logging Macros
//
// Each message macro takes either a format string with arguments or a single
// displayable expression.

#[doc(hidden)]
#[macro_export]
macro_rules! __log_line {
    ($line:ident, $fmt:literal $($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Line::$line, format_args!($fmt $($arg)*))
    };
    ($line:ident, $expr:expr) => {
        $crate::logger::emit($crate::logger::Line::$line, format_args!("{}", $expr))
    };
}

/// Startup header, `┏ duskglow vX.Y.Z ━━╸`.
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::__log_line!(Version, "{}", env!("CARGO_PKG_VERSION"))
    };
}

/// Start a new block: a `┃` spacer, then `┣ message`.
#[macro_export]
macro_rules! log_block_start {
    ($($t:tt)+) => { $crate::__log_line!(Block, $($t)+) };
}

/// A line in the current block.
#[macro_export]
macro_rules! log_decorated {
    ($($t:tt)+) => { $crate::__log_line!(Decorated, $($t)+) };
}

/// Nested detail under the current block.
#[macro_export]
macro_rules! log_indented {
    ($($t:tt)+) => { $crate::__log_line!(Indented, $($t)+) };
}

/// A bare `┃` spacer.
#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::__log_line!(Pipe, "")
    };
}

#[macro_export]
macro_rules! log_info {
    ($($t:tt)+) => { $crate::__log_line!(Info, $($t)+) };
}

/// Only call behind a `debug_enabled` check.
#[macro_export]
macro_rules! log_debug {
    ($($t:tt)+) => { $crate::__log_line!(Debug, $($t)+) };
}

#[macro_export]
macro_rules! log_warning {
    ($($t:tt)+) => { $crate::__log_line!(Warning, $($t)+) };
}

#[macro_export]
macro_rules! log_error {
    ($($t:tt)+) => { $crate::__log_line!(Error, $($t)+) };
}

#[macro_export]
macro_rules! log_critical {
    ($($t:tt)+) => { $crate::__log_line!(Critical, $($t)+) };
}

/// Last line before a fatal exit, closing the log with `┗[ERROR]`.
#[macro_export]
macro_rules! log_error_exit {
    ($($t:tt)+) => { $crate::__log_line!(Fatal, $($t)+) };
}

/// Final `╹` marker.
#[macro_export]
macro_rules! log_end {
    () => {
        $crate::__log_line!(End, "")
    };
}
