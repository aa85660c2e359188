// External I/O operations module
pub mod pidfile; // PID file with single-instance lock
pub mod signals; // Unix signal handling
