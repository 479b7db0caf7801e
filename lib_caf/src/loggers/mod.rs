//! # Loggers Module
//!
//! Process-wide `log` setup for component binaries. Library code only ever
//! talks to the `log` facade; binaries call [`setup_logging`] once at startup.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// `fern` dispatcher setup and log file housekeeping.
pub mod logger;

pub use logger::{cleanup_old_logs, open_log_file, setup_logging, LogOptions, LoggerError};
