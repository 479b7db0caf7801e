//! # Component Configuration
//!
//! Components are configured at runtime through packets rather than files:
//! each configuration value arrives on its own input port, in any order.
//!
//! ## Contained Modules:
//! - **`interval`**: parsing of textual durations (`10s`, `1h30m`, `250ms`).
//! - **`intake`**: the select loop that collects the interval, request and
//!   template packets and hands the loop an immutable [`RunConfig`].

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

use thiserror::Error;

/// Three-port configuration intake.
pub mod intake;
/// Textual duration parsing.
pub mod interval;

pub use intake::{ConfigIntake, RunConfig};
pub use interval::{parse_duration, parse_interval};

/// Errors raised while reading configuration packets.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The duration text did not follow the `<number><unit>...` grammar.
    #[error("invalid duration {0:?}")]
    InvalidDuration(String),

    /// The duration used a unit other than ns, us, µs, ms, s, m, h.
    #[error("unknown unit {unit:?} in duration {text:?}")]
    UnknownUnit {
        /// The offending unit.
        unit: String,
        /// The full duration text.
        text: String,
    },

    /// A number without a unit (only a bare `0` may omit it).
    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    /// The duration does not fit in 64-bit nanoseconds.
    #[error("duration {0:?} out of range")]
    DurationOverflow(String),

    /// Zero or negative intervals cannot drive a ticker.
    #[error("interval must be greater than zero, got {0:?}")]
    NonPositiveInterval(String),

    /// The interval packet was not UTF-8 text.
    #[error("interval packet is not valid UTF-8")]
    NotUtf8(#[from] std::str::Utf8Error),

    /// A request or template packet was not valid JSON for its type.
    #[error("failed to unmarshal {what}: {source}")]
    Json {
        /// `request` or `template`.
        what: &'static str,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A port needed for a missing value closed before delivering it.
    #[error("{0} port closed before the component was configured")]
    IntakeClosed(&'static str),

    /// Shutdown was requested while waiting for configuration.
    #[error("shutdown requested during configuration")]
    Shutdown,
}
