//! Error types for watchdog configuration.
//!
//! Controller operations themselves are infallible; errors only arise when
//! converting untyped input (raw codes, millisecond values) into a
//! [`WatchdogTimeout`](crate::timeout::WatchdogTimeout).

use thiserror::Error;

/// Errors that can occur while building a watchdog configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WatchdogError {
    /// Raw prescaler code does not name one of the ten supported timeouts.
    #[error("Invalid watchdog timeout code: {0} (expected 0..=9)")]
    InvalidTimeoutCode(u8),

    /// Requested interval cannot be represented by the prescaler.
    #[error("Watchdog timeout out of range: {requested_ms}ms (supported 16..=8000ms)")]
    TimeoutOutOfRange {
        /// The interval that was asked for, in milliseconds.
        requested_ms: u32,
    },
}

impl WatchdogError {
    /// Create an invalid timeout code error.
    #[must_use]
    pub fn invalid_timeout_code(code: u8) -> Self {
        Self::InvalidTimeoutCode(code)
    }

    /// Create an out-of-range timeout error.
    #[must_use]
    pub fn timeout_out_of_range(requested_ms: u32) -> Self {
        Self::TimeoutOutOfRange { requested_ms }
    }
}

/// A specialized `Result` type for watchdog configuration.
pub type WatchdogResult<T> = core::result::Result<T, WatchdogError>;
