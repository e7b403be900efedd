//! Internal logging macros.

/// Emit a `debug` event under the `avr_wdt` target.
///
/// Expands to nothing without the `tracing` feature, so builds for targets
/// without an allocator carry no logging code.
macro_rules! wdt_event {
    ($($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        {
            tracing::debug!(target: "avr_wdt", $($arg)+);
        }
    };
}

pub(crate) use wdt_event;
