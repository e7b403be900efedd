//! Watchdog configuration and control-value composition.

use crate::error::WatchdogResult;
use crate::registers::{WDE, WDIE, WDIF, WDP3, WDP_LOW_MASK, bit};
use crate::timeout::WatchdogTimeout;

/// Compose the WDTCSR value for a configuration.
///
/// `WDIF` is always set: writing a one clears any interrupt flag left
/// pending from a previous configuration, which would otherwise fire the
/// moment `WDIE` is enabled.
#[must_use]
pub const fn control_value(timeout: WatchdogTimeout, interrupt: bool, reset: bool) -> u8 {
    let mut value = 0;
    if timeout.is_extended_range() {
        value |= bit(WDP3);
    }
    value |= timeout.to_raw() & WDP_LOW_MASK;
    if interrupt {
        value |= bit(WDIE);
    }
    if reset {
        value |= bit(WDE);
    }
    value | bit(WDIF)
}

/// Watchdog configuration.
///
/// Whether the interrupt is enabled is not part of the configuration: it
/// follows from whether a callback is passed to
/// [`Watchdog::begin_with`](crate::controller::Watchdog::begin_with).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WatchdogConfig {
    /// Countdown interval.
    ///
    /// Default: 1 second.
    pub timeout: WatchdogTimeout,

    /// Reset the device when the countdown expires.
    ///
    /// With an interrupt callback registered as well, the first expiry
    /// runs the callback and the second one resets.
    ///
    /// Default: false.
    pub reset_on_timeout: bool,
}

impl WatchdogConfig {
    /// Create a configuration with the given timeout and no reset.
    #[must_use]
    pub const fn new(timeout: WatchdogTimeout) -> Self {
        Self {
            timeout,
            reset_on_timeout: false,
        }
    }

    /// Create a configuration from an interval in milliseconds.
    ///
    /// The longest supported timeout not exceeding `ms` is used.
    ///
    /// # Errors
    ///
    /// Returns an error if `ms` is outside 16..=8000.
    pub fn from_millis(ms: u32) -> WatchdogResult<Self> {
        Ok(Self::new(WatchdogTimeout::from_millis(ms)?))
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> WatchdogConfigBuilder {
        WatchdogConfigBuilder::default()
    }

    /// WDTCSR value for this configuration.
    #[must_use]
    pub const fn control_value(&self, interrupt: bool) -> u8 {
        control_value(self.timeout, interrupt, self.reset_on_timeout)
    }
}

/// Builder for `WatchdogConfig`.
#[derive(Debug, Default)]
pub struct WatchdogConfigBuilder {
    config: WatchdogConfig,
}

impl WatchdogConfigBuilder {
    /// Set the countdown interval.
    #[must_use]
    pub fn timeout(mut self, timeout: WatchdogTimeout) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the countdown interval in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns an error if `ms` is outside 16..=8000.
    pub fn timeout_ms(mut self, ms: u32) -> WatchdogResult<Self> {
        self.config.timeout = WatchdogTimeout::from_millis(ms)?;
        Ok(self)
    }

    /// Reset the device on expiry.
    #[must_use]
    pub fn reset_on_timeout(mut self, reset: bool) -> Self {
        self.config.reset_on_timeout = reset;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> WatchdogConfig {
        self.config
    }
}
