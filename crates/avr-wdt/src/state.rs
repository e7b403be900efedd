//! Watchdog operating modes and the controller's shared state.

use core::cell::Cell;

use critical_section::Mutex;
use portable_atomic::{AtomicBool, AtomicU8, Ordering};

use crate::registers::{WDE, WDIE, bit};
use crate::timeout::WatchdogTimeout;

/// Function called from the watchdog interrupt.
///
/// Runs in interrupt context with interrupts disabled: it must not block
/// and should finish well inside one countdown period.
pub type InterruptCallback = fn();

/// What the peripheral will do when the countdown expires.
///
/// ```text
///             begin()
/// Disarmed ───────────► InterruptOnly | ResetOnly | InterruptThenReset
///     ▲                                 │
///     └─────────────── end() ───────────┘
/// ```
///
/// In `InterruptThenReset` the hardware clears `WDIE` when the interrupt
/// is taken, so the peripheral drops into `ResetOnly` until reconfigured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchdogMode {
    /// Watchdog is stopped.
    #[default]
    Disarmed,
    /// Every expiry raises the interrupt.
    InterruptOnly,
    /// Expiry resets the device.
    ResetOnly,
    /// First expiry raises the interrupt, the next one resets.
    InterruptThenReset,
}

impl WatchdogMode {
    /// Decode the mode from a WDTCSR value.
    #[must_use]
    pub const fn from_control(value: u8) -> Self {
        let interrupt = value & bit(WDIE) != 0;
        let reset = value & bit(WDE) != 0;
        match (interrupt, reset) {
            (false, false) => Self::Disarmed,
            (true, false) => Self::InterruptOnly,
            (false, true) => Self::ResetOnly,
            (true, true) => Self::InterruptThenReset,
        }
    }

    /// Check if the countdown has any effect.
    #[must_use]
    pub const fn is_armed(self) -> bool {
        !matches!(self, Self::Disarmed)
    }

    /// Check if the next expiry raises the interrupt.
    #[must_use]
    pub const fn interrupts(self) -> bool {
        matches!(self, Self::InterruptOnly | Self::InterruptThenReset)
    }

    /// Check if an expiry eventually resets the device.
    #[must_use]
    pub const fn resets(self) -> bool {
        matches!(self, Self::ResetOnly | Self::InterruptThenReset)
    }

    /// Get the mode as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disarmed => "Disarmed",
            Self::InterruptOnly => "InterruptOnly",
            Self::ResetOnly => "ResetOnly",
            Self::InterruptThenReset => "InterruptThenReset",
        }
    }
}

impl core::fmt::Display for WatchdogMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw timeout slot value meaning "not configured".
const NO_TIMEOUT: u8 = u8::MAX;

/// Controller bookkeeping shared between thread mode and the interrupt.
pub(crate) struct ControllerState {
    callback: Mutex<Cell<Option<InterruptCallback>>>,
    /// True iff `WDE` was last written as set by `begin`.
    reset_armed: AtomicBool,
    timeout: AtomicU8,
}

impl ControllerState {
    pub(crate) const fn new() -> Self {
        Self {
            callback: Mutex::new(Cell::new(None)),
            reset_armed: AtomicBool::new(false),
            timeout: AtomicU8::new(NO_TIMEOUT),
        }
    }

    /// Record a new configuration. Must be called inside a critical section.
    pub(crate) fn arm(
        &self,
        cs: critical_section::CriticalSection<'_>,
        timeout: WatchdogTimeout,
        callback: Option<InterruptCallback>,
        reset: bool,
    ) {
        self.callback.borrow(cs).set(callback);
        self.reset_armed.store(reset, Ordering::Release);
        self.timeout.store(timeout.to_raw(), Ordering::Release);
    }

    /// Forget the configuration. Must be called inside a critical section.
    pub(crate) fn disarm(&self, cs: critical_section::CriticalSection<'_>) {
        self.callback.borrow(cs).set(None);
        self.reset_armed.store(false, Ordering::Release);
        self.timeout.store(NO_TIMEOUT, Ordering::Release);
    }

    pub(crate) fn callback(&self) -> Option<InterruptCallback> {
        critical_section::with(|cs| self.callback.borrow(cs).get())
    }

    pub(crate) fn reset_armed(&self) -> bool {
        self.reset_armed.load(Ordering::Acquire)
    }

    pub(crate) fn timeout(&self) -> Option<WatchdogTimeout> {
        WatchdogTimeout::from_raw(self.timeout.load(Ordering::Acquire))
    }
}

impl core::fmt::Debug for ControllerState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ControllerState")
            .field("reset_armed", &self.reset_armed())
            .field("timeout", &self.timeout())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() {}

    #[test]
    fn test_mode_from_control() {
        assert_eq!(WatchdogMode::from_control(0x00), WatchdogMode::Disarmed);
        assert_eq!(WatchdogMode::from_control(0x87), WatchdogMode::Disarmed);
        assert_eq!(WatchdogMode::from_control(0x46), WatchdogMode::InterruptOnly);
        assert_eq!(WatchdogMode::from_control(0x0E), WatchdogMode::ResetOnly);
        assert_eq!(
            WatchdogMode::from_control(0x4E),
            WatchdogMode::InterruptThenReset
        );
    }

    #[test]
    fn test_mode_predicates() {
        assert!(!WatchdogMode::Disarmed.is_armed());
        assert!(WatchdogMode::InterruptThenReset.interrupts());
        assert!(WatchdogMode::InterruptThenReset.resets());
        assert!(!WatchdogMode::ResetOnly.interrupts());
        assert!(!WatchdogMode::InterruptOnly.resets());
    }

    #[test]
    fn test_state_starts_disarmed() {
        let state = ControllerState::new();
        assert!(state.callback().is_none());
        assert!(!state.reset_armed());
        assert_eq!(state.timeout(), None);
    }

    #[test]
    fn test_arm_then_disarm() {
        let state = ControllerState::new();
        critical_section::with(|cs| state.arm(cs, WatchdogTimeout::S4, Some(noop), true));
        assert!(state.callback().is_some());
        assert!(state.reset_armed());
        assert_eq!(state.timeout(), Some(WatchdogTimeout::S4));

        critical_section::with(|cs| state.disarm(cs));
        assert!(state.callback().is_none());
        assert!(!state.reset_armed());
        assert_eq!(state.timeout(), None);
    }
}
