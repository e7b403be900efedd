//! The watchdog controller.
//!
//! [`Watchdog`] owns a [`WatchdogRegisters`] implementation and performs
//! the datasheet sequence for reconfiguring the protected control register:
//!
//! 1. save SREG and disable interrupts,
//! 2. restart the countdown,
//! 3. clear `WDRF` (it overrides `WDE`),
//! 4. write `WDCE | WDE`, then immediately the new configuration,
//! 5. restore SREG.

use crate::config::{WatchdogConfig, control_value};
use crate::macros::wdt_event;
use crate::registers::{CHANGE_ENABLE, WatchdogRegisters};
use crate::state::{ControllerState, InterruptCallback, WatchdogMode};
use crate::timeout::WatchdogTimeout;

/// Watchdog timer controller.
///
/// On hardware there is exactly one of these, held in a `static` and never
/// dropped; the interrupt handler reaches it through that `static`. In
/// tests it is built around a
/// [`SimulatedRegisters`](crate::sim::SimulatedRegisters) instead.
///
/// # Reset loops
///
/// After a watchdog reset the chip comes back up with the watchdog still
/// enabled and the prescaler forced to 16 ms. Some bootloaders (the
/// Duemilanove and Nano ones, notably) take longer than that to get going
/// and never kick the timer, so the board resets forever. The only way out
/// is burning a new bootloader over ICSP. Boards with the Optiboot
/// bootloader (Uno) are fine. Call [`end`](Self::end) as early as possible
/// in `main` when using reset mode on such hardware.
///
/// # Example
///
/// ```rust
/// use avr_wdt::prelude::*;
///
/// fn save_state() {}
///
/// let wdt = Watchdog::new(SimulatedRegisters::new());
///
/// // Interrupt after one second, reset after two.
/// wdt.begin(WatchdogTimeout::S1, Some(save_state), true);
/// assert!(wdt.will_interrupt());
/// assert!(wdt.will_reset());
///
/// wdt.reset();
///
/// wdt.end();
/// assert!(!wdt.will_reset());
/// ```
#[derive(Debug)]
pub struct Watchdog<R> {
    registers: R,
    state: ControllerState,
}

impl<R: WatchdogRegisters> Watchdog<R> {
    /// Create a disarmed controller around a register backend.
    ///
    /// This does not touch the hardware; a watchdog left running by a
    /// previous reset keeps running until [`begin`](Self::begin) or
    /// [`end`](Self::end) is called.
    #[must_use]
    pub const fn new(registers: R) -> Self {
        Self {
            registers,
            state: ControllerState::new(),
        }
    }

    /// Arm the watchdog.
    ///
    /// - With a `callback`, the watchdog interrupt is enabled and the
    ///   callback runs on every expiry.
    /// - With `reset_required`, expiry resets the device. Combined with a
    ///   callback, the first expiry runs the callback and the next one
    ///   resets, giving the callback one full period to save state.
    ///
    /// Passing `None` replaces any previously registered callback.
    ///
    /// The reconfiguration runs with interrupts disabled; the interrupt
    /// state in effect on entry is restored afterwards.
    pub fn begin(
        &self,
        timeout: WatchdogTimeout,
        callback: Option<InterruptCallback>,
        reset_required: bool,
    ) {
        let value = control_value(timeout, callback.is_some(), reset_required);

        self.registers.interrupt_free(|| {
            critical_section::with(|cs| {
                self.state.arm(cs, timeout, callback, reset_required);
            });
            self.registers.restart_countdown();
            self.registers.clear_reset_cause_flag();
            self.timed_write(value);
        });

        wdt_event!(
            timeout = timeout.as_str(),
            interrupt = callback.is_some(),
            reset = reset_required,
            control = value,
            "Watchdog armed"
        );
    }

    /// Arm the watchdog from a [`WatchdogConfig`].
    pub fn begin_with(&self, config: &WatchdogConfig, callback: Option<InterruptCallback>) {
        self.begin(config.timeout, callback, config.reset_on_timeout);
    }

    /// Disarm the watchdog.
    ///
    /// Writes an all-zero configuration, which stops the countdown and
    /// disables both the interrupt and the reset. The registered callback
    /// is dropped. Calling `end` on a disarmed watchdog is harmless.
    pub fn end(&self) {
        self.registers.interrupt_free(|| {
            self.registers.restart_countdown();
            self.registers.clear_reset_cause_flag();
            self.timed_write(0);
            critical_section::with(|cs| self.state.disarm(cs));
        });

        wdt_event!("Watchdog disarmed");
    }

    /// Restart the countdown without changing the configuration.
    #[doc(alias = "kick")]
    #[doc(alias = "feed")]
    #[inline]
    pub fn reset(&self) {
        self.registers.restart_countdown();
    }

    /// Whether an expiry will reset the device.
    #[must_use]
    pub fn will_reset(&self) -> bool {
        self.state.reset_armed()
    }

    /// Whether an expiry will run the interrupt callback.
    #[must_use]
    pub fn will_interrupt(&self) -> bool {
        self.state.callback().is_some()
    }

    /// Timeout of the current configuration, `None` while disarmed.
    #[must_use]
    pub fn timeout(&self) -> Option<WatchdogTimeout> {
        self.state.timeout()
    }

    /// Mode the peripheral is in, decoded from the control register.
    ///
    /// Unlike [`will_interrupt`](Self::will_interrupt), this reflects the
    /// hardware clearing `WDIE` after the first interrupt in
    /// interrupt-then-reset mode.
    #[must_use]
    pub fn mode(&self) -> WatchdogMode {
        WatchdogMode::from_control(self.registers.read_control())
    }

    /// Whether the last device reset was caused by the watchdog.
    ///
    /// `begin` and `end` clear the flag, so check this first thing after
    /// startup.
    #[must_use]
    pub fn last_reset_was_watchdog(&self) -> bool {
        self.registers.reset_cause_flag()
    }

    /// Interrupt entry point.
    ///
    /// Call this from the `WDT` interrupt vector. Runs the registered
    /// callback, if any.
    #[inline]
    pub fn on_interrupt(&self) {
        if let Some(callback) = self.state.callback() {
            callback();
        }
    }

    /// Borrow the register backend.
    #[must_use]
    pub fn registers(&self) -> &R {
        &self.registers
    }

    /// The timed sequence. Must run with interrupts disabled, and nothing
    /// may access the peripheral between the two writes.
    fn timed_write(&self, value: u8) {
        let unlock = self.registers.read_control() | CHANGE_ENABLE;
        self.registers.write_control(unlock);
        self.registers.write_control(value);
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::sim::SimulatedRegisters;

    fn noop() {}

    #[test]
    fn test_new_is_disarmed() {
        let wdt = Watchdog::new(SimulatedRegisters::new());
        assert!(!wdt.will_reset());
        assert!(!wdt.will_interrupt());
        assert_eq!(wdt.timeout(), None);
        assert_eq!(wdt.mode(), WatchdogMode::Disarmed);
    }

    #[test]
    fn test_begin_with_config() {
        let wdt = Watchdog::new(SimulatedRegisters::new());
        let config = WatchdogConfig::builder()
            .timeout(WatchdogTimeout::Ms500)
            .reset_on_timeout(true)
            .build();
        wdt.begin_with(&config, Some(noop));

        assert_eq!(wdt.timeout(), Some(WatchdogTimeout::Ms500));
        assert_eq!(wdt.mode(), WatchdogMode::InterruptThenReset);
        assert_eq!(wdt.registers().last_control_write(), Some(0xCD));
    }

    #[test]
    fn test_begin_without_callback_replaces_callback() {
        let wdt = Watchdog::new(SimulatedRegisters::new());
        wdt.begin(WatchdogTimeout::S1, Some(noop), false);
        assert!(wdt.will_interrupt());

        wdt.begin(WatchdogTimeout::S1, None, true);
        assert!(!wdt.will_interrupt());
        assert_eq!(wdt.mode(), WatchdogMode::ResetOnly);
    }

    #[test]
    fn test_reset_only_kicks() {
        let wdt = Watchdog::new(SimulatedRegisters::new());
        wdt.begin(WatchdogTimeout::Ms64, None, true);
        let before = wdt.registers().control();
        let kicks = wdt.registers().kicks();

        wdt.reset();

        assert_eq!(wdt.registers().control(), before);
        assert_eq!(wdt.registers().kicks(), kicks + 1);
    }

    #[test]
    fn test_last_reset_was_watchdog() {
        let wdt = Watchdog::new(SimulatedRegisters::after_watchdog_reset());
        assert!(wdt.last_reset_was_watchdog());
        wdt.end();
        assert!(!wdt.last_reset_was_watchdog());
        assert_eq!(wdt.registers().control(), 0);
    }
}
