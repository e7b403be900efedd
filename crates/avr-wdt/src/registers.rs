//! Register layout and the hardware-access trait.
//!
//! The controller never touches memory directly. Everything it needs from
//! the peripheral goes through [`WatchdogRegisters`], so the reconfiguration
//! sequence can run against [`SimulatedRegisters`](crate::sim::SimulatedRegisters)
//! on a host as well as against the real chip.

/// WDTCSR: watchdog interrupt flag.
pub const WDIF: u8 = 7;
/// WDTCSR: watchdog interrupt enable.
pub const WDIE: u8 = 6;
/// WDTCSR: prescaler bit 3 (extended range, 4 s and 8 s).
pub const WDP3: u8 = 5;
/// WDTCSR: watchdog change enable.
pub const WDCE: u8 = 4;
/// WDTCSR: watchdog system reset enable.
pub const WDE: u8 = 3;
/// WDTCSR: mask of the low prescaler bits `WDP2..WDP0`.
pub const WDP_LOW_MASK: u8 = 0b0000_0111;

/// MCUSR: watchdog reset flag.
pub const WDRF: u8 = 3;

/// Single-bit mask for a bit position.
#[must_use]
pub const fn bit(position: u8) -> u8 {
    1 << position
}

/// Value written first in the timed sequence to open the change window.
pub const CHANGE_ENABLE: u8 = bit(WDCE) | bit(WDE);

/// Access to the watchdog peripheral.
///
/// All methods take `&self` so an implementation can sit inside a
/// `static` controller and be reached from both thread mode and the
/// interrupt handler.
///
/// # Timed sequence
///
/// The control register is protected: changing `WDE` or the prescaler
/// requires writing [`CHANGE_ENABLE`] and then, within four clock cycles,
/// the new value. Callers must issue the two [`write_control`] calls
/// back-to-back with no other register access in between, and only from
/// inside [`interrupt_free`].
///
/// [`write_control`]: WatchdogRegisters::write_control
/// [`interrupt_free`]: WatchdogRegisters::interrupt_free
pub trait WatchdogRegisters {
    /// Read the watchdog control register (WDTCSR).
    fn read_control(&self) -> u8;

    /// Write the watchdog control register (WDTCSR).
    fn write_control(&self, value: u8);

    /// Restart the countdown (`wdr`).
    fn restart_countdown(&self);

    /// Read the watchdog reset flag (`WDRF` in MCUSR).
    fn reset_cause_flag(&self) -> bool;

    /// Clear the watchdog reset flag (`WDRF` in MCUSR).
    ///
    /// While set, `WDRF` forces `WDE` on, so this must run before any
    /// attempt to clear `WDE`.
    fn clear_reset_cause_flag(&self);

    /// Run `f` with global interrupts disabled, then restore the interrupt
    /// state that was in effect on entry.
    ///
    /// The default implementation uses the `critical-section` crate, which
    /// on AVR saves SREG, executes `cli` and writes SREG back afterwards.
    fn interrupt_free<R>(&self, f: impl FnOnce() -> R) -> R {
        critical_section::with(|_| f())
    }
}

impl<T: WatchdogRegisters> WatchdogRegisters for &T {
    fn read_control(&self) -> u8 {
        (**self).read_control()
    }

    fn write_control(&self, value: u8) {
        (**self).write_control(value);
    }

    fn restart_countdown(&self) {
        (**self).restart_countdown();
    }

    fn reset_cause_flag(&self) -> bool {
        (**self).reset_cause_flag()
    }

    fn clear_reset_cause_flag(&self) {
        (**self).clear_reset_cause_flag();
    }

    fn interrupt_free<R>(&self, f: impl FnOnce() -> R) -> R {
        (**self).interrupt_free(f)
    }
}
