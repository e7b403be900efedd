//! Register backend for the ATmega48/88/168/328 family.
//!
//! Registers are accessed through their data-space addresses. Interrupt
//! masking goes through the `critical-section` crate, so the firmware must
//! link an implementation (for example `avr-device` with its
//! `critical-section-impl` feature).
//!
//! ```rust,ignore
//! use avr_wdt::atmega::Atmega328p;
//! use avr_wdt::{Watchdog, WatchdogTimeout};
//!
//! static WATCHDOG: Watchdog<Atmega328p> = Watchdog::new(Atmega328p::new());
//!
//! #[avr_device::interrupt(atmega328p)]
//! fn WDT() {
//!     WATCHDOG.on_interrupt();
//! }
//!
//! fn blink() {}
//!
//! #[avr_device::entry]
//! fn main() -> ! {
//!     WATCHDOG.begin(WatchdogTimeout::S1, Some(blink), false);
//!     unsafe { avr_device::interrupt::enable() };
//!     loop {}
//! }
//! ```

#![expect(unsafe_code, reason = "memory-mapped register access and wdr")]

use core::ptr::{read_volatile, write_volatile};

use crate::registers::{WDRF, WatchdogRegisters, bit};

/// MCU status register (data-space address).
const MCUSR: *mut u8 = 0x54 as *mut u8;
/// Watchdog timer control register (data-space address).
const WDTCSR: *mut u8 = 0x60 as *mut u8;

/// The on-chip watchdog of an ATmega328P.
///
/// Zero-sized; construct it once and hand it to
/// [`Watchdog::new`](crate::controller::Watchdog::new).
#[derive(Debug, Default)]
pub struct Atmega328p {
    _private: (),
}

impl Atmega328p {
    /// Create the backend.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl WatchdogRegisters for Atmega328p {
    #[inline(always)]
    fn read_control(&self) -> u8 {
        // SAFETY: WDTCSR is a valid, always-mapped I/O register.
        unsafe { read_volatile(WDTCSR) }
    }

    #[inline(always)]
    fn write_control(&self, value: u8) {
        // SAFETY: WDTCSR is a valid, always-mapped I/O register.
        unsafe { write_volatile(WDTCSR, value) }
    }

    #[inline(always)]
    fn restart_countdown(&self) {
        // SAFETY: `wdr` only restarts the watchdog counter.
        unsafe { core::arch::asm!("wdr", options(nomem, nostack, preserves_flags)) }
    }

    #[inline(always)]
    fn reset_cause_flag(&self) -> bool {
        // SAFETY: MCUSR is a valid, always-mapped I/O register.
        let mcusr = unsafe { read_volatile(MCUSR) };
        mcusr & bit(WDRF) != 0
    }

    #[inline(always)]
    fn clear_reset_cause_flag(&self) {
        // SAFETY: MCUSR is a valid, always-mapped I/O register.
        let mcusr = unsafe { read_volatile(MCUSR) };
        // SAFETY: as above; the other reset flags are written back unchanged.
        unsafe { write_volatile(MCUSR, mcusr & !bit(WDRF)) }
    }
}
