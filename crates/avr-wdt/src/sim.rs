//! Simulated watchdog peripheral.
//!
//! `SimulatedRegisters` implements [`WatchdogRegisters`] with the register
//! semantics of the ATmega48/88/168/328 family, so the reconfiguration
//! sequence can be exercised on a host:
//!
//! - WDTCSR is protected: outside the change window `WDE` can only be set
//!   and the prescaler is frozen. Writing `WDCE | WDE` opens the window for
//!   exactly one following access.
//! - `WDRF` in MCUSR forces `WDE` on.
//! - Writing a one to `WDIF` clears a pending interrupt flag.
//! - Taking the interrupt in interrupt-and-reset mode clears `WDIE`.
//! - A watchdog reset sets `WDRF`, leaves `WDE` on, drops the prescaler to
//!   16 ms and clears the global interrupt flag.
//!
//! Every access is logged together with the global interrupt state at the
//! time it happened.

use std::cell::RefCell;
use std::vec::Vec;

use crate::controller::Watchdog;
use crate::registers::{
    CHANGE_ENABLE, WDE, WDIE, WDIF, WDP3, WDP_LOW_MASK, WatchdogRegisters, bit,
};
use crate::state::WatchdogMode;

/// Prescaler bits of WDTCSR.
const PRESCALER_MASK: u8 = bit(WDP3) | WDP_LOW_MASK;

/// A single register access performed against the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOp {
    /// WDTCSR was read.
    ReadControl,
    /// WDTCSR was written with the given value.
    WriteControl(u8),
    /// `wdr` was executed.
    RestartCountdown,
    /// `WDRF` was read.
    ReadResetCause,
    /// `WDRF` was cleared.
    ClearResetCause,
}

/// A logged register access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggedOp {
    /// The access.
    pub op: RegisterOp,
    /// Whether global interrupts were enabled when it happened.
    pub interrupts_enabled: bool,
}

/// Outcome of a simulated countdown expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// The watchdog is stopped; nothing happened.
    Stopped,
    /// The interrupt was delivered.
    Interrupt,
    /// `WDIF` was raised but interrupts are masked.
    Pending,
    /// The device was reset.
    Reset,
}

#[derive(Debug)]
struct SimState {
    /// WDTCSR without `WDIF` and `WDCE`.
    control: u8,
    interrupt_flag: bool,
    reset_cause: bool,
    global_interrupts: bool,
    change_window: bool,
    expire_in_critical_section: bool,
    kicks: u32,
    interrupts_taken: u32,
    device_resets: u32,
    rejected_writes: u32,
    log: Vec<LoggedOp>,
}

impl SimState {
    fn record(&mut self, op: RegisterOp) {
        self.log.push(LoggedOp {
            op,
            interrupts_enabled: self.global_interrupts,
        });
    }

    fn write_control(&mut self, value: u8) {
        let window = core::mem::take(&mut self.change_window);

        if value & bit(WDIF) != 0 {
            self.interrupt_flag = false;
        }

        let mut next = if window {
            value & (bit(WDIE) | bit(WDE) | PRESCALER_MASK)
        } else {
            let mut next = (self.control & !bit(WDIE)) | (value & bit(WDIE));
            if value & bit(WDE) != 0 {
                next |= bit(WDE);
            }
            let clears_wde = self.control & bit(WDE) != 0 && value & bit(WDE) == 0;
            let moves_prescaler = value & PRESCALER_MASK != self.control & PRESCALER_MASK;
            if clears_wde || moves_prescaler {
                self.rejected_writes = self.rejected_writes.saturating_add(1);
            }
            next
        };

        if self.reset_cause {
            next |= bit(WDE);
        }
        self.control = next;

        if !window && value & CHANGE_ENABLE == CHANGE_ENABLE {
            self.change_window = true;
        }
    }

    fn deliver_interrupt(&mut self) {
        self.interrupt_flag = false;
        if self.control & bit(WDE) != 0 {
            self.control &= !bit(WDIE);
        }
        self.interrupts_taken = self.interrupts_taken.saturating_add(1);
    }

    fn reset_device(&mut self) {
        self.reset_cause = true;
        self.control = bit(WDE);
        self.interrupt_flag = false;
        self.global_interrupts = false;
        self.change_window = false;
        self.device_resets = self.device_resets.saturating_add(1);
    }

    fn expire(&mut self) -> Expiry {
        match WatchdogMode::from_control(self.control) {
            WatchdogMode::Disarmed => Expiry::Stopped,
            WatchdogMode::ResetOnly => {
                self.reset_device();
                Expiry::Reset
            }
            WatchdogMode::InterruptThenReset if self.interrupt_flag => {
                self.reset_device();
                Expiry::Reset
            }
            WatchdogMode::InterruptOnly | WatchdogMode::InterruptThenReset => {
                self.interrupt_flag = true;
                if self.global_interrupts {
                    self.deliver_interrupt();
                    Expiry::Interrupt
                } else {
                    Expiry::Pending
                }
            }
        }
    }
}

/// Register-level fake of the AVR watchdog peripheral.
///
/// # Example
///
/// ```rust
/// use avr_wdt::prelude::*;
///
/// let wdt = Watchdog::new(SimulatedRegisters::new());
/// wdt.begin(WatchdogTimeout::S2, None, true);
///
/// assert_eq!(wdt.registers().control() & 0b111, 7);
/// assert_eq!(wdt.simulate_expiry(), Expiry::Reset);
/// ```
#[derive(Debug)]
pub struct SimulatedRegisters {
    state: RefCell<SimState>,
}

impl SimulatedRegisters {
    /// Create a simulator in the power-on state: watchdog stopped, no
    /// reset cause, global interrupts enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RefCell::new(SimState {
                control: 0,
                interrupt_flag: false,
                reset_cause: false,
                global_interrupts: true,
                change_window: false,
                expire_in_critical_section: false,
                kicks: 0,
                interrupts_taken: 0,
                device_resets: 0,
                rejected_writes: 0,
                log: Vec::new(),
            }),
        }
    }

    /// Create a simulator in the state the chip wakes up in after a
    /// watchdog reset: `WDRF` set, `WDE` forced on, 16 ms prescaler.
    #[must_use]
    pub fn after_watchdog_reset() -> Self {
        let sim = Self::new();
        sim.state.borrow_mut().reset_device();
        sim
    }

    /// Effective WDTCSR contents, `WDIF` included.
    #[must_use]
    pub fn control(&self) -> u8 {
        let state = self.state.borrow();
        if state.interrupt_flag {
            state.control | bit(WDIF)
        } else {
            state.control
        }
    }

    /// Mode the peripheral is currently in.
    #[must_use]
    pub fn mode(&self) -> WatchdogMode {
        WatchdogMode::from_control(self.state.borrow().control)
    }

    /// Current `WDRF` value, without logging an access.
    #[must_use]
    pub fn reset_cause(&self) -> bool {
        self.state.borrow().reset_cause
    }

    /// Whether `WDIF` is pending.
    #[must_use]
    pub fn interrupt_pending(&self) -> bool {
        self.state.borrow().interrupt_flag
    }

    /// Global interrupt flag (the I bit of SREG).
    #[must_use]
    pub fn global_interrupts(&self) -> bool {
        self.state.borrow().global_interrupts
    }

    /// Set the global interrupt flag, as `sei`/`cli` would.
    pub fn set_global_interrupts(&self, enabled: bool) {
        self.state.borrow_mut().global_interrupts = enabled;
    }

    /// Number of `wdr` executions.
    #[must_use]
    pub fn kicks(&self) -> u32 {
        self.state.borrow().kicks
    }

    /// Number of watchdog interrupts delivered.
    #[must_use]
    pub fn interrupts_taken(&self) -> u32 {
        self.state.borrow().interrupts_taken
    }

    /// Number of watchdog resets.
    #[must_use]
    pub fn device_resets(&self) -> u32 {
        self.state.borrow().device_resets
    }

    /// Number of writes that tried to change protected bits outside the
    /// change window.
    #[must_use]
    pub fn rejected_writes(&self) -> u32 {
        self.state.borrow().rejected_writes
    }

    /// Snapshot of the access log.
    #[must_use]
    pub fn log(&self) -> Vec<LoggedOp> {
        self.state.borrow().log.clone()
    }

    /// Values written to WDTCSR, oldest first.
    #[must_use]
    pub fn control_writes(&self) -> Vec<u8> {
        self.state
            .borrow()
            .log
            .iter()
            .filter_map(|entry| match entry.op {
                RegisterOp::WriteControl(value) => Some(value),
                _ => None,
            })
            .collect()
    }

    /// Last value written to WDTCSR.
    #[must_use]
    pub fn last_control_write(&self) -> Option<u8> {
        self.control_writes().last().copied()
    }

    /// Drop the access log.
    pub fn clear_log(&self) {
        self.state.borrow_mut().log.clear();
    }

    /// Make the countdown expire right after interrupts are masked by the
    /// next [`interrupt_free`](WatchdogRegisters::interrupt_free) call.
    pub fn expire_during_next_critical_section(&self) {
        self.state.borrow_mut().expire_in_critical_section = true;
    }

    /// Let the countdown run out.
    ///
    /// The caller is responsible for dispatching a returned
    /// [`Expiry::Interrupt`] to the interrupt handler;
    /// [`Watchdog::simulate_expiry`] does both.
    pub fn expire(&self) -> Expiry {
        self.state.borrow_mut().expire()
    }

    /// Deliver a pending interrupt if interrupts are enabled.
    ///
    /// Returns true if the interrupt was taken. This only updates the
    /// register state; [`Watchdog::service_pending`] also runs the handler.
    pub fn service_pending(&self) -> bool {
        let mut state = self.state.borrow_mut();
        if state.global_interrupts && state.interrupt_flag && state.control & bit(WDIE) != 0 {
            state.deliver_interrupt();
            true
        } else {
            false
        }
    }

    fn touch(&self, op: RegisterOp) {
        let mut state = self.state.borrow_mut();
        state.change_window = false;
        state.record(op);
    }
}

impl Default for SimulatedRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchdogRegisters for SimulatedRegisters {
    fn read_control(&self) -> u8 {
        self.touch(RegisterOp::ReadControl);
        self.control()
    }

    fn write_control(&self, value: u8) {
        let mut state = self.state.borrow_mut();
        state.record(RegisterOp::WriteControl(value));
        state.write_control(value);
    }

    fn restart_countdown(&self) {
        self.touch(RegisterOp::RestartCountdown);
        let mut state = self.state.borrow_mut();
        state.kicks = state.kicks.saturating_add(1);
    }

    fn reset_cause_flag(&self) -> bool {
        self.touch(RegisterOp::ReadResetCause);
        self.reset_cause()
    }

    fn clear_reset_cause_flag(&self) {
        self.touch(RegisterOp::ClearResetCause);
        self.state.borrow_mut().reset_cause = false;
    }

    fn interrupt_free<R>(&self, f: impl FnOnce() -> R) -> R {
        let saved = {
            let mut state = self.state.borrow_mut();
            let saved = state.global_interrupts;
            state.global_interrupts = false;
            if core::mem::take(&mut state.expire_in_critical_section) {
                state.expire();
            }
            saved
        };
        let result = f();
        self.state.borrow_mut().global_interrupts = saved;
        result
    }
}

impl Watchdog<SimulatedRegisters> {
    /// Let the simulated countdown run out and, if the interrupt is
    /// delivered, run the interrupt handler.
    pub fn simulate_expiry(&self) -> Expiry {
        let expiry = self.registers().expire();
        if expiry == Expiry::Interrupt {
            self.on_interrupt();
        }
        expiry
    }

    /// Take a pending interrupt once interrupts are enabled again and run
    /// the interrupt handler for it.
    ///
    /// Returns true if the interrupt was taken.
    pub fn service_pending(&self) -> bool {
        let taken = self.registers().service_pending();
        if taken {
            self.on_interrupt();
        }
        taken
    }
}
