//! # avr-wdt
//!
//! Configuration wrapper for the watchdog timer of AVR microcontrollers.
//!
//! This crate provides a `#![no_std]` watchdog controller with:
//! - `Watchdog` for arming, disarming and kicking the timer
//! - an optional interrupt callback, run from the `WDT` vector
//! - optional device reset on expiry
//! - `WatchdogRegisters` trait separating the register sequence from the
//!   hardware
//! - `SimulatedRegisters` for host-side testing (`std` feature)
//!
//! ## Modes
//!
//! ```text
//!                 begin(t, Some(f), false)
//!            ┌──────────────────────────────► InterruptOnly
//!            │    begin(t, None, true)
//! Disarmed ──┼──────────────────────────────► ResetOnly
//!     ▲      │    begin(t, Some(f), true)
//!     │      └──────────────────────────────► InterruptThenReset
//!     │                                           │
//!     └────────────────── end() ──────────────────┘
//! ```
//!
//! ## Reset loops
//!
//! A watchdog reset leaves the timer running at 16 ms. Bootloaders that
//! are slower than that to start (Duemilanove, Nano) will reset forever,
//! and only reflashing the bootloader over ICSP recovers the board. See
//! [`Watchdog`] for details.
//!
//! ## Example
//!
//! ```rust
//! use avr_wdt::prelude::*;
//!
//! let wdt = Watchdog::new(SimulatedRegisters::new());
//!
//! wdt.begin(WatchdogTimeout::S4, None, true);
//! assert!(wdt.will_reset());
//! assert!(!wdt.will_interrupt());
//!
//! // Keep the device alive.
//! wdt.reset();
//!
//! wdt.end();
//! assert_eq!(wdt.mode(), WatchdogMode::Disarmed);
//! ```

#![no_std]
#![cfg_attr(target_arch = "avr", feature(asm_experimental_arch))]
#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(any(test, feature = "std"))]
extern crate std;

mod macros;

pub mod config;
pub mod controller;
pub mod error;
pub mod prelude;
pub mod registers;
pub mod state;
pub mod timeout;

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub mod sim;

#[cfg(target_arch = "avr")]
pub mod atmega;

pub use config::{WatchdogConfig, WatchdogConfigBuilder, control_value};
pub use controller::Watchdog;
pub use error::{WatchdogError, WatchdogResult};
pub use registers::WatchdogRegisters;
pub use state::{InterruptCallback, WatchdogMode};
pub use timeout::WatchdogTimeout;

#[cfg(feature = "std")]
pub use sim::{Expiry, SimulatedRegisters};
