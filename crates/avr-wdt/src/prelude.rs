//! Prelude for avr-wdt.
//!
//! This module re-exports the most commonly used types for convenient importing.
//!
//! # Example
//!
//! ```rust
//! use avr_wdt::prelude::*;
//!
//! let wdt = Watchdog::new(SimulatedRegisters::new());
//! wdt.begin(WatchdogTimeout::default(), None, false);
//! wdt.reset();
//! ```

pub use crate::config::{WatchdogConfig, WatchdogConfigBuilder};
pub use crate::controller::Watchdog;
pub use crate::error::{WatchdogError, WatchdogResult};
pub use crate::registers::WatchdogRegisters;
pub use crate::state::{InterruptCallback, WatchdogMode};
pub use crate::timeout::WatchdogTimeout;

#[cfg(feature = "std")]
pub use crate::sim::{Expiry, LoggedOp, RegisterOp, SimulatedRegisters};
