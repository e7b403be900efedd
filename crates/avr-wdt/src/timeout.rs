//! Supported watchdog timeout intervals.
//!
//! The watchdog oscillator runs at 128 kHz and the prescaler divides it by
//! 2K..1024K cycles, giving ten nominal intervals from 16 ms to 8 s. Raw
//! codes match the `WDTO_*` constants of `avr/wdt.h` (where the shortest is
//! spelled `WDTO_15MS`).

use crate::error::{WatchdogError, WatchdogResult};

/// One of the ten prescaler settings of the watchdog timer.
///
/// Variants are ordered by duration, so `a < b` means `a` expires sooner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum WatchdogTimeout {
    /// 16 milliseconds.
    Ms16 = 0,
    /// 32 milliseconds.
    Ms32 = 1,
    /// 64 milliseconds.
    Ms64 = 2,
    /// 125 milliseconds.
    Ms125 = 3,
    /// 250 milliseconds.
    Ms250 = 4,
    /// 500 milliseconds.
    Ms500 = 5,
    /// 1 second.
    #[default]
    S1 = 6,
    /// 2 seconds.
    S2 = 7,
    /// 4 seconds.
    S4 = 8,
    /// 8 seconds.
    S8 = 9,
}

impl WatchdogTimeout {
    /// All supported timeouts, shortest first.
    pub const ALL: [Self; 10] = [
        Self::Ms16,
        Self::Ms32,
        Self::Ms64,
        Self::Ms125,
        Self::Ms250,
        Self::Ms500,
        Self::S1,
        Self::S2,
        Self::S4,
        Self::S8,
    ];

    /// Longest timeout reachable without the `WDP3` prescaler bit.
    pub const EXTENDED_RANGE_THRESHOLD: Self = Self::S2;

    /// Convert from a raw prescaler code.
    #[must_use]
    pub const fn from_raw(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Ms16),
            1 => Some(Self::Ms32),
            2 => Some(Self::Ms64),
            3 => Some(Self::Ms125),
            4 => Some(Self::Ms250),
            5 => Some(Self::Ms500),
            6 => Some(Self::S1),
            7 => Some(Self::S2),
            8 => Some(Self::S4),
            9 => Some(Self::S8),
            _ => None,
        }
    }

    /// Convert to the raw prescaler code.
    #[must_use]
    pub const fn to_raw(self) -> u8 {
        self as u8
    }

    /// Pick the longest supported timeout that does not exceed `ms`.
    ///
    /// # Errors
    ///
    /// Returns [`WatchdogError::TimeoutOutOfRange`] if `ms` is below 16 or
    /// above 8000.
    pub fn from_millis(ms: u32) -> WatchdogResult<Self> {
        if !(16..=8000).contains(&ms) {
            return Err(WatchdogError::timeout_out_of_range(ms));
        }
        Self::ALL
            .iter()
            .rev()
            .copied()
            .find(|t| t.as_millis() <= ms)
            .ok_or(WatchdogError::timeout_out_of_range(ms))
    }

    /// Nominal interval in milliseconds.
    ///
    /// The real interval drifts with supply voltage and temperature; the
    /// oscillator is only accurate to roughly ten percent.
    #[must_use]
    pub const fn as_millis(self) -> u32 {
        match self {
            Self::Ms16 => 16,
            Self::Ms32 => 32,
            Self::Ms64 => 64,
            Self::Ms125 => 125,
            Self::Ms250 => 250,
            Self::Ms500 => 500,
            Self::S1 => 1000,
            Self::S2 => 2000,
            Self::S4 => 4000,
            Self::S8 => 8000,
        }
    }

    /// Nominal interval as a [`core::time::Duration`].
    #[must_use]
    pub fn as_duration(self) -> core::time::Duration {
        core::time::Duration::from_millis(u64::from(self.as_millis()))
    }

    /// Low three prescaler bits (`WDP2..WDP0`).
    #[must_use]
    pub const fn prescaler_bits(self) -> u8 {
        self.to_raw() & 0b111
    }

    /// Whether this timeout needs the `WDP3` bit.
    #[must_use]
    pub const fn is_extended_range(self) -> bool {
        self.to_raw() > Self::EXTENDED_RANGE_THRESHOLD.to_raw()
    }

    /// Get the timeout as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ms16 => "16ms",
            Self::Ms32 => "32ms",
            Self::Ms64 => "64ms",
            Self::Ms125 => "125ms",
            Self::Ms250 => "250ms",
            Self::Ms500 => "500ms",
            Self::S1 => "1s",
            Self::S2 => "2s",
            Self::S4 => "4s",
            Self::S8 => "8s",
        }
    }
}

impl TryFrom<u8> for WatchdogTimeout {
    type Error = WatchdogError;

    fn try_from(code: u8) -> WatchdogResult<Self> {
        Self::from_raw(code).ok_or(WatchdogError::invalid_timeout_code(code))
    }
}

impl From<WatchdogTimeout> for u8 {
    fn from(timeout: WatchdogTimeout) -> Self {
        timeout.to_raw()
    }
}

impl core::fmt::Display for WatchdogTimeout {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_one_second() {
        assert_eq!(WatchdogTimeout::default(), WatchdogTimeout::S1);
    }

    #[test]
    fn test_raw_codes_are_contiguous() {
        for (code, timeout) in WatchdogTimeout::ALL.iter().enumerate() {
            assert_eq!(usize::from(timeout.to_raw()), code);
        }
        assert_eq!(WatchdogTimeout::from_raw(10), None);
        assert!(WatchdogTimeout::try_from(255).is_err());
    }

    #[test]
    fn test_duration_matches_millis() {
        for timeout in WatchdogTimeout::ALL {
            assert_eq!(
                timeout.as_duration(),
                core::time::Duration::from_millis(u64::from(timeout.as_millis()))
            );
        }
        assert_eq!(
            WatchdogTimeout::S8.as_duration(),
            core::time::Duration::from_secs(8)
        );
    }

    #[test]
    fn test_extended_range() {
        assert!(!WatchdogTimeout::S2.is_extended_range());
        assert!(WatchdogTimeout::S4.is_extended_range());
        assert!(WatchdogTimeout::S8.is_extended_range());
        assert_eq!(WatchdogTimeout::S4.prescaler_bits(), 0);
        assert_eq!(WatchdogTimeout::S8.prescaler_bits(), 1);
    }

    #[test]
    fn test_from_millis_rounds_down() {
        assert_eq!(WatchdogTimeout::from_millis(16), Ok(WatchdogTimeout::Ms16));
        assert_eq!(WatchdogTimeout::from_millis(999), Ok(WatchdogTimeout::Ms500));
        assert_eq!(WatchdogTimeout::from_millis(1000), Ok(WatchdogTimeout::S1));
        assert_eq!(WatchdogTimeout::from_millis(8000), Ok(WatchdogTimeout::S8));
        assert!(WatchdogTimeout::from_millis(15).is_err());
        assert!(WatchdogTimeout::from_millis(8001).is_err());
    }
}
