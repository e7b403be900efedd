//! Property-based tests for the watchdog register sequence.

#![cfg(feature = "std")]

use avr_wdt::prelude::*;
use avr_wdt::registers::{WDE, WDIE, WDIF, WDP3, bit};
use proptest::prelude::*;

fn noop() {}

fn any_timeout() -> impl Strategy<Value = WatchdogTimeout> {
    proptest::sample::select(WatchdogTimeout::ALL.to_vec())
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Begin {
        timeout: WatchdogTimeout,
        interrupt: bool,
        reset: bool,
    },
    End,
    Kick,
}

fn any_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (any_timeout(), any::<bool>(), any::<bool>()).prop_map(|(timeout, interrupt, reset)| {
            Action::Begin {
                timeout,
                interrupt,
                reset,
            }
        }),
        Just(Action::End),
        Just(Action::Kick),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_written_value_encodes_configuration(
        timeout in any_timeout(),
        interrupt in any::<bool>(),
        reset in any::<bool>(),
    ) {
        let wdt = Watchdog::new(SimulatedRegisters::new());
        let callback: Option<InterruptCallback> = if interrupt { Some(noop) } else { None };
        wdt.begin(timeout, callback, reset);

        let Some(written) = wdt.registers().last_control_write() else {
            return Err(TestCaseError::fail("begin wrote nothing"));
        };
        prop_assert_eq!(written & 0b111, timeout.to_raw() & 7);
        prop_assert_eq!(written & bit(WDP3) != 0, timeout.to_raw() > 7);
        prop_assert_eq!(written & bit(WDIE) != 0, interrupt);
        prop_assert_eq!(written & bit(WDE) != 0, reset);
        prop_assert!(written & bit(WDIF) != 0);
        prop_assert_eq!(written, avr_wdt::control_value(timeout, interrupt, reset));
    }

    #[test]
    fn prop_flags_follow_last_begin_or_end(
        actions in proptest::collection::vec(any_action(), 0..20),
    ) {
        let wdt = Watchdog::new(SimulatedRegisters::new());
        let mut expected_reset = false;
        let mut expected_interrupt = false;

        for action in actions {
            match action {
                Action::Begin { timeout, interrupt, reset } => {
                    let callback: Option<InterruptCallback> =
                        if interrupt { Some(noop) } else { None };
                    wdt.begin(timeout, callback, reset);
                    expected_reset = reset;
                    expected_interrupt = interrupt;
                }
                Action::End => {
                    wdt.end();
                    expected_reset = false;
                    expected_interrupt = false;
                }
                Action::Kick => wdt.reset(),
            }
            prop_assert_eq!(wdt.will_reset(), expected_reset);
            prop_assert_eq!(wdt.will_interrupt(), expected_interrupt);
        }
    }

    #[test]
    fn prop_no_protected_write_is_rejected(
        actions in proptest::collection::vec(any_action(), 0..20),
        start_after_reset in any::<bool>(),
    ) {
        let sim = if start_after_reset {
            SimulatedRegisters::after_watchdog_reset()
        } else {
            SimulatedRegisters::new()
        };
        let wdt = Watchdog::new(sim);

        for action in actions {
            match action {
                Action::Begin { timeout, interrupt, reset } => {
                    let callback: Option<InterruptCallback> =
                        if interrupt { Some(noop) } else { None };
                    wdt.begin(timeout, callback, reset);
                    let expected = avr_wdt::control_value(timeout, interrupt, reset) & !bit(WDIF);
                    prop_assert_eq!(wdt.registers().control(), expected);
                }
                Action::End => {
                    wdt.end();
                    prop_assert_eq!(wdt.registers().control(), 0);
                }
                Action::Kick => wdt.reset(),
            }
        }
        prop_assert_eq!(wdt.registers().rejected_writes(), 0);
    }

    #[test]
    fn prop_interrupt_state_is_restored(
        timeout in any_timeout(),
        reset in any::<bool>(),
        enabled in any::<bool>(),
    ) {
        let wdt = Watchdog::new(SimulatedRegisters::new());
        wdt.registers().set_global_interrupts(enabled);

        wdt.begin(timeout, Some(noop), reset);
        prop_assert_eq!(wdt.registers().global_interrupts(), enabled);

        wdt.end();
        prop_assert_eq!(wdt.registers().global_interrupts(), enabled);
    }

    #[test]
    fn prop_end_is_idempotent(
        timeout in any_timeout(),
        interrupt in any::<bool>(),
        reset in any::<bool>(),
    ) {
        let once = Watchdog::new(SimulatedRegisters::new());
        let twice = Watchdog::new(SimulatedRegisters::new());
        let callback: Option<InterruptCallback> = if interrupt { Some(noop) } else { None };

        once.begin(timeout, callback, reset);
        once.end();
        twice.begin(timeout, callback, reset);
        twice.end();
        twice.end();

        prop_assert_eq!(once.registers().control(), twice.registers().control());
        prop_assert_eq!(once.will_reset(), twice.will_reset());
        prop_assert_eq!(once.will_interrupt(), twice.will_interrupt());
        prop_assert_eq!(once.timeout(), twice.timeout());
        prop_assert_eq!(once.mode(), twice.mode());
    }

    #[test]
    fn prop_from_millis_never_exceeds_request(ms in 16u32..=8000) {
        let timeout = WatchdogTimeout::from_millis(ms);
        prop_assert!(timeout.is_ok());
        if let Ok(timeout) = timeout {
            prop_assert!(timeout.as_millis() <= ms);
        }
    }

    #[test]
    fn prop_raw_roundtrip(code in 0u8..10) {
        let timeout = WatchdogTimeout::from_raw(code);
        prop_assert_eq!(timeout.map(WatchdogTimeout::to_raw), Some(code));
    }
}
