//! Bit-banged chain access for the start-up loopback test
//!
//! Drives the chain from three GPIOs: SER (data, released to read the far
//! end of the chain back), the shift clock and LE. LE is held low for the
//! whole test so no driver register latches the test pattern.
//!
//! The scan itself runs on a background bus; these pins are handed over to
//! it once the test has passed.

use rowscan_core::traits::SelfTestPort;
use rowscan_hal::{DirectionalPin, OutputPin};

/// Chain access driven directly from GPIOs
pub struct BitBangBus<D, C, L> {
    data: D,
    clock: C,
    latch: L,
}

impl<D, C, L> BitBangBus<D, C, L>
where
    D: DirectionalPin,
    C: OutputPin,
    L: OutputPin,
{
    /// Take the pins with every line driven low
    pub fn new(data: D, clock: C, latch: L) -> Self {
        let mut bus = Self { data, clock, latch };
        bus.data.set_as_output();
        bus.data.set_low();
        bus.clock.set_low();
        bus.latch.set_low();
        bus
    }
}

impl<D, C, L> SelfTestPort for BitBangBus<D, C, L>
where
    D: DirectionalPin,
    C: OutputPin,
    L: OutputPin,
{
    fn drive_data(&mut self, high: bool) {
        self.data.set_as_output();
        self.data.set_state(high);
    }

    fn release_data(&mut self) {
        self.data.set_as_input();
    }

    fn sample_data(&mut self) -> bool {
        self.data.is_high()
    }

    fn pulse_clock(&mut self) {
        self.clock.pulse();
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use core::cell::RefCell;
    use rowscan_core::config::BoardConfig;
    use rowscan_core::selftest::run_self_test;
    use rowscan_hal::InputPin;
    use std::rc::Rc;
    use std::vec::Vec;

    /// Lines shared by the mock pins
    #[derive(Default)]
    struct Wires {
        ser: bool,
        output: bool,
        /// Rising clock edges seen with LE high
        latched_edges: usize,
        le: bool,
        /// Simulated shift registers, far end last
        chain: Vec<bool>,
    }

    type Shared = Rc<RefCell<Wires>>;

    struct DataPin(Shared);
    struct ClockPin(Shared, bool);
    struct LatchPin(Shared);

    impl OutputPin for DataPin {
        fn set_high(&mut self) {
            self.0.borrow_mut().ser = true;
        }
        fn set_low(&mut self) {
            self.0.borrow_mut().ser = false;
        }
        fn is_set_high(&self) -> bool {
            self.0.borrow().ser
        }
    }

    impl InputPin for DataPin {
        fn is_high(&self) -> bool {
            let wires = self.0.borrow();
            if wires.output {
                wires.ser
            } else {
                wires.chain.last().copied().unwrap_or(false)
            }
        }
    }

    impl DirectionalPin for DataPin {
        fn set_as_output(&mut self) {
            self.0.borrow_mut().output = true;
        }
        fn set_as_input(&mut self) {
            self.0.borrow_mut().output = false;
        }
    }

    impl OutputPin for ClockPin {
        fn set_high(&mut self) {
            if !self.1 {
                let mut wires = self.0.borrow_mut();
                let ser = wires.output && wires.ser;
                if wires.le {
                    wires.latched_edges += 1;
                }
                wires.chain.rotate_right(1);
                if let Some(first) = wires.chain.first_mut() {
                    *first = ser;
                }
            }
            self.1 = true;
        }
        fn set_low(&mut self) {
            self.1 = false;
        }
        fn is_set_high(&self) -> bool {
            self.1
        }
    }

    impl OutputPin for LatchPin {
        fn set_high(&mut self) {
            self.0.borrow_mut().le = true;
        }
        fn set_low(&mut self) {
            self.0.borrow_mut().le = false;
        }
        fn is_set_high(&self) -> bool {
            self.0.borrow().le
        }
    }

    fn chain(chain_len: usize) -> (BitBangBus<DataPin, ClockPin, LatchPin>, Shared) {
        let wires = Rc::new(RefCell::new(Wires {
            le: true,
            chain: std::vec![false; chain_len],
            ..Wires::default()
        }));
        let bus = BitBangBus::new(
            DataPin(wires.clone()),
            ClockPin(wires.clone(), false),
            LatchPin(wires.clone()),
        );
        (bus, wires)
    }

    #[test]
    fn test_self_test_over_intact_chain() {
        let bits = BoardConfig::CANONICAL.chain_bits();
        let (mut bus, wires) = chain(usize::from(bits));
        assert_eq!(run_self_test(&mut bus, bits), Ok(()));

        // Nothing latched, data line left driven low
        let wires = wires.borrow();
        assert_eq!(wires.latched_edges, 0);
        assert!(wires.output);
        assert!(!wires.ser);
    }

    #[test]
    fn test_self_test_detects_missing_register() {
        let bits = BoardConfig::CANONICAL.chain_bits();
        let (mut bus, _wires) = chain(usize::from(bits) - 8);
        let err = run_self_test(&mut bus, bits).unwrap_err();
        assert!(err.mismatches > 0);
        assert_eq!(err.chain_bits, bits);
    }
}
