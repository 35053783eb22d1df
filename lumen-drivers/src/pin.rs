//! `embedded-hal` output pins
//!
//! Wraps any `embedded_hal::digital::OutputPin` so it can serve as a
//! data/command, chip-select, reset or backlight line. The last level
//! written is tracked locally. A failed write is logged and the tracked
//! level still follows the request.

use embedded_hal::digital;
use lumen_hal::OutputPin;

/// An `embedded-hal` pin seen through [`OutputPin`]
#[derive(Debug)]
pub struct HalPin<P> {
    pin: P,
    high: bool,
}

impl<P: digital::OutputPin> HalPin<P> {
    /// Take over `pin`, driving it to `high`
    pub fn new(mut pin: P, high: bool) -> Self {
        if pin.set_state(high.into()).is_err() {
            warn!("pin: initial write failed");
        }
        Self { pin, high }
    }

    /// Give the pin back
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: digital::OutputPin> OutputPin for HalPin<P> {
    fn set_high(&mut self) {
        if self.pin.set_high().is_err() {
            warn!("pin: set high failed");
        }
        self.high = true;
    }

    fn set_low(&mut self) {
        if self.pin.set_low().is_err() {
            warn!("pin: set low failed");
        }
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    struct RawPin {
        writes: Vec<bool>,
    }

    impl digital::ErrorType for RawPin {
        type Error = Infallible;
    }

    impl digital::OutputPin for RawPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.writes.push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.writes.push(true);
            Ok(())
        }
    }

    /// Pin whose writes always fail
    struct StuckPin;

    #[derive(Debug)]
    struct Stuck;

    impl digital::Error for Stuck {
        fn kind(&self) -> digital::ErrorKind {
            digital::ErrorKind::Other
        }
    }

    impl digital::ErrorType for StuckPin {
        type Error = Stuck;
    }

    impl digital::OutputPin for StuckPin {
        fn set_low(&mut self) -> Result<(), Stuck> {
            Err(Stuck)
        }

        fn set_high(&mut self) -> Result<(), Stuck> {
            Err(Stuck)
        }
    }

    #[test]
    fn test_failed_writes_keep_requested_level() {
        let mut pin = HalPin::new(StuckPin, false);
        pin.set_high();
        assert!(pin.is_set_high());
        pin.set_low();
        assert!(pin.is_set_low());
    }

    #[test]
    fn test_initial_level_written() {
        let pin = HalPin::new(RawPin { writes: Vec::new() }, true);
        assert!(pin.is_set_high());
        assert_eq!(pin.release().writes, vec![true]);
    }

    #[test]
    fn test_levels_forwarded() {
        let mut pin = HalPin::new(RawPin { writes: Vec::new() }, false);
        pin.set_high();
        pin.set_state(false);
        assert!(pin.is_set_low());
        assert_eq!(pin.release().writes, vec![false, true, false]);
    }
}
