//! On/off backlight on a GPIO pin
//!
//! Any non-zero brightness switches the light on. The pin can be wired
//! active-high (default) or active-low, e.g. through a P-channel MOSFET.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use lumen_core::config::ActiveLevel;
use lumen_core::traits::BacklightHook;
use lumen_core::DisplayError;
use lumen_hal::OutputPin;

/// GPIO backlight
pub struct GpioBacklight<M: RawMutex, P> {
    pin: Mutex<M, RefCell<P>>,
    level: ActiveLevel,
}

impl<M: RawMutex, P: OutputPin> GpioBacklight<M, P> {
    /// Take over `pin`, starting with the light off
    pub fn new(mut pin: P, level: ActiveLevel) -> Self {
        pin.set_state(level == ActiveLevel::Low);
        Self {
            pin: Mutex::new(RefCell::new(pin)),
            level,
        }
    }

    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, ActiveLevel::High)
    }

    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, ActiveLevel::Low)
    }

    /// Switch the light
    pub fn set_on(&self, on: bool) {
        let high = on == (self.level == ActiveLevel::High);
        self.pin.lock(|pin| pin.borrow_mut().set_state(high));
    }

    pub fn is_on(&self) -> bool {
        let high = self.pin.lock(|pin| pin.borrow().is_set_high());
        high == (self.level == ActiveLevel::High)
    }
}

impl<M: RawMutex + Sync, P: OutputPin + Send> BacklightHook for GpioBacklight<M, P> {
    fn set_brightness(&self, level: u8) -> Result<(), DisplayError> {
        self.set_on(level > 0);
        Ok(())
    }
}
