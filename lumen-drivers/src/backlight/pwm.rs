//! Dimmable backlight on a PWM channel

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use lumen_core::registry::BRIGHTNESS_MAX;
use lumen_core::traits::BacklightHook;
use lumen_core::DisplayError;
use lumen_hal::pwm::{PwmChannel, DUTY_MAX};

/// PWM backlight
///
/// Brightness `1..=100` maps linearly onto the duty cycle; `0` disables
/// the channel. An inverted channel drives the light with the low phase.
pub struct PwmBacklight<M: RawMutex, P> {
    channel: Mutex<M, RefCell<P>>,
    inverted: bool,
}

impl<M: RawMutex, P: PwmChannel> PwmBacklight<M, P> {
    /// Take over `channel`, which should start disabled
    pub fn new(channel: P, inverted: bool) -> Self {
        Self {
            channel: Mutex::new(RefCell::new(channel)),
            inverted,
        }
    }

    fn duty(&self, level: u8) -> u16 {
        let duty = level as u16 * (DUTY_MAX / BRIGHTNESS_MAX as u16);
        if self.inverted {
            DUTY_MAX - duty
        } else {
            duty
        }
    }
}

impl<M: RawMutex + Sync, P: PwmChannel + Send> BacklightHook for PwmBacklight<M, P> {
    fn set_brightness(&self, level: u8) -> Result<(), DisplayError> {
        let level = level.min(BRIGHTNESS_MAX);
        let duty = self.duty(level);
        self.channel.lock(|channel| {
            let mut channel = channel.borrow_mut();
            if level == 0 {
                return channel.disable().map_err(|_| DisplayError::Io);
            }
            channel.set_duty(duty).map_err(|_| DisplayError::Io)?;
            channel.enable().map_err(|_| DisplayError::Io)
        })
    }
}
