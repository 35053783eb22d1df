//! Backlights wired straight to a peripheral
//!
//! For boards whose backlight line is owned by the application rather than
//! addressed by pin number through [`BoardIo`](lumen_hal::BoardIo). Register
//! one with
//! [`Registry::register_custom_backlight`](lumen_core::Registry::register_custom_backlight)
//! and describe the panel's backlight as `BacklightConfig::Custom`.

pub mod gpio;
pub mod pwm;

pub use gpio::GpioBacklight;
pub use pwm::PwmBacklight;
