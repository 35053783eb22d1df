//! Concrete drivers for the Lumen display stack
//!
//! Implementations of the traits defined in lumen-core and lumen-hal:
//!
//! - Panel transports for SPI, quad-SPI, 8080 parallel and I2C OLED buses
//! - [`BusDisplay`], the display driver shared by every bus family
//! - Backlights driven directly from a GPIO pin or a PWM channel
//! - A blitter for 2-D copy engines
//! - An adapter from `embedded-hal` output pins

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// This must go first so the logging macros are visible in every module
mod fmt;

pub mod backlight;
pub mod blit;
pub mod display;
pub mod pin;
pub mod transport;

pub use backlight::{GpioBacklight, PwmBacklight};
pub use blit::Dma2dBlitter;
pub use display::{BusDisplay, ResetTiming};
pub use pin::HalPin;
pub use transport::{I2cOledBus, Mcu8080PanelBus, QspiPanelBus, SpiPanelBus};
