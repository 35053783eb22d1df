//! Lumen Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the display stack needs from a
//! chip HAL. A board support crate implements them on top of its vendor
//! peripherals; `lumen-drivers` builds panel transports on top of them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  lumen-core (pool, registry, workers)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lumen-drivers (transports, backlight)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lumen-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!            board / vendor HAL
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital output (DC, CS, reset, backlight)
//! - [`pwm::PwmChannel`] - Backlight dimming
//! - [`spi::DmaSpi`] - SPI with interrupt-completed DMA writes
//! - [`qspi::QspiBus`] - Quad-SPI command and data phases
//! - [`parallel::Mcu8080Bus`] - MCU-8080 parallel panel bus
//! - [`i2c::I2cBus`] - I2C bus operations
//! - [`dma2d::CopyEngine`] - 2-D copy accelerator
//! - [`board::BoardIo`] - Pin-number based GPIO/PWM access for the registry
//!
//! Every long transfer is split into a synchronous *start* here and an
//! interrupt that later reports completion to the bus worker, so none of
//! these traits block for the duration of a frame.

#![no_std]
#![deny(unsafe_code)]

pub mod board;
pub mod dma2d;
pub mod gpio;
pub mod i2c;
pub mod parallel;
pub mod pwm;
pub mod qspi;
pub mod spi;

// Re-export key traits at crate root for convenience
pub use board::BoardIo;
pub use dma2d::CopyEngine;
pub use gpio::{NoPin, OutputPin};
pub use i2c::I2cBus;
pub use parallel::Mcu8080Bus;
pub use pwm::PwmChannel;
pub use qspi::QspiBus;
pub use spi::DmaSpi;
