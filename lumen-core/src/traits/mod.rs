//! Capability traits implemented outside this crate
//!
//! - [`DisplayDriver`] - panel lifecycle and flush
//! - [`LcdBus`] - command and pixel transfers on one physical bus
//! - [`BacklightHook`] - board-specific backlight control

pub mod bus;
pub mod display;

pub use bus::{LcdBus, Transfer};
pub use display::{BacklightHook, DisplayDriver};
