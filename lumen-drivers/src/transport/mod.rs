//! Panel transports
//!
//! Each transport implements [`LcdBus`](lumen_core::traits::LcdBus) for one
//! bus family. Commands and parameters are short and written blocking;
//! pixel chunks go out by DMA and complete through
//! [`BusContext::on_transfer_complete`](lumen_core::BusContext::on_transfer_complete).

pub mod i2c_oled;
pub mod mcu8080;
pub mod qspi;
pub mod spi;

pub use i2c_oled::I2cOledBus;
pub use mcu8080::Mcu8080PanelBus;
pub use qspi::{QspiOpcodes, QspiPanelBus};
pub use spi::SpiPanelBus;
