//! MCU-8080 parallel bus abstractions
//!
//! The 8080 interface has a dedicated D/C line driven by the peripheral.
//! Commands and their parameters are short register writes; pixel data is
//! moved by DMA.

/// Intel 8080-style parallel panel bus
pub trait Mcu8080Bus {
    /// Error type for bus operations
    type Error;

    /// Write a command byte (D/C low)
    fn write_command(&mut self, command: u8) -> Result<(), Self::Error>;

    /// Write parameter bytes (D/C high), returning once written
    fn write_data(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Start a DMA write of pixel data (D/C high)
    ///
    /// Completion is reported by the transfer-complete interrupt.
    fn start_write_data(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Largest number of bytes a single DMA write can move
    fn max_dma_len(&self) -> usize;
}
