//! Quad-SPI bus abstractions
//!
//! QSPI panels (CO5300, SH8601 and friends) take a framed command made of
//! an instruction byte, a 24-bit address carrying the DCS command, and an
//! optional data phase. Pixel data follows a pre-command on four lines
//! while chip select is held low by software.

/// Number of data lines used for one phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Lines {
    /// Standard single-line SPI
    Single,
    /// Dual SPI
    Dual,
    /// Quad SPI
    Quad,
}

/// One framed QSPI command
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QspiCommand<'a> {
    /// Instruction byte
    pub instruction: u8,
    /// Lines used for the instruction phase
    pub instruction_lines: Lines,
    /// Address bytes, most significant first
    pub address: [u8; 3],
    /// Lines used for the address phase
    pub address_lines: Lines,
    /// Data phase, empty for none
    pub data: &'a [u8],
    /// Lines used for the data phase
    pub data_lines: Lines,
}

/// Quad-SPI master
pub trait QspiBus {
    /// Error type for QSPI operations
    type Error;

    /// Send a complete framed command, returning once it is on the wire
    fn command(&mut self, command: &QspiCommand<'_>) -> Result<(), Self::Error>;

    /// Start a DMA data write on all four lines
    ///
    /// Completion is reported by the transfer-complete interrupt.
    fn start_write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Hold chip select asserted across several commands and writes
    fn force_cs(&mut self, asserted: bool) -> Result<(), Self::Error>;

    /// Largest number of bytes a single DMA write can move
    fn max_dma_len(&self) -> usize;
}
