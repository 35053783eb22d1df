//! 4-wire SPI panels
//!
//! MIPI-DBI type C: a data/command line selects between command and data
//! bytes, chip select frames each command, and pixel data streams by DMA
//! with chip select held for the whole frame.

use lumen_core::traits::{LcdBus, Transfer};
use lumen_core::DisplayError;
use lumen_hal::{DmaSpi, NoPin, OutputPin};

/// SPI panel transport
pub struct SpiPanelBus<SPI, DC, CS = NoPin, RST = NoPin> {
    spi: SPI,
    dc: DC,
    cs: CS,
    rst: RST,
    /// Chip select stays asserted between pixel chunks
    streaming: bool,
}

impl<SPI: DmaSpi, DC: OutputPin, CS: OutputPin, RST: OutputPin> SpiPanelBus<SPI, DC, CS, RST> {
    /// Build a transport; pass [`NoPin`] for lines the board ties off
    pub fn new(spi: SPI, mut dc: DC, mut cs: CS, mut rst: RST) -> Self {
        dc.set_high();
        cs.set_high();
        rst.set_high();
        Self {
            spi,
            dc,
            cs,
            rst,
            streaming: false,
        }
    }

    fn send_command(&mut self, command: u8) -> Result<(), DisplayError> {
        self.cs.set_low();
        self.dc.set_low();
        let result = self.spi.write(&[command]).map_err(|_| DisplayError::Bus);
        self.dc.set_high();
        result
    }
}

impl<SPI: DmaSpi, DC: OutputPin, CS: OutputPin, RST: OutputPin> LcdBus for SpiPanelBus<SPI, DC, CS, RST> {
    fn start_command(&mut self, command: u8, params: &[u8]) -> Result<Transfer, DisplayError> {
        self.send_command(command)?;
        if !params.is_empty() {
            self.spi.write(params).map_err(|_| DisplayError::Bus)?;
        }
        Ok(Transfer::Done)
    }

    fn begin_pixels(&mut self, write_command: u8) -> Result<Transfer, DisplayError> {
        self.send_command(write_command)?;
        self.streaming = true;
        Ok(Transfer::Done)
    }

    fn start_pixels(&mut self, chunk: &[u8]) -> Result<Transfer, DisplayError> {
        self.spi.start_write(chunk).map_err(|_| DisplayError::Bus)?;
        Ok(Transfer::Pending)
    }

    fn end_pixels(&mut self) -> Result<(), DisplayError> {
        self.streaming = false;
        self.cs.set_high();
        Ok(())
    }

    fn complete(&mut self) {
        if !self.streaming {
            self.cs.set_high();
        }
    }

    fn max_transfer(&self) -> usize {
        self.spi.max_dma_len()
    }

    fn set_reset(&mut self, asserted: bool) {
        // RESX is active low
        self.rst.set_state(!asserted);
    }
}
