//! Panel bus transport

use crate::error::DisplayError;

/// Outcome of starting a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transfer {
    /// Finished before returning
    Done,
    /// Running in the background; the transfer-complete interrupt must
    /// call `BusContext::on_transfer_complete`
    Pending,
}

/// Command and pixel transfers on one physical bus
///
/// Every start method either finishes synchronously or starts DMA and
/// returns [`Transfer::Pending`]. The bus worker waits for completion and
/// then calls [`LcdBus::complete`] before starting the next transfer.
pub trait LcdBus {
    /// Send a command byte followed by its parameters
    fn start_command(&mut self, command: u8, params: &[u8]) -> Result<Transfer, DisplayError>;

    /// Open a pixel write with the panel's memory-write command
    fn begin_pixels(&mut self, write_command: u8) -> Result<Transfer, DisplayError>;

    /// Send one chunk of pixel data, at most [`LcdBus::max_transfer`] bytes
    fn start_pixels(&mut self, chunk: &[u8]) -> Result<Transfer, DisplayError>;

    /// Close a pixel write
    fn end_pixels(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    /// Called once a started transfer has finished or timed out
    fn complete(&mut self) {}

    /// Largest chunk `start_pixels` accepts
    fn max_transfer(&self) -> usize {
        usize::MAX
    }

    /// Drive the panel reset line, `true` meaning asserted
    fn set_reset(&mut self, _asserted: bool) {}
}
