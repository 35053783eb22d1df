//! Quad-SPI panels
//!
//! Controllers such as the ST77916, SPD2010 and CO5300 take commands as a
//! single-line write instruction carrying the DCS command in the middle
//! address byte. Pixels follow a separate instruction with the data phase
//! on four lines, chip select held low across every chunk of the frame.

use lumen_core::traits::{LcdBus, Transfer};
use lumen_core::DisplayError;
use lumen_hal::qspi::{Lines, QspiBus, QspiCommand};

/// Instruction bytes for a quad-SPI panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QspiOpcodes {
    /// Register write, single line
    pub command: u8,
    /// Pixel write, data on four lines
    pub pixels: u8,
}

impl Default for QspiOpcodes {
    fn default() -> Self {
        Self {
            command: 0x02,
            pixels: 0x32,
        }
    }
}

/// Quad-SPI panel transport
pub struct QspiPanelBus<Q> {
    qspi: Q,
    opcodes: QspiOpcodes,
}

impl<Q: QspiBus> QspiPanelBus<Q> {
    pub fn new(qspi: Q, opcodes: QspiOpcodes) -> Self {
        Self { qspi, opcodes }
    }
}

impl<Q: QspiBus> LcdBus for QspiPanelBus<Q> {
    fn start_command(&mut self, command: u8, params: &[u8]) -> Result<Transfer, DisplayError> {
        let cmd = QspiCommand {
            instruction: self.opcodes.command,
            instruction_lines: Lines::Single,
            address: [0x00, command, 0x00],
            address_lines: Lines::Single,
            data: params,
            data_lines: Lines::Single,
        };
        self.qspi.command(&cmd).map_err(|_| DisplayError::Bus)?;
        Ok(Transfer::Done)
    }

    fn begin_pixels(&mut self, write_command: u8) -> Result<Transfer, DisplayError> {
        self.qspi.force_cs(true).map_err(|_| DisplayError::Bus)?;
        let cmd = QspiCommand {
            instruction: self.opcodes.pixels,
            instruction_lines: Lines::Single,
            address: [0x00, write_command, 0x00],
            address_lines: Lines::Single,
            data: &[],
            data_lines: Lines::Quad,
        };
        self.qspi.command(&cmd).map_err(|_| DisplayError::Bus)?;
        Ok(Transfer::Done)
    }

    fn start_pixels(&mut self, chunk: &[u8]) -> Result<Transfer, DisplayError> {
        self.qspi.start_write(chunk).map_err(|_| DisplayError::Bus)?;
        Ok(Transfer::Pending)
    }

    fn end_pixels(&mut self) -> Result<(), DisplayError> {
        self.qspi.force_cs(false).map_err(|_| DisplayError::Bus)
    }

    fn max_transfer(&self) -> usize {
        self.qspi.max_dma_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum Op {
        Command { instruction: u8, address: [u8; 3], data: Vec<u8>, quad: bool },
        Write(usize),
        Cs(bool),
    }

    #[derive(Default)]
    struct MockQspi {
        ops: Vec<Op>,
    }

    impl QspiBus for MockQspi {
        type Error = ();

        fn command(&mut self, command: &QspiCommand<'_>) -> Result<(), ()> {
            self.ops.push(Op::Command {
                instruction: command.instruction,
                address: command.address,
                data: command.data.to_vec(),
                quad: command.data_lines == Lines::Quad,
            });
            Ok(())
        }

        fn start_write(&mut self, data: &[u8]) -> Result<(), ()> {
            self.ops.push(Op::Write(data.len()));
            Ok(())
        }

        fn force_cs(&mut self, asserted: bool) -> Result<(), ()> {
            self.ops.push(Op::Cs(asserted));
            Ok(())
        }

        fn max_dma_len(&self) -> usize {
            32 * 1024
        }
    }

    #[test]
    fn test_register_write_layout() {
        let mut bus = QspiPanelBus::new(MockQspi::default(), QspiOpcodes::default());
        bus.start_command(0x36, &[0x00]).unwrap();

        assert_eq!(
            bus.qspi.ops,
            vec![Op::Command {
                instruction: 0x02,
                address: [0x00, 0x36, 0x00],
                data: vec![0x00],
                quad: false,
            }]
        );
    }

    #[test]
    fn test_pixel_frame_sequence() {
        let mut bus = QspiPanelBus::new(MockQspi::default(), QspiOpcodes::default());
        bus.begin_pixels(0x2C).unwrap();
        assert_eq!(bus.start_pixels(&[0; 100]), Ok(Transfer::Pending));
        bus.end_pixels().unwrap();

        assert_eq!(
            bus.qspi.ops,
            vec![
                Op::Cs(true),
                Op::Command {
                    instruction: 0x32,
                    address: [0x00, 0x2C, 0x00],
                    data: vec![],
                    quad: true,
                },
                Op::Write(100),
                Op::Cs(false),
            ]
        );
    }

    #[test]
    fn test_custom_opcodes() {
        let opcodes = QspiOpcodes { command: 0x02, pixels: 0x12 };
        let mut bus = QspiPanelBus::new(MockQspi::default(), opcodes);
        bus.begin_pixels(0x2C).unwrap();
        assert!(matches!(bus.qspi.ops[1], Op::Command { instruction: 0x12, .. }));
        assert_eq!(bus.max_transfer(), 32 * 1024);
    }
}
