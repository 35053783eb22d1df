//! Intel 8080 parallel panels

use lumen_core::traits::{LcdBus, Transfer};
use lumen_core::DisplayError;
use lumen_hal::{Mcu8080Bus, NoPin, OutputPin};

/// 8080 panel transport
///
/// The bus peripheral drives D/C and WR itself; only reset is a GPIO.
pub struct Mcu8080PanelBus<B, RST = NoPin> {
    bus: B,
    rst: RST,
}

impl<B: Mcu8080Bus, RST: OutputPin> Mcu8080PanelBus<B, RST> {
    pub fn new(bus: B, mut rst: RST) -> Self {
        rst.set_high();
        Self { bus, rst }
    }
}

impl<B: Mcu8080Bus, RST: OutputPin> LcdBus for Mcu8080PanelBus<B, RST> {
    fn start_command(&mut self, command: u8, params: &[u8]) -> Result<Transfer, DisplayError> {
        self.bus.write_command(command).map_err(|_| DisplayError::Bus)?;
        if !params.is_empty() {
            self.bus.write_data(params).map_err(|_| DisplayError::Bus)?;
        }
        Ok(Transfer::Done)
    }

    fn begin_pixels(&mut self, write_command: u8) -> Result<Transfer, DisplayError> {
        self.bus.write_command(write_command).map_err(|_| DisplayError::Bus)?;
        Ok(Transfer::Done)
    }

    fn start_pixels(&mut self, chunk: &[u8]) -> Result<Transfer, DisplayError> {
        self.bus.start_write_data(chunk).map_err(|_| DisplayError::Bus)?;
        Ok(Transfer::Pending)
    }

    fn max_transfer(&self) -> usize {
        self.bus.max_dma_len()
    }

    fn set_reset(&mut self, asserted: bool) {
        self.rst.set_state(!asserted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockBus {
        commands: Vec<u8>,
        data: Vec<u8>,
        dma: Vec<usize>,
    }

    impl Mcu8080Bus for MockBus {
        type Error = ();

        fn write_command(&mut self, command: u8) -> Result<(), ()> {
            self.commands.push(command);
            Ok(())
        }

        fn write_data(&mut self, data: &[u8]) -> Result<(), ()> {
            self.data.extend_from_slice(data);
            Ok(())
        }

        fn start_write_data(&mut self, data: &[u8]) -> Result<(), ()> {
            self.dma.push(data.len());
            Ok(())
        }

        fn max_dma_len(&self) -> usize {
            65_535
        }
    }

    #[test]
    fn test_command_then_params() {
        let mut bus = Mcu8080PanelBus::new(MockBus::default(), NoPin);
        bus.start_command(0x2A, &[0, 0, 0, 239]).unwrap();
        bus.start_command(0x29, &[]).unwrap();

        assert_eq!(bus.bus.commands, vec![0x2A, 0x29]);
        assert_eq!(bus.bus.data, vec![0, 0, 0, 239]);
    }

    #[test]
    fn test_pixels_by_dma() {
        let mut bus = Mcu8080PanelBus::new(MockBus::default(), NoPin);
        assert_eq!(bus.begin_pixels(0x2C), Ok(Transfer::Done));
        assert_eq!(bus.start_pixels(&[0; 480]), Ok(Transfer::Pending));

        assert_eq!(bus.bus.commands, vec![0x2C]);
        assert_eq!(bus.bus.dma, vec![480]);
        assert_eq!(bus.max_transfer(), 65_535);
    }
}
