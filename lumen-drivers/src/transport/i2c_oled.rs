//! I2C monochrome OLEDs (SSD1306 / SH1106)
//!
//! Frames arrive row-major, one bit per pixel. The controller stores
//! 8-row pages with one byte per column, so each page is repacked and
//! written after positioning the page and column pointers. The whole
//! frame goes out in one blocking pass.

use heapless::Vec;
use lumen_core::pixel::mono_pixel;
use lumen_core::traits::{LcdBus, Transfer};
use lumen_core::DisplayError;
use lumen_hal::I2cBus;

/// Default 7-bit address
pub const OLED_ADDRESS: u8 = 0x3C;

/// Widest supported controller RAM
pub const MAX_COLUMNS: usize = 132;

/// Control byte: command stream follows
const CONTROL_COMMAND: u8 = 0x00;
/// Control byte: display data follows
const CONTROL_DATA: u8 = 0x40;

mod cmd {
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
}

/// I2C OLED transport
pub struct I2cOledBus<I2C> {
    i2c: I2C,
    address: u8,
    width: u16,
    height: u16,
    /// Column of the first visible pixel (2 on SH1106)
    column_offset: u8,
}

impl<I2C: I2cBus> I2cOledBus<I2C> {
    /// A `width` x `height` panel at `address`
    pub fn new(i2c: I2C, address: u8, width: u16, height: u16) -> Result<Self, DisplayError> {
        if width == 0 || height == 0 || width as usize > MAX_COLUMNS {
            return Err(DisplayError::InvalidParameter);
        }
        Ok(Self {
            i2c,
            address,
            width,
            height,
            column_offset: 0,
        })
    }

    /// Shift every page right, for SH1106 panels
    pub fn with_column_offset(mut self, offset: u8) -> Self {
        self.column_offset = offset;
        self
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.i2c.write(self.address, bytes).map_err(|_| DisplayError::Bus)
    }

    fn write_page(&mut self, frame: &[u8], page: u16) -> Result<(), DisplayError> {
        let column = self.column_offset;
        self.write(&[
            CONTROL_COMMAND,
            cmd::SET_PAGE_ADDR | page as u8,
            cmd::SET_LOW_COLUMN | (column & 0x0F),
            cmd::SET_HIGH_COLUMN | (column >> 4),
        ])?;

        let mut data: Vec<u8, { MAX_COLUMNS + 1 }> = Vec::new();
        let _ = data.push(CONTROL_DATA);
        for x in 0..self.width {
            let mut byte = 0u8;
            for bit in 0..8 {
                let y = page * 8 + bit;
                if y < self.height && mono_pixel(frame, self.width, x, y) {
                    byte |= 1 << bit;
                }
            }
            data.push(byte).map_err(|_| DisplayError::InvalidParameter)?;
        }
        self.write(&data)
    }
}

impl<I2C: I2cBus> LcdBus for I2cOledBus<I2C> {
    fn start_command(&mut self, command: u8, params: &[u8]) -> Result<Transfer, DisplayError> {
        let mut bytes: Vec<u8, 32> = Vec::new();
        bytes
            .extend_from_slice(&[CONTROL_COMMAND, command])
            .and_then(|()| bytes.extend_from_slice(params))
            .map_err(|_| DisplayError::InvalidParameter)?;
        self.write(&bytes)?;
        Ok(Transfer::Done)
    }

    fn begin_pixels(&mut self, _write_command: u8) -> Result<Transfer, DisplayError> {
        Ok(Transfer::Done)
    }

    fn start_pixels(&mut self, frame: &[u8]) -> Result<Transfer, DisplayError> {
        let stride = (self.width as usize).div_ceil(8);
        if frame.len() < stride * self.height as usize {
            return Err(DisplayError::InvalidParameter);
        }
        for page in 0..self.height.div_ceil(8) {
            self.write_page(frame, page)?;
        }
        Ok(Transfer::Done)
    }
}
