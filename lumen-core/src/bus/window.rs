//! Panel window addressing

use heapless::Vec;

use crate::buffer::Area;

/// How a controller is told where pixel data goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressMode {
    /// MIPI-DCS column/row address set, then memory write
    Dcs {
        /// Column address set
        caset: u8,
        /// Row address set
        raset: u8,
        /// Memory write
        ramwr: u8,
        /// Added to every column (panels smaller than the controller RAM)
        x_offset: u16,
        /// Added to every row
        y_offset: u16,
    },
    /// Page-addressed controller; the transport positions each page itself
    Paged,
}

impl AddressMode {
    /// Standard DCS commands without offsets
    pub const DCS: Self = Self::dcs_with_offset(0, 0);

    /// Standard DCS commands with a panel offset
    pub const fn dcs_with_offset(x_offset: u16, y_offset: u16) -> Self {
        Self::Dcs {
            caset: 0x2A,
            raset: 0x2B,
            ramwr: 0x2C,
            x_offset,
            y_offset,
        }
    }

    /// Command that opens a pixel write
    pub const fn write_command(&self) -> u8 {
        match self {
            Self::Dcs { ramwr, .. } => *ramwr,
            Self::Paged => 0,
        }
    }
}

/// An address command and its four parameter bytes
pub type AddressCommand = (u8, [u8; 4]);

/// Last column and row ranges sent to the panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowCache {
    columns: Option<(u16, u16)>,
    rows: Option<(u16, u16)>,
}

impl WindowCache {
    /// Forget what the panel holds, so the next window is sent in full
    pub fn invalidate(&mut self) {
        *self = Self::default();
    }

    /// Commands needed to move the panel window to `area`
    ///
    /// Ranges that match the last programmed ones are skipped. The cache
    /// assumes the returned commands are sent; call
    /// [`WindowCache::invalidate`] if sending fails.
    pub fn plan(&mut self, mode: &AddressMode, area: &Area) -> Vec<AddressCommand, 2> {
        let mut commands = Vec::new();
        if let AddressMode::Dcs {
            caset,
            raset,
            x_offset,
            y_offset,
            ..
        } = *mode
        {
            let columns = (area.x1.saturating_add(x_offset), area.x2.saturating_add(x_offset));
            let rows = (area.y1.saturating_add(y_offset), area.y2.saturating_add(y_offset));

            if self.columns != Some(columns) {
                self.columns = Some(columns);
                let _ = commands.push((caset, range_params(columns)));
            }
            if self.rows != Some(rows) {
                self.rows = Some(rows);
                let _ = commands.push((raset, range_params(rows)));
            }
        }
        commands
    }
}

fn range_params((start, end): (u16, u16)) -> [u8; 4] {
    let [s_hi, s_lo] = start.to_be_bytes();
    let [e_hi, e_lo] = end.to_be_bytes();
    [s_hi, s_lo, e_hi, e_lo]
}
