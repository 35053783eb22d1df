//! 2-D copy engine abstractions
//!
//! Some MCUs carry a blitter (STM32 DMA2D, Tuya T5 DMA2D) that moves a
//! rectangle of pixels between two rasters in the background.

/// Pixel formats the engine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineFormat {
    /// 16-bit RGB565
    Rgb565,
    /// 24-bit RGB888
    Rgb888,
}

impl EngineFormat {
    /// Bytes per pixel
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb565 => 2,
            Self::Rgb888 => 3,
        }
    }
}

/// A rectangle copy from `src` into `dst` at `(x, y)`
///
/// `src` holds exactly `width * height` pixels. `dst` is a raster
/// `dst_width` pixels wide.
#[derive(Debug)]
pub struct CopyRequest<'a> {
    /// Source pixels
    pub src: &'a [u8],
    /// Destination raster
    pub dst: &'a mut [u8],
    /// Pixel format of both rasters
    pub format: EngineFormat,
    /// Rectangle width in pixels
    pub width: u16,
    /// Rectangle height in pixels
    pub height: u16,
    /// Destination raster width in pixels
    pub dst_width: u16,
    /// Destination column
    pub x: u16,
    /// Destination row
    pub y: u16,
}

/// Background 2-D copy engine
pub trait CopyEngine {
    /// Error type for engine operations
    type Error;

    /// Program and start a copy
    ///
    /// Both rasters must stay untouched until the engine's completion
    /// interrupt fires.
    fn start_copy(&mut self, request: &mut CopyRequest<'_>) -> Result<(), Self::Error>;

    /// Stop a copy that never completed
    fn abort(&mut self) {}
}
