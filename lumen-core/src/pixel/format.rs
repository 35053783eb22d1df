//! Panel pixel formats and the CPU conversion paths
//!
//! The renderer draws RGB565 for 16-bit, monochrome and grayscale panels
//! and RGB888 for 18/24-bit panels (see [`PixelFormat::renderer_format`]).
//! Renderer pixels are little-endian.
//!
//! Monochrome polarity: an RGB565 value at or above the threshold is white
//! and clears its bit; anything darker sets it. Bits are LSB-first within a
//! byte and rows start on a byte boundary.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::buffer::{Area, FrameBuffer};
use crate::config::DEFAULT_MONO_THRESHOLD;
use crate::error::DisplayError;

/// Native pixel layout of a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PixelFormat {
    /// 16-bit 5-6-5
    #[default]
    Rgb565,
    /// 18-bit, sent as three bytes
    Rgb666,
    /// 24-bit 8-8-8
    Rgb888,
    /// 1 bit per pixel
    Monochrome,
    /// 2-bit grayscale
    Gray2,
}

impl PixelFormat {
    /// Whole bytes per pixel, `None` for packed formats
    pub const fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            Self::Rgb565 => Some(2),
            Self::Rgb666 | Self::Rgb888 => Some(3),
            Self::Monochrome | Self::Gray2 => None,
        }
    }

    /// Bytes in one row of `width` pixels
    pub const fn stride(self, width: u16) -> usize {
        let width = width as usize;
        match self {
            Self::Rgb565 => width * 2,
            Self::Rgb666 | Self::Rgb888 => width * 3,
            Self::Monochrome => width.div_ceil(8),
            Self::Gray2 => width.div_ceil(4),
        }
    }

    /// Bytes in a `width` x `height` raster
    pub const fn frame_len(self, width: u16, height: u16) -> usize {
        self.stride(width) * height as usize
    }

    /// Format the renderer should draw in for this panel
    pub const fn renderer_format(self) -> Self {
        match self {
            Self::Rgb666 | Self::Rgb888 => Self::Rgb888,
            Self::Rgb565 | Self::Monochrome | Self::Gray2 => Self::Rgb565,
        }
    }
}

/// Per-panel conversion settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdaptOptions {
    /// Swap RGB565 bytes in the frame
    pub swap: bool,
    /// RGB565 values at or above this are white on monochrome panels
    pub mono_threshold: u16,
}

impl Default for AdaptOptions {
    fn default() -> Self {
        Self {
            swap: false,
            mono_threshold: DEFAULT_MONO_THRESHOLD,
        }
    }
}

/// Convert a renderer rectangle into `frame` at `area`
///
/// `pixels` holds `area.pixel_count()` pixels in the frame format's
/// [`PixelFormat::renderer_format`]. The area must lie inside the frame.
pub fn write_area(
    frame: &mut FrameBuffer,
    area: &Area,
    pixels: &[u8],
    options: &AdaptOptions,
) -> Result<(), DisplayError> {
    let format = frame.format();
    let width = frame.width();
    if !area.fits(width, frame.height()) {
        return Err(DisplayError::InvalidParameter);
    }
    let src_bpp = format.renderer_format().bytes_per_pixel().unwrap_or(2);
    if pixels.len() < area.pixel_count() * src_bpp {
        return Err(DisplayError::InvalidParameter);
    }

    let data = frame.data_mut();
    match format {
        PixelFormat::Monochrome => write_mono(data, width, area, pixels, options.mono_threshold),
        PixelFormat::Gray2 => write_gray2(data, width, area, pixels),
        PixelFormat::Rgb565 | PixelFormat::Rgb666 | PixelFormat::Rgb888 => {
            copy_rect(data, width, area, pixels, src_bpp)?;
            if options.swap && format == PixelFormat::Rgb565 {
                swap_rgb565_area(data, width, area);
            }
        }
    }
    Ok(())
}

fn rgb565_at(pixels: &[u8], index: usize) -> u16 {
    u16::from_le_bytes([pixels[index * 2], pixels[index * 2 + 1]])
}

fn write_mono(data: &mut [u8], width: u16, area: &Area, pixels: &[u8], threshold: u16) {
    let stride = PixelFormat::Monochrome.stride(width);
    let w = area.width() as usize;
    for i in 0..area.pixel_count() {
        let x = area.x1 as usize + i % w;
        let y = area.y1 as usize + i / w;
        let byte = &mut data[y * stride + x / 8];
        let bit = 1u8 << (x % 8);
        if rgb565_at(pixels, i) >= threshold {
            *byte &= !bit;
        } else {
            *byte |= bit;
        }
    }
}

fn write_gray2(data: &mut [u8], width: u16, area: &Area, pixels: &[u8]) {
    let stride = PixelFormat::Gray2.stride(width);
    let w = area.width() as usize;
    for i in 0..area.pixel_count() {
        let x = area.x1 as usize + i % w;
        let y = area.y1 as usize + i / w;
        let value = rgb565_at(pixels, i);
        let r = (value >> 11) & 0x1F;
        let g = (value >> 5) & 0x3F;
        let b = value & 0x1F;
        let level = !((r + 2 * g + b) >> 2) as u8 & 0x03;

        let shift = (x % 4) * 2;
        let byte = &mut data[y * stride + x / 4];
        *byte = (*byte & !(0x03 << shift)) | (level << shift);
    }
}

/// Copy a packed `area`-sized raster into `dst` at `area`
///
/// `dst` is a raster `dst_width` pixels wide. Rows falling outside `dst`
/// are clipped.
pub(crate) fn copy_rect(
    dst: &mut [u8],
    dst_width: u16,
    area: &Area,
    src: &[u8],
    bpp: usize,
) -> Result<(), DisplayError> {
    let row_bytes = area.width() as usize * bpp;
    if !area.is_valid()
        || bpp == 0
        || area.x2 >= dst_width
        || src.len() < row_bytes * area.height() as usize
    {
        return Err(DisplayError::InvalidParameter);
    }
    for (row, line) in src.chunks_exact(row_bytes).take(area.height() as usize).enumerate() {
        let offset = ((area.y1 as usize + row) * dst_width as usize + area.x1 as usize) * bpp;
        match dst.get_mut(offset..offset + row_bytes) {
            Some(target) => target.copy_from_slice(line),
            None => break,
        }
    }
    Ok(())
}

/// Swap RGB565 bytes inside `area` of a raster `width` pixels wide
pub fn swap_rgb565_area(data: &mut [u8], width: u16, area: &Area) {
    if !area.is_valid() {
        return;
    }
    let row_bytes = area.width() as usize * 2;
    for y in area.y1..=area.y2 {
        let offset = (y as usize * width as usize + area.x1 as usize) * 2;
        match data.get_mut(offset..offset + row_bytes) {
            Some(row) => swap_rgb565(row),
            None => break,
        }
    }
}

/// Swap the two bytes of every RGB565 pixel in place
pub fn swap_rgb565(buf: &mut [u8]) {
    for pixel in buf.chunks_exact_mut(2) {
        pixel.swap(0, 1);
    }
}

/// Read one pixel of a monochrome raster
pub fn mono_pixel(data: &[u8], width: u16, x: u16, y: u16) -> bool {
    let stride = PixelFormat::Monochrome.stride(width);
    data[y as usize * stride + x as usize / 8] & (1 << (x % 8)) != 0
}

/// Re-lay a row-major monochrome raster into page-major order
///
/// Page-addressed OLED controllers (SSD1306 and kin) take one byte per
/// column per 8-row page, bit `n` being row `page * 8 + n`. `dst` must
/// hold `width * ceil(height / 8)` bytes.
pub fn mono_to_pages(src: &[u8], width: u16, height: u16, dst: &mut [u8]) -> Result<(), DisplayError> {
    let pages = height.div_ceil(8) as usize;
    let w = width as usize;
    if src.len() < PixelFormat::Monochrome.frame_len(width, height) || dst.len() < w * pages {
        return Err(DisplayError::InvalidParameter);
    }

    for page in 0..pages {
        for x in 0..width {
            let mut byte = 0u8;
            for bit in 0..8 {
                let y = page * 8 + bit;
                if y < height as usize && mono_pixel(src, width, x, y as u16) {
                    byte |= 1 << bit;
                }
            }
            dst[page * w + x as usize] = byte;
        }
    }
    Ok(())
}
