//! Rectangle copies
//!
//! The renderer port moves pixels into frames through a [`Blitter`] so a
//! board with a 2-D engine can offload the copy. [`CpuBlitter`] is the
//! portable fallback.

use super::format::{copy_rect, PixelFormat};
use crate::buffer::Area;
use crate::error::DisplayError;

/// One rectangle copy
///
/// `src` is packed: exactly `area` sized. `dst` is a raster `dst_width`
/// pixels wide in `format`, and `area` is where the pixels land in it.
#[derive(Debug)]
pub struct CopyJob<'a> {
    pub src: &'a [u8],
    pub dst: &'a mut [u8],
    pub format: PixelFormat,
    pub area: Area,
    pub dst_width: u16,
}

impl<'a> CopyJob<'a> {
    /// Copy a whole `width` x `height` raster
    pub fn whole(src: &'a [u8], dst: &'a mut [u8], format: PixelFormat, width: u16, height: u16) -> Self {
        Self {
            src,
            dst,
            format,
            area: Area::full(width, height),
            dst_width: width,
        }
    }

    /// Perform the copy on the CPU
    ///
    /// Packed formats only support full-width rectangles.
    pub fn run_on_cpu(self) -> Result<(), DisplayError> {
        if !self.area.is_valid() {
            return Err(DisplayError::InvalidParameter);
        }
        match self.format.bytes_per_pixel() {
            Some(bpp) => copy_rect(self.dst, self.dst_width, &self.area, self.src, bpp),
            None => {
                if self.area.x1 != 0 || self.area.width() != self.dst_width {
                    return Err(DisplayError::Unsupported);
                }
                let stride = self.format.stride(self.dst_width);
                let offset = self.area.y1 as usize * stride;
                let len = self.area.height() as usize * stride;
                let target = self
                    .dst
                    .get_mut(offset..offset + len)
                    .ok_or(DisplayError::InvalidParameter)?;
                let source = self.src.get(..len).ok_or(DisplayError::InvalidParameter)?;
                target.copy_from_slice(source);
                Ok(())
            }
        }
    }
}

/// Something that copies rectangles between rasters
#[allow(async_fn_in_trait)]
pub trait Blitter {
    /// Copy and wait until the destination may be used
    async fn copy(&mut self, job: CopyJob<'_>) -> Result<(), DisplayError>;
}

/// Copies on the calling core
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBlitter;

impl Blitter for CpuBlitter {
    async fn copy(&mut self, job: CopyJob<'_>) -> Result<(), DisplayError> {
        job.run_on_cpu()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    #[test]
    fn test_whole_copy_rgb() {
        let src = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let mut dst = [0u8; 8];
        block_on(CpuBlitter.copy(CopyJob::whole(&src, &mut dst, PixelFormat::Rgb565, 2, 2))).unwrap();
        assert_eq!(dst, src);
    }

    #[test]
    fn test_whole_copy_packed() {
        let src = [0xAAu8, 0x55];
        let mut dst = [0u8; 2];
        block_on(CpuBlitter.copy(CopyJob::whole(&src, &mut dst, PixelFormat::Monochrome, 8, 2))).unwrap();
        assert_eq!(dst, src);
    }

    #[test]
    fn test_partial_packed_unsupported() {
        let src = [0u8; 1];
        let mut dst = [0u8; 2];
        let job = CopyJob {
            src: &src,
            dst: &mut dst,
            format: PixelFormat::Monochrome,
            area: Area::new(0, 0, 3, 0),
            dst_width: 16,
        };
        assert_eq!(job.run_on_cpu(), Err(DisplayError::Unsupported));
    }

    #[test]
    fn test_area_copy_rgb888() {
        let src = [9u8, 9, 9];
        let mut dst = [0u8; 12];
        let job = CopyJob {
            src: &src,
            dst: &mut dst,
            format: PixelFormat::Rgb888,
            area: Area::new(1, 1, 1, 1),
            dst_width: 2,
        };
        job.run_on_cpu().unwrap();
        assert_eq!(dst, [0, 0, 0, 0, 0, 0, 0, 0, 0, 9, 9, 9]);
    }

    #[test]
    fn test_inverted_area_rejected() {
        let src = [0xFFu8; 8];
        let mut dst = [0u8; 8];
        for format in [PixelFormat::Rgb565, PixelFormat::Monochrome] {
            let job = CopyJob {
                src: &src,
                dst: &mut dst,
                format,
                area: Area::new(3, 0, 1, 0),
                dst_width: 4,
            };
            assert_eq!(job.run_on_cpu(), Err(DisplayError::InvalidParameter));
        }
        assert_eq!(
            block_on(CpuBlitter.copy(CopyJob {
                src: &src,
                dst: &mut dst,
                format: PixelFormat::Rgb565,
                area: Area::new(0, 2, 1, 1),
                dst_width: 4,
            })),
            Err(DisplayError::InvalidParameter)
        );
        assert_eq!(dst, [0; 8]);
    }
}
