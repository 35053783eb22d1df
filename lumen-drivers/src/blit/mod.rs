//! 2-D copy engine blitter
//!
//! Offloads RGB rectangle copies to a DMA2D-class engine. The engine's
//! completion interrupt signals a static [`Signal`]; the copy waits on it
//! with a bounded timeout before the destination frame may move on.
//! Packed monochrome and grayscale copies stay on the CPU.
//!
//! ```ignore
//! static BLIT_DONE: Signal<CriticalSectionRawMutex, ()> = Signal::new();
//!
//! #[interrupt]
//! fn DMA2D() {
//!     BLIT_DONE.signal(());
//! }
//! ```

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{with_timeout, Duration};
use lumen_core::pixel::{Blitter, CopyJob, PixelFormat};
use lumen_core::DisplayError;
use lumen_hal::dma2d::{CopyEngine, CopyRequest, EngineFormat};

/// Deadline for one engine copy
pub const DEFAULT_COPY_TIMEOUT: Duration = Duration::from_millis(1000);

/// Blitter backed by a [`CopyEngine`]
pub struct Dma2dBlitter<M: RawMutex + 'static, E> {
    engine: E,
    done: &'static Signal<M, ()>,
    timeout: Duration,
}

impl<M: RawMutex + 'static, E: CopyEngine> Dma2dBlitter<M, E> {
    /// `done` must be signalled from the engine's completion interrupt
    pub fn new(engine: E, done: &'static Signal<M, ()>) -> Self {
        Self {
            engine,
            done,
            timeout: DEFAULT_COPY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn engine_format(format: PixelFormat) -> Option<EngineFormat> {
    match format {
        PixelFormat::Rgb565 => Some(EngineFormat::Rgb565),
        PixelFormat::Rgb666 | PixelFormat::Rgb888 => Some(EngineFormat::Rgb888),
        PixelFormat::Monochrome | PixelFormat::Gray2 => None,
    }
}

impl<M: RawMutex + 'static, E: CopyEngine> Blitter for Dma2dBlitter<M, E> {
    async fn copy(&mut self, job: CopyJob<'_>) -> Result<(), DisplayError> {
        let Some(format) = engine_format(job.format) else {
            return job.run_on_cpu();
        };

        let area = job.area;
        let bpp = format.bytes_per_pixel();
        let dst_rows = job.dst.len() / (job.dst_width as usize * bpp).max(1);
        if !area.fits(job.dst_width, dst_rows.min(u16::MAX as usize) as u16)
            || job.src.len() < area.pixel_count() * bpp
        {
            return Err(DisplayError::InvalidParameter);
        }

        self.done.reset();
        let mut request = CopyRequest {
            src: job.src,
            dst: job.dst,
            format,
            width: area.width(),
            height: area.height(),
            dst_width: job.dst_width,
            x: area.x1,
            y: area.y1,
        };
        self.engine.start_copy(&mut request).map_err(|_| DisplayError::Bus)?;

        if with_timeout(self.timeout, self.done.wait()).await.is_err() {
            warn!("blit: engine timed out");
            self.engine.abort();
            return Err(DisplayError::BusTimeout);
        }
        Ok(())
    }
}
