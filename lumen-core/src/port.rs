//! Renderer port
//!
//! Glue between a renderer that draws partial rectangles and a registered
//! panel. The port owns one "current" frame that the renderer's rectangles
//! are converted into. When the renderer finishes a refresh (`is_last`),
//! the port presents:
//!
//! 1. acquire the next frame from the pool, waiting if every frame is
//!    still on the bus,
//! 2. copy the current frame into it so the next refresh starts from the
//!    picture on screen,
//! 3. hand the current frame to the panel,
//! 4. make the copy current.
//!
//! The copy happens before the hand-off because a queued frame belongs to
//! the bus worker and can no longer be read by the port.

use embassy_sync::blocking_mutex::raw::RawMutex;
use lumen_hal::BoardIo;

use crate::buffer::{Area, Arenas, FramePool, FrameBuffer};
use crate::config::{DeviceInfo, PortConfig, Rotation};
use crate::error::DisplayError;
use crate::pixel::{rotate_area, rotate_pixels, swap_rgb565_area, write_area, AdaptOptions, Blitter, CopyJob, PixelFormat};
use crate::registry::{DisplayDevice, Registry, BRIGHTNESS_MAX};
use crate::traits::DisplayDriver;

/// A renderer's view of one panel
pub struct RendererPort<'r, M, D, IO, BL, const DEV: usize, const FB: usize>
where
    M: RawMutex + Sync + 'static,
{
    registry: &'r Registry<M, D, IO, DEV>,
    device: &'r DisplayDevice<M, D>,
    info: DeviceInfo,
    pool: &'static FramePool<M, FB>,
    blitter: BL,
    current: Option<FrameBuffer>,
    /// Staging raster for rotated rectangles
    scratch: Option<FrameBuffer>,
    options: AdaptOptions,
    updates_enabled: bool,
}

impl<'r, M, D, IO, BL, const DEV: usize, const FB: usize> RendererPort<'r, M, D, IO, BL, DEV, FB>
where
    M: RawMutex + Sync + 'static,
    D: DisplayDriver,
    IO: BoardIo,
    BL: Blitter,
{
    /// Open the panel called `name` and provision its frames
    ///
    /// The panel is opened and set to full brightness. `pool` receives
    /// [`PortConfig::frame_count`] frames of the panel's native size. If
    /// anything after the open fails the panel is closed again.
    ///
    /// Fails with `InvalidParameter` before opening when the driver retains
    /// frames and the pool would be too small to present.
    pub async fn new(
        registry: &'r Registry<M, D, IO, DEV>,
        name: &str,
        pool: &'static FramePool<M, FB>,
        arenas: &Arenas,
        blitter: BL,
        config: PortConfig,
    ) -> Result<Self, DisplayError> {
        let device = registry.find(name).ok_or(DisplayError::NotFound)?;
        let info = registry.get_info(device);

        let frames = config.frame_count(info.has_vram);
        let retained = device.driver().retained_frames();
        if frames < PortConfig::min_frames(retained) {
            error!("port {}: {} frames, driver keeps {}", name, frames, retained);
            return Err(DisplayError::InvalidParameter);
        }

        registry.open(device).await?;

        if let Err(e) = registry.set_brightness(device, BRIGHTNESS_MAX).await {
            warn!("port {}: backlight: {}", name, e);
        }

        let scratch = match Self::provision(pool, arenas, &info, &config) {
            Ok(scratch) => scratch,
            Err(e) => {
                error!("port {}: frame allocation failed: {}", name, e);
                pool.teardown().await;
                let _ = registry.close(device).await;
                return Err(e);
            }
        };
        let current = pool.acquire().await;

        info!(
            "port {}: {}x{} with {} frames",
            name,
            info.width,
            info.height,
            pool.capacity()
        );

        Ok(Self {
            registry,
            device,
            info,
            pool,
            blitter,
            current: Some(current),
            scratch,
            options: AdaptOptions {
                swap: info.swap,
                mono_threshold: config.mono_threshold,
            },
            updates_enabled: true,
        })
    }

    fn provision(
        pool: &'static FramePool<M, FB>,
        arenas: &Arenas,
        info: &DeviceInfo,
        config: &PortConfig,
    ) -> Result<Option<FrameBuffer>, DisplayError> {
        let count = config.frame_count(info.has_vram);
        pool.provision(arenas, config.arena, info.format, info.width, info.height, count)?;

        if info.rotation == Rotation::Deg0 {
            return Ok(None);
        }
        let bpp = renderer_bpp(info.format);
        let len = info.width as usize * info.height as usize * bpp;
        FrameBuffer::create(arenas, config.arena, len).map(Some)
    }

    /// Panel geometry and format
    pub fn info(&self) -> DeviceInfo {
        self.info
    }

    /// Resolution the renderer draws at
    pub fn logical_size(&self) -> (u16, u16) {
        self.info.logical_size()
    }

    /// The port's frame pool
    pub fn pool(&self) -> &'static FramePool<M, FB> {
        self.pool
    }

    /// Pause or resume drawing; rectangles are dropped while paused
    pub fn set_updates_enabled(&mut self, enabled: bool) {
        self.updates_enabled = enabled;
    }

    pub fn updates_enabled(&self) -> bool {
        self.updates_enabled
    }

    /// Set the panel's backlight, `0..=100`
    pub async fn set_backlight(&self, level: u8) -> Result<(), DisplayError> {
        self.registry.set_brightness(self.device, level).await
    }

    /// Take one rendered rectangle
    ///
    /// `area` is in logical coordinates and `pixels` holds it packed in the
    /// panel's renderer format. `is_last` marks the final rectangle of a
    /// refresh and presents the frame.
    pub async fn flush_area(&mut self, area: &Area, pixels: &[u8], is_last: bool) -> Result<(), DisplayError> {
        if !self.updates_enabled {
            return Ok(());
        }

        let (lw, lh) = self.info.logical_size();
        let bpp = renderer_bpp(self.info.format);
        if !area.fits(lw, lh) || pixels.len() < area.pixel_count() * bpp {
            return Err(DisplayError::InvalidParameter);
        }

        let rotation = self.info.rotation;
        let (target, src) = match self.scratch.as_mut() {
            Some(scratch) if rotation != Rotation::Deg0 => {
                let len = area.pixel_count() * bpp;
                rotate_pixels(pixels, area.width(), area.height(), bpp, rotation, scratch.data_mut())?;
                (rotate_area(area, rotation, lw, lh), &scratch.data()[..len])
            }
            _ => (*area, pixels),
        };

        let frame = self.current.as_mut().ok_or(DisplayError::InvalidParameter)?;
        match self.info.format {
            PixelFormat::Monochrome | PixelFormat::Gray2 => write_area(frame, &target, src, &self.options)?,
            format => {
                let width = frame.width();
                self.blitter
                    .copy(CopyJob {
                        src,
                        dst: frame.data_mut(),
                        format,
                        area: target,
                        dst_width: width,
                    })
                    .await?;
                if self.options.swap && format == PixelFormat::Rgb565 {
                    swap_rgb565_area(frame.data_mut(), width, &target);
                }
            }
        }

        if is_last {
            self.present().await?;
        }
        Ok(())
    }

    /// Send the current frame and continue on a copy of it
    pub async fn present(&mut self) -> Result<(), DisplayError> {
        let current = self.current.take().ok_or(DisplayError::InvalidParameter)?;

        if self.pool.capacity() < 2 {
            // Only one frame: wait for the bus to hand it back
            let result = self.registry.flush(self.device, current).await;
            self.current = Some(self.pool.acquire().await);
            return result;
        }

        let mut next = self.pool.acquire().await;
        let (width, height, format) = (next.width(), next.height(), next.format());
        let copied = self
            .blitter
            .copy(CopyJob::whole(current.data(), next.data_mut(), format, width, height))
            .await;
        if let Err(e) = copied {
            warn!("port {}: frame copy failed: {}", self.device.name(), e);
        }

        let result = self.registry.flush(self.device, current).await;
        self.current = Some(next);
        result
    }

    /// Release every frame and close the panel
    ///
    /// Waits for frames still on the bus. A periodically refreshed bus
    /// keeps its displayed frame until its context is shut down, so shut
    /// such buses down first.
    pub async fn deinit(mut self) -> Result<(), DisplayError> {
        drop(self.current.take());
        if let Some(scratch) = self.scratch.take() {
            scratch.free();
        }
        self.pool.teardown().await;
        self.registry.close(self.device).await
    }
}

fn renderer_bpp(format: PixelFormat) -> usize {
    format.renderer_format().bytes_per_pixel().unwrap_or(2)
}
