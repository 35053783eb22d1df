//! Frame buffers
//!
//! A [`FrameBuffer`] is the unit handed from the renderer to a bus worker.
//! It is moved, never shared: at any instant exactly one of the renderer,
//! a pool free list or a bus queue owns it.
//!
//! A frame handed out by a pool carries a [`Reclaim`] hook. Dropping the
//! frame passes it back through the hook, so every custody cycle ends with
//! exactly one return whether the frame was sent, discarded during a
//! drain, or dropped on an error path.

use core::fmt;
use core::mem;

use super::arena::{ArenaBlock, ArenaKind, Arenas};
use crate::error::DisplayError;
use crate::pixel::PixelFormat;

/// Storage alignment for frame data, in bytes
pub const FRAME_ALIGN: usize = 4;

/// Destination for frames whose custody cycle has ended
pub trait Reclaim: Sync {
    /// Take a frame back. The frame arrives without a hook attached.
    fn reclaim(&self, frame: FrameBuffer);
}

/// Inclusive pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Area {
    pub x1: u16,
    pub y1: u16,
    pub x2: u16,
    pub y2: u16,
}

impl Area {
    /// Rectangle from inclusive corners
    pub const fn new(x1: u16, y1: u16, x2: u16, y2: u16) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Rectangle covering a whole `width` x `height` raster
    pub const fn full(width: u16, height: u16) -> Self {
        Self::new(0, 0, width.saturating_sub(1), height.saturating_sub(1))
    }

    /// Columns covered, `0` for an inverted rectangle
    pub const fn width(&self) -> u16 {
        span(self.x1, self.x2)
    }

    /// Rows covered, `0` for an inverted rectangle
    pub const fn height(&self) -> u16 {
        span(self.y1, self.y2)
    }

    /// Number of pixels covered
    pub const fn pixel_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    /// Corners are ordered
    pub const fn is_valid(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }

    /// Lies inside a `width` x `height` raster
    pub const fn fits(&self, width: u16, height: u16) -> bool {
        self.is_valid() && self.x2 < width && self.y2 < height
    }
}

const fn span(start: u16, end: u16) -> u16 {
    if end < start {
        0
    } else {
        (end - start).saturating_add(1)
    }
}

/// One owned rectangle of pixel data
pub struct FrameBuffer {
    block: ArenaBlock,
    arena: ArenaKind,
    format: PixelFormat,
    width: u16,
    height: u16,
    x_start: u16,
    y_start: u16,
    len: usize,
    slot: u8,
    home: Option<&'static dyn Reclaim>,
}

impl FrameBuffer {
    /// Allocate `len` zeroed bytes from the arena for `kind`
    ///
    /// The storage is padded to [`FRAME_ALIGN`] and the arena is charged
    /// for the padded storage plus the frame header. When the board has no
    /// external RAM a PSRAM request is served from SRAM and the frame is
    /// tagged accordingly.
    pub fn create(arenas: &Arenas, kind: ArenaKind, len: usize) -> Result<Self, DisplayError> {
        if len == 0 {
            return Err(DisplayError::InvalidParameter);
        }
        let padded = len
            .checked_add(FRAME_ALIGN - 1)
            .ok_or(DisplayError::OutOfMemory)?
            & !(FRAME_ALIGN - 1);
        let arena = arenas.select(kind);
        let charge = padded + mem::size_of::<Self>();
        let block = ArenaBlock::alloc(arena, padded, charge)?;

        trace!("frame: {} bytes from {}", len, arena.kind());

        Ok(Self {
            block,
            arena: arena.kind(),
            format: PixelFormat::Rgb565,
            width: 0,
            height: 0,
            x_start: 0,
            y_start: 0,
            len,
            slot: 0,
            home: None,
        })
    }

    /// Allocate a frame sized for a `width` x `height` raster in `format`
    pub fn create_frame(
        arenas: &Arenas,
        kind: ArenaKind,
        format: PixelFormat,
        width: u16,
        height: u16,
    ) -> Result<Self, DisplayError> {
        let mut frame = Self::create(arenas, kind, format.frame_len(width, height))?;
        frame.format = format;
        frame.width = width;
        frame.height = height;
        Ok(frame)
    }

    /// Return storage to its arena, skipping any reclaim hook
    pub fn free(mut self) {
        self.home = None;
    }

    /// Attach the hook that receives this frame when it is dropped
    pub fn set_reclaim(&mut self, home: &'static dyn Reclaim) {
        self.home = Some(home);
    }

    /// A hook is attached
    pub fn is_pooled(&self) -> bool {
        self.home.is_some()
    }

    /// Move the frame's window to `(x, y)` on the panel
    pub fn set_origin(&mut self, x: u16, y: u16) {
        self.x_start = x;
        self.y_start = y;
    }

    pub(crate) fn set_slot(&mut self, slot: u8) {
        self.slot = slot;
    }

    /// Arena the storage was charged to
    pub fn arena(&self) -> ArenaKind {
        self.arena
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn x_start(&self) -> u16 {
        self.x_start
    }

    pub fn y_start(&self) -> u16 {
        self.y_start
    }

    /// Payload length in bytes, excluding alignment padding
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Position within the pool that provisioned it
    pub fn slot(&self) -> u8 {
        self.slot
    }

    /// Panel rectangle this frame covers
    ///
    /// Only meaningful for frames created with a geometry.
    pub fn window(&self) -> Area {
        Area::new(
            self.x_start,
            self.y_start,
            self.x_start.saturating_add(self.width).saturating_sub(1),
            self.y_start.saturating_add(self.height).saturating_sub(1),
        )
    }

    /// Pixel payload
    pub fn data(&self) -> &[u8] {
        &self.block.bytes()[..self.len]
    }

    /// Mutable pixel payload
    pub fn data_mut(&mut self) -> &mut [u8] {
        let len = self.len;
        &mut self.block.bytes_mut()[..len]
    }
}

impl Drop for FrameBuffer {
    fn drop(&mut self) {
        if let Some(home) = self.home.take() {
            let frame = FrameBuffer {
                block: mem::take(&mut self.block),
                arena: self.arena,
                format: self.format,
                width: self.width,
                height: self.height,
                x_start: self.x_start,
                y_start: self.y_start,
                len: self.len,
                slot: self.slot,
                home: None,
            };
            home.reclaim(frame);
        }
    }
}

impl fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("arena", &self.arena)
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("x_start", &self.x_start)
            .field("y_start", &self.y_start)
            .field("len", &self.len)
            .field("slot", &self.slot)
            .field("pooled", &self.home.is_some())
            .finish()
    }
}
