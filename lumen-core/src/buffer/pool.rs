//! Frame pool
//!
//! A fixed set of frames provisioned once and then cycled: the renderer
//! acquires one, fills it, hands it to a bus worker, and the frame finds
//! its way back here when the worker drops it. `acquire` is where the
//! renderer waits when every frame is still on a bus.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use portable_atomic::{AtomicU32, AtomicUsize, Ordering};

use super::arena::{ArenaKind, Arenas};
use super::frame::{FrameBuffer, Reclaim};
use crate::error::DisplayError;
use crate::pixel::PixelFormat;

/// Counters for one pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PoolStats {
    /// Frames provisioned and not yet torn down
    pub capacity: usize,
    /// Frames sitting in the free list
    pub available: usize,
    /// Successful acquisitions since creation
    pub acquired: u32,
    /// Frames returned through the reclaim hook since creation
    pub released: u32,
}

/// Free list of up to `N` frames
pub struct FramePool<M: RawMutex, const N: usize> {
    free: Channel<M, FrameBuffer, N>,
    provisioned: AtomicUsize,
    acquired: AtomicU32,
    released: AtomicU32,
}

impl<M: RawMutex, const N: usize> FramePool<M, N> {
    /// Create an empty pool
    pub const fn new() -> Self {
        Self {
            free: Channel::new(),
            provisioned: AtomicUsize::new(0),
            acquired: AtomicU32::new(0),
            released: AtomicU32::new(0),
        }
    }

    /// Allocate `count` frames of `width` x `height` in `format`
    ///
    /// Frames already allocated stay in the pool if a later allocation
    /// fails.
    pub fn provision(
        &self,
        arenas: &Arenas,
        kind: ArenaKind,
        format: PixelFormat,
        width: u16,
        height: u16,
        count: usize,
    ) -> Result<(), DisplayError> {
        let start = self.provisioned.load(Ordering::Acquire);
        if count == 0 || start + count > N {
            return Err(DisplayError::InvalidParameter);
        }

        for slot in start..start + count {
            let mut frame = FrameBuffer::create_frame(arenas, kind, format, width, height)?;
            frame.set_slot(slot as u8);
            if self.free.try_send(frame).is_err() {
                return Err(DisplayError::InvalidParameter);
            }
            self.provisioned.fetch_add(1, Ordering::AcqRel);
        }

        debug!("pool: provisioned {} frames of {}x{}", count, width, height);
        Ok(())
    }

    /// Frames waiting in the free list
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Frames provisioned
    pub fn capacity(&self) -> usize {
        self.provisioned.load(Ordering::Acquire)
    }

    /// Current counters
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            capacity: self.capacity(),
            available: self.available(),
            acquired: self.acquired.load(Ordering::Acquire),
            released: self.released.load(Ordering::Acquire),
        }
    }
}

impl<M: RawMutex + Sync + 'static, const N: usize> FramePool<M, N> {
    /// Take a frame, waiting until one comes back if none is free
    pub async fn acquire(&'static self) -> FrameBuffer {
        let frame = self.free.receive().await;
        self.checkout(frame)
    }

    /// Take a frame if one is free
    pub fn try_acquire(&'static self) -> Option<FrameBuffer> {
        self.free.try_receive().ok().map(|frame| self.checkout(frame))
    }

    fn checkout(&'static self, mut frame: FrameBuffer) -> FrameBuffer {
        frame.set_reclaim(self);
        self.acquired.fetch_add(1, Ordering::AcqRel);
        frame
    }

    /// Wait for every provisioned frame to come home and free it
    ///
    /// Frames the caller still holds must be dropped first.
    pub async fn teardown(&self) -> usize {
        let mut freed = 0;
        while self.provisioned.load(Ordering::Acquire) > 0 {
            let frame = self.free.receive().await;
            frame.free();
            self.provisioned.fetch_sub(1, Ordering::AcqRel);
            freed += 1;
        }
        debug!("pool: freed {} frames", freed);
        freed
    }
}

impl<M: RawMutex, const N: usize> Default for FramePool<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex + Sync + 'static, const N: usize> Reclaim for FramePool<M, N> {
    fn reclaim(&self, frame: FrameBuffer) {
        self.released.fetch_add(1, Ordering::AcqRel);
        if let Err(TrySendError::Full(frame)) = self.free.try_send(frame) {
            error!("pool: free list full, dropping slot {}", frame.slot());
            self.provisioned.fetch_sub(1, Ordering::AcqRel);
            frame.free();
        }
    }
}
