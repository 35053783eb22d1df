//! Memory arenas
//!
//! Frame storage comes from the global allocator, but each frame is charged
//! against the budget of the region it is meant to live in. A board with
//! external PSRAM routes its allocator there and sizes the PSRAM arena to
//! match; boards without PSRAM only configure the SRAM arena.

use alloc::vec::Vec;

use portable_atomic::{AtomicUsize, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::DisplayError;

/// Memory region a frame lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ArenaKind {
    /// Fast on-chip RAM
    Sram,
    /// External pseudo-static RAM
    #[default]
    Psram,
}

/// Byte budget for one memory region
#[derive(Debug)]
pub struct MemoryArena {
    kind: ArenaKind,
    capacity: usize,
    used: AtomicUsize,
}

impl MemoryArena {
    /// Create an arena with `capacity` bytes
    pub const fn new(kind: ArenaKind, capacity: usize) -> Self {
        Self {
            kind,
            capacity,
            used: AtomicUsize::new(0),
        }
    }

    /// Region this arena accounts for
    pub fn kind(&self) -> ArenaKind {
        self.kind
    }

    /// Total budget in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes currently charged
    pub fn used(&self) -> usize {
        self.used.load(Ordering::Acquire)
    }

    /// Bytes still available
    pub fn available(&self) -> usize {
        self.capacity.saturating_sub(self.used())
    }

    fn charge(&self, bytes: usize) -> Result<(), DisplayError> {
        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(bytes).filter(|&total| total <= self.capacity)
            })
            .map(|_| ())
            .map_err(|_| DisplayError::OutOfMemory)
    }

    fn refund(&self, bytes: usize) {
        self.used.fetch_sub(bytes, Ordering::AcqRel);
    }
}

/// The arenas a board provides
#[derive(Debug, Clone, Copy)]
pub struct Arenas {
    sram: &'static MemoryArena,
    psram: Option<&'static MemoryArena>,
}

impl Arenas {
    /// Board with on-chip RAM only
    pub const fn new(sram: &'static MemoryArena) -> Self {
        Self { sram, psram: None }
    }

    /// Add an external RAM arena
    pub const fn with_psram(mut self, psram: &'static MemoryArena) -> Self {
        self.psram = Some(psram);
        self
    }

    /// Arena to allocate from for `kind`, falling back to SRAM
    pub fn select(&self, kind: ArenaKind) -> &'static MemoryArena {
        match (kind, self.psram) {
            (ArenaKind::Psram, Some(psram)) => psram,
            _ => self.sram,
        }
    }
}

/// Heap storage whose size is charged to an arena until dropped
#[derive(Debug, Default)]
pub(crate) struct ArenaBlock {
    bytes: Vec<u8>,
    charge: usize,
    arena: Option<&'static MemoryArena>,
}

impl ArenaBlock {
    /// Allocate `len` zeroed bytes, charging `charge` bytes to `arena`
    pub(crate) fn alloc(arena: &'static MemoryArena, len: usize, charge: usize) -> Result<Self, DisplayError> {
        arena.charge(charge)?;

        let mut bytes = Vec::new();
        if bytes.try_reserve_exact(len).is_err() {
            arena.refund(charge);
            return Err(DisplayError::OutOfMemory);
        }
        bytes.resize(len, 0);

        Ok(Self {
            bytes,
            charge,
            arena: Some(arena),
        })
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl Drop for ArenaBlock {
    fn drop(&mut self) {
        if let Some(arena) = self.arena.take() {
            arena.refund(self.charge);
        }
    }
}
