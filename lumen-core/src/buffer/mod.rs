//! Frame storage
//!
//! - [`MemoryArena`] - byte budget for one memory region
//! - [`FrameBuffer`] - one owned rectangle of pixels
//! - [`FramePool`] - fixed set of frames cycling between renderer and bus

pub mod arena;
pub mod frame;
pub mod pool;

pub use arena::{ArenaKind, Arenas, MemoryArena};
pub use frame::{Area, FrameBuffer, Reclaim, FRAME_ALIGN};
pub use pool::{FramePool, PoolStats};
