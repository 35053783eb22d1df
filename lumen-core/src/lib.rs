//! Board-agnostic core of the Lumen display stack
//!
//! This crate holds everything between a renderer and a panel bus that
//! does not depend on a particular chip:
//!
//! - Frame buffers, memory arenas and the frame pool
//! - Pixel format conversion and software rotation
//! - Panel init-sequence tables
//! - The device registry (open/close ordering, power, backlight)
//! - Bus contexts and the worker that serializes transfers per bus
//! - The renderer port (double/triple buffering, backpressure)
//! - Configuration types, optionally loaded from TOML
//!
//! Frames are owned values. A frame is moved from the pool to the renderer,
//! from the renderer to a bus queue, and dropped by the bus worker once
//! sent, which returns it to the pool.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

// This must go first so the logging macros are visible in every module
mod fmt;

pub mod buffer;
pub mod bus;
pub mod config;
pub mod error;
pub mod init_seq;
pub mod pixel;
pub mod port;
pub mod registry;
pub mod traits;

pub use buffer::{Area, Arenas, ArenaKind, FrameBuffer, FramePool, MemoryArena};
pub use bus::{AddressMode, BusContext, BusWorker, WorkerState};
pub use error::DisplayError;
pub use port::RendererPort;
pub use registry::Registry;
