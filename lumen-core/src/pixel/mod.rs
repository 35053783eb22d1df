//! Pixel format and rotation adapter
//!
//! Turns renderer rectangles (RGB565 or RGB888) into the panel's native
//! layout inside a frame buffer.

pub mod blit;
pub mod format;
pub mod rotate;

pub use blit::{Blitter, CopyJob, CpuBlitter};
pub use format::{mono_pixel, mono_to_pages, swap_rgb565, swap_rgb565_area, write_area, AdaptOptions, PixelFormat};
pub use rotate::{rotate_area, rotate_pixels, rotated_size};
