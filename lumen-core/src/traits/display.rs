//! Display driver capability set

use crate::buffer::FrameBuffer;
use crate::error::DisplayError;

/// Lifecycle and flush for one panel
///
/// The registry serializes `open` and `close` per device. `flush` takes
/// ownership of the frame; implementations queue it or drop it, and either
/// way it ends up back in its pool. Boards with several panel types wrap
/// their drivers in an enum that implements this trait.
#[allow(async_fn_in_trait)]
pub trait DisplayDriver {
    /// Reset and initialize the panel
    async fn open(&self) -> Result<(), DisplayError>;

    /// Hand a frame to the panel's bus
    async fn flush(&self, frame: FrameBuffer) -> Result<(), DisplayError>;

    /// Put the panel to sleep
    async fn close(&self) -> Result<(), DisplayError>;

    /// Frames the driver keeps after flushing, e.g. for periodic refresh
    fn retained_frames(&self) -> usize {
        0
    }
}

/// Board-specific backlight control
pub trait BacklightHook: Sync {
    /// Apply a brightness level, `0..=100`
    fn set_brightness(&self, level: u8) -> Result<(), DisplayError>;
}
