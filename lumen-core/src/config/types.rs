//! Configuration type definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::buffer::ArenaKind;
use crate::pixel::PixelFormat;

/// Maximum device name length in bytes
pub const MAX_NAME_LEN: usize = 32;

/// Default per-transfer timeout
pub const DEFAULT_TRANSFER_TIMEOUT_MS: u32 = 100;

/// Default monochrome threshold: RGB565 values at or above it are white
pub const DEFAULT_MONO_THRESHOLD: u16 = 0x9000;

/// Physical bus family of a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DisplayType {
    /// Parallel RGB with a continuously refreshed frame
    Rgb,
    /// Intel 8080 parallel
    Mcu8080,
    /// Quad-SPI
    Qspi,
    /// 4-wire SPI
    #[default]
    Spi,
    /// I2C (small OLEDs)
    I2c,
}

/// Panel rotation, clockwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u16", into = "u16"))]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Rotation in degrees
    pub const fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Whether width and height trade places
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

impl TryFrom<u16> for Rotation {
    type Error = &'static str;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            _ => Err("rotation must be 0, 90, 180 or 270"),
        }
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// Electrical level that means "on"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ActiveLevel {
    Low,
    #[default]
    High,
}

/// A board pin with its active level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// Board pin number
    pub pin: u8,
    /// Level that enables the function
    #[cfg_attr(feature = "serde", serde(default))]
    pub active_level: ActiveLevel,
}

impl PinConfig {
    /// Active-high pin
    pub const fn active_high(pin: u8) -> Self {
        Self {
            pin,
            active_level: ActiveLevel::High,
        }
    }

    /// Active-low pin
    pub const fn active_low(pin: u8) -> Self {
        Self {
            pin,
            active_level: ActiveLevel::Low,
        }
    }

    /// Pin level for the given logical state
    pub const fn level(&self, on: bool) -> bool {
        match self.active_level {
            ActiveLevel::High => on,
            ActiveLevel::Low => !on,
        }
    }
}

/// PWM backlight channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PwmConfig {
    /// Board PWM channel
    pub channel: u8,
    /// Output frequency in Hz
    #[cfg_attr(feature = "serde", serde(default = "default_pwm_frequency"))]
    pub frequency: u32,
    /// Output is active low
    #[cfg_attr(feature = "serde", serde(default))]
    pub inverted: bool,
}

#[cfg(feature = "serde")]
fn default_pwm_frequency() -> u32 {
    10_000
}

/// How the backlight is driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BacklightConfig {
    /// No controllable backlight (OLED, always-on)
    #[default]
    None,
    /// On/off through a GPIO
    Gpio(PinConfig),
    /// Dimmable through PWM
    Pwm(PwmConfig),
    /// Board-provided hook, see `Registry::register_custom_backlight`
    Custom,
}

/// When a bus worker sends pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RefreshMode {
    /// Send each submitted frame once, then release it
    #[default]
    OnDemand,
    /// Keep the last frame and resend it whenever no new frame arrives
    /// within `period_ms` (panels without their own frame memory)
    Periodic { period_ms: u32 },
}

impl RefreshMode {
    /// Frames the bus worker keeps out of the pool while idle
    pub const fn retained_frames(&self) -> usize {
        match self {
            Self::OnDemand => 0,
            Self::Periodic { .. } => 1,
        }
    }
}

/// What a worker does when a transfer misses its deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TimeoutPolicy {
    /// Log it and fail the next flush on that bus with `BusTimeout`
    #[default]
    Report,
    /// Log it and carry on
    BestEffort,
}

/// Bus worker settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BusConfig {
    /// Deadline for each DMA transfer
    pub transfer_timeout_ms: u32,
    /// Refresh behaviour
    pub refresh: RefreshMode,
    /// Timeout handling
    pub timeout_policy: TimeoutPolicy,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            transfer_timeout_ms: DEFAULT_TRANSFER_TIMEOUT_MS,
            refresh: RefreshMode::OnDemand,
            timeout_policy: TimeoutPolicy::Report,
        }
    }
}

/// Renderer port settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PortConfig {
    /// Renderer draws into two partial buffers
    pub dual_buffer: bool,
    /// Explicit frame count, overriding the VRAM-based default
    pub buffer_count: Option<u8>,
    /// Preferred arena for frame storage
    pub arena: ArenaKind,
    /// RGB565 threshold for monochrome panels
    pub mono_threshold: u16,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            dual_buffer: false,
            buffer_count: None,
            arena: ArenaKind::Psram,
            mono_threshold: DEFAULT_MONO_THRESHOLD,
        }
    }
}

impl PortConfig {
    /// Number of frames to provision for a panel
    ///
    /// Panels with their own frame memory get two frames, others three so
    /// one can stay on the bus while two rotate through the renderer. A
    /// dual-buffered renderer adds one more.
    pub fn frame_count(&self, has_vram: bool) -> usize {
        if let Some(count) = self.buffer_count {
            return count as usize;
        }
        let base = if has_vram { 2 } else { 3 };
        base + self.dual_buffer as usize
    }

    /// Smallest frame count a renderer can present with
    ///
    /// One frame is current and one is being filled; frames a worker
    /// retains for periodic refresh come on top.
    pub const fn min_frames(retained: usize) -> usize {
        if retained == 0 {
            1
        } else {
            retained + 2
        }
    }
}

/// Snapshot of a registered panel's geometry and format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceInfo {
    /// Bus family
    pub display_type: DisplayType,
    /// Native width in pixels
    pub width: u16,
    /// Native height in pixels
    pub height: u16,
    /// Panel pixel format
    pub format: PixelFormat,
    /// Mounting rotation
    pub rotation: Rotation,
    /// Panel expects RGB565 with bytes swapped
    pub swap: bool,
    /// Panel keeps its own frame memory
    pub has_vram: bool,
}

impl DeviceInfo {
    /// Size as seen by the renderer, after rotation
    pub const fn logical_size(&self) -> (u16, u16) {
        if self.rotation.swaps_axes() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }

    /// Bytes in one full frame
    pub fn frame_len(&self) -> usize {
        self.format.frame_len(self.width, self.height)
    }
}

/// Everything the registry stores about a device besides its driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    /// Geometry and format
    pub info: DeviceInfo,
    /// Backlight control
    pub backlight: BacklightConfig,
    /// Optional power enable pin
    pub power: Option<PinConfig>,
}
