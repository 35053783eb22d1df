//! Board display description
//!
//! One [`DisplayConfig`] describes one panel. Boards usually embed it as a
//! TOML document:
//!
//! ```toml
//! name = "display"
//! type = "spi"
//! width = 240
//! height = 320
//! format = "rgb565"
//! rotation = 90
//! swap = true
//!
//! [backlight]
//! pwm = { channel = 0, frequency = 10000 }
//!
//! [power]
//! pin = 4
//! active_level = "high"
//!
//! [bus]
//! transfer_timeout_ms = 100
//! refresh = "on_demand"
//! ```

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::types::*;
use crate::error::DisplayError;
use crate::pixel::PixelFormat;

/// Complete description of one panel
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    /// Registry name
    pub name: String<MAX_NAME_LEN>,
    /// Bus family
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub display_type: DisplayType,
    /// Native width in pixels
    pub width: u16,
    /// Native height in pixels
    pub height: u16,
    /// Panel pixel format
    pub format: PixelFormat,
    /// Mounting rotation in degrees
    #[cfg_attr(feature = "serde", serde(default))]
    pub rotation: Rotation,
    /// Swap RGB565 bytes before sending
    #[cfg_attr(feature = "serde", serde(default))]
    pub swap: bool,
    /// Panel keeps its own frame memory
    #[cfg_attr(feature = "serde", serde(default = "default_vram"))]
    pub vram: bool,
    /// Backlight control
    #[cfg_attr(feature = "serde", serde(default))]
    pub backlight: BacklightConfig,
    /// Optional power enable pin
    #[cfg_attr(feature = "serde", serde(default))]
    pub power: Option<PinConfig>,
    /// Bus worker settings
    #[cfg_attr(feature = "serde", serde(default))]
    pub bus: BusConfig,
    /// Renderer port settings
    #[cfg_attr(feature = "serde", serde(default))]
    pub port: PortConfig,
}

#[cfg(feature = "serde")]
fn default_vram() -> bool {
    true
}

impl DisplayConfig {
    /// Create a description with default bus and port settings
    pub fn new(name: &str, display_type: DisplayType, width: u16, height: u16, format: PixelFormat) -> Result<Self, DisplayError> {
        let name = String::try_from(name).map_err(|_| DisplayError::InvalidParameter)?;
        Ok(Self {
            name,
            display_type,
            width,
            height,
            format,
            rotation: Rotation::Deg0,
            swap: false,
            vram: true,
            backlight: BacklightConfig::None,
            power: None,
            bus: BusConfig::default(),
            port: PortConfig::default(),
        })
    }

    /// Parse and validate a TOML description
    #[cfg(feature = "toml")]
    pub fn from_toml(input: &str) -> Result<Self, DisplayError> {
        let config: Self = toml::from_str(input).map_err(|_| {
            error!("display config: TOML parse failed");
            DisplayError::InvalidParameter
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values a parser cannot
    pub fn validate(&self) -> Result<(), DisplayError> {
        if self.name.is_empty() {
            error!("display config: empty name");
            return Err(DisplayError::InvalidParameter);
        }
        if self.width == 0 || self.height == 0 {
            error!("display config: zero size {}x{}", self.width, self.height);
            return Err(DisplayError::InvalidParameter);
        }
        if self.bus.transfer_timeout_ms == 0 {
            error!("display config: zero transfer timeout");
            return Err(DisplayError::InvalidParameter);
        }
        if let RefreshMode::Periodic { period_ms: 0 } = self.bus.refresh {
            error!("display config: zero refresh period");
            return Err(DisplayError::InvalidParameter);
        }
        if let RefreshMode::Periodic { .. } = self.bus.refresh {
            if self.vram {
                error!("display config: periodic refresh on a panel with its own frame memory");
                return Err(DisplayError::InvalidParameter);
            }
            let frames = self.port.frame_count(self.vram);
            if frames < PortConfig::min_frames(self.bus.refresh.retained_frames()) {
                error!("display config: periodic refresh needs 3 frames, got {}", frames);
                return Err(DisplayError::InvalidParameter);
            }
        }
        if self.port.buffer_count == Some(0) {
            error!("display config: zero frame buffers");
            return Err(DisplayError::InvalidParameter);
        }
        Ok(())
    }

    /// Geometry snapshot for the registry
    pub fn info(&self) -> DeviceInfo {
        DeviceInfo {
            display_type: self.display_type,
            width: self.width,
            height: self.height,
            format: self.format,
            rotation: self.rotation,
            swap: self.swap,
            has_vram: self.vram,
        }
    }

    /// Registry entry for this panel
    pub fn device_config(&self) -> DeviceConfig {
        DeviceConfig {
            info: self.info(),
            backlight: self.backlight,
            power: self.power,
        }
    }
}

#[cfg(all(test, feature = "toml"))]
mod tests {
    use super::*;

    const SPI_PANEL: &str = r#"
name = "display"
type = "spi"
width = 240
height = 320
format = "rgb565"
rotation = 90
swap = true
vram = false

[backlight]
pwm = { channel = 2 }

[power]
pin = 4
active_level = "low"

[bus]
transfer_timeout_ms = 50
refresh = { periodic = { period_ms = 15 } }
timeout_policy = "best_effort"

[port]
dual_buffer = true
arena = "sram"
"#;

    #[test]
    fn test_parse_full_description() {
        let config = DisplayConfig::from_toml(SPI_PANEL).unwrap();
        assert_eq!(config.name.as_str(), "display");
        assert_eq!(config.display_type, DisplayType::Spi);
        assert_eq!(config.rotation, Rotation::Deg90);
        assert!(config.swap);
        assert!(!config.vram);
        assert_eq!(
            config.backlight,
            BacklightConfig::Pwm(PwmConfig {
                channel: 2,
                frequency: 10_000,
                inverted: false,
            })
        );
        assert_eq!(config.power, Some(PinConfig::active_low(4)));
        assert_eq!(config.bus.transfer_timeout_ms, 50);
        assert_eq!(config.bus.refresh, RefreshMode::Periodic { period_ms: 15 });
        assert_eq!(config.bus.timeout_policy, TimeoutPolicy::BestEffort);
        assert!(config.port.dual_buffer);
        assert_eq!(config.port.arena, crate::buffer::ArenaKind::Sram);
    }

    #[test]
    fn test_defaults_for_minimal_description() {
        let config = DisplayConfig::from_toml(
            "name = \"oled\"\ntype = \"i2c\"\nwidth = 128\nheight = 64\nformat = \"monochrome\"\n",
        )
        .unwrap();
        assert_eq!(config.backlight, BacklightConfig::None);
        assert_eq!(config.power, None);
        assert_eq!(config.bus, BusConfig::default());
        assert_eq!(config.port, PortConfig::default());
        assert_eq!(config.info().frame_len(), 16 * 64);
    }

    #[test]
    fn test_rejects_bad_rotation() {
        let result = DisplayConfig::from_toml(
            "name = \"d\"\ntype = \"spi\"\nwidth = 1\nheight = 1\nformat = \"rgb565\"\nrotation = 45\n",
        );
        assert_eq!(result, Err(DisplayError::InvalidParameter));
    }

    #[test]
    fn test_rejects_periodic_refresh_with_vram() {
        // vram defaults to true
        let result = DisplayConfig::from_toml(
            "name = \"d\"\ntype = \"rgb\"\nwidth = 8\nheight = 8\nformat = \"rgb565\"\n\n[bus]\nrefresh = { periodic = { period_ms = 16 } }\n",
        );
        assert_eq!(result, Err(DisplayError::InvalidParameter));
    }

    #[test]
    fn test_rejects_periodic_refresh_with_two_frames() {
        let mut config = DisplayConfig::new("d", DisplayType::Rgb, 8, 8, PixelFormat::Rgb565).unwrap();
        config.vram = false;
        config.bus.refresh = RefreshMode::Periodic { period_ms: 16 };
        assert_eq!(config.validate(), Ok(()));

        config.port.buffer_count = Some(2);
        assert_eq!(config.validate(), Err(DisplayError::InvalidParameter));
    }

    #[test]
    fn test_rejects_zero_size() {
        let result = DisplayConfig::from_toml(
            "name = \"d\"\ntype = \"spi\"\nwidth = 0\nheight = 10\nformat = \"rgb565\"\n",
        );
        assert_eq!(result, Err(DisplayError::InvalidParameter));
    }

    #[test]
    fn test_new_rejects_long_name() {
        let name = "a-name-that-is-definitely-longer-than-32-bytes";
        assert_eq!(
            DisplayConfig::new(name, DisplayType::Spi, 1, 1, PixelFormat::Rgb565),
            Err(DisplayError::InvalidParameter)
        );
    }
}
