//! Device registry
//!
//! Boards register every panel once at startup, by name, together with the
//! driver that runs it and a description of its power and backlight lines.
//! Applications then look panels up by name and go through the registry to
//! open, flush, dim and close them.
//!
//! Power and backlight lines are driven through the board's [`BoardIo`],
//! shared by all devices behind one async mutex.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use heapless::{String, Vec};
use lumen_hal::pwm::DUTY_MAX;
use lumen_hal::BoardIo;
use portable_atomic::{AtomicBool, Ordering};

use crate::buffer::FrameBuffer;
use crate::config::{BacklightConfig, DeviceConfig, DeviceInfo, PinConfig, MAX_NAME_LEN};
use crate::error::DisplayError;
use crate::traits::{BacklightHook, DisplayDriver};

/// Highest brightness level
pub const BRIGHTNESS_MAX: u8 = 100;

/// One registered panel
pub struct DisplayDevice<M: RawMutex, D> {
    name: String<MAX_NAME_LEN>,
    config: DeviceConfig,
    driver: D,
    open: AtomicBool,
    lifecycle: Mutex<M, ()>,
    custom_backlight: Option<&'static dyn BacklightHook>,
}

impl<M: RawMutex, D> DisplayDevice<M, D> {
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Geometry and format
    pub fn info(&self) -> DeviceInfo {
        self.config.info
    }

    pub fn backlight(&self) -> BacklightConfig {
        self.config.backlight
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// The driver behind this device
    pub fn driver(&self) -> &D {
        &self.driver
    }
}

/// All panels on a board
pub struct Registry<M: RawMutex, D, IO, const N: usize> {
    devices: Vec<DisplayDevice<M, D>, N>,
    io: Mutex<M, IO>,
}

impl<M: RawMutex, D: DisplayDriver, IO: BoardIo, const N: usize> Registry<M, D, IO, N> {
    /// Create an empty registry around the board's I/O
    pub const fn new(io: IO) -> Self {
        Self {
            devices: Vec::new(),
            io: Mutex::new(io),
        }
    }

    /// Add a panel
    pub fn register(&mut self, name: &str, driver: D, config: DeviceConfig) -> Result<(), DisplayError> {
        if name.is_empty() {
            return Err(DisplayError::InvalidParameter);
        }
        let name: String<MAX_NAME_LEN> = String::try_from(name).map_err(|_| DisplayError::InvalidParameter)?;
        if self.find(&name).is_some() {
            warn!("display {}: already registered", name.as_str());
            return Err(DisplayError::DuplicateName);
        }

        let device = DisplayDevice {
            name,
            config,
            driver,
            open: AtomicBool::new(false),
            lifecycle: Mutex::new(()),
            custom_backlight: None,
        };
        self.devices.push(device).map_err(|_| DisplayError::RegistryFull)?;

        info!(
            "display {}: registered {}x{}",
            self.devices[self.devices.len() - 1].name(),
            config.info.width,
            config.info.height
        );
        Ok(())
    }

    /// Look a panel up by name
    pub fn find(&self, name: &str) -> Option<&DisplayDevice<M, D>> {
        self.devices.iter().find(|device| device.name.as_str() == name)
    }

    /// Every registered panel
    pub fn devices(&self) -> impl Iterator<Item = &DisplayDevice<M, D>> {
        self.devices.iter()
    }

    /// Attach the hook that drives a `BacklightConfig::Custom` backlight
    pub fn register_custom_backlight(&mut self, name: &str, hook: &'static dyn BacklightHook) -> Result<(), DisplayError> {
        let device = self
            .devices
            .iter_mut()
            .find(|device| device.name.as_str() == name)
            .ok_or(DisplayError::NotFound)?;
        device.custom_backlight = Some(hook);
        Ok(())
    }

    /// Snapshot of a panel's geometry
    pub fn get_info(&self, device: &DisplayDevice<M, D>) -> DeviceInfo {
        device.info()
    }

    /// Run `f` with exclusive access to the board I/O
    pub async fn with_io<R>(&self, f: impl FnOnce(&mut IO) -> R) -> R {
        let mut io = self.io.lock().await;
        f(&mut io)
    }

    /// Power up and initialize a panel
    ///
    /// Opening an open panel does nothing. If the driver fails, the power
    /// and backlight lines are released again and the panel stays closed.
    pub async fn open(&self, device: &DisplayDevice<M, D>) -> Result<(), DisplayError> {
        let _guard = device.lifecycle.lock().await;
        if device.is_open() {
            return Ok(());
        }

        {
            let mut io = self.io.lock().await;
            if let Some(power) = device.config.power {
                io.gpio_init(power.pin, power.level(true)).map_err(|_| DisplayError::Io)?;
            }
            if let Err(e) = backlight_init(&mut *io, device.config.backlight) {
                power_off(&mut *io, device.config.power);
                return Err(e);
            }
        }

        if let Err(e) = device.driver.open().await {
            error!("display {}: open failed: {}", device.name(), e);
            let mut io = self.io.lock().await;
            backlight_deinit(&mut *io, device.config.backlight);
            power_off(&mut *io, device.config.power);
            return Err(e);
        }

        device.open.store(true, Ordering::Release);
        info!("display {}: open", device.name());
        Ok(())
    }

    /// Hand a frame to an open panel
    ///
    /// A closed panel refuses the frame, which goes straight back to its
    /// pool.
    pub async fn flush(&self, device: &DisplayDevice<M, D>, frame: FrameBuffer) -> Result<(), DisplayError> {
        if !device.is_open() {
            warn!("display {}: flush while closed", device.name());
            drop(frame);
            return Err(DisplayError::DeviceNotOpen);
        }
        device.driver.flush(frame).await
    }

    /// Shut a panel down
    ///
    /// Closing a closed panel does nothing. Power and backlight are released
    /// even when the driver reports an error, which is then returned.
    pub async fn close(&self, device: &DisplayDevice<M, D>) -> Result<(), DisplayError> {
        let _guard = device.lifecycle.lock().await;
        if !device.is_open() {
            return Ok(());
        }

        let result = device.driver.close().await;
        if let Err(e) = result {
            warn!("display {}: driver close failed: {}", device.name(), e);
        }

        {
            let mut io = self.io.lock().await;
            backlight_deinit(&mut *io, device.config.backlight);
            power_off(&mut *io, device.config.power);
        }

        device.open.store(false, Ordering::Release);
        info!("display {}: closed", device.name());
        result
    }

    /// Set backlight brightness, `0..=100`
    ///
    /// Larger levels are clamped. A GPIO backlight is on for any non-zero
    /// level. A PWM backlight maps the level onto the duty cycle and stops
    /// at zero.
    pub async fn set_brightness(&self, device: &DisplayDevice<M, D>, level: u8) -> Result<(), DisplayError> {
        let level = level.min(BRIGHTNESS_MAX);
        let _guard = device.lifecycle.lock().await;

        match device.config.backlight {
            BacklightConfig::None => {
                debug!("display {}: no backlight to set", device.name());
                Ok(())
            }
            BacklightConfig::Gpio(pin) => {
                let mut io = self.io.lock().await;
                io.gpio_write(pin.pin, pin.level(level > 0)).map_err(|_| DisplayError::Io)
            }
            BacklightConfig::Pwm(pwm) => {
                let mut io = self.io.lock().await;
                if level == 0 {
                    io.pwm_stop(pwm.channel).map_err(|_| DisplayError::Io)
                } else {
                    let duty = level as u16 * (DUTY_MAX / BRIGHTNESS_MAX as u16);
                    io.pwm_set_duty(pwm.channel, duty).map_err(|_| DisplayError::Io)?;
                    io.pwm_start(pwm.channel).map_err(|_| DisplayError::Io)
                }
            }
            BacklightConfig::Custom => match device.custom_backlight {
                Some(hook) => hook.set_brightness(level),
                None => {
                    warn!("display {}: no custom backlight hook", device.name());
                    Err(DisplayError::Unsupported)
                }
            },
        }
    }
}

fn backlight_init<IO: BoardIo>(io: &mut IO, backlight: BacklightConfig) -> Result<(), DisplayError> {
    let result = match backlight {
        BacklightConfig::Gpio(pin) => io.gpio_init(pin.pin, pin.level(false)),
        BacklightConfig::Pwm(pwm) => io.pwm_init(pwm.channel, pwm.frequency, pwm.inverted),
        BacklightConfig::None | BacklightConfig::Custom => Ok(()),
    };
    result.map_err(|_| DisplayError::Io)
}

fn backlight_deinit<IO: BoardIo>(io: &mut IO, backlight: BacklightConfig) {
    let result = match backlight {
        BacklightConfig::Gpio(pin) => io
            .gpio_write(pin.pin, pin.level(false))
            .and_then(|_| io.gpio_deinit(pin.pin)),
        BacklightConfig::Pwm(pwm) => io.pwm_stop(pwm.channel).and_then(|_| io.pwm_deinit(pwm.channel)),
        BacklightConfig::None | BacklightConfig::Custom => Ok(()),
    };
    if result.is_err() {
        warn!("backlight release failed");
    }
}

fn power_off<IO: BoardIo>(io: &mut IO, power: Option<PinConfig>) {
    if let Some(pin) = power {
        let result = io.gpio_write(pin.pin, pin.level(false)).and_then(|_| io.gpio_deinit(pin.pin));
        if result.is_err() {
            warn!("power pin {} release failed", pin.pin);
        }
    }
}
