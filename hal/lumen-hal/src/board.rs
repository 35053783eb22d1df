//! Board-level I/O
//!
//! Power enables and backlights are described by pin and channel numbers in
//! the board's display configuration. The registry drives them through this
//! trait so it never needs typed pin handles.

/// Pin-number based GPIO and PWM access
pub trait BoardIo {
    /// Error type for board I/O operations
    type Error;

    /// Configure `pin` as a push-pull output at the given level
    fn gpio_init(&mut self, pin: u8, high: bool) -> Result<(), Self::Error>;

    /// Drive `pin` to the given level
    fn gpio_write(&mut self, pin: u8, high: bool) -> Result<(), Self::Error>;

    /// Release `pin` back to its reset state
    fn gpio_deinit(&mut self, pin: u8) -> Result<(), Self::Error>;

    /// Configure a PWM channel
    fn pwm_init(&mut self, channel: u8, frequency: u32, inverted: bool) -> Result<(), Self::Error>;

    /// Set a channel's duty, `0..=pwm::DUTY_MAX`
    ///
    /// [`pwm::DUTY_MAX`]: crate::pwm::DUTY_MAX
    fn pwm_set_duty(&mut self, channel: u8, duty: u16) -> Result<(), Self::Error>;

    /// Start a configured channel
    fn pwm_start(&mut self, channel: u8) -> Result<(), Self::Error>;

    /// Stop a running channel
    fn pwm_stop(&mut self, channel: u8) -> Result<(), Self::Error>;

    /// Release a channel
    fn pwm_deinit(&mut self, channel: u8) -> Result<(), Self::Error>;
}
