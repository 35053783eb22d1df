//! PWM abstractions
//!
//! Used for dimmable backlights.

/// Full-scale duty value. Duties are expressed in hundredths of a percent.
pub const DUTY_MAX: u16 = 10_000;

/// A single PWM output channel
pub trait PwmChannel {
    /// Error type for PWM operations
    type Error;

    /// Set the duty cycle, `0..=DUTY_MAX`
    fn set_duty(&mut self, duty: u16) -> Result<(), Self::Error>;

    /// Start generating the waveform
    fn enable(&mut self) -> Result<(), Self::Error>;

    /// Stop the waveform and park the output at its idle level
    fn disable(&mut self) -> Result<(), Self::Error>;
}

/// PWM channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmConfig {
    /// Output frequency in Hz
    pub frequency: u32,
    /// Invert the output so that duty counts low time
    pub inverted: bool,
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            frequency: 10_000,
            inverted: false,
        }
    }
}
