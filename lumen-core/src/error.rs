//! Error type shared by every display operation

/// Errors returned by the display stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Argument out of range or inconsistent with the target
    InvalidParameter,
    /// Arena budget or heap exhausted
    OutOfMemory,
    /// No device registered under that name
    NotFound,
    /// Operation requires an open device
    DeviceNotOpen,
    /// A bus transfer did not complete in time
    BusTimeout,
    /// The device has no way to perform the operation
    Unsupported,
    /// A device with that name is already registered
    DuplicateName,
    /// No free registry slot
    RegistryFull,
    /// Malformed init sequence
    InvalidSequence,
    /// The bus transport reported an error
    Bus,
    /// The bus has been shut down
    BusClosed,
    /// Board GPIO or PWM access failed
    Io,
}

impl core::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Self::InvalidParameter => "invalid parameter",
            Self::OutOfMemory => "out of memory",
            Self::NotFound => "device not found",
            Self::DeviceNotOpen => "device not open",
            Self::BusTimeout => "bus transfer timed out",
            Self::Unsupported => "unsupported",
            Self::DuplicateName => "duplicate device name",
            Self::RegistryFull => "registry full",
            Self::InvalidSequence => "invalid init sequence",
            Self::Bus => "bus error",
            Self::BusClosed => "bus closed",
            Self::Io => "board I/O error",
        };
        f.write_str(msg)
    }
}
