//! Errors reported by the driver.
//!
//! [`DeviceError`] is generic over the error type of the underlying bus, so
//! I2C and SPI failures reach the caller untouched.

use core::fmt;

/// Every way a reading or a calibration load can fail.
///
/// Nothing is retried by the driver. Recovering (reset, reinitialize) is up to
/// the caller.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError<E> {
    /// The bus transaction failed.
    ///
    /// Usually the device is absent, disconnected or strapped to the other address.
    Io(E),
    /// The device delivered a different number of bytes than the command requires.
    ByteCount { expected: usize, received: usize },
    /// The PROM coefficients have not been loaded since the last reset.
    Uncalibrated,
    /// The CRC-4 stored in PROM word 7 does not match the PROM contents.
    InvalidCrc { expected: u8, computed: u8 },
}

impl<E> DeviceError<E> {
    /// `true` for failures of the transport itself, as opposed to usage or data errors.
    pub fn is_transport(&self) -> bool {
        matches!(self, DeviceError::Io(_) | DeviceError::ByteCount { .. })
    }
}

impl<E> From<E> for DeviceError<E> {
    fn from(e: E) -> Self {
        DeviceError::Io(e)
    }
}

impl<E: fmt::Debug> fmt::Display for DeviceError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::Io(e) => write!(f, "bus error: {:?}", e),
            DeviceError::ByteCount { expected, received } => write!(
                f,
                "expected {} bytes from the device, received {}",
                expected, received
            ),
            DeviceError::Uncalibrated => f.write_str("calibration coefficients not loaded"),
            DeviceError::InvalidCrc { expected, computed } => write!(
                f,
                "PROM CRC mismatch: stored {:#x}, computed {:#x}",
                expected, computed
            ),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for DeviceError<E> {}
