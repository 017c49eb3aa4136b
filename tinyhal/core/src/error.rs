//! Common error types for HAL operations

use core::fmt;

/// HAL operation errors
///
/// Only configuration and externally composed timeouts can fail. The data
/// path (buffer adds, byte reads and writes, clock reads) is total and
/// never returns an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// Invalid parameter provided
    InvalidParameter,
    /// Requested baud rate cannot be produced from the CPU clock
    BaudRateOutOfRange(u32),
    /// Timer prescaler is not one the hardware supports
    UnsupportedPrescaler(u16),
    /// Timer configuration cannot be reduced to a millisecond rate
    ConfigurationError,
    /// Deadline expired before the operation completed
    Timeout,
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter => write!(f, "invalid parameter"),
            Self::BaudRateOutOfRange(baud) => write!(f, "baud rate {} out of range", baud),
            Self::UnsupportedPrescaler(p) => write!(f, "unsupported timer prescaler {}", p),
            Self::ConfigurationError => write!(f, "configuration error"),
            Self::Timeout => write!(f, "operation timeout"),
        }
    }
}

impl From<core::convert::Infallible> for HalError {
    fn from(never: core::convert::Infallible) -> Self {
        match never {}
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

#[cfg(feature = "defmt")]
impl defmt::Format for HalError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InvalidParameter => defmt::write!(fmt, "InvalidParameter"),
            Self::BaudRateOutOfRange(baud) => defmt::write!(fmt, "BaudRateOutOfRange({})", baud),
            Self::UnsupportedPrescaler(p) => defmt::write!(fmt, "UnsupportedPrescaler({})", p),
            Self::ConfigurationError => defmt::write!(fmt, "ConfigurationError"),
            Self::Timeout => defmt::write!(fmt, "Timeout"),
        }
    }
}

/// Result type for HAL operations
pub type HalResult<T> = Result<T, HalError>;

#[cfg(test)]
mod tests {
    use super::*;

    extern crate std;
    use std::string::ToString;

    #[test]
    fn test_display() {
        assert_eq!(HalError::Timeout.to_string(), "operation timeout");
        assert_eq!(
            HalError::BaudRateOutOfRange(3).to_string(),
            "baud rate 3 out of range"
        );
    }
}
