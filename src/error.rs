//! Error types for DAC/DDS command construction and transport.

use thiserror::Error;

/// Result type alias for driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;

/// Error types for building, framing, parsing and sending device commands.
#[derive(Error, Debug)]
pub enum DriverError {
    /// Serial port communication error
    #[error("Serial port error: {0}")]
    SerialPort(#[from] serialport::Error),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested value lies outside the legal range for the current mode
    #[error("{quantity} out of range: {value} not in [{min}, {max}]")]
    OutOfRange {
        /// Physical quantity being encoded
        quantity: &'static str,
        /// Requested value
        value: f64,
        /// Lower bound (inclusive)
        min: f64,
        /// Upper bound (inclusive)
        max: f64,
    },

    /// Ramp bounds or steps cannot be reached in whole steps
    #[error(
        "Invalid ramp bounds: start {start}, stop {stop}, decrement {decrement}, increment {increment}"
    )]
    InvalidRampBounds {
        start: f64,
        stop: f64,
        decrement: f64,
        increment: f64,
    },

    /// Malformed, truncated or unterminated byte sequence
    #[error("Framing error: {0}")]
    Framing(String),

    /// Gain wire code or multiplier not recognized
    #[error("Unsupported gain mode: {0:?}")]
    UnsupportedGainMode(char),

    /// Ramp parameter code not recognized
    #[error("Unsupported ramp parameter: {0:?}")]
    UnsupportedParameter(char),

    /// DAC address code not recognized
    #[error("Unsupported DAC address: {0:?}")]
    UnsupportedAddress(char),

    /// Polarity code not recognized
    #[error("Unsupported polarity: {0:?}")]
    UnsupportedPolarity(char),
}

impl DriverError {
    pub(crate) fn framing(reason: impl Into<String>) -> Self {
        DriverError::Framing(reason.into())
    }

    pub(crate) fn out_of_range(quantity: &'static str, value: f64, min: f64, max: f64) -> Self {
        DriverError::OutOfRange {
            quantity,
            value,
            min,
            max,
        }
    }
}
