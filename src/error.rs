//! # Error Types
//!
//! Custom error types for Gyropad using `thiserror`.
//!
//! The synthesis core never fails on bad numbers; those are coerced or
//! clamped. Errors here cover configuration files, device access and
//! operations given an index outside the standard button layout.

use thiserror::Error;

/// Main error type for Gyropad
#[derive(Debug, Error)]
pub enum GyropadError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input device errors (open, read, disconnect)
    #[error("Controller error: {0}")]
    Controller(String),

    /// No supported gamepad found under /dev/input
    #[error("No DualSense controller found")]
    ControllerNotFound,

    /// No motion sensor node found under /dev/input
    #[error("No DualSense motion sensor found")]
    MotionSensorNotFound,

    /// Button index outside the standard 18-button layout
    #[error("Button index {0} is out of range (must be 0-17)")]
    InvalidButton(usize),

    /// The on-screen controller cannot be shown while a real gamepad is connected
    #[error("A real gamepad is connected, the virtual controller is not available")]
    VirtualControllerUnavailable,
}

/// Result type alias for Gyropad
pub type Result<T> = std::result::Result<T, GyropadError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::Error as _;

    #[test]
    fn test_invalid_button_message() {
        let err = GyropadError::InvalidButton(18);
        assert_eq!(err.to_string(), "Button index 18 is out of range (must be 0-17)");
    }

    #[test]
    fn test_config_error_from_toml() {
        let err: GyropadError = toml::de::Error::custom("alpha must be in (0, 1]").into();
        assert!(matches!(err, GyropadError::Config(_)));
        assert!(err.to_string().contains("alpha must be in (0, 1]"));
    }

    #[test]
    fn test_io_error_from_std() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: GyropadError = io.into();
        assert!(matches!(err, GyropadError::Io(_)));
    }
}
