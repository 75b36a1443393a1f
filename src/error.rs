//! Crate-level error types
//!
//! Errors that escape the relay core are rare by design: a slow or broken
//! consumer is handled inside its own session and only surfaces through
//! tracing and stats. What remains here is I/O from the listener and
//! clients, registry misuse, and wire-format violations.

use crate::relay::error::RegistryError;

/// Convenience result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug)]
pub enum Error {
    /// I/O error (socket, bind, connect)
    Io(std::io::Error),
    /// Consumer registry error
    Registry(RegistryError),
    /// Wire format violation
    Wire(WireError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Registry(e) => write!(f, "Registry error: {}", e),
            Error::Wire(e) => write!(f, "Wire error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Registry(e) => Some(e),
            Error::Wire(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Error::Registry(e)
    }
}

impl From<WireError> for Error {
    fn from(e: WireError) -> Self {
        Error::Wire(e)
    }
}

/// Wire format error, fatal for the connection it occurred on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireError {
    /// Declared frame length exceeds the configured maximum
    FrameTooLarge {
        /// Declared payload length
        size: usize,
        /// Configured maximum
        max: usize,
    },
    /// First byte of the connection is not a known role
    UnknownRole(u8),
}

impl std::fmt::Display for WireError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireError::FrameTooLarge { size, max } => {
                write!(f, "Frame too large: {} bytes (max {})", size, max)
            }
            WireError::UnknownRole(byte) => write!(f, "Unknown role byte: {:#04x}", byte),
        }
    }
}

impl std::error::Error for WireError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Wire(WireError::UnknownRole(0x7f));
        assert!(err.to_string().contains("0x7f"));

        let err = Error::Wire(WireError::FrameTooLarge { size: 100, max: 10 });
        assert!(err.to_string().contains("100"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
