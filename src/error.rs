//! Error types for the FINS protocol.

use std::io;
use thiserror::Error;

/// Result type alias for FINS operations.
pub type Result<T> = std::result::Result<T, FinsError>;

/// Errors that can occur while building a request, framing it, or talking to
/// the transport.
#[derive(Debug, Error)]
pub enum FinsError {
    /// The PLC returned a non-zero end code (network relay or fatal/non-fatal
    /// CPU unit error).
    #[error("PLC end code error: main code 0x{main_code:02X}, sub code 0x{sub_code:02X}")]
    PlcError {
        /// Main error code (`e0 & 0x7F`) from the PLC response.
        main_code: u8,
        /// Sub error code (`e1 & 0x3F`) from the PLC response.
        sub_code: u8,
    },

    /// A logical address could not be encoded: out of range for the
    /// `(area, data_type)` pair, or unsupported on the selected dialect.
    #[error("Invalid addressing: {reason}")]
    InvalidAddressing {
        /// Description of the addressing error.
        reason: String,
    },

    /// A bit offset was non-zero for a non-`Bit` data type, or exceeded 15
    /// for a `Bit` data type.
    #[error("Invalid bit offset {offset} for {data_type}")]
    InvalidOffset {
        /// The rejected bit offset.
        offset: u8,
        /// Name of the data type the offset was rejected against.
        data_type: String,
    },

    /// The requested PLC dialect is unrecognised, or the registry row has no
    /// representation on the requested dialect.
    #[error("Invalid dialect: {reason}")]
    InvalidDialect {
        /// Description of the dialect error.
        reason: String,
    },

    /// A read length, write value list, or random-read address list was
    /// empty.
    #[error("Empty request: {reason}")]
    EmptyRequest {
        /// Which part of the request was empty.
        reason: String,
    },

    /// An operation was attempted while the transport was not `Connected`.
    #[error("Transport not connected")]
    NotConnected,

    /// A read or write deadline elapsed before the operation completed.
    #[error("Communication timeout")]
    Timeout,

    /// The stream transport's outer header reported a non-zero error code.
    #[error("Stream transport error code {0}")]
    StreamError(u32),

    /// The stream transport's outer header did not carry the `"FINS"` magic.
    #[error("Bad outer header magic: {0:?}")]
    BadMagic([u8; 4]),

    /// The response's command/subcommand bytes did not match the request's.
    #[error("Command echo mismatch: expected {expected:?}, got {got:?}")]
    CommandEchoMismatch {
        /// The `(mr, sr)` pair that was sent.
        expected: (u8, u8),
        /// The `(mr, sr)` pair the response echoed back.
        got: (u8, u8),
    },

    /// Service ID mismatch between request and response; the transport is
    /// forced to `Disconnected` when this occurs.
    #[error("SID mismatch: expected 0x{expected:02X}, received 0x{received:02X}")]
    SidMismatch {
        /// Expected SID value.
        expected: u8,
        /// Received SID value.
        received: u8,
    },

    /// A response could not be parsed because it was malformed or too short.
    #[error("Invalid response: {reason}")]
    InvalidResponse {
        /// Description of the response error.
        reason: String,
    },

    /// I/O error during communication.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl FinsError {
    /// Creates a new `PlcError` from main and sub codes.
    pub fn plc_error(main_code: u8, sub_code: u8) -> Self {
        Self::PlcError {
            main_code,
            sub_code,
        }
    }

    /// Creates a new `InvalidAddressing` error.
    pub fn invalid_addressing(reason: impl Into<String>) -> Self {
        Self::InvalidAddressing {
            reason: reason.into(),
        }
    }

    /// Creates a new `InvalidOffset` error.
    pub fn invalid_offset(offset: u8, data_type: impl Into<String>) -> Self {
        Self::InvalidOffset {
            offset,
            data_type: data_type.into(),
        }
    }

    /// Creates a new `InvalidDialect` error.
    pub fn invalid_dialect(reason: impl Into<String>) -> Self {
        Self::InvalidDialect {
            reason: reason.into(),
        }
    }

    /// Creates a new `EmptyRequest` error.
    pub fn empty_request(reason: impl Into<String>) -> Self {
        Self::EmptyRequest {
            reason: reason.into(),
        }
    }

    /// Creates a new `CommandEchoMismatch` error.
    pub fn command_echo_mismatch(expected: (u8, u8), got: (u8, u8)) -> Self {
        Self::CommandEchoMismatch { expected, got }
    }

    /// Creates a new `SidMismatch` error.
    pub fn sid_mismatch(expected: u8, received: u8) -> Self {
        Self::SidMismatch { expected, received }
    }

    /// Creates a new `InvalidResponse` error.
    pub fn invalid_response(reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            reason: reason.into(),
        }
    }

    /// Returns whether this error represents a transport-level failure that
    /// must force the owning transport to `Disconnected` (spec.md §7).
    pub fn forces_disconnect(&self) -> bool {
        matches!(
            self,
            FinsError::Io(_)
                | FinsError::Timeout
                | FinsError::StreamError(_)
                | FinsError::BadMagic(_)
                | FinsError::SidMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plc_error_display() {
        let err = FinsError::plc_error(0x01, 0x01);
        assert_eq!(
            err.to_string(),
            "PLC end code error: main code 0x01, sub code 0x01"
        );
    }

    #[test]
    fn invalid_addressing_display() {
        let err = FinsError::invalid_addressing("address 7000 exceeds max 6143");
        assert_eq!(
            err.to_string(),
            "Invalid addressing: address 7000 exceeds max 6143"
        );
    }

    #[test]
    fn timeout_display() {
        assert_eq!(FinsError::Timeout.to_string(), "Communication timeout");
    }

    #[test]
    fn sid_mismatch_display() {
        let err = FinsError::sid_mismatch(0x01, 0x02);
        assert_eq!(
            err.to_string(),
            "SID mismatch: expected 0x01, received 0x02"
        );
    }

    #[test]
    fn forces_disconnect_classification() {
        assert!(FinsError::Timeout.forces_disconnect());
        assert!(FinsError::sid_mismatch(1, 2).forces_disconnect());
        assert!(FinsError::BadMagic(*b"XXXX").forces_disconnect());
        assert!(!FinsError::plc_error(0x20, 0x00).forces_disconnect());
        assert!(!FinsError::NotConnected.forces_disconnect());
        assert!(!FinsError::empty_request("length").forces_disconnect());
    }
}
