//! FINS response parsing and validation.
//!
//! # Response Structure
//!
//! | Component | Size | Description |
//! |-----------|------|-------------|
//! | Header | 10 bytes | FINS header (same structure as command) |
//! | MRC | 1 byte | Main Response Code (command echo) |
//! | SRC | 1 byte | Sub Response Code (subcommand echo) |
//! | E0 | 1 byte | End code, main byte |
//! | E1 | 1 byte | End code, sub byte |
//! | Data | Variable | Response payload, if any |
//!
//! # Example
//!
//! ```
//! use fins_link::response::FinsResponse;
//!
//! let bytes = [
//!     0xC0, 0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0x0A, 0x00, 0x01, // header
//!     0x01, 0x01, // MRC, SRC
//!     0x00, 0x00, // end code (success)
//!     0x12, 0x34, 0x56, 0x78, // data
//! ];
//!
//! let response = FinsResponse::from_bytes(&bytes).unwrap();
//! assert!(response.is_success());
//! assert_eq!(response.payload(), &[0x12, 0x34, 0x56, 0x78]);
//! ```

use crate::end_code::{self, Outcome};
use crate::error::{FinsError, Result};
use crate::header::{FinsHeader, FINS_HEADER_SIZE};

/// Minimum response size: header (10) + MRC (1) + SRC (1) + E0 (1) + E1 (1) = 14 bytes.
pub const MIN_RESPONSE_SIZE: usize = FINS_HEADER_SIZE + 4;

/// A parsed FINS response.
#[derive(Debug, Clone)]
pub struct FinsResponse {
    /// Response header.
    pub header: FinsHeader,
    /// Main Response Code (echoes the request's `mr`).
    pub mrc: u8,
    /// Sub Response Code (echoes the request's `sr`).
    pub src: u8,
    /// End code, main byte.
    pub e0: u8,
    /// End code, sub byte.
    pub e1: u8,
    /// Response payload, if any.
    pub data: Vec<u8>,
}

impl FinsResponse {
    /// Parses a FINS response from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FinsError::InvalidResponse`] if the slice is shorter than
    /// [`MIN_RESPONSE_SIZE`] or the header cannot be parsed.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < MIN_RESPONSE_SIZE {
            return Err(FinsError::invalid_response(format!(
                "response too short: expected at least {MIN_RESPONSE_SIZE} bytes, got {}",
                data.len()
            )));
        }

        let header = FinsHeader::from_bytes(&data[..FINS_HEADER_SIZE])?;

        Ok(Self {
            header,
            mrc: data[FINS_HEADER_SIZE],
            src: data[FINS_HEADER_SIZE + 1],
            e0: data[FINS_HEADER_SIZE + 2],
            e1: data[FINS_HEADER_SIZE + 3],
            data: data[MIN_RESPONSE_SIZE..].to_vec(),
        })
    }

    /// Returns the response payload past the 14-byte response header.
    pub fn payload(&self) -> &[u8] {
        &self.data
    }

    /// Decodes this response's end code.
    pub fn outcome(&self) -> Outcome {
        end_code::decode(self.e0, self.e1)
    }

    /// Returns whether the decoded end code is a success (including the
    /// informational branch; see [`crate::end_code`]).
    pub fn is_success(&self) -> bool {
        self.outcome().is_ok()
    }

    /// Validates the end code and returns an error if it is not a success.
    ///
    /// # Errors
    ///
    /// Returns [`FinsError::PlcError`] if the outcome's category is
    /// `NetworkRelayError`, `FatalCpuUnitError`, or `NonFatalCpuUnitError`.
    pub fn check_error(&self) -> Result<()> {
        let outcome = self.outcome();
        if outcome.is_ok() {
            Ok(())
        } else {
            Err(FinsError::plc_error(outcome.main_code, outcome.sub_code))
        }
    }

    /// Validates that the command/subcommand echo matches what was sent.
    ///
    /// # Errors
    ///
    /// Returns [`FinsError::CommandEchoMismatch`] on mismatch.
    pub fn check_echo(&self, expected: (u8, u8)) -> Result<()> {
        let got = (self.mrc, self.src);
        if got == expected {
            Ok(())
        } else {
            Err(FinsError::command_echo_mismatch(expected, got))
        }
    }

    /// Validates the Service ID matches the expected value.
    ///
    /// # Errors
    ///
    /// Returns [`FinsError::SidMismatch`] on mismatch.
    pub fn check_sid(&self, expected: u8) -> Result<()> {
        if self.header.sid == expected {
            Ok(())
        } else {
            Err(FinsError::sid_mismatch(expected, self.header.sid))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_response(e0: u8, e1: u8, data: &[u8]) -> Vec<u8> {
        let mut bytes = vec![
            0xC0, 0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0x0A, 0x00, 0x01, // header
            0x01, 0x01, // MRC, SRC
            e0, e1,
        ];
        bytes.extend_from_slice(data);
        bytes
    }

    #[test]
    fn from_bytes_success() {
        let bytes = make_response(0x00, 0x00, &[0x12, 0x34]);
        let response = FinsResponse::from_bytes(&bytes).unwrap();

        assert_eq!(response.header.icf, 0xC0);
        assert_eq!(response.header.sid, 0x01);
        assert_eq!(response.mrc, 0x01);
        assert_eq!(response.src, 0x01);
        assert_eq!(response.payload(), &[0x12, 0x34]);
    }

    #[test]
    fn from_bytes_too_short() {
        let bytes = [0xC0, 0x00, 0x02];
        assert!(FinsResponse::from_bytes(&bytes).is_err());
    }

    #[test]
    fn is_success_tracks_end_code_category() {
        let success = FinsResponse::from_bytes(&make_response(0x00, 0x00, &[])).unwrap();
        assert!(success.is_success());

        let relay_error = FinsResponse::from_bytes(&make_response(0xA1, 0x01, &[])).unwrap();
        assert!(!relay_error.is_success());
    }

    #[test]
    fn informational_end_code_is_still_success() {
        let response = FinsResponse::from_bytes(&make_response(0x21, 0x01, &[])).unwrap();
        assert!(response.is_success());
        assert!(response.check_error().is_ok());
    }

    #[test]
    fn check_error_on_fatal_category() {
        let response = FinsResponse::from_bytes(&make_response(0x00, 0x80, &[])).unwrap();
        let err = response.check_error().unwrap_err();
        assert!(matches!(err, FinsError::PlcError { .. }));
    }

    #[test]
    fn check_echo() {
        let response = FinsResponse::from_bytes(&make_response(0x00, 0x00, &[])).unwrap();
        assert!(response.check_echo((0x01, 0x01)).is_ok());
        assert!(matches!(
            response.check_echo((0x01, 0x02)),
            Err(FinsError::CommandEchoMismatch { .. })
        ));
    }

    #[test]
    fn check_sid() {
        let response = FinsResponse::from_bytes(&make_response(0x00, 0x00, &[])).unwrap();
        assert!(response.check_sid(0x01).is_ok());
        assert!(response.check_sid(0x02).is_err());
    }
}
