//! The 16-byte outer header used to frame FINS payloads on the stream
//! (TCP) transport only; the datagram transport has no outer header.
//!
//! Layout (spec §3, all integers big-endian):
//!
//! | Bytes | Field | Description |
//! |-------|-------|-------------|
//! | 0..4 | magic | ASCII `"FINS"` |
//! | 4..8 | length | byte count following this field |
//! | 8..12 | command | `0x00` handshake request, `0x01` handshake reply, `0x02` framed data |
//! | 12..16 | error | 0 on success |

use crate::error::{FinsError, Result};

/// Outer header size in bytes.
pub const OUTER_HEADER_SIZE: usize = 16;

/// The 4-byte ASCII magic every outer header must carry.
pub const MAGIC: [u8; 4] = *b"FINS";

/// Client-to-server node-address request.
pub const CMD_NODE_ADDRESS_REQUEST: u32 = 0x00;
/// Server-to-client node-address reply.
pub const CMD_NODE_ADDRESS_REPLY: u32 = 0x01;
/// A framed FINS application header + body.
pub const CMD_FRAMED_DATA: u32 = 0x02;

/// The 16-byte outer header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OuterHeader {
    /// Count of bytes following this `length` field.
    ///
    /// The handshake request is written with `length = 12` even though the
    /// full frame is 24 bytes; this matches the wire behaviour of the
    /// reference implementation (see `SPEC_FULL.md` §9a) rather than a
    /// literal "bytes after length" count.
    pub length: u32,
    /// The outer subcommand (`CMD_*` constants).
    pub command: u32,
    /// Zero on success; otherwise the transport must fail with
    /// [`FinsError::StreamError`].
    pub error: u32,
}

impl OuterHeader {
    /// Builds a handshake request header (`length=12`, `command=0x00`).
    pub fn handshake_request() -> Self {
        Self {
            length: 12,
            command: CMD_NODE_ADDRESS_REQUEST,
            error: 0,
        }
    }

    /// Builds a framed-data header wrapping a body of `body_len` bytes.
    ///
    /// `length = body_len + 18`: 10 bytes for the FINS application header,
    /// plus the 8 outer-header bytes after `length` itself, plus the body.
    pub fn framed(body_len: usize) -> Self {
        Self {
            length: body_len as u32 + 18,
            command: CMD_FRAMED_DATA,
            error: 0,
        }
    }

    /// Serializes to 16 bytes.
    pub fn to_bytes(self) -> [u8; OUTER_HEADER_SIZE] {
        let mut out = [0u8; OUTER_HEADER_SIZE];
        out[0..4].copy_from_slice(&MAGIC);
        out[4..8].copy_from_slice(&self.length.to_be_bytes());
        out[8..12].copy_from_slice(&self.command.to_be_bytes());
        out[12..16].copy_from_slice(&self.error.to_be_bytes());
        out
    }

    /// Parses 16 bytes into an outer header, validating the magic.
    ///
    /// # Errors
    ///
    /// Returns [`FinsError::BadMagic`] if the first 4 bytes are not
    /// `"FINS"`, or [`FinsError::InvalidResponse`] if the slice is too
    /// short.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < OUTER_HEADER_SIZE {
            return Err(FinsError::invalid_response(format!(
                "outer header too short: expected {OUTER_HEADER_SIZE} bytes, got {}",
                data.len()
            )));
        }

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&data[0..4]);
        if magic != MAGIC {
            return Err(FinsError::BadMagic(magic));
        }

        Ok(Self {
            length: u32::from_be_bytes(data[4..8].try_into().unwrap()),
            command: u32::from_be_bytes(data[8..12].try_into().unwrap()),
            error: u32::from_be_bytes(data[12..16].try_into().unwrap()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handshake_request_bytes() {
        let header = OuterHeader::handshake_request();
        assert_eq!(
            header.to_bytes(),
            [
                b'F', b'I', b'N', b'S', 0x00, 0x00, 0x00, 0x0C, 0x00, 0x00, 0x00, 0x00, 0x00,
                0x00, 0x00, 0x00,
            ]
        );
    }

    #[test]
    fn framed_length_accounts_for_header_and_body() {
        let header = OuterHeader::framed(6);
        assert_eq!(header.length, 6 + 18);
        assert_eq!(header.command, CMD_FRAMED_DATA);
    }

    #[test]
    fn round_trip() {
        let original = OuterHeader {
            length: 42,
            command: CMD_FRAMED_DATA,
            error: 0,
        };
        let parsed = OuterHeader::from_bytes(&original.to_bytes()).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn bad_magic_rejected() {
        let mut bytes = OuterHeader::handshake_request().to_bytes();
        bytes[0] = b'X';
        assert!(matches!(
            OuterHeader::from_bytes(&bytes),
            Err(FinsError::BadMagic(_))
        ));
    }

    #[test]
    fn too_short_rejected() {
        assert!(OuterHeader::from_bytes(&[0u8; 4]).is_err());
    }
}
