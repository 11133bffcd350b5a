//! Typed views over the raw byte buffers the registry produces.
//!
//! A [`Value`] pairs a [`LogicalAddress`] with the raw bytes read from (or
//! to be written to) that address. The buffer length always equals the
//! address's registry `item_size`; the typed accessors below are a thin
//! convenience layer on top, not a general conversion library (see
//! `SPEC_FULL.md` §3).

use crate::address::LogicalAddress;
use crate::error::{FinsError, Result};

/// One logical value: an address plus its raw wire bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    /// The address this value was read from, or is destined for.
    pub address: LogicalAddress,
    /// Raw bytes, big-endian, `item_size` bytes long for `address`.
    pub buf: Vec<u8>,
}

impl Value {
    /// Builds a value, validating that `buf.len()` matches the address's
    /// registry item size.
    ///
    /// # Errors
    ///
    /// Returns [`FinsError::InvalidResponse`] if the buffer length does not
    /// match the address's `item_size`.
    pub fn new(address: LogicalAddress, buf: Vec<u8>) -> Result<Self> {
        let expected = address.item_size()? as usize;
        if buf.len() != expected {
            return Err(FinsError::invalid_response(format!(
                "buffer length {} does not match item size {expected} for {:?} {:?}",
                buf.len(),
                address.area,
                address.data_type
            )));
        }
        Ok(Self { address, buf })
    }

    /// Interprets the buffer as a big-endian `u16`.
    ///
    /// # Errors
    ///
    /// Returns [`FinsError::InvalidResponse`] if the buffer is not 2 bytes.
    pub fn as_u16(&self) -> Result<u16> {
        let bytes: [u8; 2] = self
            .buf
            .as_slice()
            .try_into()
            .map_err(|_| FinsError::invalid_response("value is not 2 bytes wide"))?;
        Ok(u16::from_be_bytes(bytes))
    }

    /// Interprets the buffer as a big-endian `u32`.
    ///
    /// # Errors
    ///
    /// Returns [`FinsError::InvalidResponse`] if the buffer is not 4 bytes.
    pub fn as_u32(&self) -> Result<u32> {
        let bytes: [u8; 4] = self
            .buf
            .as_slice()
            .try_into()
            .map_err(|_| FinsError::invalid_response("value is not 4 bytes wide"))?;
        Ok(u32::from_be_bytes(bytes))
    }

    /// Interprets the first byte as a boolean (non-zero is `true`).
    ///
    /// # Errors
    ///
    /// Returns [`FinsError::InvalidResponse`] if the buffer is empty.
    pub fn as_bool(&self) -> Result<bool> {
        self.buf
            .first()
            .map(|&b| b != 0)
            .ok_or_else(|| FinsError::invalid_response("value has no bytes"))
    }
}
