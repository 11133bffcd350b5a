//! FINS command body builders.
//!
//! Each function here builds the *body* bytes of a request — the part
//! after the 10-byte application header — per spec §4.5. Framing (the
//! header itself, and on the stream transport, the outer header) is the
//! dispatcher's job, not this module's.

use crate::address::LogicalAddress;
use crate::error::{FinsError, Result};
use crate::memory::Dialect;

/// Memory Area Read command code pair (`mr`, `sr`).
pub const MEMORY_READ: (u8, u8) = (0x01, 0x01);
/// Memory Area Write command code pair.
pub const MEMORY_WRITE: (u8, u8) = (0x01, 0x02);
/// Multiple Memory Area Read command code pair.
pub const MULTIPLE_MEMORY_READ: (u8, u8) = (0x01, 0x04);

/// Maximum number of words that can be read or written in a single command.
///
/// This bound is not enforced by this module (the registry's own `new_max`/
/// `old_max` limits already bound what is addressable); it documents the
/// OMRON reference manual's stated per-command ceiling.
pub const MAX_ITEMS_PER_COMMAND: u16 = 999;

/// Builds the body for a memory-area read command.
///
/// # Errors
///
/// Returns [`FinsError::EmptyRequest`] if `length == 0`, or an addressing
/// error if `address` does not encode for `dialect`.
pub fn read_body(address: LogicalAddress, length: u16, dialect: Dialect) -> Result<Vec<u8>> {
    if length == 0 {
        return Err(FinsError::empty_request("read length must be non-zero"));
    }

    let mut body = Vec::with_capacity(6);
    body.extend_from_slice(&address.encode(dialect)?);
    body.extend_from_slice(&length.to_be_bytes());
    Ok(body)
}

/// Builds the body for a memory-area write command.
///
/// `values` is the concatenation of each value's raw buffer, in address
/// order; the caller is responsible for ensuring each buffer matches
/// `address`'s item size.
///
/// # Errors
///
/// Returns [`FinsError::EmptyRequest`] if `values` is empty.
pub fn write_body(
    address: LogicalAddress,
    values: &[Vec<u8>],
    dialect: Dialect,
) -> Result<Vec<u8>> {
    if values.is_empty() {
        return Err(FinsError::empty_request("write value list must be non-empty"));
    }

    let mut body = Vec::with_capacity(6 + values.iter().map(Vec::len).sum::<usize>());
    body.extend_from_slice(&address.encode(dialect)?);
    body.extend_from_slice(&(values.len() as u16).to_be_bytes());
    for value in values {
        body.extend_from_slice(value);
    }
    Ok(body)
}

/// Builds the body for a multiple memory-area (random) read command.
///
/// # Errors
///
/// Returns [`FinsError::EmptyRequest`] if `addresses` is empty.
pub fn random_read_body(addresses: &[LogicalAddress], dialect: Dialect) -> Result<Vec<u8>> {
    if addresses.is_empty() {
        return Err(FinsError::empty_request(
            "random read address list must be non-empty",
        ));
    }

    let mut body = Vec::with_capacity(addresses.len() * 4);
    for address in addresses {
        body.extend_from_slice(&address.encode(dialect)?);
    }
    Ok(body)
}

/// Splits a read response payload into `length` values of `item_size`
/// bytes each, starting at `base`.
///
/// # Errors
///
/// Returns [`FinsError::InvalidResponse`] if `payload.len() !=
/// length as usize * item_size as usize`.
pub fn split_read_payload(
    base: LogicalAddress,
    length: u16,
    item_size: u8,
    payload: &[u8],
) -> Result<Vec<(LogicalAddress, Vec<u8>)>> {
    let item_size = item_size as usize;
    let expected = length as usize * item_size;
    if payload.len() != expected {
        return Err(FinsError::invalid_response(format!(
            "read payload length {} does not match expected {expected}",
            payload.len()
        )));
    }

    Ok(payload
        .chunks_exact(item_size)
        .enumerate()
        .map(|(i, chunk)| (base.offset_by(i as u16), chunk.to_vec()))
        .collect())
}

/// Splits a random-read response payload into one value per requested
/// address, skipping the one-byte area tag OMRON prefixes each item with
/// (spec §4.5, §9 open question (b)).
///
/// # Errors
///
/// Returns [`FinsError::InvalidResponse`] if the payload length does not
/// match `sum(item_size) + addresses.len()`.
pub fn split_random_read_payload(
    addresses: &[LogicalAddress],
    payload: &[u8],
) -> Result<Vec<(LogicalAddress, Vec<u8>)>> {
    let mut sizes = Vec::with_capacity(addresses.len());
    let mut expected = 0usize;
    for address in addresses {
        let size = address.item_size()? as usize;
        expected += 1 + size;
        sizes.push(size);
    }

    if payload.len() != expected {
        return Err(FinsError::invalid_response(format!(
            "random read payload length {} does not match expected {expected}",
            payload.len()
        )));
    }

    let mut out = Vec::with_capacity(addresses.len());
    let mut cursor = 0usize;
    for (&address, size) in addresses.iter().zip(sizes) {
        cursor += 1; // skip the leading area tag byte
        out.push((address, payload[cursor..cursor + size].to_vec()));
        cursor += size;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Area, DataType};

    #[test]
    fn read_body_rejects_zero_length() {
        let address = LogicalAddress::word(Area::DM, DataType::Word, 100);
        assert!(matches!(
            read_body(address, 0, Dialect::New),
            Err(FinsError::EmptyRequest { .. })
        ));
    }

    #[test]
    fn read_body_layout() {
        let address = LogicalAddress::word(Area::DM, DataType::Word, 100);
        let body = read_body(address, 10, Dialect::New).unwrap();
        assert_eq!(body, vec![0x82, 0x00, 0x64, 0x00, 0x00, 0x0A]);
    }

    #[test]
    fn write_body_rejects_empty_values() {
        let address = LogicalAddress::word(Area::DM, DataType::Word, 0);
        assert!(matches!(
            write_body(address, &[], Dialect::New),
            Err(FinsError::EmptyRequest { .. })
        ));
    }

    #[test]
    fn write_body_layout() {
        let address = LogicalAddress::word(Area::DM, DataType::Word, 0);
        let values = vec![vec![0x12, 0x34], vec![0x56, 0x78]];
        let body = write_body(address, &values, Dialect::New).unwrap();
        assert_eq!(
            body,
            vec![0x82, 0x00, 0x00, 0x00, 0x02, 0x12, 0x34, 0x56, 0x78]
        );
    }

    #[test]
    fn random_read_body_rejects_empty() {
        assert!(matches!(
            random_read_body(&[], Dialect::New),
            Err(FinsError::EmptyRequest { .. })
        ));
    }

    #[test]
    fn split_read_payload_even_chunks() {
        let base = LogicalAddress::word(Area::DM, DataType::Word, 100);
        let payload = [0x12, 0x34, 0x56, 0x78];
        let values = split_read_payload(base, 2, 2, &payload).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].0.address, 100);
        assert_eq!(values[0].1, vec![0x12, 0x34]);
        assert_eq!(values[1].0.address, 101);
        assert_eq!(values[1].1, vec![0x56, 0x78]);
    }

    #[test]
    fn split_read_payload_length_mismatch_fails() {
        let base = LogicalAddress::word(Area::DM, DataType::Word, 100);
        assert!(split_read_payload(base, 2, 2, &[0x00]).is_err());
    }

    #[test]
    fn split_random_read_payload_matches_spec_scenario() {
        let addresses = [
            LogicalAddress::word(Area::DM, DataType::Word, 0),
            LogicalAddress::bit(Area::CIO, 0, 0),
        ];
        let payload = [0xAA, 0xb0, 0xb1, 0xAA, 0xc0];
        let values = split_random_read_payload(&addresses, &payload).unwrap();
        assert_eq!(values[0].1, vec![0xb0, 0xb1]);
        assert_eq!(values[1].1, vec![0xc0]);
    }

    #[test]
    fn split_random_read_payload_length_mismatch_fails() {
        let addresses = [LogicalAddress::word(Area::DM, DataType::Word, 0)];
        assert!(split_random_read_payload(&addresses, &[0x00]).is_err());
    }
}
