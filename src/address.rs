//! Logical address encoding (spec §4.2).
//!
//! A [`LogicalAddress`] is the caller-facing `(area, data_type, address,
//! bit_offset)` triple; [`LogicalAddress::encode`] turns it into the 4-byte
//! wire address the registry row and dialect demand.

use crate::error::{FinsError, Result};
use crate::memory::{self, Area, DataType, Dialect, RegistryEntry};

/// A logical PLC memory address: an area, a data type, a word offset within
/// that area, and (for `Bit`-typed addresses) a bit offset within the word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalAddress {
    /// The memory area.
    pub area: Area,
    /// The access mode.
    pub data_type: DataType,
    /// Word offset within the area.
    pub address: u16,
    /// Bit offset within the word; must be 0 unless `data_type == Bit`, in
    /// which case it must be `<= 15`.
    pub bit_offset: u8,
}

impl LogicalAddress {
    /// Creates a word-level address (`bit_offset = 0`).
    pub fn word(area: Area, data_type: DataType, address: u16) -> Self {
        Self {
            area,
            data_type,
            address,
            bit_offset: 0,
        }
    }

    /// Creates a bit-level address. Does not itself validate `bit_offset`;
    /// validation happens in [`LogicalAddress::encode`] so that the error
    /// carries dialect/registry context.
    pub fn bit(area: Area, address: u16, bit_offset: u8) -> Self {
        Self {
            area,
            data_type: DataType::Bit,
            address,
            bit_offset,
        }
    }

    /// Returns the registry row for this address's `(area, data_type)`.
    pub fn registry_entry(&self) -> Result<&'static RegistryEntry> {
        memory::lookup(self.area, self.data_type)
    }

    /// Returns the item size in bytes for this address.
    pub fn item_size(&self) -> Result<u8> {
        Ok(self.registry_entry()?.item_size)
    }

    /// Returns a copy of this address with `address` advanced by `delta`
    /// words (wrapping, matching the wire's 16-bit arithmetic).
    pub fn offset_by(&self, delta: u16) -> Self {
        Self {
            address: self.address.wrapping_add(delta),
            ..*self
        }
    }

    /// Encodes this address into the 4-byte wire representation for the
    /// given dialect, per spec §4.2.
    ///
    /// # Errors
    ///
    /// - [`FinsError::InvalidOffset`] if the bit offset is invalid for the
    ///   data type.
    /// - [`FinsError::InvalidAddressing`] if there is no registry entry for
    ///   `(area, data_type)` at all.
    /// - [`FinsError::InvalidDialect`] if the row has no representation on
    ///   the requested dialect, or the word address exceeds that dialect's
    ///   maximum.
    ///
    /// # Example
    ///
    /// ```
    /// use fins_link::address::LogicalAddress;
    /// use fins_link::memory::{Area, Dialect};
    ///
    /// let addr = LogicalAddress::bit(Area::CIO, 10, 13);
    /// assert_eq!(addr.encode(Dialect::New).unwrap(), [0x30, 0x00, 0x0A, 0x0D]);
    /// ```
    pub fn encode(&self, dialect: Dialect) -> Result<[u8; 4]> {
        if self.data_type == DataType::Bit {
            if self.bit_offset > 15 {
                return Err(FinsError::invalid_offset(self.bit_offset, "Bit"));
            }
        } else if self.bit_offset != 0 {
            return Err(FinsError::invalid_offset(
                self.bit_offset,
                self.data_type.to_string(),
            ));
        }

        let row = self.registry_entry()?;
        let (code, max, offset) = row.dialect_params(dialect).ok_or_else(|| {
            FinsError::invalid_dialect(format!(
                "{} {} has no representation on the {:?} dialect",
                self.area, self.data_type, dialect
            ))
        })?;

        if self.address > max {
            return Err(FinsError::invalid_addressing(format!(
                "address {} exceeds max {} for {} {} on the {:?} dialect",
                self.address, max, self.area, self.data_type, dialect
            )));
        }

        let wire_addr = self.address.wrapping_add(offset);
        Ok([
            code,
            (wire_addr >> 8) as u8,
            (wire_addr & 0xFF) as u8,
            self.bit_offset,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_encode_new_dialect() {
        let addr = LogicalAddress::bit(Area::CIO, 10, 13);
        assert_eq!(addr.encode(Dialect::New).unwrap(), [0x30, 0x00, 0x0A, 0x0D]);
    }

    #[test]
    fn word_encode_with_registry_offset() {
        let addr = LogicalAddress::word(Area::CNT, DataType::PV, 0);
        assert_eq!(addr.encode(Dialect::New).unwrap(), [0x89, 0x80, 0x00, 0x00]);
    }

    #[test]
    fn bit_offset_too_large_rejected() {
        let addr = LogicalAddress::bit(Area::CIO, 10, 16);
        assert!(matches!(
            addr.encode(Dialect::New),
            Err(FinsError::InvalidOffset { offset: 16, .. })
        ));
    }

    #[test]
    fn bit_offset_15_is_valid() {
        let addr = LogicalAddress::bit(Area::CIO, 10, 15);
        assert!(addr.encode(Dialect::New).is_ok());
    }

    #[test]
    fn non_bit_with_nonzero_offset_rejected() {
        let addr = LogicalAddress {
            area: Area::DM,
            data_type: DataType::Word,
            address: 0,
            bit_offset: 1,
        };
        assert!(matches!(
            addr.encode(Dialect::New),
            Err(FinsError::InvalidOffset { offset: 1, .. })
        ));
    }

    #[test]
    fn address_at_max_is_ok_and_max_plus_one_fails() {
        let row = memory::lookup(Area::CIO, DataType::Bit).unwrap();
        let at_max = LogicalAddress::bit(Area::CIO, row.new_max, 0);
        assert!(at_max.encode(Dialect::New).is_ok());

        let over_max = LogicalAddress::bit(Area::CIO, row.new_max + 1, 0);
        assert!(matches!(
            over_max.encode(Dialect::New),
            Err(FinsError::InvalidAddressing { .. })
        ));
    }

    #[test]
    fn unsupported_old_dialect_row_fails() {
        let addr = LogicalAddress::word(Area::WR, DataType::Word, 0);
        assert!(matches!(
            addr.encode(Dialect::Old),
            Err(FinsError::InvalidDialect { .. })
        ));
    }

    #[test]
    fn offset_by_wraps() {
        let addr = LogicalAddress::word(Area::DM, DataType::Word, u16::MAX);
        assert_eq!(addr.offset_by(1).address, 0);
    }

    #[test]
    fn every_registry_row_round_trips_at_its_max() {
        for row in memory::REGISTRY {
            for dialect in [Dialect::New, Dialect::Old] {
                let Some((_, max, _)) = row.dialect_params(dialect) else {
                    continue;
                };
                let addr = LogicalAddress {
                    area: row.area,
                    data_type: row.data_type,
                    address: max,
                    bit_offset: 0,
                };
                assert!(
                    addr.encode(dialect).is_ok(),
                    "{:?} {:?} at max {} on {:?} should encode",
                    row.area,
                    row.data_type,
                    max,
                    dialect
                );

                if max < u16::MAX {
                    let over = LogicalAddress {
                        address: max + 1,
                        ..addr
                    };
                    assert!(
                        over.encode(dialect).is_err(),
                        "{:?} {:?} above max {} on {:?} should fail",
                        row.area,
                        row.data_type,
                        max,
                        dialect
                    );
                }
            }
        }
    }
}
