//! Memory area and data-type registry for the FINS protocol.
//!
//! Every logical address is a `(Area, DataType)` pair plus a word offset and an
//! optional bit offset. This module holds the constant table that maps each
//! valid pair to its wire-level codes, per-dialect address limits, and item
//! size in bytes. The table is the literal one published in the OMRON FINS
//! reference manual; nothing here is derived, it is transcribed.

use std::fmt;
use std::str::FromStr;

use crate::error::{FinsError, Result};

/// A PLC memory area, identified by its OMRON mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Area {
    /// Core I/O area: inputs, outputs, and internal relays.
    CIO,
    /// Work area: scratch bits/words with no special meaning.
    WR,
    /// Holding area: retentive bits/words.
    HR,
    /// Auxiliary area: system status and control bits/words.
    AR,
    /// Timer area.
    TIM,
    /// Counter area.
    CNT,
    /// Data Memory area: word-only numeric storage.
    DM,
    /// Index Register area.
    IR,
    /// Data Register area.
    DR,
}

impl Area {
    const ALL: [Area; 9] = [
        Area::CIO,
        Area::WR,
        Area::HR,
        Area::AR,
        Area::TIM,
        Area::CNT,
        Area::DM,
        Area::IR,
        Area::DR,
    ];
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Area::CIO => "CIO",
            Area::WR => "WR",
            Area::HR => "HR",
            Area::AR => "AR",
            Area::TIM => "TIM",
            Area::CNT => "CNT",
            Area::DM => "DM",
            Area::IR => "IR",
            Area::DR => "DR",
        };
        f.write_str(s)
    }
}

impl FromStr for Area {
    type Err = FinsError;

    /// Parses an area mnemonic, case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        Area::ALL
            .into_iter()
            .find(|a| a.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| FinsError::invalid_addressing(format!("unknown memory area '{s}'")))
    }
}

/// The access mode used against a memory area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// A single bit.
    Bit,
    /// A single bit, with forced-status semantics.
    BitFs,
    /// A 16-bit word.
    Word,
    /// A 16-bit word, with forced-status semantics.
    WordFs,
    /// Counter/timer completion flag, one byte.
    CF,
    /// Counter/timer completion flag, with forced-status semantics.
    CFFs,
    /// Counter/timer present value, one word.
    PV,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataType::Bit => "Bit",
            DataType::BitFs => "BitFs",
            DataType::Word => "Word",
            DataType::WordFs => "WordFs",
            DataType::CF => "CF",
            DataType::CFFs => "CFFs",
            DataType::PV => "PV",
        };
        f.write_str(s)
    }
}

/// Which PLC family's address codes and limits apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// CS/CJ/CP/NSJ series.
    New,
    /// CVM1/CV series.
    Old,
}

/// One row of the memory-area registry.
///
/// `old_max` of `None` means the `(area, data_type)` pair has no
/// representation on the old dialect at all.
#[derive(Debug, Clone, Copy)]
pub struct RegistryEntry {
    /// The memory area this row describes.
    pub area: Area,
    /// The data type (access mode) this row describes.
    pub data_type: DataType,
    /// Wire code used to select this area/type on the new dialect.
    pub new_code: u8,
    /// Largest valid word address on the new dialect.
    pub new_max: u16,
    /// Address bias added before encoding on the new dialect.
    pub new_offset: u16,
    /// Wire code used on the old dialect, if supported.
    pub old_code: u8,
    /// Largest valid word address on the old dialect, `None` if unsupported.
    pub old_max: Option<u16>,
    /// Address bias added before encoding on the old dialect.
    pub old_offset: u16,
    /// Size in bytes of one item (one word/bit/flag) in this area.
    pub item_size: u8,
}

impl RegistryEntry {
    /// Returns the `(code, max_address, offset)` triple for the given
    /// dialect, or `None` if this row has no representation on it.
    pub(crate) fn dialect_params(&self, dialect: Dialect) -> Option<(u8, u16, u16)> {
        match dialect {
            Dialect::New => Some((self.new_code, self.new_max, self.new_offset)),
            Dialect::Old => self
                .old_max
                .map(|max| (self.old_code, max, self.old_offset)),
        }
    }
}

macro_rules! row {
    ($area:ident, $dt:ident, $nc:expr, $nm:expr, $no:expr, $oc:expr, $om:expr, $oo:expr, $sz:expr) => {
        RegistryEntry {
            area: Area::$area,
            data_type: DataType::$dt,
            new_code: $nc,
            new_max: $nm,
            new_offset: $no,
            old_code: $oc,
            old_max: $om,
            old_offset: $oo,
            item_size: $sz,
        }
    };
}

/// The complete, literal memory-area registry (27 rows).
pub const REGISTRY: &[RegistryEntry] = &[
    row!(CIO, Bit, 0x30, 6143, 0, 0x00, Some(2555), 0, 1),
    row!(WR, Bit, 0x31, 511, 0, 0x00, None, 0, 1),
    row!(HR, Bit, 0x32, 511, 0, 0x00, None, 0, 1),
    row!(AR, Bit, 0x33, 959, 0, 0x00, Some(959), 0x0B00, 1),
    row!(CIO, BitFs, 0x70, 6143, 0, 0x40, Some(2555), 0, 1),
    row!(WR, BitFs, 0x71, 511, 0, 0x00, None, 0, 1),
    row!(HR, BitFs, 0x72, 511, 0, 0x00, None, 0, 1),
    row!(CIO, Word, 0xB0, 6143, 0, 0x80, Some(2555), 0, 2),
    row!(WR, Word, 0xB1, 511, 0, 0x00, None, 0, 2),
    row!(HR, Word, 0xB2, 511, 0, 0x00, None, 0, 2),
    row!(AR, Word, 0xB3, 959, 0, 0x80, Some(959), 0x0B00, 2),
    row!(CIO, WordFs, 0xF0, 6143, 0, 0xC0, Some(2555), 0, 4),
    row!(WR, WordFs, 0xF1, 511, 0, 0x00, None, 0, 4),
    row!(HR, WordFs, 0xF2, 511, 0, 0x00, None, 0, 4),
    row!(TIM, CF, 0x09, 4095, 0, 0x01, Some(2047), 0, 1),
    row!(CNT, CF, 0x09, 4095, 0x8000, 0x01, Some(2047), 0x0800, 1),
    row!(TIM, CFFs, 0x49, 4095, 0, 0x41, Some(2047), 0, 1),
    row!(CNT, CFFs, 0x49, 4095, 0x8000, 0x41, Some(2047), 0x0800, 1),
    row!(TIM, PV, 0x89, 4095, 0, 0x81, Some(2047), 0, 2),
    row!(CNT, PV, 0x89, 4095, 0x8000, 0x81, Some(2047), 0x0800, 2),
    row!(DM, Bit, 0x02, 32767, 0, 0x00, None, 0, 1),
    row!(DM, Word, 0x82, 32767, 0, 0x82, Some(32767), 0, 2),
    row!(IR, PV, 0xDC, 15, 0x0100, 0x00, None, 0, 4),
    row!(DR, PV, 0xBC, 15, 0x0200, 0x9C, Some(2), 0x03, 2),
];

/// Looks up the registry row for an `(area, data_type)` pair.
///
/// # Errors
///
/// Returns [`FinsError::InvalidAddressing`] if the pair has no entry at all,
/// regardless of dialect.
///
/// # Example
///
/// ```
/// use fins_link::memory::{lookup, Area, DataType};
///
/// let row = lookup(Area::CIO, DataType::Bit).unwrap();
/// assert_eq!(row.new_code, 0x30);
/// ```
pub fn lookup(area: Area, data_type: DataType) -> Result<&'static RegistryEntry> {
    REGISTRY
        .iter()
        .find(|row| row.area == area && row.data_type == data_type)
        .ok_or_else(|| {
            FinsError::invalid_addressing(format!("no registry entry for {area} {data_type}"))
        })
}
