//! FINS application header structures and node addressing.
//!
//! This module defines the 10-byte FINS application header shared by both
//! transports, and the node addressing used to route frames.
//!
//! # FINS Header Structure
//!
//! | Byte | Field | Description |
//! |------|-------|-------------|
//! | 0 | ICF | Information Control Field |
//! | 1 | RSV | Reserved (always 0x00) |
//! | 2 | GCT | Gateway Count (always 0x02; see spec §3) |
//! | 3 | DNA | Destination Network Address |
//! | 4 | DA1 | Destination Node Address |
//! | 5 | DA2 | Destination Unit Address |
//! | 6 | SNA | Source Network Address |
//! | 7 | SA1 | Source Node Address |
//! | 8 | SA2 | Source Unit Address |
//! | 9 | SID | Service ID |

use crate::error::{FinsError, Result};

/// FINS application header size in bytes.
pub const FINS_HEADER_SIZE: usize = 10;

/// Gateway count used on every header this library builds; routing across
/// more than one network layer is out of scope (spec §1).
pub const GATEWAY_COUNT: u8 = 0x02;

/// Node address for FINS communication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeAddress {
    /// Network address (0 = local network).
    pub network: u8,
    /// Node address (0 = local node for destination, or source node number).
    pub node: u8,
    /// Unit address (0 = CPU unit).
    pub unit: u8,
}

impl NodeAddress {
    /// Creates a new node address.
    pub fn new(network: u8, node: u8, unit: u8) -> Self {
        Self {
            network,
            node,
            unit,
        }
    }

    /// Creates a local node address (network 0, node 0, unit 0).
    pub fn local() -> Self {
        Self::default()
    }
}

/// Whether a header describes a command or a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    /// A request issued by this library.
    Command,
    /// A reply received from the PLC.
    Response,
}

/// FINS application header (10 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinsHeader {
    /// Information Control Field.
    ///
    /// - Bit 7: always 1 (gateway).
    /// - Bit 6: 0 = command, 1 = response.
    /// - Bit 0: 0 = response required, 1 = response not required.
    pub icf: u8,
    /// Reserved byte (always 0x00).
    pub rsv: u8,
    /// Gateway Count (always [`GATEWAY_COUNT`]).
    pub gct: u8,
    /// Destination Network Address.
    pub dna: u8,
    /// Destination Node Address.
    pub da1: u8,
    /// Destination Unit Address.
    pub da2: u8,
    /// Source Network Address.
    pub sna: u8,
    /// Source Node Address.
    pub sa1: u8,
    /// Source Unit Address.
    pub sa2: u8,
    /// Service ID (used to match responses with requests).
    pub sid: u8,
}

impl FinsHeader {
    /// Builds a header per spec §4.4.
    ///
    /// For commands issued by this library, `class` is `Command`,
    /// `require_response` is `true`, and `destination`/`source` network and
    /// unit fields are always zero (local network, CPU unit); only the node
    /// byte varies, supplied by the transport.
    ///
    /// # Example
    ///
    /// ```
    /// use fins_link::header::{Class, FinsHeader, NodeAddress};
    ///
    /// let header = FinsHeader::build(
    ///     Class::Command,
    ///     true,
    ///     0x01,
    ///     NodeAddress::new(0, 10, 0),
    ///     NodeAddress::new(0, 1, 0),
    /// );
    /// assert_eq!(header.to_bytes().len(), 10);
    /// ```
    pub fn build(
        class: Class,
        require_response: bool,
        sid: u8,
        destination: NodeAddress,
        source: NodeAddress,
    ) -> Self {
        let mut icf: u8 = 0b1000_0000;
        if class == Class::Response {
            icf |= 0b0100_0000;
        }
        if !require_response {
            icf |= 0b0000_0001;
        }

        Self {
            icf,
            rsv: 0x00,
            gct: GATEWAY_COUNT,
            dna: destination.network,
            da1: destination.node,
            da2: destination.unit,
            sna: source.network,
            sa1: source.node,
            sa2: source.unit,
            sid,
        }
    }

    /// Serializes the header to bytes.
    pub fn to_bytes(self) -> [u8; FINS_HEADER_SIZE] {
        [
            self.icf, self.rsv, self.gct, self.dna, self.da1, self.da2, self.sna, self.sa1,
            self.sa2, self.sid,
        ]
    }

    /// Parses a header from bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FinsError::InvalidResponse`] if the slice is too short.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < FINS_HEADER_SIZE {
            return Err(FinsError::invalid_response(format!(
                "header too short: expected {} bytes, got {}",
                FINS_HEADER_SIZE,
                data.len()
            )));
        }

        Ok(Self {
            icf: data[0],
            rsv: data[1],
            gct: data[2],
            dna: data[3],
            da1: data[4],
            da2: data[5],
            sna: data[6],
            sa1: data[7],
            sa2: data[8],
            sid: data[9],
        })
    }

    /// Returns whether this is a response header (ICF bit 6 set).
    pub fn is_response(self) -> bool {
        (self.icf & 0x40) != 0
    }

    /// Returns the destination node address.
    pub fn destination(self) -> NodeAddress {
        NodeAddress::new(self.dna, self.da1, self.da2)
    }

    /// Returns the source node address.
    pub fn source(self) -> NodeAddress {
        NodeAddress::new(self.sna, self.sa1, self.sa2)
    }
}
