//! # fins_link
//!
//! A client library for the OMRON FINS (Factory Interface Network Service)
//! protocol, speaking to PLCs of either the newer (CS/CJ/CP/NSJ) or older
//! (CVM1/CV) dialect over either a connectionless (UDP) or connection-oriented
//! (TCP) carrier.
//!
//! This is a **protocol-only** library: no polling, schedulers, or
//! application-level retry logic. Each call produces exactly one request and
//! one response.
//!
//! ## Quick start
//!
//! ```no_run
//! use fins_link::address::LogicalAddress;
//! use fins_link::client::{Client, ClientConfig, TransportKind};
//! use fins_link::memory::{Area, DataType, Dialect};
//! use std::net::Ipv4Addr;
//!
//! fn main() -> fins_link::error::Result<()> {
//!     let config = ClientConfig::new(
//!         Ipv4Addr::new(192, 168, 1, 10),
//!         Dialect::New,
//!         TransportKind::Datagram,
//!         1,
//!         10,
//!     );
//!     let client = Client::new(config);
//!     client.open()?;
//!
//!     let address = LogicalAddress::word(Area::DM, DataType::Word, 100);
//!     let values = client.read(address, 10)?;
//!     println!("read {} words", values.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Memory areas
//!
//! | Area | Description | Word access | Bit access |
//! |------|-------------|:-----------:|:----------:|
//! | [`memory::Area::CIO`] | Core I/O: inputs, outputs, internal relays | ✓ | ✓ |
//! | [`memory::Area::WR`] | Work area: scratch bits/words | ✓ | ✓ |
//! | [`memory::Area::HR`] | Holding area: retentive bits/words | ✓ | ✓ |
//! | [`memory::Area::AR`] | Auxiliary area: system status/control | ✓ | ✓ |
//! | [`memory::Area::TIM`] | Timer area | ✓ | ✓ |
//! | [`memory::Area::CNT`] | Counter area | ✓ | ✓ |
//! | [`memory::Area::DM`] | Data Memory: numeric storage | ✓ | ✗ |
//! | [`memory::Area::IR`] | Index Register | ✓ | ✗ |
//! | [`memory::Area::DR`] | Data Register | ✓ | ✗ |
//!
//! ## Error handling
//!
//! All operations return [`error::Result<T>`]. The library never panics in
//! public code.
//!
//! ```no_run
//! use fins_link::address::LogicalAddress;
//! use fins_link::client::{Client, ClientConfig, TransportKind};
//! use fins_link::error::FinsError;
//! use fins_link::memory::{Area, DataType, Dialect};
//! use std::net::Ipv4Addr;
//!
//! let config = ClientConfig::new(
//!     Ipv4Addr::new(192, 168, 1, 10),
//!     Dialect::New,
//!     TransportKind::Datagram,
//!     1,
//!     10,
//! );
//! let client = Client::new(config);
//! client.open()?;
//!
//! let address = LogicalAddress::word(Area::DM, DataType::Word, 100);
//! match client.read(address, 10) {
//!     Ok(values) => println!("read {} values", values.len()),
//!     Err(FinsError::Timeout) => println!("communication timeout"),
//!     Err(FinsError::PlcError { main_code, sub_code }) => {
//!         println!("PLC error: main=0x{main_code:02X}, sub=0x{sub_code:02X}");
//!     }
//!     Err(e) => println!("error: {e}"),
//! }
//! # Ok::<(), FinsError>(())
//! ```
//!
//! ## Design philosophy
//!
//! 1. Each operation does exactly what it says.
//! 2. No magic or implicit behavior.
//! 3. The application has full control over retry, caching, and scheduling.
//! 4. Errors are always explicit and descriptive.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod address;
pub mod client;
pub mod command;
pub mod end_code;
pub mod error;
pub mod header;
pub mod memory;
pub mod outer;
pub mod response;
pub mod transport;
pub mod utils;
pub mod value;

// Public re-exports
pub use address::LogicalAddress;
pub use client::{Client, ClientConfig, TransportKind};
pub use error::{FinsError, Result};
pub use header::{FinsHeader, NodeAddress, FINS_HEADER_SIZE};
pub use memory::{Area, DataType, Dialect};
pub use response::FinsResponse;
pub use transport::{
    DatagramTransport, StreamTransport, Transport, TransportState, DEFAULT_FINS_PORT,
    DEFAULT_RECONNECTION_INTERVAL, DEFAULT_TIMEOUT,
};
pub use value::Value;
