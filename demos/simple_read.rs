//! Example: reading words, bits, and random addresses from PLC memory.
//!
//! Run with: cargo run --example simple_read

use fins_link::address::LogicalAddress;
use fins_link::client::{Client, ClientConfig, TransportKind};
use fins_link::memory::{Area, DataType, Dialect};
use std::net::Ipv4Addr;

fn main() -> fins_link::error::Result<()> {
    let config = ClientConfig::new(
        Ipv4Addr::new(192, 168, 1, 250),
        Dialect::New,
        TransportKind::Datagram,
        1,
        0,
    );
    let client = Client::new(config);
    client.open()?;

    // Read a run of words from DM.
    let dm100 = LogicalAddress::word(Area::DM, DataType::Word, 100);
    let values = client.read(dm100, 10)?;
    for value in &values {
        println!("DM{} = 0x{:04X}", value.address.address, value.as_u16()?);
    }

    // Read a single bit from CIO 0.05.
    let cio_0_05 = LogicalAddress::bit(Area::CIO, 0, 5);
    let bit = client.read(cio_0_05, 1)?;
    println!("CIO 0.05 = {}", bit[0].as_bool()?);

    // Read values scattered across areas in a single exchange.
    let scattered = [
        LogicalAddress::word(Area::DM, DataType::Word, 0),
        LogicalAddress::bit(Area::CIO, 0, 0),
        LogicalAddress::word(Area::HR, DataType::Word, 10),
    ];
    let picked = client.random_read(&scattered)?;
    println!("random_read returned {} values", picked.len());

    client.close();
    Ok(())
}
