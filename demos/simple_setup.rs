//! Example: connecting to a PLC and inspecting its transport state.
//!
//! Run with: cargo run --example simple_setup

use fins_link::address::LogicalAddress;
use fins_link::client::{Client, ClientConfig, TransportKind};
use fins_link::memory::{Area, DataType, Dialect};
use fins_link::transport::TransportState;
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

    client.on_state_change(Box::new(|old, new| {
        println!("transport: {old:?} -> {new:?}");
    }));

    client.open()?;
    assert_eq!(client.state(), TransportState::Connected);

    let address = LogicalAddress::word(Area::DM, DataType::Word, 0);
    let values = client.read(address, 1)?;
    println!("DM0 = 0x{:04X}", values[0].as_u16()?);

    client.close();
    Ok(())
}
