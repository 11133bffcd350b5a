//! Example: writing words and bits to PLC memory over a stream transport.
//!
//! Run with: cargo run --example simple_write

use fins_link::address::LogicalAddress;
use fins_link::client::{Client, ClientConfig, TransportKind};
use fins_link::memory::{Area, DataType, Dialect};
use fins_link::value::Value;
use std::net::Ipv4Addr;

fn main() -> fins_link::error::Result<()> {
    let config = ClientConfig::new(
        Ipv4Addr::new(192, 168, 1, 250),
        Dialect::New,
        TransportKind::Stream,
        1,
        0,
    );
    let client = Client::new(config);
    client.open()?;

    let dm200 = LogicalAddress::word(Area::DM, DataType::Word, 200);
    let values = vec![
        Value::new(dm200, vec![0x12, 0x34])?,
        Value::new(dm200.offset_by(1), vec![0x56, 0x78])?,
    ];
    client.write(dm200, &values)?;
    println!("wrote {} words starting at DM200", values.len());

    let cio_0_05 = LogicalAddress::bit(Area::CIO, 0, 5);
    client.write(cio_0_05, &[Value::new(cio_0_05, vec![0x01])?])?;
    println!("set CIO 0.05");

    client.close();
    Ok(())
}
