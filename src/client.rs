//! Command dispatcher for communicating with Omron PLCs.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use crate::address::LogicalAddress;
use crate::command::{self, MEMORY_READ, MEMORY_WRITE, MULTIPLE_MEMORY_READ};
use crate::error::{FinsError, Result};
use crate::header::{Class, FinsHeader, NodeAddress};
use crate::memory::Dialect;
use crate::response::FinsResponse;
use crate::transport::{
    DatagramTransport, StateChangeCallback, StreamTransport, Transport, TransportState,
    DEFAULT_FINS_PORT, DEFAULT_RECONNECTION_INTERVAL, DEFAULT_TIMEOUT,
};
use crate::value::Value;

/// Which carrier a [`Client`] speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Connectionless UDP, fixed node addresses (spec §4.6).
    Datagram,
    /// Connection-oriented TCP with node-address handshake (spec §4.7).
    Stream,
}

/// Configuration for creating a FINS client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// PLC address (and port; defaults to [`DEFAULT_FINS_PORT`]).
    pub plc_addr: SocketAddr,
    /// PLC dialect (address encoding table variant).
    pub dialect: Dialect,
    /// Which carrier to use.
    pub transport_kind: TransportKind,
    /// Source (this client's) node address.
    pub source: NodeAddress,
    /// Destination (the PLC's) node address.
    pub destination: NodeAddress,
    /// Connect deadline (stream transport only).
    pub connect_timeout: Duration,
    /// Read deadline.
    pub read_timeout: Duration,
    /// Write deadline.
    pub write_timeout: Duration,
    /// One-shot reconnection interval; `Duration::ZERO` disables automatic
    /// reconnection.
    pub reconnection_interval: Duration,
}

impl ClientConfig {
    /// Creates a new client configuration with minimal required parameters.
    ///
    /// # Example
    ///
    /// ```
    /// use fins_link::client::{ClientConfig, TransportKind};
    /// use fins_link::memory::Dialect;
    /// use std::net::Ipv4Addr;
    ///
    /// let config = ClientConfig::new(
    ///     Ipv4Addr::new(192, 168, 1, 10),
    ///     Dialect::New,
    ///     TransportKind::Datagram,
    ///     1,
    ///     10,
    /// );
    /// ```
    pub fn new(
        plc_ip: std::net::Ipv4Addr,
        dialect: Dialect,
        transport_kind: TransportKind,
        source_node: u8,
        dest_node: u8,
    ) -> Self {
        Self {
            plc_addr: SocketAddr::from((plc_ip, DEFAULT_FINS_PORT)),
            dialect,
            transport_kind,
            source: NodeAddress::new(0, source_node, 0),
            destination: NodeAddress::new(0, dest_node, 0),
            connect_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
            write_timeout: DEFAULT_TIMEOUT,
            reconnection_interval: DEFAULT_RECONNECTION_INTERVAL,
        }
    }

    /// Sets a custom PLC port (default is 9600).
    pub fn with_port(mut self, port: u16) -> Self {
        self.plc_addr.set_port(port);
        self
    }

    /// Sets a uniform connect/read/write timeout (default is 3 seconds each).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self.read_timeout = timeout;
        self.write_timeout = timeout;
        self
    }

    /// Sets the one-shot reconnection interval (default 10s).
    pub fn with_reconnection_interval(mut self, interval: Duration) -> Self {
        self.reconnection_interval = interval;
        self
    }

    /// Sets a custom source network address.
    pub fn with_source_network(mut self, network: u8) -> Self {
        self.source.network = network;
        self
    }

    /// Sets a custom source unit address.
    pub fn with_source_unit(mut self, unit: u8) -> Self {
        self.source.unit = unit;
        self
    }

    /// Sets a custom destination network address.
    pub fn with_dest_network(mut self, network: u8) -> Self {
        self.destination.network = network;
        self
    }

    /// Sets a custom destination unit address.
    pub fn with_dest_unit(mut self, unit: u8) -> Self {
        self.destination.unit = unit;
        self
    }
}

/// FINS command dispatcher.
///
/// Each of [`read`](Client::read), [`write`](Client::write), and
/// [`random_read`](Client::random_read) is exactly one request and one
/// response; there is no retrying, polling, or caching above the transport.
///
/// # Example
///
/// ```no_run
/// use fins_link::address::LogicalAddress;
/// use fins_link::client::{Client, ClientConfig, TransportKind};
/// use fins_link::memory::{Area, DataType, Dialect};
/// use std::net::Ipv4Addr;
///
/// let config = ClientConfig::new(
///     Ipv4Addr::new(192, 168, 1, 10),
///     Dialect::New,
///     TransportKind::Datagram,
///     1,
///     10,
/// );
/// let client = Client::new(config);
/// client.open().unwrap();
///
/// let address = LogicalAddress::word(Area::DM, DataType::Word, 100);
/// let values = client.read(address, 10).unwrap();
/// println!("read {} words", values.len());
/// ```
pub struct Client {
    transport: Box<dyn Transport + Send + Sync>,
    source: NodeAddress,
    destination: NodeAddress,
    dialect: Dialect,
    sid_counter: AtomicU8,
}

impl Client {
    /// Builds a client for `config`. Does not open the transport; call
    /// [`Client::open`] before issuing requests.
    pub fn new(config: ClientConfig) -> Self {
        let transport: Box<dyn Transport + Send + Sync> = match config.transport_kind {
            TransportKind::Datagram => Box::new(
                DatagramTransport::with_timeouts(
                    config.plc_addr,
                    config.read_timeout,
                    config.write_timeout,
                )
                .with_reconnection_interval(config.reconnection_interval),
            ),
            TransportKind::Stream => Box::new(
                StreamTransport::new(config.plc_addr)
                    .with_reconnection_interval(config.reconnection_interval),
            ),
        };

        Self {
            transport,
            source: config.source,
            destination: config.destination,
            dialect: config.dialect,
            sid_counter: AtomicU8::new(0),
        }
    }

    /// Opens the underlying transport. Idempotent if already `Connected`.
    pub fn open(&self) -> Result<()> {
        self.transport.open()
    }

    /// Closes the underlying transport; terminal, per spec §4.7.
    pub fn close(&self) {
        self.transport.close()
    }

    /// Returns the transport's current lifecycle state.
    pub fn state(&self) -> TransportState {
        self.transport.state()
    }

    /// Registers the single transport state-change subscriber.
    pub fn on_state_change(&self, callback: StateChangeCallback) {
        self.transport.on_state_change(callback);
    }

    fn next_sid(&self) -> u8 {
        self.sid_counter.fetch_add(1, Ordering::Relaxed)
    }

    fn exchange(&self, command: (u8, u8), sid: u8, body: Vec<u8>) -> Result<FinsResponse> {
        let header = FinsHeader::build(Class::Command, true, sid, self.destination, self.source);
        let response_bytes = self.transport.send_receive(header, &body)?;
        let response = FinsResponse::from_bytes(&response_bytes)?;

        if response.header.sid != sid {
            let err = FinsError::sid_mismatch(sid, response.header.sid);
            self.transport.disconnect();
            return Err(err);
        }
        response.check_echo(command)?;
        response.check_error()?;
        Ok(response)
    }

    /// Reads `length` consecutive values starting at `address` (spec §4.5).
    ///
    /// # Errors
    ///
    /// Returns [`FinsError::EmptyRequest`] if `length == 0`.
    pub fn read(&self, address: LogicalAddress, length: u16) -> Result<Vec<Value>> {
        let item_size = address.item_size()?;
        let sid = self.next_sid();
        let mut body = vec![MEMORY_READ.0, MEMORY_READ.1];
        body.extend_from_slice(&command::read_body(address, length, self.dialect)?);

        let response = self.exchange(MEMORY_READ, sid, body)?;
        command::split_read_payload(address, length, item_size, response.payload())?
            .into_iter()
            .map(|(addr, buf)| Value::new(addr, buf))
            .collect()
    }

    /// Writes `values` starting at `address` (spec §4.5).
    ///
    /// # Errors
    ///
    /// Returns [`FinsError::EmptyRequest`] if `values` is empty.
    pub fn write(&self, address: LogicalAddress, values: &[Value]) -> Result<()> {
        let sid = self.next_sid();
        let bufs: Vec<Vec<u8>> = values.iter().map(|value| value.buf.clone()).collect();
        let mut body = vec![MEMORY_WRITE.0, MEMORY_WRITE.1];
        body.extend_from_slice(&command::write_body(address, &bufs, self.dialect)?);

        self.exchange(MEMORY_WRITE, sid, body)?;
        Ok(())
    }

    /// Reads one value per address in `addresses`, each at its own logical
    /// address (spec §4.5).
    ///
    /// # Errors
    ///
    /// Returns [`FinsError::EmptyRequest`] if `addresses` is empty.
    pub fn random_read(&self, addresses: &[LogicalAddress]) -> Result<Vec<Value>> {
        let sid = self.next_sid();
        let mut body = vec![MULTIPLE_MEMORY_READ.0, MULTIPLE_MEMORY_READ.1];
        body.extend_from_slice(&command::random_read_body(addresses, self.dialect)?);

        let response = self.exchange(MULTIPLE_MEMORY_READ, sid, body)?;
        command::split_random_read_payload(addresses, response.payload())?
            .into_iter()
            .map(|(addr, buf)| Value::new(addr, buf))
            .collect()
    }

    /// Returns the configured source node address.
    pub fn source(&self) -> NodeAddress {
        self.source
    }

    /// Returns the configured destination node address.
    pub fn destination(&self) -> NodeAddress {
        self.destination
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("source", &self.source)
            .field("destination", &self.destination)
            .field("dialect", &self.dialect)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn config_defaults() {
        let config = ClientConfig::new(
            Ipv4Addr::new(192, 168, 1, 10),
            Dialect::New,
            TransportKind::Datagram,
            1,
            10,
        );
        assert_eq!(config.plc_addr.port(), DEFAULT_FINS_PORT);
        assert_eq!(config.source.node, 1);
        assert_eq!(config.destination.node, 10);
        assert_eq!(config.reconnection_interval, DEFAULT_RECONNECTION_INTERVAL);
    }

    #[test]
    fn config_builders() {
        let config = ClientConfig::new(
            Ipv4Addr::new(192, 168, 1, 10),
            Dialect::New,
            TransportKind::Stream,
            1,
            10,
        )
        .with_port(9601)
        .with_timeout(Duration::from_secs(5))
        .with_source_network(1)
        .with_dest_network(2)
        .with_reconnection_interval(Duration::ZERO);

        assert_eq!(config.plc_addr.port(), 9601);
        assert_eq!(config.read_timeout, Duration::from_secs(5));
        assert_eq!(config.source.network, 1);
        assert_eq!(config.destination.network, 2);
        assert_eq!(config.reconnection_interval, Duration::ZERO);
    }

    #[test]
    fn client_starts_unknown_and_sid_increments() {
        let config = ClientConfig::new(
            Ipv4Addr::new(127, 0, 0, 1),
            Dialect::New,
            TransportKind::Datagram,
            1,
            10,
        );
        let client = Client::new(config);
        assert_eq!(client.state(), TransportState::Unknown);
        assert_eq!(client.next_sid(), 0);
        assert_eq!(client.next_sid(), 1);
        assert_eq!(client.next_sid(), 2);
    }

    #[test]
    fn read_before_open_fails_not_connected() {
        use crate::memory::{Area, DataType};

        let config = ClientConfig::new(
            Ipv4Addr::new(127, 0, 0, 1),
            Dialect::New,
            TransportKind::Datagram,
            1,
            10,
        )
        .with_port(9)
        .with_timeout(Duration::from_millis(50));
        let client = Client::new(config);
        let address = LogicalAddress::word(Area::DM, DataType::Word, 0);
        assert!(matches!(
            client.read(address, 1),
            Err(FinsError::NotConnected)
        ));
    }

    #[test]
    fn client_debug() {
        let config = ClientConfig::new(
            Ipv4Addr::new(127, 0, 0, 1),
            Dialect::New,
            TransportKind::Datagram,
            1,
            10,
        );
        let client = Client::new(config);
        let debug_str = format!("{:?}", client);
        assert!(debug_str.contains("Client"));
    }
}
