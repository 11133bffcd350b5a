//! TCP ("stream") transport.
//!
//! Wraps every application frame in the 16-byte outer header of
//! [`crate::outer`] and performs a node-address handshake immediately
//! after dialing (spec §4.7). There is no precedent for this framing in
//! the teacher's own transport, which only ever spoke UDP; the handshake
//! and outer-header bookkeeping below follow the specification text
//! directly.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, info, warn};

use super::state::StateMachine;
use super::{Transport, TransportState, DEFAULT_RECONNECTION_INTERVAL, DEFAULT_TIMEOUT};
use crate::error::{FinsError, Result};
use crate::header::FinsHeader;
use crate::outer::{OuterHeader, CMD_FRAMED_DATA, CMD_NODE_ADDRESS_REPLY, OUTER_HEADER_SIZE};

const HANDSHAKE_REPLY_TAIL: usize = 8;
const RESPONSE_HEADER_SIZE: usize = 14;

/// TCP transport for FINS communication, framed with the stream outer
/// header.
pub struct StreamTransport {
    remote_addr: SocketAddr,
    connect_timeout: Duration,
    read_timeout: Duration,
    write_timeout: Duration,
    reconnection_interval: Duration,
    conn: Arc<Mutex<Option<Connection>>>,
    machine: Arc<StateMachine>,
}

struct Connection {
    stream: TcpStream,
    /// Node byte this client learned at handshake (`sa1` on outgoing
    /// frames).
    local_node: u8,
    /// Node byte the server reported for itself (`da1` on outgoing
    /// frames).
    remote_node: u8,
}

impl StreamTransport {
    /// Creates a new, unopened stream transport for `remote_addr`.
    pub fn new(remote_addr: SocketAddr) -> Self {
        Self {
            remote_addr,
            connect_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
            write_timeout: DEFAULT_TIMEOUT,
            reconnection_interval: DEFAULT_RECONNECTION_INTERVAL,
            conn: Arc::new(Mutex::new(None)),
            machine: StateMachine::new(remote_addr.to_string()),
        }
    }

    /// Overrides the reconnection interval (default 10s; `Duration::ZERO`
    /// disables automatic reconnection).
    pub fn with_reconnection_interval(mut self, interval: Duration) -> Self {
        self.reconnection_interval = interval;
        self
    }

    fn dial_and_handshake(&self) -> Result<Connection> {
        redial_and_handshake(
            self.remote_addr,
            self.connect_timeout,
            self.read_timeout,
            self.write_timeout,
        )
    }

    /// Builds the closure the reconnect timer invokes: redial, re-handshake,
    /// and on success transition back to `Connected`; on failure, rearm.
    fn reopen_action(&self) -> Box<dyn Fn() + Send + 'static> {
        reopen_loop(
            Arc::clone(&self.conn),
            Arc::clone(&self.machine),
            self.remote_addr,
            self.connect_timeout,
            self.read_timeout,
            self.write_timeout,
            self.reconnection_interval,
        )
    }

    fn fail(&self, err: FinsError) -> FinsError {
        warn!(target: "fins_link::transport", "{}: {err}", self.remote_addr);
        *self.conn.lock().unwrap() = None;
        let interval = self.reconnection_interval;
        self.machine.mark_disconnected(interval, self.reopen_action());
        err
    }
}

fn redial_and_handshake(
    remote_addr: SocketAddr,
    connect_timeout: Duration,
    read_timeout: Duration,
    write_timeout: Duration,
) -> Result<Connection> {
    let mut stream = TcpStream::connect_timeout(&remote_addr, connect_timeout)?;
    stream.set_read_timeout(Some(read_timeout))?;
    stream.set_write_timeout(Some(write_timeout))?;

    let mut request = OuterHeader::handshake_request().to_bytes().to_vec();
    request.extend_from_slice(&0u32.to_be_bytes());
    stream.write_all(&request)?;

    let mut outer_buf = [0u8; OUTER_HEADER_SIZE];
    stream.read_exact(&mut outer_buf)?;
    let outer = OuterHeader::from_bytes(&outer_buf)?;
    if outer.error != 0 {
        return Err(FinsError::StreamError(outer.error));
    }
    if outer.command != CMD_NODE_ADDRESS_REPLY || outer.length != 16 {
        return Err(FinsError::invalid_response(format!(
            "unexpected handshake reply: command={}, length={}",
            outer.command, outer.length
        )));
    }

    let mut tail = [0u8; HANDSHAKE_REPLY_TAIL];
    stream.read_exact(&mut tail)?;
    let client_node = u32::from_be_bytes(tail[0..4].try_into().unwrap());
    let server_node = u32::from_be_bytes(tail[4..8].try_into().unwrap());

    Ok(Connection {
        stream,
        local_node: (client_node & 0xFF) as u8,
        remote_node: (server_node & 0xFF) as u8,
    })
}

/// Builds a self-rearming reconnect action: redial and re-handshake, and on
/// failure arm the timer again with the same action.
fn reopen_loop(
    conn: Arc<Mutex<Option<Connection>>>,
    machine: Arc<StateMachine>,
    remote_addr: SocketAddr,
    connect_timeout: Duration,
    read_timeout: Duration,
    write_timeout: Duration,
    reconnection_interval: Duration,
) -> Box<dyn Fn() + Send + 'static> {
    Box::new(move || {
        machine.enter_connecting();
        match redial_and_handshake(remote_addr, connect_timeout, read_timeout, write_timeout) {
            Ok(new_conn) => {
                *conn.lock().unwrap() = Some(new_conn);
                machine.mark_connected();
            }
            Err(_) => {
                let next = reopen_loop(
                    Arc::clone(&conn),
                    Arc::clone(&machine),
                    remote_addr,
                    connect_timeout,
                    read_timeout,
                    write_timeout,
                    reconnection_interval,
                );
                machine.mark_disconnected(reconnection_interval, next);
            }
        }
    })
}

impl Transport for StreamTransport {
    fn open(&self) -> Result<()> {
        if self.machine.state() == TransportState::Connected {
            return Ok(());
        }
        self.machine.enter_connecting();
        match self.dial_and_handshake() {
            Ok(conn) => {
                info!(
                    target: "fins_link::transport",
                    "{}: handshake complete, local_node={} remote_node={}",
                    self.remote_addr, conn.local_node, conn.remote_node
                );
                *self.conn.lock().unwrap() = Some(conn);
                self.machine.mark_connected();
                Ok(())
            }
            Err(err) => {
                let interval = self.reconnection_interval;
                self.machine.mark_disconnected(interval, self.reopen_action());
                Err(err)
            }
        }
    }

    fn close(&self) {
        *self.conn.lock().unwrap() = None;
        self.machine.close();
    }

    fn disconnect(&self) {
        *self.conn.lock().unwrap() = None;
        let interval = self.reconnection_interval;
        self.machine.mark_disconnected(interval, self.reopen_action());
    }

    fn send_receive(&self, mut header: FinsHeader, body: &[u8]) -> Result<Vec<u8>> {
        if self.machine.state() != TransportState::Connected {
            return Err(FinsError::NotConnected);
        }

        let mut guard = self.conn.lock().unwrap();
        let conn = guard.as_mut().ok_or(FinsError::NotConnected)?;

        header.da1 = conn.remote_node;
        header.sa1 = conn.local_node;

        let mut inner = header.to_bytes().to_vec();
        inner.extend_from_slice(body);

        let outer = OuterHeader::framed(inner.len());
        let mut frame = outer.to_bytes().to_vec();
        frame.extend_from_slice(&inner);

        debug!(target: "fins_link::transport", "{}: send {} bytes", self.remote_addr, frame.len());

        if let Err(err) = conn.stream.write_all(&frame) {
            drop(guard);
            return Err(self.fail(FinsError::Io(err)));
        }

        match read_response(&mut conn.stream) {
            Ok(response) => Ok(response),
            Err(err) => {
                drop(guard);
                Err(self.fail(err))
            }
        }
    }

    fn state(&self) -> TransportState {
        self.machine.state()
    }

    fn on_state_change(&self, callback: super::StateChangeCallback) {
        self.machine.on_state_change(callback);
    }
}

fn read_response(stream: &mut TcpStream) -> Result<Vec<u8>> {
    let mut outer_buf = [0u8; OUTER_HEADER_SIZE];
    stream.read_exact(&mut outer_buf)?;
    let outer = OuterHeader::from_bytes(&outer_buf)?;

    if outer.error != 0 {
        let drain_len = (outer.length as usize).saturating_sub(HANDSHAKE_REPLY_TAIL);
        let mut drain = vec![0u8; drain_len];
        let _ = stream.read_exact(&mut drain);
        return Err(FinsError::StreamError(outer.error));
    }
    if outer.command != CMD_FRAMED_DATA {
        return Err(FinsError::invalid_response(format!(
            "unexpected response command {}",
            outer.command
        )));
    }

    let mut header = vec![0u8; RESPONSE_HEADER_SIZE];
    stream.read_exact(&mut header)?;

    let payload_len = (outer.length as usize).saturating_sub(HANDSHAKE_REPLY_TAIL + RESPONSE_HEADER_SIZE);
    let mut payload = vec![0u8; payload_len];
    stream.read_exact(&mut payload)?;

    header.extend_from_slice(&payload);
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{Class, NodeAddress};
    use std::net::TcpListener;
    use std::thread;

    fn spawn_server(listener: TcpListener, response_payload: Vec<u8>) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();

            let mut req = [0u8; 20];
            stream.read_exact(&mut req).unwrap();

            let mut reply = OuterHeader {
                length: 16,
                command: CMD_NODE_ADDRESS_REPLY,
                error: 0,
            }
            .to_bytes()
            .to_vec();
            reply.extend_from_slice(&1u32.to_be_bytes());
            reply.extend_from_slice(&10u32.to_be_bytes());
            stream.write_all(&reply).unwrap();

            let mut outer_buf = [0u8; OUTER_HEADER_SIZE];
            stream.read_exact(&mut outer_buf).unwrap();
            let outer = OuterHeader::from_bytes(&outer_buf).unwrap();
            let mut inner = vec![0u8; outer.length as usize - HANDSHAKE_REPLY_TAIL];
            stream.read_exact(&mut inner).unwrap();

            let mut response_header = [
                0xC0, 0x00, 0x02, 0x00, 0x0A, 0x00, 0x00, 0x01, 0x00, 0x01, // header
                0x01, 0x01, // mrc/src
                0x00, 0x00, // e0/e1
            ]
            .to_vec();
            response_header.extend_from_slice(&response_payload);

            let outer_reply = OuterHeader::framed(response_header.len());
            let mut out = outer_reply.to_bytes().to_vec();
            out.extend_from_slice(&response_header);
            stream.write_all(&out).unwrap();
        })
    }

    #[test]
    fn handshake_and_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = spawn_server(listener, vec![0xAA, 0xBB]);

        let transport = StreamTransport::new(addr);
        transport.open().unwrap();
        assert_eq!(transport.state(), TransportState::Connected);

        let header = FinsHeader::build(
            Class::Command,
            true,
            0x01,
            NodeAddress::local(),
            NodeAddress::local(),
        );
        let response = transport.send_receive(header, &[0x01, 0x02]).unwrap();
        assert_eq!(&response[14..], &[0xAA, 0xBB]);

        handle.join().unwrap();
    }

    #[test]
    fn send_receive_before_open_fails() {
        let transport = StreamTransport::new("127.0.0.1:9600".parse().unwrap());
        let header = FinsHeader::build(
            Class::Command,
            true,
            0,
            NodeAddress::local(),
            NodeAddress::local(),
        );
        assert!(matches!(
            transport.send_receive(header, &[]),
            Err(FinsError::NotConnected)
        ));
    }

    #[test]
    fn open_against_closed_port_fails_and_disconnects() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = StreamTransport::new(addr)
            .with_reconnection_interval(Duration::ZERO);
        assert!(transport.open().is_err());
        assert_eq!(transport.state(), TransportState::Disconnected);
    }
}
