//! UDP ("datagram") transport.
//!
//! Each request is exactly one outbound datagram; each response is
//! exactly one inbound datagram (spec §4.6). There is no outer framing —
//! the datagram boundary itself delimits the FINS frame.

use std::net::{SocketAddr, UdpSocket};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, warn};

use super::state::StateMachine;
use super::{Transport, TransportState, DEFAULT_RECONNECTION_INTERVAL, DEFAULT_TIMEOUT,
    MAX_DATAGRAM_SIZE};
use crate::error::{FinsError, Result};
use crate::header::FinsHeader;

/// Fixed destination node byte used by the datagram transport.
pub const FIXED_DA1: u8 = 0xE8;
/// Fixed source node byte used by the datagram transport.
pub const FIXED_SA1: u8 = 0x38;

/// UDP transport for FINS communication.
pub struct DatagramTransport {
    remote_addr: SocketAddr,
    write_timeout: Duration,
    read_timeout: Duration,
    reconnection_interval: Duration,
    socket: Arc<Mutex<Option<UdpSocket>>>,
    machine: Arc<StateMachine>,
}

impl DatagramTransport {
    /// Creates a new, unopened datagram transport for `remote_addr`.
    pub fn new(remote_addr: SocketAddr) -> Self {
        Self::with_timeouts(remote_addr, DEFAULT_TIMEOUT, DEFAULT_TIMEOUT)
    }

    /// Creates a new, unopened datagram transport with explicit timeouts.
    pub fn with_timeouts(
        remote_addr: SocketAddr,
        read_timeout: Duration,
        write_timeout: Duration,
    ) -> Self {
        Self {
            remote_addr,
            write_timeout,
            read_timeout,
            reconnection_interval: DEFAULT_RECONNECTION_INTERVAL,
            socket: Arc::new(Mutex::new(None)),
            machine: StateMachine::new(remote_addr.to_string()),
        }
    }

    /// Overrides the reconnection interval (default 10s; `Duration::ZERO`
    /// disables automatic reconnection).
    pub fn with_reconnection_interval(mut self, interval: Duration) -> Self {
        self.reconnection_interval = interval;
        self
    }

    fn dial(&self) -> Result<UdpSocket> {
        redial(self.remote_addr, self.read_timeout, self.write_timeout)
    }

    /// Builds the closure the reconnect timer invokes: redial and, on
    /// success, transition back to `Connected`; on failure, rearm.
    fn reopen_action(&self) -> Box<dyn Fn() + Send + 'static> {
        reopen_loop(
            Arc::clone(&self.socket),
            Arc::clone(&self.machine),
            self.remote_addr,
            self.read_timeout,
            self.write_timeout,
            self.reconnection_interval,
        )
    }

    fn fail(&self, err: FinsError) -> FinsError {
        warn!(
            target: "fins_link::transport",
            "{}: {err}", self.remote_addr
        );
        *self.socket.lock().unwrap() = None;
        let interval = self.reconnection_interval;
        self.machine.mark_disconnected(interval, self.reopen_action());
        err
    }
}

/// Builds a self-rearming reconnect action: redial, and on failure arm the
/// timer again with the same action (spec §4.7: "a single one-shot timer
/// per transport, rearmable").
fn reopen_loop(
    socket: Arc<Mutex<Option<UdpSocket>>>,
    machine: Arc<StateMachine>,
    remote_addr: SocketAddr,
    read_timeout: Duration,
    write_timeout: Duration,
    reconnection_interval: Duration,
) -> Box<dyn Fn() + Send + 'static> {
    Box::new(move || {
        machine.enter_connecting();
        match redial(remote_addr, read_timeout, write_timeout) {
            Ok(new_socket) => {
                *socket.lock().unwrap() = Some(new_socket);
                machine.mark_connected();
            }
            Err(_) => {
                let next = reopen_loop(
                    Arc::clone(&socket),
                    Arc::clone(&machine),
                    remote_addr,
                    read_timeout,
                    write_timeout,
                    reconnection_interval,
                );
                machine.mark_disconnected(reconnection_interval, next);
            }
        }
    })
}

fn redial(remote_addr: SocketAddr, read_timeout: Duration, write_timeout: Duration) -> Result<UdpSocket> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect(remote_addr)?;
    socket.set_read_timeout(Some(read_timeout))?;
    socket.set_write_timeout(Some(write_timeout))?;
    Ok(socket)
}

impl Transport for DatagramTransport {
    fn open(&self) -> Result<()> {
        if self.machine.state() == TransportState::Connected {
            return Ok(());
        }
        self.machine.enter_connecting();
        match self.dial() {
            Ok(socket) => {
                *self.socket.lock().unwrap() = Some(socket);
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
        *self.socket.lock().unwrap() = None;
        self.machine.close();
    }

    fn disconnect(&self) {
        *self.socket.lock().unwrap() = None;
        let interval = self.reconnection_interval;
        self.machine.mark_disconnected(interval, self.reopen_action());
    }

    fn send_receive(&self, mut header: FinsHeader, body: &[u8]) -> Result<Vec<u8>> {
        if self.machine.state() != TransportState::Connected {
            return Err(FinsError::NotConnected);
        }

        header.da1 = FIXED_DA1;
        header.sa1 = FIXED_SA1;

        let mut frame = header.to_bytes().to_vec();
        frame.extend_from_slice(body);

        let guard = self.socket.lock().unwrap();
        let socket = guard.as_ref().ok_or(FinsError::NotConnected)?;

        debug!(target: "fins_link::transport", "{}: send {} bytes", self.remote_addr, frame.len());
        if let Err(err) = socket.send(&frame) {
            drop(guard);
            return Err(self.fail(classify_io_error(err)));
        }

        let mut buffer = vec![0u8; MAX_DATAGRAM_SIZE];
        match socket.recv(&mut buffer) {
            Ok(size) => {
                buffer.truncate(size);
                Ok(buffer)
            }
            Err(err) => {
                drop(guard);
                Err(self.fail(classify_io_error(err)))
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

fn classify_io_error(err: std::io::Error) -> FinsError {
    match err.kind() {
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => FinsError::Timeout,
        _ => FinsError::Io(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{Class, NodeAddress};
    use std::net::UdpSocket as StdUdpSocket;

    #[test]
    fn starts_unknown_and_open_requires_a_reachable_peer() {
        let transport = DatagramTransport::new("127.0.0.1:0".parse().unwrap());
        assert_eq!(transport.state(), TransportState::Unknown);
        assert!(transport.open().is_ok());
        assert_eq!(transport.state(), TransportState::Connected);
    }

    #[test]
    fn send_receive_before_open_fails_not_connected() {
        let transport = DatagramTransport::new("127.0.0.1:9600".parse().unwrap());
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
    fn loopback_round_trip() {
        let server = StdUdpSocket::bind("127.0.0.1:0").unwrap();
        let server_addr = server.local_addr().unwrap();

        let handle = std::thread::spawn(move || {
            let mut buf = [0u8; 64];
            let (size, peer) = server.recv_from(&mut buf).unwrap();
            server.send_to(&buf[..size], peer).unwrap();
        });

        let transport = DatagramTransport::with_timeouts(
            server_addr,
            Duration::from_millis(500),
            Duration::from_millis(500),
        );
        transport.open().unwrap();

        let header = FinsHeader::build(
            Class::Command,
            true,
            0x01,
            NodeAddress::local(),
            NodeAddress::local(),
        );
        let response = transport.send_receive(header, &[0xAA, 0xBB]).unwrap();
        assert_eq!(&response[10..], &[0xAA, 0xBB]);
        assert_eq!(response[4], FIXED_DA1);
        assert_eq!(response[7], FIXED_SA1);

        handle.join().unwrap();
    }

    #[test]
    fn close_then_reopen() {
        let transport = DatagramTransport::new("127.0.0.1:0".parse().unwrap());
        transport.open().unwrap();
        transport.close();
        assert_eq!(transport.state(), TransportState::Closed);
    }
}
