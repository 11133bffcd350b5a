//! The transport state machine shared by both carriers (spec §4.7).
//!
//! Both [`super::datagram::DatagramTransport`] and
//! [`super::stream::StreamTransport`] embed one [`StateMachine`] and drive
//! it through `enter_connecting`/`mark_connected`/`mark_disconnected`/
//! `close` as their I/O succeeds or fails. The machine itself owns no
//! socket; it only tracks the current state, notifies the subscriber, and
//! arms the reconnect timer.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use log::info;

/// The lifecycle state of a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    /// No `open()` has ever been attempted.
    Unknown,
    /// An `open()` is in flight (dialing, or performing the stream
    /// handshake).
    Connecting,
    /// The transport can carry requests.
    Connected,
    /// A prior `open()` or an I/O error failed; a reconnect may be armed.
    Disconnected,
    /// `close()` was called; terminal until a new transport is created.
    Closed,
}

/// A single-subscriber state-change callback: `(old, new)`.
pub type StateChangeCallback = Box<dyn Fn(TransportState, TransportState) + Send + 'static>;

struct Inner {
    state: TransportState,
    subscriber: Option<StateChangeCallback>,
}

/// Mutex-guarded state word plus reconnect timer, shared by both
/// transports.
///
/// One [`StateMachine`] instance is wrapped in an `Arc` so that the
/// reconnect timer's background thread can reach it without borrowing the
/// owning transport.
pub struct StateMachine {
    inner: Mutex<Inner>,
    label: String,
}

impl StateMachine {
    /// Creates a new machine in `Unknown`, labeled (for logging) with the
    /// transport's configured address.
    pub fn new(label: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner {
                state: TransportState::Unknown,
                subscriber: None,
            }),
            label: label.into(),
        })
    }

    /// Returns the current state.
    pub fn state(&self) -> TransportState {
        self.inner.lock().unwrap().state
    }

    /// Registers the single state-change subscriber, replacing any
    /// previous one.
    pub fn on_state_change(&self, callback: StateChangeCallback) {
        self.inner.lock().unwrap().subscriber = Some(callback);
    }

    /// Transitions to `new_state`, notifying the subscriber if the state
    /// actually changed.
    fn transition(&self, new_state: TransportState) {
        let mut guard = self.inner.lock().unwrap();
        let old_state = guard.state;
        if old_state == new_state {
            return;
        }
        guard.state = new_state;
        info!(
            target: "fins_link::transport",
            "{}: {:?} -> {:?}",
            self.label, old_state, new_state
        );
        if let Some(callback) = guard.subscriber.as_ref() {
            callback(old_state, new_state);
        }
    }

    /// Marks the start of a connection attempt. No-op if already
    /// `Connected` (idempotent open, per spec §4.7).
    pub fn enter_connecting(&self) -> bool {
        if self.inner.lock().unwrap().state == TransportState::Connected {
            return false;
        }
        self.transition(TransportState::Connecting);
        true
    }

    /// Marks a successful connection attempt.
    pub fn mark_connected(&self) {
        self.transition(TransportState::Connected);
    }

    /// Marks a failed connection attempt or a runtime I/O failure, and
    /// arms the reconnect timer if `reconnection_interval` is positive.
    pub fn mark_disconnected(self: &Arc<Self>, reconnection_interval: Duration, reopen: impl Fn() + Send + 'static) {
        self.transition(TransportState::Disconnected);
        if reconnection_interval.is_zero() {
            return;
        }
        let machine = Arc::clone(self);
        let label = self.label.clone();
        thread::spawn(move || {
            thread::sleep(reconnection_interval);
            if machine.state() != TransportState::Disconnected {
                return;
            }
            info!(target: "fins_link::transport", "{label}: reconnect timer fired");
            reopen();
        });
    }

    /// Marks the transport closed; terminal.
    pub fn close(&self) {
        self.transition(TransportState::Closed);
    }
}
