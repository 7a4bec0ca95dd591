use crate::session_table::SessionTable;
use system::{encode_server_message, ConnectionHandle, ServerMessage};
use tokio::sync::mpsc::error::TrySendError;

/// Per-connection outbound queue length. A recipient this far behind starts
/// losing messages instead of holding everyone else up.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 64;

pub type ConnectionTx = tokio::sync::mpsc::Sender<ConnectionEvent>;

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    /// An encoded frame to write to the socket.
    Message(String),
    /// The server dropped this connection; close the socket.
    Disconnected { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipients {
    Only(ConnectionHandle),
    AllExcept(ConnectionHandle),
    All,
}

impl Recipients {
    fn includes(&self, handle: ConnectionHandle) -> bool {
        match *self {
            Recipients::Only(only) => only == handle,
            Recipients::AllExcept(except) => except != handle,
            Recipients::All => true,
        }
    }
}

/// Queues `message` for every seated connection in `recipients` without
/// waiting on any of them. Returns how many queues accepted it.
pub fn deliver(table: &SessionTable, recipients: Recipients, message: &ServerMessage) -> usize {
    let text = match encode_server_message(message) {
        Ok(text) => text,
        Err(err) => {
            log::error!("Failed to encode {:?}: {}", message, err);
            return 0;
        }
    };

    let mut delivered = 0;
    for (handle, seat) in table.seats() {
        if !recipients.includes(*handle) {
            continue;
        }
        match seat.tx.try_send(ConnectionEvent::Message(text.clone())) {
            Ok(()) => delivered += 1,
            Err(TrySendError::Full(_)) => {
                log::warn!(
                    "Outbound queue of connection {} is full, dropping a message",
                    handle
                );
            }
            Err(TrySendError::Closed(_)) => {
                log::debug!("Connection {} is closing, skipped", handle);
            }
        }
    }
    delivered
}
