use system::{ConnectionHandle, Participant, ParticipantId, ServerMessage};

use crate::broadcast::{deliver, ConnectionEvent, ConnectionTx, Recipients};
use crate::server::Server;
use crate::session_table::Seat;

impl Server {
    /// Seats a new connection, greets it privately, then announces it to
    /// everyone else.
    pub(crate) fn connect(&mut self, handle: ConnectionHandle, tx: ConnectionTx) {
        if self.table.contains(handle) {
            log::error!("Connection {} registered twice, dropping it", handle);
            if let Err(err) = tx.try_send(ConnectionEvent::Disconnected {
                reason: "duplicate connection".into(),
            }) {
                log::warn!("Could not close duplicate connection {}: {}", handle, err);
            }
            return;
        }

        let id = self.identities.next_id();
        let players = self.table.snapshot_all();
        let time = self.clock.elapsed().as_secs_f64();

        if let Err(err) = self.table.insert(handle, Participant::new(id), tx) {
            log::error!("Failed to seat connection {}: {}", handle, err);
            return;
        }
        log::info!("Connection {} joined as participant {}", handle, id);

        deliver(
            &self.table,
            Recipients::Only(handle),
            &ServerMessage::Hello { id, players, time },
        );
        deliver(
            &self.table,
            Recipients::AllExcept(handle),
            &ServerMessage::Join(id),
        );
    }

    /// Unseats a connection, whether it closed cleanly or just vanished.
    pub(crate) fn disconnect(&mut self, handle: ConnectionHandle) {
        self.unseat(handle);
    }

    /// Unseats a participant on the server's initiative and tells its socket
    /// to close. Returns false if no such participant is seated.
    pub(crate) fn kick(&mut self, id: ParticipantId, reason: &str) -> bool {
        let handle = match self.table.handle_of(id) {
            Some(handle) => handle,
            None => return false,
        };
        if let Some(seat) = self.unseat(handle) {
            if let Err(err) = seat.tx.try_send(ConnectionEvent::Disconnected {
                reason: reason.to_owned(),
            }) {
                log::warn!("Could not close connection {}: {}", handle, err);
            }
        }
        true
    }

    fn unseat(&mut self, handle: ConnectionHandle) -> Option<Seat> {
        match self.table.remove(handle) {
            Ok(seat) => {
                let id = seat.participant.id;
                log::info!("Connection {} (participant {}) left", handle, id);
                deliver(&self.table, Recipients::All, &ServerMessage::Leave(id));
                Some(seat)
            }
            Err(err) => {
                log::error!("Ignoring disconnect: {}", err);
                None
            }
        }
    }
}
