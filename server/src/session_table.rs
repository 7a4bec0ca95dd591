use crate::broadcast::ConnectionTx;
use std::collections::HashMap;
use system::serde_json::Value;
use system::{ConnectionHandle, Participant, ParticipantId, Speaker};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionTableError {
    #[error("connection {0} is already seated")]
    DuplicateConnection(ConnectionHandle),
    #[error("participant {0} is already seated")]
    DuplicateParticipant(ParticipantId),
    #[error("connection {0} is not seated")]
    UnknownConnection(ConnectionHandle),
}

/// One live connection: its participant record and its outbound queue.
#[derive(Debug)]
pub struct Seat {
    pub participant: Participant,
    pub tx: ConnectionTx,
}

/// A single mutable field of a participant.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Code(String),
    Editor(Value),
    Speaker(Speaker),
}

/// Live connections and the participants they own.
///
/// Seats are keyed by connection handle. The id index is derived from the
/// seats and only ever touched together with them.
#[derive(Debug, Default)]
pub struct SessionTable {
    seats: HashMap<ConnectionHandle, Seat>,
    handles_by_id: HashMap<ParticipantId, ConnectionHandle>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self {
            seats: HashMap::new(),
            handles_by_id: HashMap::new(),
        }
    }

    pub fn contains(&self, handle: ConnectionHandle) -> bool {
        self.seats.contains_key(&handle)
    }

    pub fn insert(
        &mut self,
        handle: ConnectionHandle,
        participant: Participant,
        tx: ConnectionTx,
    ) -> Result<(), SessionTableError> {
        if self.seats.contains_key(&handle) {
            return Err(SessionTableError::DuplicateConnection(handle));
        }
        if self.handles_by_id.contains_key(&participant.id) {
            return Err(SessionTableError::DuplicateParticipant(participant.id));
        }
        self.handles_by_id.insert(participant.id, handle);
        self.seats.insert(handle, Seat { participant, tx });
        Ok(())
    }

    pub fn remove(&mut self, handle: ConnectionHandle) -> Result<Seat, SessionTableError> {
        let seat = self
            .seats
            .remove(&handle)
            .ok_or(SessionTableError::UnknownConnection(handle))?;
        self.handles_by_id.remove(&seat.participant.id);
        Ok(seat)
    }

    pub fn get(&self, handle: ConnectionHandle) -> Result<&Participant, SessionTableError> {
        self.seats
            .get(&handle)
            .map(|seat| &seat.participant)
            .ok_or(SessionTableError::UnknownConnection(handle))
    }

    pub fn update_field(
        &mut self,
        handle: ConnectionHandle,
        field: Field,
    ) -> Result<&Participant, SessionTableError> {
        let participant = &mut self
            .seats
            .get_mut(&handle)
            .ok_or(SessionTableError::UnknownConnection(handle))?
            .participant;
        match field {
            Field::Code(code) => participant.code = code,
            Field::Editor(editor) => participant.editor = Some(editor),
            Field::Speaker(speaker) => participant.speaker = speaker,
        }
        Ok(participant)
    }

    pub fn handle_of(&self, id: ParticipantId) -> Option<ConnectionHandle> {
        self.handles_by_id.get(&id).copied()
    }

    /// Every participant, ordered by id.
    pub fn snapshot_all(&self) -> Vec<Participant> {
        let mut participants: Vec<_> = self
            .seats
            .values()
            .map(|seat| seat.participant.clone())
            .collect();
        participants.sort_by_key(|p| p.id);
        participants
    }

    pub fn seats(&self) -> impl Iterator<Item = (&ConnectionHandle, &Seat)> {
        self.seats.iter()
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::ConnectionEvent;
    use system::serde_json::json;
    use tokio::sync::mpsc::{channel, Receiver};

    fn tx() -> (ConnectionTx, Receiver<ConnectionEvent>) {
        channel(1)
    }

    #[test]
    fn it_rejects_a_second_seat_for_the_same_connection() {
        let mut table = SessionTable::new();
        let (a, _ra) = tx();
        let (b, _rb) = tx();
        table.insert(1, Participant::new(0), a).expect("");
        assert_eq!(
            table.insert(1, Participant::new(1), b),
            Err(SessionTableError::DuplicateConnection(1))
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn it_rejects_a_reused_participant_id() {
        let mut table = SessionTable::new();
        let (a, _ra) = tx();
        let (b, _rb) = tx();
        table.insert(1, Participant::new(0), a).expect("");
        assert_eq!(
            table.insert(2, Participant::new(0), b),
            Err(SessionTableError::DuplicateParticipant(0))
        );
        assert_eq!(table.handle_of(0), Some(1));
    }

    #[test]
    fn it_forgets_removed_connections() {
        let mut table = SessionTable::new();
        let (a, _ra) = tx();
        table.insert(1, Participant::new(0), a).expect("");

        let seat = table.remove(1).expect("");
        assert_eq!(seat.participant.id, 0);
        assert!(table.is_empty());
        assert_eq!(table.handle_of(0), None);
        assert_eq!(
            table.remove(1).map(|s| s.participant),
            Err(SessionTableError::UnknownConnection(1))
        );
        assert_eq!(table.get(1), Err(SessionTableError::UnknownConnection(1)));
    }

    #[test]
    fn it_updates_fields_in_place() {
        let mut table = SessionTable::new();
        let (a, _ra) = tx();
        table.insert(4, Participant::new(2), a).expect("");

        table.update_field(4, Field::Code("saw(440)".into())).expect("");
        table
            .update_field(4, Field::Editor(json!({"cursor": 3})))
            .expect("");
        let speaker = Speaker {
            x: 1.0,
            y: 2.0,
            angle: 0.5,
        };
        let participant = table.update_field(4, Field::Speaker(speaker)).expect("");

        assert_eq!(participant.code, "saw(440)");
        assert_eq!(participant.editor, Some(json!({"cursor": 3})));
        assert_eq!(participant.speaker, speaker);
        assert!(table.update_field(5, Field::Code("x".into())).is_err());
    }

    #[test]
    fn it_snapshots_participants_in_id_order() {
        let mut table = SessionTable::new();
        let mut keep = Vec::new();
        for (handle, id) in [(10, 2), (11, 0), (12, 1)].iter() {
            let (t, r) = tx();
            keep.push(r);
            table.insert(*handle, Participant::new(*id), t).expect("");
        }
        let ids: Vec<_> = table.snapshot_all().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
