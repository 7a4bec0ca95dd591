use system::{Participant, ParticipantId};
use tokio::sync::oneshot::Sender;

#[derive(Debug)]
pub enum AdminCommand {
    ListParticipants {
        tx: Sender<Vec<Participant>>,
    },
    /// Answers `false` when no participant has that id.
    Kick {
        id: ParticipantId,
        tx: Sender<bool>,
    },
}
