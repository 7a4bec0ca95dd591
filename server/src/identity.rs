use system::ParticipantId;

/// Hands out participant ids. Ids are never reused within a process.
#[derive(Debug, Default)]
pub struct IdentityAllocator {
    next: ParticipantId,
}

impl IdentityAllocator {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    pub fn next_id(&mut self) -> ParticipantId {
        let id = self.next;
        self.next += 1;
        id
    }
}
