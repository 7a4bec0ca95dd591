use serde::{Deserialize, Serialize};

pub type ParticipantId = u64;
pub type ConnectionHandle = usize;

/// Sentinel editor contents every participant starts with.
pub const DEFAULT_CODE: &str = "0";

/// Spatial state of a participant's speaker on the shared field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Speaker {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

impl std::default::Default for Speaker {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            angle: 0.0,
        }
    }
}

/// Last-known shared state of one connected client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub code: String,
    pub editor: Option<serde_json::Value>,
    pub speaker: Speaker,
}

impl Participant {
    pub fn new(id: ParticipantId) -> Self {
        Self {
            id,
            code: DEFAULT_CODE.to_owned(),
            editor: None,
            speaker: Speaker::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn it_starts_with_default_state() {
        let participant = Participant::new(7);
        assert_eq!(participant.code, "0");
        assert_eq!(participant.editor, None);
        assert_eq!(participant.speaker, Speaker::default());
    }

    #[test]
    fn it_serializes_with_client_field_names() {
        let value = serde_json::to_value(Participant::new(3)).expect("");
        assert_eq!(
            value,
            json!({
                "id": 3,
                "code": "0",
                "editor": null,
                "speaker": { "x": 0.0, "y": 0.0, "angle": 0.0 },
            })
        );
    }
}
