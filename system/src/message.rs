use crate::{Participant, ParticipantId, Speaker};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Events a client may send. Anything outside this set is ignored on decode.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Code(String),
    Editor(Value),
    Speaker(Speaker),
    Reset,
}

impl ClientMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Code(_) => "code",
            Self::Editor(_) => "editor",
            Self::Speaker(_) => "speaker",
            Self::Reset => "reset",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum ServerMessage {
    Hello {
        id: ParticipantId,
        players: Vec<Participant>,
        time: f64,
    },
    Join(ParticipantId),
    Leave(ParticipantId),
    Code {
        state: String,
        id: ParticipantId,
    },
    Editor {
        state: Value,
        id: ParticipantId,
    },
    Speaker {
        state: Speaker,
        id: ParticipantId,
    },
    Reset,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame is not a valid event envelope: {0}")]
    Envelope(#[source] serde_json::Error),
    #[error("payload of `{kind}` does not match its schema: {source}")]
    Payload {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("`{0}` requires a payload")]
    MissingPayload(&'static str),
}

#[derive(Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Option<Value>,
}

/// Decodes one inbound text frame.
///
/// Returns `Ok(None)` for a well-formed frame carrying an event kind this
/// server does not know about.
pub fn decode_client_message(text: &str) -> Result<Option<ClientMessage>, DecodeError> {
    let envelope: Envelope = serde_json::from_str(text).map_err(DecodeError::Envelope)?;
    let message = match envelope.event.as_str() {
        "code" => ClientMessage::Code(payload("code", envelope.data)?),
        "editor" => ClientMessage::Editor(
            envelope
                .data
                .ok_or(DecodeError::MissingPayload("editor"))?,
        ),
        "speaker" => ClientMessage::Speaker(payload("speaker", envelope.data)?),
        "reset" => ClientMessage::Reset,
        other => {
            log::debug!("Ignoring unknown event kind {:?}", other);
            return Ok(None);
        }
    };
    Ok(Some(message))
}

fn payload<T: serde::de::DeserializeOwned>(
    kind: &'static str,
    data: Option<Value>,
) -> Result<T, DecodeError> {
    let data = data.ok_or(DecodeError::MissingPayload(kind))?;
    serde_json::from_value(data).map_err(|source| DecodeError::Payload { kind, source })
}

pub fn encode_server_message(message: &ServerMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}
