use system::{ClientMessage, ConnectionHandle, ServerMessage};

use crate::broadcast::{deliver, Recipients};
use crate::server::Server;
use crate::session_table::Field;

impl Server {
    /// Applies one client event and fans the result out. The sender's id is
    /// always taken from the table, never from the payload.
    pub(crate) fn route(&mut self, from: ConnectionHandle, message: ClientMessage) {
        let kind = message.kind();
        let routed = match message {
            ClientMessage::Code(code) => self
                .table
                .update_field(from, Field::Code(code))
                .map(|participant| ServerMessage::Code {
                    state: participant.code.clone(),
                    id: participant.id,
                }),
            ClientMessage::Editor(state) => self
                .table
                .update_field(from, Field::Editor(state.clone()))
                .map(|participant| ServerMessage::Editor {
                    state,
                    id: participant.id,
                }),
            ClientMessage::Speaker(speaker) => self
                .table
                .update_field(from, Field::Speaker(speaker))
                .map(|participant| ServerMessage::Speaker {
                    state: participant.speaker,
                    id: participant.id,
                }),
            ClientMessage::Reset => self.table.get(from).map(|_| ServerMessage::Reset),
        };

        let outbound = match routed {
            Ok(outbound) => outbound,
            Err(err) => {
                log::error!("Dropping `{}`: {}", kind, err);
                return;
            }
        };

        let recipients = match outbound {
            ServerMessage::Reset => {
                self.clock.reset();
                Recipients::All
            }
            _ => Recipients::AllExcept(from),
        };

        let delivered = deliver(&self.table, recipients, &outbound);
        log::debug!(
            "`{}` from connection {} reached {} connection(s)",
            kind,
            from,
            delivered
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::broadcast::ConnectionEvent;
    use crate::server::{Server, ServerCommand};
    use system::serde_json::{self, json};
    use system::{ClientMessage, ConnectionHandle, ServerMessage, Speaker};
    use tokio::sync::mpsc::{channel, Receiver};

    fn connect(server: &mut Server, handle: ConnectionHandle) -> Receiver<ConnectionEvent> {
        let (tx, rx) = channel(16);
        server.handle_command(ServerCommand::Connect { handle, tx });
        rx
    }

    fn drain(rx: &mut Receiver<ConnectionEvent>) -> Vec<ServerMessage> {
        let mut messages = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let ConnectionEvent::Message(text) = event {
                messages.push(serde_json::from_str(&text).expect(""));
            }
        }
        messages
    }

    fn send(server: &mut Server, from: ConnectionHandle, message: ClientMessage) {
        server.handle_command(ServerCommand::Message { from, message });
    }

    #[test]
    fn it_relays_code_to_others_only() {
        let mut server = Server::new();
        let mut sender = connect(&mut server, 0);
        let mut other = connect(&mut server, 1);
        drain(&mut sender);
        drain(&mut other);

        send(&mut server, 0, ClientMessage::Code("print(1)".into()));

        assert!(drain(&mut sender).is_empty());
        assert_eq!(
            drain(&mut other),
            vec![ServerMessage::Code {
                state: "print(1)".into(),
                id: 0
            }]
        );
        assert_eq!(server.table().get(0).expect("").code, "print(1)");
    }

    #[test]
    fn it_relays_to_every_other_participant_regardless_of_count() {
        for others in [0usize, 1, 3].iter() {
            let mut server = Server::new();
            let mut sender = connect(&mut server, 0);
            let mut receivers: Vec<_> = (1..=*others).map(|h| connect(&mut server, h)).collect();
            drain(&mut sender);
            receivers.iter_mut().for_each(|rx| {
                drain(rx);
            });

            let speaker = Speaker {
                x: 0.25,
                y: -0.5,
                angle: 1.0,
            };
            send(&mut server, 0, ClientMessage::Speaker(speaker));
            send(&mut server, 0, ClientMessage::Editor(json!({"cursor": {"line": 0, "ch": 4}})));

            assert!(drain(&mut sender).is_empty());
            for rx in receivers.iter_mut() {
                assert_eq!(
                    drain(rx),
                    vec![
                        ServerMessage::Speaker {
                            state: speaker,
                            id: 0
                        },
                        ServerMessage::Editor {
                            state: json!({"cursor": {"line": 0, "ch": 4}}),
                            id: 0
                        },
                    ]
                );
            }
        }
    }

    #[test]
    fn it_resets_for_everyone_including_sender() {
        let mut server = Server::new();
        let mut a = connect(&mut server, 0);
        let mut b = connect(&mut server, 1);
        drain(&mut a);
        drain(&mut b);
        let before = server.clock.epoch_start();

        send(&mut server, 1, ClientMessage::Reset);

        assert_eq!(drain(&mut a), vec![ServerMessage::Reset]);
        assert_eq!(drain(&mut b), vec![ServerMessage::Reset]);
        assert!(server.clock.epoch_start() >= before);
    }

    #[test]
    fn it_keeps_last_known_state_for_late_joiners() {
        let mut server = Server::new();
        let _a = connect(&mut server, 0);
        send(&mut server, 0, ClientMessage::Code("noise()".into()));
        send(&mut server, 0, ClientMessage::Editor(json!({"content": "noise()"})));

        let mut late = connect(&mut server, 1);
        match drain(&mut late).remove(0) {
            ServerMessage::Hello { players, .. } => {
                assert_eq!(players.len(), 1);
                assert_eq!(players[0].code, "noise()");
                assert_eq!(players[0].editor, Some(json!({"content": "noise()"})));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn it_drops_events_from_unseated_connections() {
        let mut server = Server::new();
        let mut a = connect(&mut server, 0);
        drain(&mut a);
        let before = server.clock.epoch_start();

        send(&mut server, 9, ClientMessage::Code("x".into()));
        send(&mut server, 9, ClientMessage::Reset);

        assert!(drain(&mut a).is_empty());
        assert_eq!(server.clock.epoch_start(), before);
    }
}
