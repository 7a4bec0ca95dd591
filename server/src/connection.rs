use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use actix::{Actor, ActorContext, AsyncContext, Handler, Message, Running, StreamHandler};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws::{self, CloseCode, CloseReason};

use system::{decode_client_message, ConnectionHandle};

use crate::broadcast::{ConnectionEvent, OUTBOUND_QUEUE_CAPACITY};
use crate::server::{ServerCommand, ServerTx};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest inbound frame or reassembled message, 1 MiB. Editor contents are
/// shipped whole on every `code` event.
pub const MAX_FRAME_SIZE: usize = 1 << 20;

/// Source of transport handles, one per upgraded socket.
#[derive(Debug, Default)]
pub struct ConnectionHandles(AtomicUsize);

impl ConnectionHandles {
    pub fn new() -> Self {
        Self(AtomicUsize::new(0))
    }

    pub fn next(&self) -> ConnectionHandle {
        self.0.fetch_add(1, Ordering::SeqCst)
    }
}

#[derive(Message)]
#[rtype(result = "()")]
struct ConnectionActorMessage(ConnectionEvent);

struct ConnectionActor {
    handle: ConnectionHandle,
    srv_tx: ServerTx,
    last_heartbeat: Instant,
    dropped_by_server: bool,
}

impl ConnectionActor {
    fn new(handle: ConnectionHandle, srv_tx: ServerTx) -> Self {
        Self {
            handle,
            srv_tx,
            last_heartbeat: Instant::now(),
            dropped_by_server: false,
        }
    }

    fn heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.last_heartbeat) > CLIENT_TIMEOUT {
                log::info!("Connection {} timed out", act.handle);
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }
}

impl Actor for ConnectionActor {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.heartbeat(ctx);

        let (tx, mut rx) = tokio::sync::mpsc::channel::<ConnectionEvent>(OUTBOUND_QUEUE_CAPACITY);

        if self
            .srv_tx
            .send(ServerCommand::Connect {
                handle: self.handle,
                tx,
            })
            .is_err()
        {
            log::error!("Server loop is gone, refusing connection {}", self.handle);
            ctx.stop();
            return;
        }

        let addr = ctx.address().recipient::<ConnectionActorMessage>();
        let handle = self.handle;

        // One event in flight. A stalled socket stops the mailbox, so the
        // bounded queue fills up and the broadcaster starts dropping.
        tokio::spawn(async move {
            log::debug!("connection {} egress - started", handle);
            while let Some(event) = rx.recv().await {
                if addr.send(ConnectionActorMessage(event)).await.is_err() {
                    break;
                }
            }
            log::debug!("connection {} egress - terminated", handle);
        });
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        if self.dropped_by_server {
            return Running::Stop;
        }
        if self
            .srv_tx
            .send(ServerCommand::Disconnect {
                handle: self.handle,
            })
            .is_err()
        {
            log::warn!("Server loop is gone, disconnect of {} not recorded", self.handle);
        }

        Running::Stop
    }
}

/// Ingress
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ConnectionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                match decode_client_message(&text) {
                    Ok(Some(message)) => {
                        log::debug!("Ingress {} {:?}", self.handle, message);
                        if self
                            .srv_tx
                            .send(ServerCommand::Message {
                                from: self.handle,
                                message,
                            })
                            .is_err()
                        {
                            log::error!("Server loop is gone, closing connection {}", self.handle);
                            ctx.stop();
                        }
                    }
                    Ok(None) => (),
                    Err(err) => {
                        log::warn!("Malformed frame from connection {}: {}", self.handle, err);
                    }
                }
            }
            Ok(ws::Message::Binary(bin)) => {
                log::debug!("Ignoring {} byte binary frame from {}", bin.len(), self.handle);
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) => {
                log::debug!("Ignoring continuation frame from {}", self.handle);
            }
            Ok(ws::Message::Nop) => (),
            Err(err) => {
                log::warn!("Protocol error on connection {}: {}", self.handle, err);
                ctx.stop();
            }
        }
    }
}

/// Egress
impl Handler<ConnectionActorMessage> for ConnectionActor {
    type Result = ();

    fn handle(
        &mut self,
        msg: ConnectionActorMessage,
        ctx: &mut ws::WebsocketContext<Self>,
    ) -> Self::Result {
        match msg.0 {
            ConnectionEvent::Message(text) => ctx.text(text),
            ConnectionEvent::Disconnected { reason } => {
                self.dropped_by_server = true;
                ctx.close(Some(CloseReason {
                    code: CloseCode::Policy,
                    description: Some(reason),
                }));
                ctx.stop();
            }
        }
    }
}

pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    srv_tx: web::Data<ServerTx>,
    handles: web::Data<ConnectionHandles>,
) -> Result<HttpResponse, Error> {
    let handle = handles.next();
    log::info!("Upgrading connection {}", handle);
    ws::WsResponseBuilder::new(
        ConnectionActor::new(handle, srv_tx.get_ref().clone()),
        &req,
        stream,
    )
    .frame_size(MAX_FRAME_SIZE)
    .start()
}
