use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use system::{ClientMessage, ConnectionHandle};

use crate::admin::AdminCommand;
use crate::broadcast::ConnectionTx;
use crate::clock::SharedClock;
use crate::identity::IdentityAllocator;
use crate::session_table::SessionTable;

pub type ServerTx = UnboundedSender<ServerCommand>;

#[derive(Debug)]
pub enum ServerCommand {
    Connect {
        handle: ConnectionHandle,
        tx: ConnectionTx,
    },
    Disconnect {
        handle: ConnectionHandle,
    },
    Message {
        from: ConnectionHandle,
        message: ClientMessage,
    },
    AdminCommand(AdminCommand),
}

/// All shared session state. Owned by exactly one task, which applies
/// commands one at a time.
pub struct Server {
    pub(crate) identities: IdentityAllocator,
    pub(crate) table: SessionTable,
    pub(crate) clock: SharedClock,
}

impl Server {
    pub fn new() -> Self {
        Self::with_clock(SharedClock::new())
    }

    pub fn with_clock(clock: SharedClock) -> Self {
        Self {
            identities: IdentityAllocator::new(),
            table: SessionTable::new(),
            clock,
        }
    }

    pub fn table(&self) -> &SessionTable {
        &self.table
    }

    pub fn handle_command(&mut self, command: ServerCommand) {
        match command {
            ServerCommand::Connect { handle, tx } => self.connect(handle, tx),
            ServerCommand::Disconnect { handle } => self.disconnect(handle),
            ServerCommand::Message { from, message } => self.route(from, message),
            ServerCommand::AdminCommand(admin_command) => self.handle_admin_command(admin_command),
        }
    }

    fn handle_admin_command(&mut self, command: AdminCommand) {
        match command {
            AdminCommand::ListParticipants { tx } => {
                if tx.send(self.table.snapshot_all()).is_err() {
                    log::debug!("Admin request was dropped before the reply");
                }
            }
            AdminCommand::Kick { id, tx } => {
                let kicked = self.kick(id, "removed by admin");
                if tx.send(kicked).is_err() {
                    log::debug!("Admin request was dropped before the reply");
                }
            }
        }
    }
}

pub fn spawn_server() -> ServerTx {
    spawn_server_with(Server::new())
}

pub fn spawn_server_with(server: Server) -> ServerTx {
    let (srv_tx, mut srv_rx) = unbounded_channel::<ServerCommand>();

    tokio::spawn(async move {
        let mut server = Box::new(server);
        log::info!("server loop - started");

        while let Some(command) = srv_rx.recv().await {
            server.handle_command(command);
        }

        log::info!("server loop - terminated");
    });

    srv_tx
}
