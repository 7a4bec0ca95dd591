use crate::admin::AdminCommand;
use crate::server::{ServerCommand, ServerTx};
use actix_web::error;
use actix_web::Responder;
use actix_web::Result;
use actix_web::{web, HttpResponse};
use system::{Participant, ParticipantId};

pub fn configure_admin_handlers(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(
                web::resource("/participants")
                    .name("admin_participants")
                    .route(web::get().to(list_participants)),
            )
            .service(
                web::resource("/participants/{id}")
                    .name("admin_participant")
                    .route(web::delete().to(kick_participant)),
            ),
    );
}

async fn list_participants(srv_tx: web::Data<ServerTx>) -> Result<impl Responder> {
    let (tx, rx) = tokio::sync::oneshot::channel::<Vec<Participant>>();

    srv_tx
        .send(ServerCommand::AdminCommand(AdminCommand::ListParticipants {
            tx,
        }))
        .map_err(|_| error::ErrorInternalServerError("Internal Server Error"))?;

    let participants = rx
        .await
        .map_err(|_| error::ErrorInternalServerError("Receiver await error"))?;

    Ok(HttpResponse::Ok().json(participants))
}

async fn kick_participant(
    path: web::Path<ParticipantId>,
    srv_tx: web::Data<ServerTx>,
) -> Result<impl Responder> {
    let (tx, rx) = tokio::sync::oneshot::channel::<bool>();

    srv_tx
        .send(ServerCommand::AdminCommand(AdminCommand::Kick {
            id: path.into_inner(),
            tx,
        }))
        .map_err(|_| error::ErrorInternalServerError("Internal Server Error"))?;

    let kicked = rx
        .await
        .map_err(|_| error::ErrorInternalServerError("Receiver await error"))?;

    if kicked {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Ok(HttpResponse::NotFound().finish())
    }
}
