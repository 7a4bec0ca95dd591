use actix_web::{web, App, HttpServer};
use clap::Parser;

use kilobeat_server::config::Config;
use kilobeat_server::connection::ConnectionHandles;
use kilobeat_server::handlers::{self, StaticRoot};
use kilobeat_server::server::spawn_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = Config::parse();

    let srv_tx = web::Data::new(spawn_server());
    let handles = web::Data::new(ConnectionHandles::new());
    let static_root = web::Data::new(StaticRoot(config.static_dir.clone()));

    log::info!(
        "Listening on {}:{}, serving {:?}",
        config.host,
        config.port,
        config.static_dir
    );

    HttpServer::new(move || {
        App::new()
            .app_data(srv_tx.clone())
            .app_data(handles.clone())
            .app_data(static_root.clone())
            .configure(handlers::root)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
