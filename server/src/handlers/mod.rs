use crate::connection::ws_index;
use crate::handlers::admin::configure_admin_handlers;
use crate::handlers::files::configure_file_handlers;
use actix_web::web;

mod admin;
mod files;

pub use files::StaticRoot;

pub fn root(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws/").route(web::get().to(ws_index)));

    configure_admin_handlers(cfg);
    // Catch-all, keep last.
    configure_file_handlers(cfg);
}
