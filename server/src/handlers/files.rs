use actix_web::{web, HttpResponse, Responder};
use std::path::{Component, Path, PathBuf};
use tokio::fs;

const INDEX_DOCUMENT: &str = "index.html";

/// Directory the client bundle is served from.
#[derive(Debug, Clone)]
pub struct StaticRoot(pub PathBuf);

pub fn configure_file_handlers(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/{path:.*}").route(web::get().to(get)));
}

async fn get(path: web::Path<String>, root: web::Data<StaticRoot>) -> impl Responder {
    let relative = match resolve_static_path(&path) {
        Some(relative) => relative,
        None => {
            log::warn!("Refusing static path {:?}", path.as_str());
            return HttpResponse::NotFound().finish();
        }
    };
    let file_name = root.0.join(&relative);
    match fs::read(&file_name).await {
        Ok(body) => HttpResponse::Ok()
            .content_type(content_type_for(&relative))
            .body(body),
        Err(err) => {
            log::debug!("Static file {:?} unavailable: {}", file_name, err);
            HttpResponse::NotFound().finish()
        }
    }
}

/// Maps a request path onto a path below the static root. Anything that
/// could climb out of the root yields `None`.
fn resolve_static_path(request_path: &str) -> Option<PathBuf> {
    let mut resolved = PathBuf::new();
    for component in Path::new(request_path).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => (),
            _ => return None,
        }
    }
    if request_path.is_empty() || request_path.ends_with('/') {
        resolved.push(INDEX_DOCUMENT);
    }
    Some(resolved)
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("js") => "application/javascript",
        Some("css") => "text/css",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("json") => "application/json",
        Some("wasm") => "application/wasm",
        _ => "application/octet-stream",
    }
}
