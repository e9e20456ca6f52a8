use actix_web::{http::header, web, HttpResponse, Responder};
use serde_json::json;
use std::path::{Component, Path, PathBuf};

const PLACEHOLDER_GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00\xff\xff\xff\x00\x00\x00!\xf9\x04\x01\x00\x00\x00\x00,\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02D\x01\x00;";
const PLACEHOLDER_EXPIRES: &str = "Thu, 31 Dec 2037 23:59:59 GMT";

/// Root of the built frontend bundle.
#[derive(Clone, Debug)]
pub struct StaticAssets {
    root: PathBuf,
}

impl StaticAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves a request path inside the bundle, refusing anything that
    /// could step outside it.
    pub fn resolve(&self, requested: &str) -> Option<PathBuf> {
        let relative = Path::new(requested);
        if requested.is_empty()
            || relative
                .components()
                .any(|component| !matches!(component, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(relative))
    }
}

async fn send_file(path: PathBuf) -> HttpResponse {
    let content_type = mime_guess::from_path(&path).first_or_octet_stream();
    let display = path.display().to_string();

    match web::block(move || std::fs::read(path)).await {
        Ok(Ok(bytes)) => HttpResponse::Ok()
            .insert_header((header::CONTENT_TYPE, content_type.essence_str()))
            .body(bytes),
        Ok(Err(err)) => {
            log::debug!("Static file {} unavailable: {}", display, err);
            HttpResponse::NotFound().json(json!({"error": "Not found"}))
        }
        Err(err) => {
            log::error!("Failed to read {}: {}", display, err);
            HttpResponse::InternalServerError().json(json!({"error": "Failed to read file"}))
        }
    }
}

/*
    /
*/
pub async fn index(assets: web::Data<StaticAssets>) -> impl Responder {
    send_file(assets.root.join("index.html")).await
}

/*
    /{filename}
*/
pub async fn static_file(
    path: web::Path<String>,
    assets: web::Data<StaticAssets>,
) -> impl Responder {
    match assets.resolve(&path.into_inner()) {
        Some(file) => send_file(file).await,
        None => HttpResponse::NotFound().json(json!({"error": "Not found"})),
    }
}

/*
    /static/images/default_avatar.png, /static/images/default_project.jpg
*/
pub async fn placeholder_image() -> impl Responder {
    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "image/gif"))
        .insert_header((header::CACHE_CONTROL, "public, max-age=31536000"))
        .insert_header((header::EXPIRES, PLACEHOLDER_EXPIRES))
        .body(PLACEHOLDER_GIF)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/static/images/default_avatar.png",
        web::get().to(placeholder_image),
    )
    .route(
        "/static/images/default_project.jpg",
        web::get().to(placeholder_image),
    )
    .route("/", web::get().to(index))
    .route("/{filename:.*}", web::get().to(static_file));
}
