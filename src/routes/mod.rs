pub mod assets;
pub mod destination;
pub mod expert;
pub mod health;
pub mod itinerary;

use actix_web::{error::InternalError, web, HttpResponse};
use serde_json::json;

/// Malformed or mistyped JSON bodies answer 400 with an `error` field.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        log::warn!("Rejected request body: {}", message);
        InternalError::from_response(err, HttpResponse::BadRequest().json(json!({"error": message})))
            .into()
    })
}

/// Agent endpoints mounted under `/api`.
pub fn api(cfg: &mut web::ServiceConfig) {
    cfg.route("/destination", web::post().to(destination::chat))
        .route("/expert", web::post().to(expert::insights))
        .route("/itinerary", web::post().to(itinerary::plan));
}
