use crate::{models::expert::ExpertRequest, services::expert_service::ExpertAgent};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

/*
    /api/expert
*/
pub async fn insights(
    body: web::Json<ExpertRequest>,
    agent: web::Data<ExpertAgent>,
) -> impl Responder {
    let request = body.into_inner();
    let location = request.location.trim();

    if location.is_empty() {
        return HttpResponse::BadRequest().json(json!({"error": "Location cannot be empty"}));
    }

    match agent.get_travel_insights(&request.query, location).await {
        Ok(answer) => HttpResponse::Ok().json(answer),
        Err(err) => {
            log::error!("Expert insights for '{}' failed: {}", location, err);
            HttpResponse::InternalServerError().json(json!({"error": err.to_string()}))
        }
    }
}
