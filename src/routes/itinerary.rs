use crate::{
    models::itinerary::{ItineraryRequest, TripRequest},
    services::itinerary_service::{ItineraryAgent, ItineraryError},
};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

fn required(value: Option<String>, field: &str) -> Result<String, String> {
    value.ok_or_else(|| format!("Missing required field: {}", field))
}

fn to_trip(request: ItineraryRequest) -> Result<TripRequest, String> {
    let destinations = request.resolved_destinations();
    let interests = request
        .interests
        .as_ref()
        .map(|interests| interests.to_string());

    Ok(TripRequest {
        origin: required(request.origin, "origin")?,
        destinations,
        interests: required(interests, "interests")?,
        date_from: required(request.date_from, "date_from")?,
        date_to: required(request.date_to, "date_to")?,
        pace: request.pace,
    })
}

/*
    /api/itinerary
*/
pub async fn plan(
    body: web::Json<ItineraryRequest>,
    agent: web::Data<ItineraryAgent>,
) -> impl Responder {
    let request = body.into_inner();
    log::debug!("Itinerary request ({} trip)", request.trip_type);

    let trip = match to_trip(request) {
        Ok(trip) => trip,
        Err(message) => return HttpResponse::BadRequest().json(json!({"error": message})),
    };

    match agent.plan_trip(&trip).await {
        Ok(itinerary) => HttpResponse::Ok().json(json!({"itinerary": itinerary})),
        Err(ItineraryError::ValidationError(message)) => {
            log::warn!("Rejected itinerary request: {}", message);
            HttpResponse::BadRequest().json(json!({"error": message}))
        }
        Err(err) => {
            log::error!("Itinerary generation failed: {}", err);
            HttpResponse::InternalServerError().json(json!({"error": err.to_string()}))
        }
    }
}
