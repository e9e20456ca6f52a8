use crate::{
    middleware::session::SessionId,
    models::{
        conversation::HistoryEntry,
        destination::{DestinationRequest, DestinationResponse},
    },
    services::{
        destination_service::{DestinationAgent, InterestType},
        session_store::SessionStore,
    },
};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

const HISTORY_TURNS: usize = 4;

/*
    /api/destination
*/
pub async fn chat(
    session: SessionId,
    body: web::Json<DestinationRequest>,
    agent: web::Data<DestinationAgent>,
    sessions: web::Data<SessionStore>,
) -> impl Responder {
    let request = body.into_inner();
    let message = request.message.trim();

    if message.is_empty() {
        return HttpResponse::BadRequest().json(json!({"error": "Message cannot be empty"}));
    }

    let history = sessions.recent(&session.0, HISTORY_TURNS);

    let (result, destination) = match InterestType::detect(message) {
        Some(interest) => {
            log::info!("Greeting for {:?} interest", interest);
            (agent.greet(interest).await, None)
        }
        None => {
            let destination = agent.extract_destination(message);
            log::info!("Destination request for '{}' (pdf: {})", destination, request.use_pdf);
            let result = agent
                .get_destination_insights(&destination, &history, Some(message), request.use_pdf)
                .await;
            (result, Some(destination))
        }
    };

    match result {
        Ok(response) => {
            sessions.append(
                &session.0,
                HistoryEntry::new(request.message.as_str(), response.as_str()),
            );
            HttpResponse::Ok().json(DestinationResponse {
                response,
                destination,
            })
        }
        Err(err) => {
            log::error!("Destination request failed: {}", err);
            HttpResponse::InternalServerError().json(json!({"error": err.to_string()}))
        }
    }
}
