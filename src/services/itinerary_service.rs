use crate::models::itinerary::TripRequest;
use crate::services::agent::Agent;
use crate::services::llm_service::LlmError;
use std::error::Error;
use std::fmt;

const PACE_CATEGORIES: [&str; 3] = ["non-touristy", "mixed", "must-see"];

#[derive(Debug)]
pub enum ItineraryError {
    ValidationError(String),
    LlmError(LlmError),
}

impl fmt::Display for ItineraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItineraryError::ValidationError(msg) => write!(f, "{}", msg),
            ItineraryError::LlmError(err) => write!(f, "LLM error: {}", err),
        }
    }
}

impl Error for ItineraryError {}

impl From<LlmError> for ItineraryError {
    fn from(err: LlmError) -> Self {
        ItineraryError::LlmError(err)
    }
}

pub fn pace_description(pace: i64) -> &'static str {
    match pace {
        1 => "leisurely pace with minimal tourist sites",
        2 => "relaxed pace with few tourist sites",
        3 => "balanced mix of activities and relaxation",
        4 => "active pace covering most key attractions",
        5 => "fast-paced intensive sightseeing",
        _ => "balanced itinerary",
    }
}

/// Index into the three touristy categories. The pace is clamped to 1..=3,
/// so 3, 4 and 5 all land on "must-see".
pub fn pace_category_index(pace: i64) -> usize {
    (pace.clamp(1, 3) - 1) as usize
}

pub fn pace_category(pace: i64) -> &'static str {
    PACE_CATEGORIES[pace_category_index(pace)]
}

pub fn validate_destinations(destinations: &[String]) -> Result<(), ItineraryError> {
    if destinations.is_empty() {
        return Err(ItineraryError::ValidationError(
            "No destinations provided".to_string(),
        ));
    }
    if destinations.iter().any(|d| d.trim().is_empty()) {
        return Err(ItineraryError::ValidationError(
            "Destination names cannot be empty".to_string(),
        ));
    }
    Ok(())
}

pub fn build_prompt(trip: &TripRequest) -> String {
    let is_multi_city = trip.destinations.len() > 1;
    let description = pace_description(trip.pace);
    let destinations = if is_multi_city {
        trip.destinations.join(", ")
    } else {
        trip.destinations[0].clone()
    };

    format!(
        "
            Plan a {} trip from {} to {}
            Traveler interests: {}
            Dates: {} to {}
            Pace: {} (level {}/5)

            **Your Task:**
            Craft complete travel itineraries including:
            - City introduction (1 paragraph per city)
            - Daily schedule with time allocations
            - Restaurant recommendations
            - Transportation options between cities (if multi-city)
            - Estimated costs
            - Safety tips

            **Special Instructions:**
            - Adjust the density of activities based on pace: {}
            - For multi-city trips, include travel time and logistics between cities
            - Prioritize {} locations

            Format response in markdown with:
            # Section Headers
            - Bullet points for lists
            - Emojis for key points
            *Italics for local context details*
        ",
        if is_multi_city { "multi-city" } else { "single-destination" },
        trip.origin,
        destinations,
        trip.interests,
        trip.date_from,
        trip.date_to,
        description,
        trip.pace,
        description,
        pace_category(trip.pace),
    )
}

pub struct ItineraryAgent {
    agent: Agent,
}

impl ItineraryAgent {
    pub fn new(agent: Agent) -> Self {
        Self {
            agent: agent.with_avatar("travel_avatar.png"),
        }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub async fn plan_trip(&self, trip: &TripRequest) -> Result<String, ItineraryError> {
        validate_destinations(&trip.destinations)?;

        log::info!(
            "Planning trip from {} to {:?} at pace {} ({})",
            trip.origin,
            trip.destinations,
            trip.pace,
            pace_category(trip.pace)
        );

        let prompt = build_prompt(trip);
        Ok(self.agent.get_response(&prompt).await?)
    }
}
