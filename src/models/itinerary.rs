use serde::Deserialize;

fn default_pace() -> i64 {
    3
}

fn default_trip_type() -> String {
    "city".to_string()
}

/// Traveler interests arrive either as free text or as a list of tags.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum Interests {
    Text(String),
    List(Vec<String>),
}

impl std::fmt::Display for Interests {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Interests::Text(text) => write!(f, "{}", text),
            Interests::List(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ItineraryRequest {
    pub origin: Option<String>,
    #[serde(default)]
    pub destinations: Vec<String>,
    pub destination: Option<String>,
    pub interests: Option<Interests>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    #[serde(default = "default_pace")]
    pub pace: i64,
    #[serde(default = "default_trip_type")]
    pub trip_type: String,
}

impl ItineraryRequest {
    /// Destinations list, falling back to the single `destination` field.
    pub fn resolved_destinations(&self) -> Vec<String> {
        if self.destinations.is_empty() {
            if let Some(destination) = &self.destination {
                return vec![destination.clone()];
            }
        }
        self.destinations.clone()
    }
}

#[derive(Debug, Clone)]
pub struct TripRequest {
    pub origin: String,
    pub destinations: Vec<String>,
    pub interests: String,
    pub date_from: String,
    pub date_to: String,
    pub pace: i64,
}
