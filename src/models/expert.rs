use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ExpertRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub location: String,
}

/// Per-post analysis folded into the expert prompt.
#[derive(Debug, Clone)]
pub struct PostInsight {
    pub text: String,
    pub places: Vec<String>,
    pub sentiment: f64,
    pub tips: Vec<String>,
}
