use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct DestinationRequest {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "usePdf", default)]
    pub use_pdf: bool,
}

#[derive(Debug, Serialize)]
pub struct DestinationResponse {
    pub response: String,
    pub destination: Option<String>,
}

/// A PDF-derived text fragment stored in the vector collection.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChunkRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    /// Lowercased destination label used as the retrieval filter.
    pub destination: String,
}

impl ChunkRecord {
    /// Id and tag both use the trimmed, lowercased destination.
    pub fn new(index: usize, destination: &str, text: String) -> Self {
        let destination = destination.trim().to_lowercase();
        Self {
            id: format!("doc_{}_{}", index, destination),
            text,
            destination,
        }
    }
}
