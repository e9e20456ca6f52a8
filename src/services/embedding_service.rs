use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::env;
use std::error::Error;
use std::fmt;

const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

#[derive(Debug)]
pub enum EmbeddingError {
    HttpError(reqwest::Error),
    ResponseError(String),
}

impl fmt::Display for EmbeddingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingError::HttpError(err) => write!(f, "HTTP error: {}", err),
            EmbeddingError::ResponseError(msg) => write!(f, "Response error: {}", msg),
        }
    }
}

impl Error for EmbeddingError {}

impl From<reqwest::Error> for EmbeddingError {
    fn from(err: reqwest::Error) -> Self {
        EmbeddingError::HttpError(err)
    }
}

/// Turns text into a dense vector for similarity search.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Clone)]
pub struct OllamaEmbedder {
    client: Client,
    host: String,
    model: String,
}

impl OllamaEmbedder {
    pub fn new() -> Self {
        let host = env::var("OLLAMA_HOST").unwrap_or_else(|_| DEFAULT_OLLAMA_HOST.to_string());
        let model =
            env::var("EMBEDDING_MODEL").unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string());
        Self::with_host(host, model)
    }

    pub fn with_host(host: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            host: host.into(),
            model: model.into(),
        }
    }
}

impl Default for OllamaEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let response = self
            .client
            .post(format!("{}/api/embeddings", self.host))
            .json(&serde_json::json!({
                "model": self.model,
                "prompt": text,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EmbeddingError::ResponseError(format!(
                "Embedding request failed with status {}",
                status
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::ResponseError(format!("Invalid embeddings response: {}", e)))?;

        Ok(body.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_embed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/embeddings")
            .match_body(mockito::Matcher::JsonString(
                r#"{"model":"nomic-embed-text","prompt":"Lisbon trams"}"#.to_string(),
            ))
            .with_status(200)
            .with_body(r#"{"embedding":[0.1,0.2,0.3]}"#)
            .create_async()
            .await;

        let embedder = OllamaEmbedder::with_host(server.url(), "nomic-embed-text");
        let embedding = embedder.embed("Lisbon trams").await.unwrap();

        mock.assert_async().await;
        assert_eq!(embedding, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_embed_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/embeddings")
            .with_status(500)
            .create_async()
            .await;

        let embedder = OllamaEmbedder::with_host(server.url(), "nomic-embed-text");
        assert!(matches!(
            embedder.embed("x").await,
            Err(EmbeddingError::ResponseError(_))
        ));
    }
}
