use crate::models::destination::ChunkRecord;
use crate::services::embedding_service::{Embedder, EmbeddingError};
use async_trait::async_trait;
use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use mongodb::{Client, Collection};
use std::env;
use std::error::Error;
use std::fmt;
use std::sync::{Arc, RwLock};

const DEFAULT_DATABASE: &str = "Destinations";
const DEFAULT_COLLECTION: &str = "destination_docs";
const DEFAULT_INDEX: &str = "vector_index";
const CANDIDATES_PER_RESULT: usize = 20;

#[derive(Debug)]
pub enum VectorStoreError {
    EmbeddingError(EmbeddingError),
    DatabaseError(mongodb::error::Error),
    ResponseError(String),
}

impl fmt::Display for VectorStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorStoreError::EmbeddingError(err) => write!(f, "Embedding error: {}", err),
            VectorStoreError::DatabaseError(err) => write!(f, "Database error: {}", err),
            VectorStoreError::ResponseError(msg) => write!(f, "Response error: {}", msg),
        }
    }
}

impl Error for VectorStoreError {}

impl From<EmbeddingError> for VectorStoreError {
    fn from(err: EmbeddingError) -> Self {
        VectorStoreError::EmbeddingError(err)
    }
}

impl From<mongodb::error::Error> for VectorStoreError {
    fn from(err: mongodb::error::Error) -> Self {
        VectorStoreError::DatabaseError(err)
    }
}

/// A collection of destination chunks searchable by semantic similarity.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Inserts the record, replacing any record with the same id.
    async fn add(&self, record: ChunkRecord) -> Result<(), VectorStoreError>;

    /// Returns the text of the `n_results` closest records, optionally
    /// restricted to one destination label.
    async fn query(
        &self,
        text: &str,
        n_results: usize,
        destination: Option<&str>,
    ) -> Result<Vec<String>, VectorStoreError>;
}

/// Chunks stored in MongoDB and searched with an Atlas `$vectorSearch` index
/// on `embedding`, with `destination` declared as a filter field.
pub struct MongoVectorStore {
    collection: Collection<Document>,
    embedder: Arc<dyn Embedder>,
    index: String,
}

impl MongoVectorStore {
    pub fn new(client: Arc<Client>, embedder: Arc<dyn Embedder>) -> Self {
        let database = env::var("VECTOR_DATABASE").unwrap_or_else(|_| DEFAULT_DATABASE.to_string());
        let collection =
            env::var("VECTOR_COLLECTION").unwrap_or_else(|_| DEFAULT_COLLECTION.to_string());
        let index = env::var("VECTOR_INDEX").unwrap_or_else(|_| DEFAULT_INDEX.to_string());

        Self {
            collection: client.database(&database).collection(&collection),
            embedder,
            index,
        }
    }

    fn search_pipeline(
        &self,
        embedding: &[f32],
        n_results: usize,
        destination: Option<&str>,
    ) -> Vec<Document> {
        let query_vector: Vec<Bson> = embedding.iter().map(|v| Bson::Double(*v as f64)).collect();

        let mut search = doc! {
            "index": self.index.as_str(),
            "path": "embedding",
            "queryVector": query_vector,
            "numCandidates": (n_results * CANDIDATES_PER_RESULT) as i64,
            "limit": n_results as i64,
        };
        if let Some(destination) = destination {
            search.insert("filter", doc! { "destination": destination.to_lowercase() });
        }

        vec![
            doc! { "$vectorSearch": search },
            doc! { "$project": { "_id": 0, "text": 1 } },
        ]
    }
}

#[async_trait]
impl VectorStore for MongoVectorStore {
    async fn add(&self, record: ChunkRecord) -> Result<(), VectorStoreError> {
        let embedding = self.embedder.embed(&record.text).await?;
        let vector: Vec<Bson> = embedding.iter().map(|v| Bson::Double(*v as f64)).collect();

        let replacement = doc! {
            "_id": record.id.as_str(),
            "text": record.text.as_str(),
            "destination": record.destination.as_str(),
            "embedding": vector,
        };

        self.collection
            .replace_one(doc! { "_id": record.id.as_str() }, replacement)
            .upsert(true)
            .await?;

        Ok(())
    }

    async fn query(
        &self,
        text: &str,
        n_results: usize,
        destination: Option<&str>,
    ) -> Result<Vec<String>, VectorStoreError> {
        let embedding = self.embedder.embed(text).await?;
        let pipeline = self.search_pipeline(&embedding, n_results, destination);

        let cursor = self.collection.aggregate(pipeline).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;

        documents
            .iter()
            .map(|document| {
                document
                    .get_str("text")
                    .map(str::to_string)
                    .map_err(|e| VectorStoreError::ResponseError(format!("Malformed chunk: {}", e)))
            })
            .collect()
    }
}

struct StoredChunk {
    record: ChunkRecord,
    embedding: Vec<f32>,
}

/// Process-local store used when no MongoDB deployment is configured.
/// Contents are lost on restart.
pub struct InMemoryVectorStore {
    embedder: Arc<dyn Embedder>,
    chunks: RwLock<Vec<StoredChunk>>,
}

impl InMemoryVectorStore {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            chunks: RwLock::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.read().map(|chunks| chunks.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> VectorStoreError {
    VectorStoreError::ResponseError("vector store lock poisoned".to_string())
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add(&self, record: ChunkRecord) -> Result<(), VectorStoreError> {
        let embedding = self.embedder.embed(&record.text).await?;
        let mut chunks = self.chunks.write().map_err(|_| poisoned())?;

        match chunks.iter_mut().find(|chunk| chunk.record.id == record.id) {
            Some(existing) => {
                existing.record = record;
                existing.embedding = embedding;
            }
            None => chunks.push(StoredChunk { record, embedding }),
        }
        Ok(())
    }

    async fn query(
        &self,
        text: &str,
        n_results: usize,
        destination: Option<&str>,
    ) -> Result<Vec<String>, VectorStoreError> {
        let query_embedding = self.embedder.embed(text).await?;
        let destination = destination.map(str::to_lowercase);
        let chunks = self.chunks.read().map_err(|_| poisoned())?;

        let mut scored: Vec<(f32, &ChunkRecord)> = chunks
            .iter()
            .filter(|chunk| match &destination {
                Some(destination) => &chunk.record.destination == destination,
                None => true,
            })
            .map(|chunk| (cosine_similarity(&query_embedding, &chunk.embedding), &chunk.record))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(n_results)
            .map(|(_, record)| record.text.clone())
            .collect())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Embeds text as counts of a few marker words.
    struct KeywordEmbedder;

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            let lower = text.to_lowercase();
            Ok(["tram", "beach", "museum"]
                .iter()
                .map(|word| lower.matches(word).count() as f32)
                .collect())
        }
    }

    fn store() -> InMemoryVectorStore {
        InMemoryVectorStore::new(Arc::new(KeywordEmbedder))
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[tokio::test]
    async fn test_query_ranks_and_filters_by_destination() {
        let store = store();
        store
            .add(ChunkRecord::new(0, "Lisbon", "Ride the tram up the hill".to_string()))
            .await
            .unwrap();
        store
            .add(ChunkRecord::new(1, "Lisbon", "The beach at Cascais".to_string()))
            .await
            .unwrap();
        store
            .add(ChunkRecord::new(0, "Porto", "Porto has a tram museum".to_string()))
            .await
            .unwrap();

        let results = store.query("tram", 1, Some("LISBON")).await.unwrap();
        assert_eq!(results, vec!["Ride the tram up the hill".to_string()]);

        let all = store.query("beach", 5, None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0], "The beach at Cascais");
    }

    #[tokio::test]
    async fn test_add_replaces_same_id() {
        let store = store();
        store
            .add(ChunkRecord::new(0, "Rome", "old".to_string()))
            .await
            .unwrap();
        store
            .add(ChunkRecord::new(0, "Rome", "new museum".to_string()))
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        let results = store.query("museum", 3, Some("rome")).await.unwrap();
        assert_eq!(results, vec!["new museum".to_string()]);
    }

    #[tokio::test]
    async fn test_reingest_under_other_casing_does_not_duplicate() {
        let store = store();
        store
            .add(ChunkRecord::new(0, "Lisbon", "tram".to_string()))
            .await
            .unwrap();
        store
            .add(ChunkRecord::new(0, "LISBON", "tram".to_string()))
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        let results = store.query("tram", 3, Some("lisbon")).await.unwrap();
        assert_eq!(results, vec!["tram".to_string()]);
    }
}
