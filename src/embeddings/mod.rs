// Embeddings module
// Turns free text into vectors through a hosted embedding model

pub mod azure;

pub use azure::AzureEmbeddingClient;

/// A hosted text embedding model.
///
/// Transport and API failures are logged and surface as an empty vector, which
/// callers treat as "no signal". `Err` is reserved for failures that should
/// abort the whole turn.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;
}
