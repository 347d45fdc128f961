pub mod error;

use std::sync::Arc;

pub use async_trait::async_trait;
pub use error::EmbeddingError;
use metavec_domain::embedding::Embedding;

/// Turns text into vectors, one per input, in input order.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, inputs: Vec<String>) -> Result<Vec<Embedding>, EmbeddingError>;
}

/// Embeds a single piece of text.
pub async fn generate_embedding(
    embedder: &Arc<dyn Embedder>,
    content: &str,
) -> Result<Embedding, EmbeddingError> {
    let embeddings = embedder.embed(vec![content.to_owned()]).await?;

    embeddings.into_iter().next().ok_or(EmbeddingError::Empty)
}
