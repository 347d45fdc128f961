use metavec_embedder::EmbeddingError;
use metavec_storage::StorageError;
use thiserror::Error;

/// Why a single metadata blob could not be turned into an embedding record.
#[derive(Error, Debug)]
pub enum ItemError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Invalid metadata document: {0}")]
    Metadata(#[from] serde_json::Error),
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
}
