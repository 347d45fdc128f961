use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Embedding request failed: {0}")]
    Request(String),
    #[error("Embedding service returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Invalid embedding response: {0}")]
    Decode(String),
    #[error("No embedding generated for content")]
    Empty,
    #[error("Invalid embedder configuration: {0}")]
    InvalidConfig(String),
}
