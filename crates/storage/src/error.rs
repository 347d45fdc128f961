use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("The specified blob does not exist: {0}")]
    BlobNotFound(String),
    #[error("The specified container does not exist: {0}")]
    ContainerNotFound(String),
    #[error("The specified container already exists: {0}")]
    ContainerAlreadyExists(String),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Storage service returned {status}: {message}")]
    Service { status: u16, message: String },
    #[error("Blob {0} is not valid UTF-8")]
    Decode(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid storage configuration: {0}")]
    InvalidConfig(String),
}
