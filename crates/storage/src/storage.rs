pub mod container;
pub mod error;

pub use async_trait::async_trait;
pub use container::ContainerClient;
pub use error::StorageError;

/// A flat key/blob namespace split into named containers.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn container_exists(&self, container: &str) -> Result<bool, StorageError>;

    /// Fails with [`StorageError::ContainerAlreadyExists`] when the container is already there.
    async fn create_container(&self, container: &str) -> Result<(), StorageError>;

    /// Names of every blob in `container` starting with `prefix`.
    async fn list_blobs(&self, container: &str, prefix: &str) -> Result<Vec<String>, StorageError>;

    async fn get_blob(&self, container: &str, name: &str) -> Result<Vec<u8>, StorageError>;

    /// Stores `content` at `name`, replacing whatever was there.
    async fn put_blob(
        &self,
        container: &str,
        name: &str,
        content: Vec<u8>,
    ) -> Result<(), StorageError>;
}
