use std::sync::Arc;

use serde::Serialize;

use crate::{BlobStore, StorageError};

/// A [`BlobStore`] bound to a single container.
#[derive(Clone)]
pub struct ContainerClient {
    store: Arc<dyn BlobStore>,
    name: String,
}

impl ContainerClient {
    pub fn new(store: Arc<dyn BlobStore>, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates the container unless it exists. Losing a creation race to
    /// another process is not an error.
    pub async fn ensure_exists(&self) -> Result<(), StorageError> {
        if self.store.container_exists(&self.name).await? {
            return Ok(());
        }

        match self.store.create_container(&self.name).await {
            Ok(()) => {
                tracing::info!("created container {}", self.name);
                Ok(())
            }
            Err(StorageError::ContainerAlreadyExists(_)) => {
                tracing::debug!("container {} was created concurrently", self.name);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        self.store.list_blobs(&self.name, prefix).await
    }

    /// Downloads the whole blob and decodes it as UTF-8.
    pub async fn read_text(&self, key: &str) -> Result<String, StorageError> {
        let bytes = self.store.get_blob(&self.name, key).await?;
        String::from_utf8(bytes).map_err(|_| StorageError::Decode(key.to_owned()))
    }

    /// Serializes `value` as JSON and overwrites the blob at `key`.
    pub async fn write_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), StorageError> {
        let content =
            serde_json::to_vec(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.put_blob(&self.name, key, content).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::async_trait;

    /// Reports the container missing, then loses the creation race.
    #[derive(Default)]
    struct RacingStore {
        create_calls: AtomicUsize,
        create_error: Option<fn(&str) -> StorageError>,
    }

    #[async_trait]
    impl BlobStore for RacingStore {
        async fn container_exists(&self, _: &str) -> Result<bool, StorageError> {
            Ok(false)
        }

        async fn create_container(&self, container: &str) -> Result<(), StorageError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            match self.create_error {
                Some(error) => Err(error(container)),
                None => Ok(()),
            }
        }

        async fn list_blobs(&self, _: &str, _: &str) -> Result<Vec<String>, StorageError> {
            Ok(Vec::new())
        }

        async fn get_blob(&self, _: &str, name: &str) -> Result<Vec<u8>, StorageError> {
            Err(StorageError::BlobNotFound(name.to_owned()))
        }

        async fn put_blob(&self, _: &str, _: &str, _: Vec<u8>) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn ensure_exists_tolerates_concurrent_creation() {
        let store = Arc::new(RacingStore {
            create_error: Some(|name: &str| {
                StorageError::ContainerAlreadyExists(name.to_owned())
            }),
            ..Default::default()
        });
        let container = ContainerClient::new(store.clone(), "embeddings");

        container.ensure_exists().await.unwrap();

        assert_eq!(store.create_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn ensure_exists_propagates_other_creation_failures() {
        let store = Arc::new(RacingStore {
            create_error: Some(|_: &str| StorageError::Service {
                status: 403,
                message: "AuthorizationFailure".into(),
            }),
            ..Default::default()
        });
        let container = ContainerClient::new(store, "embeddings");

        assert!(matches!(
            container.ensure_exists().await,
            Err(StorageError::Service { status: 403, .. })
        ));
    }

    #[tokio::test]
    async fn ensure_exists_creates_missing_container() {
        let store = Arc::new(RacingStore::default());
        let container = ContainerClient::new(store.clone(), "embeddings");

        container.ensure_exists().await.unwrap();

        assert_eq!(store.create_calls.load(Ordering::SeqCst), 1);
    }
}
