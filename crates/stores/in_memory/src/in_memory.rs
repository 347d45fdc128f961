use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use metavec_storage::{BlobStore, StorageError};
use tokio::sync::Mutex;

/// Process-local [`BlobStore`]. Listing order is lexicographic by key.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    containers: Arc<Mutex<HashMap<String, BTreeMap<String, Vec<u8>>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts a blob, creating its container on the way if needed.
    pub async fn insert(&self, container: &str, name: &str, content: impl Into<Vec<u8>>) {
        self.containers
            .lock()
            .await
            .entry(container.to_owned())
            .or_default()
            .insert(name.to_owned(), content.into());
    }

    pub async fn blob(&self, container: &str, name: &str) -> Option<Vec<u8>> {
        self.containers
            .lock()
            .await
            .get(container)
            .and_then(|blobs| blobs.get(name).cloned())
    }

    pub async fn blob_count(&self, container: &str) -> usize {
        self.containers
            .lock()
            .await
            .get(container)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait::async_trait]
impl BlobStore for InMemoryStore {
    async fn container_exists(&self, container: &str) -> Result<bool, StorageError> {
        Ok(self.containers.lock().await.contains_key(container))
    }

    async fn create_container(&self, container: &str) -> Result<(), StorageError> {
        let mut containers = self.containers.lock().await;
        if containers.contains_key(container) {
            return Err(StorageError::ContainerAlreadyExists(container.to_owned()));
        }
        containers.insert(container.to_owned(), BTreeMap::new());
        Ok(())
    }

    async fn list_blobs(&self, container: &str, prefix: &str) -> Result<Vec<String>, StorageError> {
        let containers = self.containers.lock().await;
        let blobs = containers
            .get(container)
            .ok_or_else(|| StorageError::ContainerNotFound(container.to_owned()))?;

        Ok(blobs
            .range(prefix.to_owned()..)
            .map(|(name, _)| name)
            .take_while(|name| name.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn get_blob(&self, container: &str, name: &str) -> Result<Vec<u8>, StorageError> {
        let containers = self.containers.lock().await;
        containers
            .get(container)
            .ok_or_else(|| StorageError::ContainerNotFound(container.to_owned()))?
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::BlobNotFound(name.to_owned()))
    }

    async fn put_blob(
        &self,
        container: &str,
        name: &str,
        content: Vec<u8>,
    ) -> Result<(), StorageError> {
        let mut containers = self.containers.lock().await;
        containers
            .get_mut(container)
            .ok_or_else(|| StorageError::ContainerNotFound(container.to_owned()))?
            .insert(name.to_owned(), content);
        Ok(())
    }
}
