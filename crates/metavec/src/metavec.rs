pub mod api;
pub mod error;

use std::{net::SocketAddr, sync::Arc};

use anyhow::{anyhow, Result};
use metavec_domain::{
    embedding::EmbeddingRecord,
    key::{normalize_blob_name, user_prefix},
    metadata::MetadataRecord,
    outcome::{BatchSummary, Outcome},
};
use metavec_embedder::{generate_embedding, Embedder};
use metavec_storage::{BlobStore, ContainerClient};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::error::ItemError;

pub const DEFAULT_METADATA_CONTAINER: &str = "weez-files-metadata";
pub const DEFAULT_EMBEDDINGS_CONTAINER: &str = "weez-files-embeddings";

/// Reads metadata documents, embeds them and writes the vectors to the
/// embeddings container under the same key.
#[derive(Clone)]
pub struct Metavec {
    metadata: ContainerClient,
    embeddings: ContainerClient,
    embedder: Arc<dyn Embedder>,
}

impl Metavec {
    pub fn builder() -> MetavecBuilder {
        MetavecBuilder {
            store: None,
            embedder: None,
            metadata_container: DEFAULT_METADATA_CONTAINER.to_owned(),
            embeddings_container: DEFAULT_EMBEDDINGS_CONTAINER.to_owned(),
        }
    }

    /// Embeds every metadata blob under `<user_id>/`.
    ///
    /// Per-blob failures end up in the summary. Only failing to prepare the
    /// embeddings container or to list the user's blobs is returned as an error.
    pub async fn process_all(&self, user_id: &str) -> Result<BatchSummary> {
        self.embeddings.ensure_exists().await?;

        let blob_names = self.metadata.list(&user_prefix(user_id)).await?;
        tracing::info!(
            "processing {} metadata blob(s) for user {}",
            blob_names.len(),
            user_id
        );

        let mut summary = BatchSummary::default();
        for blob_name in blob_names {
            summary.record(self.process_blob(&blob_name).await);
        }

        tracing::info!(
            "user {}: {} processed, {} failed",
            user_id,
            summary.processed_files.len(),
            summary.failed_files.len()
        );

        Ok(summary)
    }

    /// Embeds one metadata blob. `blob_name` is placed under `<user_id>/`
    /// unless it already is.
    pub async fn process_one(&self, user_id: &str, blob_name: &str) -> Outcome {
        let blob_name = normalize_blob_name(user_id, blob_name);

        if let Err(e) = self.embeddings.ensure_exists().await {
            tracing::error!(
                "Failed to prepare container {}: {}",
                self.embeddings.name(),
                e
            );
            return Outcome::error(blob_name, e);
        }

        self.process_blob(&blob_name).await
    }

    async fn process_blob(&self, blob_name: &str) -> Outcome {
        match self.embed_blob(blob_name).await {
            Ok(()) => {
                tracing::debug!("stored embedding for {}", blob_name);
                Outcome::success(blob_name)
            }
            Err(e) => {
                tracing::warn!("Failed to embed {}: {}", blob_name, e);
                Outcome::error(blob_name, e)
            }
        }
    }

    async fn embed_blob(&self, blob_name: &str) -> Result<(), ItemError> {
        let content = self.metadata.read_text(blob_name).await?;
        let metadata = MetadataRecord::parse(&content)?;

        let embedding = generate_embedding(&self.embedder, &metadata.flatten()).await?;
        let record = EmbeddingRecord::new(blob_name, embedding, metadata.file_path());

        self.embeddings.write_json(blob_name, &record).await?;

        Ok(())
    }

    pub async fn listen(self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        tracing::debug!("listening on {}", listener.local_addr()?);
        axum::serve(
            listener,
            api::routes::router(self).layer(TraceLayer::new_for_http()),
        )
        .await?;

        Ok(())
    }
}

pub struct MetavecBuilder {
    store: Option<Arc<dyn BlobStore>>,
    embedder: Option<Arc<dyn Embedder>>,
    metadata_container: String,
    embeddings_container: String,
}

impl MetavecBuilder {
    pub fn with_store(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn with_metadata_container(mut self, container: impl Into<String>) -> Self {
        self.metadata_container = container.into();
        self
    }

    pub fn with_embeddings_container(mut self, container: impl Into<String>) -> Self {
        self.embeddings_container = container.into();
        self
    }

    pub fn build(self) -> Result<Metavec> {
        let store = self.store.ok_or_else(|| anyhow!("store is required"))?;
        let embedder = self.embedder.ok_or_else(|| anyhow!("embedder is required"))?;

        Ok(Metavec {
            metadata: ContainerClient::new(store.clone(), self.metadata_container),
            embeddings: ContainerClient::new(store, self.embeddings_container),
            embedder,
        })
    }
}
