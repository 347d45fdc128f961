use std::{net::SocketAddr, sync::Arc};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use metavec::{Metavec, DEFAULT_EMBEDDINGS_CONTAINER, DEFAULT_METADATA_CONTAINER};
use metavec_azure_openai_embedder::{
    AzureOpenAiEmbedder, DEFAULT_API_VERSION, DEFAULT_ENDPOINT, DEFAULT_MODEL,
};
use metavec_azure_store::AzureBlobStore;
use metavec_in_memory_store::InMemoryStore;
use metavec_storage::BlobStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
struct Cli {
    #[clap(long, env = "METAVEC_HOST", default_value = "0.0.0.0")]
    host: String,
    #[clap(long, env = "METAVEC_PORT", default_value = "5000")]
    port: u16,
    #[clap(long, env = "METAVEC_METADATA_CONTAINER", default_value = DEFAULT_METADATA_CONTAINER)]
    metadata_container: String,
    #[clap(long, env = "METAVEC_EMBEDDINGS_CONTAINER", default_value = DEFAULT_EMBEDDINGS_CONTAINER)]
    embeddings_container: String,
    #[clap(flatten)]
    embedder: EmbedderArgs,
    #[clap(subcommand)]
    store: Store,
}

#[derive(Args)]
struct EmbedderArgs {
    #[clap(long, env = "AZURE_OPENAI_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    openai_endpoint: String,
    #[clap(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: String,
    #[clap(long, env = "AZURE_OPENAI_API_VERSION", default_value = DEFAULT_API_VERSION)]
    openai_api_version: String,
    #[clap(long, env = "EMBEDDING_MODEL", default_value = DEFAULT_MODEL)]
    embedding_model: String,
}

#[derive(Subcommand)]
enum Store {
    /// Azure Blob Storage account
    Azure {
        #[clap(
            long,
            env = "AZURE_METADATA_STORAGE_CONNECTION_STRING",
            hide_env_values = true
        )]
        connection_string: String,
    },
    /// Process-local storage, empty on start
    InMemory,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}=debug,metavec=debug,tower_http=debug",
                    env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let store: Arc<dyn BlobStore> = match cli.store {
        Store::Azure { connection_string } => {
            Arc::new(AzureBlobStore::from_connection_string(&connection_string)?)
        }
        Store::InMemory => Arc::new(InMemoryStore::new()),
    };

    let embedder = AzureOpenAiEmbedder::builder()
        .endpoint(cli.embedder.openai_endpoint)
        .api_key(cli.embedder.openai_api_key)
        .api_version(cli.embedder.openai_api_version)
        .model(cli.embedder.embedding_model)
        .build()?;

    Metavec::builder()
        .with_store(store)
        .with_embedder(Arc::new(embedder))
        .with_metadata_container(cli.metadata_container)
        .with_embeddings_container(cli.embeddings_container)
        .build()?
        .listen(SocketAddr::new(cli.host.parse()?, cli.port))
        .await
}
