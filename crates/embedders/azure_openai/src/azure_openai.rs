use std::time::Duration;

use metavec_domain::embedding::Embedding;
use metavec_embedder::{Embedder, EmbeddingError};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "https://weez-openai-resource.openai.azure.com/";
pub const DEFAULT_API_VERSION: &str = "2024-12-01-preview";
pub const DEFAULT_MODEL: &str = "text-embedding-3-large";

/// Embeddings client for an Azure OpenAI deployment. The deployment is
/// addressed by the model name.
#[derive(Clone)]
pub struct AzureOpenAiEmbedder {
    client: Client,
    url: String,
    api_key: String,
    model: String,
}

pub struct AzureOpenAiEmbedderBuilder {
    endpoint: String,
    api_key: Option<String>,
    api_version: String,
    model: String,
    timeout: Duration,
}

impl AzureOpenAiEmbedder {
    pub fn builder() -> AzureOpenAiEmbedderBuilder {
        AzureOpenAiEmbedderBuilder {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            api_key: None,
            api_version: DEFAULT_API_VERSION.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl AzureOpenAiEmbedderBuilder {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<AzureOpenAiEmbedder, EmbeddingError> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| EmbeddingError::InvalidConfig("missing Azure OpenAI API key".into()))?;
        if self.model.trim().is_empty() {
            return Err(EmbeddingError::InvalidConfig(
                "missing embedding model name".into(),
            ));
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| EmbeddingError::InvalidConfig(e.to_string()))?;

        let url = format!(
            "{}/openai/deployments/{}/embeddings?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.model,
            self.api_version,
        );

        Ok(AzureOpenAiEmbedder {
            client,
            url,
            api_key,
            model: self.model,
        })
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

#[async_trait::async_trait]
impl Embedder for AzureOpenAiEmbedder {
    async fn embed(&self, inputs: Vec<String>) -> Result<Vec<Embedding>, EmbeddingError> {
        tracing::debug!("requesting {} embedding(s) from {}", inputs.len(), self.model);

        let response = self
            .client
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: &inputs,
            })
            .send()
            .await
            .map_err(|e| EmbeddingError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let mut parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Decode(e.to_string()))?;
        parsed.data.sort_by_key(|entry| entry.index);

        Ok(parsed
            .data
            .into_iter()
            .map(|entry| Embedding::from(entry.embedding))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use metavec_embedder::generate_embedding;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    fn embedder(server: &MockServer) -> Arc<dyn Embedder> {
        Arc::new(
            AzureOpenAiEmbedder::builder()
                .endpoint(server.uri())
                .api_key("test-key")
                .build()
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn sends_model_and_input_to_deployment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!(
                "/openai/deployments/{DEFAULT_MODEL}/embeddings"
            )))
            .and(query_param("api-version", DEFAULT_API_VERSION))
            .and(header("api-key", "test-key"))
            .and(body_json(json!({
                "model": DEFAULT_MODEL,
                "input": ["/docs/a.txt Report"],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [{ "object": "embedding", "index": 0, "embedding": [0.25, -0.5] }],
                "model": DEFAULT_MODEL,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let embedding = generate_embedding(&embedder(&server), "/docs/a.txt Report")
            .await
            .unwrap();

        assert_eq!(embedding, Embedding::from(vec![0.25, -0.5]));
    }

    #[tokio::test]
    async fn results_follow_input_index() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    { "index": 1, "embedding": [2.0] },
                    { "index": 0, "embedding": [1.0] },
                ],
            })))
            .mount(&server)
            .await;

        let embeddings = embedder(&server)
            .embed(vec!["a".into(), "b".into()])
            .await
            .unwrap();

        assert_eq!(
            embeddings,
            vec![Embedding::from(vec![1.0]), Embedding::from(vec![2.0])]
        );
    }

    #[tokio::test]
    async fn error_status_is_surfaced_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .expect(1)
            .mount(&server)
            .await;

        match generate_embedding(&embedder(&server), "text").await {
            Err(EmbeddingError::Api { status, body }) => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn build_requires_api_key() {
        assert!(matches!(
            AzureOpenAiEmbedder::builder().build(),
            Err(EmbeddingError::InvalidConfig(_))
        ));
        assert!(matches!(
            AzureOpenAiEmbedder::builder().api_key("  ").build(),
            Err(EmbeddingError::InvalidConfig(_))
        ));
    }
}
