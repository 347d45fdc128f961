mod connection_string;
mod listing;
mod shared_key;

use std::time::Duration;

use chrono::Utc;
use metavec_storage::{BlobStore, StorageError};
use reqwest::{header::CONTENT_TYPE, Client, Method, Response, StatusCode, Url};

pub use connection_string::{ConnectionString, Credentials};

use crate::{listing::BlobPage, shared_key::CanonicalRequest};

const SERVICE_VERSION: &str = "2021-08-06";

/// [`BlobStore`] backed by the Azure Blob Storage REST API.
#[derive(Clone)]
pub struct AzureBlobStore {
    client: Client,
    endpoint: Url,
    credentials: Credentials,
}

/// What a request addresses; decides how a 404 is reported.
#[derive(Clone, Copy)]
enum Target<'a> {
    Container(&'a str),
    Blob(&'a str, &'a str),
}

impl AzureBlobStore {
    pub fn new(endpoint: Url, credentials: Credentials) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| StorageError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            credentials,
        })
    }

    pub fn from_connection_string(connection_string: &str) -> Result<Self, StorageError> {
        let ConnectionString {
            blob_endpoint,
            credentials,
        } = ConnectionString::parse(connection_string)?;
        Self::new(blob_endpoint, credentials)
    }

    fn url(&self, target: Target<'_>, query: &[(&str, String)]) -> Result<Url, StorageError> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                StorageError::InvalidConfig(format!("{} cannot be a base URL", self.endpoint))
            })?;
            segments.pop_if_empty();
            match target {
                Target::Container(container) => {
                    segments.push(container);
                }
                Target::Blob(container, blob) => {
                    segments.push(container).extend(blob.split('/'));
                }
            }
        }

        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(name, value)| (*name, value.as_str())));
        }
        if let Credentials::SharedAccessSignature(sas) = &self.credentials {
            let combined = match url.query() {
                Some(existing) => format!("{existing}&{sas}"),
                None => sas.clone(),
            };
            url.set_query(Some(&combined));
        }

        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        target: Target<'_>,
        query: &[(&str, String)],
        extra_headers: &[(&'static str, String)],
        body: Option<(Vec<u8>, &str)>,
    ) -> Result<Response, StorageError> {
        let url = self.url(target, query)?;

        let mut ms_headers: Vec<(&str, String)> = vec![
            (
                "x-ms-date",
                Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
            ),
            ("x-ms-version", SERVICE_VERSION.to_owned()),
        ];
        ms_headers.extend(extra_headers.iter().cloned());

        let (content, content_type) = match body {
            Some((content, content_type)) => (content, Some(content_type)),
            None => (Vec::new(), None),
        };

        let mut request = self.client.request(method.clone(), url.clone());
        for (name, value) in &ms_headers {
            request = request.header(*name, value);
        }
        if let Some(content_type) = content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }

        if let Credentials::SharedKey { account, key } = &self.credentials {
            let authorization = CanonicalRequest {
                method: method.as_str(),
                content_length: content.len(),
                content_type,
                ms_headers: &ms_headers,
                account,
                path: url.path(),
                query,
            }
            .authorization(key)?;
            request = request.header("Authorization", authorization);
        }

        if method == Method::PUT {
            request = request.body(content);
        }

        tracing::debug!("{} {}", method, url.path());
        let response = request
            .send()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Self::check(response, target).await
    }

    async fn check(response: Response, target: Target<'_>) -> Result<Response, StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_code = response
            .headers()
            .get("x-ms-error-code")
            .and_then(|code| code.to_str().ok())
            .unwrap_or_default()
            .to_owned();

        match (status, target) {
            (StatusCode::NOT_FOUND, Target::Blob(container, _))
                if error_code == "ContainerNotFound" =>
            {
                Err(StorageError::ContainerNotFound(container.to_owned()))
            }
            (StatusCode::NOT_FOUND, Target::Blob(_, blob)) => {
                Err(StorageError::BlobNotFound(blob.to_owned()))
            }
            (StatusCode::NOT_FOUND, Target::Container(container)) => {
                Err(StorageError::ContainerNotFound(container.to_owned()))
            }
            (StatusCode::CONFLICT, Target::Container(container))
                if error_code.is_empty() || error_code == "ContainerAlreadyExists" =>
            {
                Err(StorageError::ContainerAlreadyExists(container.to_owned()))
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                let message = if error_code.is_empty() {
                    body
                } else {
                    format!("{error_code}: {body}")
                };
                Err(StorageError::Service {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

fn container_query() -> Vec<(&'static str, String)> {
    vec![("restype", "container".to_owned())]
}

#[async_trait::async_trait]
impl BlobStore for AzureBlobStore {
    async fn container_exists(&self, container: &str) -> Result<bool, StorageError> {
        match self
            .send(
                Method::HEAD,
                Target::Container(container),
                &container_query(),
                &[],
                None,
            )
            .await
        {
            Ok(_) => Ok(true),
            Err(StorageError::ContainerNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn create_container(&self, container: &str) -> Result<(), StorageError> {
        self.send(
            Method::PUT,
            Target::Container(container),
            &container_query(),
            &[],
            None,
        )
        .await?;
        Ok(())
    }

    async fn list_blobs(&self, container: &str, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut names = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut query = container_query();
            query.push(("comp", "list".to_owned()));
            query.push(("prefix", prefix.to_owned()));
            if let Some(marker) = marker.take() {
                query.push(("marker", marker));
            }

            let body = self
                .send(Method::GET, Target::Container(container), &query, &[], None)
                .await?
                .text()
                .await
                .map_err(|e| StorageError::Connection(e.to_string()))?;

            let page = BlobPage::parse(&body);
            names.extend(page.names);
            match page.next_marker {
                Some(next) => marker = Some(next),
                None => break,
            }
        }

        Ok(names)
    }

    async fn get_blob(&self, container: &str, name: &str) -> Result<Vec<u8>, StorageError> {
        let bytes = self
            .send(Method::GET, Target::Blob(container, name), &[], &[], None)
            .await?
            .bytes()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn put_blob(
        &self,
        container: &str,
        name: &str,
        content: Vec<u8>,
    ) -> Result<(), StorageError> {
        self.send(
            Method::PUT,
            Target::Blob(container, name),
            &[],
            &[("x-ms-blob-type", "BlockBlob".to_owned())],
            Some((content, "application/json")),
        )
        .await?;
        Ok(())
    }
}
