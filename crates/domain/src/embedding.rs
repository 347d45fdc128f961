use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding(pub Vec<f32>);

impl Embedding {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// Stored in the embeddings container under the same key as its metadata document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub file_name: String,
    pub embeddings: Embedding,
    pub file_path: String,
}

impl EmbeddingRecord {
    pub fn new(
        file_name: impl Into<String>,
        embeddings: Embedding,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            embeddings,
            file_path: file_path.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn record_serializes_with_flat_vector() {
        let record = EmbeddingRecord::new(
            "u1/a.json",
            Embedding::from(vec![0.5, -1.0]),
            "/docs/a.txt",
        );

        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(
            value,
            json!({
                "file_name": "u1/a.json",
                "embeddings": [0.5, -1.0],
                "file_path": "/docs/a.txt",
            })
        );
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"file_name":"u1/a.json","embeddings":[0.5,-1.0],"file_path":"/docs/a.txt"}"#
        );
    }
}
