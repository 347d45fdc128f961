use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::render::render_value;

pub const FILE_PATH_FIELD: &str = "file_path";
pub const UNKNOWN_PATH: &str = "unknown_path";

/// A per-file metadata document. Field order is kept exactly as stored,
/// since it determines the text sent for embedding.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataRecord(Map<String, Value>);

impl MetadataRecord {
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// `file_path` as text. A missing or `null` field yields [`UNKNOWN_PATH`].
    pub fn file_path(&self) -> String {
        match self.0.get(FILE_PATH_FIELD) {
            None | Some(Value::Null) => UNKNOWN_PATH.to_owned(),
            Some(value) => render_value(value),
        }
    }

    /// Every value, in stored order, joined by single spaces.
    pub fn flatten(&self) -> String {
        self.0
            .values()
            .map(render_value)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<Map<String, Value>> for MetadataRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}
