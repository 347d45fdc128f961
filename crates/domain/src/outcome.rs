use serde::{Deserialize, Serialize};

/// Result of pushing one metadata blob through the pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Success { blob_name: String },
    Error { blob_name: String, message: String },
}

impl Outcome {
    pub fn success(blob_name: impl Into<String>) -> Self {
        Self::Success {
            blob_name: blob_name.into(),
        }
    }

    pub fn error(blob_name: impl Into<String>, message: impl ToString) -> Self {
        Self::Error {
            blob_name: blob_name.into(),
            message: message.to_string(),
        }
    }

    pub fn blob_name(&self) -> &str {
        match self {
            Self::Success { blob_name } | Self::Error { blob_name, .. } => blob_name,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FailedFile {
    pub blob_name: String,
    pub error: String,
}

/// Processed and failed keys of a batch run, in listing order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub processed_files: Vec<String>,
    pub failed_files: Vec<FailedFile>,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Success { blob_name } => self.processed_files.push(blob_name),
            Outcome::Error { blob_name, message } => self.failed_files.push(FailedFile {
                blob_name,
                error: message,
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.processed_files.is_empty() && self.failed_files.is_empty()
    }
}

impl FromIterator<Outcome> for BatchSummary {
    fn from_iter<I: IntoIterator<Item = Outcome>>(outcomes: I) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            summary.record(outcome);
        }
        summary
    }
}
