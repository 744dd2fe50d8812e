use serde::{Deserialize, Serialize};

use crate::delta::Delta;
use crate::document::{ApplyError, Document};

const DEFAULT_SCHEMA: &str = "parchment";
const DEFAULT_VERSION: u32 = 1;

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

fn default_version() -> u32 {
    DEFAULT_VERSION
}

/// Schema-tagged envelope for moving a document's canonical delta in and
/// out of JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentValue {
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default = "default_version")]
    pub version: u32,
    pub delta: Delta,
}

impl DocumentValue {
    pub fn from_document(document: &Document) -> Self {
        Self {
            schema: default_schema(),
            version: default_version(),
            delta: document.to_delta(),
        }
    }

    pub fn into_document(self) -> Result<Document, ApplyError> {
        Document::from_delta(&self.delta)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
