//! Request and response types for search engine operations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What the engine should do with each document of a batch import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportAction {
    /// Insert; documents whose id already exists are rejected.
    Create,
    /// Insert or replace by id.
    #[default]
    Upsert,
    /// Merge into existing documents; missing ids are rejected.
    Update,
}

impl ImportAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Upsert => "upsert",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for ImportAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "upsert" => Ok(Self::Upsert),
            "update" => Ok(Self::Update),
            other => Err(format!("unknown import action '{}'", other)),
        }
    }
}

/// Result of one document within a batch import.
///
/// A batch whose request succeeded can still reject individual documents
/// (schema mismatch, duplicate id on create, ...). Those rejections are
/// reported here rather than as an error of the whole call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOutcome {
    /// The document's unique identifier.
    pub document_id: String,
    /// Whether the engine accepted the document.
    pub success: bool,
    /// Engine message when the document was rejected.
    pub error: Option<String>,
}

impl DocumentOutcome {
    pub fn accepted(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            success: true,
            error: None,
        }
    }

    pub fn rejected(document_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Description of a live collection as reported by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionInfo {
    /// Name of the collection in the engine.
    pub name: String,
    /// Number of documents, when the engine reports it.
    pub num_documents: Option<u64>,
    /// Raw engine description (settings, mappings, ...).
    pub details: Value,
}
