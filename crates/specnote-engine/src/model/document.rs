use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::node::{Node, NodeKind};

/// Extension of the native document snapshot format.
pub const NATIVE_EXTENSION: &str = "specnote";
/// Fallback extension offered for the same JSON content.
pub const INTERCHANGE_EXTENSION: &str = "json";

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Malformed document: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Document root must be a `doc` node, found `{0}`")]
    InvalidRoot(String),
    #[error("Failed to serialize document: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An immutable snapshot of one document.
///
/// Edits never touch a `Document` in place; [`Document::edited`] returns the
/// next snapshot. The `id` is fixed for the life of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    id: DocumentId,
    name: String,
    content: Node,
    #[serde(default)]
    file_path: Option<PathBuf>,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    updated_at: DateTime<Utc>,
}

/// A content or metadata change coming from the editing surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentUpdate {
    pub content: Option<Node>,
    pub name: Option<String>,
}

impl DocumentUpdate {
    pub fn content(content: Node) -> Self {
        Self {
            content: Some(content),
            name: None,
        }
    }

    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            content: None,
            name: Some(name.into()),
        }
    }
}

impl Document {
    /// A fresh, unlocated document holding one empty paragraph.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: DocumentId::new(),
            name: name.into(),
            content: Node::empty_doc(),
            file_path: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &Node {
        &self.content
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Apply an update, producing the next snapshot with a fresh `updated_at`.
    pub fn edited(&self, update: DocumentUpdate) -> Self {
        Self {
            id: self.id,
            name: update.name.unwrap_or_else(|| self.name.clone()),
            content: update.content.unwrap_or_else(|| self.content.clone()),
            file_path: self.file_path.clone(),
            created_at: self.created_at,
            updated_at: Utc::now().max(self.updated_at),
        }
    }

    /// Bind the document to an external location, taking the display name
    /// from it when one is given.
    pub fn located_at(&self, path: PathBuf, display_name: Option<String>) -> Self {
        Self {
            name: display_name.unwrap_or_else(|| self.name.clone()),
            file_path: Some(path),
            ..self.clone()
        }
    }

    /// File name proposed when this document has no location yet.
    pub fn default_file_name(&self, extension: &str) -> String {
        format!("{}.{extension}", self.name)
    }

    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let document: Document = parse_json(json)?;
        document.validated()
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, DocumentError> {
        let document = Document::deserialize(serde_stacker::Deserializer::new(value))?;
        document.validated()
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        serde_json::to_string_pretty(self).map_err(DocumentError::Serialize)
    }

    fn validated(self) -> Result<Self, DocumentError> {
        if self.content.is_kind(&NodeKind::Doc) {
            Ok(self)
        } else {
            Err(DocumentError::InvalidRoot(
                self.content.type_name().to_string(),
            ))
        }
    }
}

/// Parse JSON without serde_json's nesting limit. Every tree node costs two
/// levels of JSON, so the default limit of 128 rejects lists nested ~31 deep;
/// the stack grows onto the heap instead.
pub(crate) fn parse_json<T: DeserializeOwned>(json: &str) -> Result<T, serde_json::Error> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    deserializer.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(value)
}

/// Display name for a location: the file name without its extension.
pub fn display_name_for(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
}
