//! Session snapshot persistence.
//!
//! The whole session (both documents) is rewritten on every document change,
//! last write wins. Loading is lenient per document: a pane whose stored
//! document fails to parse gets a fresh one, the other pane is unaffected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::Document;
use crate::model::document::parse_json;

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Failed to read session file at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write session file at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed session snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// What gets written: both documents and the time of writing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot<'a> {
    pub left_document: &'a Document,
    pub right_document: &'a Document,
    pub saved_at: DateTime<Utc>,
}

/// What was read back. Either document may be missing or unusable.
#[derive(Debug, Default)]
pub struct RestoredSession {
    pub left_document: Option<Document>,
    pub right_document: Option<Document>,
    pub saved_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSnapshot {
    #[serde(default, alias = "leftDoc")]
    left_document: Option<Value>,
    #[serde(default, alias = "rightDoc")]
    right_document: Option<Value>,
    #[serde(default)]
    saved_at: Option<DateTime<Utc>>,
}

impl RestoredSession {
    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        let raw: RawSnapshot = parse_json(json)?;
        Ok(Self {
            left_document: restore_document("left", raw.left_document),
            right_document: restore_document("right", raw.right_document),
            saved_at: raw.saved_at,
        })
    }
}

fn restore_document(pane: &str, value: Option<Value>) -> Option<Document> {
    match Document::from_value(value?) {
        Ok(document) => Some(document),
        Err(e) => {
            log::warn!("Discarding stored {pane} document: {e}");
            None
        }
    }
}

pub trait SessionStore {
    fn load(&self) -> Result<Option<RestoredSession>, PersistError>;
    fn save(&mut self, snapshot: &SessionSnapshot<'_>) -> Result<(), PersistError>;
}

/// Session snapshot kept as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for JsonFileStore {
    fn load(&self) -> Result<Option<RestoredSession>, PersistError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path).map_err(|source| PersistError::Read {
            path: self.path.clone(),
            source,
        })?;
        RestoredSession::from_json(&json).map(Some)
    }

    fn save(&mut self, snapshot: &SessionSnapshot<'_>) -> Result<(), PersistError> {
        let json = serde_json::to_string(snapshot)?;
        let write_err = |source: std::io::Error| PersistError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(&self.path, json).map_err(write_err)
    }
}

/// In-process store, for embedding without a disk and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    json: Option<String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(json: impl Into<String>) -> Self {
        Self {
            json: Some(json.into()),
            writes: 0,
        }
    }

    pub fn json(&self) -> Option<&str> {
        self.json.as_deref()
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<RestoredSession>, PersistError> {
        self.json
            .as_deref()
            .map(RestoredSession::from_json)
            .transpose()
    }

    fn save(&mut self, snapshot: &SessionSnapshot<'_>) -> Result<(), PersistError> {
        self.json = Some(serde_json::to_string(snapshot)?);
        self.writes += 1;
        Ok(())
    }
}
