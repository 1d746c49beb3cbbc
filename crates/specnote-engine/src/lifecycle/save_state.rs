use std::fmt;

use crate::io::{FileIoError, SaveRequest, SavedFile};
use crate::model::{Document, DocumentError, DocumentId, DocumentUpdate, NATIVE_EXTENSION};
use crate::session::Pane;

/// Persistence status of one document slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveState {
    Saved,
    Unsaved,
    Saving,
}

impl fmt::Display for SaveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SaveState::Saved => "saved",
            SaveState::Unsaved => "unsaved",
            SaveState::Saving => "saving",
        })
    }
}

/// A save handed to the file-I/O collaborator, to be settled with
/// [`TrackedDocument::finish_save`] once it returns.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveJob {
    pub request: SaveRequest,
    pub(crate) slot: Pane,
    pub(crate) document_id: DocumentId,
    pub(crate) revision: u64,
}

impl SaveJob {
    /// The document slot this save belongs to.
    pub fn slot(&self) -> Pane {
        self.slot
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveStart {
    Started(SaveJob),
    /// A save is already in flight; this request rides on it and is replayed
    /// with the latest content when it completes.
    Coalesced,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved,
    Canceled,
    Failed(String),
    /// The result arrived for a document that has since been replaced.
    Discarded,
    /// The request joined a save that was already in flight.
    Queued,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveCompletion {
    pub outcome: SaveOutcome,
    /// Follow-up save started for a request coalesced during this one.
    pub next: Option<SaveJob>,
}

/// One document together with its save state machine.
///
/// `saved -> unsaved` on any edit, `unsaved -> saving` when a save starts,
/// `saving -> saved` on success and `saving -> unsaved` on failure or
/// cancellation. Edits made while saving keep the state at `saving`; the
/// completed save then lands in `unsaved` so those edits go out next time.
#[derive(Debug, Clone)]
pub struct TrackedDocument {
    slot: Pane,
    document: Document,
    state: SaveState,
    revision: u64,
    in_flight: Option<u64>,
    save_pending: bool,
}

impl TrackedDocument {
    pub fn new(slot: Pane, document: Document, state: SaveState) -> Self {
        Self {
            slot,
            document,
            state,
            revision: 0,
            in_flight: None,
            save_pending: false,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn save_state(&self) -> SaveState {
        self.state
    }

    /// Number of accepted mutations so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn has_pending_save(&self) -> bool {
        self.save_pending
    }

    pub fn apply(&mut self, update: DocumentUpdate) {
        self.document = self.document.edited(update);
        self.revision += 1;
        if self.state == SaveState::Saved {
            self.state = SaveState::Unsaved;
        }
    }

    /// Swap in a different document (new/open). Any in-flight save result
    /// for the previous one will be discarded.
    pub fn replace(&mut self, document: Document, state: SaveState) {
        self.document = document;
        self.state = state;
        self.revision += 1;
        self.in_flight = None;
        self.save_pending = false;
    }

    pub fn begin_save(&mut self) -> Result<SaveStart, DocumentError> {
        if self.state == SaveState::Saving {
            log::info!("Save already in progress for {}, coalescing", self.document.name());
            self.save_pending = true;
            return Ok(SaveStart::Coalesced);
        }
        self.start_job().map(SaveStart::Started)
    }

    fn start_job(&mut self) -> Result<SaveJob, DocumentError> {
        let content = self.document.to_json()?;
        let job = SaveJob {
            request: SaveRequest {
                content,
                file_path: self.document.file_path().map(|path| path.to_path_buf()),
                default_name: self.document.default_file_name(NATIVE_EXTENSION),
            },
            slot: self.slot,
            document_id: self.document.id(),
            revision: self.revision,
        };
        self.state = SaveState::Saving;
        self.in_flight = Some(self.revision);
        log::debug!(
            "Saving {} (revision {})",
            self.document.name(),
            self.revision
        );
        Ok(job)
    }

    pub fn finish_save(
        &mut self,
        job: SaveJob,
        result: Result<SavedFile, FileIoError>,
    ) -> SaveCompletion {
        if job.document_id != self.document.id() || self.in_flight != Some(job.revision) {
            log::info!("Ignoring save result for a document no longer in this pane");
            return SaveCompletion {
                outcome: SaveOutcome::Discarded,
                next: None,
            };
        }
        self.in_flight = None;

        let outcome = match result {
            Ok(saved) => {
                self.document = self.document.located_at(saved.file_path, saved.file_name);
                self.state = if self.revision > job.revision {
                    SaveState::Unsaved
                } else {
                    SaveState::Saved
                };
                log::info!("Saved {}", self.document.name());
                SaveOutcome::Saved
            }
            Err(FileIoError::Canceled) => {
                self.state = SaveState::Unsaved;
                self.save_pending = false;
                log::info!("Save of {} canceled", self.document.name());
                SaveOutcome::Canceled
            }
            Err(e) => {
                self.state = SaveState::Unsaved;
                self.save_pending = false;
                log::warn!("Save of {} failed: {e}", self.document.name());
                SaveOutcome::Failed(e.to_string())
            }
        };

        let next = if std::mem::take(&mut self.save_pending) && self.state == SaveState::Unsaved {
            match self.start_job() {
                Ok(job) => Some(job),
                Err(e) => {
                    log::warn!("Could not start queued save: {e}");
                    None
                }
            }
        } else {
            None
        };

        SaveCompletion { outcome, next }
    }
}
