//! # Session Coordinator
//!
//! Owns the two document slots, decides which slot each pane is bound to
//! (from the [`SplitMode`]), tracks the active pane, and mirrors scroll
//! position between two panes that show the same document.
//!
//! In `same-doc` mode both panes resolve to the left slot: one document, one
//! save state, two independent scroll positions.

pub mod command;
pub mod scroll;

use chrono::Utc;
use specnote_config::{Settings, SettingsPatch};
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

use crate::export::ExportFormat;
use crate::io::{ExportRequest, FileIo, FileIoError, SavedFile};
use crate::lifecycle::{
    AutosaveScheduler, SaveCompletion, SaveJob, SaveOutcome, SaveStart, SaveState,
    TrackedDocument,
};
use crate::model::{Document, DocumentError, DocumentUpdate};
use crate::persistence::{JsonFileStore, RestoredSession, SessionSnapshot, SessionStore};

pub use command::{Command, UnknownCommand};
pub use scroll::ScrollMetrics;
use scroll::PaneView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pane {
    Left,
    Right,
}

impl Pane {
    pub const BOTH: [Pane; 2] = [Pane::Left, Pane::Right];

    pub fn other(self) -> Pane {
        match self {
            Pane::Left => Pane::Right,
            Pane::Right => Pane::Left,
        }
    }

    fn index(self) -> usize {
        match self {
            Pane::Left => 0,
            Pane::Right => 1,
        }
    }

    /// Name given to a fresh document in this slot.
    pub fn untitled_name(self) -> &'static str {
        match self {
            Pane::Left => "Untitled",
            Pane::Right => "Untitled 2",
        }
    }
}

impl fmt::Display for Pane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Pane::Left => "left",
            Pane::Right => "right",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SplitMode {
    /// Only the left pane is shown.
    #[default]
    Single,
    /// Both panes show the left document.
    SameDoc,
    /// Each pane shows its own document.
    DualDoc,
}

impl SplitMode {
    /// The mode after a "toggle split" command.
    pub fn next(self) -> SplitMode {
        match self {
            SplitMode::Single => SplitMode::SameDoc,
            SplitMode::SameDoc => SplitMode::DualDoc,
            SplitMode::DualDoc => SplitMode::Single,
        }
    }
}

impl fmt::Display for SplitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SplitMode::Single => "single",
            SplitMode::SameDoc => "same-doc",
            SplitMode::DualDoc => "dual-doc",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Could not open document: {0}")]
    Open(#[source] FileIoError),
    #[error("Not a valid document: {0}")]
    InvalidDocument(#[from] DocumentError),
    #[error("Save failed: {0}")]
    SaveFailed(String),
    #[error("Export failed: {0}")]
    Export(#[source] FileIoError),
}

/// Everything open in the editor window.
pub struct Session<S = JsonFileStore> {
    documents: [TrackedDocument; 2],
    views: [PaneView; 2],
    split_mode: SplitMode,
    active_pane: Pane,
    scroll_sync: bool,
    settings: Settings,
    settings_path: Option<PathBuf>,
    autosave: AutosaveScheduler,
    store: S,
}

impl<S: SessionStore> Session<S> {
    /// Rebuild the session from `store`, or start with two fresh documents.
    pub fn restore(settings: Settings, store: S, now: Instant) -> Self {
        let restored = match store.load() {
            Ok(Some(restored)) => restored,
            Ok(None) => {
                log::info!("No saved session, starting fresh");
                RestoredSession::default()
            }
            Err(e) => {
                log::warn!("Could not restore session, starting fresh: {e}");
                RestoredSession::default()
            }
        };

        let slot = |pane: Pane, document: Option<Document>| {
            let document = document.unwrap_or_else(|| {
                log::info!("Starting {pane} pane with a new document");
                Document::new(pane.untitled_name())
            });
            TrackedDocument::new(pane, document, SaveState::Saved)
        };

        Self {
            documents: [
                slot(Pane::Left, restored.left_document),
                slot(Pane::Right, restored.right_document),
            ],
            views: [PaneView::default(); 2],
            split_mode: SplitMode::default(),
            active_pane: Pane::Left,
            scroll_sync: false,
            autosave: AutosaveScheduler::new(&settings, now),
            settings,
            settings_path: None,
            store,
        }
    }

    /// Persist settings to `path` whenever they change.
    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn split_mode(&self) -> SplitMode {
        self.split_mode
    }

    pub fn active_pane(&self) -> Pane {
        self.active_pane
    }

    pub fn scroll_sync_enabled(&self) -> bool {
        self.scroll_sync
    }

    pub fn autosave(&self) -> &AutosaveScheduler {
        &self.autosave
    }

    /// The document slot `pane` is currently bound to.
    pub fn bound_slot(&self, pane: Pane) -> Pane {
        match (pane, self.split_mode) {
            (Pane::Right, SplitMode::SameDoc) => Pane::Left,
            _ => pane,
        }
    }

    fn tracked(&self, pane: Pane) -> &TrackedDocument {
        &self.documents[self.bound_slot(pane).index()]
    }

    fn tracked_mut(&mut self, pane: Pane) -> &mut TrackedDocument {
        let slot = self.bound_slot(pane);
        &mut self.documents[slot.index()]
    }

    pub fn document(&self, pane: Pane) -> &Document {
        self.tracked(pane).document()
    }

    pub fn save_state(&self, pane: Pane) -> SaveState {
        self.tracked(pane).save_state()
    }

    pub fn is_visible(&self, pane: Pane) -> bool {
        pane == Pane::Left || self.split_mode != SplitMode::Single
    }

    /// Slots with an open document of their own, in pane order.
    pub fn open_slots(&self) -> Vec<Pane> {
        match self.split_mode {
            SplitMode::DualDoc => Pane::BOTH.to_vec(),
            SplitMode::Single | SplitMode::SameDoc => vec![Pane::Left],
        }
    }

    /// Accept a change from the editing surface of `pane`.
    pub fn edit(&mut self, pane: Pane, update: DocumentUpdate) {
        self.tracked_mut(pane).apply(update);
        self.persist();
    }

    pub fn set_split_mode(&mut self, mode: SplitMode) {
        self.split_mode = mode;
        if mode == SplitMode::Single {
            self.active_pane = Pane::Left;
        }
        log::info!("Split mode: {mode}");
    }

    pub fn toggle_split_mode(&mut self) -> SplitMode {
        self.set_split_mode(self.split_mode.next());
        self.split_mode
    }

    /// Make `pane` the target of toolbar actions. The hidden right pane
    /// cannot take focus.
    pub fn focus(&mut self, pane: Pane) -> bool {
        if !self.is_visible(pane) {
            return false;
        }
        self.active_pane = pane;
        true
    }

    pub fn set_scroll_sync(&mut self, enabled: bool) {
        self.scroll_sync = enabled;
    }

    pub fn toggle_scroll_sync(&mut self) -> bool {
        self.scroll_sync = !self.scroll_sync;
        self.scroll_sync
    }

    pub fn scroll_metrics(&self, pane: Pane) -> Option<ScrollMetrics> {
        self.views[pane.index()].metrics
    }

    /// Record a pane's geometry without treating it as a scroll (resize,
    /// first layout).
    pub fn set_viewport(&mut self, pane: Pane, metrics: ScrollMetrics) {
        self.views[pane.index()].metrics = Some(metrics);
    }

    /// Handle a scroll event from `pane`. Returns the `scroll_top` the other
    /// pane must be moved to, when scroll sync applies and that pane is not
    /// already there.
    pub fn scroll(&mut self, pane: Pane, metrics: ScrollMetrics) -> Option<f64> {
        let user_initiated = self.views[pane.index()].observe(metrics);
        if !user_initiated || !self.scroll_sync || self.split_mode != SplitMode::SameDoc {
            return None;
        }
        self.views[pane.other().index()].mirror(metrics.ratio())
    }

    /// Replace the document behind `pane` with a fresh, unsaved one.
    pub fn new_document(&mut self, pane: Pane) {
        let slot = self.bound_slot(pane);
        let document = Document::new(slot.untitled_name());
        log::info!("New document in {slot} slot");
        self.documents[slot.index()].replace(document, SaveState::Unsaved);
        self.persist();
    }

    /// Ask the collaborator for a document and load it into `pane`.
    ///
    /// Returns `Ok(false)` when the user canceled. On any error the pane
    /// keeps its current document.
    pub fn open_document(&mut self, pane: Pane, io: &mut dyn FileIo) -> Result<bool, SessionError> {
        let opened = match io.open_file() {
            Ok(opened) => opened,
            Err(FileIoError::Canceled) => return Ok(false),
            Err(e) => {
                log::warn!("Open failed: {e}");
                return Err(SessionError::Open(e));
            }
        };

        let document = Document::from_json(&opened.content).inspect_err(|e| {
            log::warn!("Rejecting {}: {e}", opened.file_path.display());
        })?;
        let document = document.located_at(opened.file_path, opened.file_name);

        log::info!("Opened {} into {pane} pane", document.name());
        self.tracked_mut(pane).replace(document, SaveState::Saved);
        self.persist();
        Ok(true)
    }

    /// Start saving the document behind `pane`. `Ok(None)` means the request
    /// was folded into a save already in flight.
    pub fn begin_save(&mut self, pane: Pane) -> Result<Option<SaveJob>, SessionError> {
        match self.tracked_mut(pane).begin_save()? {
            SaveStart::Started(job) => Ok(Some(job)),
            SaveStart::Coalesced => Ok(None),
        }
    }

    /// Settle a save with the collaborator's result.
    pub fn finish_save(
        &mut self,
        job: SaveJob,
        result: Result<SavedFile, FileIoError>,
    ) -> SaveCompletion {
        let completion = self.documents[job.slot().index()].finish_save(job, result);
        if completion.outcome == SaveOutcome::Saved {
            self.persist();
        }
        completion
    }

    /// Drive `job` (and any follow-up it triggers) through `io` to the end.
    pub fn run_save(&mut self, mut job: SaveJob, io: &mut dyn FileIo) -> SaveOutcome {
        loop {
            let result = io.save_file(&job.request);
            let completion = self.finish_save(job, result);
            match completion.next {
                Some(next) => job = next,
                None => return completion.outcome,
            }
        }
    }

    pub fn save(&mut self, pane: Pane, io: &mut dyn FileIo) -> Result<SaveOutcome, SessionError> {
        match self.begin_save(pane)? {
            Some(job) => Ok(self.run_save(job, io)),
            None => Ok(SaveOutcome::Queued),
        }
    }

    pub fn export_request(&self, pane: Pane, format: ExportFormat) -> ExportRequest {
        let document = self.document(pane);
        ExportRequest {
            content: format.render(document.content()),
            default_name: document.default_file_name(format.extension()),
            format,
        }
    }

    /// Export the document behind `pane`. Save state is not affected.
    /// Returns `Ok(None)` when the user canceled.
    pub fn export(
        &mut self,
        pane: Pane,
        format: ExportFormat,
        io: &mut dyn FileIo,
    ) -> Result<Option<PathBuf>, SessionError> {
        let request = self.export_request(pane, format);
        match io.export_file(&request) {
            Ok(exported) => {
                log::info!("Exported to {}", exported.file_path.display());
                Ok(Some(exported.file_path))
            }
            Err(FileIoError::Canceled) => Ok(None),
            Err(e) => {
                log::warn!("Export failed: {e}");
                Err(SessionError::Export(e))
            }
        }
    }

    /// Apply a settings change, persist it and rebuild the autosave timer if
    /// its parameters moved.
    pub fn update_settings(&mut self, patch: SettingsPatch, now: Instant) -> &Settings {
        self.settings = self.settings.update(patch);
        if let Some(path) = &self.settings_path
            && let Err(e) = self.settings.save_to_path(path)
        {
            log::warn!("Failed to save settings: {e}");
        }
        self.autosave.reconfigure(&self.settings, now);
        &self.settings
    }

    /// Advance the autosave timer. When it fires, a save starts for every
    /// open slot that has unsaved changes; the jobs go to the collaborator.
    pub fn tick(&mut self, now: Instant) -> Vec<SaveJob> {
        if !self.autosave.poll(now) {
            return Vec::new();
        }

        let mut jobs = Vec::new();
        for slot in self.open_slots() {
            let tracked = &mut self.documents[slot.index()];
            if tracked.save_state() != SaveState::Unsaved {
                continue;
            }
            match tracked.begin_save() {
                Ok(SaveStart::Started(job)) => jobs.push(job),
                Ok(SaveStart::Coalesced) => {}
                Err(e) => log::warn!("Autosave of {slot} slot failed to start: {e}"),
            }
        }
        if !jobs.is_empty() {
            log::info!("Autosave started {} save(s)", jobs.len());
        }
        jobs
    }

    /// [`Session::tick`], running the resulting saves through `io`.
    pub fn tick_with(&mut self, now: Instant, io: &mut dyn FileIo) -> Vec<(Pane, SaveOutcome)> {
        self.tick(now)
            .into_iter()
            .map(|job| {
                let slot = job.slot();
                (slot, self.run_save(job, io))
            })
            .collect()
    }

    /// Run a user command against the active pane.
    pub fn execute(&mut self, command: Command, io: &mut dyn FileIo) -> Result<(), SessionError> {
        let pane = self.active_pane;
        match command {
            Command::New => self.new_document(pane),
            Command::Open => {
                self.open_document(pane, io)?;
            }
            Command::Save => {
                if let SaveOutcome::Failed(reason) = self.save(pane, io)? {
                    return Err(SessionError::SaveFailed(reason));
                }
            }
            Command::Export(format) => {
                self.export(pane, format, io)?;
            }
            Command::ToggleSplit => {
                self.toggle_split_mode();
            }
            Command::FocusLeft => {
                self.focus(Pane::Left);
            }
            Command::FocusRight => {
                self.focus(Pane::Right);
            }
            Command::ToggleScrollSync => {
                self.toggle_scroll_sync();
            }
        }
        Ok(())
    }

    /// Write the full session to the store. Failures are logged, never fatal.
    fn persist(&mut self) {
        let snapshot = SessionSnapshot {
            left_document: self.documents[0].document(),
            right_document: self.documents[1].document(),
            saved_at: Utc::now(),
        };
        if let Err(e) = self.store.save(&snapshot) {
            log::warn!("Failed to persist session: {e}");
        }
    }
}

#[cfg(test)]
mod tests;
