//! Shared fixtures for unit tests across the engine.

use std::collections::VecDeque;
use std::path::PathBuf;

use crate::io::{
    ExportRequest, ExportedFile, FileIo, FileIoError, OpenedFile, SaveRequest, SavedFile,
};
use crate::model::{DocumentUpdate, Node, display_name_for};

/// [`FileIo`] that replays queued results and records what it was asked.
///
/// With nothing queued, a save to a known path succeeds, and any call that
/// would need a dialog is canceled.
#[derive(Default)]
pub struct ScriptedIo {
    pub saves: VecDeque<Result<SavedFile, FileIoError>>,
    pub opens: VecDeque<Result<OpenedFile, FileIoError>>,
    pub exports: VecDeque<Result<ExportedFile, FileIoError>>,
    pub save_requests: Vec<SaveRequest>,
    pub export_requests: Vec<ExportRequest>,
}

impl ScriptedIo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next save dialog with `path`.
    pub fn save_to(mut self, path: &str) -> Self {
        self.saves.push_back(Ok(saved(path)));
        self
    }

    pub fn fail_save(mut self, reason: &str) -> Self {
        self.saves
            .push_back(Err(FileIoError::Failed(reason.to_string())));
        self
    }

    pub fn open(mut self, path: &str, content: impl Into<String>) -> Self {
        let file_path = PathBuf::from(path);
        self.opens.push_back(Ok(OpenedFile {
            file_name: display_name_for(&file_path),
            file_path,
            content: content.into(),
        }));
        self
    }

    pub fn export_to(mut self, path: &str) -> Self {
        self.exports.push_back(Ok(ExportedFile {
            file_path: PathBuf::from(path),
        }));
        self
    }
}

impl FileIo for ScriptedIo {
    fn save_file(&mut self, request: &SaveRequest) -> Result<SavedFile, FileIoError> {
        self.save_requests.push(request.clone());
        if let Some(result) = self.saves.pop_front() {
            return result;
        }
        match &request.file_path {
            Some(path) => Ok(SavedFile {
                file_path: path.clone(),
                file_name: display_name_for(path),
            }),
            None => Err(FileIoError::Canceled),
        }
    }

    fn open_file(&mut self) -> Result<OpenedFile, FileIoError> {
        self.opens.pop_front().unwrap_or(Err(FileIoError::Canceled))
    }

    fn export_file(&mut self, request: &ExportRequest) -> Result<ExportedFile, FileIoError> {
        self.export_requests.push(request.clone());
        self.exports.pop_front().unwrap_or(Err(FileIoError::Canceled))
    }
}

pub fn saved(path: &str) -> SavedFile {
    let file_path = PathBuf::from(path);
    SavedFile {
        file_name: display_name_for(&file_path),
        file_path,
    }
}

/// An update replacing the whole tree with one paragraph of `text`.
pub fn paragraph_update(text: &str) -> DocumentUpdate {
    DocumentUpdate::content(Node::doc(vec![Node::paragraph(vec![Node::text(text)])]))
}
