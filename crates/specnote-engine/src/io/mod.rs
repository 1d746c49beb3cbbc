//! The file-I/O collaborator: dialogs and disk access live behind [`FileIo`].
//!
//! Every call either completes, is canceled by the user
//! ([`FileIoError::Canceled`], which callers treat as a no-op), or fails.

use std::fs;
use std::path::{Path, PathBuf};

use crate::export::ExportFormat;
use crate::model::display_name_for;

#[derive(Debug, thiserror::Error)]
pub enum FileIoError {
    #[error("Canceled by user")]
    Canceled,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Failed(String),
}

impl FileIoError {
    pub fn is_canceled(&self) -> bool {
        matches!(self, FileIoError::Canceled)
    }
}

/// Write a document snapshot. With no `file_path` the collaborator must ask
/// for a destination, proposing `default_name`.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub content: String,
    pub file_path: Option<PathBuf>,
    pub default_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavedFile {
    pub file_path: PathBuf,
    /// Display name derived from the location, if the collaborator has one.
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenedFile {
    pub file_path: PathBuf,
    pub file_name: Option<String>,
    pub content: String,
}

/// Write exported text. Always asks for a destination.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub content: String,
    pub default_name: String,
    pub format: ExportFormat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFile {
    pub file_path: PathBuf,
}

pub trait FileIo {
    fn save_file(&mut self, request: &SaveRequest) -> Result<SavedFile, FileIoError>;
    fn open_file(&mut self) -> Result<OpenedFile, FileIoError>;
    fn export_file(&mut self, request: &ExportRequest) -> Result<ExportedFile, FileIoError>;
}

/// What a destination chooser is being asked for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Prompt<'a> {
    Save { default_name: &'a str },
    Open,
    Export {
        default_name: &'a str,
        format: ExportFormat,
    },
}

/// [`FileIo`] over the local filesystem.
///
/// Destination selection is delegated to `choose`, which returns `None` when
/// the user backs out.
pub struct FsFileIo<F>
where
    F: FnMut(Prompt<'_>) -> Option<PathBuf>,
{
    choose: F,
}

impl<F> FsFileIo<F>
where
    F: FnMut(Prompt<'_>) -> Option<PathBuf>,
{
    pub fn new(choose: F) -> Self {
        Self { choose }
    }
}

impl<F> FileIo for FsFileIo<F>
where
    F: FnMut(Prompt<'_>) -> Option<PathBuf>,
{
    fn save_file(&mut self, request: &SaveRequest) -> Result<SavedFile, FileIoError> {
        let target = match &request.file_path {
            Some(path) => path.clone(),
            None => (self.choose)(Prompt::Save {
                default_name: &request.default_name,
            })
            .ok_or(FileIoError::Canceled)?,
        };

        write_text(&target, &request.content)?;

        Ok(SavedFile {
            file_name: display_name_for(&target),
            file_path: target,
        })
    }

    fn open_file(&mut self) -> Result<OpenedFile, FileIoError> {
        let path = (self.choose)(Prompt::Open).ok_or(FileIoError::Canceled)?;
        let content = fs::read_to_string(&path)?;

        Ok(OpenedFile {
            file_name: display_name_for(&path),
            file_path: path,
            content,
        })
    }

    fn export_file(&mut self, request: &ExportRequest) -> Result<ExportedFile, FileIoError> {
        let target = (self.choose)(Prompt::Export {
            default_name: &request.default_name,
            format: request.format,
        })
        .ok_or(FileIoError::Canceled)?;

        write_text(&target, &request.content)?;

        Ok(ExportedFile { file_path: target })
    }
}

fn write_text(path: &Path, content: &str) -> Result<(), FileIoError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}
