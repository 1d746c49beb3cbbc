//! # Document Lifecycle & Save-State Machine
//!
//! [`TrackedDocument`] pairs a document with its save state and drives saves
//! as two halves: [`TrackedDocument::begin_save`] produces a [`SaveJob`] for
//! the file-I/O collaborator, [`TrackedDocument::finish_save`] settles it.
//! Edits keep flowing in between. [`AutosaveScheduler`] owns the one
//! process-wide autosave timer.

pub mod autosave;
pub mod save_state;

pub use autosave::{AutosaveScheduler, AutosaveTimer};
pub use save_state::{
    SaveCompletion, SaveJob, SaveOutcome, SaveStart, SaveState, TrackedDocument,
};
