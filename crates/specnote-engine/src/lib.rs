pub mod export;
pub mod io;
pub mod lifecycle;
pub mod model;
pub mod persistence;
pub mod session;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use export::{ExportFormat, to_markdown, to_plain_text};
pub use io::*;
pub use lifecycle::{SaveOutcome, SaveState};
pub use model::{Document, DocumentError, DocumentId, DocumentUpdate, Mark, Node, NodeKind};
pub use persistence::{JsonFileStore, MemoryStore, SessionStore};
pub use session::{Command, Pane, ScrollMetrics, Session, SessionError, SplitMode};
