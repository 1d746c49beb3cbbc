//! # Content Tree Model
//!
//! The structured document: a tree of [`Node`]s rooted at a `doc` element,
//! inline [`Mark`]s on text leaves, and the [`Document`] record that carries
//! identity and location metadata around a tree.
//!
//! There is no mutation API here. The editing surface hands over whole
//! replacement trees and [`Document::edited`] turns them into the next
//! snapshot.

pub mod document;
pub mod mark;
pub mod node;

pub use document::{
    Document, DocumentError, DocumentId, DocumentUpdate, INTERCHANGE_EXTENSION,
    NATIVE_EXTENSION, display_name_for,
};
pub use mark::Mark;
pub use node::{Attrs, Element, Node, NodeKind, TextRun, Walk};
