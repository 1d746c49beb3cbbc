//! # Serialization Engine
//!
//! Pure, deterministic renderers from a content tree to text. Output depends
//! only on tree shape, child order and the fixed mark order; both targets are
//! lossy: underline and text styling never reach Markdown.
//!
//! Unknown element types render as the plain text of their descendants.

mod markdown;
mod plain_text;

use std::fmt;
use std::str::FromStr;

use crate::model::{Element, Node};

pub use markdown::to_markdown;
pub use plain_text::to_plain_text;

/// Target format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Markdown,
    PlainText,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::PlainText => "txt",
        }
    }

    pub fn render(self, root: &Node) -> String {
        match self {
            ExportFormat::Markdown => to_markdown(root),
            ExportFormat::PlainText => to_plain_text(root),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown export format `{0}` (expected `md` or `txt`)")]
pub struct UnknownFormat(String);

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            "txt" | "text" | "plain" => Ok(ExportFormat::PlainText),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}

/// Render each top-level block, join with newlines and trim the result.
fn join_blocks(root: &Node, render: impl Fn(&Node) -> String) -> String {
    root.children()
        .iter()
        .map(render)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// `## Title` followed by a newline. Marks inside headings are not rendered.
fn heading_line(element: &Element) -> String {
    format!(
        "{} {}\n",
        "#".repeat(element.heading_level()),
        element.text_content()
    )
}

/// A paragraph's rendered text, or a lone newline to keep vertical spacing.
fn paragraph_line(text: String) -> String {
    if text.is_empty() {
        "\n".to_string()
    } else {
        format!("{text}\n")
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}
