use std::fmt;
use std::str::FromStr;

use crate::export::ExportFormat;

/// User-level actions, all aimed at the active pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    New,
    Open,
    Save,
    Export(ExportFormat),
    ToggleSplit,
    FocusLeft,
    FocusRight,
    ToggleScrollSync,
}

impl Command {
    pub const ALL: [Command; 9] = [
        Command::New,
        Command::Open,
        Command::Save,
        Command::Export(ExportFormat::Markdown),
        Command::Export(ExportFormat::PlainText),
        Command::ToggleSplit,
        Command::FocusLeft,
        Command::FocusRight,
        Command::ToggleScrollSync,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Command::New => "new",
            Command::Open => "open",
            Command::Save => "save",
            Command::Export(ExportFormat::Markdown) => "export-md",
            Command::Export(ExportFormat::PlainText) => "export-txt",
            Command::ToggleSplit => "split",
            Command::FocusLeft => "focus-left",
            Command::FocusRight => "focus-right",
            Command::ToggleScrollSync => "scroll-sync",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Command::New => "New Document",
            Command::Open => "Open Document",
            Command::Save => "Save",
            Command::Export(ExportFormat::Markdown) => "Export as Markdown",
            Command::Export(ExportFormat::PlainText) => "Export as Plain Text",
            Command::ToggleSplit => "Toggle Split View",
            Command::FocusLeft => "Focus Left Pane",
            Command::FocusRight => "Focus Right Pane",
            Command::ToggleScrollSync => "Toggle Scroll Sync",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown command `{0}`")]
pub struct UnknownCommand(String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|command| command.id() == s)
            .ok_or_else(|| UnknownCommand(s.to_string()))
    }
}
