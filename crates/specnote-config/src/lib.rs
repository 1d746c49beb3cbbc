use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Autosave interval bounds, in seconds.
pub const MIN_AUTOSAVE_INTERVAL: u32 = 5;
pub const MAX_AUTOSAVE_INTERVAL: u32 = 300;

const MIN_LINE_SPACING: f64 = 1.0;
const MAX_LINE_SPACING: f64 = 3.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read settings file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse settings file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Process-wide editor settings.
///
/// Every field has a default, so a settings file written by an older build
/// (or edited by hand down to a single key) still loads into a complete record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub autosave_enabled: bool,
    /// Seconds between autosave ticks, kept within
    /// [`MIN_AUTOSAVE_INTERVAL`]..=[`MAX_AUTOSAVE_INTERVAL`].
    pub autosave_interval: u32,
    pub show_line_numbers: bool,
    pub default_font_size: String,
    /// 1.0 = single, 1.5 = one and a half, 2.0 = double
    pub line_spacing: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            autosave_enabled: true,
            autosave_interval: 30,
            show_line_numbers: false,
            default_font_size: "15px".to_string(),
            line_spacing: 1.4,
        }
    }
}

/// A partial settings change. `None` leaves the current value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub autosave_enabled: Option<bool>,
    pub autosave_interval: Option<u32>,
    pub show_line_numbers: Option<bool>,
    pub default_font_size: Option<String>,
    pub line_spacing: Option<f64>,
}

impl Settings {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let settings: Settings =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(Some(settings.normalized()))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        Self::load_from_path(Self::config_path())
    }

    /// Load settings, falling back to defaults when the file is missing or unreadable.
    pub fn load_or_default_from_path<P: AsRef<Path>>(config_path: P) -> Self {
        match Self::load_from_path(config_path) {
            Ok(Some(settings)) => settings,
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    pub fn load_or_default() -> Self {
        Self::load_or_default_from_path(Self::config_path())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to_path(Self::config_path())
    }

    /// Apply a partial change and return the normalised result.
    pub fn update(&self, patch: SettingsPatch) -> Self {
        let mut next = self.clone();
        if let Some(enabled) = patch.autosave_enabled {
            next.autosave_enabled = enabled;
        }
        if let Some(interval) = patch.autosave_interval {
            next.autosave_interval = interval;
        }
        if let Some(show) = patch.show_line_numbers {
            next.show_line_numbers = show;
        }
        if let Some(size) = patch.default_font_size {
            next.default_font_size = size;
        }
        if let Some(spacing) = patch.line_spacing {
            next.line_spacing = spacing;
        }
        next.normalized()
    }

    /// Clamp out-of-range values into their legal bounds.
    pub fn normalized(mut self) -> Self {
        self.autosave_interval = self
            .autosave_interval
            .clamp(MIN_AUTOSAVE_INTERVAL, MAX_AUTOSAVE_INTERVAL);
        self.line_spacing = if self.line_spacing.is_finite() {
            self.line_spacing.clamp(MIN_LINE_SPACING, MAX_LINE_SPACING)
        } else {
            Self::default().line_spacing
        };
        self
    }

    pub fn autosave_period(&self) -> Duration {
        Duration::from_secs(u64::from(self.autosave_interval))
    }

    pub fn config_dir() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/specnote");
        PathBuf::from(config_dir.as_ref())
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("settings.toml")
    }

    /// Where the open-documents session snapshot is kept.
    pub fn session_path() -> PathBuf {
        Self::config_dir().join("session.json")
    }
}
