//! Editor settings management
//!
//! Settings are kept as pretty-printed JSON next to the user's other
//! application data. A missing or unreadable file never stops the editor:
//! loading falls back to defaults.

use crate::{FileFormat, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use toc_edit::EditorOptions;
use toc_model::export::ExportFilter;

/// Settings file name inside the application data directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Main settings container
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorSettings {
    /// Editing session settings
    pub editor: EditorOptions,
    /// Export settings
    pub export: ExportSettings,
}

/// How bookmarks are written out
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportSettings {
    /// Format used when a destination has no recognizable extension
    pub default_format: FileFormat,
    /// Whether unchecked bookmarks are written as well
    pub include_unchecked: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            default_format: FileFormat::Vbkm,
            include_unchecked: true,
        }
    }
}

impl ExportSettings {
    pub fn filter(&self) -> ExportFilter {
        if self.include_unchecked {
            ExportFilter::All
        } else {
            ExportFilter::CheckedOnly
        }
    }
}

/// Settings manager for loading, saving, and updating settings
#[derive(Debug)]
pub struct SettingsManager {
    /// Path to the settings file
    settings_path: PathBuf,
    /// Current settings (cached)
    current: EditorSettings,
}

impl SettingsManager {
    /// Create a settings manager for the given app data directory
    pub fn new(app_data_dir: impl AsRef<Path>) -> Self {
        Self::with_path(app_data_dir.as_ref().join(SETTINGS_FILE))
    }

    /// Create a settings manager for an explicit settings file
    pub fn with_path(settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
            current: EditorSettings::default(),
        }
    }

    /// Get the path to the settings file
    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Load settings from disk, or use defaults if the file is missing or
    /// cannot be parsed
    pub fn load_sync(&mut self) -> Result<&EditorSettings> {
        if self.settings_path.exists() {
            let content = std::fs::read_to_string(&self.settings_path)?;
            match serde_json::from_str::<EditorSettings>(&content) {
                Ok(settings) => {
                    self.current = settings;
                }
                Err(e) => {
                    tracing::warn!(
                        path = %self.settings_path.display(),
                        "Failed to parse settings file, using defaults: {}",
                        e
                    );
                    self.current = EditorSettings::default();
                }
            }
        } else {
            self.current = EditorSettings::default();
        }
        Ok(&self.current)
    }

    /// Save current settings to disk
    pub fn save_sync(&self) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.current)?;
        std::fs::write(&self.settings_path, content)?;
        Ok(())
    }

    /// Get current settings
    pub fn get(&self) -> &EditorSettings {
        &self.current
    }

    /// Replace settings and save to disk
    pub fn update_sync(&mut self, settings: EditorSettings) -> Result<()> {
        self.current = settings;
        self.save_sync()
    }

    /// Reset settings to defaults and save
    pub fn reset_sync(&mut self) -> Result<&EditorSettings> {
        self.current = EditorSettings::default();
        self.save_sync()?;
        Ok(&self.current)
    }
}
