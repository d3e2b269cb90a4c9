//! tuql Settings
//!
//! Settings are persisted as pretty-printed JSON. Every section is
//! `#[serde(default)]`, so a file that only mentions some keys still loads
//! and the rest fall back to defaults.

use anyhow::{Context, Result, bail, ensure};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod settings_file;

pub use settings_file::*;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct TuqlSettings {
    pub pagination: PaginationSettings,
    pub filters: FilterSettings,
    pub editor: EditorSettings,
    pub logging: LoggingSettings,
}

impl TuqlSettings {
    /// Load from the default location, falling back to defaults when the file
    /// does not exist.
    pub fn load() -> Result<Self> {
        let path = Self::settings_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(?path, "no settings file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        let settings: Self =
            serde_json::from_str(&content).with_context(|| "Failed to parse settings JSON")?;
        settings
            .validate()
            .with_context(|| format!("Invalid settings in {:?}", path))?;
        Ok(settings)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::settings_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create settings directory: {:?}", parent))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {:?}", path))?;
        Ok(())
    }

    pub fn settings_path() -> Result<PathBuf> {
        settings_file()
    }

    pub fn validate(&self) -> Result<()> {
        self.pagination.validate()?;
        self.filters.validate()?;
        self.editor.validate()
    }
}

/// Windowed-cache policy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PaginationSettings {
    /// Rows fetched per page
    pub page_size: u64,
    /// Prefetch when the cursor gets this close to either edge of the window
    pub load_threshold: u64,
    /// Trim once the window holds more than this many pages
    pub max_loaded_pages: u64,
    /// Pages kept on each side of the cursor's page when trimming
    pub trim_distance_pages: u64,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            page_size: 500,
            load_threshold: 50,
            max_loaded_pages: 5,
            trim_distance_pages: 2,
        }
    }
}

pub const MAX_PAGE_SIZE: u64 = 100_000;

impl PaginationSettings {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            (1..=MAX_PAGE_SIZE).contains(&self.page_size),
            "page_size must be between 1 and {}, got {}",
            MAX_PAGE_SIZE,
            self.page_size
        );
        ensure!(self.max_loaded_pages > 0, "max_loaded_pages must be non-zero");
        let kept = self
            .trim_distance_pages
            .checked_mul(2)
            .and_then(|n| n.checked_add(1));
        match kept {
            Some(kept) if kept <= self.max_loaded_pages => Ok(()),
            _ => bail!(
                "trim_distance_pages {} keeps more pages than max_loaded_pages {}",
                self.trim_distance_pages,
                self.max_loaded_pages
            ),
        }
    }
}

/// Limits applied when filters are edited
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FilterSettings {
    pub max_value_len: usize,
    pub max_in_list_items: usize,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            max_value_len: 4096,
            max_in_list_items: 1000,
        }
    }
}

impl FilterSettings {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.max_value_len > 0, "max_value_len must be non-zero");
        ensure!(self.max_in_list_items > 0, "max_in_list_items must be non-zero");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EditorSettings {
    pub max_buffer_bytes: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            max_buffer_bytes: 16 * 1024 * 1024,
        }
    }
}

impl EditorSettings {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.max_buffer_bytes > 0, "max_buffer_bytes must be non-zero");
        Ok(())
    }
}

/// Logging preferences read by the binary at startup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Write JSON logs to daily rolling files
    pub file_logging: bool,
    /// Directory for log files; defaults to the data directory
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logging: false,
            log_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_valid() {
        let settings = TuqlSettings::default();
        settings.validate().unwrap();
        assert_eq!(settings.pagination.page_size, 500);
        assert_eq!(settings.pagination.load_threshold, 50);
        assert_eq!(settings.pagination.max_loaded_pages, 5);
        assert_eq!(settings.pagination.trim_distance_pages, 2);
        assert_eq!(settings.filters.max_value_len, 4096);
        assert_eq!(settings.editor.max_buffer_bytes, 16 * 1024 * 1024);
    }

    #[test]
    fn test_partial_file_loads_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "pagination": { "page_size": 200 } }"#).unwrap();

        let settings = TuqlSettings::load_from(&path).unwrap();
        assert_eq!(settings.pagination.page_size, 200);
        assert_eq!(settings.pagination.load_threshold, 50);
        assert_eq!(settings.filters, FilterSettings::default());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = TuqlSettings::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings, TuqlSettings::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut settings = TuqlSettings::default();
        settings.logging.level = "debug".to_string();
        settings.save_to(&path).unwrap();

        assert_eq!(TuqlSettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_invalid_pagination_rejected() {
        let mut pagination = PaginationSettings {
            page_size: 0,
            ..Default::default()
        };
        assert!(pagination.validate().is_err());

        pagination.page_size = 100;
        pagination.trim_distance_pages = 3;
        assert!(pagination.validate().is_err());

        pagination.max_loaded_pages = 7;
        assert!(pagination.validate().is_ok());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "pagination": { "page_size": 1000000 } }"#).unwrap();
        assert!(TuqlSettings::load_from(&path).is_err());
    }
}
