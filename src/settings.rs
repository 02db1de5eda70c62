//! # Settings Module
//!
//! ## Purpose
//! Holds the tunable parts of the engine: how duplicate names in a data file are treated,
//! which block is the mobility table, physical constants and the log level of the binary.
//! Settings live in a JSON file (`elytra_settings.json` by default); a missing file means defaults.
//!
//! ## Configuration Format
//! ```json
//! {
//!   "duplicate_policy": "Error",
//!   "mobility_blocks": ["mobilities", "mobility", "ion mobilities"],
//!   "faraday": 96485.33212,
//!   "strict_pka_order": true,
//!   "davies_a": 0.509,
//!   "log_level": "info"
//! }
//! ```
//!
//! ## Usage
//! ```rust
//! use ElyTra::settings::{DuplicatePolicy, EngineSettings};
//!
//! let settings = EngineSettings::default();
//! assert_eq!(settings.duplicate_policy, DuplicatePolicy::Error);
//! assert!(settings.is_mobility_block("Mobilities"));
//! ```
use log::{LevelFilter, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Faraday constant, C/mol
pub const FARADAY: f64 = 96485.33212;
/// Davies "A" constant for water at 25 C, (L/mol)^0.5
pub const DAVIES_A_25C: f64 = 0.509;
pub const DEFAULT_SETTINGS_FILE: &str = "elytra_settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings file I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Settings file is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

/// What happens when a block name (or a key inside one block) appears twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DuplicatePolicy {
    /// reject the data file with a ParseError
    #[default]
    Error,
    /// the later definition replaces the earlier one
    Override,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub duplicate_policy: DuplicatePolicy,
    /// block names (compared case-insensitively) holding the ion mobility table
    pub mobility_blocks: Vec<String>,
    /// C/mol
    pub faraday: f64,
    /// reject records whose pKa list decreases somewhere
    pub strict_pka_order: bool,
    pub davies_a: f64,
    /// off, error, warn, info, debug or trace
    pub log_level: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Error,
            mobility_blocks: vec![
                "mobilities".to_string(),
                "mobility".to_string(),
                "ion mobilities".to_string(),
            ],
            faraday: FARADAY,
            strict_pka_order: true,
            davies_a: DAVIES_A_25C,
            log_level: "info".to_string(),
        }
    }
}

impl EngineSettings {
    /// Loads settings from a JSON file, or returns defaults when the file does not exist.
    ///
    /// # Arguments
    /// * `path` - path to the settings file
    ///
    /// # Returns
    /// * `Ok(EngineSettings)` - loaded or default settings
    /// * `Err(SettingsError)` - the file exists but cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let settings: EngineSettings = serde_json::from_str(&content)?;
            info!("settings loaded from {}", path.display());
            Ok(settings)
        } else {
            info!(
                "settings file {} not found, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// Writes the settings as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn is_mobility_block(&self, name: &str) -> bool {
        let name = name.trim();
        self.mobility_blocks
            .iter()
            .any(|block| block.trim().eq_ignore_ascii_case(name))
    }

    /// Log level for the terminal logger; unknown names fall back to Info.
    pub fn level_filter(&self) -> LevelFilter {
        match self.log_level.trim().to_lowercase().as_str() {
            "off" => LevelFilter::Off,
            "error" => LevelFilter::Error,
            "warn" | "warning" => LevelFilter::Warn,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            _ => LevelFilter::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("no_such_settings.json");
        let settings = EngineSettings::load(&path).unwrap();
        assert_eq!(settings, EngineSettings::default());
    }

    #[test]
    fn save_and_load() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("settings.json");
        let mut settings = EngineSettings::default();
        settings.duplicate_policy = DuplicatePolicy::Override;
        settings.strict_pka_order = false;
        settings.log_level = "debug".to_string();
        settings.save(&path).unwrap();
        let loaded = EngineSettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.level_filter(), LevelFilter::Debug);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, r#"{ "duplicate_policy": "Override" }"#).unwrap();
        let loaded = EngineSettings::load(&path).unwrap();
        assert_eq!(loaded.duplicate_policy, DuplicatePolicy::Override);
        assert_eq!(loaded.faraday, FARADAY);
        assert!(loaded.is_mobility_block("mobilities"));
    }

    #[test]
    fn broken_json_is_an_error() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, "{ duplicate_policy: ").unwrap();
        assert!(matches!(
            EngineSettings::load(&path),
            Err(SettingsError::Serde(_))
        ));
    }
}
