use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{FinmanError, Result};
use crate::fmt::FormatConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Logs opened when none are given on the command line.
    #[serde(default)]
    pub log_files: Vec<String>,
    #[serde(default = "default_fields")]
    pub default_fields: String,
    #[serde(default = "default_csv_separator")]
    pub csv_separator: char,
    #[serde(default)]
    pub output_width: Option<usize>,
    #[serde(default)]
    pub format: FormatConfig,
}

fn default_fields() -> String {
    "date|details:40|value|category|remark:30".to_string()
}

fn default_csv_separator() -> char {
    ';'
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_files: Vec::new(),
            default_fields: default_fields(),
            csv_separator: default_csv_separator(),
            output_width: None,
            format: FormatConfig::default(),
        }
    }
}

impl Settings {
    /// Log paths with a leading `~` expanded.
    pub fn log_paths(&self) -> Vec<PathBuf> {
        self.log_files.iter().map(|f| PathBuf::from(shellexpand_path(f))).collect()
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("finman")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Settings from the user's config file, defaults when there is none.
pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

/// Missing keys take their defaults; an unreadable file is reported and
/// replaced by the defaults.
pub fn load_settings_from(path: &Path) -> Settings {
    if !path.exists() {
        return Settings::default();
    }
    let parsed = std::fs::read_to_string(path)
        .map_err(FinmanError::from)
        .and_then(|content| serde_json::from_str(&content).map_err(FinmanError::from));
    match parsed {
        Ok(settings) => settings,
        Err(e) => {
            warn!(file = %path.display(), "ignoring settings: {e}");
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(settings, &settings_path())
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| FinmanError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            log_files: vec!["~/ledger/2024.jsonl".to_string()],
            csv_separator: ',',
            output_width: Some(120),
            ..Default::default()
        };
        save_settings_to(&settings, &path).unwrap();
        assert_eq!(load_settings_from(&path), settings);
    }

    #[test]
    fn test_load_returns_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let s = load_settings_from(&dir.path().join("nope.json"));
        assert_eq!(s, Settings::default());
        assert_eq!(s.default_fields, "date|details:40|value|category|remark:30");
        assert_eq!(s.csv_separator, ';');
        assert_eq!(s.format.currency, "EUR");
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"log_files": ["a.jsonl"], "format": {"currency": "CHF"}}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.log_files, vec!["a.jsonl"]);
        assert_eq!(s.format.currency, "CHF");
        assert_eq!(s.format.date_format, "%d.%m.%Y");
        assert_eq!(s.csv_separator, ';');
        assert_eq!(s.output_width, None);
    }

    #[test]
    fn test_broken_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings_from(&path), Settings::default());
    }

    #[test]
    fn test_save_creates_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("nested").join("settings.json");
        save_settings_to(&Settings::default(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_shellexpand_leaves_plain_paths() {
        assert_eq!(shellexpand_path("logs/a.jsonl"), "logs/a.jsonl");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                shellexpand_path("~/a.jsonl"),
                format!("{}/a.jsonl", home.to_string_lossy())
            );
        }
    }
}
