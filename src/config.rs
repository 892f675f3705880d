use crate::layout::LayoutKind;
use crate::settings::{ViewMode, WavepoolSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Complete application configuration for export/import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version field for future compatibility
    pub version: u32,
    pub settings: WavepoolSettings,
    pub layout: LayoutKind,
    pub view: ViewMode,
}

impl AppConfig {
    /// Default location, `<config dir>/wavepool/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("wavepool").join("config.json"))
    }

    /// Export config to a JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create config directory: {}", e))?;
            }
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;
        fs::write(path, json).map_err(|e| format!("Failed to write config file: {}", e))?;
        Ok(())
    }

    /// Import config from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {}", e))?;
        let mut config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;
        config.settings = config.settings.sanitized();
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            settings: WavepoolSettings::default(),
            layout: LayoutKind::default(),
            view: ViewMode::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_config_file_save_and_load() {
        let config = AppConfig {
            version: 1,
            settings: WavepoolSettings {
                idle_timeout_ms: 640,
                typist_enabled: true,
                typist_interval_ms: 120,
                show_labels: false,
            },
            layout: LayoutKind::Ortho,
            view: ViewMode::Pool,
        };

        let temp_file = NamedTempFile::new().unwrap();
        config.save_to_file(temp_file.path()).unwrap();
        let loaded = AppConfig::load_from_file(temp_file.path()).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        AppConfig::default().save_to_file(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_out_of_range_values_are_clamped_on_load() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(
            temp_file.path(),
            r#"{"version":1,"settings":{"idle_timeout_ms":65000,"typist_interval_ms":5},"layout":"Model01","view":"Keys"}"#,
        )
        .unwrap();
        let loaded = AppConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.settings.idle_timeout_ms, 60_000);
        assert_eq!(loaded.settings.typist_interval_ms, 50);
    }

    #[test]
    fn test_invalid_config_file() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "not valid json").unwrap();

        let result = AppConfig::load_from_file(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let result = AppConfig::load_from_file(Path::new("/nonexistent/path/config.json"));
        assert!(result.is_err());
    }
}
