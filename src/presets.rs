use crate::settings::WavepoolSettings;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// A named set of wavepool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub description: String,
    pub settings: WavepoolSettings,
}

impl Preset {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        settings: WavepoolSettings,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            settings,
        }
    }
}

/// Manager for loading and saving presets
pub struct PresetManager {
    /// Built-in presets that ship with the app
    pub builtin: Vec<Preset>,
    /// User-created presets loaded from disk
    pub user: Vec<Preset>,
    dir: Option<PathBuf>,
}

impl Default for PresetManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetManager {
    /// Built-ins plus user presets from the config directory
    pub fn new() -> Self {
        Self::with_dir(dirs::config_dir().map(|p| p.join("wavepool").join("presets")))
    }

    pub fn with_dir(dir: Option<PathBuf>) -> Self {
        let mut manager = Self {
            builtin: Self::builtin_presets(),
            user: Vec::new(),
            dir,
        };
        manager.load_user_presets();
        manager
    }

    fn builtin_presets() -> Vec<Preset> {
        vec![
            Preset::new(
                "Calm",
                "Raindrops after five idle seconds",
                WavepoolSettings::default(),
            ),
            Preset::new(
                "Drizzle",
                "Rain starts after one idle second",
                WavepoolSettings {
                    idle_timeout_ms: 1000,
                    ..Default::default()
                },
            ),
            Preset::new(
                "Downpour",
                "Near-constant rain",
                WavepoolSettings {
                    idle_timeout_ms: 160,
                    ..Default::default()
                },
            ),
            Preset::new(
                "Still",
                "Only key presses disturb the water",
                WavepoolSettings {
                    idle_timeout_ms: 0,
                    ..Default::default()
                },
            ),
            Preset::new(
                "Ghost Typist",
                "Keys press themselves",
                WavepoolSettings {
                    idle_timeout_ms: 0,
                    typist_enabled: true,
                    typist_interval_ms: 180,
                    ..Default::default()
                },
            ),
        ]
    }

    fn load_user_presets(&mut self) {
        let Some(dir) = &self.dir else { return };
        let Ok(entries) = fs::read_dir(dir) else { return };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "json") {
                match fs::read_to_string(&path)
                    .map_err(|e| e.to_string())
                    .and_then(|c| serde_json::from_str::<Preset>(&c).map_err(|e| e.to_string()))
                {
                    Ok(preset) => self.user.push(preset),
                    Err(e) => warn!("Skipping preset {}: {}", path.display(), e),
                }
            }
        }
        self.user.sort_by(|a, b| a.name.cmp(&b.name));
    }

    fn file_name(name: &str) -> String {
        let stem = name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect::<String>();
        format!("{}.json", stem)
    }

    pub fn save_preset(&mut self, preset: Preset) -> Result<(), String> {
        let dir = self.dir.as_ref().ok_or("Could not determine config directory")?;

        fs::create_dir_all(dir).map_err(|e| format!("Failed to create presets directory: {}", e))?;

        let path = dir.join(Self::file_name(&preset.name));
        let json = serde_json::to_string_pretty(&preset)
            .map_err(|e| format!("Failed to serialize preset: {}", e))?;
        fs::write(&path, json).map_err(|e| format!("Failed to write preset file: {}", e))?;

        match self.user.iter_mut().find(|p| p.name == preset.name) {
            Some(existing) => *existing = preset,
            None => self.user.push(preset),
        }

        Ok(())
    }

    pub fn delete_preset(&mut self, name: &str) -> Result<(), String> {
        let dir = self.dir.as_ref().ok_or("Could not determine config directory")?;

        if let Some(pos) = self.user.iter().position(|p| p.name == name) {
            self.user.remove(pos);
        }

        let path = dir.join(Self::file_name(name));
        if path.exists() {
            fs::remove_file(&path).map_err(|e| format!("Failed to delete preset file: {}", e))?;
        }

        Ok(())
    }

    pub fn all_presets(&self) -> impl Iterator<Item = &Preset> {
        self.builtin.iter().chain(self.user.iter())
    }

    pub fn find(&self, name: &str) -> Option<&Preset> {
        self.all_presets().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Preset after `current` in display order, wrapping; first if unknown
    pub fn next_after(&self, current: Option<&str>) -> Option<&Preset> {
        let all: Vec<&Preset> = self.all_presets().collect();
        let idx = current
            .and_then(|name| all.iter().position(|p| p.name == name))
            .map_or(0, |i| (i + 1) % all.len());
        all.get(idx).copied()
    }

    pub fn preset_names(&self) -> Vec<&str> {
        self.all_presets().map(|p| p.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_builtin_lookup_is_case_insensitive() {
        let manager = PresetManager::with_dir(None);
        let preset = manager.find("downpour").unwrap();
        assert_eq!(preset.settings.idle_timeout_ms, 160);
        assert!(manager.find("missing").is_none());
    }

    #[test]
    fn test_save_load_and_delete_user_preset() {
        let dir = tempdir().unwrap();
        let mut manager = PresetManager::with_dir(Some(dir.path().to_path_buf()));
        let settings = WavepoolSettings {
            idle_timeout_ms: 321,
            ..Default::default()
        };
        manager.save_preset(Preset::new("My Rain!", "mine", settings)).unwrap();
        assert!(dir.path().join("My_Rain_.json").exists());

        let reloaded = PresetManager::with_dir(Some(dir.path().to_path_buf()));
        assert_eq!(reloaded.find("my rain!").unwrap().settings.idle_timeout_ms, 321);

        manager.delete_preset("My Rain!").unwrap();
        assert!(manager.find("My Rain!").is_none());
        assert!(!dir.path().join("My_Rain_.json").exists());
    }

    #[test]
    fn test_saving_twice_replaces() {
        let dir = tempdir().unwrap();
        let mut manager = PresetManager::with_dir(Some(dir.path().to_path_buf()));
        manager.save_preset(Preset::new("x", "", WavepoolSettings::default())).unwrap();
        manager.save_preset(Preset::new("x", "second", WavepoolSettings::default())).unwrap();
        assert_eq!(manager.user.len(), 1);
        assert_eq!(manager.user[0].description, "second");
    }

    #[test]
    fn test_broken_user_preset_is_skipped() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{").unwrap();
        let manager = PresetManager::with_dir(Some(dir.path().to_path_buf()));
        assert!(manager.user.is_empty());
    }

    #[test]
    fn test_save_without_dir_fails() {
        let mut manager = PresetManager::with_dir(None);
        let result = manager.save_preset(Preset::new("x", "", WavepoolSettings::default()));
        assert!(result.is_err());
    }

    #[test]
    fn test_next_after_wraps() {
        let manager = PresetManager::with_dir(None);
        assert_eq!(manager.next_after(None).unwrap().name, "Calm");
        assert_eq!(manager.next_after(Some("Calm")).unwrap().name, "Drizzle");
        assert_eq!(manager.next_after(Some("Ghost Typist")).unwrap().name, "Calm");
        assert_eq!(manager.preset_names().len(), 5);
    }
}
