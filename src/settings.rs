use crate::wavepool::DEFAULT_IDLE_TIMEOUT_MS;
use serde::{Deserialize, Serialize};

/// Upper bound for the idle timeout (one minute)
pub const MAX_IDLE_TIMEOUT_MS: u16 = 60_000;

/// How the pool view is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    /// Key caps at their physical positions
    #[default]
    Keys,
    /// Every grid cell, border ring included
    Pool,
}

impl ViewMode {
    pub fn name(&self) -> &str {
        match self {
            ViewMode::Keys => "Keys",
            ViewMode::Pool => "Pool",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ViewMode::Keys => ViewMode::Pool,
            ViewMode::Pool => ViewMode::Keys,
        }
    }
}

/// User-tunable parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WavepoolSettings {
    /// Idle time before raindrops start, 0 = never (0-60000)
    pub idle_timeout_ms: u16,
    /// Press random keys automatically
    pub typist_enabled: bool,
    /// Mean gap between ghost key presses (50-2000)
    pub typist_interval_ms: u64,
    /// Print key legends on the caps
    pub show_labels: bool,
}

impl Default for WavepoolSettings {
    fn default() -> Self {
        Self {
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
            typist_enabled: false,
            typist_interval_ms: 250,
            show_labels: true,
        }
    }
}

impl WavepoolSettings {
    /// Adjust idle timeout within bounds; steps through zero to disable rain
    pub fn adjust_idle_timeout(&mut self, delta: i32) {
        let value = (self.idle_timeout_ms as i32 + delta).clamp(0, MAX_IDLE_TIMEOUT_MS as i32);
        self.idle_timeout_ms = value as u16;
    }

    pub fn adjust_typist_interval(&mut self, delta: i64) {
        self.typist_interval_ms = (self.typist_interval_ms as i64 + delta).clamp(50, 2000) as u64;
    }

    pub fn toggle_typist(&mut self) {
        self.typist_enabled = !self.typist_enabled;
    }

    pub fn toggle_labels(&mut self) {
        self.show_labels = !self.show_labels;
    }

    /// Bring values loaded from disk back into range
    pub fn sanitized(mut self) -> Self {
        self.idle_timeout_ms = self.idle_timeout_ms.min(MAX_IDLE_TIMEOUT_MS);
        self.typist_interval_ms = self.typist_interval_ms.clamp(50, 2000);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_timeout_bounds() {
        let mut settings = WavepoolSettings::default();
        settings.adjust_idle_timeout(-100_000);
        assert_eq!(settings.idle_timeout_ms, 0);
        settings.adjust_idle_timeout(100_000);
        assert_eq!(settings.idle_timeout_ms, MAX_IDLE_TIMEOUT_MS);
    }

    #[test]
    fn test_typist_interval_bounds() {
        let mut settings = WavepoolSettings::default();
        settings.adjust_typist_interval(-10_000);
        assert_eq!(settings.typist_interval_ms, 50);
        settings.adjust_typist_interval(10_000);
        assert_eq!(settings.typist_interval_ms, 2000);
    }

    #[test]
    fn test_sanitized() {
        let settings = WavepoolSettings {
            idle_timeout_ms: u16::MAX,
            typist_interval_ms: 1,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(settings.idle_timeout_ms, MAX_IDLE_TIMEOUT_MS);
        assert_eq!(settings.typist_interval_ms, 50);
    }

    #[test]
    fn test_view_mode_cycles() {
        assert_eq!(ViewMode::Keys.next().next(), ViewMode::Keys);
        assert_eq!(ViewMode::Pool.name(), "Pool");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: WavepoolSettings = serde_json::from_str(r#"{"idle_timeout_ms": 160}"#).unwrap();
        assert_eq!(settings.idle_timeout_ms, 160);
        assert!(settings.show_labels);
    }
}
