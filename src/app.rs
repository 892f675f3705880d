use crate::clock::SystemClock;
use crate::config::AppConfig;
use crate::export::{self, GifRecorder};
use crate::keymap;
use crate::layout::LayoutKind;
use crate::leds::LedFrame;
use crate::presets::{Preset, PresetManager};
use crate::settings::{ViewMode, WavepoolSettings};
use crate::typist::GhostTypist;
use crate::wavepool::{KeyState, KeyboardPool, Wavepool};
use crossterm::event::KeyCode;
use log::{info, warn};
use std::path::PathBuf;
use std::time::Instant;

/// Focus state for parameter editing in the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    IdleTimeout,
    TypistInterval,
    Labels,
    Layout,
    View,
}

impl Focus {
    pub fn next(&self) -> Focus {
        match self {
            Focus::IdleTimeout => Focus::TypistInterval,
            Focus::TypistInterval => Focus::Labels,
            Focus::Labels => Focus::Layout,
            Focus::Layout => Focus::View,
            Focus::View => Focus::IdleTimeout,
        }
    }

    pub fn prev(&self) -> Focus {
        match self {
            Focus::IdleTimeout => Focus::View,
            Focus::TypistInterval => Focus::IdleTimeout,
            Focus::Labels => Focus::TypistInterval,
            Focus::Layout => Focus::Labels,
            Focus::View => Focus::Layout,
        }
    }
}

/// Main application state
pub struct App {
    pub pool: KeyboardPool<SystemClock>,
    pub leds: LedFrame,
    pub settings: WavepoolSettings,
    pub layout: LayoutKind,
    pub view: ViewMode,
    pub focus: Focus,
    pub show_help: bool,
    pub help_scroll: u16,
    pub presets: PresetManager,
    pub current_preset: Option<String>,
    /// Last user-facing message, shown in the status box
    pub status: Option<String>,
    pub recorder: Option<GifRecorder>,
    config_path: Option<PathBuf>,
    typist: GhostTypist,
    last_tick: Instant,
}

impl App {
    pub fn new(config: AppConfig, config_path: Option<PathBuf>, presets: PresetManager) -> Self {
        let mut pool = Wavepool::new(config.layout.layout(), SystemClock::new());
        pool.idle_timeout_ms = config.settings.idle_timeout_ms;
        Self {
            pool,
            leds: LedFrame::new(),
            settings: config.settings,
            layout: config.layout,
            view: config.view,
            focus: Focus::default(),
            show_help: false,
            help_scroll: 0,
            presets,
            current_preset: None,
            status: None,
            recorder: None,
            config_path,
            typist: GhostTypist::new(),
            last_tick: Instant::now(),
        }
    }

    /// Current state as a saveable config
    pub fn config(&self) -> AppConfig {
        AppConfig {
            settings: self.settings.clone(),
            layout: self.layout,
            view: self.view,
            ..Default::default()
        }
    }

    /// Called every loop iteration; the pool gates itself to its frame rate
    pub fn tick(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick);
        self.last_tick = now;

        self.pool.idle_timeout_ms = self.settings.idle_timeout_ms;

        if self.settings.typist_enabled && !self.pool.paused {
            if let Some((row, col)) = self.typist.poll(elapsed, self.settings.typist_interval_ms) {
                self.pool.on_key_transition(row, col, KeyState::Pressed);
            }
        }

        if self.pool.advance(&mut self.leds) {
            self.record_frame();
        }
    }

    fn record_frame(&mut self) {
        let layout = self.layout.layout();
        let full = match &mut self.recorder {
            Some(recorder) => !recorder.push(&self.leds, &layout),
            None => false,
        };
        if full {
            self.stop_recording();
        }
    }

    /// Feed a terminal key transition to the board; false if it has no key cap
    pub fn key_transition(&mut self, code: KeyCode, state: KeyState) -> bool {
        match keymap::key_position(code) {
            Some((row, col)) => {
                self.pool.on_key_transition(row, col, state);
                true
            }
            None => false,
        }
    }

    pub fn press_key(&mut self, code: KeyCode) -> bool {
        self.key_transition(code, KeyState::Pressed)
    }

    pub fn adjust_focused_up(&mut self) {
        match self.focus {
            Focus::IdleTimeout => self.settings.adjust_idle_timeout(self.idle_step()),
            Focus::TypistInterval => self.settings.adjust_typist_interval(50),
            Focus::Labels => self.settings.toggle_labels(),
            Focus::Layout => self.cycle_layout(),
            Focus::View => self.cycle_view(),
        }
        self.current_preset = None;
    }

    pub fn adjust_focused_down(&mut self) {
        match self.focus {
            Focus::IdleTimeout => self.settings.adjust_idle_timeout(-self.idle_step()),
            Focus::TypistInterval => self.settings.adjust_typist_interval(-50),
            Focus::Labels => self.settings.toggle_labels(),
            Focus::Layout => self.cycle_layout(),
            Focus::View => self.cycle_view(),
        }
        self.current_preset = None;
    }

    /// Fine steps near zero, coarse ones above a few seconds
    fn idle_step(&self) -> i32 {
        if self.settings.idle_timeout_ms < 1000 {
            32
        } else {
            500
        }
    }

    pub fn next_focus(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn prev_focus(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn toggle_pause(&mut self) {
        self.pool.toggle_pause();
    }

    pub fn reset(&mut self) {
        self.pool.reset();
    }

    pub fn toggle_typist(&mut self) {
        self.settings.toggle_typist();
    }

    pub fn cycle_layout(&mut self) {
        self.layout = self.layout.next();
        self.pool.set_mapper(self.layout.layout());
    }

    pub fn cycle_view(&mut self) {
        self.view = self.view.next();
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0;
        }
    }

    pub fn scroll_help_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(1);
    }

    pub fn scroll_help_down(&mut self, max_scroll: u16) {
        self.help_scroll = (self.help_scroll + 1).min(max_scroll);
    }

    pub fn apply_preset(&mut self, preset: &Preset) {
        self.settings = preset.settings.clone().sanitized();
        self.current_preset = Some(preset.name.clone());
        info!("Applied preset {}", preset.name);
    }

    pub fn next_preset(&mut self) {
        let next = self.presets.next_after(self.current_preset.as_deref()).cloned();
        if let Some(preset) = next {
            self.status = Some(format!("Preset: {}", preset.name));
            self.apply_preset(&preset);
        }
    }

    /// Write the current settings to the config file
    pub fn save_config(&mut self) {
        let Some(path) = self.config_path.clone().or_else(AppConfig::default_path) else {
            self.status = Some("No config directory".to_string());
            return;
        };
        match self.config().save_to_file(&path) {
            Ok(()) => {
                info!("Saved config to {}", path.display());
                self.status = Some(format!("Saved {}", path.display()));
            }
            Err(e) => {
                warn!("{}", e);
                self.status = Some(e);
            }
        }
    }

    pub fn snapshot(&mut self) {
        let path = export::default_export_path("png");
        match export::save_png(&self.leds, &self.layout.layout(), &path) {
            Ok(()) => {
                info!("Snapshot saved to {}", path.display());
                self.status = Some(format!("Saved {}", path.display()));
            }
            Err(e) => {
                warn!("{}", e);
                self.status = Some(e);
            }
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_some()
    }

    pub fn toggle_recording(&mut self) {
        if self.is_recording() {
            self.stop_recording();
        } else {
            info!("Recording started");
            self.recorder = Some(GifRecorder::new());
            self.status = Some("Recording...".to_string());
        }
    }

    /// Flush anything still in progress before exit
    pub fn finish(&mut self) {
        self.stop_recording();
    }

    fn stop_recording(&mut self) {
        let Some(recorder) = self.recorder.take() else { return };
        let path = export::default_export_path("gif");
        match recorder.save(&path) {
            Ok(()) => {
                info!("Recorded {} frames to {}", recorder.len(), path.display());
                self.status = Some(format!("Saved {}", path.display()));
            }
            Err(e) => {
                warn!("{}", e);
                self.status = Some(e);
            }
        }
    }
}
