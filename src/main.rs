mod app;
mod clock;
mod color;
mod config;
mod export;
mod grid;
mod keymap;
mod layout;
mod leds;
mod noise;
mod presets;
mod render;
mod settings;
mod typist;
mod ui;
mod wavepool;

use app::App;
use clap::Parser;
use clock::ManualClock;
use config::AppConfig;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use export::GifRecorder;
use layout::LayoutKind;
use leds::LedFrame;
use log::{info, warn};
use presets::{Preset, PresetManager};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::error::Error;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use typist::GhostTypist;
use wavepool::{KeyState, KeyboardPool, Wavepool};

#[derive(Parser, Debug)]
#[command(name = "wavepool")]
#[command(about = "Water ripple keyboard lighting simulation in the terminal")]
struct Args {
    /// Idle time before raindrops start in ms (0 disables rain, max 60000)
    #[arg(short = 'i', long = "idle-timeout")]
    idle_timeout: Option<u16>,

    /// Physical key layout (model01, ortho)
    #[arg(short = 'l', long)]
    layout: Option<String>,

    /// Start from a named preset (built-in or user)
    #[arg(short = 'p', long)]
    preset: Option<String>,

    /// Config file to load instead of the default one
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Let the ghost typist press random keys
    #[arg(long)]
    typist: bool,

    /// Mean gap between ghost key presses in ms (50-2000)
    #[arg(long = "typist-interval")]
    typist_interval: Option<u64>,

    /// Hide key legends
    #[arg(long = "no-labels")]
    no_labels: bool,

    /// Run this many frames without a terminal and exit
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u64>,

    /// PNG of the final frame (headless mode)
    #[arg(long, value_name = "PNG")]
    snapshot: Option<PathBuf>,

    /// GIF of every frame (headless mode)
    #[arg(long, value_name = "GIF")]
    record: Option<PathBuf>,

    /// Save the resulting settings as a user preset and exit
    #[arg(long = "save-preset", value_name = "NAME")]
    save_preset: Option<String>,

    /// Delete a user preset and exit
    #[arg(long = "delete-preset", value_name = "NAME")]
    delete_preset: Option<String>,

    /// Write logs to this file (filtered by RUST_LOG, default info)
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

/// The terminal owns stdout and stderr, so logs only go to a file
fn init_logging(path: &Path) -> Result<(), Box<dyn Error>> {
    let file = File::create(path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Config file, then preset, then command line flags
fn resolve_config(args: &Args, presets: &PresetManager) -> Result<AppConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => match AppConfig::default_path().filter(|p| p.exists()) {
            Some(path) => match AppConfig::load_from_file(&path) {
                Ok(config) => {
                    info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Ignoring {}: {}", path.display(), e);
                    AppConfig::default()
                }
            },
            None => AppConfig::default(),
        },
    };

    if let Some(name) = &args.preset {
        let preset = presets
            .find(name)
            .ok_or_else(|| format!("Unknown preset '{}' (have: {})", name, presets.preset_names().join(", ")))?;
        config.settings = preset.settings.clone();
    }

    let settings = &mut config.settings;
    if let Some(ms) = args.idle_timeout {
        settings.idle_timeout_ms = ms;
    }
    if args.typist {
        settings.typist_enabled = true;
    }
    if let Some(ms) = args.typist_interval {
        settings.typist_interval_ms = ms;
    }
    if args.no_labels {
        settings.show_labels = false;
    }
    if let Some(name) = &args.layout {
        config.layout = LayoutKind::parse(name);
    }
    config.settings = config.settings.sanitized();
    Ok(config)
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let mut presets = PresetManager::new();
    let config = resolve_config(&args, &presets)?;
    info!(
        "Starting with layout {}, idle timeout {} ms",
        config.layout.name(),
        config.settings.idle_timeout_ms
    );

    if let Some(name) = &args.save_preset {
        presets.save_preset(Preset::new(name.as_str(), "Saved from the command line", config.settings.clone()))?;
        println!("Saved preset '{}'", name);
        return Ok(());
    }

    if let Some(name) = &args.delete_preset {
        presets.delete_preset(name)?;
        println!("Deleted preset '{}'", name);
        return Ok(());
    }

    if let Some(frames) = args.headless {
        return run_headless(&config, frames, args.snapshot.as_deref(), args.record.as_deref());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, args.config.clone(), presets);
    if let Some(name) = &args.preset {
        app.current_preset = Some(name.clone());
    }

    let res = run_app(&mut terminal, &mut app);
    app.finish();

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

/// Drive the pool from a hand-stepped clock, one frame per iteration
fn run_headless(
    config: &AppConfig,
    frames: u64,
    snapshot: Option<&Path>,
    record: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    const FRAME_MS: u64 = 1 << noise::MS_PER_FRAME_POW2;

    let clock = ManualClock::new(0);
    let layout = config.layout.layout();
    let mut pool: KeyboardPool<ManualClock> = Wavepool::new(layout, clock.clone());
    pool.idle_timeout_ms = config.settings.idle_timeout_ms;

    let mut leds = LedFrame::new();
    let mut typist = GhostTypist::new();
    let mut recorder = record.map(|_| GifRecorder::new());

    for _ in 0..frames {
        clock.advance(FRAME_MS);
        if config.settings.typist_enabled {
            let elapsed = Duration::from_millis(FRAME_MS);
            if let Some((row, col)) = typist.poll(elapsed, config.settings.typist_interval_ms) {
                pool.on_key_transition(row, col, KeyState::Pressed);
            }
        }
        pool.advance(&mut leds);
        if let Some(recorder) = &mut recorder {
            recorder.push(&leds, &layout);
        }
    }
    if recorder.as_ref().is_some_and(|r| r.len() >= export::MAX_GIF_FRAMES) {
        warn!("Recording stopped at {} frames", export::MAX_GIF_FRAMES);
    }

    let stats = pool.stats;
    info!("Headless run done: {:?}", stats);
    println!(
        "{} frames, {} raindrops, {} key presses, {} keys lit",
        stats.frames,
        stats.raindrops,
        stats.key_presses,
        leds.lit_count()
    );

    if let Some(path) = snapshot {
        export::save_png(&leds, &layout, path)?;
        println!("Wrote {}", path.display());
    }
    if let (Some(recorder), Some(path)) = (recorder, record) {
        if recorder.is_empty() {
            warn!("No frames recorded, skipping {}", path.display());
        } else {
            recorder.save(path)?;
            println!("Wrote {} ({} frames)", path.display(), recorder.len());
        }
    }
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    // Redraw twice per simulation frame
    const POLL_DURATION: Duration = Duration::from_millis(16);

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(POLL_DURATION)? {
            if let Event::Key(key) = event::read()? {
                // Repeats and releases only reach the board
                if key.kind != KeyEventKind::Press {
                    let state = match key.kind {
                        KeyEventKind::Repeat => KeyState::Held,
                        _ => KeyState::Released,
                    };
                    app.key_transition(key.code, state);
                    continue;
                }

                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    match key.code {
                        KeyCode::Char('c') | KeyCode::Char('q') => return Ok(()),
                        _ => continue,
                    }
                }

                match key.code {
                    KeyCode::F(1) => app.toggle_help(),
                    KeyCode::F(2) => app.cycle_view(),
                    KeyCode::F(3) => app.toggle_typist(),
                    KeyCode::F(4) => app.cycle_layout(),
                    KeyCode::F(5) => app.snapshot(),
                    KeyCode::F(6) => app.toggle_recording(),
                    KeyCode::F(7) => app.reset(),
                    KeyCode::F(8) => app.toggle_pause(),
                    KeyCode::F(9) => app.next_preset(),
                    KeyCode::F(10) => app.save_config(),
                    KeyCode::Left => app.prev_focus(),
                    KeyCode::Right => app.next_focus(),
                    KeyCode::Up if app.show_help => app.scroll_help_up(),
                    KeyCode::Down if app.show_help => app.scroll_help_down(ui::HELP_CONTENT_LINES),
                    KeyCode::Up => app.adjust_focused_up(),
                    KeyCode::Down => app.adjust_focused_down(),
                    KeyCode::Esc if app.show_help => app.toggle_help(),
                    code => {
                        app.press_key(code);
                    }
                }
            }
        }

        app.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["wavepool"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut saved = AppConfig::default();
        saved.settings.idle_timeout_ms = 999;
        saved.layout = LayoutKind::Ortho;
        saved.save_to_file(&path).unwrap();

        let path_str = path.to_str().unwrap();
        let presets = PresetManager::with_dir(None);
        let config = resolve_config(&args(&["--config", path_str]), &presets).unwrap();
        assert_eq!(config.settings.idle_timeout_ms, 999);
        assert_eq!(config.layout, LayoutKind::Ortho);

        let config = resolve_config(
            &args(&["--config", path_str, "-i", "64", "--layout", "model01", "--no-labels"]),
            &presets,
        )
        .unwrap();
        assert_eq!(config.settings.idle_timeout_ms, 64);
        assert_eq!(config.layout, LayoutKind::Model01);
        assert!(!config.settings.show_labels);
    }

    #[test]
    fn test_preset_then_flags() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("none.json");
        AppConfig::default().save_to_file(&path).unwrap();
        let path_str = path.to_str().unwrap();
        let presets = PresetManager::with_dir(None);

        let config = resolve_config(&args(&["-c", path_str, "--preset", "downpour"]), &presets).unwrap();
        assert_eq!(config.settings.idle_timeout_ms, 160);

        let config = resolve_config(
            &args(&["-c", path_str, "--preset", "ghost typist", "--typist-interval", "5"]),
            &presets,
        )
        .unwrap();
        assert!(config.settings.typist_enabled);
        assert_eq!(config.settings.typist_interval_ms, 50);

        assert!(resolve_config(&args(&["-c", path_str, "--preset", "nope"]), &presets).is_err());
    }

    #[test]
    fn test_headless_writes_exports() {
        let dir = tempdir().unwrap();
        let png = dir.path().join("last.png");
        let gif = dir.path().join("run.gif");
        let mut config = AppConfig::default();
        config.settings.idle_timeout_ms = 160;

        run_headless(&config, 48, Some(&png), Some(&gif)).unwrap();
        assert!(png.exists());
        assert!(gif.exists());
    }

    #[test]
    fn test_headless_skips_empty_recording() {
        let dir = tempdir().unwrap();
        let gif = dir.path().join("empty.gif");
        run_headless(&AppConfig::default(), 0, None, Some(&gif)).unwrap();
        assert!(!gif.exists());
    }
}
