use crate::app::{App, Focus};
use crate::color::Rgb;
use crate::keymap;
use crate::layout::{COLS, GRID_HEIGHT, GRID_WIDTH, ROWS};
use crate::render::height_to_rgb;
use crate::settings::ViewMode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SIDEBAR_WIDTH: u16 = 26;

/// Max scroll for help content (generous to account for text wrapping on small screens)
pub const HELP_CONTENT_LINES: u16 = 40;

// UI color scheme
const BORDER_COLOR: Color = Color::Cyan;
const HIGHLIGHT_COLOR: Color = Color::Yellow;
const TEXT_COLOR: Color = Color::White;
const DIM_TEXT_COLOR: Color = Color::Gray;
const REC_COLOR: Color = Color::Red;
const UNLIT_CAP: Color = Color::Rgb(40, 40, 48);

/// Creates a standard styled block with rounded borders
fn styled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(title)
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(area);

    render_sidebar(frame, layout[0], app);
    render_canvas(frame, layout[1], app);

    if app.show_help {
        render_help_overlay(frame, area, app);
    }
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // Status
            Constraint::Length(7), // Parameters
            Constraint::Min(6),    // Controls
        ])
        .split(area);

    render_status_box(frame, sections[0], app);
    render_params_box(frame, sections[1], app);
    render_controls_box(frame, sections[2]);
}

fn render_status_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Wavepool ");
    let stats = &app.pool.stats;

    let (status_text, status_color) = if app.pool.paused {
        ("PAUSED", HIGHLIGHT_COLOR)
    } else {
        ("RUNNING", BORDER_COLOR)
    };

    let rain = match app.pool.frames_until_rain() {
        Some(0) => "now".to_string(),
        Some(frames) => format!("in {} frames", frames),
        None => "off".to_string(),
    };

    let line = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<8}", label), Style::default().fg(DIM_TEXT_COLOR)),
            Span::styled(value, Style::default().fg(TEXT_COLOR)),
        ])
    };

    let mut state = vec![Span::styled(status_text, Style::default().fg(status_color))];
    if let Some(recorder) = &app.recorder {
        state.push(Span::styled(
            format!("  REC {}", recorder.len()),
            Style::default().fg(REC_COLOR),
        ));
    }

    let content = vec![
        Line::from(state),
        line("Frames", stats.frames.to_string()),
        line("Keys", stats.key_presses.to_string()),
        line("Drops", stats.raindrops.to_string()),
        line("Idle", format!("{} frames", app.pool.frames_since_event())),
        line("Rain", rain),
        Line::from(Span::styled(
            app.status.clone().unwrap_or_default(),
            Style::default().fg(DIM_TEXT_COLOR),
        )),
    ];

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}

fn render_params_box(frame: &mut Frame, area: Rect, app: &App) {
    let title = match &app.current_preset {
        Some(name) => format!(" {} ", name),
        None => " Parameters ".to_string(),
    };
    let block = styled_block(&title);

    let make_line = |label: &str, value: String, focused: bool| {
        let prefix = if focused { "> " } else { "  " };
        let style = if focused {
            Style::default().fg(HIGHLIGHT_COLOR)
        } else {
            Style::default().fg(TEXT_COLOR)
        };
        Line::from(Span::styled(format!("{}{}: {}", prefix, label, value), style))
    };

    let settings = &app.settings;
    let idle = if settings.idle_timeout_ms == 0 {
        "off".to_string()
    } else {
        format!("{} ms", settings.idle_timeout_ms)
    };
    let typist = if settings.typist_enabled {
        format!("{} ms", settings.typist_interval_ms)
    } else {
        format!("off ({} ms)", settings.typist_interval_ms)
    };

    let content = vec![
        make_line("Idle", idle, app.focus == Focus::IdleTimeout),
        make_line("Typist", typist, app.focus == Focus::TypistInterval),
        make_line(
            "Labels",
            if settings.show_labels { "on" } else { "off" }.to_string(),
            app.focus == Focus::Labels,
        ),
        make_line("Layout", app.layout.name().to_string(), app.focus == Focus::Layout),
        make_line("View", app.view.name().to_string(), app.focus == Focus::View),
    ];

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}

fn render_controls_box(frame: &mut Frame, area: Rect) {
    let key_style = Style::default().fg(HIGHLIGHT_COLOR);
    let desc_style = Style::default().fg(DIM_TEXT_COLOR);

    let make_control = |key: &'static str, desc: &'static str| -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("{:>5}", key), key_style),
            Span::styled(format!(" {}", desc), desc_style),
        ])
    };

    let content = vec![
        make_control("keys", "make waves"),
        make_control("F1", "help"),
        make_control("F2", "view"),
        make_control("F3", "ghost typist"),
        make_control("F4", "layout"),
        make_control("F5", "PNG snapshot"),
        make_control("F6", "GIF record"),
        make_control("F7", "reset"),
        make_control("F8", "pause"),
        make_control("F9", "next preset"),
        make_control("F10", "save config"),
        make_control("←/→", "focus"),
        make_control("↑/↓", "adjust"),
        make_control("^C/^Q", "quit"),
    ];

    let paragraph = Paragraph::new(content).block(styled_block(" Controls "));
    frame.render_widget(paragraph, area);
}

/// Size of one grid cell in terminal cells and the board origin, centred in `inner`
fn board_geometry(inner: Rect) -> (u16, u16, u16, u16) {
    let cell_w = (inner.width / GRID_WIDTH as u16).max(1);
    let cell_h = (inner.height / GRID_HEIGHT as u16).max(1);
    let board_w = cell_w * GRID_WIDTH as u16;
    let board_h = cell_h * GRID_HEIGHT as u16;
    let x = inner.x + inner.width.saturating_sub(board_w) / 2;
    let y = inner.y + inner.height.saturating_sub(board_h) / 2;
    (cell_w, cell_h, x, y)
}

/// Rect of grid cell (gx, gy), clipped to `inner`; None when off screen
fn cell_rect(inner: Rect, gx: usize, gy: usize) -> Option<Rect> {
    let (cell_w, cell_h, x0, y0) = board_geometry(inner);
    let x = x0 + gx as u16 * cell_w;
    let y = y0 + gy as u16 * cell_h;
    let right = inner.x + inner.width;
    let bottom = inner.y + inner.height;
    if x >= right || y >= bottom {
        return None;
    }
    Some(Rect {
        x,
        y,
        width: cell_w.min(right - x),
        height: cell_h.min(bottom - y),
    })
}

/// Legend color readable on top of `bg`
fn label_color(bg: Rgb) -> Color {
    if bg.luma() > 128 {
        Color::Black
    } else {
        Color::White
    }
}

fn render_canvas(frame: &mut Frame, area: Rect, app: &App) {
    let title = format!(" {} / {} ", app.layout.name(), app.view.name());
    let block = styled_block(&title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match app.view {
        ViewMode::Keys => render_keys(frame, inner, app),
        ViewMode::Pool => render_pool(frame, inner, app),
    }
}

fn render_keys(frame: &mut Frame, inner: Rect, app: &App) {
    let layout = app.layout.layout();
    for row in 0..ROWS {
        for col in 0..COLS {
            let (gx, gy) = layout.grid_xy(row, col);
            let Some(mut rect) = cell_rect(inner, gx, gy) else { continue };
            // one column of gap between caps when there is room
            if rect.width >= 3 {
                rect.width -= 1;
            }

            let led = app.leds.get(row, col);
            let bg = if led == Rgb::BLACK { UNLIT_CAP } else { led.into() };
            let label = if app.settings.show_labels {
                keymap::legend(row, col)
            } else {
                ""
            };
            let cap = Paragraph::new(label)
                .alignment(Alignment::Center)
                .style(Style::default().bg(bg).fg(label_color(led)));
            frame.render_widget(cap, rect);
        }
    }
}

fn render_pool(frame: &mut Frame, inner: Rect, app: &App) {
    let page = app.pool.rendered_page();
    let hue = app.pool.hue();
    for gy in 0..GRID_HEIGHT {
        for gx in 0..GRID_WIDTH {
            let Some(rect) = cell_rect(inner, gx, gy) else { continue };
            let height = page.get(gx, gy).unwrap_or(0);
            let color: Color = height_to_rgb(height, hue).into();
            frame.render_widget(Block::default().style(Style::default().bg(color)), rect);
        }
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect, app: &App) {
    let canvas_width = area.width.saturating_sub(SIDEBAR_WIDTH);

    // Center the help dialog within the canvas
    let help_width = 56.min(canvas_width.saturating_sub(4));
    let help_height = area.height.saturating_sub(4).min(30);
    let x = SIDEBAR_WIDTH + (canvas_width.saturating_sub(help_width)) / 2;
    let y = (area.height.saturating_sub(help_height)) / 2;

    let help_area = Rect {
        x: area.x + x,
        y: area.y + y,
        width: help_width,
        height: help_height,
    };

    frame.render_widget(Clear, help_area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled("WAVEPOOL", Style::default().fg(BORDER_COLOR))),
        Line::from(""),
        Line::from("Every key press drops a stone into a pool of water that lies under the keyboard. Ripples spread across the caps, fading as they go."),
        Line::from(""),
        Line::from(Span::styled("RAIN:", Style::default().fg(HIGHLIGHT_COLOR))),
        Line::from("Leave the keyboard alone for the idle timeout and raindrops start to fall at random spots. Any key press stops the rain. An idle timeout of 0 disables rain."),
        Line::from(""),
        Line::from(Span::styled("COLOR:", Style::default().fg(HIGHLIGHT_COLOR))),
        Line::from("Taller water is brighter and whiter. The base hue drifts by one step every frame."),
        Line::from(""),
        Line::from(Span::styled("VIEWS (F2):", Style::default().fg(HIGHLIGHT_COLOR))),
        Line::from("Keys shows the lit caps; Pool shows the whole water grid, including the still border ring."),
        Line::from(""),
        Line::from(Span::styled("CONTROLS:", Style::default().fg(HIGHLIGHT_COLOR))),
        Line::from("F3=Ghost typist, F4=Layout, F5=PNG, F6=GIF, F7=Reset, F8=Pause, F9=Preset, F10=Save config, Arrows=Adjust, Ctrl+C=Quit"),
        Line::from(""),
    ];

    let content_height = content.len() as u16;
    let visible_height = help_height.saturating_sub(2);
    let max_scroll = content_height.saturating_sub(visible_height);

    let title = if max_scroll > 0 {
        " Help (↑↓ scroll, F1 to close) "
    } else {
        " Help (F1 to close) "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(HIGHLIGHT_COLOR))
        .title(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll, 0));

    frame.render_widget(paragraph, help_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::presets::PresetManager;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_board_fits_canvas() {
        let inner = Rect::new(10, 2, 83, 30);
        let (cell_w, cell_h, x, y) = board_geometry(inner);
        assert_eq!((cell_w, cell_h), (4, 3));
        assert_eq!(x, 10 + 1);
        assert_eq!(y, 2 + 3);
        assert!(cell_rect(inner, GRID_WIDTH - 1, GRID_HEIGHT - 1).is_some());
    }

    #[test]
    fn test_tiny_canvas_clips() {
        let inner = Rect::new(0, 0, 10, 4);
        assert!(cell_rect(inner, 0, 0).is_some());
        assert!(cell_rect(inner, GRID_WIDTH - 1, 0).is_none());
    }

    #[test]
    fn test_label_contrast() {
        assert_eq!(label_color(Rgb::new(255, 255, 255)), Color::Black);
        assert_eq!(label_color(Rgb::BLACK), Color::White);
    }

    #[test]
    fn test_renders_both_views() {
        let mut app = App::new(AppConfig::default(), None, PresetManager::with_dir(None));
        let mut terminal = Terminal::new(TestBackend::new(120, 36)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        app.cycle_view();
        app.toggle_help();
        terminal.draw(|frame| render(frame, &app)).unwrap();
    }
}
