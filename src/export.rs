use crate::color::Rgb;
use crate::layout::{KeyLayout, COLS, GRID_HEIGHT, GRID_WIDTH, ROWS};
use crate::leds::LedFrame;
use image::RgbImage;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Pixels per grid cell in exported images
const CELL_PX: u32 = 16;
/// Gap around each key cap
const CAP_INSET: u32 = 1;
const BACKGROUND: Rgb = Rgb::new(18, 18, 24);
const CAP_EDGE: Rgb = Rgb::new(48, 48, 56);

/// GIF frame delay in centiseconds, closest to the 32 ms frame
const GIF_DELAY_CS: u16 = 3;
/// Roughly thirty seconds of frames
pub const MAX_GIF_FRAMES: usize = 940;

/// Draw the LED frame as key caps at their grid positions
pub fn frame_image(frame: &LedFrame, layout: &KeyLayout) -> RgbImage {
    let width = GRID_WIDTH as u32 * CELL_PX;
    let height = GRID_HEIGHT as u32 * CELL_PX;
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND.into());

    for row in 0..ROWS {
        for col in 0..COLS {
            let (gx, gy) = layout.grid_xy(row, col);
            let color = frame.get(row, col);
            let x0 = gx as u32 * CELL_PX;
            let y0 = gy as u32 * CELL_PX;
            for dy in CAP_INSET..CELL_PX - CAP_INSET {
                for dx in CAP_INSET..CELL_PX - CAP_INSET {
                    let edge = dx == CAP_INSET
                        || dy == CAP_INSET
                        || dx == CELL_PX - CAP_INSET - 1
                        || dy == CELL_PX - CAP_INSET - 1;
                    let c = if edge && color == Rgb::BLACK { CAP_EDGE } else { color };
                    img.put_pixel(x0 + dx, y0 + dy, c.into());
                }
            }
        }
    }
    img
}

/// Save one LED frame as a PNG
pub fn save_png(frame: &LedFrame, layout: &KeyLayout, path: &Path) -> Result<(), String> {
    frame_image(frame, layout)
        .save(path)
        .map_err(|e| format!("Failed to write image {}: {}", path.display(), e))
}

/// `wavepool-<unix seconds>.<ext>` in the pictures directory, or the
/// working directory when there is none
pub fn default_export_path(ext: &str) -> PathBuf {
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let name = format!("wavepool-{}.{}", stamp, ext);
    dirs::picture_dir().unwrap_or_default().join(name)
}

/// Collects rendered frames for an animated GIF
pub struct GifRecorder {
    frames: Vec<RgbImage>,
}

impl Default for GifRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl GifRecorder {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Append a frame; returns false once the recording is full
    pub fn push(&mut self, frame: &LedFrame, layout: &KeyLayout) -> bool {
        if self.frames.len() >= MAX_GIF_FRAMES {
            return false;
        }
        self.frames.push(frame_image(frame, layout));
        true
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Encode all frames as a looping GIF
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let first = self.frames.first().ok_or("Nothing recorded")?;
        let (width, height) = (first.width() as u16, first.height() as u16);

        let file = File::create(path)
            .map_err(|e| format!("Failed to create {}: {}", path.display(), e))?;
        let mut encoder = gif::Encoder::new(file, width, height, &[])
            .map_err(|e| format!("Failed to start GIF: {}", e))?;
        encoder
            .set_repeat(gif::Repeat::Infinite)
            .map_err(|e| format!("Failed to start GIF: {}", e))?;

        for img in &self.frames {
            let mut frame = gif::Frame::from_rgb_speed(width, height, img.as_raw(), 10);
            frame.delay = GIF_DELAY_CS;
            encoder
                .write_frame(&frame)
                .map_err(|e| format!("Failed to write GIF frame: {}", e))?;
        }
        Ok(())
    }
}
