use crate::color::Rgb;
use crate::layout::{COLS, ROWS};
use crate::render::DisplaySurface;

/// In-memory LED colors for the 4x16 key matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedFrame {
    leds: [[Rgb; COLS as usize]; ROWS as usize],
}

impl Default for LedFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl LedFrame {
    pub fn new() -> Self {
        Self {
            leds: [[Rgb::BLACK; COLS as usize]; ROWS as usize],
        }
    }

    pub fn get(&self, row: u8, col: u8) -> Rgb {
        self.leds
            .get(row as usize)
            .and_then(|r| r.get(col as usize))
            .copied()
            .unwrap_or(Rgb::BLACK)
    }

    pub fn lit_count(&self) -> usize {
        self.leds.iter().flatten().filter(|c| **c != Rgb::BLACK).count()
    }
}

impl DisplaySurface for LedFrame {
    fn write_cell_color(&mut self, row: u8, col: u8, rgb: Rgb) {
        if let Some(led) = self
            .leds
            .get_mut(row as usize)
            .and_then(|r| r.get_mut(col as usize))
        {
            *led = rgb;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_land_and_overflow_is_ignored() {
        let mut frame = LedFrame::new();
        frame.write_cell_color(3, 15, Rgb::new(1, 2, 3));
        frame.write_cell_color(4, 0, Rgb::new(9, 9, 9));
        frame.write_cell_color(0, 16, Rgb::new(9, 9, 9));
        assert_eq!(frame.get(3, 15), Rgb::new(1, 2, 3));
        assert_eq!(frame.lit_count(), 1);
        assert_eq!(frame.get(7, 7), Rgb::BLACK);
    }
}
