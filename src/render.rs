use crate::color::{hsv_to_rgb, Rgb};
use crate::grid::Grid;
use crate::layout::CoordinateMapper;

/// Host-side target for per-key colors
pub trait DisplaySurface {
    fn write_cell_color(&mut self, row: u8, col: u8, rgb: Rgb);
}

/// Hue, saturation and value for a cell of the given height.
///
/// Flat water is black; disturbed water gets brighter and more saturated,
/// with the hue pushed around by the local height.
pub fn height_to_hsv(height: i8, hue: u8) -> (u8, u8, u8) {
    let h = height as i16;
    let intensity = (h.unsigned_abs() * 2).min(255) as u8;
    let hue = ((hue as i16 + h + (h >> 1)) & 0xff) as u8;
    let value = (intensity as u16 * 2).min(255) as u8;
    (hue, 255 - intensity, value)
}

pub fn height_to_rgb(height: i8, hue: u8) -> Rgb {
    let (h, s, v) = height_to_hsv(height, hue);
    hsv_to_rgb(h, s, v)
}

/// Draw one color per physical cell from `page`
pub fn render_page<M, S, const W: usize, const H: usize>(
    page: &Grid<W, H>,
    mapper: &M,
    hue: u8,
    surface: &mut S,
) where
    M: CoordinateMapper,
    S: DisplaySurface + ?Sized,
{
    for row in 0..mapper.rows() {
        for col in 0..mapper.cols() {
            let height = page.at(mapper.position(row, col)).unwrap_or(0);
            surface.write_cell_color(row, col, height_to_rgb(height, hue));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::AffineLayout;

    struct Recorder {
        writes: Vec<(u8, u8, Rgb)>,
    }

    impl DisplaySurface for Recorder {
        fn write_cell_color(&mut self, row: u8, col: u8, rgb: Rgb) {
            self.writes.push((row, col, rgb));
        }
    }

    #[test]
    fn test_flat_water_is_black() {
        let (_, saturation, value) = height_to_hsv(0, 77);
        assert_eq!(saturation, 255);
        assert_eq!(value, 0);
        assert_eq!(height_to_rgb(0, 77), Rgb::BLACK);
    }

    #[test]
    fn test_height_drives_intensity_and_hue() {
        assert_eq!(height_to_hsv(40, 10), (70, 175, 160));
        // -40 >> 1 = -20, so 10 - 40 - 20 wraps to 206
        assert_eq!(height_to_hsv(-40, 10), (206, 175, 160));
        assert_eq!(height_to_hsv(80, 0), (120, 95, 255));
    }

    #[test]
    fn test_fresh_drop_saturates_value() {
        let (_, saturation, value) = height_to_hsv(127, 0);
        assert_eq!(saturation, 1);
        assert_eq!(value, 255);
    }

    #[test]
    fn test_render_visits_every_cell_once() {
        let layout = AffineLayout { rows: 2, cols: 6, width: 14, scale: 2, offset: 1 };
        let mut page: Grid<14, 5> = Grid::new();
        page.set(3, 1, 60);
        let mut out = Recorder { writes: Vec::new() };
        render_page(&page, &layout, 0, &mut out);

        assert_eq!(out.writes.len(), 12);
        let lit: Vec<_> = out.writes.iter().filter(|w| w.2 != Rgb::BLACK).collect();
        assert_eq!(lit.len(), 1);
        assert_eq!((lit[0].0, lit[0].1), (0, 1));
    }
}
