use serde::{Deserialize, Serialize};

/// 8-bit RGB triple as sent to a light element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Perceived brightness, 0-255
    pub fn luma(&self) -> u8 {
        ((self.r as u16 * 77 + self.g as u16 * 150 + self.b as u16 * 29) >> 8) as u8
    }
}

impl From<Rgb> for ratatui::style::Color {
    fn from(c: Rgb) -> Self {
        ratatui::style::Color::Rgb(c.r, c.g, c.b)
    }
}

impl From<Rgb> for image::Rgb<u8> {
    fn from(c: Rgb) -> Self {
        image::Rgb([c.r, c.g, c.b])
    }
}

/// Integer HSV to RGB; all three inputs span 0-255
pub fn hsv_to_rgb(hue: u8, saturation: u8, value: u8) -> Rgb {
    if saturation == 0 {
        return Rgb::new(value, value, value);
    }

    let h = hue as u16;
    let s = saturation as u16;
    let v = value as u16;

    // six regions around the wheel, fpart is the position within one
    let region = (h * 6) >> 8;
    let fpart = (h * 6) - (region << 8);

    let p = ((v * (255 - s)) >> 8) as u8;
    let q = ((v * (255 - ((s * fpart) >> 8))) >> 8) as u8;
    let t = ((v * (255 - ((s * (255 - fpart)) >> 8))) >> 8) as u8;

    match region {
        0 => Rgb::new(value, t, p),
        1 => Rgb::new(q, value, p),
        2 => Rgb::new(p, value, t),
        3 => Rgb::new(p, q, value),
        4 => Rgb::new(t, p, value),
        _ => Rgb::new(value, p, q),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_value_is_black() {
        for hue in [0u8, 64, 200] {
            assert_eq!(hsv_to_rgb(hue, 255, 0), Rgb::BLACK);
        }
    }

    #[test]
    fn test_unsaturated_is_grey() {
        assert_eq!(hsv_to_rgb(123, 0, 90), Rgb::new(90, 90, 90));
    }

    #[test]
    fn test_primaries() {
        let red = hsv_to_rgb(0, 255, 255);
        assert_eq!((red.r, red.b), (255, 0));
        assert!(red.g < 8);

        // hue 85 is a third of the way round
        let green = hsv_to_rgb(86, 255, 255);
        assert_eq!(green.g, 255);
        assert!(green.r < 8 && green.b < 8);

        let blue = hsv_to_rgb(171, 255, 255);
        assert_eq!(blue.b, 255);
        assert!(blue.r < 8 && blue.g < 8);
    }

    #[test]
    fn test_luma() {
        assert_eq!(Rgb::BLACK.luma(), 0);
        assert!(Rgb::new(255, 255, 255).luma() >= 254);
    }
}
