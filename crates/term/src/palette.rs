//! Colors for cell values 1..=7.

use crate::fb::Rgb;

/// Fill color for a cell value; `None` for empty or unknown values.
pub fn fill_color(value: u8) -> Option<Rgb> {
    let rgb = match value {
        1 => Rgb::new(0, 220, 220),   // cyan
        2 => Rgb::new(210, 0, 210),   // magenta
        3 => Rgb::new(230, 220, 0),   // yellow
        4 => Rgb::new(0, 200, 60),    // green
        5 => Rgb::new(220, 30, 30),   // red
        6 => Rgb::new(40, 80, 230),   // blue
        7 => Rgb::new(255, 150, 0),   // orange
        _ => return None,
    };
    Some(rgb)
}

/// Darker shade used for block outlines.
pub fn outline_color(fill: Rgb) -> Rgb {
    Rgb::new(fill.r / 3, fill.g / 3, fill.b / 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_piece_has_a_color() {
        for v in 1..=7 {
            assert!(fill_color(v).is_some());
        }
        assert_eq!(fill_color(0), None);
        assert_eq!(fill_color(8), None);
    }
}
