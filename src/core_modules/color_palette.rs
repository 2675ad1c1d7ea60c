// THEORY:
// The `ColorPalette` maps a point in RGB space to a semantic color name. It is
// an explicitly ordered list of `(ColorLabel, Color)` pairs searched by nearest
// Euclidean distance. Order matters: when two entries are equally close, the
// entry declared first wins, so the same input always yields the same label.

use crate::core_modules::pixel::{Color, Distance};
use std::fmt;
use std::str::FromStr;

/// The closed set of background colors a sign can be labeled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorLabel {
    White,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Grey,
    Black,
}

impl ColorLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorLabel::White => "white",
            ColorLabel::Red => "red",
            ColorLabel::Orange => "orange",
            ColorLabel::Yellow => "yellow",
            ColorLabel::Green => "green",
            ColorLabel::Blue => "blue",
            ColorLabel::Grey => "grey",
            ColorLabel::Black => "black",
        }
    }
}

impl fmt::Display for ColorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown color label {0:?}")]
pub struct UnknownColorLabel(pub String);

impl FromStr for ColorLabel {
    type Err = UnknownColorLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" => Ok(ColorLabel::White),
            "red" => Ok(ColorLabel::Red),
            "orange" => Ok(ColorLabel::Orange),
            "yellow" => Ok(ColorLabel::Yellow),
            "green" => Ok(ColorLabel::Green),
            "blue" => Ok(ColorLabel::Blue),
            "grey" | "gray" => Ok(ColorLabel::Grey),
            "black" => Ok(ColorLabel::Black),
            _ => Err(UnknownColorLabel(s.to_string())),
        }
    }
}

/// Representative colors for traffic signs, in tie-break order.
pub const TRAFFIC_SIGN_COLORS: &[(ColorLabel, Color)] = &[
    (ColorLabel::White, Color::new(255.0, 255.0, 255.0)),
    // Stop-sign red.
    (ColorLabel::Red, Color::new(204.0, 2.0, 2.0)),
    (ColorLabel::Orange, Color::new(255.0, 150.0, 0.0)),
    (ColorLabel::Yellow, Color::new(255.0, 235.0, 0.0)),
    // Medium dark street-sign green.
    (ColorLabel::Green, Color::new(48.0, 132.0, 70.0)),
    (ColorLabel::Blue, Color::new(67.0, 133.0, 255.0)),
    (ColorLabel::Grey, Color::new(128.0, 128.0, 128.0)),
    (ColorLabel::Black, Color::new(0.0, 0.0, 0.0)),
];

/// An immutable, ordered, non-empty table of labeled reference colors.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    entries: Vec<(ColorLabel, Color)>,
}

impl ColorPalette {
    /// Returns `None` for an empty table.
    pub fn new(entries: Vec<(ColorLabel, Color)>) -> Option<Self> {
        if entries.is_empty() {
            None
        } else {
            Some(Self { entries })
        }
    }

    pub fn traffic_signs() -> Self {
        Self {
            entries: TRAFFIC_SIGN_COLORS.to_vec(),
        }
    }

    pub fn entries(&self) -> &[(ColorLabel, Color)] {
        &self.entries
    }

    /// The entry closest to `color`, with its distance. Ties go to the entry
    /// declared first.
    pub fn nearest(&self, color: &Color) -> (ColorLabel, Distance) {
        let (first_label, first_color) = self.entries[0];
        let mut best_label = first_label;
        let mut best_distance = color.distance_squared(&first_color);

        for (label, reference) in &self.entries[1..] {
            let distance = color.distance_squared(reference);
            if distance < best_distance {
                best_label = *label;
                best_distance = distance;
            }
        }

        (best_label, best_distance.sqrt())
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::traffic_signs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_reference_color_maps_to_itself() {
        let palette = ColorPalette::traffic_signs();
        for (label, color) in TRAFFIC_SIGN_COLORS {
            let (nearest, distance) = palette.nearest(color);
            assert_eq!(nearest, *label);
            assert_eq!(distance, 0.0);
        }
    }

    #[test]
    fn nearby_colors_snap_to_their_label() {
        let palette = ColorPalette::traffic_signs();

        assert_eq!(palette.nearest(&Color::new(250.0, 140.0, 10.0)).0, ColorLabel::Orange);
        assert_eq!(palette.nearest(&Color::new(60.0, 120.0, 240.0)).0, ColorLabel::Blue);
        assert_eq!(palette.nearest(&Color::new(20.0, 15.0, 18.0)).0, ColorLabel::Black);
    }

    #[test]
    fn exact_midpoint_resolves_to_first_declared_entry() {
        // Halfway between white and grey; no other entry is closer.
        let midpoint = Color::new(191.5, 191.5, 191.5);

        let palette = ColorPalette::traffic_signs();
        assert_eq!(palette.nearest(&midpoint).0, ColorLabel::White);

        let reversed = ColorPalette::new(vec![
            (ColorLabel::Grey, Color::new(128.0, 128.0, 128.0)),
            (ColorLabel::White, Color::new(255.0, 255.0, 255.0)),
        ])
        .expect("non-empty palette");
        assert_eq!(reversed.nearest(&midpoint).0, ColorLabel::Grey);
    }

    #[test]
    fn empty_palette_is_rejected() {
        assert!(ColorPalette::new(Vec::new()).is_none());
    }

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!("Orange".parse::<ColorLabel>(), Ok(ColorLabel::Orange));
        assert_eq!("gray".parse::<ColorLabel>(), Ok(ColorLabel::Grey));
        assert_eq!(
            "not_applicable".parse::<ColorLabel>(),
            Err(UnknownColorLabel("not_applicable".into()))
        );
    }
}
