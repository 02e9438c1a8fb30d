use qtris_engine::PieceKind;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// An RGB color, serialized as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl From<Rgb> for Color {
    fn from(Rgb(r, g, b): Rgb) -> Self {
        Color::Rgb(r, g, b)
    }
}

/// Block color of each piece kind.
///
/// ```json
/// { "t": [200, 0, 200] }
/// ```
///
/// Missing entries keep their default color.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Palette {
    pub i: Rgb,
    pub o: Rgb,
    pub t: Rgb,
    pub l: Rgb,
    pub j: Rgb,
    pub z: Rgb,
    pub s: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            i: Rgb(0, 255, 255),
            o: Rgb(255, 255, 0),
            t: Rgb(128, 0, 128),
            l: Rgb(0, 0, 255),
            j: Rgb(255, 165, 0),
            z: Rgb(0, 255, 0),
            s: Rgb(255, 0, 0),
        }
    }
}

impl Palette {
    #[must_use]
    pub fn color(&self, kind: PieceKind) -> Color {
        let rgb = match kind {
            PieceKind::I => self.i,
            PieceKind::O => self.o,
            PieceKind::T => self.t,
            PieceKind::L => self.l,
            PieceKind::J => self.j,
            PieceKind::Z => self.z,
            PieceKind::S => self.s,
        };
        rgb.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette_follows_kind_order() {
        let palette = Palette::default();
        let colors = PieceKind::ALL.map(|kind| palette.color(kind));
        assert_eq!(
            colors,
            [
                Color::Rgb(0, 255, 255),
                Color::Rgb(255, 255, 0),
                Color::Rgb(128, 0, 128),
                Color::Rgb(0, 0, 255),
                Color::Rgb(255, 165, 0),
                Color::Rgb(0, 255, 0),
                Color::Rgb(255, 0, 0),
            ]
        );
    }

    #[test]
    fn test_partial_override() {
        let palette: Palette = serde_json::from_str(r#"{ "t": [200, 0, 200] }"#).unwrap();
        assert_eq!(palette.color(PieceKind::T), Color::Rgb(200, 0, 200));
        assert_eq!(palette.color(PieceKind::I), Color::Rgb(0, 255, 255));

        assert!(serde_json::from_str::<Palette>(r#"{ "x": [0, 0, 0] }"#).is_err());
        assert!(serde_json::from_str::<Palette>(r#"{ "i": [0, 0] }"#).is_err());
    }
}
