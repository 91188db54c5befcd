//! # Layout Engine
//!
//! Converts a bottom-left-origin anchor and an alignment into the top-left
//! pen position the rasterizer draws at.
//!
//! ## Coordinates
//!
//! ```text
//!  (0,0) ───────────────────────────────► x      rasterizer space
//!    │
//!    │          draw_y ┌──────────┐
//!    │                 │  ink box │ ink_height
//!    │                 └──────────┘
//!    │                      ▲ anchor_y_from_bottom
//!    ▼ y  ──────────────────┴──────────────────  canvas bottom edge
//! ```
//!
//! - `draw_y = canvas_height - anchor_y_from_bottom - ink_height`
//! - `draw_x` = `anchor_x` (left), `anchor_x - ink_width / 2` (center),
//!   `anchor_x - ink_width` (right)
//!
//! Each text role has its own anchor; nothing here stacks one line above the
//! other. Ink sizes must come from glyph measurement
//! ([`TextRasterizer::ink_box`](crate::font::TextRasterizer::ink_box)), not
//! nominal font metrics.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Horizontal alignment of a text box relative to its anchor x.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Alignment {
    /// Anchor is the left edge of the box.
    #[default]
    Left,
    /// Anchor is the horizontal center of the box.
    Center,
    /// Anchor is the right edge of the box.
    Right,
}

impl Alignment {
    /// Strict parse; `None` for unknown names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Alignment::Left),
            "center" | "centre" => Some(Alignment::Center),
            "right" => Some(Alignment::Right),
            _ => None,
        }
    }

    /// Parse, falling back to [`Alignment::Left`] with a warning for unknown names.
    pub fn parse_lenient(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            tracing::warn!("unknown text alignment '{}', defaulting to left", name);
            Alignment::Left
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

impl FromStr for Alignment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_lenient(s))
    }
}

impl From<String> for Alignment {
    fn from(s: String) -> Self {
        Self::parse_lenient(&s)
    }
}

impl From<Alignment> for String {
    fn from(a: Alignment) -> Self {
        a.as_str().to_string()
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-left pen position on the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
}

impl Placement {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Shift by an offset (outline ring, shadow).
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Compute the draw position for a text box.
///
/// Fractional results (centering an odd width) truncate toward zero.
pub fn place(
    canvas_height: u32,
    ink_width: i32,
    ink_height: i32,
    anchor_x: i32,
    anchor_y_from_bottom: i32,
    alignment: Alignment,
) -> Placement {
    let y = canvas_height as i64 - anchor_y_from_bottom as i64 - ink_height as i64;
    let x = match alignment {
        Alignment::Left => anchor_x as f64,
        Alignment::Center => anchor_x as f64 - ink_width as f64 / 2.0,
        Alignment::Right => anchor_x as f64 - ink_width as f64,
    };
    Placement {
        x: x as i32,
        y: y.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_at_720p() {
        // 50x20 ink box anchored 10px from the left and bottom edges
        let p = place(720, 50, 20, 10, 10, Alignment::Left);
        assert_eq!(p, Placement::new(10, 690));
    }

    #[test]
    fn test_center_law() {
        for (ax, w) in [(960, 400), (960, 401), (0, 7), (13, 1), (100, 0)] {
            let p = place(1080, w, 30, ax, 100, Alignment::Center);
            let exact = ax as f64 - w as f64 / 2.0;
            assert!(
                (p.x as f64 - exact).abs() <= 1.0,
                "ax={ax} w={w} got {} expected ~{exact}",
                p.x
            );
        }
        assert_eq!(place(1080, 400, 30, 960, 100, Alignment::Center).x, 760);
    }

    #[test]
    fn test_right_edge_on_anchor() {
        let p = place(1080, 300, 40, 1900, 0, Alignment::Right);
        assert_eq!(p, Placement::new(1600, 1040));
    }

    #[test]
    fn test_vertical_law_is_alignment_independent() {
        for alignment in [Alignment::Left, Alignment::Center, Alignment::Right] {
            for (h, ay, ih) in [(1080u32, 140, 58), (720, 0, 1), (720, 800, 20)] {
                let p = place(h, 123, ih, 50, ay, alignment);
                assert_eq!(p.y, h as i32 - ay - ih);
            }
        }
    }

    #[test]
    fn test_negative_results_are_allowed() {
        // Off-canvas placement is clipped at draw time, not here
        let p = place(100, 300, 20, 50, 200, Alignment::Center);
        assert_eq!(p, Placement::new(-100, -120));
    }

    #[test]
    fn test_center_truncates_toward_zero() {
        assert_eq!(place(10, 3, 1, 0, 0, Alignment::Center).x, -1); // -1.5
        assert_eq!(place(10, 3, 1, 10, 0, Alignment::Center).x, 8); // 8.5
    }

    #[test]
    fn test_alignment_names() {
        assert_eq!(Alignment::from_name("CENTER"), Some(Alignment::Center));
        assert_eq!(Alignment::from_name("custom_xy"), None);
        assert_eq!(Alignment::parse_lenient("custom_xy"), Alignment::Left);
        assert_eq!("right".parse::<Alignment>(), Ok(Alignment::Right));
    }

    #[test]
    fn test_unknown_alignment_in_json_falls_back() {
        let a: Alignment = serde_json::from_str("\"diagonal\"").unwrap();
        assert_eq!(a, Alignment::Left);
        assert_eq!(serde_json::to_string(&Alignment::Center).unwrap(), "\"center\"");
    }
}
