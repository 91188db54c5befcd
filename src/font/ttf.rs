//! TTF/OTF glyph runs via ab_glyph.
//!
//! Glyphs are laid out left to right on a baseline at `ascent` below the pen
//! origin, advancing by each glyph's horizontal advance plus pair kerning.
//! Ink bounds are the union of the outlined glyphs' pixel bounds, so the
//! measured box and the rasterized coverage always agree.

use ab_glyph::{Font, FontArc, Glyph, InvalidFont, ScaleFont, point};

use super::{InkBox, TextRasterizer};

/// One font face at one pixel size.
#[derive(Clone)]
pub struct TtfFont {
    font: FontArc,
    px: f32,
}

impl TtfFont {
    pub fn new(font: FontArc, px: f32) -> Self {
        Self { font, px }
    }

    /// Parse font file bytes.
    pub fn from_bytes(data: Vec<u8>, px: f32) -> Result<Self, InvalidFont> {
        Ok(Self::new(FontArc::try_from_vec(data)?, px))
    }

    pub fn pixel_size(&self) -> f32 {
        self.px
    }

    /// Position every glyph of `text` relative to the pen origin.
    fn layout(&self, text: &str) -> Vec<Glyph> {
        let scaled = self.font.as_scaled(self.px);
        let baseline_y = scaled.ascent();

        let mut glyphs = Vec::with_capacity(text.len());
        let mut caret_x = 0.0f32;
        let mut previous = None;

        for ch in text.chars().filter(|c| !c.is_control()) {
            let glyph_id = self.font.glyph_id(ch);
            if let Some(prev) = previous {
                caret_x += scaled.kern(prev, glyph_id);
            }
            glyphs.push(glyph_id.with_scale_and_position(self.px, point(caret_x, baseline_y)));
            caret_x += scaled.h_advance(glyph_id);
            previous = Some(glyph_id);
        }

        glyphs
    }
}

impl std::fmt::Debug for TtfFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtfFont").field("px", &self.px).finish_non_exhaustive()
    }
}

impl TextRasterizer for TtfFont {
    fn ink_box(&self, text: &str) -> InkBox {
        self.layout(text)
            .into_iter()
            .filter_map(|glyph| self.font.outline_glyph(glyph))
            .fold(InkBox::default(), |acc, outlined| {
                let bounds = outlined.px_bounds();
                acc.union(InkBox::new(
                    bounds.min.x as i32,
                    bounds.min.y as i32,
                    bounds.max.x as i32,
                    bounds.max.y as i32,
                ))
            })
    }

    fn for_each_pixel(&self, text: &str, plot: &mut dyn FnMut(i32, i32, f32)) {
        for glyph in self.layout(text) {
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                let (x0, y0) = (bounds.min.x as i32, bounds.min.y as i32);
                outlined.draw(|px, py, coverage| {
                    plot(x0 + px as i32, y0 + py as i32, coverage);
                });
            }
        }
    }
}
