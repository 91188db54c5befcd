//! # Font Back End
//!
//! Everything the compositor needs from fonts, behind one trait:
//!
//! - measure the **ink box** of a glyph run (the pixels glyphs actually
//!   cover, not nominal ascent/descent)
//! - rasterize the run's anti-aliased coverage
//!
//! ## Pen convention
//!
//! Coordinates are relative to the pen origin `(0, 0)`, which is the
//! top-left of the line box: the baseline sits at `y = ascent`. The ink box
//! therefore usually starts at a positive `top` (space above capitals) and a
//! small `left` (side bearing).
//!
//! ```text
//!  (0,0) pen
//!    ┌───────────────────────── line top
//!    │   ink.left
//!    │   ┌───────────┐ ink.top
//!    │   │  H e l l o│
//!    ├───┼───────────┼──────── baseline (y = ascent)
//!    │   └───────────┘ ink.bottom
//! ```
//!
//! ## Implementations
//!
//! | Type | Source | Use |
//! |------|--------|-----|
//! | [`TtfFont`] | TrueType/OpenType file via `ab_glyph` | real output |
//! | [`BlockFont`] | fixed rectangular cells | previews without font files, tests |

mod block;
mod cache;
mod ttf;

pub use block::BlockFont;
pub use cache::{
    FontBackend, FontCache, FontLocator, PLATFORM_DEFAULT_FONT, SECOND_FALLBACK_FONT,
};
pub use ttf::TtfFont;

use image::{GrayImage, Luma};

/// Tight pixel rectangle covered by a glyph run, relative to the pen origin.
///
/// `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InkBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl InkBox {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Smallest box containing both.
    pub fn union(self, other: InkBox) -> InkBox {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        InkBox {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

/// A glyph run's coverage mask, sized exactly to its ink box.
#[derive(Debug, Clone)]
pub struct Coverage {
    /// Where the mask sits relative to the pen origin.
    pub ink: InkBox,
    /// 0 = no ink, 255 = fully covered.
    pub mask: GrayImage,
}

/// Measures and rasterizes glyph runs at one font and size.
pub trait TextRasterizer: Send + Sync {
    /// Ink box of `text` drawn at the pen origin.
    fn ink_box(&self, text: &str) -> InkBox;

    /// Call `plot(x, y, coverage)` for every pixel the run touches, relative to
    /// the pen origin. Coverage is in `0.0..=1.0`; a pixel may be reported
    /// more than once where glyphs overlap.
    fn for_each_pixel(&self, text: &str, plot: &mut dyn FnMut(i32, i32, f32));

    /// Rasterize `text` into a mask covering exactly its ink box.
    ///
    /// Returns `None` when the run has no ink (empty or whitespace-only text).
    fn coverage(&self, text: &str) -> Option<Coverage> {
        let ink = self.ink_box(text);
        if ink.is_empty() {
            return None;
        }

        let (w, h) = (ink.width() as u32, ink.height() as u32);
        let mut mask = GrayImage::new(w, h);
        self.for_each_pixel(text, &mut |x, y, c| {
            let (mx, my) = (x - ink.left, y - ink.top);
            if mx < 0 || my < 0 || mx as u32 >= w || my as u32 >= h {
                return;
            }
            let Luma([value]) = mask.get_pixel_mut(mx as u32, my as u32);
            let add = (c.clamp(0.0, 1.0) * 255.0).round() as u16;
            *value = (*value as u16 + add).min(255) as u8;
        });

        Some(Coverage { ink, mask })
    }
}
