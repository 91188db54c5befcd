//! # Effect Compositor
//!
//! Draws one styled glyph run onto a transparent canvas in three layers:
//!
//! ```text
//!   1. outline   the run stamped in outline color at every ring offset
//!   2. shadow    the run once, shifted by the shadow offset
//!   3. fill      solid role color, or a vertical gradient through the
//!                run's coverage mask
//! ```
//!
//! Later layers composite over earlier ones (source-over, see [`blend`]).
//! The run is rasterized once; every layer reuses the same coverage mask.
//!
//! ## Outline ring
//!
//! For width `W`, offsets `(dx, dy)` with `|dx|, |dy| ≤ W` are stamped when
//! they lie on the square's border, or inside it with `dx² + dy² ≥ (W-1)²`:
//!
//! ```text
//!   W = 2                 W = 3
//!   # # # # #             # # # # # # #
//!   # # # # #             # # # # # # #
//!   # # . # #             # # . . . # #
//!   # # # # #             # # . . . # #
//!   # # # # #             # # . . . # #
//!                         # # # # # # #
//!                         # # # # # # #
//! ```

pub mod blend;

use image::{Rgba, RgbaImage};

use crate::font::{Coverage, TextRasterizer};
use crate::layout::Placement;
use crate::settings::{Color, Effects, Gradient};

/// Offsets at which the outline color is stamped for a stroke of `width` pixels.
///
/// Empty for width 0. Ordered row by row, top to bottom.
pub fn outline_offsets(width: u32) -> Vec<(i32, i32)> {
    let w = width as i32;
    let inner = (w - 1) * (w - 1);
    let mut offsets = Vec::new();
    if w == 0 {
        return offsets;
    }
    for dy in -w..=w {
        for dx in -w..=w {
            let on_ring = dx.abs() == w || dy.abs() == w;
            if on_ring || dx * dx + dy * dy >= inner {
                offsets.push((dx, dy));
            }
        }
    }
    offsets
}

/// Gradient image of `width × height`, row `i` colored
/// `lerp(start, end, i / max(1, height - 1))`.
pub fn vertical_gradient(width: u32, height: u32, start: Color, end: Color) -> RgbaImage {
    let last_row = height.saturating_sub(1).max(1) as f64;
    let rows: Vec<Rgba<u8>> = (0..height)
        .map(|i| start.lerp(end, i as f64 / last_row).into())
        .collect();
    RgbaImage::from_fn(width, height, |_, y| rows[y as usize])
}

/// Draw `text` with its effects, pen origin at `at`.
///
/// A run without ink (empty or blank text) leaves the canvas untouched.
pub fn draw_text_with_effects(
    canvas: &mut RgbaImage,
    rasterizer: &dyn TextRasterizer,
    text: &str,
    at: Placement,
    fill: Color,
    effects: &Effects,
) {
    let Some(coverage) = rasterizer.coverage(text) else {
        tracing::trace!(text, "no ink to draw");
        return;
    };

    if effects.outline.is_visible() {
        for (dx, dy) in outline_offsets(effects.outline.width) {
            stamp(canvas, &coverage, at.offset(dx, dy), effects.outline.color);
        }
    }

    if effects.shadow.is_visible() {
        let shadow = &effects.shadow;
        stamp(canvas, &coverage, at.offset(shadow.offset_x, shadow.offset_y), shadow.color);
    }

    if effects.gradient.enabled {
        fill_gradient(canvas, &coverage, at, &effects.gradient);
    } else {
        stamp(canvas, &coverage, at, fill);
    }
}

/// Composite the mask in a single color with the pen origin at `at`.
fn stamp(canvas: &mut RgbaImage, coverage: &Coverage, at: Placement, color: Color) {
    blend::stamp_mask(
        canvas,
        &coverage.mask,
        at.x + coverage.ink.left,
        at.y + coverage.ink.top,
        color,
    );
}

fn fill_gradient(canvas: &mut RgbaImage, coverage: &Coverage, at: Placement, gradient: &Gradient) {
    let (w, h) = coverage.mask.dimensions();
    let image = vertical_gradient(w, h, gradient.start, gradient.end);
    blend::paste_masked(
        canvas,
        &image,
        &coverage.mask,
        at.x + coverage.ink.left,
        at.y + coverage.ink.top,
    );
}
