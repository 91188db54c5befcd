//! Source-over alpha compositing for straight-alpha RGBA.
//!
//! Every layer (outline stamps, shadow, fill) lands on the canvas through
//! [`blend_over`], scaled by the glyph coverage at that pixel:
//!
//! ```text
//! sa  = src.a × coverage
//! out.a   = sa + dst.a × (1 − sa)
//! out.rgb = (src.rgb × sa + dst.rgb × dst.a × (1 − sa)) / out.a
//! ```

use image::{GrayImage, Rgba, RgbaImage};

use crate::settings::Color;

/// Composite `src` over `dst`, with `coverage` (0..=255) scaling the source alpha.
#[inline]
pub fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>, coverage: u8) {
    let sa = (src.0[3] as f32 / 255.0) * (coverage as f32 / 255.0);
    if sa <= 0.0 {
        return;
    }
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    let mut out = [0u8; 4];
    for i in 0..3 {
        let s = src.0[i] as f32;
        let d = dst.0[i] as f32;
        out[i] = ((s * sa + d * da * (1.0 - sa)) / out_a).round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    *dst = Rgba(out);
}

/// Composite a uniform color through `mask`, with the mask's top-left at `(x, y)`.
///
/// Parts of the mask outside the canvas are clipped.
pub fn stamp_mask(canvas: &mut RgbaImage, mask: &GrayImage, x: i32, y: i32, color: Color) {
    let src: Rgba<u8> = color.into();
    for_each_visible(canvas, mask, x, y, |dst, _, _, coverage| {
        blend_over(dst, src, coverage);
    });
}

/// Composite `image` through `mask` (same size), with both top-lefts at `(x, y)`.
///
/// The mask acts as the alpha channel, multiplied with the image's own alpha.
pub fn paste_masked(canvas: &mut RgbaImage, image: &RgbaImage, mask: &GrayImage, x: i32, y: i32) {
    for_each_visible(canvas, mask, x, y, |dst, mx, my, coverage| {
        blend_over(dst, *image.get_pixel(mx, my), coverage);
    });
}

/// Visit canvas pixels under the non-zero part of `mask` placed at `(x, y)`.
fn for_each_visible(
    canvas: &mut RgbaImage,
    mask: &GrayImage,
    x: i32,
    y: i32,
    mut f: impl FnMut(&mut Rgba<u8>, u32, u32, u8),
) {
    let (cw, ch) = (canvas.width() as i64, canvas.height() as i64);
    for (mx, my, coverage) in mask.enumerate_pixels() {
        let coverage = coverage.0[0];
        if coverage == 0 {
            continue;
        }
        let cx = x as i64 + mx as i64;
        let cy = y as i64 + my as i64;
        if cx < 0 || cy < 0 || cx >= cw || cy >= ch {
            continue;
        }
        f(canvas.get_pixel_mut(cx as u32, cy as u32), mx, my, coverage);
    }
}
