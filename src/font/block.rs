//! Fixed-cell rasterizer.
//!
//! Every visible character is a solid `cell_width × cell_height` rectangle.
//! Geometry is exact and font-independent, which makes it suitable for
//! layout previews on machines without the configured fonts and for
//! pixel-level tests of placement and effects.

use super::{InkBox, TextRasterizer};

/// Rasterizer that draws each non-whitespace character as a filled block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockFont {
    pub cell_width: i32,
    pub cell_height: i32,
    /// Horizontal distance between consecutive cells.
    pub advance: i32,
    /// Offset of every cell from the pen origin.
    pub bearing_x: i32,
    pub bearing_y: i32,
}

impl BlockFont {
    /// Touching cells (advance = width), no bearings.
    pub fn new(cell_width: i32, cell_height: i32) -> Self {
        Self {
            cell_width,
            cell_height,
            advance: cell_width,
            bearing_x: 0,
            bearing_y: 0,
        }
    }

    /// Proportions loosely resembling a sans-serif face at `size_px`.
    pub fn for_size(size_px: f32) -> Self {
        let scaled = |f: f32| (size_px * f).round() as i32;
        Self {
            cell_width: scaled(0.5).max(1),
            cell_height: scaled(0.7).max(1),
            advance: scaled(0.6).max(1),
            bearing_x: scaled(0.05),
            bearing_y: scaled(0.2),
        }
    }

    pub fn with_bearing(mut self, x: i32, y: i32) -> Self {
        self.bearing_x = x;
        self.bearing_y = y;
        self
    }

    pub fn with_advance(mut self, advance: i32) -> Self {
        self.advance = advance;
        self
    }

    /// Left edge of every drawn cell.
    fn cells<'a>(&self, text: &'a str) -> impl Iterator<Item = i32> + 'a {
        let (advance, bearing_x) = (self.advance, self.bearing_x);
        text.chars()
            .filter(|c| !c.is_control())
            .enumerate()
            .filter(|(_, c)| !c.is_whitespace())
            .map(move |(i, _)| i as i32 * advance + bearing_x)
    }
}

impl TextRasterizer for BlockFont {
    fn ink_box(&self, text: &str) -> InkBox {
        self.cells(text).fold(InkBox::default(), |acc, left| {
            acc.union(InkBox::new(
                left,
                self.bearing_y,
                left + self.cell_width,
                self.bearing_y + self.cell_height,
            ))
        })
    }

    fn for_each_pixel(&self, text: &str, plot: &mut dyn FnMut(i32, i32, f32)) {
        for left in self.cells(text) {
            for y in 0..self.cell_height {
                for x in 0..self.cell_width {
                    plot(left + x, self.bearing_y + y, 1.0);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touching_cells() {
        let font = BlockFont::new(5, 20);
        assert_eq!(font.ink_box("0123456789"), InkBox::new(0, 0, 50, 20));
    }

    #[test]
    fn test_leading_space_shifts_ink() {
        let font = BlockFont::new(5, 3).with_advance(6);
        assert_eq!(font.ink_box(" a"), InkBox::new(6, 0, 11, 3));
        assert_eq!(font.ink_box("a "), InkBox::new(0, 0, 5, 3));
    }

    #[test]
    fn test_for_size_proportions() {
        let font = BlockFont::for_size(60.0);
        assert_eq!(
            font,
            BlockFont {
                cell_width: 30,
                cell_height: 42,
                advance: 36,
                bearing_x: 3,
                bearing_y: 12,
            }
        );
    }

    #[test]
    fn test_pixel_count() {
        let font = BlockFont::new(2, 3).with_advance(4);
        let mut count = 0;
        font.for_each_pixel("a b", &mut |_, _, _| count += 1);
        assert_eq!(count, 2 * 2 * 3);
    }
}
