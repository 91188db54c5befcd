//! # Entry Rendering
//!
//! Turns one [`SubtitleEntry`] into one transparent canvas, and a whole
//! script into a directory of PNG layers.
//!
//! ## Pipeline
//!
//! ```text
//! SubtitleEntry ──► EntryRenderer ──► RgbaImage ──► CanvasSink
//!                    │                                 │
//!                    ├ original:    measure → place → compose
//!                    └ translation: measure → place → compose   <stem>.png
//! ```
//!
//! ## Modules
//!
//! - [`batch`]: bounded worker pool with in-order progress reporting
//! - [`sink`]: where finished canvases go (PNG directory, memory)
//!
//! ## Example
//!
//! ```
//! use sublayer::font::FontCache;
//! use sublayer::render::EntryRenderer;
//! use sublayer::script::SubtitleEntry;
//! use sublayer::settings::RenderSettings;
//!
//! let settings = RenderSettings::default();
//! let fonts = FontCache::block();
//! let entry = SubtitleEntry::standalone("Sub1", "Sub1", "Hello");
//!
//! let canvas = EntryRenderer::new(&settings, &fonts).render(&entry).unwrap();
//! assert_eq!(canvas.dimensions(), (1920, 1080));
//! ```

pub mod batch;
pub mod sink;

pub use batch::{BatchReport, EntryOutcome, EntryReport, render_batch};
pub use sink::{CanvasSink, MemorySink, PngDirectory};

use image::RgbaImage;

use crate::compose;
use crate::error::Result;
use crate::font::{FontCache, TextRasterizer};
use crate::layout::{self, Placement};
use crate::script::{Role, SubtitleEntry};
use crate::settings::RenderSettings;

/// Renders entries with one set of settings and one font cache.
///
/// Holds only shared references, so one renderer can be used from many
/// threads at once.
#[derive(Debug, Clone, Copy)]
pub struct EntryRenderer<'a> {
    settings: &'a RenderSettings,
    fonts: &'a FontCache,
}

impl<'a> EntryRenderer<'a> {
    pub fn new(settings: &'a RenderSettings, fonts: &'a FontCache) -> Self {
        Self { settings, fonts }
    }

    pub fn settings(&self) -> &RenderSettings {
        self.settings
    }

    /// Render `entry` onto a fresh transparent canvas.
    pub fn render(&self, entry: &SubtitleEntry) -> Result<RgbaImage> {
        let resolution = self.settings.resolution;
        let mut canvas = RgbaImage::new(resolution.width, resolution.height);

        self.draw_role(&mut canvas, Role::Original, &entry.original_text)?;
        if let Some(translation) = &entry.translated_text {
            self.draw_role(&mut canvas, Role::Translation, translation)?;
        }

        Ok(canvas)
    }

    /// Pen position for `text` in `role`, or `None` when the run has no ink.
    pub fn placement(&self, role: Role, text: &str) -> Result<Option<Placement>> {
        let style = self.settings.style(role);
        let rasterizer = self.fonts.get(&style.font, style.size_px)?;
        Ok(self.place_run(role, rasterizer.as_ref(), text))
    }

    fn place_run(&self, role: Role, rasterizer: &dyn TextRasterizer, text: &str) -> Option<Placement> {
        let ink = rasterizer.ink_box(text);
        if ink.is_empty() {
            return None;
        }
        let anchor = self.settings.style(role).anchor;
        Some(layout::place(
            self.settings.resolution.height,
            ink.width(),
            ink.height(),
            anchor.x,
            anchor.y_from_bottom,
            self.settings.alignment,
        ))
    }

    fn draw_role(&self, canvas: &mut RgbaImage, role: Role, text: &str) -> Result<()> {
        let style = self.settings.style(role);
        let rasterizer = self.fonts.get(&style.font, style.size_px)?;

        let Some(at) = self.place_run(role, rasterizer.as_ref(), text) else {
            tracing::debug!(?role, text, "nothing to draw");
            return Ok(());
        };
        tracing::trace!(?role, x = at.x, y = at.y, "placing text");

        compose::draw_text_with_effects(
            canvas,
            rasterizer.as_ref(),
            text,
            at,
            style.color,
            &style.effects,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{BlockFont, FontBackend, FontLocator};
    use crate::settings::{Alignment, Anchor, Effects, Resolution};
    use std::path::PathBuf;

    fn plain_settings() -> RenderSettings {
        let mut settings = RenderSettings::default();
        settings.resolution = Resolution::HD_720;
        settings.alignment = Alignment::Left;
        settings.original.effects = Effects::none();
        settings.translation.effects = Effects::none();
        settings
    }

    fn painted(canvas: &RgbaImage) -> usize {
        canvas.pixels().filter(|p| p.0[3] > 0).count()
    }

    #[test]
    fn test_canvas_matches_resolution() {
        let settings = plain_settings();
        let fonts = FontCache::block();
        let canvas = EntryRenderer::new(&settings, &fonts)
            .render(&SubtitleEntry::standalone("a", "a", "Hi"))
            .unwrap();
        assert_eq!(canvas.dimensions(), (1280, 720));
    }

    #[test]
    fn test_placement_follows_measured_ink() {
        let mut settings = plain_settings();
        settings.original.anchor = Anchor::new(10, 10);
        let fonts = FontCache::block();
        let renderer = EntryRenderer::new(&settings, &fonts);

        // 60px block cells: 42px tall ink
        let at = renderer.placement(Role::Original, "Hello").unwrap().unwrap();
        assert_eq!(at, Placement::new(10, 720 - 10 - 42));
    }

    #[test]
    fn test_translation_drawn_only_when_present() {
        let settings = plain_settings();
        let fonts = FontCache::block();
        let renderer = EntryRenderer::new(&settings, &fonts);

        let single = renderer
            .render(&SubtitleEntry::standalone("a", "a", "Hello"))
            .unwrap();
        let paired = renderer
            .render(&SubtitleEntry::standalone("a", "a", "Hello").with_translation("ach", "Hi"))
            .unwrap();

        let translation = BlockFont::for_size(settings.translation.size_px);
        let extra = 2 * translation.cell_width * translation.cell_height;
        assert_eq!(painted(&paired), painted(&single) + extra as usize);
    }

    #[test]
    fn test_roles_use_independent_anchors() {
        let mut settings = plain_settings();
        settings.original.anchor = Anchor::new(0, 0);
        settings.translation.anchor = Anchor::new(0, 0);
        let fonts = FontCache::block();
        let renderer = EntryRenderer::new(&settings, &fonts);

        // Both runs land on the bottom edge; nothing stacks them
        let original = renderer.placement(Role::Original, "A").unwrap().unwrap();
        let translation = renderer.placement(Role::Translation, "A").unwrap().unwrap();
        let o = BlockFont::for_size(settings.original.size_px);
        let t = BlockFont::for_size(settings.translation.size_px);
        assert_eq!(original.y, 720 - o.cell_height);
        assert_eq!(translation.y, 720 - t.cell_height);
    }

    #[test]
    fn test_missing_fonts_fail_the_render() {
        let settings = plain_settings();
        let fonts = FontCache::with_backend(FontBackend::Truetype(FontLocator::new(
            vec![PathBuf::from("missing-fallback.ttf")],
            vec![],
        )));
        let err = EntryRenderer::new(&settings, &fonts)
            .render(&SubtitleEntry::standalone("a", "a", "Hello"))
            .unwrap_err();
        assert!(matches!(err, crate::SublayerError::FontUnavailable { .. }));
    }

    #[test]
    fn test_render_is_deterministic() {
        let settings = RenderSettings::default();
        let fonts = FontCache::block();
        let renderer = EntryRenderer::new(&settings, &fonts);
        let entry = SubtitleEntry::standalone("Sub1", "Sub1", "Hello").with_translation("Sub1ch", "Hi");
        assert!(renderer.render(&entry).unwrap() == renderer.render(&entry).unwrap());
    }
}
