//! # Sublayer - Subtitle Overlay Renderer
//!
//! Sublayer turns a tagged subtitle script into one transparent PNG per
//! subtitle, ready to be laid over video in an editor. It provides:
//!
//! - **Script parsing**: pairs `[Tag]` originals with `[Tagch]` translations
//! - **Layout**: bottom-anchored placement from measured glyph ink
//! - **Effects**: outline, drop shadow, solid or gradient fill
//! - **Batch rendering**: bounded worker pool, in-order progress, PNG output
//! - **Live preview**: debounced background rendering, newest result wins
//!
//! ## Quick Start
//!
//! ```
//! use sublayer::{FontCache, RenderSettings, render::{EntryRenderer, MemorySink, render_batch}};
//!
//! let script = sublayer::script::parse_str("[Sub1]Hello\n[Sub1ch]Bonjour\n[Sub2]World\n");
//! assert_eq!(script.entries.len(), 2);
//!
//! let settings = RenderSettings::default();
//! let fonts = FontCache::block();
//! let sink = MemorySink::new();
//! let report = render_batch(&script.entries, &settings, &fonts, &sink, Some(2), |_| {})?;
//! assert_eq!(report.rendered_count(), 2);
//!
//! // A single entry, without a sink
//! let canvas = EntryRenderer::new(&settings, &fonts).render(&script.entries[0])?;
//! assert_eq!(canvas.dimensions(), (1920, 1080));
//! # Ok::<(), sublayer::SublayerError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`script`] | Tag-line parser and subtitle entries |
//! | [`settings`] | Resolution, alignment, per-role styles and effects |
//! | [`layout`] | Anchor + alignment → draw position |
//! | [`font`] | Glyph measurement and rasterization, font cache |
//! | [`compose`] | Outline → shadow → fill compositing |
//! | [`render`] | Entry renderer, batch pool, output sinks |
//! | [`preview`] | Background preview worker |
//! | [`sanitize`] | Output file names |
//! | [`logging`] | Subscriber setup for the binary |
//! | [`error`] | Error types |

pub mod compose;
pub mod error;
pub mod font;
pub mod layout;
pub mod logging;
pub mod preview;
pub mod render;
pub mod sanitize;
pub mod script;
pub mod settings;

// Re-exports for convenience
pub use error::SublayerError;
pub use font::FontCache;
pub use script::{ParsedScript, SubtitleEntry};
pub use settings::RenderSettings;
