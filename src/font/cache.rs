//! Font loading with a fallback chain, and a shared load-once cache.
//!
//! ## Fallback chain
//!
//! ```text
//! configured font ──✗──► arial.ttf ──✗──► DejaVuSans.ttf ──✗──► FontUnavailable
//!        │                   │                  │
//!        ✓                   ✓                  ✓
//! ```
//!
//! A bare file name (`arial.ttf`) is tried as given, then in each system
//! font directory. Unreadable or unparsable files count as missing. When
//! every step fails the render call fails; no unrelated glyph set is
//! substituted.
//!
//! ## Cache
//!
//! [`FontCache`] maps `(font, size)` to a rasterizer. Entries are filled on
//! first use and only read afterwards, so batch workers share one cache by
//! reference. Two workers racing to fill the same key both load the same
//! font; whichever insert lands last is kept.

use ab_glyph::FontArc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use super::{BlockFont, TextRasterizer, TtfFont};
use crate::error::{Result, SublayerError};

/// First fallback when the configured font can't be loaded.
pub const PLATFORM_DEFAULT_FONT: &str = "arial.ttf";

/// Second fallback, common on Linux.
pub const SECOND_FALLBACK_FONT: &str = "DejaVuSans.ttf";

/// Resolves font names to loaded faces.
#[derive(Debug, Clone)]
pub struct FontLocator {
    /// Tried in order after the requested font.
    pub fallbacks: Vec<PathBuf>,
    /// Directories searched for bare file names.
    pub search_dirs: Vec<PathBuf>,
}

impl Default for FontLocator {
    fn default() -> Self {
        Self {
            fallbacks: vec![
                PathBuf::from(PLATFORM_DEFAULT_FONT),
                PathBuf::from(SECOND_FALLBACK_FONT),
            ],
            search_dirs: system_font_dirs(),
        }
    }
}

impl FontLocator {
    pub fn new(fallbacks: Vec<PathBuf>, search_dirs: Vec<PathBuf>) -> Self {
        Self {
            fallbacks,
            search_dirs,
        }
    }

    /// Paths tried for one font name.
    pub fn candidates(&self, name: &Path) -> Vec<PathBuf> {
        let mut out = vec![name.to_path_buf()];
        let is_bare = name.parent().is_none_or(|p| p.as_os_str().is_empty());
        if is_bare && !name.is_absolute() {
            out.extend(self.search_dirs.iter().map(|dir| dir.join(name)));
        }
        out
    }

    /// Load `requested`, walking the fallback chain on failure.
    pub fn load(&self, requested: &Path) -> Result<FontArc> {
        let mut tried = Vec::new();

        for (step, name) in std::iter::once(requested)
            .chain(self.fallbacks.iter().map(PathBuf::as_path))
            .enumerate()
        {
            tried.push(name.to_path_buf());
            if let Some((path, face)) = self.try_load(name) {
                if step > 0 {
                    tracing::warn!(
                        "font '{}' not available, using fallback '{}'",
                        requested.display(),
                        path.display()
                    );
                } else {
                    tracing::debug!(path = %path.display(), "loaded font");
                }
                return Ok(face);
            }
            tracing::warn!("font not found at '{}'", name.display());
        }

        Err(SublayerError::FontUnavailable {
            requested: requested.to_path_buf(),
            tried,
        })
    }

    fn try_load(&self, name: &Path) -> Option<(PathBuf, FontArc)> {
        for path in self.candidates(name) {
            let data = match std::fs::read(&path) {
                Ok(data) => data,
                Err(_) => continue,
            };
            match FontArc::try_from_vec(data) {
                Ok(face) => return Some((path, face)),
                Err(e) => {
                    tracing::warn!("'{}' is not a usable font: {}", path.display(), e);
                }
            }
        }
        None
    }
}

/// Conventional font directories on Linux, macOS and Windows.
fn system_font_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = [
        "/usr/share/fonts/truetype/dejavu",
        "/usr/share/fonts/dejavu",
        "/usr/share/fonts/TTF",
        "/usr/share/fonts/truetype/msttcorefonts",
        "/usr/share/fonts/truetype",
        "/usr/share/fonts",
        "/usr/local/share/fonts",
        "/Library/Fonts",
        "/System/Library/Fonts",
        "/System/Library/Fonts/Supplemental",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();

    if let Some(home) = std::env::var_os("HOME") {
        let home = PathBuf::from(home);
        dirs.push(home.join(".local/share/fonts"));
        dirs.push(home.join(".fonts"));
        dirs.push(home.join("Library/Fonts"));
    }
    if let Some(windir) = std::env::var_os("WINDIR") {
        dirs.push(PathBuf::from(windir).join("Fonts"));
    }
    dirs
}

/// Where rasterizers come from.
#[derive(Debug, Clone)]
pub enum FontBackend {
    /// Font files through the fallback chain.
    Truetype(FontLocator),
    /// [`BlockFont`] cells sized from the requested pixel size; font paths are ignored.
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FontKey {
    font: PathBuf,
    size_bits: u32,
}

/// Shared `(font, size)` → rasterizer cache.
pub struct FontCache {
    backend: FontBackend,
    faces: RwLock<HashMap<PathBuf, FontArc>>,
    rasterizers: RwLock<HashMap<FontKey, Arc<dyn TextRasterizer>>>,
}

impl FontCache {
    /// Cache backed by font files and the default fallback chain.
    pub fn new() -> Self {
        Self::with_backend(FontBackend::Truetype(FontLocator::default()))
    }

    /// Cache that hands out [`BlockFont`]s, needing no font files.
    pub fn block() -> Self {
        Self::with_backend(FontBackend::Block)
    }

    pub fn with_backend(backend: FontBackend) -> Self {
        Self {
            backend,
            faces: RwLock::new(HashMap::new()),
            rasterizers: RwLock::new(HashMap::new()),
        }
    }

    pub fn backend(&self) -> &FontBackend {
        &self.backend
    }

    /// Rasterizer for `font` at `size_px`, loading it on first use.
    pub fn get(&self, font: &Path, size_px: f32) -> Result<Arc<dyn TextRasterizer>> {
        let key = FontKey {
            font: font.to_path_buf(),
            size_bits: size_px.to_bits(),
        };

        if let Some(found) = self
            .rasterizers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(Arc::clone(found));
        }

        let loaded: Arc<dyn TextRasterizer> = match &self.backend {
            FontBackend::Block => Arc::new(BlockFont::for_size(size_px)),
            FontBackend::Truetype(locator) => Arc::new(TtfFont::new(self.face(locator, font)?, size_px)),
        };

        self.rasterizers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Number of cached `(font, size)` rasterizers.
    pub fn len(&self) -> usize {
        self.rasterizers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Face for a requested font name; all sizes of one font share it.
    fn face(&self, locator: &FontLocator, requested: &Path) -> Result<FontArc> {
        if let Some(face) = self
            .faces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(requested)
        {
            return Ok(face.clone());
        }

        let face = locator.load(requested)?;
        self.faces
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(requested.to_path_buf(), face.clone());
        Ok(face)
    }
}

impl Default for FontCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FontCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontCache")
            .field("backend", &self.backend)
            .field("cached", &self.len())
            .finish()
    }
}
