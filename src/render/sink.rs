//! Destinations for finished canvases.

use image::{ImageFormat, RgbaImage};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::{Result, SublayerError};

/// Persists one canvas under a file stem.
///
/// Stems arrive already sanitized. Implementations are called from batch
/// workers concurrently.
pub trait CanvasSink: Send + Sync {
    /// Store `canvas` and return where it went.
    fn store(&self, stem: &str, canvas: &RgbaImage) -> Result<PathBuf>;
}

/// Writes `<stem>.png` files into one directory.
#[derive(Debug, Clone)]
pub struct PngDirectory {
    dir: PathBuf,
}

impl PngDirectory {
    /// Use `dir`, creating it (and parents) if missing.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| SublayerError::file_access(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{stem}.png"))
    }
}

impl CanvasSink for PngDirectory {
    fn store(&self, stem: &str, canvas: &RgbaImage) -> Result<PathBuf> {
        let path = self.path_for(stem);
        canvas.save_with_format(&path, ImageFormat::Png)?;
        tracing::debug!(path = %path.display(), "saved layer");
        Ok(path)
    }
}

/// Keeps canvases in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    stored: Mutex<Vec<(String, RgbaImage)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything stored so far.
    pub fn into_inner(self) -> Vec<(String, RgbaImage)> {
        self.stored.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.stored.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CanvasSink for MemorySink {
    fn store(&self, stem: &str, canvas: &RgbaImage) -> Result<PathBuf> {
        self.stored
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((stem.to_string(), canvas.clone()));
        Ok(PathBuf::from(format!("{stem}.png")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_png_directory_creates_missing_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("out").join("layers");
        let sink = PngDirectory::new(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(sink.path_for("Hello"), nested.join("Hello.png"));
    }

    #[test]
    fn test_png_keeps_transparency() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = PngDirectory::new(tmp.path()).unwrap();
        let mut canvas = RgbaImage::new(4, 3);
        canvas.put_pixel(1, 1, Rgba([255, 255, 0, 128]));

        let path = sink.store("layer", &canvas).unwrap();
        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded, canvas);
        assert_eq!(loaded.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn test_uncreatable_directory_is_file_access() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();
        let err = PngDirectory::new(file.join("child")).unwrap_err();
        assert!(matches!(err, SublayerError::FileAccess { .. }));
    }

    #[test]
    fn test_memory_sink_collects() {
        let sink = MemorySink::new();
        sink.store("a", &RgbaImage::new(1, 1)).unwrap();
        sink.store("b", &RgbaImage::new(2, 2)).unwrap();
        let stored = sink.into_inner();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1].0, "b");
    }
}
