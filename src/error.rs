//! # Error Types
//!
//! This module defines error types used throughout the sublayer library.
//!
//! Only conditions that stop an operation live here. Per-line parse problems
//! (malformed lines, orphaned translations) are not errors: they are returned
//! as [`ParseIssue`](crate::script::ParseIssue) values next to the entries.
//!
//! ## Scope of each error
//!
//! | Variant | Raised by | Fatal for |
//! |---------|-----------|-----------|
//! | `FileAccess` | script loading, settings loading, output dir | the whole batch |
//! | `FontUnavailable` | font fallback chain exhausted | one entry |
//! | `Config` | settings validation | the whole batch |
//! | `Render` / `Image` | compositing, PNG encoding | one entry |

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sublayer operations
#[derive(Debug, Error)]
pub enum SublayerError {
    /// A file (script, settings, output directory) could not be read or created
    #[error("Cannot access {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Neither the configured font nor any declared fallback could be loaded
    #[error("No usable font for {} (tried: {})", requested.display(), format_tried(tried))]
    FontUnavailable {
        requested: PathBuf,
        tried: Vec<PathBuf>,
    },

    /// Invalid render settings (unknown preset, bad color, out-of-range size)
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Failure while rasterizing or compositing one entry
    #[error("Render error: {0}")]
    Render(String),

    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Worker pool could not be started
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SublayerError {
    /// Wrap an I/O error with the path it concerns.
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SublayerError::FileAccess {
            path: path.into(),
            source,
        }
    }
}

fn format_tried(tried: &[PathBuf]) -> String {
    tried
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SublayerError>;
