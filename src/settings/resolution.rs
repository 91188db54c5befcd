//! # Output Resolutions
//!
//! Canvas sizes for rendered subtitle layers.
//!
//! ## Presets
//!
//! | Name | Width | Height |
//! |------|-------|--------|
//! | `720p` | 1280 | 720 |
//! | `1080p` | 1920 | 1080 |
//! | `1440p` | 2560 | 1440 |
//! | `2160p` / `4k` | 3840 | 2160 |
//!
//! Any other size can be given as `WIDTHxHEIGHT` (e.g. `1080x1920` for a
//! vertical video). Unknown names are a configuration error.
//!
//! ## Usage
//!
//! ```
//! use sublayer::settings::Resolution;
//!
//! let res: Resolution = "720p".parse()?;
//! assert_eq!((res.width, res.height), (1280, 720));
//! # Ok::<(), sublayer::SublayerError>(())
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SublayerError};

/// Largest accepted canvas edge, in pixels.
pub const MAX_EDGE: u32 = 16384;

/// Canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// 1280×720
    pub const HD_720: Self = Self {
        width: 1280,
        height: 720,
    };

    /// 1920×1080
    pub const FHD_1080: Self = Self {
        width: 1920,
        height: 1080,
    };

    /// 2560×1440
    pub const QHD_1440: Self = Self {
        width: 2560,
        height: 1440,
    };

    /// 3840×2160
    pub const UHD_2160: Self = Self {
        width: 3840,
        height: 2160,
    };

    /// Named presets. The first name listed for a size is its canonical name.
    pub const PRESETS: &'static [(&'static str, Resolution)] = &[
        ("720p", Self::HD_720),
        ("1080p", Self::FHD_1080),
        ("1440p", Self::QHD_1440),
        ("2160p", Self::UHD_2160),
        ("4k", Self::UHD_2160),
    ];

    /// Create a custom resolution, rejecting zero or oversized edges.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 || width > MAX_EDGE || height > MAX_EDGE {
            return Err(SublayerError::Config(format!(
                "resolution {width}x{height} is outside 1..={MAX_EDGE} per edge"
            )));
        }
        Ok(Self { width, height })
    }

    /// Look up a named preset (case-insensitive).
    pub fn from_preset(name: &str) -> Option<Self> {
        Self::PRESETS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, r)| r)
    }

    /// Canonical preset name, if this size has one.
    pub fn preset_name(&self) -> Option<&'static str> {
        Self::PRESETS
            .iter()
            .find(|(_, r)| r == self)
            .map(|&(n, _)| n)
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::FHD_1080
    }
}

impl FromStr for Resolution {
    type Err = SublayerError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(preset) = Self::from_preset(s) {
            return Ok(preset);
        }

        let unknown = || {
            SublayerError::Config(format!(
                "unknown resolution '{s}' (expected 720p, 1080p, 1440p, 2160p or WIDTHxHEIGHT)"
            ))
        };
        let (w, h) = s.split_once(['x', 'X']).ok_or_else(unknown)?;
        let width = w.trim().parse().map_err(|_| unknown())?;
        let height = h.trim().parse().map_err(|_| unknown())?;
        Self::new(width, height)
    }
}

impl TryFrom<String> for Resolution {
    type Error = SublayerError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Resolution> for String {
    fn from(r: Resolution) -> Self {
        r.to_string()
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.preset_name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}x{}", self.width, self.height),
        }
    }
}
