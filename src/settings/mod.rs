//! # Render Settings
//!
//! Strongly typed, validated configuration for one batch (or one preview
//! request). Built once, then shared read-only by every render call.
//!
//! ## Sources
//!
//! ```text
//! RenderSettings::default()
//!        │
//!        ├── settings JSON (partial, deep-merged over the defaults)
//!        │
//!        ├── command-line Overrides
//!        │
//!        └── validate()  ──► &RenderSettings passed to every render
//! ```
//!
//! ## JSON shape
//!
//! ```json
//! {
//!   "resolution": "1080p",
//!   "alignment": "center",
//!   "original": {
//!     "font": "arial.ttf",
//!     "size_px": 60,
//!     "color": [255, 255, 0],
//!     "anchor": { "x": 960, "y_from_bottom": 140 },
//!     "effects": {
//!       "shadow":   { "enabled": true, "offset_x": 3, "offset_y": 3, "color": [0, 0, 0] },
//!       "outline":  { "enabled": true, "width": 2, "color": [0, 0, 0] },
//!       "gradient": { "enabled": false, "start": [255, 105, 180], "end": [255, 255, 255] }
//!     }
//!   },
//!   "translation": { "size_px": 40 }
//! }
//! ```
//!
//! Any subset of keys may be given; everything else keeps its default.

mod color;
mod effects;
mod resolution;

pub use color::{Color, SHADOW_DEFAULT_ALPHA};
pub use effects::{Effects, Gradient, GradientDirection, Outline, Shadow};
pub use resolution::{MAX_EDGE, Resolution};

pub use crate::layout::Alignment;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Result, SublayerError};
use crate::script::Role;

/// Smallest accepted font size in pixels.
pub const MIN_FONT_PX: f32 = 1.0;
/// Largest accepted font size in pixels.
pub const MAX_FONT_PX: f32 = 1000.0;
/// Largest accepted outline width in pixels.
pub const MAX_OUTLINE_PX: u32 = 50;

/// Reference point of a text box, measured from the canvas' bottom-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Anchor {
    pub x: i32,
    /// Distance from the canvas bottom edge to the bottom of the ink box.
    pub y_from_bottom: i32,
}

impl Anchor {
    pub fn new(x: i32, y_from_bottom: i32) -> Self {
        Self { x, y_from_bottom }
    }
}

impl FromStr for Anchor {
    type Err = SublayerError;

    /// Parse `"X,Y"`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || SublayerError::Config(format!("invalid anchor '{s}' (expected X,Y)"));
        let (x, y) = s.split_once(',').ok_or_else(invalid)?;
        Ok(Self {
            x: x.trim().parse().map_err(|_| invalid())?,
            y_from_bottom: y.trim().parse().map_err(|_| invalid())?,
        })
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y_from_bottom)
    }
}

/// Font, color, position and effects of one text role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextStyle {
    /// Font file path or bare file name (looked up in system font directories).
    pub font: PathBuf,
    pub size_px: f32,
    /// Solid fill color; ignored for the fill layer when the gradient is on.
    pub color: Color,
    pub anchor: Anchor,
    pub effects: Effects,
}

impl TextStyle {
    /// Defaults for the primary line: 60px yellow.
    pub fn original_default() -> Self {
        Self {
            font: PathBuf::from("arial.ttf"),
            size_px: 60.0,
            color: Color::rgb(255, 255, 0),
            anchor: Anchor::new(960, 140),
            effects: Effects::original_default(),
        }
    }

    /// Defaults for the translation line: 40px light gray.
    pub fn translation_default() -> Self {
        Self {
            font: PathBuf::from("arial.ttf"),
            size_px: 40.0,
            color: Color::rgb(220, 220, 220),
            anchor: Anchor::new(960, 80),
            effects: Effects::translation_default(),
        }
    }

    fn validate(&self, role: &str) -> Result<()> {
        if self.font.as_os_str().is_empty() {
            return Err(SublayerError::Config(format!("{role}: font path is empty")));
        }
        if !(MIN_FONT_PX..=MAX_FONT_PX).contains(&self.size_px) {
            return Err(SublayerError::Config(format!(
                "{role}: font size {} is outside {MIN_FONT_PX}..={MAX_FONT_PX}",
                self.size_px
            )));
        }
        if self.effects.outline.width > MAX_OUTLINE_PX {
            return Err(SublayerError::Config(format!(
                "{role}: outline width {} exceeds {MAX_OUTLINE_PX}",
                self.effects.outline.width
            )));
        }
        Ok(())
    }
}

/// Complete configuration for rendering subtitle layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderSettings {
    pub resolution: Resolution,
    pub alignment: Alignment,
    pub original: TextStyle,
    pub translation: TextStyle,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            resolution: Resolution::FHD_1080,
            alignment: Alignment::Center,
            original: TextStyle::original_default(),
            translation: TextStyle::translation_default(),
        }
    }
}

impl RenderSettings {
    /// Style for a text role.
    pub fn style(&self, role: Role) -> &TextStyle {
        match role {
            Role::Original => &self.original,
            Role::Translation => &self.translation,
        }
    }

    /// Check ranges that the type system can't express.
    pub fn validate(&self) -> Result<()> {
        Resolution::new(self.resolution.width, self.resolution.height)?;
        self.original.validate("original")?;
        self.translation.validate("translation")?;
        Ok(())
    }

    /// Parse settings JSON, deep-merged over the defaults, and validate.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let overlay: Value = serde_json::from_str(json)
            .map_err(|e| SublayerError::Config(format!("settings JSON: {e}")))?;
        let mut merged = serde_json::to_value(Self::default())
            .map_err(|e| SublayerError::Config(format!("settings JSON: {e}")))?;
        merge_json(&mut merged, overlay);

        let settings: Self = serde_json::from_value(merged)
            .map_err(|e| SublayerError::Config(format!("settings JSON: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load a settings file (see [`from_json_str`](Self::from_json_str)).
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| SublayerError::file_access(path, e))?;
        Self::from_json_str(&content).map_err(|e| match e {
            SublayerError::Config(msg) => {
                SublayerError::Config(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Pretty JSON with every field, usable as a starter settings file.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SublayerError::Config(format!("settings JSON: {e}")))
    }

    /// Apply command-line overrides and re-validate.
    pub fn with_overrides(mut self, overrides: &Overrides) -> Result<Self> {
        if let Some(resolution) = overrides.resolution {
            self.resolution = resolution;
        }
        if let Some(alignment) = overrides.alignment {
            self.alignment = alignment;
        }
        overrides.original.apply_to(&mut self.original);
        overrides.translation.apply_to(&mut self.translation);
        self.validate()?;
        Ok(self)
    }
}

/// Individual settings replaced from the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub resolution: Option<Resolution>,
    pub alignment: Option<Alignment>,
    pub original: StyleOverrides,
    pub translation: StyleOverrides,
}

/// Per-role command-line overrides.
#[derive(Debug, Clone, Default)]
pub struct StyleOverrides {
    pub font: Option<PathBuf>,
    pub size_px: Option<f32>,
    pub color: Option<Color>,
    pub anchor: Option<Anchor>,
}

impl StyleOverrides {
    fn apply_to(&self, style: &mut TextStyle) {
        if let Some(font) = &self.font {
            style.font = font.clone();
        }
        if let Some(size) = self.size_px {
            style.size_px = size;
        }
        if let Some(color) = self.color {
            style.color = color;
        }
        if let Some(anchor) = self.anchor {
            style.anchor = anchor;
        }
    }
}

/// Recursively overlay `overlay` onto `base`: objects merge key by key,
/// everything else (including arrays) is replaced.
fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                merge_json(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (base, overlay) => *base = overlay,
    }
}
