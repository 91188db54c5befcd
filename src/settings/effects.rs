//! Per-role text effects: outline, drop shadow, gradient fill.

use serde::{Deserialize, Serialize};

use super::color::{self, Color};

/// Effects applied to one text role.
///
/// Drawing order is outline, then shadow, then fill. When the gradient is
/// enabled it replaces the solid fill color of the role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Effects {
    pub shadow: Shadow,
    pub outline: Outline,
    pub gradient: Gradient,
}

/// Drop shadow drawn once at an offset from the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Shadow {
    pub enabled: bool,
    pub offset_x: i32,
    pub offset_y: i32,
    /// Missing alpha defaults to 128.
    #[serde(deserialize_with = "color::deserialize_shadow")]
    pub color: Color,
}

/// Outline stamped around the glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Outline {
    pub enabled: bool,
    /// Stroke width in pixels.
    pub width: u32,
    pub color: Color,
}

/// Gradient fill across the text's own ink box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Gradient {
    pub enabled: bool,
    pub start: Color,
    pub end: Color,
    #[serde(default)]
    pub direction: GradientDirection,
}

/// Only top-to-bottom gradients are supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientDirection {
    #[default]
    Vertical,
}

impl Shadow {
    /// A shadow with no offset would sit exactly under the fill, so it is skipped.
    pub fn is_visible(&self) -> bool {
        self.enabled && (self.offset_x != 0 || self.offset_y != 0)
    }
}

impl Outline {
    pub fn is_visible(&self) -> bool {
        self.enabled && self.width > 0
    }
}

impl Effects {
    /// Plain text: every effect disabled.
    pub fn none() -> Self {
        Self {
            shadow: Shadow {
                enabled: false,
                offset_x: 0,
                offset_y: 0,
                color: Color::rgba(0, 0, 0, color::SHADOW_DEFAULT_ALPHA),
            },
            outline: Outline {
                enabled: false,
                width: 0,
                color: Color::BLACK,
            },
            gradient: Gradient {
                enabled: false,
                start: Color::WHITE,
                end: Color::WHITE,
                direction: GradientDirection::Vertical,
            },
        }
    }

    /// Defaults for the primary line: soft shadow and a 2px black outline.
    pub fn original_default() -> Self {
        Self::none()
            .with_shadow(3, 3, Color::rgba(0, 0, 0, 128))
            .with_outline(2, Color::BLACK)
            .with_gradient_colors(Color::rgb(255, 105, 180), Color::WHITE)
    }

    /// Defaults for the translation line: smaller shadow, 1px outline.
    pub fn translation_default() -> Self {
        Self::none()
            .with_shadow(2, 2, Color::rgba(0, 0, 0, 128))
            .with_outline(1, Color::BLACK)
            .with_gradient_colors(Color::rgb(200, 200, 200), Color::rgb(250, 250, 250))
    }

    /// Enable the drop shadow.
    pub fn with_shadow(mut self, offset_x: i32, offset_y: i32, color: Color) -> Self {
        self.shadow = Shadow {
            enabled: true,
            offset_x,
            offset_y,
            color,
        };
        self
    }

    /// Enable the outline.
    pub fn with_outline(mut self, width: u32, color: Color) -> Self {
        self.outline = Outline {
            enabled: true,
            width,
            color,
        };
        self
    }

    /// Enable the vertical gradient fill.
    pub fn with_gradient(mut self, start: Color, end: Color) -> Self {
        self = self.with_gradient_colors(start, end);
        self.gradient.enabled = true;
        self
    }

    /// Set gradient colors without changing whether it is enabled.
    fn with_gradient_colors(mut self, start: Color, end: Color) -> Self {
        self.gradient.start = start;
        self.gradient.end = end;
        self
    }
}

impl Default for Effects {
    fn default() -> Self {
        Self::none()
    }
}
