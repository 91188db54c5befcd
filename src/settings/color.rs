//! RGBA colors with 3- or 4-channel input.
//!
//! Colors are written as `[R, G, B]`, `[R, G, B, A]` or `"R,G,B[,A]"`. A
//! missing alpha channel defaults to 255, except for shadow colors which
//! default to [`SHADOW_DEFAULT_ALPHA`]. Any other channel count is rejected
//! when the settings are built, not when they are used.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SublayerError};

/// Alpha given to shadow colors specified without an alpha channel.
pub const SHADOW_DEFAULT_ALPHA: u8 = 128;

/// Straight (non-premultiplied) RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    pub fn alpha(self) -> u8 {
        self.0[3]
    }

    /// Build from 3 or 4 channel values, filling a missing alpha with `default_alpha`.
    pub fn from_channels(channels: &[i64], default_alpha: u8) -> Result<Self> {
        let mut out = [0u8, 0, 0, default_alpha];
        match channels.len() {
            3 | 4 => {}
            n => {
                return Err(SublayerError::Config(format!(
                    "color must have 3 or 4 channels, got {n}"
                )));
            }
        }
        for (slot, &value) in out.iter_mut().zip(channels) {
            *slot = u8::try_from(value).map_err(|_| {
                SublayerError::Config(format!("color channel {value} is outside 0..=255"))
            })?;
        }
        Ok(Self(out))
    }

    /// Parse `"R,G,B"` or `"R,G,B,A"`.
    pub fn parse(s: &str, default_alpha: u8) -> Result<Self> {
        let channels = s
            .split(',')
            .map(|part| {
                part.trim().parse::<i64>().map_err(|_| {
                    SublayerError::Config(format!(
                        "invalid color '{s}' (expected R,G,B or R,G,B,A)"
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_channels(&channels, default_alpha)
    }

    /// Componentwise linear interpolation, truncating toward zero.
    ///
    /// `t = 0.0` returns `self` exactly.
    pub fn lerp(self, other: Color, t: f64) -> Color {
        let mut out = [0u8; 4];
        for (i, slot) in out.iter_mut().enumerate() {
            let a = self.0[i] as f64;
            let b = other.0[i] as f64;
            *slot = (a * (1.0 - t) + b * t) as u8;
        }
        Color(out)
    }
}

impl From<Color> for image::Rgba<u8> {
    fn from(c: Color) -> Self {
        image::Rgba(c.0)
    }
}

impl FromStr for Color {
    type Err = SublayerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, 255)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        write!(f, "{r},{g},{b},{a}")
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserialize_with_alpha(deserializer, 255)
    }
}

/// Deserializer for shadow colors (missing alpha → [`SHADOW_DEFAULT_ALPHA`]).
pub(crate) fn deserialize_shadow<'de, D>(deserializer: D) -> std::result::Result<Color, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_with_alpha(deserializer, SHADOW_DEFAULT_ALPHA)
}

fn deserialize_with_alpha<'de, D>(
    deserializer: D,
    default_alpha: u8,
) -> std::result::Result<Color, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ColorValue {
        Channels(Vec<i64>),
        Text(String),
    }

    let parsed = match ColorValue::deserialize(deserializer)? {
        ColorValue::Channels(channels) => Color::from_channels(&channels, default_alpha),
        ColorValue::Text(text) => Color::parse(&text, default_alpha),
    };
    parsed.map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_channels_default_opaque() {
        assert_eq!(Color::from_channels(&[1, 2, 3], 255).unwrap(), Color::rgba(1, 2, 3, 255));
        assert_eq!(
            Color::from_channels(&[0, 0, 0], SHADOW_DEFAULT_ALPHA).unwrap(),
            Color::rgba(0, 0, 0, 128)
        );
    }

    #[test]
    fn test_explicit_alpha_wins() {
        assert_eq!(
            Color::from_channels(&[0, 0, 0, 10], SHADOW_DEFAULT_ALPHA).unwrap(),
            Color::rgba(0, 0, 0, 10)
        );
    }

    #[test]
    fn test_rejects_wrong_channel_count() {
        assert!(Color::from_channels(&[1, 2], 255).is_err());
        assert!(Color::from_channels(&[1, 2, 3, 4, 5], 255).is_err());
        assert!("255,255".parse::<Color>().is_err());
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(Color::from_channels(&[256, 0, 0], 255).is_err());
        assert!(Color::from_channels(&[-1, 0, 0], 255).is_err());
    }

    #[test]
    fn test_parse_string() {
        assert_eq!("255, 255, 0, 255".parse::<Color>().unwrap(), Color::rgb(255, 255, 0));
        assert_eq!("220,220,220".parse::<Color>().unwrap(), Color::rgb(220, 220, 220));
        assert!("red".parse::<Color>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let c = Color::rgba(9, 8, 7, 6);
        assert_eq!(c.to_string().parse::<Color>().unwrap(), c);
    }

    #[test]
    fn test_lerp_endpoints_and_truncation() {
        let a = Color::rgba(255, 105, 180, 255);
        let b = Color::rgba(255, 255, 255, 255);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        // 105 * 0.5 + 255 * 0.5 = 180, 180 * 0.5 + 255 * 0.5 = 217.5 → 217
        assert_eq!(a.lerp(b, 0.5), Color::rgba(255, 180, 217, 255));
    }

    #[test]
    fn test_deserialize_forms() {
        let c: Color = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(c, Color::rgb(1, 2, 3));
        let c: Color = serde_json::from_str("\"1,2,3,4\"").unwrap();
        assert_eq!(c, Color::rgba(1, 2, 3, 4));
        assert!(serde_json::from_str::<Color>("[1, 2]").is_err());
        assert_eq!(serde_json::to_string(&Color::rgb(1, 2, 3)).unwrap(), "[1,2,3,255]");
    }
}
