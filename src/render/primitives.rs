use serde::{Deserialize, Serialize};

use crate::core::Key;
use crate::error::{ChartError, ChartResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Parses `#rrggbb`; anything else yields opaque black.
    #[must_use]
    pub fn from_hex(hex: &str) -> Self {
        let digits = hex.trim_start_matches('#');
        let channel = |range: std::ops::Range<usize>| {
            digits
                .get(range)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .map_or(0.0, |value| f64::from(value) / 255.0)
        };
        if digits.len() != 6 {
            return Self::rgb(0.0, 0.0, 0.0);
        }
        Self::rgb(channel(0..2), channel(2..4), channel(4..6))
    }

    #[must_use]
    pub fn to_hex(self) -> String {
        let byte = |value: f64| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            byte(self.red),
            byte(self.green),
            byte(self.blue)
        )
    }

    /// Linear interpolation; `t` is clamped to `[0, 1]`.
    #[must_use]
    pub fn lerp(self, other: Color, t: f64) -> Color {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Color::rgba(
            mix(self.red, other.red),
            mix(self.green, other.green),
            mix(self.blue, other.blue),
            mix(self.alpha, other.alpha),
        )
    }

    pub fn validate(self) -> ChartResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ChartError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Data binding carried by a drawn mark.
///
/// Brush feedback flips `deselected` on already drawn marks without going
/// back to the data engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkTag {
    pub key: Option<Key>,
    pub deselected: bool,
}

impl MarkTag {
    #[must_use]
    pub fn keyed(key: Key) -> Self {
        Self {
            key: Some(key),
            deselected: false,
        }
    }
}

/// Axis-aligned rectangle in pixel space.
///
/// Non-finite coordinates collapse to zero and negative sizes to zero so a
/// degenerate bar draws nothing instead of failing the frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectPrimitive {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Color,
    pub tag: MarkTag,
}

impl RectPrimitive {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64, fill: Color) -> Self {
        Self {
            x: finite_or_zero(x),
            y: finite_or_zero(y),
            width: finite_or_zero(width).max(0.0),
            height: finite_or_zero(height).max(0.0),
            fill,
            tag: MarkTag::default(),
        }
    }

    #[must_use]
    pub fn with_tag(mut self, tag: MarkTag) -> Self {
        self.tag = tag;
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.width < 0.0 || self.height < 0.0 {
            return Err(ChartError::InvalidData(
                "rect size must be >= 0".to_owned(),
            ));
        }
        self.fill.validate()
    }
}

/// Draw command for one line segment in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePrimitive {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub stroke_width: f64,
    pub color: Color,
}

impl LinePrimitive {
    #[must_use]
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64, stroke_width: f64, color: Color) -> Self {
        Self {
            x1: finite_or_zero(x1),
            y1: finite_or_zero(y1),
            x2: finite_or_zero(x2),
            y2: finite_or_zero(y2),
            stroke_width,
            color,
        }
    }

    pub fn validate(self) -> ChartResult<()> {
        if !self.stroke_width.is_finite() || self.stroke_width <= 0.0 {
            return Err(ChartError::InvalidData(
                "line stroke width must be finite and > 0".to_owned(),
            ));
        }
        self.color.validate()
    }
}

/// SVG path. Paths containing non-finite numbers are replaced by `M0,0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPrimitive {
    pub data: String,
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
    pub tag: MarkTag,
}

impl PathPrimitive {
    pub const EMPTY: &'static str = "M0,0";

    #[must_use]
    pub fn new(data: impl Into<String>) -> Self {
        let data = data.into();
        let data = if data.is_empty() || data.contains("NaN") || data.contains("inf") {
            Self::EMPTY.to_owned()
        } else {
            data
        };
        Self {
            data,
            fill: None,
            stroke: None,
            stroke_width: 1.0,
            tag: MarkTag::default(),
        }
    }

    /// Polyline through `points`.
    #[must_use]
    pub fn polyline(points: &[(f64, f64)]) -> Self {
        let mut data = String::new();
        for (index, (x, y)) in points.iter().enumerate() {
            let command = if index == 0 { 'M' } else { 'L' };
            data.push_str(&format!("{command}{x:.2},{y:.2}"));
        }
        Self::new(data)
    }

    #[must_use]
    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = Some(fill);
        self
    }

    #[must_use]
    pub fn with_stroke(mut self, stroke: Color, stroke_width: f64) -> Self {
        self.stroke = Some(stroke);
        self.stroke_width = stroke_width;
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: MarkTag) -> Self {
        self.tag = tag;
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data == Self::EMPTY
    }
}

/// Circle mark (bubbles, scatter symbols).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CirclePrimitive {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub fill: Color,
    pub tag: MarkTag,
}

impl CirclePrimitive {
    #[must_use]
    pub fn new(cx: f64, cy: f64, radius: f64, fill: Color) -> Self {
        Self {
            cx: finite_or_zero(cx),
            cy: finite_or_zero(cy),
            radius: finite_or_zero(radius).max(0.0),
            fill,
            tag: MarkTag::default(),
        }
    }

    #[must_use]
    pub fn with_tag(mut self, tag: MarkTag) -> Self {
        self.tag = tag;
        self
    }
}

/// Horizontal text alignment relative to `TextPrimitive::x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextHAlign {
    Left,
    Center,
    Right,
}

/// Draw command for one label in pixel space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPrimitive {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size_px: f64,
    pub color: Color,
    pub h_align: TextHAlign,
    /// Tooltip-style titles are attached to marks but not painted.
    pub is_title: bool,
}

impl TextPrimitive {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        x: f64,
        y: f64,
        font_size_px: f64,
        color: Color,
        h_align: TextHAlign,
    ) -> Self {
        Self {
            text: text.into(),
            x: finite_or_zero(x),
            y: finite_or_zero(y),
            font_size_px,
            color,
            h_align,
            is_title: false,
        }
    }

    #[must_use]
    pub fn label(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self::new(text, x, y, 12.0, Color::rgb(0.2, 0.2, 0.2), TextHAlign::Center)
    }

    #[must_use]
    pub fn title(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            is_title: true,
            ..Self::label(text, x, y)
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.font_size_px.is_finite() || self.font_size_px <= 0.0 {
            return Err(ChartError::InvalidData(
                "font size must be finite and > 0".to_owned(),
            ));
        }
        self.color.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::{Color, PathPrimitive, RectPrimitive};

    #[test]
    fn degenerate_rects_collapse_instead_of_failing() {
        let rect = RectPrimitive::new(f64::NAN, 4.0, -3.0, f64::INFINITY, Color::rgb(0.0, 0.0, 0.0));
        assert_eq!((rect.x, rect.width, rect.height), (0.0, 0.0, 0.0));
        assert!(rect.validate().is_ok());
    }

    #[test]
    fn invalid_paths_fall_back_to_origin() {
        assert!(PathPrimitive::polyline(&[(f64::NAN, 1.0), (2.0, 3.0)]).is_empty());
        assert!(!PathPrimitive::polyline(&[(0.0, 1.0), (2.0, 3.0)]).is_empty());
    }

    #[test]
    fn hex_colors_round_trip() {
        assert_eq!(Color::from_hex("#1f77b4").to_hex(), "#1f77b4");
        assert_eq!(Color::from_hex("nope"), Color::rgb(0.0, 0.0, 0.0));
    }
}
