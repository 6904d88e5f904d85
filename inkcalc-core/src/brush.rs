//! Brush state: color, width and tool mode.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CalcError, CalcResult};

/// Smallest accepted brush width in pixels.
pub const MIN_BRUSH_WIDTH: f32 = 1.0;

/// Largest accepted brush width in pixels.
pub const MAX_BRUSH_WIDTH: f32 = 20.0;

/// Default brush width in pixels.
pub const DEFAULT_BRUSH_WIDTH: f32 = 3.0;

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha (255 = opaque).
    pub a: u8,
}

impl Rgba {
    /// Opaque white, the default ink on the dark canvas.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Create an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color with explicit alpha.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn parse_function(args: &str, with_alpha: bool) -> Option<Self> {
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        let expected = if with_alpha { 4 } else { 3 };
        if parts.len() != expected {
            return None;
        }
        let channel = |s: &str| s.parse::<u8>().ok();
        let alpha = if with_alpha {
            let a: f32 = parts[3].parse().ok()?;
            if !(0.0..=1.0).contains(&a) {
                return None;
            }
            (a * 255.0).round() as u8
        } else {
            255
        };
        Some(Self::rgba(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
            alpha,
        ))
    }
}

impl FromStr for Rgba {
    type Err = CalcError;

    /// Parse `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)` or `rgba(r, g, b, a)`
    /// where `a` is in `0.0..=1.0`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = if let Some(hex) = s.strip_prefix('#') {
            Self::parse_hex(hex)
        } else if let Some(args) = s.strip_prefix("rgba(").and_then(|r| r.strip_suffix(')')) {
            Self::parse_function(args, true)
        } else if let Some(args) = s.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
            Self::parse_function(args, false)
        } else {
            None
        };
        parsed.ok_or_else(|| CalcError::InvalidBrush(format!("unrecognized color '{s}'")))
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "#{:02x}{:02x}{:02x}{:02x}",
                self.r, self.g, self.b, self.a
            )
        }
    }
}

/// What a stroke does to the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolMode {
    /// Paint with the brush color.
    #[default]
    Draw,
    /// Clear pixels along the path.
    Erase,
}

/// The current brush, read by every new stroke when it begins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushState {
    color: Rgba,
    width: f32,
    mode: ToolMode,
}

impl Default for BrushState {
    fn default() -> Self {
        Self {
            color: Rgba::WHITE,
            width: DEFAULT_BRUSH_WIDTH,
            mode: ToolMode::Draw,
        }
    }
}

impl BrushState {
    /// Current color.
    #[must_use]
    pub const fn color(&self) -> Rgba {
        self.color
    }

    /// Current width in pixels.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Current tool mode.
    #[must_use]
    pub const fn mode(&self) -> ToolMode {
        self.mode
    }

    /// Select a color. Picking a color also switches back to drawing.
    pub fn set_color(&mut self, color: Rgba) {
        self.color = color;
        self.mode = ToolMode::Draw;
    }

    /// Set the brush width, clamped to `MIN_BRUSH_WIDTH..=MAX_BRUSH_WIDTH`.
    ///
    /// Returns the width actually applied.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::InvalidBrush`] for non-finite or non-positive widths.
    pub fn set_width(&mut self, width: f32) -> CalcResult<f32> {
        if !width.is_finite() || width <= 0.0 {
            return Err(CalcError::InvalidBrush(format!(
                "width must be a positive number, got {width}"
            )));
        }
        self.width = width.clamp(MIN_BRUSH_WIDTH, MAX_BRUSH_WIDTH);
        Ok(self.width)
    }

    /// Switch between drawing and erasing.
    pub fn set_mode(&mut self, mode: ToolMode) {
        self.mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_brush() {
        let brush = BrushState::default();
        assert_eq!(brush.color(), Rgba::WHITE);
        assert!((brush.width() - 3.0).abs() < f32::EPSILON);
        assert_eq!(brush.mode(), ToolMode::Draw);
    }

    #[test]
    fn test_parse_colors() {
        assert_eq!(
            "rgb(255, 255, 255)".parse::<Rgba>().expect("rgb"),
            Rgba::WHITE
        );
        assert_eq!(
            "#ee3333".parse::<Rgba>().expect("hex"),
            Rgba::rgb(0xee, 0x33, 0x33)
        );
        assert_eq!(
            "#00000080".parse::<Rgba>().expect("hex alpha"),
            Rgba::rgba(0, 0, 0, 0x80)
        );
        assert_eq!(
            "rgba(10, 20, 30, 0.5)".parse::<Rgba>().expect("rgba"),
            Rgba::rgba(10, 20, 30, 128)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in [
            "",
            "white",
            "#12345",
            "rgb(1, 2)",
            "rgb(300, 0, 0)",
            "rgba(1, 2, 3, 2)",
        ] {
            assert!(
                matches!(bad.parse::<Rgba>(), Err(CalcError::InvalidBrush(_))),
                "expected '{bad}' to be rejected"
            );
        }
    }

    #[test]
    fn test_display_round_trip() {
        let color = Rgba::rgba(1, 2, 3, 4);
        assert_eq!(color.to_string(), "#01020304");
        assert_eq!(Rgba::WHITE.to_string(), "#ffffff");
    }

    #[test]
    fn test_width_clamping() {
        let mut brush = BrushState::default();
        assert!((brush.set_width(50.0).expect("clamped") - MAX_BRUSH_WIDTH).abs() < f32::EPSILON);
        assert!((brush.set_width(0.25).expect("clamped") - MIN_BRUSH_WIDTH).abs() < f32::EPSILON);
        assert!((brush.set_width(7.5).expect("in range") - 7.5).abs() < f32::EPSILON);

        assert!(brush.set_width(0.0).is_err());
        assert!(brush.set_width(-2.0).is_err());
        assert!(brush.set_width(f32::NAN).is_err());
        // A rejected width leaves the brush untouched
        assert!((brush.width() - 7.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_color_selection_leaves_eraser() {
        let mut brush = BrushState::default();
        brush.set_mode(ToolMode::Erase);
        brush.set_color(Rgba::rgb(255, 0, 0));
        assert_eq!(brush.mode(), ToolMode::Draw);
    }
}
