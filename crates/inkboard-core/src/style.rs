//! Drawing style: colors, brush width and the toolbar palette.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// Smallest brush width the toolbar slider allows.
pub const MIN_BRUSH_WIDTH: u32 = 1;
/// Largest brush width the toolbar slider allows.
pub const MAX_BRUSH_WIDTH: u32 = 20;
/// Text is rendered at this many pixels per unit of brush width.
pub const FONT_SIZE_PER_BRUSH_WIDTH: u32 = 10;

/// Serializable RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Parse a `#rgb` or `#rrggbb` hex string.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            3 => {
                // #rgb -> #rrggbb
                let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
                Some(Self::new(r, g, b))
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::new(r, g, b))
            }
            _ => None,
        }
    }

    /// Format as `#RRGGBB`.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Opaque RGBA8 bytes as stored in a surface buffer.
    pub fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl Default for RgbColor {
    fn default() -> Self {
        Self::black()
    }
}

impl From<Color> for RgbColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b)
    }
}

impl From<RgbColor> for Color {
    fn from(color: RgbColor) -> Self {
        Color::from_rgb8(color.r, color.g, color.b)
    }
}

/// Toolbar palette, in display order.
pub const PALETTE: [RgbColor; 12] = [
    RgbColor::new(0x00, 0x00, 0x00),
    RgbColor::new(0xFF, 0x00, 0x00),
    RgbColor::new(0x00, 0xFF, 0x00),
    RgbColor::new(0x00, 0x00, 0xFF),
    RgbColor::new(0xFF, 0xFF, 0x00),
    RgbColor::new(0xFF, 0x00, 0xFF),
    RgbColor::new(0x00, 0xFF, 0xFF),
    RgbColor::new(0xFF, 0xA5, 0x00),
    RgbColor::new(0x80, 0x00, 0x80),
    RgbColor::new(0xFF, 0xC0, 0xCB),
    RgbColor::new(0xA5, 0x2A, 0x2A),
    RgbColor::new(0x80, 0x80, 0x80),
];

/// Active drawing style, read at the start of every primitive operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Stroke and text color.
    pub color: RgbColor,
    /// Brush width in pixels, always within `[MIN_BRUSH_WIDTH, MAX_BRUSH_WIDTH]`.
    #[serde(deserialize_with = "deserialize_brush_width")]
    brush_width: u32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: RgbColor::black(),
            brush_width: 2,
        }
    }
}

impl Style {
    pub fn new(color: RgbColor, brush_width: u32) -> Self {
        Self {
            color,
            brush_width: clamp_brush_width(brush_width),
        }
    }

    pub fn brush_width(&self) -> u32 {
        self.brush_width
    }

    /// Set the brush width, clamped into the slider range.
    pub fn set_brush_width(&mut self, width: u32) {
        self.brush_width = clamp_brush_width(width);
    }

    /// Stroke width in surface pixels.
    pub fn stroke_width(&self) -> f64 {
        f64::from(self.brush_width)
    }

    /// Font size used by the text tool.
    pub fn font_size(&self) -> f64 {
        f64::from(self.brush_width * FONT_SIZE_PER_BRUSH_WIDTH)
    }
}

fn clamp_brush_width(width: u32) -> u32 {
    width.clamp(MIN_BRUSH_WIDTH, MAX_BRUSH_WIDTH)
}

fn deserialize_brush_width<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    u32::deserialize(deserializer).map(clamp_brush_width)
}
