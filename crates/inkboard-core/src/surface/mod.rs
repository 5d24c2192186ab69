//! Raster surface: the pixel buffer the whiteboard draws into.
//!
//! The surface owns no drawing logic of its own. It exposes full-buffer
//! snapshots and a handful of primitive operations; the tool state machine
//! decides which primitives to issue.

mod glyphs;

use crate::style::RgbColor;
use kurbo::{Ellipse, Line, Point, Rect, Shape as _, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Flattening tolerance for curved outlines, in pixels.
const CURVE_TOLERANCE: f64 = 0.25;

/// Surface errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("Surface dimensions must be non-zero, got {width}x{height}")]
    EmptySurface { width: u32, height: u32 },
    #[error("Snapshot is {found_width}x{found_height} but the surface is {width}x{height}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        found_width: u32,
        found_height: u32,
    },
}

/// An immutable full copy of surface pixels (RGBA8, row-major).
///
/// Clones share the pixel buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Snapshot {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// What a primitive paints with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Paint {
    Color(RgbColor),
    /// The surface's own background color (used by the eraser).
    Background,
}

/// A single primitive surface operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    StrokeSegment {
        from: Point,
        to: Point,
        paint: Paint,
        width: f64,
    },
    /// Outline of the rectangle spanned by `origin` and `origin + size`.
    StrokeRect {
        origin: Point,
        size: Vec2,
        paint: Paint,
        width: f64,
    },
    StrokeEllipse {
        center: Point,
        radii: Vec2,
        paint: Paint,
        width: f64,
    },
    /// Text with its baseline starting at `origin`.
    FillText {
        text: String,
        origin: Point,
        font_size: f64,
        paint: Paint,
    },
}

/// An addressable RGBA8 pixel buffer.
#[derive(Clone)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    background: RgbColor,
    pixels: Vec<u8>,
}

impl fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("background", &self.background)
            .finish_non_exhaustive()
    }
}

impl RasterSurface {
    /// Create a surface filled with the background color.
    pub fn new(width: u32, height: u32, background: RgbColor) -> Result<Self, SurfaceError> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::EmptySurface { width, height });
        }
        let pixel_count = width as usize * height as usize;
        let pixels = background.to_rgba8().repeat(pixel_count);
        Ok(Self {
            width,
            height,
            background,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn background(&self) -> RgbColor {
        self.background
    }

    /// Raw RGBA8 pixels, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Color of a single pixel, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<RgbColor> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.index(x, y);
        Some(RgbColor::new(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
        ))
    }

    /// Copy every pixel into an immutable snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            width: self.width,
            height: self.height,
            pixels: Arc::from(self.pixels.as_slice()),
        }
    }

    /// Overwrite every pixel from a snapshot of the same dimensions.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), SurfaceError> {
        if snapshot.width != self.width || snapshot.height != self.height {
            return Err(SurfaceError::DimensionMismatch {
                width: self.width,
                height: self.height,
                found_width: snapshot.width,
                found_height: snapshot.height,
            });
        }
        self.pixels.copy_from_slice(&snapshot.pixels);
        Ok(())
    }

    /// Refill the whole surface with the background color.
    pub fn clear(&mut self) {
        let rgba = self.background.to_rgba8();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Execute a primitive operation.
    pub fn apply(&mut self, op: &DrawOp) {
        match op {
            DrawOp::StrokeSegment {
                from,
                to,
                paint,
                width,
            } => {
                let color = self.resolve(*paint);
                self.stroke_segment(*from, *to, color, *width);
            }
            DrawOp::StrokeRect {
                origin,
                size,
                paint,
                width,
            } => {
                let color = self.resolve(*paint);
                self.stroke_rect(*origin, *size, color, *width);
            }
            DrawOp::StrokeEllipse {
                center,
                radii,
                paint,
                width,
            } => {
                let color = self.resolve(*paint);
                self.stroke_ellipse(*center, *radii, color, *width);
            }
            DrawOp::FillText {
                text,
                origin,
                font_size,
                paint,
            } => {
                let color = self.resolve(*paint);
                self.fill_text(text, *origin, *font_size, color);
            }
        }
    }

    /// Stroke a round-capped segment. Every pixel whose center lies within
    /// `width / 2` of the segment is painted.
    pub fn stroke_segment(&mut self, from: Point, to: Point, color: Color, width: f64) {
        let half = width / 2.0;
        let line = Line::new(from, to);
        let bounds = Rect::from_points(from, to).inflate(half, half);
        self.fill_where(bounds, color, |p| distance_to_segment(p, line) <= half);
    }

    /// Stroke the outline of the rectangle spanned by `origin` and
    /// `origin + size`. `size` may be negative on either axis.
    pub fn stroke_rect(&mut self, origin: Point, size: Vec2, color: Color, width: f64) {
        let rect = Rect::from_points(origin, origin + size);
        let corners = [
            Point::new(rect.x0, rect.y0),
            Point::new(rect.x1, rect.y0),
            Point::new(rect.x1, rect.y1),
            Point::new(rect.x0, rect.y1),
        ];
        for i in 0..corners.len() {
            self.stroke_segment(corners[i], corners[(i + 1) % corners.len()], color, width);
        }
    }

    /// Stroke the outline of an axis-aligned ellipse. A circle has equal radii.
    pub fn stroke_ellipse(&mut self, center: Point, radii: Vec2, color: Color, width: f64) {
        let radii = Vec2::new(radii.x.abs(), radii.y.abs());
        if radii.x < CURVE_TOLERANCE && radii.y < CURVE_TOLERANCE {
            // Degenerate outline collapses to a dot.
            self.stroke_segment(center, center, color, width);
            return;
        }

        let ellipse = Ellipse::new(center, radii, 0.0);
        let mut segments = Vec::new();
        let mut start = center;
        let mut last = center;
        kurbo::flatten(ellipse.path_elements(CURVE_TOLERANCE), CURVE_TOLERANCE, |el| {
            match el {
                kurbo::PathEl::MoveTo(p) => {
                    start = p;
                    last = p;
                }
                kurbo::PathEl::LineTo(p) => {
                    segments.push((last, p));
                    last = p;
                }
                kurbo::PathEl::ClosePath => {
                    segments.push((last, start));
                    last = start;
                }
                // Flattening only emits lines.
                _ => {}
            }
        });
        for (from, to) in segments {
            self.stroke_segment(from, to, color, width);
        }
    }

    /// Render text with the built-in bitmap font. The glyph cell is
    /// `font_size` pixels tall and sits on the baseline at `origin.y`.
    pub fn fill_text(&mut self, text: &str, origin: Point, font_size: f64, color: Color) {
        let cell = font_size / f64::from(glyphs::GLYPH_HEIGHT);
        if cell <= 0.0 {
            return;
        }
        let top = origin.y - font_size;
        let mut pen_x = origin.x;
        for ch in text.chars() {
            for (col, row) in glyphs::lit_cells(glyphs::glyph(ch)) {
                let x0 = pen_x + f64::from(col) * cell;
                let y0 = top + f64::from(row) * cell;
                let rect = Rect::new(x0, y0, x0 + cell, y0 + cell);
                self.fill_where(rect, color, |p| rect.contains(p));
            }
            pen_x += f64::from(glyphs::GLYPH_ADVANCE) * cell;
        }
    }

    fn resolve(&self, paint: Paint) -> Color {
        match paint {
            Paint::Color(color) => color.into(),
            Paint::Background => self.background.into(),
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Paint every pixel inside `bounds` whose center satisfies `hit`.
    /// Pixels are overwritten, not blended.
    fn fill_where(&mut self, bounds: Rect, color: Color, hit: impl Fn(Point) -> bool) {
        let rgba = color.to_rgba8();
        let rgba = [rgba.r, rgba.g, rgba.b, rgba.a];

        let x_start = bounds.x0.floor().max(0.0) as u32;
        let y_start = bounds.y0.floor().max(0.0) as u32;
        let x_end = (bounds.x1.ceil().max(0.0) as u32).min(self.width);
        let y_end = (bounds.y1.ceil().max(0.0) as u32).min(self.height);

        for y in y_start..y_end {
            for x in x_start..x_end {
                let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                if hit(center) {
                    let idx = self.index(x, y);
                    self.pixels[idx..idx + 4].copy_from_slice(&rgba);
                }
            }
        }
    }
}

/// Euclidean distance from a point to a line segment.
fn distance_to_segment(p: Point, line: Line) -> f64 {
    let d = line.p1 - line.p0;
    let len_sq = d.hypot2();
    if len_sq == 0.0 {
        return (p - line.p0).hypot();
    }
    let t = ((p - line.p0).dot(d) / len_sq).clamp(0.0, 1.0);
    (p - line.p0.lerp(line.p1, t)).hypot()
}
