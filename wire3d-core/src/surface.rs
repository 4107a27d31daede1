/// Drawing targets
use crate::color::Color;

/// A point in screen space: pixels, origin top-left, y growing downward
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Something polygons can be drawn on.
///
/// The renderer only ever issues these calls. Coordinates are passed through
/// unclipped and may lie far outside the surface, or be non-finite for
/// vertices behind a perspective camera; dealing with that is up to the
/// implementation.
pub trait Surface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn clear(&mut self, color: Color);

    /// Draws a closed polygon. `stroke_width` 0 fills it, otherwise the outline
    /// is drawn with that stroke width in pixels.
    fn draw_polygon(&mut self, color: Color, points: &[ScreenPoint], stroke_width: u32);

    /// Adds the alpha-premultiplied rgb of `color` on top of every pixel,
    /// saturating, for full-screen flashes over an already drawn frame
    fn clear_additive(&mut self, color: Color);
}

/// A recorded surface call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    /// Additive full-screen fill, color as passed in (not premultiplied)
    ClearAdditive(Color),
    Polygon {
        color: Color,
        points: Vec<ScreenPoint>,
        stroke_width: u32,
    },
}

/// Headless surface that records every call, for tests and offline inspection
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    /// Recorded polygons, in draw order
    pub fn polygons(&self) -> impl Iterator<Item = &[ScreenPoint]> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Polygon { points, .. } => Some(points.as_slice()),
            DrawCommand::Clear(_) | DrawCommand::ClearAdditive(_) => None,
        })
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons().count()
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn clear_additive(&mut self, color: Color) {
        self.commands.push(DrawCommand::ClearAdditive(color));
    }

    fn draw_polygon(&mut self, color: Color, points: &[ScreenPoint], stroke_width: u32) {
        self.commands.push(DrawCommand::Polygon {
            color,
            points: points.to_vec(),
            stroke_width,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording() {
        let mut surface = RecordingSurface::new(640, 480);
        surface.clear(Color::BLACK);
        surface.draw_polygon(Color::RED, &[ScreenPoint::new(0.0, 0.0); 3], 0);
        surface.clear_additive(Color::new(1.0, 1.0, 1.0, 0.5));
        assert_eq!(surface.commands[0], DrawCommand::Clear(Color::BLACK));
        assert_eq!(
            surface.commands[2],
            DrawCommand::ClearAdditive(Color::new(1.0, 1.0, 1.0, 0.5))
        );
        assert_eq!(surface.polygon_count(), 1);
        assert_eq!(surface.width(), 640);
    }
}
