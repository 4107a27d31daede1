/// Character-cell rasterizer for terminal rendering
use crossterm::{
    cursor,
    style::{Color as TermColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;
use tracing::trace;
use wire3d_core::{Color, ScreenPoint, Surface};

/// Upper half block: foreground paints the top pixel, background the bottom one
const HALF_BLOCK: char = '\u{2580}';

type Rgb = (u8, u8, u8);

/// A [`Surface`] over a grid of terminal cells.
///
/// Every cell holds two vertically stacked pixels, so a `cols x rows`
/// terminal exposes a `cols x 2*rows` pixel grid with roughly square pixels.
pub struct TerminalSurface {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl TerminalSurface {
    /// Surface covering `cols x rows` terminal cells
    pub fn new(cols: u16, rows: u16) -> Self {
        let width = cols as usize;
        let height = rows as usize * 2;
        Self {
            width,
            height,
            pixels: vec![(0, 0, 0); width * height],
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        *self = Self::new(cols, rows);
    }

    /// Color of the pixel at (x, y), `None` outside the surface
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    fn plot(&mut self, x: i64, y: i64, rgb: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.pixels[y as usize * self.width + x as usize] = rgb;
        }
    }

    /// Square brush of side `size` centred on (x, y)
    fn brush(&mut self, x: i64, y: i64, size: u32, rgb: Rgb) {
        let size = size.max(1) as i64;
        let lo = -(size - 1) / 2;
        for dy in lo..lo + size {
            for dx in lo..lo + size {
                self.plot(x + dx, y + dy, rgb);
            }
        }
    }

    /// Even-odd scanline fill, sampling pixel centres
    fn fill_polygon(&mut self, points: &[ScreenPoint], rgb: Rgb) {
        let min_y = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_y = points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        let first_row = (min_y - 0.5).ceil().max(0.0) as usize;
        let last_row = ((max_y - 0.5).floor()).min(self.height as f32 - 1.0);
        if last_row < 0.0 {
            return;
        }

        let mut crossings = Vec::with_capacity(points.len());
        for row in first_row..=last_row as usize {
            let yc = row as f32 + 0.5;
            crossings.clear();
            for (i, a) in points.iter().enumerate() {
                let b = &points[(i + 1) % points.len()];
                if (a.y <= yc) != (b.y <= yc) {
                    crossings.push(a.x + (yc - a.y) * (b.x - a.x) / (b.y - a.y));
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));

            for span in crossings.chunks_exact(2) {
                let start = (span[0] - 0.5).ceil().max(0.0);
                let end = (span[1] - 0.5).floor().min(self.width as f32 - 1.0);
                if end < start {
                    continue;
                }
                let offset = row * self.width;
                for x in start as usize..=end as usize {
                    self.pixels[offset + x] = rgb;
                }
            }
        }
    }

    fn stroke_line(&mut self, a: ScreenPoint, b: ScreenPoint, width: u32, rgb: Rgb) {
        let margin = width as f32;
        let Some((a, b)) = clip_line(
            a,
            b,
            -margin,
            -margin,
            self.width as f32 + margin,
            self.height as f32 + margin,
        ) else {
            return;
        };

        // Bresenham between the pixels containing both endpoints
        let (mut x0, mut y0) = (a.x.floor() as i64, a.y.floor() as i64);
        let (x1, y1) = (b.x.floor() as i64, b.y.floor() as i64);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.brush(x0, y0, width, rgb);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Writes the whole surface to `writer`, one text line per cell row
    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current: Option<(Rgb, Rgb)> = None;
        for row in 0..self.height / 2 {
            writer.queue(cursor::MoveTo(0, row as u16))?;
            for x in 0..self.width {
                let top = self.pixels[2 * row * self.width + x];
                let bottom = self.pixels[(2 * row + 1) * self.width + x];
                if current != Some((top, bottom)) {
                    writer.queue(SetForegroundColor(term_color(top)))?;
                    writer.queue(SetBackgroundColor(term_color(bottom)))?;
                    current = Some((top, bottom));
                }
                writer.queue(Print(HALF_BLOCK))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl Surface for TerminalSurface {
    fn width(&self) -> u32 {
        self.width as u32
    }

    fn height(&self) -> u32 {
        self.height as u32
    }

    fn clear(&mut self, color: Color) {
        self.pixels.fill(color.to_rgb8());
    }

    fn clear_additive(&mut self, color: Color) {
        let (r, g, b) = color.premult_alpha().to_rgb8();
        for p in self.pixels.iter_mut() {
            *p = (p.0.saturating_add(r), p.1.saturating_add(g), p.2.saturating_add(b));
        }
    }

    fn draw_polygon(&mut self, color: Color, points: &[ScreenPoint], stroke_width: u32) {
        if points.len() < 2 {
            return;
        }
        // Vertices behind a perspective camera come out non-finite
        if !points.iter().all(ScreenPoint::is_finite) {
            trace!(vertices = points.len(), "skipping non-finite polygon");
            return;
        }

        let rgb = color.to_rgb8();
        if stroke_width == 0 {
            self.fill_polygon(points, rgb);
        } else {
            for (i, a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                self.stroke_line(*a, b, stroke_width, rgb);
            }
        }
    }
}

fn term_color((r, g, b): Rgb) -> TermColor {
    TermColor::Rgb { r, g, b }
}

/// Liang-Barsky clipping of segment a-b against an axis-aligned box.
/// Returns `None` when the segment lies entirely outside.
fn clip_line(
    a: ScreenPoint,
    b: ScreenPoint,
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
) -> Option<(ScreenPoint, ScreenPoint)> {
    // f64 keeps far-off endpoints from swallowing the on-screen part
    let (ax, ay) = (a.x as f64, a.y as f64);
    let dx = b.x as f64 - ax;
    let dy = b.y as f64 - ay;
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;

    for (p, q) in [
        (-dx, ax - min_x as f64),
        (dx, max_x as f64 - ax),
        (-dy, ay - min_y as f64),
        (dy, max_y as f64 - ay),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }

    (t0 <= t1).then(|| {
        (
            ScreenPoint::new((ax + t0 * dx) as f32, (ay + t0 * dy) as f32),
            ScreenPoint::new((ax + t1 * dx) as f32, (ay + t1 * dy) as f32),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = (255, 0, 0);

    fn square(x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<ScreenPoint> {
        vec![
            ScreenPoint::new(x0, y0),
            ScreenPoint::new(x1, y0),
            ScreenPoint::new(x1, y1),
            ScreenPoint::new(x0, y1),
        ]
    }

    fn lit(surface: &TerminalSurface) -> usize {
        surface.pixels.iter().filter(|p| **p != (0, 0, 0)).count()
    }

    #[test]
    fn test_two_pixels_per_cell() {
        let surface = TerminalSurface::new(80, 24);
        assert_eq!(surface.width(), 80);
        assert_eq!(surface.height(), 48);
    }

    #[test]
    fn test_fill_covers_pixel_centres() {
        let mut surface = TerminalSurface::new(10, 5);
        surface.draw_polygon(Color::RED, &square(2.0, 2.0, 6.0, 5.0), 0);
        assert_eq!(lit(&surface), 4 * 3);
        assert_eq!(surface.pixel(2, 2), Some(RED));
        assert_eq!(surface.pixel(5, 4), Some(RED));
        assert_eq!(surface.pixel(6, 4), Some((0, 0, 0)));
    }

    #[test]
    fn test_stroke_draws_outline_only() {
        let mut surface = TerminalSurface::new(20, 10);
        surface.draw_polygon(Color::RED, &square(2.0, 2.0, 12.0, 12.0), 1);
        assert_eq!(surface.pixel(2, 2), Some(RED));
        assert_eq!(surface.pixel(7, 2), Some(RED));
        assert_eq!(surface.pixel(7, 7), Some((0, 0, 0)));
    }

    #[test]
    fn test_wide_brush() {
        let mut surface = TerminalSurface::new(20, 10);
        let points = [ScreenPoint::new(5.0, 10.0), ScreenPoint::new(5.0, 10.0)];
        surface.draw_polygon(Color::RED, &points, 3);
        assert_eq!(lit(&surface), 9);
        assert_eq!(surface.pixel(4, 9), Some(RED));
        assert_eq!(surface.pixel(6, 11), Some(RED));
    }

    #[test]
    fn test_non_finite_polygons_are_skipped() {
        let mut surface = TerminalSurface::new(10, 5);
        let points = [
            ScreenPoint::new(1.0, 1.0),
            ScreenPoint::new(f32::NAN, 2.0),
            ScreenPoint::new(4.0, f32::INFINITY),
        ];
        surface.draw_polygon(Color::RED, &points, 1);
        surface.draw_polygon(Color::RED, &points, 0);
        assert_eq!(lit(&surface), 0);
    }

    #[test]
    fn test_huge_coordinates_are_clipped() {
        let mut surface = TerminalSurface::new(10, 5);
        let points = [ScreenPoint::new(-1e9, 3.5), ScreenPoint::new(1e9, 3.5)];
        surface.draw_polygon(Color::RED, &points, 1);
        assert_eq!(lit(&surface), 10);
    }

    #[test]
    fn test_clip_line_rejects_outside_segments() {
        let a = ScreenPoint::new(-5.0, -5.0);
        let b = ScreenPoint::new(-1.0, 20.0);
        assert!(clip_line(a, b, 0.0, 0.0, 10.0, 10.0).is_none());

        let (c, d) = clip_line(ScreenPoint::new(-10.0, 5.0), ScreenPoint::new(20.0, 5.0), 0.0, 0.0, 10.0, 10.0)
            .expect("crosses the box");
        assert!(c.x.abs() < 1e-4 && c.y == 5.0);
        assert!((d.x - 10.0).abs() < 1e-4 && d.y == 5.0);
    }

    #[test]
    fn test_clear() {
        let mut surface = TerminalSurface::new(4, 2);
        surface.clear(Color::BLUE);
        assert_eq!(surface.pixel(3, 3), Some((0, 0, 255)));
    }

    #[test]
    fn test_additive_clear_keeps_the_frame() {
        let mut surface = TerminalSurface::new(4, 2);
        surface.clear(Color::BLUE);
        surface.draw_polygon(Color::GREEN, &square(0.0, 0.0, 2.0, 4.0), 0);
        surface.clear_additive(Color::new(1.0, 0.0, 0.0, 0.5));
        assert_eq!(surface.pixel(0, 0), Some((128, 255, 0)));
        assert_eq!(surface.pixel(3, 3), Some((128, 0, 255)));

        // channels saturate instead of wrapping
        surface.clear_additive(Color::new(0.0, 1.0, 0.0, 1.0));
        assert_eq!(surface.pixel(0, 0), Some((128, 255, 0)));
    }

    #[test]
    fn test_draw_writes_every_row() {
        let surface = TerminalSurface::new(3, 2);
        let mut out = Vec::new();
        surface.draw(&mut out).expect("write to buffer");
        let text = String::from_utf8(out).expect("utf-8");
        assert_eq!(text.matches(HALF_BLOCK).count(), 6);
    }
}
