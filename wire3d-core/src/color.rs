/// RGBA colors with vector-like arithmetic
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

use crate::vector::EPSILON;

/// An RGBA color. Components are nominally in [0, 1] but never clamped
/// implicitly, so intermediate results may go out of range until
/// [`Color::saturate`] is called.
#[derive(Debug, Clone, Copy)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn dot(&self, c: &Color) -> f32 {
        self.r * c.r + self.g * c.g + self.b * c.b + self.a * c.a
    }

    pub fn magnitude(&self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalize(&mut self) {
        *self = self.normalized();
    }

    /// The color must not be all zeros.
    pub fn normalized(&self) -> Color {
        let d = 1.0 / self.magnitude();
        *self * d
    }

    /// Complementary color, alpha untouched
    pub fn inverted(&self) -> Color {
        Color::new(1.0 - self.r, 1.0 - self.g, 1.0 - self.b, self.a)
    }

    /// RGB scaled by alpha, for additive blending
    pub fn premult_alpha(&self) -> Color {
        Color::new(self.r * self.a, self.g * self.a, self.b * self.a, self.a)
    }

    pub fn saturate(&mut self) {
        *self = self.saturated();
    }

    pub fn saturated(&self) -> Color {
        Color::new(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
            self.a.clamp(0.0, 1.0),
        )
    }

    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        (to_byte(self.r), to_byte(self.g), to_byte(self.b))
    }

    pub fn to_rgba8(&self) -> (u8, u8, u8, u8) {
        (to_byte(self.r), to_byte(self.g), to_byte(self.b), to_byte(self.a))
    }
}

fn to_byte(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        (*self - *other).magnitude() < EPSILON
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

impl Add for Color {
    type Output = Color;
    fn add(self, c: Color) -> Color {
        Color::new(self.r + c.r, self.g + c.g, self.b + c.b, self.a + c.a)
    }
}

impl Sub for Color {
    type Output = Color;
    fn sub(self, c: Color) -> Color {
        Color::new(self.r - c.r, self.g - c.g, self.b - c.b, self.a - c.a)
    }
}

impl Mul<f32> for Color {
    type Output = Color;
    fn mul(self, s: f32) -> Color {
        Color::new(self.r * s, self.g * s, self.b * s, self.a * s)
    }
}

/// Component-wise product
impl Mul for Color {
    type Output = Color;
    fn mul(self, c: Color) -> Color {
        Color::new(self.r * c.r, self.g * c.g, self.b * c.b, self.a * c.a)
    }
}

impl Div<f32> for Color {
    type Output = Color;
    fn div(self, s: f32) -> Color {
        Color::new(self.r / s, self.g / s, self.b / s, self.a / s)
    }
}
