/// Drawing material
use crate::color::Color;

/// Color and stroke width used to draw a mesh.
///
/// A `line_width` of 0 fills polygons; anything larger outlines them with a
/// stroke of that many pixels. Materials are meant to be shared between
/// objects (behind an `Rc`) and left untouched once attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub color: Color,
    pub line_width: u32,
}

impl Material {
    pub fn new(color: Color, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color,
            line_width: 2,
        }
    }

    pub fn with_line_width(mut self, line_width: u32) -> Self {
        self.line_width = line_width;
        self
    }

    pub fn is_filled(&self) -> bool {
        self.line_width == 0
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(Color::WHITE, "UnknownMaterial")
    }
}
