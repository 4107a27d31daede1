/// wire3d Web - wireframe rendering onto an HTML canvas
///
/// Exposes a [`WebRenderer`] to JavaScript that draws the hierarchy scene
/// through a 2D canvas context.
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};
use wire3d_core::{Camera, Color, Material, Mesh, Object3d, ObjectId, Quaternion, Scene, ScreenPoint, Surface, Vector3};

/// CSS color string for `color`, alpha included
fn css_color(color: Color) -> String {
    let (r, g, b) = color.to_rgb8();
    format!("rgba({}, {}, {}, {})", r, g, b, color.a.clamp(0.0, 1.0))
}

/// Opaque fill that, composited with "lighter", adds the premultiplied rgb
fn additive_fill(color: Color) -> Color {
    Color { a: 1.0, ..color.premult_alpha() }
}

/// A [`Surface`] drawing paths on a canvas 2D context
pub struct CanvasSurface {
    context: CanvasRenderingContext2d,
    width: u32,
    height: u32,
}

impl CanvasSurface {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        Ok(Self {
            context,
            width: canvas.width(),
            height: canvas.height(),
        })
    }
}

impl Surface for CanvasSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self, color: Color) {
        self.context.set_fill_style(&JsValue::from_str(&css_color(color)));
        self.context.fill_rect(0.0, 0.0, self.width as f64, self.height as f64);
    }

    fn clear_additive(&mut self, color: Color) {
        // "lighter" sums source and destination per channel, clamped by the canvas
        if self.context.set_global_composite_operation("lighter").is_err() {
            return;
        }
        self.context.set_fill_style(&JsValue::from_str(&css_color(additive_fill(color))));
        self.context.fill_rect(0.0, 0.0, self.width as f64, self.height as f64);
        if let Err(err) = self.context.set_global_composite_operation("source-over") {
            web_sys::console::warn_1(&err);
        }
    }

    fn draw_polygon(&mut self, color: Color, points: &[ScreenPoint], stroke_width: u32) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        // The canvas rejects non-finite coordinates one call at a time
        if !points.iter().all(ScreenPoint::is_finite) {
            return;
        }

        let ctx = &self.context;
        ctx.begin_path();
        ctx.move_to(first.x as f64, first.y as f64);
        for p in rest {
            ctx.line_to(p.x as f64, p.y as f64);
        }
        ctx.close_path();

        let style = JsValue::from_str(&css_color(color));
        if stroke_width == 0 {
            ctx.set_fill_style(&style);
            ctx.fill();
        } else {
            ctx.set_stroke_style(&style);
            ctx.set_line_width(stroke_width as f64);
            ctx.stroke();
        }
    }
}

/// Builds the parent/child cube scene viewed by a `res_x x res_y` camera
fn hierarchy_scene(res_x: u32, res_y: u32) -> (Scene, ObjectId) {
    let mut camera = Camera::perspective(res_x, res_y);
    camera.node.position = Vector3::new(0.0, 0.0, -2.0);
    let mut scene = Scene::with_camera("Hierarchy", camera);

    let mut parent = Object3d::new("TestObject")
        .with_mesh(
            Rc::new(Mesh::cube(Vector3::ONE)),
            Rc::new(Material::new(Color::RED, "TestMaterial1")),
        )
        .with_position(Vector3::new(0.0, 0.0, 2.0));
    parent.add_child(
        Object3d::new("ChildObject")
            .with_mesh(
                Rc::new(Mesh::cube(Vector3::new(0.5, 0.5, 0.5))),
                Rc::new(Material::new(Color::GREEN, "TestMaterial2")),
            )
            .with_position(Vector3::new(0.0, 0.75, 0.0)),
    );

    let root = scene.add_object(parent);
    (scene, root)
}

#[wasm_bindgen]
pub struct WebRenderer {
    surface: CanvasSurface,
    scene: Scene,
    root: ObjectId,
}

#[wasm_bindgen]
impl WebRenderer {
    /// Attaches to the canvas element with id `canvas_id`
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<WebRenderer, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document available"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element with id '{}'", canvas_id)))?
            .dyn_into::<HtmlCanvasElement>()?;

        let surface = CanvasSurface::new(&canvas)?;
        let (scene, root) = hierarchy_scene(surface.width(), surface.height());
        Ok(WebRenderer { surface, scene, root })
    }

    /// Render a frame
    pub fn render(&mut self) {
        self.surface.clear(Color::rgb(0.0, 0.0, 20.0 / 255.0));
        self.scene.render(&mut self.surface);
    }

    /// Rotates the root object by the given angles in radians around the
    /// world X, Y and Z axes
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        let q = Quaternion::from_axis_angle(&Vector3::Z, dz)
            * Quaternion::from_axis_angle(&Vector3::Y, dy)
            * Quaternion::from_axis_angle(&Vector3::X, dx);
        if let Some(root) = self.scene.object_mut(self.root) {
            root.rotation = q * root.rotation;
        }
    }

    pub fn set_orthographic(&mut self, orthographic: bool) {
        self.scene.camera.orthographic = orthographic;
    }
}
