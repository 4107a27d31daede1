/// Polygon meshes, their parametric generators and their projection to screen space
use std::f32::consts::PI;
use std::time::Instant;

use tracing::trace;

use crate::material::Material;
use crate::matrix::Matrix4;
use crate::stats::RenderStats;
use crate::surface::{ScreenPoint, Surface};
use crate::vector::Vector3;

/// An ordered loop of vertices, assumed planar. Winding carries no meaning.
pub type Polygon = Vec<Vector3>;

/// A named list of polygons.
///
/// Meshes are usually built once and shared (behind an `Rc`) by every object
/// that draws them, so they are treated as immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub polygons: Vec<Polygon>,
}

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            polygons: Vec::new(),
        }
    }

    pub fn add_polygon(&mut self, polygon: Polygon) {
        self.polygons.push(polygon);
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.polygons.iter().map(Vec::len).sum()
    }

    /// Displaces every vertex by `v`
    pub fn offset(&mut self, v: Vector3) {
        for vertex in self.polygons.iter_mut().flatten() {
            *vertex += v;
        }
    }

    /// Projects every polygon through `clip_matrix` and draws it on `surface`.
    ///
    /// Vertices are row vectors `(v, 1)` multiplied by the matrix, divided by
    /// w and mapped so that the origin lands on the surface center with y
    /// pointing down. Nothing is clipped: vertices behind the camera (w <= 0)
    /// project to mirrored or non-finite points and are handed over as is.
    pub fn render<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        clip_matrix: &Matrix4,
        material: &Material,
        mut stats: Option<&mut RenderStats>,
    ) {
        let half_width = surface.width() as f32 * 0.5;
        let half_height = surface.height() as f32 * 0.5;

        trace!(mesh = %self.name, polygons = self.polygons.len(), "rendering mesh");

        for polygon in &self.polygons {
            let t0 = Instant::now();
            let points: Vec<ScreenPoint> = polygon
                .iter()
                .map(|v| {
                    let out = clip_matrix.transform_point(v, 1.0);
                    ScreenPoint::new(half_width + out.x / out.w, half_height - out.y / out.w)
                })
                .collect();
            let t1 = Instant::now();

            surface.draw_polygon(material.color, &points, material.line_width);

            if let Some(stats) = stats.as_deref_mut() {
                stats.polygons += 1;
                stats.vertices += polygon.len();
                stats.transform_time += t1 - t0;
                stats.draw_time += t1.elapsed();
            }
        }
    }

    /// Axis-aligned box of the given extents, centred on the origin
    pub fn cube(size: Vector3) -> Self {
        let mut mesh = Self::new("UnknownCube");
        mesh.add_cube(size);
        mesh
    }

    /// Appends the 6 faces of a box centred on the origin
    pub fn add_cube(&mut self, size: Vector3) -> &mut Self {
        let hx = size.x * 0.5;
        let hy = size.y * 0.5;
        let hz = size.z * 0.5;

        self.add_quad(Vector3::new(hx, 0.0, 0.0), Vector3::new(0.0, -hy, 0.0), Vector3::new(0.0, 0.0, hz));
        self.add_quad(Vector3::new(-hx, 0.0, 0.0), Vector3::new(0.0, hy, 0.0), Vector3::new(0.0, 0.0, hz));
        self.add_quad(Vector3::new(0.0, hy, 0.0), Vector3::new(hx, 0.0, 0.0), Vector3::new(0.0, 0.0, hz));
        self.add_quad(Vector3::new(0.0, -hy, 0.0), Vector3::new(-hx, 0.0, 0.0), Vector3::new(0.0, 0.0, hz));
        self.add_quad(Vector3::new(0.0, 0.0, hz), Vector3::new(-hx, 0.0, 0.0), Vector3::new(0.0, hy, 0.0));
        self.add_quad(Vector3::new(0.0, 0.0, -hz), Vector3::new(hx, 0.0, 0.0), Vector3::new(0.0, hy, 0.0));
        self
    }

    /// Single rectangle, see [`Mesh::add_quad`]
    pub fn quad(origin: Vector3, axis0: Vector3, axis1: Vector3) -> Self {
        let mut mesh = Self::new("UnknownQuad");
        mesh.add_quad(origin, axis0, axis1);
        mesh
    }

    /// Appends a rectangle centred on `origin`. The axes are not normalized:
    /// their lengths are the half extents along each side.
    pub fn add_quad(&mut self, origin: Vector3, axis0: Vector3, axis1: Vector3) -> &mut Self {
        self.polygons.push(vec![
            origin + axis0 + axis1,
            origin + axis0 - axis1,
            origin - axis0 - axis1,
            origin - axis0 + axis1,
        ]);
        self
    }

    pub fn triangle(p1: Vector3, p2: Vector3, p3: Vector3) -> Self {
        let mut mesh = Self::new("UnknownTriangle");
        mesh.add_triangle(p1, p2, p3);
        mesh
    }

    pub fn add_triangle(&mut self, p1: Vector3, p2: Vector3, p3: Vector3) -> &mut Self {
        self.polygons.push(vec![p1, p2, p3]);
        self
    }

    /// Ellipsoid of the given extents, see [`Mesh::add_sphere`]
    pub fn sphere(size: Vector3, res_lat: usize, res_lon: usize) -> Self {
        let mut mesh = Self::new("UnknownSphere");
        mesh.add_sphere(size, res_lat, res_lon);
        mesh
    }

    /// Appends an ellipsoid centred on the origin: one fan of `res_lon`
    /// triangles around each pole and `res_lat - 2` rings of quads between
    /// them. Expects `res_lat >= 2` and `res_lon >= 3`.
    pub fn add_sphere(&mut self, size: Vector3, res_lat: usize, res_lon: usize) -> &mut Self {
        let hs = size * 0.5;
        let bottom = Vector3::new(0.0, -hs.y, 0.0);
        let top = Vector3::new(0.0, hs.y, 0.0);
        let lat_inc = PI / res_lat as f32;
        let lon_inc = PI * 2.0 / res_lon as f32;

        let ring_point = |lat: f32, lon: f32| {
            let c = lat.cos();
            Vector3::new(c * lon.cos() * hs.x, hs.y * lat.sin(), c * lon.sin() * hs.z)
        };

        // Bottom fan
        let mut lat = -PI / 2.0;
        for i in 0..res_lon {
            let lon = i as f32 * lon_inc;
            let p1 = ring_point(lat + lat_inc, lon);
            let p2 = ring_point(lat + lat_inc, lon + lon_inc);
            self.add_triangle(bottom, p1, p2);
        }

        for _ in 1..res_lat.saturating_sub(1) {
            lat += lat_inc;
            for i in 0..res_lon {
                let lon = i as f32 * lon_inc;
                let p1 = ring_point(lat, lon);
                let p2 = ring_point(lat, lon + lon_inc);
                let p3 = ring_point(lat + lat_inc, lon);
                let p4 = ring_point(lat + lat_inc, lon + lon_inc);
                self.polygons.push(vec![p1, p2, p4, p3]);
            }
        }

        // Top fan
        lat += lat_inc;
        for i in 0..res_lon {
            let lon = i as f32 * lon_inc;
            let p1 = ring_point(lat, lon);
            let p2 = ring_point(lat, lon + lon_inc);
            self.add_triangle(top, p1, p2);
        }
        self
    }

    /// Heightfield patch, see [`Mesh::add_grid`]
    pub fn grid<F>(size_x: f32, size_z: f32, divisions: usize, height: F) -> Self
    where
        F: FnMut(f32, f32) -> f32,
    {
        let mut mesh = Self::new("UnknownGrid");
        mesh.add_grid(size_x, size_z, divisions, height);
        mesh
    }

    /// Appends a `divisions x divisions` grid of quads on the XZ plane, centred
    /// on the origin, with every vertex lifted to `height(x, z)`
    pub fn add_grid<F>(&mut self, size_x: f32, size_z: f32, divisions: usize, mut height: F) -> &mut Self
    where
        F: FnMut(f32, f32) -> f32,
    {
        let px = size_x / divisions as f32;
        let pz = size_z / divisions as f32;
        let origin = Vector3::new(-size_x * 0.5, 0.0, -size_z * 0.5);

        let mut vertex = |dx: usize, dz: usize| {
            let mut p = Vector3::new(dx as f32 * px, 0.0, dz as f32 * pz) + origin;
            p.y = height(p.x, p.z);
            p
        };

        for dz in 0..divisions {
            for dx in 0..divisions {
                let poly = vec![
                    vertex(dx, dz),
                    vertex(dx + 1, dz),
                    vertex(dx + 1, dz + 1),
                    vertex(dx, dz + 1),
                ];
                self.polygons.push(poly);
            }
        }
        self
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new("UnknownMesh")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::surface::{DrawCommand, RecordingSurface};

    #[test]
    fn test_cube_faces() {
        let cube = Mesh::cube(Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(cube.name, "UnknownCube");
        assert_eq!(cube.polygon_count(), 6);
        assert!(cube.polygons.iter().all(|p| p.len() == 4));
        for v in cube.polygons.iter().flatten() {
            assert!((v.x.abs() - 0.5).abs() < 1e-6);
            assert!((v.y.abs() - 1.0).abs() < 1e-6);
            assert!((v.z.abs() - 1.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_quad_corners() {
        let quad = Mesh::quad(Vector3::Z, Vector3::X, Vector3::Y);
        assert_eq!(
            quad.polygons[0],
            vec![
                Vector3::new(1.0, 1.0, 1.0),
                Vector3::new(1.0, -1.0, 1.0),
                Vector3::new(-1.0, -1.0, 1.0),
                Vector3::new(-1.0, 1.0, 1.0),
            ]
        );
    }

    #[test]
    fn test_sphere_topology() {
        let sphere = Mesh::sphere(Vector3::new(2.0, 2.0, 2.0), 6, 8);
        let triangles = sphere.polygons.iter().filter(|p| p.len() == 3).count();
        let quads = sphere.polygons.iter().filter(|p| p.len() == 4).count();
        assert_eq!(triangles, 16);
        assert_eq!(quads, 4 * 8);
        for v in sphere.polygons.iter().flatten() {
            assert!((v.magnitude() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_generators_append() {
        let mut mesh = Mesh::default();
        mesh.add_cube(Vector3::ONE)
            .add_triangle(Vector3::ZERO, Vector3::X, Vector3::Y);
        assert_eq!(mesh.name, "UnknownMesh");
        assert_eq!(mesh.polygon_count(), 7);
        assert_eq!(mesh.vertex_count(), 27);
    }

    #[test]
    fn test_grid_heights() {
        let grid = Mesh::grid(4.0, 4.0, 4, |x, z| x + z);
        assert_eq!(grid.polygon_count(), 16);
        let first = &grid.polygons[0];
        assert_eq!(first[0], Vector3::new(-2.0, -4.0, -2.0));
        assert_eq!(first[2], Vector3::new(-1.0, -2.0, -1.0));
    }

    #[test]
    fn test_offset() {
        let mut mesh = Mesh::triangle(Vector3::ZERO, Vector3::X, Vector3::Y);
        mesh.offset(Vector3::new(0.0, 0.0, 5.0));
        assert_eq!(mesh.polygons[0][1], Vector3::new(1.0, 0.0, 5.0));
    }

    #[test]
    fn test_render_projects_through_matrix() {
        let mesh = Mesh::triangle(Vector3::ZERO, Vector3::X, Vector3::Y);
        let material = Material::new(Color::GREEN, "Green").with_line_width(0);
        let mut surface = RecordingSurface::new(200, 100);
        let mut stats = RenderStats::new();
        let clip = Matrix4::scale(&Vector3::new(10.0, 10.0, 1.0));

        mesh.render(&mut surface, &clip, &material, Some(&mut stats));

        match &surface.commands[0] {
            DrawCommand::Polygon { color, points, stroke_width } => {
                assert_eq!(*color, Color::GREEN);
                assert_eq!(*stroke_width, 0);
                assert_eq!(points[0], ScreenPoint::new(100.0, 50.0));
                assert_eq!(points[1], ScreenPoint::new(110.0, 50.0));
                assert_eq!(points[2], ScreenPoint::new(100.0, 40.0));
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(stats.polygons, 1);
        assert_eq!(stats.vertices, 3);
    }

    #[test]
    fn test_render_does_not_guard_zero_w() {
        let mesh = Mesh::triangle(Vector3::ZERO, Vector3::X, Vector3::Y);
        let mut surface = RecordingSurface::new(10, 10);
        mesh.render(&mut surface, &Matrix4::zeros(), &Material::default(), None);
        let points = surface.polygons().next().expect("one polygon");
        assert!(points.iter().all(|p| !p.is_finite()));
    }
}
