/// Camera, projection and screen-ray reconstruction
use tracing::{debug, warn};

use crate::error::{MathError, Result};
use crate::matrix::Matrix4;
use crate::object::Object3d;
use crate::vector::{Vector3, Vector4};

/// A ray in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vector3,
    /// Unit length
    pub direction: Vector3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vector3 {
        self.origin + self.direction * t
    }
}

/// Viewpoint into a scene.
///
/// The camera is a scene-graph node (its transform lives in `node`) plus the
/// projection parameters. Its view looks down local +Z with +Y up.
#[derive(Debug, Clone)]
pub struct Camera {
    pub node: Object3d,
    pub orthographic: bool,
    pub res_x: u32,
    pub res_y: u32,
    pub near_plane: f32,
    pub far_plane: f32,
    /// Field of view in radians, perspective mode only
    pub fov: f32,
    proj_matrix: Matrix4,
}

impl Camera {
    pub fn new(orthographic: bool, res_x: u32, res_y: u32) -> Self {
        Self {
            node: Object3d::new("Camera"),
            orthographic,
            res_x,
            res_y,
            near_plane: 1.0,
            far_plane: 100.0,
            fov: 60f32.to_radians(),
            proj_matrix: Matrix4::identity(),
        }
    }

    pub fn perspective(res_x: u32, res_y: u32) -> Self {
        Self::new(false, res_x, res_y)
    }

    pub fn orthographic(res_x: u32, res_y: u32) -> Self {
        Self::new(true, res_x, res_y)
    }

    /// Projection matrix for the current parameters.
    ///
    /// Orthographic scales x and y by half the resolution and keeps depth
    /// and w. Perspective is a symmetric frustum whose w is the camera-space
    /// z, so the divide in [`Mesh::render`](crate::geometry::Mesh::render)
    /// yields pixel offsets from the screen center.
    pub fn projection_matrix(&self) -> Matrix4 {
        let mut p = Matrix4::zeros();
        if self.orthographic {
            p[(0, 0)] = self.res_x as f32 * 0.5;
            p[(1, 1)] = self.res_y as f32 * 0.5;
            p[(2, 2)] = 1.0;
            p[(3, 3)] = 1.0;
        } else {
            let t = (self.fov * 0.5).tan();
            let a = self.res_y as f32 / self.res_x as f32;
            p[(0, 0)] = 0.5 * self.res_x as f32 / t;
            p[(1, 1)] = 0.5 * self.res_y as f32 / (a * t);
            p[(2, 3)] = 1.0;
            p[(2, 2)] = self.far_plane / (self.far_plane - self.near_plane);
            p[(3, 2)] = p[(2, 2)] * self.near_plane;
        }
        p
    }

    /// Computes the projection matrix and keeps it as [`Camera::last_projection`]
    pub fn get_projection_matrix(&mut self) -> Matrix4 {
        self.proj_matrix = self.projection_matrix();
        self.proj_matrix
    }

    /// Projection computed by the last [`Camera::get_projection_matrix`]
    /// call, identity before the first one
    pub fn last_projection(&self) -> &Matrix4 {
        &self.proj_matrix
    }

    /// View matrix: translation by the negated position, then the inverse
    /// rotation. Scale is ignored.
    pub fn get_camera_matrix(&self) -> Matrix4 {
        Matrix4::translation(&-self.node.position) * self.node.rotation.inverted().as_rotation_matrix()
    }

    /// Combined view and projection
    pub fn view_projection(&self) -> Matrix4 {
        self.get_camera_matrix() * self.projection_matrix()
    }

    pub fn forward(&self) -> Vector3 {
        self.node.forward()
    }

    /// Clip-space coordinates of the camera-space point at depth `depth` that
    /// lands on `ndc`
    fn clip_point(&self, ndc: (f32, f32), depth: f32, projection: &Matrix4) -> Vector4 {
        let half_x = self.res_x as f32 * 0.5;
        let half_y = self.res_y as f32 * 0.5;
        if self.orthographic {
            Vector4::new(ndc.0 * half_x, ndc.1 * half_y, depth, 1.0)
        } else {
            Vector4::new(
                ndc.0 * half_x * depth,
                ndc.1 * half_y * depth,
                depth * projection[(2, 2)] + projection[(3, 2)],
                depth,
            )
        }
    }

    /// Ray through a point of the screen given in normalized device
    /// coordinates: [-1, 1] on both axes, origin at the center, +y up.
    ///
    /// Perspective rays start on the near plane around the camera position;
    /// orthographic rays are parallel to the view axis and start at the
    /// near-plane point under `ndc`. Fails with
    /// [`MathError::SingularMatrix`] if view×projection cannot be inverted.
    pub fn ray_from_ndc(&self, ndc: (f32, f32)) -> Result<Ray> {
        let projection = self.projection_matrix();
        let inverse = (self.get_camera_matrix() * projection)
            .try_inverse()
            .ok_or_else(|| {
                warn!(camera = %self.node.name, "view-projection matrix is singular");
                MathError::SingularMatrix
            })?;

        let unproject = |depth: f32| {
            let world = inverse.transform_row(&self.clip_point(ndc, depth, &projection));
            world.xyz() / world.w
        };
        let near = unproject(self.near_plane);
        let far = unproject(self.far_plane);
        let direction = (far - near).normalized();

        let origin = if self.orthographic {
            near
        } else {
            self.node.position + direction * self.near_plane
        };

        debug!(ndc = ?ndc, origin = %origin, direction = %direction, "camera ray");
        Ok(Ray { origin, direction })
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::orthographic(640, 480)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quaternion::Quaternion;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::perspective(800, 600);
        assert!(!camera.orthographic);
        assert_eq!(camera.near_plane, 1.0);
        assert_eq!(camera.far_plane, 100.0);
        assert!((camera.fov - std::f32::consts::FRAC_PI_3).abs() < 1e-6);
        assert_eq!(*camera.last_projection(), Matrix4::identity());
    }

    #[test]
    fn test_projection_is_cached() {
        let mut camera = Camera::perspective(640, 480);
        let p = camera.get_projection_matrix();
        assert_eq!(*camera.last_projection(), p);
        assert_eq!(p[(2, 3)], 1.0);
        assert!((p[(0, 0)] - p[(1, 1)]).abs() < 1e-3);
    }

    #[test]
    fn test_orthographic_maps_half_resolution() {
        let camera = Camera::orthographic(640, 480);
        let p = camera.projection_matrix();
        let v = p.transform_point(&Vector3::new(1.0, 1.0, camera.near_plane), 1.0);
        assert_eq!(v, Vector4::new(320.0, 240.0, 1.0, 1.0));
    }

    #[test]
    fn test_perspective_w_is_depth() {
        let camera = Camera::perspective(640, 480);
        let v = camera.projection_matrix().transform_point(&Vector3::new(0.0, 0.0, 7.0), 1.0);
        assert!((v.w - 7.0).abs() < 1e-5);
    }

    #[test]
    fn test_view_matrix_inverts_camera_transform() {
        let mut camera = Camera::perspective(640, 480);
        camera.node.position = Vector3::new(1.0, 2.0, 3.0);
        camera.node.rotation = Quaternion::from_axis_angle(&Vector3::Y, 0.7);
        assert_eq!(camera.node.get_matrix() * camera.get_camera_matrix(), Matrix4::identity());
    }

    #[test]
    fn test_center_ray_is_forward() {
        let camera = Camera::perspective(640, 480);
        let ray = camera.ray_from_ndc((0.0, 0.0)).expect("invertible");
        assert_eq!(ray.direction, camera.forward());
        assert_eq!(ray.origin, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_center_ray_follows_camera_transform() {
        let mut camera = Camera::perspective(640, 480);
        camera.node.position = Vector3::new(1.0, 2.0, 3.0);
        camera.node.rotation = Quaternion::from_axis_angle(&Vector3::Y, FRAC_PI_2);
        let ray = camera.ray_from_ndc((0.0, 0.0)).expect("invertible");
        assert_eq!(ray.direction, Vector3::X);
        assert_eq!(ray.origin, Vector3::new(2.0, 2.0, 3.0));
    }

    #[test]
    fn test_ray_reprojects_to_its_screen_point() {
        let mut camera = Camera::perspective(640, 480);
        camera.node.rotation = Quaternion::from_axis_angle(&Vector3::X, 0.3);
        let center = camera.ray_from_ndc((0.0, 0.0)).expect("invertible");
        let ray = camera.ray_from_ndc((0.5, 0.5)).expect("invertible");
        assert!(ray.direction.y > center.direction.y);
        assert!(ray.direction.x > center.direction.x);

        let clip = camera.view_projection().transform_point(&ray.at(10.0), 1.0);
        let (sx, sy) = (clip.x / clip.w, clip.y / clip.w);
        assert!((sx - 160.0).abs() < 1e-2);
        assert!((sy - 120.0).abs() < 1e-2);
    }

    #[test]
    fn test_orthographic_rays_are_parallel() {
        let camera = Camera::orthographic(640, 480);
        let center = camera.ray_from_ndc((0.0, 0.0)).expect("invertible");
        let corner = camera.ray_from_ndc((1.0, -1.0)).expect("invertible");
        assert_eq!(center.direction, Vector3::Z);
        assert_eq!(corner.direction, Vector3::Z);
        assert_eq!(corner.origin, Vector3::new(1.0, -1.0, 1.0));
    }

    #[test]
    fn test_orthographic_ray_starts_under_the_screen_point() {
        let mut camera = Camera::orthographic(640, 480);
        camera.node.position = Vector3::new(2.0, 3.0, -5.0);
        let corner = camera.ray_from_ndc((1.0, -1.0)).expect("invertible");
        assert_eq!(corner.origin, Vector3::new(3.0, 2.0, -4.0));
        assert_ne!(corner.origin, camera.node.position + corner.direction * camera.near_plane);
    }

    #[test]
    fn test_singular_projection_is_an_error() {
        let mut camera = Camera::perspective(640, 480);
        camera.res_x = 0;
        assert_eq!(camera.ray_from_ndc((0.0, 0.0)), Err(MathError::SingularMatrix));
    }
}
