/// Rotation quaternions
use std::fmt;
use std::ops::{Add, Div, Mul, MulAssign, Neg, Sub};

use crate::matrix::Matrix4;
use crate::vector::{Vector3, EPSILON};

/// A quaternion stored as (x, y, z, w), w being the scalar part.
///
/// Rotation operations expect unit magnitude. Nothing enforces it, and
/// repeated composition drifts, so callers renormalize from time to time.
#[derive(Debug, Clone, Copy)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quaternion {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub const fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    /// Rotation of `angle` radians around `axis` (right-handed, axis should be unit length)
    pub fn from_axis_angle(axis: &Vector3, angle: f32) -> Self {
        let (s, c) = (angle * 0.5).sin_cos();
        Self::new(axis.x * s, axis.y * s, axis.z * s, c)
    }

    pub fn dot(&self, other: &Quaternion) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    pub fn magnitude(&self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn magnitude_squared(&self) -> f32 {
        self.dot(self)
    }

    pub fn normalize(&mut self) {
        *self = self.normalized();
    }

    pub fn normalized(&self) -> Quaternion {
        let d = 1.0 / self.magnitude();
        *self * d
    }

    pub fn conjugate(&self) -> Quaternion {
        Quaternion::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Inverts in place (conjugate scaled by the reciprocal magnitude)
    pub fn invert(&mut self) {
        *self = self.inverted();
    }

    /// Conjugate scaled by the reciprocal magnitude. Exact inverse for unit quaternions.
    pub fn inverted(&self) -> Quaternion {
        let inv_norm = 1.0 / self.magnitude();
        Quaternion::new(
            -self.x * inv_norm,
            -self.y * inv_norm,
            -self.z * inv_norm,
            self.w * inv_norm,
        )
    }

    /// Rotates a vector, equivalent to `q * (v, 0) * q⁻¹` for a unit quaternion
    pub fn rotate_vector(&self, v: &Vector3) -> Vector3 {
        let u = Vector3::new(self.x, self.y, self.z);
        let t = u.cross(v) * 2.0;
        *v + t * self.w + u.cross(&t)
    }

    /// Rotation matrix for row vectors (`v * M`), translation row and column left at identity
    pub fn as_rotation_matrix(&self) -> Matrix4 {
        let xx = self.x * self.x;
        let xy = self.x * self.y;
        let xz = self.x * self.z;
        let xw = self.x * self.w;
        let yy = self.y * self.y;
        let yz = self.y * self.z;
        let yw = self.y * self.w;
        let zz = self.z * self.z;
        let zw = self.z * self.w;

        let mut m = Matrix4::identity();
        m[(0, 0)] = 1.0 - 2.0 * (yy + zz);
        m[(1, 0)] = 2.0 * (xy - zw);
        m[(2, 0)] = 2.0 * (xz + yw);
        m[(0, 1)] = 2.0 * (xy + zw);
        m[(1, 1)] = 1.0 - 2.0 * (xx + zz);
        m[(2, 1)] = 2.0 * (yz - xw);
        m[(0, 2)] = 2.0 * (xz - yw);
        m[(1, 2)] = 2.0 * (yz + xw);
        m[(2, 2)] = 1.0 - 2.0 * (xx + yy);
        m
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl PartialEq for Quaternion {
    fn eq(&self, other: &Self) -> bool {
        (*self - *other).magnitude() < EPSILON
    }
}

impl fmt::Display for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{},{})", self.x, self.y, self.z, self.w)
    }
}

impl Add for Quaternion {
    type Output = Quaternion;
    fn add(self, q: Quaternion) -> Quaternion {
        Quaternion::new(self.x + q.x, self.y + q.y, self.z + q.z, self.w + q.w)
    }
}

impl Sub for Quaternion {
    type Output = Quaternion;
    fn sub(self, q: Quaternion) -> Quaternion {
        Quaternion::new(self.x - q.x, self.y - q.y, self.z - q.z, self.w - q.w)
    }
}

/// Hamilton product. `q2 * q1` applies `q1` first, then `q2`.
impl Mul for Quaternion {
    type Output = Quaternion;
    fn mul(self, q: Quaternion) -> Quaternion {
        Quaternion::new(
            self.w * q.x + self.x * q.w + self.y * q.z - self.z * q.y,
            self.w * q.y - self.x * q.z + self.y * q.w + self.z * q.x,
            self.w * q.z + self.x * q.y - self.y * q.x + self.z * q.w,
            self.w * q.w - self.x * q.x - self.y * q.y - self.z * q.z,
        )
    }
}

impl MulAssign for Quaternion {
    fn mul_assign(&mut self, q: Quaternion) {
        *self = *self * q;
    }
}

impl Mul<f32> for Quaternion {
    type Output = Quaternion;
    fn mul(self, s: f32) -> Quaternion {
        Quaternion::new(self.x * s, self.y * s, self.z * s, self.w * s)
    }
}

impl Div<f32> for Quaternion {
    type Output = Quaternion;
    fn div(self, s: f32) -> Quaternion {
        Quaternion::new(self.x / s, self.y / s, self.z / s, self.w / s)
    }
}

impl Neg for Quaternion {
    type Output = Quaternion;
    fn neg(self) -> Quaternion {
        Quaternion::new(-self.x, -self.y, -self.z, -self.w)
    }
}
