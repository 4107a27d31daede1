/// 3D and homogeneous 4D vectors
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::quaternion::Quaternion;

/// Absolute tolerance used by every approximate equality in the crate
pub const EPSILON: f32 = 1e-4;

/// A 3D vector
#[derive(Debug, Clone, Copy, Default)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3::new(0.0, 0.0, 0.0);
    pub const ONE: Vector3 = Vector3::new(1.0, 1.0, 1.0);
    pub const X: Vector3 = Vector3::new(1.0, 0.0, 0.0);
    pub const Y: Vector3 = Vector3::new(0.0, 1.0, 0.0);
    pub const Z: Vector3 = Vector3::new(0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: &Vector3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn magnitude(&self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn magnitude_squared(&self) -> f32 {
        self.dot(self)
    }

    /// Normalizes this vector in place.
    ///
    /// The vector must not be zero: a zero vector yields NaN components.
    pub fn normalize(&mut self) {
        *self = self.normalized();
    }

    /// Returns a unit-length copy of this vector.
    ///
    /// The vector must not be zero: a zero vector yields NaN components.
    pub fn normalized(&self) -> Vector3 {
        let d = 1.0 / self.magnitude();
        Vector3::new(self.x * d, self.y * d, self.z * d)
    }

    pub fn distance(&self, other: &Vector3) -> f32 {
        (*self - *other).magnitude()
    }

    /// Projection on the XZ plane (y dropped to zero)
    pub fn x0z(&self) -> Vector3 {
        Vector3::new(self.x, 0.0, self.z)
    }

    pub fn lerp(&self, other: &Vector3, t: f32) -> Vector3 {
        *self + (*other - *self) * t
    }

    /// Rotates this vector by a unit quaternion
    pub fn rotated_by(&self, rotation: &Quaternion) -> Vector3 {
        rotation.rotate_vector(self)
    }
}

/// Dot product of two vectors
pub fn dot_product(a: &Vector3, b: &Vector3) -> f32 {
    a.dot(b)
}

/// Cross product of two vectors
pub fn cross_product(a: &Vector3, b: &Vector3) -> Vector3 {
    a.cross(b)
}

impl PartialEq for Vector3 {
    fn eq(&self, other: &Self) -> bool {
        (*self - *other).magnitude() < EPSILON
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

impl Add for Vector3 {
    type Output = Vector3;
    fn add(self, other: Vector3) -> Vector3 {
        Vector3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vector3 {
    type Output = Vector3;
    fn sub(self, other: Vector3) -> Vector3 {
        Vector3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f32> for Vector3 {
    type Output = Vector3;
    fn mul(self, scalar: f32) -> Vector3 {
        Vector3::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl Mul<Vector3> for f32 {
    type Output = Vector3;
    fn mul(self, v: Vector3) -> Vector3 {
        v * self
    }
}

impl Div<f32> for Vector3 {
    type Output = Vector3;
    fn div(self, scalar: f32) -> Vector3 {
        Vector3::new(self.x / scalar, self.y / scalar, self.z / scalar)
    }
}

impl Neg for Vector3 {
    type Output = Vector3;
    fn neg(self) -> Vector3 {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}

impl AddAssign for Vector3 {
    fn add_assign(&mut self, other: Vector3) {
        *self = *self + other;
    }
}

impl SubAssign for Vector3 {
    fn sub_assign(&mut self, other: Vector3) {
        *self = *self - other;
    }
}

impl MulAssign<f32> for Vector3 {
    fn mul_assign(&mut self, scalar: f32) {
        *self = *self * scalar;
    }
}

impl DivAssign<f32> for Vector3 {
    fn div_assign(&mut self, scalar: f32) {
        *self = *self / scalar;
    }
}

/// A homogeneous 4D vector, the output of matrix transforms
#[derive(Debug, Clone, Copy, Default)]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vector4 {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Extends a 3D vector with the given w (1 for points, 0 for directions)
    pub fn from_point(v: &Vector3, w: f32) -> Self {
        Self::new(v.x, v.y, v.z, w)
    }

    /// Drops the w component
    pub fn xyz(&self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn dot(&self, other: &Vector4) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    pub fn magnitude(&self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn magnitude_squared(&self) -> f32 {
        self.dot(self)
    }

    /// Normalizes in place. The vector must not be zero.
    pub fn normalize(&mut self) {
        *self = self.normalized();
    }

    /// The vector must not be zero.
    pub fn normalized(&self) -> Vector4 {
        let d = 1.0 / self.magnitude();
        Vector4::new(self.x * d, self.y * d, self.z * d, self.w * d)
    }

    pub fn distance(&self, other: &Vector4) -> f32 {
        (*self - *other).magnitude()
    }
}

impl PartialEq for Vector4 {
    fn eq(&self, other: &Self) -> bool {
        (*self - *other).magnitude() < EPSILON
    }
}

impl fmt::Display for Vector4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{},{})", self.x, self.y, self.z, self.w)
    }
}

impl Add for Vector4 {
    type Output = Vector4;
    fn add(self, o: Vector4) -> Vector4 {
        Vector4::new(self.x + o.x, self.y + o.y, self.z + o.z, self.w + o.w)
    }
}

impl Sub for Vector4 {
    type Output = Vector4;
    fn sub(self, o: Vector4) -> Vector4 {
        Vector4::new(self.x - o.x, self.y - o.y, self.z - o.z, self.w - o.w)
    }
}

impl Mul<f32> for Vector4 {
    type Output = Vector4;
    fn mul(self, s: f32) -> Vector4 {
        Vector4::new(self.x * s, self.y * s, self.z * s, self.w * s)
    }
}

impl Mul<Vector4> for f32 {
    type Output = Vector4;
    fn mul(self, v: Vector4) -> Vector4 {
        v * self
    }
}

impl Div<f32> for Vector4 {
    type Output = Vector4;
    fn div(self, s: f32) -> Vector4 {
        Vector4::new(self.x / s, self.y / s, self.z / s, self.w / s)
    }
}

impl Neg for Vector4 {
    type Output = Vector4;
    fn neg(self) -> Vector4 {
        Vector4::new(-self.x, -self.y, -self.z, -self.w)
    }
}

impl AddAssign for Vector4 {
    fn add_assign(&mut self, o: Vector4) {
        *self = *self + o;
    }
}

impl SubAssign for Vector4 {
    fn sub_assign(&mut self, o: Vector4) {
        *self = *self - o;
    }
}

impl MulAssign<f32> for Vector4 {
    fn mul_assign(&mut self, s: f32) {
        *self = *self * s;
    }
}

impl DivAssign<f32> for Vector4 {
    fn div_assign(&mut self, s: f32) {
        *self = *self / s;
    }
}
