/// Conversions to and from nalgebra types
///
/// Matrices map element for element by (row, column); nalgebra's column-major
/// storage is irrelevant at this level.
use crate::matrix::Matrix4;
use crate::quaternion::Quaternion;
use crate::vector::{Vector3, Vector4};

impl From<Vector3> for nalgebra::Vector3<f32> {
    fn from(v: Vector3) -> Self {
        nalgebra::Vector3::new(v.x, v.y, v.z)
    }
}

impl From<nalgebra::Vector3<f32>> for Vector3 {
    fn from(v: nalgebra::Vector3<f32>) -> Self {
        Vector3::new(v.x, v.y, v.z)
    }
}

impl From<Vector3> for nalgebra::Point3<f32> {
    fn from(v: Vector3) -> Self {
        nalgebra::Point3::new(v.x, v.y, v.z)
    }
}

impl From<nalgebra::Point3<f32>> for Vector3 {
    fn from(p: nalgebra::Point3<f32>) -> Self {
        Vector3::new(p.x, p.y, p.z)
    }
}

impl From<Vector4> for nalgebra::Vector4<f32> {
    fn from(v: Vector4) -> Self {
        nalgebra::Vector4::new(v.x, v.y, v.z, v.w)
    }
}

impl From<nalgebra::Vector4<f32>> for Vector4 {
    fn from(v: nalgebra::Vector4<f32>) -> Self {
        Vector4::new(v.x, v.y, v.z, v.w)
    }
}

impl From<Quaternion> for nalgebra::Quaternion<f32> {
    fn from(q: Quaternion) -> Self {
        nalgebra::Quaternion::new(q.w, q.x, q.y, q.z)
    }
}

impl From<nalgebra::Quaternion<f32>> for Quaternion {
    fn from(q: nalgebra::Quaternion<f32>) -> Self {
        // coords are stored as (i, j, k, w)
        Quaternion::new(q.coords.x, q.coords.y, q.coords.z, q.coords.w)
    }
}

impl From<Matrix4> for nalgebra::Matrix4<f32> {
    fn from(m: Matrix4) -> Self {
        nalgebra::Matrix4::from_fn(|row, col| m.m[row][col])
    }
}

impl From<nalgebra::Matrix4<f32>> for Matrix4 {
    fn from(n: nalgebra::Matrix4<f32>) -> Self {
        let mut m = Matrix4::zeros();
        for row in 0..4 {
            for col in 0..4 {
                m.m[row][col] = n[(row, col)];
            }
        }
        m
    }
}
