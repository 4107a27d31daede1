/// Row-major 4x4 matrices
///
/// Points are row vectors multiplied on the left (`v * M`), so a chain such as
/// `scale * rotation * translation` applies the scale first.
use std::fmt;
use std::ops::{Index, IndexMut, Mul};

use crate::vector::{Vector3, Vector4, EPSILON};

#[derive(Debug, Clone, Copy)]
pub struct Matrix4 {
    pub m: [[f32; 4]; 4],
}

impl Matrix4 {
    pub const fn from_rows(m: [[f32; 4]; 4]) -> Self {
        Self { m }
    }

    pub const fn identity() -> Self {
        Self::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub const fn zeros() -> Self {
        Self::filled(0.0)
    }

    /// Every element set to `value`
    pub const fn filled(value: f32) -> Self {
        Self::from_rows([[value; 4]; 4])
    }

    /// Translation by `v` (stored in the last row)
    pub fn translation(v: &Vector3) -> Self {
        let mut m = Self::identity();
        m[(3, 0)] = v.x;
        m[(3, 1)] = v.y;
        m[(3, 2)] = v.z;
        m
    }

    /// Non-uniform scale along the three axes
    pub fn scale(v: &Vector3) -> Self {
        let mut m = Self::identity();
        m[(0, 0)] = v.x;
        m[(1, 1)] = v.y;
        m[(2, 2)] = v.z;
        m
    }

    pub fn transpose(&self) -> Self {
        let mut t = Self::zeros();
        for i in 0..4 {
            for j in 0..4 {
                t.m[i][j] = self.m[j][i];
            }
        }
        t
    }

    /// Row-vector transform: `v * M`
    pub fn transform_row(&self, v: &Vector4) -> Vector4 {
        let m = &self.m;
        Vector4::new(
            v.x * m[0][0] + v.y * m[1][0] + v.z * m[2][0] + v.w * m[3][0],
            v.x * m[0][1] + v.y * m[1][1] + v.z * m[2][1] + v.w * m[3][1],
            v.x * m[0][2] + v.y * m[1][2] + v.z * m[2][2] + v.w * m[3][2],
            v.x * m[0][3] + v.y * m[1][3] + v.z * m[2][3] + v.w * m[3][3],
        )
    }

    /// Row-vector transform of `(v, w)` without building the intermediate vector
    pub fn transform_point(&self, v: &Vector3, w: f32) -> Vector4 {
        let m = &self.m;
        Vector4::new(
            v.x * m[0][0] + v.y * m[1][0] + v.z * m[2][0] + w * m[3][0],
            v.x * m[0][1] + v.y * m[1][1] + v.z * m[2][1] + w * m[3][1],
            v.x * m[0][2] + v.y * m[1][2] + v.z * m[2][2] + w * m[3][2],
            v.x * m[0][3] + v.y * m[1][3] + v.z * m[2][3] + w * m[3][3],
        )
    }

    /// Column-vector transform: `M * v`
    pub fn transform_column(&self, v: &Vector4) -> Vector4 {
        let m = &self.m;
        Vector4::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z + m[0][3] * v.w,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z + m[1][3] * v.w,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z + m[2][3] * v.w,
            m[3][0] * v.x + m[3][1] * v.y + m[3][2] * v.z + m[3][3] * v.w,
        )
    }

    /// Cofactors of the transposed matrix (the adjugate) and the determinant
    fn adjugate(&self) -> ([f32; 16], f32) {
        let mut src = [0.0f32; 16];
        for i in 0..4 {
            for j in 0..4 {
                src[i * 4 + j] = self.m[j][i];
            }
        }

        let mut tmp = [0.0f32; 12];
        let mut dst = [0.0f32; 16];

        // Pairs for the first 8 cofactors
        tmp[0] = src[10] * src[15];
        tmp[1] = src[11] * src[14];
        tmp[2] = src[9] * src[15];
        tmp[3] = src[11] * src[13];
        tmp[4] = src[9] * src[14];
        tmp[5] = src[10] * src[13];
        tmp[6] = src[8] * src[15];
        tmp[7] = src[11] * src[12];
        tmp[8] = src[8] * src[14];
        tmp[9] = src[10] * src[12];
        tmp[10] = src[8] * src[13];
        tmp[11] = src[9] * src[12];

        dst[0] = tmp[0] * src[5] + tmp[3] * src[6] + tmp[4] * src[7];
        dst[0] -= tmp[1] * src[5] + tmp[2] * src[6] + tmp[5] * src[7];
        dst[1] = tmp[1] * src[4] + tmp[6] * src[6] + tmp[9] * src[7];
        dst[1] -= tmp[0] * src[4] + tmp[7] * src[6] + tmp[8] * src[7];
        dst[2] = tmp[2] * src[4] + tmp[7] * src[5] + tmp[10] * src[7];
        dst[2] -= tmp[3] * src[4] + tmp[6] * src[5] + tmp[11] * src[7];
        dst[3] = tmp[5] * src[4] + tmp[8] * src[5] + tmp[11] * src[6];
        dst[3] -= tmp[4] * src[4] + tmp[9] * src[5] + tmp[10] * src[6];
        dst[4] = tmp[1] * src[1] + tmp[2] * src[2] + tmp[5] * src[3];
        dst[4] -= tmp[0] * src[1] + tmp[3] * src[2] + tmp[4] * src[3];
        dst[5] = tmp[0] * src[0] + tmp[7] * src[2] + tmp[8] * src[3];
        dst[5] -= tmp[1] * src[0] + tmp[6] * src[2] + tmp[9] * src[3];
        dst[6] = tmp[3] * src[0] + tmp[6] * src[1] + tmp[11] * src[3];
        dst[6] -= tmp[2] * src[0] + tmp[7] * src[1] + tmp[10] * src[3];
        dst[7] = tmp[4] * src[0] + tmp[9] * src[1] + tmp[10] * src[2];
        dst[7] -= tmp[5] * src[0] + tmp[8] * src[1] + tmp[11] * src[2];

        // Pairs for the second 8 cofactors
        tmp[0] = src[2] * src[7];
        tmp[1] = src[3] * src[6];
        tmp[2] = src[1] * src[7];
        tmp[3] = src[3] * src[5];
        tmp[4] = src[1] * src[6];
        tmp[5] = src[2] * src[5];
        tmp[6] = src[0] * src[7];
        tmp[7] = src[3] * src[4];
        tmp[8] = src[0] * src[6];
        tmp[9] = src[2] * src[4];
        tmp[10] = src[0] * src[5];
        tmp[11] = src[1] * src[4];

        dst[8] = tmp[0] * src[13] + tmp[3] * src[14] + tmp[4] * src[15];
        dst[8] -= tmp[1] * src[13] + tmp[2] * src[14] + tmp[5] * src[15];
        dst[9] = tmp[1] * src[12] + tmp[6] * src[14] + tmp[9] * src[15];
        dst[9] -= tmp[0] * src[12] + tmp[7] * src[14] + tmp[8] * src[15];
        dst[10] = tmp[2] * src[12] + tmp[7] * src[13] + tmp[10] * src[15];
        dst[10] -= tmp[3] * src[12] + tmp[6] * src[13] + tmp[11] * src[15];
        dst[11] = tmp[5] * src[12] + tmp[8] * src[13] + tmp[11] * src[14];
        dst[11] -= tmp[4] * src[12] + tmp[9] * src[13] + tmp[10] * src[14];
        dst[12] = tmp[2] * src[10] + tmp[5] * src[11] + tmp[1] * src[9];
        dst[12] -= tmp[4] * src[11] + tmp[0] * src[9] + tmp[3] * src[10];
        dst[13] = tmp[8] * src[11] + tmp[0] * src[8] + tmp[7] * src[10];
        dst[13] -= tmp[6] * src[10] + tmp[9] * src[11] + tmp[1] * src[8];
        dst[14] = tmp[6] * src[9] + tmp[11] * src[11] + tmp[3] * src[8];
        dst[14] -= tmp[10] * src[11] + tmp[2] * src[8] + tmp[7] * src[9];
        dst[15] = tmp[10] * src[10] + tmp[4] * src[8] + tmp[9] * src[9];
        dst[15] -= tmp[8] * src[9] + tmp[11] * src[10] + tmp[5] * src[8];

        let det = src[0] * dst[0] + src[1] * dst[1] + src[2] * dst[2] + src[3] * dst[3];
        (dst, det)
    }

    pub fn determinant(&self) -> f32 {
        self.adjugate().1
    }

    /// Inverse by the cofactor/adjugate method.
    ///
    /// The matrix must be invertible: a zero determinant (zero scale, for
    /// instance) produces infinite or NaN elements. Near-singular matrices
    /// lose precision.
    pub fn inverse(&self) -> Self {
        let (dst, det) = self.adjugate();
        let inv_det = 1.0 / det;
        let mut out = Self::zeros();
        for i in 0..4 {
            for j in 0..4 {
                out.m[i][j] = dst[i * 4 + j] * inv_det;
            }
        }
        out
    }

    /// Inverts in place, see [`Matrix4::inverse`]
    pub fn invert(&mut self) {
        *self = self.inverse();
    }

    /// Inverse, or `None` when the determinant is exactly zero or not finite
    pub fn try_inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        Some(self.inverse())
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::identity()
    }
}

/// Equal when the Frobenius norm of the difference is under [`EPSILON`]
impl PartialEq for Matrix4 {
    fn eq(&self, other: &Self) -> bool {
        let mut sum = 0.0;
        for i in 0..4 {
            for j in 0..4 {
                let d = self.m[i][j] - other.m[i][j];
                sum += d * d;
            }
        }
        sum.sqrt() < EPSILON
    }
}

impl fmt::Display for Matrix4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.m {
            writeln!(f, "[{} {} {} {}]", row[0], row[1], row[2], row[3])?;
        }
        Ok(())
    }
}

impl Index<(usize, usize)> for Matrix4 {
    type Output = f32;
    fn index(&self, (row, col): (usize, usize)) -> &f32 {
        &self.m[row][col]
    }
}

impl IndexMut<(usize, usize)> for Matrix4 {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f32 {
        &mut self.m[row][col]
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;
    fn mul(self, other: Matrix4) -> Matrix4 {
        let mut out = Matrix4::zeros();
        for i in 0..4 {
            for j in 0..4 {
                out.m[i][j] = (0..4).map(|k| self.m[i][k] * other.m[k][j]).sum();
            }
        }
        out
    }
}

/// Column-vector transform, `M * v`
impl Mul<Vector4> for Matrix4 {
    type Output = Vector4;
    fn mul(self, v: Vector4) -> Vector4 {
        self.transform_column(&v)
    }
}

/// Row-vector transform, `v * M`
impl Mul<Matrix4> for Vector4 {
    type Output = Vector4;
    fn mul(self, m: Matrix4) -> Vector4 {
        m.transform_row(&self)
    }
}
