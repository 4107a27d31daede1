/// Dynamically typed algebra
///
/// The operator overloads on the value types reject illegal operand pairs at
/// compile time. This module serves callers that only know operand kinds at
/// run time (consoles, scripted scene descriptions): the same operations are
/// dispatched on [`Operand`] and illegal pairs come back as
/// [`MathError::InvalidOperation`].
use std::fmt;

use crate::color::Color;
use crate::error::{MathError, Result};
use crate::matrix::Matrix4;
use crate::quaternion::Quaternion;
use crate::vector::{Vector3, Vector4};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Dot,
    Cross,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mult",
            BinaryOp::Div => "div",
            BinaryOp::Dot => "dot",
            BinaryOp::Cross => "cross",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    Scalar,
    Vector3,
    Vector4,
    Quaternion,
    Color,
    Matrix4,
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperandKind::Scalar => "Scalar",
            OperandKind::Vector3 => "Vector3",
            OperandKind::Vector4 => "Vector4",
            OperandKind::Quaternion => "Quaternion",
            OperandKind::Color => "Color",
            OperandKind::Matrix4 => "Matrix4",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Scalar(f32),
    Vector3(Vector3),
    Vector4(Vector4),
    Quaternion(Quaternion),
    Color(Color),
    Matrix4(Matrix4),
}

impl Operand {
    pub fn kind(&self) -> OperandKind {
        match self {
            Operand::Scalar(_) => OperandKind::Scalar,
            Operand::Vector3(_) => OperandKind::Vector3,
            Operand::Vector4(_) => OperandKind::Vector4,
            Operand::Quaternion(_) => OperandKind::Quaternion,
            Operand::Color(_) => OperandKind::Color,
            Operand::Matrix4(_) => OperandKind::Matrix4,
        }
    }

    /// Applies `op` to `self` and `rhs`.
    ///
    /// Vector4 times Matrix4 is a row-vector transform, Matrix4 times Vector4 a
    /// column-vector transform.
    pub fn apply(self, op: BinaryOp, rhs: Operand) -> Result<Operand> {
        use Operand as O;

        let value = match (op, self, rhs) {
            (BinaryOp::Add, O::Scalar(a), O::Scalar(b)) => O::Scalar(a + b),
            (BinaryOp::Add, O::Vector3(a), O::Vector3(b)) => O::Vector3(a + b),
            (BinaryOp::Add, O::Vector4(a), O::Vector4(b)) => O::Vector4(a + b),
            (BinaryOp::Add, O::Quaternion(a), O::Quaternion(b)) => O::Quaternion(a + b),
            (BinaryOp::Add, O::Color(a), O::Color(b)) => O::Color(a + b),

            (BinaryOp::Sub, O::Scalar(a), O::Scalar(b)) => O::Scalar(a - b),
            (BinaryOp::Sub, O::Vector3(a), O::Vector3(b)) => O::Vector3(a - b),
            (BinaryOp::Sub, O::Vector4(a), O::Vector4(b)) => O::Vector4(a - b),
            (BinaryOp::Sub, O::Quaternion(a), O::Quaternion(b)) => O::Quaternion(a - b),
            (BinaryOp::Sub, O::Color(a), O::Color(b)) => O::Color(a - b),

            (BinaryOp::Mul, O::Scalar(a), O::Scalar(b)) => O::Scalar(a * b),
            (BinaryOp::Mul, O::Vector3(v), O::Scalar(s))
            | (BinaryOp::Mul, O::Scalar(s), O::Vector3(v)) => O::Vector3(v * s),
            (BinaryOp::Mul, O::Vector4(v), O::Scalar(s))
            | (BinaryOp::Mul, O::Scalar(s), O::Vector4(v)) => O::Vector4(v * s),
            (BinaryOp::Mul, O::Quaternion(q), O::Scalar(s)) => O::Quaternion(q * s),
            (BinaryOp::Mul, O::Quaternion(a), O::Quaternion(b)) => O::Quaternion(a * b),
            (BinaryOp::Mul, O::Color(c), O::Scalar(s)) => O::Color(c * s),
            (BinaryOp::Mul, O::Color(a), O::Color(b)) => O::Color(a * b),
            (BinaryOp::Mul, O::Matrix4(a), O::Matrix4(b)) => O::Matrix4(a * b),
            (BinaryOp::Mul, O::Matrix4(m), O::Vector4(v)) => O::Vector4(m * v),
            (BinaryOp::Mul, O::Vector4(v), O::Matrix4(m)) => O::Vector4(v * m),

            (BinaryOp::Div, O::Scalar(a), O::Scalar(b)) => O::Scalar(a / b),
            (BinaryOp::Div, O::Vector3(v), O::Scalar(s)) => O::Vector3(v / s),
            (BinaryOp::Div, O::Vector4(v), O::Scalar(s)) => O::Vector4(v / s),
            (BinaryOp::Div, O::Quaternion(q), O::Scalar(s)) => O::Quaternion(q / s),
            (BinaryOp::Div, O::Color(c), O::Scalar(s)) => O::Color(c / s),

            (BinaryOp::Dot, O::Vector3(a), O::Vector3(b)) => O::Scalar(a.dot(&b)),
            (BinaryOp::Dot, O::Vector4(a), O::Vector4(b)) => O::Scalar(a.dot(&b)),
            (BinaryOp::Dot, O::Quaternion(a), O::Quaternion(b)) => O::Scalar(a.dot(&b)),
            (BinaryOp::Dot, O::Color(a), O::Color(b)) => O::Scalar(a.dot(&b)),

            (BinaryOp::Cross, O::Vector3(a), O::Vector3(b)) => O::Vector3(a.cross(&b)),

            (op, lhs, rhs) => {
                return Err(MathError::InvalidOperation {
                    op,
                    lhs: lhs.kind(),
                    rhs: rhs.kind(),
                })
            }
        };
        Ok(value)
    }
}

impl From<f32> for Operand {
    fn from(v: f32) -> Self {
        Operand::Scalar(v)
    }
}

impl From<Vector3> for Operand {
    fn from(v: Vector3) -> Self {
        Operand::Vector3(v)
    }
}

impl From<Vector4> for Operand {
    fn from(v: Vector4) -> Self {
        Operand::Vector4(v)
    }
}

impl From<Quaternion> for Operand {
    fn from(q: Quaternion) -> Self {
        Operand::Quaternion(q)
    }
}

impl From<Color> for Operand {
    fn from(c: Color) -> Self {
        Operand::Color(c)
    }
}

impl From<Matrix4> for Operand {
    fn from(m: Matrix4) -> Self {
        Operand::Matrix4(m)
    }
}
