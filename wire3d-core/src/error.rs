/// Error types for the algebra and camera math
use thiserror::Error;

use crate::ops::{BinaryOp, OperandKind};

/// Errors raised by the core math
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    /// An operator was applied to a pair of operand kinds it is not defined for
    #[error("invalid {op} between {lhs} and {rhs}")]
    InvalidOperation {
        op: BinaryOp,
        lhs: OperandKind,
        rhs: OperandKind,
    },

    /// A matrix with a zero determinant had to be inverted
    #[error("matrix is singular and cannot be inverted")]
    SingularMatrix,
}

/// Result type for core math operations
pub type Result<T> = std::result::Result<T, MathError>;
