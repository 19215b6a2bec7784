//! The literal-codec boundary: scalar values crossing to and from
//! [`Literal`]s.
//!
//! Every attribute value passes through [`Scalar`] in both directions. The
//! supported scalar set is implemented here for the primitives the literal
//! syntax can express: `bool`, the integer widths, `f32`/`f64` and `String`.

use alloc::string::String;
use core::any::Any;
use core::{error, fmt};

use corten_syntax::ast::Literal;

// -----------------------------------------------------------------------------
// LiteralError

/// Failure to assign a literal to a scalar field.
#[derive(Clone, Debug, PartialEq)]
pub enum LiteralError {
    /// The literal is of a different kind than the field, e.g. a string
    /// assigned to a number.
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// A numeric literal that does not fit the field's type.
    OutOfRange { target: &'static str },
}

impl fmt::Display for LiteralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mismatch { expected, found } => {
                write!(f, "expected {expected} literal, found {found}")
            }
            Self::OutOfRange { target } => {
                write!(f, "number does not fit in `{target}`")
            }
        }
    }
}

impl error::Error for LiteralError {}

// -----------------------------------------------------------------------------
// Scalar

/// An attribute value convertible to and from a [`Literal`].
pub trait Scalar: Any + Send + Sync {
    /// Encodes the value as a literal.
    ///
    /// Float values must be finite: infinities and NaN render as text the
    /// parser rejects, and no literal decodes to them, so they are outside
    /// the format's value domain.
    fn to_literal(&self) -> Literal;

    /// Overwrites the value from a literal.
    fn assign_literal(&mut self, literal: &Literal) -> Result<(), LiteralError>;

    /// Compares against another scalar of the same type.
    ///
    /// Scalars of different types are never equal.
    fn scalar_eq(&self, other: &dyn Scalar) -> bool;

    /// Casts to [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;
}

// -----------------------------------------------------------------------------
// Primitive impls

macro_rules! impl_scalar_int {
    ($($ty:ty),* $(,)?) => {$(
        impl Scalar for $ty {
            fn to_literal(&self) -> Literal {
                match i64::try_from(*self) {
                    Ok(value) => Literal::Int(value),
                    // Only reachable for unsigned values above `i64::MAX`.
                    Err(_) => Literal::Uint(*self as u64),
                }
            }

            fn assign_literal(&mut self, literal: &Literal) -> Result<(), LiteralError> {
                const OUT_OF_RANGE: LiteralError = LiteralError::OutOfRange {
                    target: stringify!($ty),
                };
                *self = match literal {
                    Literal::Int(value) => <$ty>::try_from(*value).map_err(|_| OUT_OF_RANGE)?,
                    Literal::Uint(value) => <$ty>::try_from(*value).map_err(|_| OUT_OF_RANGE)?,
                    other => {
                        return Err(LiteralError::Mismatch {
                            expected: "number",
                            found: other.kind(),
                        });
                    }
                };
                Ok(())
            }

            fn scalar_eq(&self, other: &dyn Scalar) -> bool {
                other
                    .as_any()
                    .downcast_ref::<$ty>()
                    .is_some_and(|other| other == self)
            }

            #[inline]
            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    )*};
}

impl_scalar_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_scalar_float {
    ($($ty:ty),* $(,)?) => {$(
        impl Scalar for $ty {
            fn to_literal(&self) -> Literal {
                Literal::Float(f64::from(*self))
            }

            fn assign_literal(&mut self, literal: &Literal) -> Result<(), LiteralError> {
                *self = match literal {
                    Literal::Float(value) => *value as $ty,
                    Literal::Int(value) => *value as $ty,
                    Literal::Uint(value) => *value as $ty,
                    other => {
                        return Err(LiteralError::Mismatch {
                            expected: "number",
                            found: other.kind(),
                        });
                    }
                };
                Ok(())
            }

            fn scalar_eq(&self, other: &dyn Scalar) -> bool {
                other
                    .as_any()
                    .downcast_ref::<$ty>()
                    .is_some_and(|other| other == self)
            }

            #[inline]
            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    )*};
}

impl_scalar_float!(f32, f64);

impl Scalar for bool {
    fn to_literal(&self) -> Literal {
        Literal::Bool(*self)
    }

    fn assign_literal(&mut self, literal: &Literal) -> Result<(), LiteralError> {
        match literal {
            Literal::Bool(value) => {
                *self = *value;
                Ok(())
            }
            other => Err(LiteralError::Mismatch {
                expected: "bool",
                found: other.kind(),
            }),
        }
    }

    fn scalar_eq(&self, other: &dyn Scalar) -> bool {
        other
            .as_any()
            .downcast_ref::<bool>()
            .is_some_and(|other| other == self)
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Scalar for String {
    fn to_literal(&self) -> Literal {
        Literal::Str(self.clone())
    }

    fn assign_literal(&mut self, literal: &Literal) -> Result<(), LiteralError> {
        match literal {
            Literal::Str(value) => {
                self.clone_from(value);
                Ok(())
            }
            other => Err(LiteralError::Mismatch {
                expected: "string",
                found: other.kind(),
            }),
        }
    }

    fn scalar_eq(&self, other: &dyn Scalar) -> bool {
        other
            .as_any()
            .downcast_ref::<String>()
            .is_some_and(|other| other == self)
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }
}

// -----------------------------------------------------------------------------
// Tests
