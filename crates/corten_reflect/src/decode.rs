//! The decoder: statement trees back into typed block values.
//!
//! Decoding a block body is a two-step overlay. The target is first set to
//! its full default (the zero value, then the type's Self-Default hook if it
//! carries one), and the statements are then applied on top in order. Fields
//! no statement names therefore keep their default, and a block statement's
//! mere presence forces the nested type's own defaulting before its body is
//! applied, even when the body is empty.
//!
//! All entry points are transactional: on error the caller's value is left
//! untouched.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use core::{error, fmt};

use corten_syntax::ast::{Span, Stmt};

use crate::block::{Block, FieldMut};
use crate::info::{FieldKind, Schema};
use crate::scalar::LiteralError;

// -----------------------------------------------------------------------------
// DecodeError

/// Failure to decode a statement tree into a block value.
///
/// Spans are carried from the offending statement and included in the
/// rendered message when the statement came from parsed text.
#[derive(Clone, Debug, PartialEq)]
pub enum DecodeError {
    /// The statement names no field of the target type.
    UnknownField { name: String, span: Span },
    /// The statement form does not match the field, e.g. `tls = true` for a
    /// block field. `expected` is the form the schema declares.
    KindMismatch {
        name: String,
        expected: FieldKind,
        span: Span,
    },
    /// The attribute's literal cannot be assigned to the field.
    TypeMismatch {
        name: String,
        source: LiteralError,
        span: Span,
    },
}

impl DecodeError {
    fn span(&self) -> Span {
        match self {
            Self::UnknownField { span, .. }
            | Self::KindMismatch { span, .. }
            | Self::TypeMismatch { span, .. } => *span,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let span = self.span();
        if !span.is_none() {
            write!(f, "{span}: ")?;
        }
        match self {
            Self::UnknownField { name, .. } => write!(f, "unknown field `{name}`"),
            Self::KindMismatch { name, expected, .. } => {
                write!(f, "`{name}` is a {} field", expected.describe())
            }
            Self::TypeMismatch { name, source, .. } => {
                write!(f, "invalid value for `{name}`: {source}")
            }
        }
    }
}

impl error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::TypeMismatch { source, .. } => Some(source),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// Entry points

/// Decodes a block body into a new value of type `T`.
///
/// # Examples
///
/// ```
/// use corten_reflect::{decode, derive::Block};
/// use corten_syntax::parse;
///
/// #[derive(Block, Debug, Default, PartialEq)]
/// struct Limits {
///     #[corten(attr)]
///     burst: u32,
///     #[corten(attr, optional)]
///     sustained: u32,
/// }
///
/// let stmts = parse("burst = 5").unwrap();
/// let limits: Limits = decode(&stmts).unwrap();
/// assert_eq!(limits, Limits { burst: 5, sustained: 0 });
/// ```
pub fn decode<T: Block + Default>(stmts: &[Stmt]) -> Result<T, DecodeError> {
    let mut value = T::default();
    decode_in_place(&mut value, stmts)?;
    Ok(value)
}

/// Decodes a block body into an existing value.
///
/// The decode happens against a scratch instance; `target` is only
/// overwritten when the whole body decodes successfully, and its prior
/// contents never leak into the result.
pub fn decode_into<T: Block + Default>(target: &mut T, stmts: &[Stmt]) -> Result<(), DecodeError> {
    let mut scratch = T::default();
    decode_in_place(&mut scratch, stmts)?;
    *target = scratch;
    Ok(())
}

/// Decodes a block body against a schema chosen at runtime, for example one
/// looked up in a [`TypeRegistry`](crate::TypeRegistry).
pub fn decode_any(schema: &'static Schema, stmts: &[Stmt]) -> Result<Box<dyn Block>, DecodeError> {
    let mut value = schema.make_zero();
    decode_in_place(value.as_mut(), stmts)?;
    Ok(value)
}

// -----------------------------------------------------------------------------
// Core

/// Resets `target` to its full default and overlays the statements in order.
///
/// Later statements for the same field overwrite earlier ones; a repeated
/// block statement re-runs the nested reset, so only the last body survives.
fn decode_in_place(target: &mut dyn Block, stmts: &[Stmt]) -> Result<(), DecodeError> {
    target.reset_zero();
    let schema = target.schema();
    if let Some(hook) = schema.defaulter() {
        hook(target);
    }
    for stmt in stmts {
        let Some(index) = schema.index_of(stmt.name()) else {
            return Err(DecodeError::UnknownField {
                name: stmt.name().to_string(),
                span: stmt.span(),
            });
        };
        let kind_mismatch = || DecodeError::KindMismatch {
            name: stmt.name().to_string(),
            expected: schema.fields()[index].kind(),
            span: stmt.span(),
        };
        match stmt {
            Stmt::Attribute(attr) => {
                let Some(FieldMut::Attr(scalar)) = target.field_mut(index) else {
                    return Err(kind_mismatch());
                };
                scalar
                    .assign_literal(&attr.value)
                    .map_err(|source| DecodeError::TypeMismatch {
                        name: attr.name.to_string(),
                        source,
                        span: attr.span,
                    })?;
            }
            Stmt::Block(block) => match target.field_mut(index) {
                Some(FieldMut::Block(nested)) => decode_in_place(nested, &block.body)?,
                Some(FieldMut::OptionalBlock(slot)) => {
                    decode_in_place(slot.get_or_insert_zero(), &block.body)?;
                }
                _ => return Err(kind_mismatch()),
            },
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::{DecodeError, decode, decode_any, decode_into};
    use crate::Schematic;
    use crate::fixtures::{
        AttrWithDefault, DEFAULT_NUMBER, MismatchingDefault, NoDefaultDefined,
        OTHER_DEFAULT_NUMBER, PtrPropagatingDefault, ServerConfig, StructPropagatingDefault,
        TlsConfig,
    };
    use crate::info::FieldKind;
    use crate::scalar::LiteralError;
    use corten_syntax::ast::Span;
    use corten_syntax::parse;

    fn stmts(text: &str) -> alloc::vec::Vec<corten_syntax::ast::Stmt> {
        parse(text).expect("test input failed to parse")
    }

    #[test]
    fn untouched_fields_keep_their_default() {
        let value: StructPropagatingDefault = decode(&stmts("")).unwrap();
        assert_eq!(value.inner.number, DEFAULT_NUMBER);

        let value: PtrPropagatingDefault = decode(&stmts("")).unwrap();
        assert_eq!(
            value.inner,
            Some(AttrWithDefault {
                number: DEFAULT_NUMBER
            })
        );

        let value: NoDefaultDefined = decode(&stmts("")).unwrap();
        assert_eq!(value.inner, None);
    }

    #[test]
    fn statements_overlay_the_default() {
        let value: StructPropagatingDefault = decode(&stmts("inner {\n  number = 9\n}")).unwrap();
        assert_eq!(value.inner.number, 9);
    }

    #[test]
    fn empty_block_forces_nested_default() {
        // The owner's default for `inner` is 321, but naming the block makes
        // the nested type default itself: an empty body yields 123.
        let value: MismatchingDefault = decode(&stmts("inner { }")).unwrap();
        assert_eq!(
            value.inner,
            Some(AttrWithDefault {
                number: DEFAULT_NUMBER
            })
        );

        let value: MismatchingDefault = decode(&stmts("")).unwrap();
        assert_eq!(
            value.inner,
            Some(AttrWithDefault {
                number: OTHER_DEFAULT_NUMBER
            })
        );
    }

    #[test]
    fn block_statement_allocates_absent_pointers() {
        let value: NoDefaultDefined = decode(&stmts("inner {\n  number = 4\n}")).unwrap();
        assert_eq!(value.inner, Some(AttrWithDefault { number: 4 }));
    }

    #[test]
    fn unknown_field() {
        let err = decode::<AttrWithDefault>(&stmts("number = 1\nbogus = 2")).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnknownField {
                name: "bogus".into(),
                span: Span::new(2, 1),
            }
        );
        assert_eq!(err.to_string(), "2:1: unknown field `bogus`");
    }

    #[test]
    fn kind_mismatch_both_directions() {
        let err = decode::<ServerConfig>(&stmts("tls = true")).unwrap_err();
        assert_eq!(
            err,
            DecodeError::KindMismatch {
                name: "tls".into(),
                expected: FieldKind::Block,
                span: Span::new(1, 1),
            }
        );
        assert_eq!(err.to_string(), "1:1: `tls` is a block field");

        let err = decode::<ServerConfig>(&stmts("addr { }")).unwrap_err();
        assert_eq!(
            err,
            DecodeError::KindMismatch {
                name: "addr".into(),
                expected: FieldKind::Attr,
                span: Span::new(1, 1),
            }
        );
    }

    #[test]
    fn type_mismatch_carries_the_literal_error() {
        let err = decode::<AttrWithDefault>(&stmts("number = \"many\"")).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TypeMismatch {
                name: "number".into(),
                source: LiteralError::Mismatch {
                    expected: "number",
                    found: "string",
                },
                span: Span::new(1, 1),
            }
        );
        assert_eq!(
            err.to_string(),
            "1:1: invalid value for `number`: expected number literal, found string"
        );
    }

    #[test]
    fn decode_into_leaves_target_untouched_on_error() {
        let mut value = AttrWithDefault { number: 55 };
        decode_into(&mut value, &stmts("bogus = 1")).unwrap_err();
        assert_eq!(value.number, 55);
    }

    #[test]
    fn decode_into_replaces_rather_than_merges() {
        let mut value = ServerConfig {
            addr: "stale".into(),
            limit: 99,
            tls: TlsConfig { enabled: true },
            backup: Some(TlsConfig { enabled: true }),
        };
        decode_into(&mut value, &stmts("addr = \"fresh\"")).unwrap();
        assert_eq!(value.addr, "fresh");
        // Everything not named reverts to the default, not the prior value.
        assert_eq!(value.limit, 0);
        assert!(!value.tls.enabled);
        assert_eq!(value.backup, None);
    }

    #[test]
    fn duplicate_statements_last_wins() {
        let value: AttrWithDefault = decode(&stmts("number = 1\nnumber = 2")).unwrap();
        assert_eq!(value.number, 2);

        // A repeated block re-runs the nested defaulting, so the first
        // body's assignment does not survive into the second.
        let value: MismatchingDefault =
            decode(&stmts("inner {\n  number = 7\n}\ninner { }")).unwrap();
        assert_eq!(
            value.inner,
            Some(AttrWithDefault {
                number: DEFAULT_NUMBER
            })
        );
    }

    #[test]
    fn decode_any_by_schema() {
        let value = decode_any(AttrWithDefault::schema(), &stmts("number = 8")).unwrap();
        let value = value.downcast_ref::<AttrWithDefault>().unwrap();
        assert_eq!(value.number, 8);
    }
}
