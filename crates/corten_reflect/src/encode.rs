//! The encoder: a minimal statement tree for a block value.
//!
//! Encoding walks a value against its schema and a freshly resolved default
//! baseline, emitting only the statements decoding needs to reconstruct the
//! value. Three rules interact:
//!
//! - an optional attribute is elided when it equals the owning type's default
//!   for that field;
//! - an absent optional pointer block is elided unconditionally (absence is a
//!   "defer to the decoder's default" signal, checked before any value
//!   comparison);
//! - a present optional block is elided when the owning baseline holds a
//!   present value that deep-equals it. An absent baseline never matches a
//!   present value, since decoding the elision would reproduce the absence.
//!
//! Inside an emitted block, elision is judged against the *nested* type's own
//! default, resolved freshly at that level; the owner's baseline for the
//! field plays no part there.

use alloc::vec::Vec;
use core::{error, fmt};

use corten_syntax::ast::{AttributeStmt, BlockStmt, Stmt};

use crate::block::{Block, FieldRef, block_eq};
use crate::defaults::default_of;

// -----------------------------------------------------------------------------
// EncodeError

/// Failure to encode a block value.
///
/// Errors abort the whole encode; no partial output is surfaced.
#[derive(Clone, Debug, PartialEq)]
pub enum EncodeError {
    /// A required `Option`-typed block field was `None`.
    MissingRequiredBlock { block: &'static str },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequiredBlock { block } => {
                write!(f, "required block `{block}` is unset")
            }
        }
    }
}

impl error::Error for EncodeError {}

// -----------------------------------------------------------------------------
// encode_block

/// Encodes a block value into the minimal statement tree whose decoding
/// reproduces the value.
///
/// Statements are emitted in schema declaration order, one per non-elided
/// field, so the output never contains duplicate names. Required fields are
/// always emitted. The result is a pure function of the value: repeated calls
/// yield identical statement sequences.
///
/// # Examples
///
/// ```
/// use corten_reflect::{derive::Block, encode_block};
/// use corten_syntax::print;
///
/// #[derive(Block, Default)]
/// struct Limits {
///     #[corten(attr)]
///     burst: u32,
///     #[corten(attr, optional)]
///     sustained: u32,
/// }
///
/// // `sustained` equals its default and is elided; `burst` is required.
/// let stmts = encode_block(&Limits { burst: 5, sustained: 0 }).unwrap();
/// assert_eq!(print(&stmts), "burst = 5\n");
/// ```
pub fn encode_block(value: &dyn Block) -> Result<Vec<Stmt>, EncodeError> {
    let schema = value.schema();
    let baseline = default_of(schema);
    let mut stmts = Vec::new();
    for (index, info) in schema.fields().iter().enumerate() {
        match (value.field(index), baseline.field(index)) {
            (Some(FieldRef::Attr(actual)), Some(FieldRef::Attr(base))) => {
                if !info.is_required() && actual.scalar_eq(base) {
                    continue;
                }
                stmts.push(Stmt::Attribute(AttributeStmt::new(
                    info.name(),
                    actual.to_literal(),
                )));
            }
            (Some(FieldRef::Block(actual)), Some(FieldRef::Block(base))) => {
                if !info.is_required() && block_eq(actual, base) {
                    continue;
                }
                stmts.push(Stmt::Block(BlockStmt::new(
                    info.name(),
                    encode_block(actual)?,
                )));
            }
            (Some(FieldRef::OptionalBlock(actual)), Some(FieldRef::OptionalBlock(base))) => {
                let Some(actual) = actual.get() else {
                    if info.is_required() {
                        return Err(EncodeError::MissingRequiredBlock { block: info.name() });
                    }
                    // Absence defers to whatever default decoding assigns.
                    continue;
                };
                if !info.is_required() && base.get().is_some_and(|base| block_eq(actual, base)) {
                    continue;
                }
                stmts.push(Stmt::Block(BlockStmt::new(
                    info.name(),
                    encode_block(actual)?,
                )));
            }
            _ => unreachable!("derived field table out of sync with schema"),
        }
    }
    Ok(stmts)
}

// -----------------------------------------------------------------------------
// Tests
