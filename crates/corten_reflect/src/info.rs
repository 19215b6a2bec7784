//! Static schema descriptions of block types.
//!
//! A [`Schema`] is the ordered field table derived for one block type, plus
//! the two hooks the encoder and decoder need at runtime: a zero constructor
//! and the optional [`Defaulter`](crate::Defaulter) capability resolved at
//! derive time. Schemas are built in `const` context by the derive macro and
//! promoted to `'static`, so they are derived once per type and are immutable
//! and freely shareable afterwards.

use alloc::boxed::Box;
use core::any::TypeId;

use crate::block::{Block, Schematic};

// -----------------------------------------------------------------------------
// FieldKind / Cardinality

/// Whether a field is written as `name = literal` or `name { ... }`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Attr,
    Block,
}

impl FieldKind {
    /// A noun for diagnostics.
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::Attr => "attribute",
            Self::Block => "block",
        }
    }
}

/// The storage shape of a field, derived from its declared type.
///
/// `Option`-typed block fields have [`Cardinality::Pointer`]: they carry a
/// distinct "absent" state that defers to whatever default decoding assigns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cardinality {
    /// A scalar attribute value.
    Scalar,
    /// A nested block stored inline; always present.
    Inline,
    /// A nested block behind an `Option`; may be absent.
    Pointer,
}

// -----------------------------------------------------------------------------
// FieldInfo

/// Information for one named field of a block type.
///
/// Declaration order within the owning [`Schema`] is preserved and is the
/// emission order of the encoder.
#[derive(Clone, Debug)]
pub struct FieldInfo {
    name: &'static str,
    kind: FieldKind,
    cardinality: Cardinality,
    required: bool,
    // The nested `Schema` is created on first access; using a function
    // pointer delays it and keeps recursive types constructible.
    nested: Option<fn() -> &'static Schema>,
}

impl FieldInfo {
    /// Creates a descriptor for a scalar attribute field.
    #[inline]
    pub const fn attr(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Attr,
            cardinality: Cardinality::Scalar,
            required: true,
            nested: None,
        }
    }

    /// Creates a descriptor for an inline nested block of type `T`.
    #[inline]
    pub const fn block<T: Schematic>(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Block,
            cardinality: Cardinality::Inline,
            required: true,
            nested: Some(T::schema),
        }
    }

    /// Creates a descriptor for an `Option`-typed nested block of type `T`.
    #[inline]
    pub const fn ptr_block<T: Schematic>(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Block,
            cardinality: Cardinality::Pointer,
            required: true,
            nested: Some(T::schema),
        }
    }

    /// Marks the field optional: it is elided from output when its value is
    /// indistinguishable from what decoding would reconstruct.
    #[inline]
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Returns the statement name of the field.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the field kind.
    #[inline]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Returns the field cardinality.
    #[inline]
    pub const fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// Returns `true` unless the field was marked optional.
    #[inline]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the schema of the nested block type, for block fields.
    #[inline]
    pub fn nested_schema(&self) -> Option<&'static Schema> {
        self.nested.map(|nested| nested())
    }
}

// -----------------------------------------------------------------------------
// Schema

/// The ordered field table for one block type.
///
/// # Examples
///
/// ```
/// use corten_reflect::{FieldKind, Schematic, derive::Block};
///
/// #[derive(Block, Default)]
/// struct Server {
///     #[corten(attr)]
///     addr: String,
///     #[corten(attr, optional)]
///     limit: u32,
/// }
///
/// let schema = Server::schema();
/// assert_eq!(schema.type_name(), "Server");
/// assert_eq!(schema.index_of("limit"), Some(1));
///
/// let field = schema.field_at(0).unwrap();
/// assert_eq!(field.kind(), FieldKind::Attr);
/// assert!(field.is_required());
/// ```
#[derive(Debug)]
pub struct Schema {
    type_name: &'static str,
    ty_id: TypeId,
    fields: &'static [FieldInfo],
    new_zero: fn() -> Box<dyn Block>,
    set_default: Option<fn(&mut dyn Block)>,
}

impl Schema {
    /// Creates the schema for `T` over the given field table.
    ///
    /// Field names must be unique; the derive macro rejects duplicates at
    /// compile time.
    pub const fn new<T: Block + Default>(
        type_name: &'static str,
        fields: &'static [FieldInfo],
    ) -> Self {
        Self {
            type_name,
            ty_id: TypeId::of::<T>(),
            fields,
            new_zero: new_zero_boxed::<T>,
            set_default: None,
        }
    }

    /// Attaches the Self-Default hook resolved for this type.
    pub const fn with_defaulter(mut self, hook: fn(&mut dyn Block)) -> Self {
        self.set_default = Some(hook);
        self
    }

    /// Returns the Rust type name the schema was derived for.
    #[inline]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the `TypeId` of the described type.
    #[inline]
    pub const fn ty_id(&self) -> TypeId {
        self.ty_id
    }

    /// Returns the fields in declaration order.
    #[inline]
    pub const fn fields(&self) -> &'static [FieldInfo] {
        self.fields
    }

    /// Returns the [`FieldInfo`] at the given index, if present.
    #[inline]
    pub fn field_at(&self, index: usize) -> Option<&'static FieldInfo> {
        self.fields.get(index)
    }

    /// Returns the index for the given field `name`, if present.
    ///
    /// This is O(N) complexity; field tables are short.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    /// Returns the number of fields.
    #[inline]
    pub const fn field_len(&self) -> usize {
        self.fields.len()
    }

    /// Builds a zero instance of the described type.
    #[inline]
    pub fn make_zero(&self) -> Box<dyn Block> {
        (self.new_zero)()
    }

    /// Returns the Self-Default hook, if the type opted into one.
    #[inline]
    pub const fn defaulter(&self) -> Option<fn(&mut dyn Block)> {
        self.set_default
    }

    /// Returns `true` if the type carries a Self-Default hook.
    #[inline]
    pub const fn has_defaulter(&self) -> bool {
        self.set_default.is_some()
    }
}

fn new_zero_boxed<T: Block + Default>() -> Box<dyn Block> {
    Box::new(T::default())
}

// -----------------------------------------------------------------------------
// Tests
