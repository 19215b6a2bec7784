//! Runtime lookup of schemas by block name or type.

use alloc::collections::BTreeMap;
use core::any::TypeId;
use core::{error, fmt};

use crate::block::Schematic;
use crate::info::Schema;

// -----------------------------------------------------------------------------
// SchemaError

/// Failure to register a schema.
#[derive(Clone, Debug, PartialEq)]
pub enum SchemaError {
    /// Two distinct types registered under the same block name.
    DuplicateBlockName { name: &'static str },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateBlockName { name } => {
                write!(f, "a different type is already registered as `{name}`")
            }
        }
    }
}

impl error::Error for SchemaError {}

// -----------------------------------------------------------------------------
// TypeRegistry

/// A registry of block schemas, queryable by type name or [`TypeId`].
///
/// Registration is explicit; nothing is registered ahead of time. With the
/// `auto_register` feature, types deriving `Block` with
/// `#[corten(auto_register)]` can be collected in one call to
/// [`auto_register`](TypeRegistry::auto_register).
///
/// # Examples
///
/// ```
/// use corten_reflect::{TypeRegistry, decode_any, derive::Block};
/// use corten_syntax::parse;
///
/// #[derive(Block, Default)]
/// struct Endpoint {
///     #[corten(attr)]
///     url: String,
/// }
///
/// let mut registry = TypeRegistry::new();
/// registry.register::<Endpoint>().unwrap();
///
/// let schema = registry.get("Endpoint").unwrap();
/// let stmts = parse("url = \"http://localhost\"").unwrap();
/// let value = decode_any(schema, &stmts).unwrap();
/// assert_eq!(value.downcast_ref::<Endpoint>().unwrap().url, "http://localhost");
/// ```
#[derive(Debug, Default)]
pub struct TypeRegistry {
    by_name: BTreeMap<&'static str, &'static Schema>,
    by_id: BTreeMap<TypeId, &'static Schema>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub const fn new() -> Self {
        Self {
            by_name: BTreeMap::new(),
            by_id: BTreeMap::new(),
        }
    }

    /// Registers the schema of `T`.
    ///
    /// Registering the same type again is a no-op; a different type under an
    /// already-taken name is rejected.
    pub fn register<T: Schematic>(&mut self) -> Result<(), SchemaError> {
        self.register_schema(T::schema())
    }

    /// Registers a schema obtained elsewhere, e.g. from a nested field.
    pub fn register_schema(&mut self, schema: &'static Schema) -> Result<(), SchemaError> {
        if let Some(existing) = self.by_name.get(schema.type_name()) {
            if existing.ty_id() == schema.ty_id() {
                return Ok(());
            }
            return Err(SchemaError::DuplicateBlockName {
                name: schema.type_name(),
            });
        }
        self.by_name.insert(schema.type_name(), schema);
        self.by_id.insert(schema.ty_id(), schema);
        Ok(())
    }

    /// Looks a schema up by block name.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&'static Schema> {
        self.by_name.get(name).copied()
    }

    /// Looks a schema up by the described type's [`TypeId`].
    #[inline]
    pub fn get_by_id(&self, ty_id: TypeId) -> Option<&'static Schema> {
        self.by_id.get(&ty_id).copied()
    }

    /// Returns the number of registered schemas.
    #[inline]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns `true` if nothing is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Registers every schema submitted through
    /// `#[corten(auto_register)]` across all linked crates and returns how
    /// many registrations ran.
    ///
    /// Name clashes are skipped rather than surfaced; link-time collection
    /// has no useful ordering to report them in.
    #[cfg(feature = "auto_register")]
    pub fn auto_register(&mut self) -> usize {
        let mut count = 0;
        for registration in inventory::iter::<BlockRegistration> {
            if self.register_schema((registration.schema)()).is_ok() {
                count += 1;
            }
        }
        count
    }
}

/// A link-time schema submission, created by the derive macro when a type
/// opts into `#[corten(auto_register)]`.
#[cfg(feature = "auto_register")]
pub struct BlockRegistration {
    schema: fn() -> &'static Schema,
}

#[cfg(feature = "auto_register")]
impl BlockRegistration {
    pub const fn new(schema: fn() -> &'static Schema) -> Self {
        Self { schema }
    }
}

#[cfg(feature = "auto_register")]
inventory::collect!(BlockRegistration);

// -----------------------------------------------------------------------------
// Tests
