//! The object-safe value surface walked by the encoder and decoder.

use alloc::boxed::Box;
use core::any::Any;

use crate::info::Schema;
use crate::scalar::Scalar;

// -----------------------------------------------------------------------------
// Schematic

/// A type with a derived, `'static` [`Schema`].
///
/// Implemented by [`#[derive(Block)]`](crate::derive::Block); the schema is
/// derived once at compile time and cached by construction.
pub trait Schematic {
    /// Returns the schema describing this type's fields.
    fn schema() -> &'static Schema;
}

impl<T: Schematic> Schematic for Box<T> {
    #[inline]
    fn schema() -> &'static Schema {
        T::schema()
    }
}

// -----------------------------------------------------------------------------
// Block

/// A value decodable from (and encodable to) a block body.
///
/// This is the dynamic counterpart of [`Schematic`]: it gives the encoder and
/// decoder indexed access to a value's fields without compile-time knowledge
/// of the concrete type. Implementations come from
/// [`#[derive(Block)]`](crate::derive::Block); the field indices handed to
/// [`field`](Block::field) and [`field_mut`](Block::field_mut) are positions
/// in the type's [`Schema`].
pub trait Block: Any + Send + Sync {
    /// Returns the schema of the concrete type.
    fn schema(&self) -> &'static Schema;

    /// Returns a shared view of the field at `index`, if in range.
    fn field(&self, index: usize) -> Option<FieldRef<'_>>;

    /// Returns a mutable view of the field at `index`, if in range.
    fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>>;

    /// Overwrites `self` with the type's zero value.
    fn reset_zero(&mut self);

    /// Casts to [`Any`] for downcasting.
    ///
    /// For containers such as `Box<T>` this forwards to the inner value, so
    /// the result always identifies the block type itself.
    fn as_any(&self) -> &dyn Any;

    /// Mutable counterpart of [`as_any`](Block::as_any).
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn Block {
    /// Returns `true` if the underlying value is a `T`.
    #[inline]
    pub fn is<T: Block>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcasts to a shared reference to `T`.
    #[inline]
    pub fn downcast_ref<T: Block>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcasts to a mutable reference to `T`.
    #[inline]
    pub fn downcast_mut<T: Block>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

impl<T: Block> Block for Box<T> {
    #[inline]
    fn schema(&self) -> &'static Schema {
        (**self).schema()
    }

    #[inline]
    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        (**self).field(index)
    }

    #[inline]
    fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>> {
        (**self).field_mut(index)
    }

    #[inline]
    fn reset_zero(&mut self) {
        (**self).reset_zero();
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        (**self).as_any()
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        (**self).as_any_mut()
    }
}

// -----------------------------------------------------------------------------
// Field views

/// A shared view of one field of a [`Block`].
pub enum FieldRef<'a> {
    /// A scalar attribute.
    Attr(&'a dyn Scalar),
    /// An inline nested block; always present.
    Block(&'a dyn Block),
    /// An `Option`-typed nested block; may be absent.
    OptionalBlock(&'a dyn OptionalBlock),
}

/// A mutable view of one field of a [`Block`].
pub enum FieldMut<'a> {
    Attr(&'a mut dyn Scalar),
    Block(&'a mut dyn Block),
    OptionalBlock(&'a mut dyn OptionalBlock),
}

/// An `Option`-typed block field.
///
/// Absence is a standalone state meaning "defer to whatever default decoding
/// assigns here"; it is deliberately not folded into value comparison.
pub trait OptionalBlock: Send + Sync {
    /// Returns the contained block, if present.
    fn get(&self) -> Option<&dyn Block>;

    /// Mutable counterpart of [`get`](OptionalBlock::get).
    fn get_mut(&mut self) -> Option<&mut dyn Block>;

    /// Returns the contained block, inserting the zero value if absent.
    fn get_or_insert_zero(&mut self) -> &mut dyn Block;
}

impl<T: Block + Default> OptionalBlock for Option<T> {
    #[inline]
    fn get(&self) -> Option<&dyn Block> {
        self.as_ref().map(|value| value as &dyn Block)
    }

    #[inline]
    fn get_mut(&mut self) -> Option<&mut dyn Block> {
        self.as_mut().map(|value| value as &mut dyn Block)
    }

    #[inline]
    fn get_or_insert_zero(&mut self) -> &mut dyn Block {
        self.get_or_insert_with(T::default)
    }
}

// -----------------------------------------------------------------------------
// block_eq

/// Structural deep-equality of two blocks.
///
/// Two blocks are equal when they are of the same type and every field
/// compares equal: attributes by scalar value, inline blocks recursively, and
/// optional blocks recursively with two absent fields counting as equal (an
/// absent and a present field never do).
pub fn block_eq(a: &dyn Block, b: &dyn Block) -> bool {
    let schema = a.schema();
    if schema.ty_id() != b.schema().ty_id() {
        return false;
    }
    for index in 0..schema.field_len() {
        let eq = match (a.field(index), b.field(index)) {
            (Some(FieldRef::Attr(a)), Some(FieldRef::Attr(b))) => a.scalar_eq(b),
            (Some(FieldRef::Block(a)), Some(FieldRef::Block(b))) => block_eq(a, b),
            (Some(FieldRef::OptionalBlock(a)), Some(FieldRef::OptionalBlock(b))) => {
                match (a.get(), b.get()) {
                    (None, None) => true,
                    (Some(a), Some(b)) => block_eq(a, b),
                    _ => false,
                }
            }
            _ => false,
        };
        if !eq {
            return false;
        }
    }
    true
}

// -----------------------------------------------------------------------------
// Tests
