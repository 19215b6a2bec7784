//! The Self-Default capability and the default resolver built on it.

use alloc::boxed::Box;

use crate::block::Block;
use crate::info::Schema;

// -----------------------------------------------------------------------------
// Defaulter

/// A block type with a canonical default that differs from its zero value.
///
/// `set_to_default` overwrites a zero-valued receiver in place with the
/// type's canonical default. It must be idempotent and side-effect-free
/// beyond the receiver. Participation is opted into with the struct-level
/// `#[corten(defaulter)]` annotation, which resolves the capability into the
/// type's [`Schema`] at derive time.
///
/// # Examples
///
/// ```
/// use corten_reflect::{Defaulter, derive::Block};
///
/// #[derive(Block, Default)]
/// #[corten(defaulter)]
/// struct Retry {
///     #[corten(attr, optional)]
///     attempts: u32,
/// }
///
/// impl Defaulter for Retry {
///     fn set_to_default(&mut self) {
///         self.attempts = 3;
///     }
/// }
/// ```
pub trait Defaulter {
    /// Overwrites the receiver with the type's canonical default.
    fn set_to_default(&mut self);
}

// -----------------------------------------------------------------------------
// default_of

/// Builds the canonical default instance of a schema's type: the zero value,
/// with the Self-Default hook applied when the type carries one.
///
/// Callers must invoke this freshly wherever a new comparison baseline is
/// needed. An enclosing type's default for a nested field can differ from the
/// nested type's own default, and the encoder needs both at different scopes.
pub fn default_of(schema: &'static Schema) -> Box<dyn Block> {
    let mut value = schema.make_zero();
    if let Some(hook) = schema.defaulter() {
        hook(value.as_mut());
    }
    value
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::default_of;
    use crate::Schematic;
    use crate::fixtures::{
        AttrWithDefault, DEFAULT_NUMBER, MismatchingDefault, NoDefaultDefined,
        OTHER_DEFAULT_NUMBER, PtrPropagatingDefault,
    };

    #[test]
    fn zero_when_no_defaulter() {
        let value = default_of(NoDefaultDefined::schema());
        let value = value.downcast_ref::<NoDefaultDefined>().unwrap();
        assert_eq!(value.inner, None);
    }

    #[test]
    fn applies_the_defaulter() {
        let value = default_of(AttrWithDefault::schema());
        let value = value.downcast_ref::<AttrWithDefault>().unwrap();
        assert_eq!(value.number, DEFAULT_NUMBER);
    }

    #[test]
    fn owner_default_can_disagree_with_nested_default() {
        let owner = default_of(MismatchingDefault::schema());
        let owner = owner.downcast_ref::<MismatchingDefault>().unwrap();
        assert_eq!(
            owner.inner,
            Some(AttrWithDefault {
                number: OTHER_DEFAULT_NUMBER
            })
        );

        let nested = default_of(AttrWithDefault::schema());
        let nested = nested.downcast_ref::<AttrWithDefault>().unwrap();
        assert_eq!(nested.number, DEFAULT_NUMBER);
    }

    #[test]
    fn defaulter_may_seed_pointer_fields() {
        let value = default_of(PtrPropagatingDefault::schema());
        let value = value.downcast_ref::<PtrPropagatingDefault>().unwrap();
        assert_eq!(
            value.inner,
            Some(AttrWithDefault {
                number: DEFAULT_NUMBER
            })
        );
    }

    #[test]
    fn fresh_instance_every_call() {
        let a = default_of(AttrWithDefault::schema());
        let b = default_of(AttrWithDefault::schema());
        let a_addr = a.as_ref() as *const dyn crate::Block as *const () as usize;
        let b_addr = b.as_ref() as *const dyn crate::Block as *const () as usize;
        assert_ne!(a_addr, b_addr);
    }
}
