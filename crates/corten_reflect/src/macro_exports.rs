//! Items the derive macro expands against. Not public API; everything here
//! may change without notice.

use crate::block::Block;
use crate::defaults::Defaulter;

#[cfg(feature = "auto_register")]
pub use inventory;

/// Monomorphizes a [`Defaulter`] impl into the type-erased hook stored in a
/// schema.
pub fn defaulter_hook<T: Block + Defaulter>(target: &mut dyn Block) {
    // A hook is only ever invoked through the schema it was stored in, so
    // the downcast cannot fail; a mismatch is silently skipped rather than
    // panicking inside library code.
    if let Some(target) = target.as_any_mut().downcast_mut::<T>() {
        target.set_to_default();
    }
}
