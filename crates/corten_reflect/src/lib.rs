#![doc = include_str!("../README.md")]
#![no_std]

extern crate alloc;

// Lets the paths generated by the derive macro resolve inside this crate.
extern crate self as corten_reflect;

mod block;
mod decode;
mod defaults;
mod encode;
mod info;
mod registry;
mod scalar;

#[doc(hidden)]
pub mod macro_exports;

#[cfg(test)]
pub(crate) mod fixtures;

pub use block::{Block, FieldMut, FieldRef, OptionalBlock, Schematic, block_eq};
pub use decode::{DecodeError, decode, decode_any, decode_into};
pub use defaults::{Defaulter, default_of};
pub use encode::{EncodeError, encode_block};
pub use info::{Cardinality, FieldInfo, FieldKind, Schema};
pub use registry::{SchemaError, TypeRegistry};
pub use scalar::{LiteralError, Scalar};

#[cfg(feature = "auto_register")]
pub use registry::BlockRegistration;

/// The [`Block`](derive::Block) derive macro.
pub mod derive {
    pub use corten_reflect_derive::Block;
}
