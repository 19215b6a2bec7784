#![doc = include_str!("../README.md")]
#![no_std]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod ast;

mod parse;
mod printer;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use parse::{ParseError, parse};
pub use printer::print;
