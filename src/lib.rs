#![doc = include_str!("../README.md")]
#![no_std]

extern crate alloc;

pub use corten_reflect as reflect;
pub use corten_syntax as syntax;

pub use corten_reflect::{
    Block, DecodeError, Defaulter, EncodeError, Schematic, TypeRegistry, decode, decode_any,
    decode_into, encode_block,
};
pub use corten_syntax::{ParseError, parse, print};

use alloc::string::String;
use alloc::vec::Vec;
use core::{error, fmt};

use corten_syntax::ast::Stmt;

// -----------------------------------------------------------------------------
// Error

/// Failure of a text-to-value conversion, from either stage.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    Parse(ParseError),
    Decode(DecodeError),
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl From<DecodeError> for Error {
    fn from(err: DecodeError) -> Self {
        Self::Decode(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => err.fmt(f),
            Self::Decode(err) => err.fmt(f),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Decode(err) => Some(err),
        }
    }
}

// -----------------------------------------------------------------------------
// Conversions

/// Encodes a block value to configuration text.
///
/// The text is minimal: optional fields whose values decoding would
/// reconstruct anyway are left out.
pub fn to_string(value: &dyn Block) -> Result<String, EncodeError> {
    let stmts = encode_block(value)?;
    Ok(print(&stmts))
}

/// Parses and decodes configuration text into a value of type `T`.
pub fn from_str<T: Block + Default>(text: &str) -> Result<T, Error> {
    let stmts: Vec<Stmt> = parse(text)?;
    Ok(decode(&stmts)?)
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::{Defaulter, Error, from_str, to_string};
    use crate::reflect::derive::Block;

    #[derive(Block, Clone, Debug, Default, PartialEq)]
    #[corten(defaulter)]
    struct Scrape {
        #[corten(attr)]
        target: String,
        #[corten(attr, optional)]
        interval_secs: u64,
    }

    impl Defaulter for Scrape {
        fn set_to_default(&mut self) {
            self.interval_secs = 60;
        }
    }

    #[test]
    fn text_round_trip() {
        let scrape = Scrape {
            target: "localhost:9090".into(),
            interval_secs: 60,
        };
        let text = to_string(&scrape).unwrap();
        assert_eq!(text, "target = \"localhost:9090\"\n");
        assert_eq!(from_str::<Scrape>(&text).unwrap(), scrape);
    }

    #[test]
    fn errors_from_both_stages() {
        assert!(matches!(
            from_str::<Scrape>("target = "),
            Err(Error::Parse(_))
        ));
        assert!(matches!(
            from_str::<Scrape>("targets = \"x\""),
            Err(Error::Decode(_))
        ));
    }
}
