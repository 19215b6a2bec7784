//! Block types shared by the unit tests, covering the interesting default
//! configurations: nested defaults that agree, disagree, or are absent, in
//! both inline and `Option`-typed positions.

use alloc::boxed::Box;
use alloc::string::String;

use crate::Defaulter;
use crate::derive::Block;

pub const DEFAULT_NUMBER: i64 = 123;
pub const OTHER_DEFAULT_NUMBER: i64 = 321;

/// One optional attribute with a non-zero default.
#[derive(Block, Clone, Debug, Default, PartialEq)]
#[corten(defaulter)]
pub struct AttrWithDefault {
    #[corten(attr, optional)]
    pub number: i64,
}

impl Defaulter for AttrWithDefault {
    fn set_to_default(&mut self) {
        self.number = DEFAULT_NUMBER;
    }
}

/// Inline nested block whose owner default agrees with the nested default.
#[derive(Block, Clone, Debug, Default, PartialEq)]
#[corten(defaulter)]
pub struct StructPropagatingDefault {
    #[corten(block, optional)]
    pub inner: AttrWithDefault,
}

impl Defaulter for StructPropagatingDefault {
    fn set_to_default(&mut self) {
        self.inner.set_to_default();
    }
}

/// `Option`-typed nested block whose owner default agrees with the nested
/// default.
#[derive(Block, Clone, Debug, Default, PartialEq)]
#[corten(defaulter)]
pub struct PtrPropagatingDefault {
    #[corten(block, optional)]
    pub inner: Option<AttrWithDefault>,
}

impl Defaulter for PtrPropagatingDefault {
    fn set_to_default(&mut self) {
        self.inner = Some(AttrWithDefault {
            number: DEFAULT_NUMBER,
        });
    }
}

/// Owner default holds a present nested value in its zero state.
#[derive(Block, Clone, Debug, Default, PartialEq)]
#[corten(defaulter)]
pub struct ZeroDefault {
    #[corten(block, optional)]
    pub inner: Option<AttrWithDefault>,
}

impl Defaulter for ZeroDefault {
    fn set_to_default(&mut self) {
        self.inner = Some(AttrWithDefault { number: 0 });
    }
}

/// No Self-Default at all; the default is the zero value, `inner` absent.
#[derive(Block, Clone, Debug, Default, PartialEq)]
pub struct NoDefaultDefined {
    #[corten(block, optional)]
    pub inner: Option<AttrWithDefault>,
}

/// Owner default for `inner` disagrees with `AttrWithDefault`'s own default.
#[derive(Block, Clone, Debug, Default, PartialEq)]
#[corten(defaulter)]
pub struct MismatchingDefault {
    #[corten(block, optional)]
    pub inner: Option<AttrWithDefault>,
}

impl Defaulter for MismatchingDefault {
    fn set_to_default(&mut self) {
        self.inner = Some(AttrWithDefault {
            number: OTHER_DEFAULT_NUMBER,
        });
    }
}

/// Nested block behind `Option<Box<_>>`.
#[derive(Block, Clone, Debug, Default, PartialEq)]
pub struct BoxedDefault {
    #[corten(block, optional)]
    pub inner: Option<Box<AttrWithDefault>>,
}

/// A required `Option`-typed block.
#[derive(Block, Clone, Debug, Default, PartialEq)]
pub struct RequiredPtr {
    #[corten(block)]
    pub inner: Option<AttrWithDefault>,
}

#[derive(Block, Clone, Debug, Default, PartialEq)]
pub struct TlsConfig {
    #[corten(attr, optional)]
    pub enabled: bool,
}

/// A multi-field type exercising every field shape at once.
#[derive(Block, Clone, Debug, Default, PartialEq)]
pub struct ServerConfig {
    #[corten(attr)]
    pub addr: String,
    #[corten(attr, optional)]
    pub limit: u32,
    #[corten(block)]
    pub tls: TlsConfig,
    #[corten(block, optional)]
    pub backup: Option<TlsConfig>,
}
