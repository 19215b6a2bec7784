use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

// -----------------------------------------------------------------------------
// Span

/// A 1-based line/column source position.
///
/// Statements built programmatically (for example by the encoder) carry
/// [`Span::NONE`]; statements produced by the parser carry the position of
/// their name token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    /// The absent position, used for statements that never came from text.
    pub const NONE: Self = Self { line: 0, column: 0 };

    /// Creates a new [`Span`].
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Returns `true` if this span carries no source position.
    #[inline]
    pub const fn is_none(&self) -> bool {
        self.line == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// -----------------------------------------------------------------------------
// Literal

/// A scalar literal as it appears on the right-hand side of an attribute.
///
/// Unsigned values that fit `i64` are normalized to [`Literal::Int`];
/// [`Literal::Uint`] only appears for values above `i64::MAX`.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
}

impl Literal {
    /// A short noun for diagnostics, e.g. `expected number, found string`.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) | Self::Uint(_) | Self::Float(_) => "number",
            Self::Str(_) => "string",
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Uint(value) => write!(f, "{value}"),
            // `{:?}` keeps a decimal point (or exponent) so the literal
            // re-parses as a float.
            Self::Float(value) => write!(f, "{value:?}"),
            Self::Str(value) => {
                f.write_str("\"")?;
                for ch in value.chars() {
                    match ch {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\r' => f.write_str("\\r")?,
                        '\t' => f.write_str("\\t")?,
                        other => write!(f, "{other}")?,
                    }
                }
                f.write_str("\"")
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Statements

/// One statement of a block body.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Attribute(AttributeStmt),
    Block(BlockStmt),
}

impl Stmt {
    /// Returns the statement name.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            Self::Attribute(attr) => &attr.name,
            Self::Block(block) => &block.name,
        }
    }

    /// Returns the statement's source position.
    #[inline]
    pub fn span(&self) -> Span {
        match self {
            Self::Attribute(attr) => attr.span,
            Self::Block(block) => block.span,
        }
    }
}

/// `name = literal`
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeStmt {
    pub name: Cow<'static, str>,
    pub value: Literal,
    pub span: Span,
}

impl AttributeStmt {
    /// Creates an attribute statement without a source position.
    pub fn new(name: impl Into<Cow<'static, str>>, value: Literal) -> Self {
        Self {
            name: name.into(),
            value,
            span: Span::NONE,
        }
    }
}

/// `name { ...body... }`
///
/// The body is scoped strictly to this block.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockStmt {
    pub name: Cow<'static, str>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl BlockStmt {
    /// Creates a block statement without a source position.
    pub fn new(name: impl Into<Cow<'static, str>>, body: Vec<Stmt>) -> Self {
        Self {
            name: name.into(),
            body,
            span: Span::NONE,
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
