//! Values tracked by the alias analysis
//!
//! A [`Value`] names one thing that can hold a runtime value at a program
//! point: a register, one half of a literal, a string or type constant, or
//! one half of a static final field read.

use crate::error::AliasError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Register index
pub type Register = u32;

/// Synthetic register holding the result of the previous call-like
/// instruction (invoke, const-string, sget, ...)
pub const RESULT_REGISTER: Register = Register::MAX - 1;

/// Identity of an interned string constant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StringRef(pub u32);

/// Identity of a type constant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeRef(pub u32);

/// Identity of a static field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldRef(pub u32);

/// Something that may hold the same value as a register
///
/// Wide (64-bit) quantities occupy two register slots. Their halves get
/// distinct variants (`Literal`/`LiteralUpper`, `StaticFinal`/`StaticFinalUpper`)
/// so the low half and the high half can never end up in one alias group
/// through a shared constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Value {
    /// A virtual register
    Register(Register),
    /// A literal, or the low half of a wide literal
    Literal(i64),
    /// The high half of a wide literal
    LiteralUpper(i64),
    /// A string constant
    ConstString(StringRef),
    /// A type (class) constant
    ConstType(TypeRef),
    /// A static final field read, or the low half of a wide one
    StaticFinal(FieldRef),
    /// The high half of a wide static final field read
    StaticFinalUpper(FieldRef),
    /// No information
    None,
}

impl Value {
    /// The "no information" sentinel
    pub const fn none() -> Self {
        Value::None
    }

    /// A register by index
    pub const fn register(reg: Register) -> Self {
        Value::Register(reg)
    }

    /// The synthetic slot holding the last call-like result
    pub const fn result_register() -> Self {
        Value::Register(RESULT_REGISTER)
    }

    /// A literal, or the low half of a wide literal
    pub const fn literal(lit: i64) -> Self {
        Value::Literal(lit)
    }

    /// The high half of a wide literal
    pub const fn literal_upper(lit: i64) -> Self {
        Value::LiteralUpper(lit)
    }

    /// An interned string constant
    pub const fn string(s: StringRef) -> Self {
        Value::ConstString(s)
    }

    /// A class constant
    pub const fn type_const(t: TypeRef) -> Self {
        Value::ConstType(t)
    }

    /// A static final field read, or its low half when wide
    pub const fn field(f: FieldRef) -> Self {
        Value::StaticFinal(f)
    }

    /// The high half of a wide static final field read
    pub const fn field_upper(f: FieldRef) -> Self {
        Value::StaticFinalUpper(f)
    }

    /// Low and high halves of a wide literal
    pub const fn literal_pair(lit: i64) -> (Self, Self) {
        (Value::Literal(lit), Value::LiteralUpper(lit))
    }

    /// Low and high halves of a wide static final field
    pub const fn field_pair(f: FieldRef) -> (Self, Self) {
        (Value::StaticFinal(f), Value::StaticFinalUpper(f))
    }

    /// Check if this is the `none` sentinel
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Check if this names a register
    pub fn is_register(&self) -> bool {
        matches!(self, Value::Register(_))
    }

    pub fn as_register(&self) -> Option<Register> {
        match self {
            Value::Register(r) => Some(*r),
            _ => None,
        }
    }

    /// The register index of a register value
    ///
    /// # Panics
    ///
    /// Panics if `self` is not a register. Use [`Value::try_reg`] when the
    /// kind is not known.
    pub fn reg(&self) -> Register {
        match self {
            Value::Register(r) => *r,
            other => panic!("reg() called on non-register value {other}"),
        }
    }

    /// Fallible form of [`Value::reg`]
    pub fn try_reg(&self) -> Result<Register, AliasError> {
        self.as_register().ok_or(AliasError::NotARegister(*self))
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::None
    }
}

impl From<Register> for Value {
    fn from(reg: Register) -> Self {
        Value::Register(reg)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Register(RESULT_REGISTER) => write!(f, "vRESULT"),
            Value::Register(r) => write!(f, "v{r}"),
            Value::Literal(l) => write!(f, "lit:{l}"),
            Value::LiteralUpper(l) => write!(f, "lit_hi:{l}"),
            Value::ConstString(s) => write!(f, "str#{}", s.0),
            Value::ConstType(t) => write!(f, "type#{}", t.0),
            Value::StaticFinal(fr) => write!(f, "sfield#{}", fr.0),
            Value::StaticFinalUpper(fr) => write!(f, "sfield_hi#{}", fr.0),
            Value::None => write!(f, "none"),
        }
    }
}
