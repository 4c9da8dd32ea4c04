//! The value-type lattice used by the semantic analyzer, plus the
//! compatibility/inference rules from the type table.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A resolved Coins type. `Unknown` stands in for "a semantic error already
/// explains this value's type"; it suppresses cascading diagnostics rather
/// than reporting a second error at every downstream use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    Integer,
    Real,
    Text,
    Boolean,
    Unknown,
}

impl Type {
    /// Parse a declared-type keyword's lexeme (`inteiro`/`real`/`texto`)
    /// into its `Type`. Panics on anything else: the parser only reaches
    /// this conversion after matching a `TYPE` token, so any other lexeme
    /// would indicate a lexer/parser mismatch, not user input.
    pub fn from_keyword(lexeme: &str) -> Type {
        match lexeme {
            "inteiro" => Type::Integer,
            "real" => Type::Real,
            "texto" => Type::Text,
            other => unreachable!("'{other}' is not a TYPE keyword spelling"),
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Type::Integer | Type::Real)
    }

    /// Zero-value literal the code generator emits for a bare `Declaration`.
    pub fn zero_value(self) -> &'static str {
        match self {
            Type::Integer => "0",
            Type::Real => "0.0",
            Type::Text => "\"\"",
            Type::Boolean | Type::Unknown => "None",
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Type::Integer => "inteiro",
            Type::Real => "real",
            Type::Text => "texto",
            Type::Boolean => "booleano",
            Type::Unknown => "desconhecido",
        };
        f.write_str(name)
    }
}

/// Outcome of checking whether a value of type `actual` may be assigned
/// into a slot declared `expected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    Ok,
    /// Implicit widening (integer -> real); no diagnostic.
    Widening,
    /// Implicit narrowing (real -> integer); a warning, not an error.
    Narrowing,
    Incompatible,
}

/// Assignment compatibility per the §4.3 table. `Type::Unknown` on either
/// side is always `Ok`: the root cause was already reported elsewhere.
pub fn assignment_compatibility(expected: Type, actual: Type) -> Compatibility {
    if expected == Type::Unknown || actual == Type::Unknown {
        return Compatibility::Ok;
    }
    match (expected, actual) {
        (e, a) if e == a => Compatibility::Ok,
        (Type::Real, Type::Integer) => Compatibility::Widening,
        (Type::Integer, Type::Real) => Compatibility::Narrowing,
        _ => Compatibility::Incompatible,
    }
}
