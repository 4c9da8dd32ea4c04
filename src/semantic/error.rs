//! Semantic diagnostics. Mirrors the teacher's wrapping-enum-of-structs
//! shape (`TypeCheckError`/`TypeMismatch` et al.) but keyed on `Position`
//! instead of `Span`, and split into an error enum and a separate warning
//! enum since §7 of the spec treats them as distinct collections.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::lexer::Position;
use crate::parser::ast::BinaryOp;
use crate::semantic::types::Type;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SemanticError {
    UndefinedName(UndefinedName, Position),
    VariableRedeclared(VariableRedeclared, Position),
    SubroutineRedeclared(SubroutineRedeclared, Position),
    NotAVariable(NotAVariable, Position),
    NotASubroutine(NotASubroutine, Position),
    ArithmeticOnText(ArithmeticOnText, Position),
    InvalidOperandTypes(InvalidOperandTypes, Position),
    InvalidComparison(InvalidComparison, Position),
    InvalidLogicalOperand(InvalidLogicalOperand, Position),
    AssignmentIncompatible(AssignmentIncompatible, Position),
    ConditionNotBooleanOrNumeric(ConditionNotBooleanOrNumeric, Position),
    ArityMismatch(ArityMismatch, Position),
    ArgumentIncompatible(ArgumentIncompatible, Position),
    ProcedureUsedAsExpression(ProcedureUsedAsExpression, Position),
    ReturnOutsideFunction(ReturnOutsideFunction, Position),
    ReturnIncompatible(ReturnIncompatible, Position),
    UnexpectedReturnValue(UnexpectedReturnValue, Position),
    MissingReturnValue(MissingReturnValue, Position),
    FunctionMissingReturn(FunctionMissingReturn, Position),
}

impl SemanticError {
    pub fn position(&self) -> Position {
        match self {
            SemanticError::UndefinedName(_, p)
            | SemanticError::VariableRedeclared(_, p)
            | SemanticError::SubroutineRedeclared(_, p)
            | SemanticError::NotAVariable(_, p)
            | SemanticError::NotASubroutine(_, p)
            | SemanticError::ArithmeticOnText(_, p)
            | SemanticError::InvalidOperandTypes(_, p)
            | SemanticError::InvalidComparison(_, p)
            | SemanticError::InvalidLogicalOperand(_, p)
            | SemanticError::AssignmentIncompatible(_, p)
            | SemanticError::ConditionNotBooleanOrNumeric(_, p)
            | SemanticError::ArityMismatch(_, p)
            | SemanticError::ArgumentIncompatible(_, p)
            | SemanticError::ProcedureUsedAsExpression(_, p)
            | SemanticError::ReturnOutsideFunction(_, p)
            | SemanticError::ReturnIncompatible(_, p)
            | SemanticError::UnexpectedReturnValue(_, p)
            | SemanticError::MissingReturnValue(_, p)
            | SemanticError::FunctionMissingReturn(_, p) => *p,
        }
    }
}

impl Display for SemanticError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        macro_rules! show {
            ($e:expr, $p:expr) => {
                write!(f, "{} (at {})", $e, $p)
            };
        }
        match self {
            SemanticError::UndefinedName(e, p) => show!(e, p),
            SemanticError::VariableRedeclared(e, p) => show!(e, p),
            SemanticError::SubroutineRedeclared(e, p) => show!(e, p),
            SemanticError::NotAVariable(e, p) => show!(e, p),
            SemanticError::NotASubroutine(e, p) => show!(e, p),
            SemanticError::ArithmeticOnText(e, p) => show!(e, p),
            SemanticError::InvalidOperandTypes(e, p) => show!(e, p),
            SemanticError::InvalidComparison(e, p) => show!(e, p),
            SemanticError::InvalidLogicalOperand(e, p) => show!(e, p),
            SemanticError::AssignmentIncompatible(e, p) => show!(e, p),
            SemanticError::ConditionNotBooleanOrNumeric(e, p) => show!(e, p),
            SemanticError::ArityMismatch(e, p) => show!(e, p),
            SemanticError::ArgumentIncompatible(e, p) => show!(e, p),
            SemanticError::ProcedureUsedAsExpression(e, p) => show!(e, p),
            SemanticError::ReturnOutsideFunction(e, p) => show!(e, p),
            SemanticError::ReturnIncompatible(e, p) => show!(e, p),
            SemanticError::UnexpectedReturnValue(e, p) => show!(e, p),
            SemanticError::MissingReturnValue(e, p) => show!(e, p),
            SemanticError::FunctionMissingReturn(e, p) => show!(e, p),
        }
    }
}

impl std::error::Error for SemanticError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndefinedName {
    pub name: String,
}
impl Display for UndefinedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "symbol '{}' not declared", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableRedeclared {
    pub name: String,
}
impl Display for VariableRedeclared {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "variable '{}' already declared in this scope", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubroutineRedeclared {
    pub name: String,
    pub kind: &'static str,
}
impl Display for SubroutineRedeclared {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} '{}' already declared in this scope",
            self.kind, self.name
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotAVariable {
    pub name: String,
}
impl Display for NotAVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' is not a variable", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotASubroutine {
    pub name: String,
}
impl Display for NotASubroutine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' is not a procedure or function", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArithmeticOnText {
    pub left: Type,
    pub operator: BinaryOp,
    pub right: Type,
}
impl Display for ArithmeticOnText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "arithmetic on text is not allowed: {} {} {}",
            self.left, self.operator, self.right
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidOperandTypes {
    pub left: Type,
    pub operator: BinaryOp,
    pub right: Type,
}
impl Display for InvalidOperandTypes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid operand types for '{}': {} and {}",
            self.operator, self.left, self.right
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidComparison {
    pub left: Type,
    pub right: Type,
}
impl Display for InvalidComparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid comparison between {} and {}", self.left, self.right)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidLogicalOperand {
    pub operator: String,
    pub found: Type,
}
impl Display for InvalidLogicalOperand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "logical operator '{}' is not valid for type {}",
            self.operator, self.found
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentIncompatible {
    pub operation: String,
    pub expected: Type,
    pub actual: Type,
}
impl Display for AssignmentIncompatible {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "type mismatch in {}: expected {}, found {}",
            self.operation, self.expected, self.actual
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionNotBooleanOrNumeric {
    pub found: Type,
}
impl Display for ConditionNotBooleanOrNumeric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "condition has unexpected type {}; expected boolean or numeric",
            self.found
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArityMismatch {
    pub name: String,
    pub expected: usize,
    pub found: usize,
}
impl Display for ArityMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "wrong number of arguments for '{}', expected {}, found {}",
            self.name, self.expected, self.found
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentIncompatible {
    pub name: String,
    pub index: usize,
    pub expected: Type,
    pub actual: Type,
}
impl Display for ArgumentIncompatible {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "type mismatch in argument {} of '{}': expected {}, found {}",
            self.index, self.name, self.expected, self.actual
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureUsedAsExpression {
    pub name: String,
}
impl Display for ProcedureUsedAsExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "procedure '{}' has no value and cannot be used as an expression", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnOutsideFunction;
impl Display for ReturnOutsideFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'retorna' used outside of a function")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnIncompatible {
    pub name: String,
    pub expected: Type,
    pub actual: Type,
}
impl Display for ReturnIncompatible {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "type mismatch in return of '{}': expected {}, found {}",
            self.name, self.expected, self.actual
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnexpectedReturnValue {
    pub name: String,
}
impl Display for UnexpectedReturnValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "procedure '{}' should not return a value", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingReturnValue {
    pub name: String,
    pub expected: Type,
}
impl Display for MissingReturnValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "function '{}' with return type {} expects a return value",
            self.name, self.expected
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionMissingReturn {
    pub name: String,
}
impl Display for FunctionMissingReturn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "function '{}' has no return statement", self.name)
    }
}

/// Non-fatal diagnostics: `codegen` still runs when only these are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SemanticWarning {
    ImplicitNarrowing(ImplicitNarrowing, Position),
    TextOrderComparison(TextOrderComparison, Position),
}

impl SemanticWarning {
    pub fn position(&self) -> Position {
        match self {
            SemanticWarning::ImplicitNarrowing(_, p) => *p,
            SemanticWarning::TextOrderComparison(_, p) => *p,
        }
    }
}

impl Display for SemanticWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SemanticWarning::ImplicitNarrowing(e, p) => write!(f, "{} (at {})", e, p),
            SemanticWarning::TextOrderComparison(e, p) => write!(f, "{} (at {})", e, p),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplicitNarrowing {
    pub operation: String,
}
impl Display for ImplicitNarrowing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "implicit narrowing, possible precision loss in {}",
            self.operation
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOrderComparison {
    pub operator: BinaryOp,
}
impl Display for TextOrderComparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "order comparison ({}) between text values may behave unexpectedly",
            self.operator
        )
    }
}
