//! # Semantic analyzer
//!
//! Walks the AST in program order, maintaining a scope stack and a
//! "current function" context. Populates `inferred_type`/`resolved_type`
//! on expression nodes and updates the global symbol table in place.

pub mod error;
pub mod scope;
pub mod types;

use crate::parser::ast::{
    Assignment, BinaryExpr, BinaryOp, Call, Conditional, Declaration, Expr, Identifier, Loop,
    Program, Return, Stmt, SubroutineDecl, SubroutineKind, UnaryExpr, UnaryOp,
};
use crate::symbol::{SymbolCategory, SymbolEntry, SymbolTable};

use error::*;
use scope::{Binding, Scope};
use types::{assignment_compatibility, Compatibility, Type};

struct FunctionContext {
    name: String,
    return_type: Option<Type>,
    has_return: bool,
}

pub struct Analyzer {
    scope: Scope,
    current_function: Option<FunctionContext>,
    errors: Vec<SemanticError>,
    warnings: Vec<SemanticWarning>,
}

impl Analyzer {
    fn new() -> Self {
        Self {
            scope: Scope::new(),
            current_function: None,
            errors: vec![],
            warnings: vec![],
        }
    }

    fn analyze_stmts(&mut self, stmts: &mut [Stmt], symbols: &mut SymbolTable) {
        for stmt in stmts {
            self.analyze_stmt(stmt, symbols);
        }
    }

    fn analyze_stmt(&mut self, stmt: &mut Stmt, symbols: &mut SymbolTable) {
        match stmt {
            Stmt::Declaration(d) => self.analyze_declaration(d, symbols),
            Stmt::Assignment(a) => self.analyze_assignment(a, symbols),
            Stmt::Conditional(c) => self.analyze_conditional(c, symbols),
            Stmt::Loop(l) => self.analyze_loop(l, symbols),
            Stmt::SubroutineDecl(s) => self.analyze_subroutine(s, symbols),
            Stmt::Call(c) => {
                self.analyze_call(c, symbols);
            }
            Stmt::Return(r) => self.analyze_return(r, symbols),
            Stmt::Comment(_) => {}
        }
    }

    fn analyze_declaration(&mut self, decl: &mut Declaration, symbols: &mut SymbolTable) {
        for name in &decl.names {
            if self.scope.is_declared_in_current_frame(name) {
                self.errors.push(SemanticError::VariableRedeclared(
                    VariableRedeclared { name: name.clone() },
                    decl.position,
                ));
                continue;
            }
            self.scope.declare(name, Binding::Variable(decl.declared_type));
            symbols.set(
                name,
                SymbolEntry {
                    category: SymbolCategory::Variable,
                    declared_type: Some(decl.declared_type),
                    parameters: None,
                    return_type: None,
                    current_value: None,
                },
            );
        }
    }

    fn analyze_assignment(&mut self, assign: &mut Assignment, symbols: &mut SymbolTable) {
        let actual = self.analyze_expr(&mut assign.value, symbols);
        let operation = format!("assignment to '{}'", assign.target);
        match self.scope.resolve(&assign.target) {
            None => self.errors.push(SemanticError::UndefinedName(
                UndefinedName {
                    name: assign.target.clone(),
                },
                assign.position,
            )),
            Some(Binding::Subroutine { .. }) => self.errors.push(SemanticError::NotAVariable(
                NotAVariable {
                    name: assign.target.clone(),
                },
                assign.position,
            )),
            Some(Binding::Variable(expected)) => {
                match assignment_compatibility(expected, actual) {
                    Compatibility::Ok | Compatibility::Widening => {
                        symbols.set_current_value(
                            &assign.target,
                            crate::codegen::render_expr_plain(&assign.value),
                        );
                    }
                    Compatibility::Narrowing => {
                        self.warnings.push(SemanticWarning::ImplicitNarrowing(
                            ImplicitNarrowing { operation },
                            assign.position,
                        ));
                        symbols.set_current_value(
                            &assign.target,
                            crate::codegen::render_expr_plain(&assign.value),
                        );
                    }
                    Compatibility::Incompatible => {
                        self.errors.push(SemanticError::AssignmentIncompatible(
                            AssignmentIncompatible {
                                operation,
                                expected,
                                actual,
                            },
                            assign.position,
                        ));
                    }
                }
            }
        }
    }

    fn analyze_conditional(&mut self, cond: &mut Conditional, symbols: &mut SymbolTable) {
        self.check_condition(&mut cond.condition, symbols);
        self.scope.enter();
        self.analyze_stmts(&mut cond.then_body, symbols);
        self.scope.exit();
        if let Some(else_body) = &mut cond.else_body {
            self.scope.enter();
            self.analyze_stmts(else_body, symbols);
            self.scope.exit();
        }
    }

    fn analyze_loop(&mut self, loop_stmt: &mut Loop, symbols: &mut SymbolTable) {
        self.check_condition(&mut loop_stmt.condition, symbols);
        self.scope.enter();
        self.analyze_stmts(&mut loop_stmt.body, symbols);
        self.scope.exit();
    }

    fn check_condition(&mut self, condition: &mut Expr, symbols: &mut SymbolTable) {
        let ty = self.analyze_expr(condition, symbols);
        if ty != Type::Boolean && !ty.is_numeric() && ty != Type::Unknown {
            self.errors.push(SemanticError::ConditionNotBooleanOrNumeric(
                ConditionNotBooleanOrNumeric { found: ty },
                condition.position(),
            ));
        }
    }

    fn analyze_subroutine(&mut self, sub: &mut SubroutineDecl, symbols: &mut SymbolTable) {
        let kind_word = match sub.kind {
            SubroutineKind::Procedure => "procedure",
            SubroutineKind::Function => "function",
        };
        if self.scope.is_declared_in_current_frame(&sub.name) {
            self.errors.push(SemanticError::SubroutineRedeclared(
                SubroutineRedeclared {
                    name: sub.name.clone(),
                    kind: kind_word,
                },
                sub.position,
            ));
        } else {
            self.scope.declare(
                &sub.name,
                Binding::Subroutine {
                    kind: sub.kind,
                    params: sub.params.iter().map(|p| p.declared_type).collect(),
                    return_type: sub.return_type,
                },
            );
            symbols.set(
                &sub.name,
                SymbolEntry {
                    category: match sub.kind {
                        SubroutineKind::Procedure => SymbolCategory::Procedure,
                        SubroutineKind::Function => SymbolCategory::Function,
                    },
                    declared_type: None,
                    parameters: Some(sub.params.iter().map(|p| p.declared_type).collect()),
                    return_type: sub.return_type,
                    current_value: None,
                },
            );
        }

        let previous = self.current_function.take();
        self.current_function = Some(FunctionContext {
            name: sub.name.clone(),
            return_type: sub.return_type,
            has_return: false,
        });

        self.scope.enter();
        for param in &sub.params {
            self.scope
                .declare(&param.name, Binding::Variable(param.declared_type));
            symbols.set(
                &param.name,
                SymbolEntry {
                    category: SymbolCategory::Parameter,
                    declared_type: Some(param.declared_type),
                    parameters: None,
                    return_type: None,
                    current_value: None,
                },
            );
        }
        self.analyze_stmts(&mut sub.body, symbols);

        let ctx = self
            .current_function
            .take()
            .expect("just pushed a function context");
        if matches!(sub.kind, SubroutineKind::Function) && sub.return_type.is_some() && !ctx.has_return
        {
            self.errors.push(SemanticError::FunctionMissingReturn(
                FunctionMissingReturn {
                    name: sub.name.clone(),
                },
                sub.position,
            ));
        }
        self.current_function = previous;
        self.scope.exit();
    }

    fn analyze_return(&mut self, ret: &mut Return, symbols: &mut SymbolTable) {
        let Some(ctx) = self.current_function.as_ref() else {
            self.errors.push(SemanticError::ReturnOutsideFunction(
                ReturnOutsideFunction,
                ret.position,
            ));
            if let Some(value) = &mut ret.value {
                self.analyze_expr(value, symbols);
            }
            return;
        };
        let ctx_return_type = ctx.return_type;
        let name = ctx.name.clone();
        self.current_function
            .as_mut()
            .expect("checked above")
            .has_return = true;

        match (&mut ret.value, ctx_return_type) {
            (Some(value), Some(expected)) => {
                let actual = self.analyze_expr(value, symbols);
                match assignment_compatibility(expected, actual) {
                    Compatibility::Ok | Compatibility::Widening => {}
                    Compatibility::Narrowing => self.warnings.push(SemanticWarning::ImplicitNarrowing(
                        ImplicitNarrowing {
                            operation: format!("return of '{name}'"),
                        },
                        ret.position,
                    )),
                    Compatibility::Incompatible => self.errors.push(SemanticError::ReturnIncompatible(
                        ReturnIncompatible {
                            name: name.clone(),
                            expected,
                            actual,
                        },
                        ret.position,
                    )),
                }
            }
            (Some(value), None) => {
                self.analyze_expr(value, symbols);
                self.errors.push(SemanticError::UnexpectedReturnValue(
                    UnexpectedReturnValue { name: name.clone() },
                    ret.position,
                ));
            }
            (None, Some(expected)) => {
                self.errors.push(SemanticError::MissingReturnValue(
                    MissingReturnValue {
                        name: name.clone(),
                        expected,
                    },
                    ret.position,
                ));
            }
            (None, None) => {}
        }
    }

    /// Resolve and check a call, returning `Some(type)` for a function
    /// (its return type, or `Unknown` if it has none on record) and `None`
    /// for a procedure — the caller decides whether `None` is acceptable
    /// (statement context) or an error (expression context).
    fn analyze_call(&mut self, call: &mut Call, symbols: &mut SymbolTable) -> Option<Type> {
        let binding = self.scope.resolve(&call.callee);
        let (kind, params, return_type) = match binding {
            None => {
                self.errors.push(SemanticError::UndefinedName(
                    UndefinedName {
                        name: call.callee.clone(),
                    },
                    call.position,
                ));
                for arg in &mut call.args {
                    self.analyze_expr(arg, symbols);
                }
                return Some(Type::Unknown);
            }
            Some(Binding::Variable(_)) => {
                self.errors.push(SemanticError::NotASubroutine(
                    NotASubroutine {
                        name: call.callee.clone(),
                    },
                    call.position,
                ));
                for arg in &mut call.args {
                    self.analyze_expr(arg, symbols);
                }
                return Some(Type::Unknown);
            }
            Some(Binding::Subroutine {
                kind,
                params,
                return_type,
            }) => (kind, params, return_type),
        };

        if call.args.len() != params.len() {
            self.errors.push(SemanticError::ArityMismatch(
                ArityMismatch {
                    name: call.callee.clone(),
                    expected: params.len(),
                    found: call.args.len(),
                },
                call.position,
            ));
        }

        for (i, arg) in call.args.iter_mut().enumerate() {
            let actual = self.analyze_expr(arg, symbols);
            let position = arg.position();
            if let Some(&expected) = params.get(i) {
                match assignment_compatibility(expected, actual) {
                    Compatibility::Ok | Compatibility::Widening => {}
                    Compatibility::Narrowing => self.warnings.push(SemanticWarning::ImplicitNarrowing(
                        ImplicitNarrowing {
                            operation: format!("argument {} of '{}'", i + 1, call.callee),
                        },
                        position,
                    )),
                    Compatibility::Incompatible => self.errors.push(SemanticError::ArgumentIncompatible(
                        ArgumentIncompatible {
                            name: call.callee.clone(),
                            index: i + 1,
                            expected,
                            actual,
                        },
                        position,
                    )),
                }
            }
        }

        match kind {
            SubroutineKind::Function => Some(return_type.unwrap_or(Type::Unknown)),
            SubroutineKind::Procedure => None,
        }
    }

    fn analyze_expr(&mut self, expr: &mut Expr, symbols: &mut SymbolTable) -> Type {
        match expr {
            Expr::Binary(b) => self.analyze_binary(b, symbols),
            Expr::Unary(u) => self.analyze_unary(u, symbols),
            Expr::Identifier(id) => self.analyze_identifier(id),
            Expr::Literal(lit) => lit.type_of(),
            Expr::Call(call) => {
                let position = call.position;
                let name = call.callee.clone();
                match self.analyze_call(call, symbols) {
                    Some(ty) => ty,
                    None => {
                        self.errors.push(SemanticError::ProcedureUsedAsExpression(
                            ProcedureUsedAsExpression { name },
                            position,
                        ));
                        Type::Unknown
                    }
                }
            }
        }
    }

    fn analyze_identifier(&mut self, id: &mut Identifier) -> Type {
        let ty = match self.scope.resolve(&id.name) {
            Some(Binding::Variable(ty)) => ty,
            Some(Binding::Subroutine { .. }) => {
                self.errors.push(SemanticError::NotAVariable(
                    NotAVariable {
                        name: id.name.clone(),
                    },
                    id.position,
                ));
                Type::Unknown
            }
            None => {
                self.errors.push(SemanticError::UndefinedName(
                    UndefinedName {
                        name: id.name.clone(),
                    },
                    id.position,
                ));
                Type::Unknown
            }
        };
        id.resolved_type = Some(ty);
        ty
    }

    fn analyze_binary(&mut self, bin: &mut BinaryExpr, symbols: &mut SymbolTable) -> Type {
        let left = self.analyze_expr(&mut bin.left, symbols);
        let right = self.analyze_expr(&mut bin.right, symbols);
        let ty = self.infer_binary(bin.operator, left, right, bin.position);
        bin.inferred_type = Some(ty);
        ty
    }

    fn infer_binary(
        &mut self,
        op: BinaryOp,
        left: Type,
        right: Type,
        position: crate::lexer::Position,
    ) -> Type {
        if left == Type::Unknown || right == Type::Unknown {
            return Type::Unknown;
        }

        if op.is_arithmetic() {
            if left == Type::Text || right == Type::Text {
                self.errors.push(SemanticError::ArithmeticOnText(
                    ArithmeticOnText {
                        left,
                        operator: op,
                        right,
                    },
                    position,
                ));
                return Type::Unknown;
            }
            if !left.is_numeric() || !right.is_numeric() {
                self.errors.push(SemanticError::InvalidOperandTypes(
                    InvalidOperandTypes {
                        left,
                        operator: op,
                        right,
                    },
                    position,
                ));
                return Type::Unknown;
            }
            return if left == Type::Real || right == Type::Real {
                Type::Real
            } else {
                Type::Integer
            };
        }

        if op.is_comparison() {
            if left.is_numeric() && right.is_numeric() {
                return Type::Boolean;
            }
            if left == Type::Text && right == Type::Text {
                if op.is_order_comparison() {
                    self.warnings.push(SemanticWarning::TextOrderComparison(
                        TextOrderComparison { operator: op },
                        position,
                    ));
                }
                return Type::Boolean;
            }
            self.errors.push(SemanticError::InvalidComparison(
                InvalidComparison { left, right },
                position,
            ));
            return Type::Unknown;
        }

        if op.is_logical() {
            if left == Type::Boolean && right == Type::Boolean {
                return Type::Boolean;
            }
            let found = if left != Type::Boolean { left } else { right };
            self.errors.push(SemanticError::InvalidLogicalOperand(
                InvalidLogicalOperand {
                    operator: op.to_string(),
                    found,
                },
                position,
            ));
            return Type::Unknown;
        }

        unreachable!("BinaryOp covers arithmetic, comparison, and logical operators exhaustively")
    }

    fn analyze_unary(&mut self, unary: &mut UnaryExpr, symbols: &mut SymbolTable) -> Type {
        let operand = self.analyze_expr(&mut unary.operand, symbols);
        let ty = match unary.operator {
            UnaryOp::Not => {
                if operand == Type::Unknown {
                    Type::Unknown
                } else if operand == Type::Boolean {
                    Type::Boolean
                } else {
                    self.errors.push(SemanticError::InvalidLogicalOperand(
                        InvalidLogicalOperand {
                            operator: unary.operator.to_string(),
                            found: operand,
                        },
                        unary.position,
                    ));
                    Type::Unknown
                }
            }
        };
        unary.inferred_type = Some(ty);
        ty
    }
}

/// Run semantic analysis over `program`, mutating its `inferred_type`
/// slots in place and updating `symbols` (already pre-populated by the
/// lexer with placeholder entries). Returns the accumulated errors and
/// warnings.
pub fn analyze(
    program: &mut Program,
    symbols: &mut SymbolTable,
) -> (Vec<SemanticError>, Vec<SemanticWarning>) {
    let mut analyzer = Analyzer::new();
    analyzer.analyze_stmts(&mut program.body, symbols);
    (analyzer.errors, analyzer.warnings)
}
