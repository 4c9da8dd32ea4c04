//! The code generator: a closed-set visitor over the validated AST that
//! emits Python source text. Indentation is tracked as an integer, 4
//! spaces per level, matching the emission table.

use crate::parser::ast::{
    BinaryOp, Call, Comment, Conditional, Declaration, Expr, Literal, Loop, Program, Return,
    Stmt, SubroutineDecl, UnaryOp,
};
use crate::lexer::CommentStyle;

struct Codegen {
    out: String,
    indent: usize,
    wrote_any_top_level: bool,
}

impl Codegen {
    fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
            wrote_any_top_level: false,
        }
    }

    fn write_line(&mut self, line: &str) {
        if line.is_empty() {
            self.out.push('\n');
        } else {
            self.out.push_str(&"    ".repeat(self.indent));
            self.out.push_str(line);
            self.out.push('\n');
        }
    }

    fn emit_block(&mut self, body: &[Stmt]) {
        self.indent += 1;
        if body.is_empty() {
            self.write_line("pass");
        } else {
            for stmt in body {
                self.emit_stmt(stmt);
            }
        }
        self.indent -= 1;
    }

    fn emit_program(&mut self, program: &Program) {
        for stmt in &program.body {
            if matches!(stmt, Stmt::SubroutineDecl(_)) && self.wrote_any_top_level {
                self.write_line("");
            }
            self.emit_stmt(stmt);
            self.wrote_any_top_level = true;
        }
    }

    fn emit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Declaration(d) => self.emit_declaration(d),
            Stmt::Assignment(a) => {
                self.write_line(&format!("{} = {}", a.target, render_expr(&a.value, true)));
            }
            Stmt::Conditional(c) => self.emit_conditional(c),
            Stmt::Loop(l) => self.emit_loop(l),
            Stmt::SubroutineDecl(s) => self.emit_subroutine(s),
            Stmt::Call(c) => self.write_line(&render_call(c, true)),
            Stmt::Return(r) => self.emit_return(r),
            Stmt::Comment(c) => self.emit_comment(c),
        }
    }

    fn emit_declaration(&mut self, decl: &Declaration) {
        for name in &decl.names {
            self.write_line(&format!("{} = {}", name, decl.declared_type.zero_value()));
        }
    }

    fn emit_conditional(&mut self, c: &Conditional) {
        self.write_line(&format!("if {}:", render_expr(&c.condition, true)));
        self.emit_block(&c.then_body);
        if let Some(else_body) = &c.else_body {
            self.write_line("else:");
            self.emit_block(else_body);
        }
    }

    fn emit_loop(&mut self, l: &Loop) {
        self.write_line(&format!("while {}:", render_expr(&l.condition, true)));
        self.emit_block(&l.body);
    }

    fn emit_subroutine(&mut self, s: &SubroutineDecl) {
        let params = s
            .params
            .iter()
            .map(|p| p.name.clone())
            .collect::<Vec<_>>()
            .join(", ");
        self.write_line(&format!("def {}({}):", s.name, params));
        self.emit_block(&s.body);
    }

    fn emit_return(&mut self, r: &Return) {
        match &r.value {
            Some(value) => self.write_line(&format!("return {}", render_expr(value, true))),
            None => self.write_line("return"),
        }
    }

    fn emit_comment(&mut self, c: &Comment) {
        match c.style {
            CommentStyle::Line => {
                let text = c.text.trim_start_matches("//").trim();
                self.write_line(&format!("# {text}"));
            }
            CommentStyle::Block => {
                let inner = c
                    .text
                    .trim_start_matches("/*")
                    .trim_end_matches("*/")
                    .trim();
                for line in inner.lines() {
                    self.write_line(&format!("# {}", line.trim()));
                }
            }
        }
    }
}

fn binary_op_symbol(op: BinaryOp, remap: bool) -> &'static str {
    match (op, remap) {
        (BinaryOp::And, true) => "and",
        (BinaryOp::Or, true) => "or",
        (BinaryOp::Add, _) => "+",
        (BinaryOp::Sub, _) => "-",
        (BinaryOp::Mul, _) => "*",
        (BinaryOp::Div, _) => "/",
        (BinaryOp::Mod, _) => "%",
        (BinaryOp::Eq, _) => "==",
        (BinaryOp::NotEq, _) => "!=",
        (BinaryOp::Gt, _) => ">",
        (BinaryOp::Lt, _) => "<",
        (BinaryOp::GtEq, _) => ">=",
        (BinaryOp::LtEq, _) => "<=",
        (BinaryOp::And, false) => "&&",
        (BinaryOp::Or, false) => "||",
    }
}

fn unary_op_symbol(op: UnaryOp, remap: bool) -> &'static str {
    match (op, remap) {
        (UnaryOp::Not, true) => "not",
        (UnaryOp::Not, false) => "!",
    }
}

fn render_literal(lit: &Literal) -> String {
    lit.raw.clone()
}

fn render_call(call: &Call, remap: bool) -> String {
    let args = call
        .args
        .iter()
        .map(|a| render_expr(a, remap))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}({})", call.callee, args)
}

/// Render an expression to source text. `remap` selects between target
/// operator spellings (codegen, `remap = true`) and the operators as
/// written in Coins source (symbol-table `current_value` reporting,
/// `remap = false`).
fn render_expr(expr: &Expr, remap: bool) -> String {
    match expr {
        Expr::Binary(b) => format!(
            "({} {} {})",
            render_expr(&b.left, remap),
            binary_op_symbol(b.operator, remap),
            render_expr(&b.right, remap)
        ),
        Expr::Unary(u) => format!(
            "({} {})",
            unary_op_symbol(u.operator, remap),
            render_expr(&u.operand, remap)
        ),
        Expr::Identifier(id) => id.name.clone(),
        Expr::Literal(lit) => render_literal(lit),
        Expr::Call(call) => render_call(call, remap),
    }
}

/// Generate Python source text for a validated program.
pub fn generate(program: &Program) -> String {
    let mut gen = Codegen::new();
    gen.emit_program(program);
    gen.out
}

/// Render an expression as it was written in Coins source (no operator
/// remap), used for the symbol table's `current_value` reporting.
pub fn render_expr_plain(expr: &Expr) -> String {
    render_expr(expr, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Position;
    use crate::parser::ast::{Assignment, BinaryExpr, Identifier, LiteralType};
    use crate::semantic::types::Type;

    fn pos() -> Position {
        Position::default()
    }

    #[test]
    fn declaration_emits_zero_values() {
        let program = Program {
            body: vec![Stmt::Declaration(Declaration {
                declared_type: Type::Integer,
                names: vec!["x".into(), "y".into()],
                position: pos(),
            })],
        };
        assert_eq!(generate(&program), "x = 0\ny = 0\n");
    }

    #[test]
    fn binary_expr_remaps_logical_operators() {
        let expr = Expr::Binary(BinaryExpr {
            operator: BinaryOp::And,
            left: Box::new(Expr::Identifier(Identifier {
                name: "a".into(),
                resolved_type: Some(Type::Boolean),
                position: pos(),
            })),
            right: Box::new(Expr::Identifier(Identifier {
                name: "b".into(),
                resolved_type: Some(Type::Boolean),
                position: pos(),
            })),
            inferred_type: Some(Type::Boolean),
            position: pos(),
        });
        assert_eq!(render_expr(&expr, true), "(a and b)");
        assert_eq!(render_expr(&expr, false), "(a && b)");
    }

    #[test]
    fn empty_subroutine_body_emits_pass() {
        let program = Program {
            body: vec![Stmt::SubroutineDecl(SubroutineDecl {
                kind: crate::parser::ast::SubroutineKind::Procedure,
                name: "p".into(),
                params: vec![],
                return_type: None,
                body: vec![],
                position: pos(),
            })],
        };
        assert_eq!(generate(&program), "def p():\n    pass\n");
    }

    #[test]
    fn assignment_renders_expression() {
        let program = Program {
            body: vec![Stmt::Assignment(Assignment {
                target: "x".into(),
                value: Expr::Literal(Literal {
                    raw: "7".into(),
                    literal_type: LiteralType::Integer,
                    position: pos(),
                }),
                position: pos(),
            })],
        };
        assert_eq!(generate(&program), "x = 7\n");
    }
}
