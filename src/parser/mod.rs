//! # Parser
//!
//! Hand-rolled recursive-descent parser, predictive on the first token with
//! one exception (an `ID` is disambiguated between assignment and call by
//! looking one token further). Expressions are parsed by a six-level
//! precedence ladder. Errors use panic-mode recovery: a production that
//! hits a mismatch records a [`SyntaxError`] and synchronizes immediately,
//! so its caller always resumes from a known-good token.

pub mod ast;
mod error;

pub use error::SyntaxError;

use log::warn;

use crate::lexer::{Token, TokenKind};
use crate::semantic::types::Type;

use ast::*;

/// Tokens that terminate panic-mode synchronization. `;` is additionally
/// consumed once landed on, per the recovery contract.
const SYNC_SET: &[TokenKind] = &[
    TokenKind::Semicolon,
    TokenKind::LBrace,
    TokenKind::RBrace,
    TokenKind::Type,
    TokenKind::Procedure,
    TokenKind::Function,
    TokenKind::If,
    TokenKind::While,
    TokenKind::Return,
];

struct Parser {
    tokens: Vec<Token>,
    index: usize,
    errors: Vec<SyntaxError>,
}

impl Parser {
    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn current_kind(&self) -> Option<TokenKind> {
        self.current().map(|t| t.kind)
    }

    fn current_token_if(&self, kind: TokenKind) -> Option<&Token> {
        self.current().filter(|t| t.kind == kind)
    }

    fn peek2_kind(&self) -> Option<TokenKind> {
        self.tokens.get(self.index + 1).map(|t| t.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    /// Position to attach to a diagnostic raised *right now*: the current
    /// token's position, or the last token's position at end of input.
    fn position(&self) -> crate::lexer::Position {
        self.current()
            .or_else(|| self.tokens.last())
            .map(|t| t.position)
            .unwrap_or_default()
    }

    fn fail_expected(&mut self, expected: impl Into<String>) {
        let found = self.current_kind();
        let position = self.position();
        let expected = expected.into();
        warn!("syntax error at {position}: expected {expected}, found {found:?}");
        self.errors.push(SyntaxError {
            expected,
            found,
            position,
        });
        self.synchronize();
    }

    /// Advance past tokens until one in [`SYNC_SET`] (or end of input);
    /// consume a landed-on `;` since it terminates the statement that
    /// failed.
    fn synchronize(&mut self) {
        let start = self.position();
        let mut skipped = 0;
        while let Some(kind) = self.current_kind() {
            if SYNC_SET.contains(&kind) {
                break;
            }
            self.advance();
            skipped += 1;
        }
        if self.current_kind() == Some(TokenKind::Semicolon) {
            self.advance();
        }
        if skipped > 0 {
            warn!("recovered from {start} by skipping {skipped} token(s)");
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Option<Token> {
        if self.current_kind() == Some(kind) {
            self.advance()
        } else {
            self.fail_expected(kind.to_string());
            None
        }
    }

    fn expect_id(&mut self) -> Option<String> {
        self.expect(TokenKind::Id).map(|t| t.lexeme)
    }

    // ---- statements -----------------------------------------------------

    /// Parse items until `}` or end of input is reached, consuming the `}`.
    /// Used for every brace-delimited body (subroutine, if/else, while).
    fn parse_block(&mut self) -> Vec<Stmt> {
        let mut body = vec![];
        while !matches!(self.current_kind(), Some(TokenKind::RBrace) | None) {
            let start = self.index;
            if let Some(stmt) = self.parse_block_item() {
                body.push(stmt);
            }
            if self.index == start {
                self.advance();
                self.synchronize();
            }
        }
        self.expect(TokenKind::RBrace);
        body
    }

    /// Parse the program's top-level item list: the same dispatch as
    /// inside a block, just without a closing brace to look for.
    fn parse_top_level(&mut self) -> Vec<Stmt> {
        let mut body = vec![];
        while self.current().is_some() {
            let start = self.index;
            if let Some(stmt) = self.parse_block_item() {
                body.push(stmt);
            }
            if self.index == start {
                self.advance();
                self.synchronize();
            }
        }
        body
    }

    /// Dispatch on the current token, per the statement-disambiguation
    /// rule: this single dispatcher is shared by the program root and
    /// every nested block, since declarations and subroutine declarations
    /// are legal in both positions.
    fn parse_block_item(&mut self) -> Option<Stmt> {
        match self.current_kind()? {
            TokenKind::Comment => Some(self.parse_comment()),
            TokenKind::Type => self.parse_declaration().map(Stmt::Declaration),
            TokenKind::Procedure | TokenKind::Function => {
                self.parse_subroutine_decl().map(Stmt::SubroutineDecl)
            }
            TokenKind::If => self.parse_conditional().map(Stmt::Conditional),
            TokenKind::While => self.parse_loop().map(Stmt::Loop),
            TokenKind::Return => self.parse_return().map(Stmt::Return),
            TokenKind::Id => self.parse_id_statement(),
            _ => {
                self.fail_expected("a statement");
                None
            }
        }
    }

    fn parse_comment(&mut self) -> Stmt {
        let tok = self
            .advance()
            .expect("current_kind() confirmed a Comment token");
        Stmt::Comment(Comment {
            text: tok.lexeme,
            style: tok
                .comment_style
                .expect("comment tokens always carry a style"),
            position: tok.position,
        })
    }

    fn parse_declaration(&mut self) -> Option<Declaration> {
        let type_tok = self.advance()?;
        let position = type_tok.position;
        let declared_type = Type::from_keyword(&type_tok.lexeme);

        let mut names = vec![self.expect_id()?];
        while self.current_kind() == Some(TokenKind::Comma) {
            self.advance();
            names.push(self.expect_id()?);
        }
        // A missing terminator drops the whole declaration, matching the
        // original parser's commit-only-on-full-production-success
        // behavior: a node is only produced once its terminator is found.
        self.expect(TokenKind::Semicolon)?;

        Some(Declaration {
            declared_type,
            names,
            position,
        })
    }

    fn parse_subroutine_decl(&mut self) -> Option<SubroutineDecl> {
        let kw = self.advance()?;
        let position = kw.position;
        let kind = if kw.kind == TokenKind::Procedure {
            SubroutineKind::Procedure
        } else {
            SubroutineKind::Function
        };

        let name = self.expect_id()?;
        self.expect(TokenKind::LParen)?;
        let mut params = vec![];
        if self.current_kind() != Some(TokenKind::RParen) {
            loop {
                let ty_tok = self.expect(TokenKind::Type)?;
                let declared_type = Type::from_keyword(&ty_tok.lexeme);
                let pname = self.expect_id()?;
                params.push(Param {
                    declared_type,
                    name: pname,
                });
                if self.current_kind() == Some(TokenKind::Comma) {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::RParen)?;

        let mut return_type = None;
        if matches!(kind, SubroutineKind::Function) && self.current_kind() == Some(TokenKind::Return)
        {
            self.advance();
            let ty_tok = self.expect(TokenKind::Type)?;
            return_type = Some(Type::from_keyword(&ty_tok.lexeme));
        }

        self.expect(TokenKind::LBrace)?;
        let body = self.parse_block();

        Some(SubroutineDecl {
            kind,
            name,
            params,
            return_type,
            body,
            position,
        })
    }

    fn parse_conditional(&mut self) -> Option<Conditional> {
        let kw = self.advance()?;
        let position = kw.position;
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::LBrace)?;
        let then_body = self.parse_block();

        let else_body = if self.current_kind() == Some(TokenKind::Else) {
            self.advance();
            self.expect(TokenKind::LBrace)?;
            Some(self.parse_block())
        } else {
            None
        };

        Some(Conditional {
            condition,
            then_body,
            else_body,
            position,
        })
    }

    fn parse_loop(&mut self) -> Option<Loop> {
        let kw = self.advance()?;
        let position = kw.position;
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::LBrace)?;
        let body = self.parse_block();
        Some(Loop {
            condition,
            body,
            position,
        })
    }

    fn parse_return(&mut self) -> Option<Return> {
        let kw = self.advance()?;
        let position = kw.position;
        let value = if self.current_kind() == Some(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon)?;
        Some(Return { value, position })
    }

    /// An `ID` at the start of a statement is an assignment or a call,
    /// decided by the token after it (the one required lookahead-of-2).
    fn parse_id_statement(&mut self) -> Option<Stmt> {
        match self.peek2_kind() {
            Some(TokenKind::Equals) => self.parse_assignment().map(Stmt::Assignment),
            Some(TokenKind::LParen) => self.parse_call_stmt().map(Stmt::Call),
            _ => {
                self.fail_expected("'=' or '(' after identifier");
                None
            }
        }
    }

    fn parse_assignment(&mut self) -> Option<Assignment> {
        let target_tok = self.advance()?;
        let position = target_tok.position;
        self.expect(TokenKind::Equals)?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::Semicolon)?;
        Some(Assignment {
            target: target_tok.lexeme,
            value,
            position,
        })
    }

    fn parse_call_stmt(&mut self) -> Option<Call> {
        let call = self.parse_call_expr()?;
        self.expect(TokenKind::Semicolon)?;
        Some(call)
    }

    fn parse_call_expr(&mut self) -> Option<Call> {
        let name_tok = self.advance()?;
        let position = name_tok.position;
        self.expect(TokenKind::LParen)?;
        let mut args = vec![];
        if self.current_kind() != Some(TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if self.current_kind() == Some(TokenKind::Comma) {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Some(Call {
            callee: name_tok.lexeme,
            args,
            position,
        })
    }

    // ---- expressions: precedence ladder, low to high ---------------------

    fn parse_expr(&mut self) -> Option<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Option<Expr> {
        let mut left = self.parse_and()?;
        while self
            .current_token_if(TokenKind::LogicOp)
            .is_some_and(|t| t.lexeme == "||")
        {
            let tok = self.advance().expect("just matched");
            let right = self.parse_and()?;
            left = Expr::Binary(BinaryExpr {
                operator: BinaryOp::Or,
                left: Box::new(left),
                right: Box::new(right),
                inferred_type: None,
                position: tok.position,
            });
        }
        Some(left)
    }

    fn parse_and(&mut self) -> Option<Expr> {
        let mut left = self.parse_comparison()?;
        while self
            .current_token_if(TokenKind::LogicOp)
            .is_some_and(|t| t.lexeme == "&&")
        {
            let tok = self.advance().expect("just matched");
            let right = self.parse_comparison()?;
            left = Expr::Binary(BinaryExpr {
                operator: BinaryOp::And,
                left: Box::new(left),
                right: Box::new(right),
                inferred_type: None,
                position: tok.position,
            });
        }
        Some(left)
    }

    fn parse_comparison(&mut self) -> Option<Expr> {
        let mut left = self.parse_additive()?;
        while let Some(tok) = self.current_token_if(TokenKind::CompOp).cloned() {
            let operator = match tok.lexeme.as_str() {
                "==" => BinaryOp::Eq,
                "!=" => BinaryOp::NotEq,
                ">" => BinaryOp::Gt,
                "<" => BinaryOp::Lt,
                ">=" => BinaryOp::GtEq,
                "<=" => BinaryOp::LtEq,
                other => unreachable!("COMP_OP only ever lexes to one of six spellings, got '{other}'"),
            };
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::Binary(BinaryExpr {
                operator,
                left: Box::new(left),
                right: Box::new(right),
                inferred_type: None,
                position: tok.position,
            });
        }
        Some(left)
    }

    fn parse_additive(&mut self) -> Option<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let Some(tok) = self.current_token_if(TokenKind::ArithOp).cloned() else {
                break;
            };
            let operator = match tok.lexeme.as_str() {
                "+" => BinaryOp::Add,
                "-" => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::Binary(BinaryExpr {
                operator,
                left: Box::new(left),
                right: Box::new(right),
                inferred_type: None,
                position: tok.position,
            });
        }
        Some(left)
    }

    fn parse_multiplicative(&mut self) -> Option<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let Some(tok) = self.current_token_if(TokenKind::ArithOp).cloned() else {
                break;
            };
            let operator = match tok.lexeme.as_str() {
                "*" => BinaryOp::Mul,
                "/" => BinaryOp::Div,
                "%" => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary(BinaryExpr {
                operator,
                left: Box::new(left),
                right: Box::new(right),
                inferred_type: None,
                position: tok.position,
            });
        }
        Some(left)
    }

    fn parse_unary(&mut self) -> Option<Expr> {
        if let Some(tok) = self.current_token_if(TokenKind::LogicOp).cloned() {
            if tok.lexeme == "!" {
                self.advance();
                let operand = self.parse_unary()?;
                return Some(Expr::Unary(UnaryExpr {
                    operator: UnaryOp::Not,
                    operand: Box::new(operand),
                    inferred_type: None,
                    position: tok.position,
                }));
            }
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        match self.current_kind() {
            Some(TokenKind::Number) => {
                let tok = self.advance().expect("just matched");
                let literal_type = if tok.lexeme.contains('.') {
                    LiteralType::Real
                } else {
                    LiteralType::Integer
                };
                Some(Expr::Literal(Literal {
                    raw: tok.lexeme,
                    literal_type,
                    position: tok.position,
                }))
            }
            Some(TokenKind::String) => {
                let tok = self.advance().expect("just matched");
                Some(Expr::Literal(Literal {
                    raw: tok.lexeme,
                    literal_type: LiteralType::Text,
                    position: tok.position,
                }))
            }
            Some(TokenKind::Id) => {
                if self.peek2_kind() == Some(TokenKind::LParen) {
                    self.parse_call_expr().map(Expr::Call)
                } else {
                    let tok = self.advance().expect("just matched");
                    Some(Expr::Identifier(Identifier {
                        name: tok.lexeme,
                        resolved_type: None,
                        position: tok.position,
                    }))
                }
            }
            Some(TokenKind::LParen) => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Some(expr)
            }
            _ => {
                self.fail_expected("an expression");
                None
            }
        }
    }
}

/// Parse a complete token stream into a `Program`, collecting syntax
/// errors along the way. Never panics on malformed input: panic-mode
/// recovery always returns control to the caller.
pub fn parse(tokens: Vec<Token>) -> (Program, Vec<SyntaxError>) {
    let mut parser = Parser {
        tokens,
        index: 0,
        errors: vec![],
    };
    let body = parser.parse_top_level();
    (Program { body }, parser.errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::symbol::SymbolTable;

    fn parse_source(src: &str) -> (Program, Vec<SyntaxError>) {
        let (tokens, lex_errors) = lex(src, &mut SymbolTable::new());
        assert!(lex_errors.is_empty(), "unexpected lex errors: {lex_errors:?}");
        parse(tokens)
    }

    #[test]
    fn s1_integer_assignment_parses_clean() {
        let (program, errors) = parse_source("inteiro x; x = 3 + 4;");
        assert!(errors.is_empty());
        assert_eq!(program.body.len(), 2);
        assert!(matches!(program.body[0], Stmt::Declaration(_)));
        assert!(matches!(program.body[1], Stmt::Assignment(_)));
    }

    #[test]
    fn s4_function_with_return_type_parses() {
        let (program, errors) = parse_source("funcao f() retorna inteiro { }");
        assert!(errors.is_empty());
        let Stmt::SubroutineDecl(decl) = &program.body[0] else {
            panic!("expected a subroutine declaration");
        };
        assert_eq!(decl.kind, SubroutineKind::Function);
        assert_eq!(decl.return_type, Some(Type::Integer));
        assert!(decl.body.is_empty());
    }

    #[test]
    fn s5_missing_semicolon_drops_the_malformed_declaration_but_recovers_later_statements() {
        let (program, errors) = parse_source("inteiro x  x = 1; inteiro y; y = 2;");
        assert_eq!(errors.len(), 1);
        // The declaration missing its terminator is dropped entirely (it
        // never committed, matching the original parser's
        // commit-only-on-full-production-success behavior), and
        // synchronization swallows the rest of that malformed statement
        // up to the next `;`, so `x = 1` never becomes an AST node either.
        let declared_names: Vec<&str> = program
            .body
            .iter()
            .filter_map(|s| match s {
                Stmt::Declaration(d) => Some(d.names[0].as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(declared_names, vec!["y"]);
        assert!(program
            .body
            .iter()
            .any(|s| matches!(s, Stmt::Assignment(a) if a.target == "y")));
        assert!(!program
            .body
            .iter()
            .any(|s| matches!(s, Stmt::Assignment(a) if a.target == "x")));
    }

    #[test]
    fn s6_call_statement_parses_with_two_arguments() {
        let (program, errors) =
            parse_source("procedimento p(inteiro a) { } p(1, 2);");
        assert!(errors.is_empty());
        let Stmt::Call(call) = &program.body[1] else {
            panic!("expected a call statement");
        };
        assert_eq!(call.callee, "p");
        assert_eq!(call.args.len(), 2);
    }

    #[test]
    fn expression_precedence_ladder_is_respected() {
        let (program, errors) = parse_source("inteiro x; x = 1 + 2 * 3;");
        assert!(errors.is_empty());
        let Stmt::Assignment(a) = &program.body[1] else {
            panic!("expected assignment");
        };
        let Expr::Binary(top) = &a.value else {
            panic!("expected binary expr");
        };
        assert_eq!(top.operator, BinaryOp::Add);
        assert!(matches!(*top.right, Expr::Binary(ref r) if r.operator == BinaryOp::Mul));
    }

    #[test]
    fn call_expression_is_recognized_inside_expressions() {
        let (program, errors) = parse_source("funcao f() retorna inteiro { retorna 1; } inteiro x; x = f() + 1;");
        assert!(errors.is_empty());
        let Stmt::Assignment(a) = &program.body[2] else {
            panic!("expected assignment");
        };
        let Expr::Binary(bin) = &a.value else {
            panic!("expected binary expr");
        };
        assert!(matches!(*bin.left, Expr::Call(_)));
    }

    #[test]
    fn comments_are_preserved_as_statements() {
        let (program, errors) = parse_source("// hi\ninteiro x;");
        assert!(errors.is_empty());
        assert!(matches!(program.body[0], Stmt::Comment(_)));
        assert!(matches!(program.body[1], Stmt::Declaration(_)));
    }

    #[test]
    fn nested_declaration_inside_if_body_is_accepted() {
        let (program, errors) = parse_source("se (1) { inteiro y; y = 1; }");
        assert!(errors.is_empty());
        let Stmt::Conditional(cond) = &program.body[0] else {
            panic!("expected conditional");
        };
        assert!(matches!(cond.then_body[0], Stmt::Declaration(_)));
    }
}
