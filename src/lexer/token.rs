use std::fmt::Display;

use colored::Colorize;
use serde::{Deserialize, Serialize};

/// A precise source location, used for error rendering and tooling.
///
/// Tracks both a byte offset (cheap to compare/sort) and a human-facing
/// `(line, column)` pair, both zero-based internally and rendered
/// one-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Renders a one-line, source-context error the way `why_lib::lexer::Span`
/// does, but keyed off a single [`Position`] rather than a start/end range
/// (Coins diagnostics never span multiple lines).
pub fn render_with_context(source: &str, position: Position, msg: impl Display) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let Some(line_str) = lines.get(position.line) else {
        return format!("{msg} (at {position})");
    };

    let margin = format!("{}", position.line + 1).len();
    let fill = " ".repeat(margin);
    let caret_fill = " ".repeat(position.column);

    format!(
        "{fill} |\n{line} |{line_str}\n{fill} |{caret_fill}{} {}",
        "^--".red(),
        msg
    )
}

/// Comment preservation tag, needed so the code generator can re-emit a
/// comment using the target language's matching comment form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentStyle {
    Line,
    Block,
}

/// The closed set of token kinds from the Coins token contract. `ID`,
/// `NUMBER`, `STRING`, `ARITH_OP`, `LOGIC_OP`, `COMP_OP`, `COMMENT`, and
/// `MISMATCH` carry a payload; the rest are position-only markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    Type,
    If,
    Else,
    While,
    Procedure,
    Function,
    Return,
    Id,
    Number,
    String,
    ArithOp,
    LogicOp,
    CompOp,
    Equals,
    Semicolon,
    Comma,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comment,
    Mismatch,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A single lexed token: its kind, the exact source text it matched, its
/// starting position, and (for comments only) which style produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub position: Position,
    pub comment_style: Option<CommentStyle>,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            position,
            comment_style: None,
        }
    }

    pub fn comment(lexeme: impl Into<String>, position: Position, style: CommentStyle) -> Self {
        Self {
            kind: TokenKind::Comment,
            lexeme: lexeme.into(),
            position,
            comment_style: Some(style),
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}('{}')", self.kind, self.lexeme)
    }
}
