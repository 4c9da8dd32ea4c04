use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::lexer::{Position, TokenKind};

/// A syntax error: what the parser expected, what it actually found (`None`
/// means end of input), and where.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxError {
    pub expected: String,
    pub found: Option<TokenKind>,
    pub position: Position,
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.found {
            Some(kind) => write!(
                f,
                "expected {}, found {} at {}",
                self.expected, kind, self.position
            ),
            None => write!(f, "expected {}, found end of input", self.expected),
        }
    }
}

impl std::error::Error for SyntaxError {}
