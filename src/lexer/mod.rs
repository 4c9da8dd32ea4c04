//! # Lexer
//!
//! Tokenizes Coins source text. Unlike a conventional longest-match lexer,
//! matching here is **ordered**: at each position we try the token
//! specifications in declaration order and take the first one that matches.
//! Keyword specs precede the identifier spec for exactly this reason —
//! otherwise `se`/`enquanto`/... would be swallowed as identifiers.
//!
//! Whitespace and comments are skipped from the token stream proper, but
//! comments are surfaced as `COMMENT` tokens (tagged with their style) so
//! the code generator can re-emit them later.

mod token;

pub use token::*;

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::symbol::SymbolTable;

/// A single entry in the ordered list of token specifications.
struct Spec {
    kind: TokenKind,
    regex: &'static Lazy<Regex>,
}

macro_rules! anchored {
    ($name:ident, $pattern:literal) => {
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new(concat!("^(?:", $pattern, ")")).unwrap());
    };
}

anchored!(LINE_COMMENT, r"//[^\n]*");
anchored!(BLOCK_COMMENT, r"/\*([^*]|\*[^/])*\*/");
anchored!(WHITESPACE, r"[ \t\r\n]+");
anchored!(TYPE_KW, r"(inteiro|real|texto)\b");
anchored!(IF_KW, r"se\b");
anchored!(ELSE_KW, r"senao\b");
anchored!(WHILE_KW, r"enquanto\b");
anchored!(PROCEDURE_KW, r"procedimento\b");
anchored!(FUNCTION_KW, r"funcao\b");
anchored!(RETURN_KW, r"retorna\b");
anchored!(IDENT, r"[A-Za-z_\u{00C0}-\u{017F}][A-Za-z0-9_\u{00C0}-\u{017F}]*");
anchored!(NUMBER, r"[0-9]+(\.[0-9]+)?");
anchored!(STRING, "\"[^\"]*\"");
anchored!(ARITH_OP, r"[+\-*/%]");
anchored!(LOGIC_OP, r"(&&|\|\||!)");
anchored!(COMP_OP, r"(==|!=|>=|<=|>|<)");
anchored!(EQUALS, r"=");
anchored!(SEMICOLON, r";");
anchored!(COMMA, r",");
anchored!(LPAREN, r"\(");
anchored!(RPAREN, r"\)");
anchored!(LBRACE, r"\{");
anchored!(RBRACE, r"\}");

/// Ordered token specifications. Keywords precede `IDENT`; multi-character
/// operators (`==`, `&&`, ...) precede any single-character operator that
/// could otherwise shadow their prefix.
static SPECS: Lazy<Vec<Spec>> = Lazy::new(|| {
    vec![
        Spec {
            kind: TokenKind::Type,
            regex: &TYPE_KW,
        },
        Spec {
            kind: TokenKind::If,
            regex: &IF_KW,
        },
        Spec {
            kind: TokenKind::Else,
            regex: &ELSE_KW,
        },
        Spec {
            kind: TokenKind::While,
            regex: &WHILE_KW,
        },
        Spec {
            kind: TokenKind::Procedure,
            regex: &PROCEDURE_KW,
        },
        Spec {
            kind: TokenKind::Function,
            regex: &FUNCTION_KW,
        },
        Spec {
            kind: TokenKind::Return,
            regex: &RETURN_KW,
        },
        Spec {
            kind: TokenKind::Id,
            regex: &IDENT,
        },
        Spec {
            kind: TokenKind::Number,
            regex: &NUMBER,
        },
        Spec {
            kind: TokenKind::String,
            regex: &STRING,
        },
        Spec {
            kind: TokenKind::LogicOp,
            regex: &LOGIC_OP,
        },
        Spec {
            kind: TokenKind::CompOp,
            regex: &COMP_OP,
        },
        Spec {
            kind: TokenKind::ArithOp,
            regex: &ARITH_OP,
        },
        Spec {
            kind: TokenKind::Equals,
            regex: &EQUALS,
        },
        Spec {
            kind: TokenKind::Semicolon,
            regex: &SEMICOLON,
        },
        Spec {
            kind: TokenKind::Comma,
            regex: &COMMA,
        },
        Spec {
            kind: TokenKind::LParen,
            regex: &LPAREN,
        },
        Spec {
            kind: TokenKind::RParen,
            regex: &RPAREN,
        },
        Spec {
            kind: TokenKind::LBrace,
            regex: &LBRACE,
        },
        Spec {
            kind: TokenKind::RBrace,
            regex: &RBRACE,
        },
    ]
});

/// A lexical error: a single character that matched none of the
/// specifications. Scanning resumes at the next character.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LexError {
    pub character: char,
    pub position: Position,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid character '{}' at {}",
            self.character, self.position
        )
    }
}

impl std::error::Error for LexError {}

pub struct Lexer<'a> {
    input: &'a str,
    offset: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            offset: 0,
            line: 0,
            column: 0,
            tokens: vec![],
            errors: vec![],
        }
    }

    fn position(&self) -> Position {
        Position::new(self.offset, self.line, self.column)
    }

    fn advance(&mut self, len: usize) {
        for ch in self.input[self.offset..self.offset + len].chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
        self.offset += len;
    }

    /// Run the scanner to completion, returning the token stream and any
    /// lexical errors. Never fails: invalid characters are reported and
    /// skipped, matching `spec.md`'s "scanning continues" contract.
    ///
    /// Every identifier token produced pre-populates `symbols` with an
    /// `undefined`-typed placeholder, unless a name is already present —
    /// the semantic analyzer overwrites these once real declarations are
    /// seen.
    pub fn lex(mut self, symbols: &mut SymbolTable) -> (Vec<Token>, Vec<LexError>) {
        while self.offset < self.input.len() {
            let rest = &self.input[self.offset..];

            if let Some(m) = WHITESPACE.find(rest) {
                self.advance(m.end());
                continue;
            }

            if let Some(m) = LINE_COMMENT.find(rest) {
                let pos = self.position();
                let text = m.as_str().to_string();
                self.advance(m.end());
                self.tokens
                    .push(Token::comment(text, pos, CommentStyle::Line));
                continue;
            }

            if let Some(m) = BLOCK_COMMENT.find(rest) {
                let pos = self.position();
                let text = m.as_str().to_string();
                self.advance(m.end());
                self.tokens
                    .push(Token::comment(text, pos, CommentStyle::Block));
                continue;
            }

            // An unterminated block comment: the non-greedy match above
            // failed to find a closer anywhere in the remaining input.
            // spec.md §8 gives this case an explicit rule ("producing a
            // stream of MISMATCH lex errors for the remaining characters"),
            // so every remaining character becomes its own mismatch and
            // scanning ends.
            if rest.starts_with("/*") {
                let start = self.position();
                for ch in rest.chars() {
                    let pos = self.position();
                    self.errors.push(LexError {
                        character: ch,
                        position: pos,
                    });
                    self.tokens
                        .push(Token::new(TokenKind::Mismatch, ch.to_string(), pos));
                    self.advance(ch.len_utf8());
                }
                warn!("unterminated block comment starting at {start}");
                break;
            }

            // An unterminated string literal: spec.md is silent here, so
            // we follow `analisador_lexico.py`'s regex engine, which
            // reports a single MISMATCH for the opening quote and resumes
            // ordinary scanning of whatever follows it.
            if rest.starts_with('"') && !STRING.is_match(rest) {
                let pos = self.position();
                warn!("unterminated string literal starting at {pos}");
                self.errors.push(LexError {
                    character: '"',
                    position: pos,
                });
                self.tokens
                    .push(Token::new(TokenKind::Mismatch, "\"".to_string(), pos));
                self.advance(1);
                continue;
            }

            if let Some(spec) = SPECS.iter().find(|spec| spec.regex.is_match(rest)) {
                let m = spec.regex.find(rest).expect("checked by is_match");
                let pos = self.position();
                let text = m.as_str().to_string();
                self.advance(m.end());
                if spec.kind == TokenKind::Id {
                    symbols.insert_placeholder(&text);
                }
                self.tokens.push(Token::new(spec.kind, text, pos));
                continue;
            }

            // Fallback: single invalid character.
            let pos = self.position();
            let ch = rest.chars().next().expect("offset < input.len()");
            warn!("invalid character '{ch}' at {pos}, skipping");
            self.errors.push(LexError {
                character: ch,
                position: pos,
            });
            self.tokens
                .push(Token::new(TokenKind::Mismatch, ch.to_string(), pos));
            self.advance(ch.len_utf8());
        }

        (self.tokens, self.errors)
    }
}

/// Tokenize `input`, returning `(tokens, lex_errors)` in source order and
/// pre-populating `symbols` with an `undefined`-typed placeholder for every
/// identifier seen.
pub fn lex(input: &str, symbols: &mut SymbolTable) -> (Vec<Token>, Vec<LexError>) {
    Lexer::new(input).lex(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    fn lex(src: &str) -> (Vec<Token>, Vec<LexError>) {
        super::lex(src, &mut SymbolTable::new())
    }

    #[test]
    fn empty_source_produces_nothing() {
        let (tokens, errors) = lex("");
        assert!(tokens.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn only_comments_produce_comment_tokens_and_no_errors() {
        let (tokens, errors) = lex("// hello\n/* block */");
        assert!(errors.is_empty());
        assert_eq!(kinds(&tokens), vec![TokenKind::Comment, TokenKind::Comment]);
        assert_eq!(tokens[0].comment_style, Some(CommentStyle::Line));
        assert_eq!(tokens[1].comment_style, Some(CommentStyle::Block));
    }

    #[test]
    fn s1_integer_assignment_tokens() {
        let (tokens, errors) = lex("inteiro x; x = 3 + 4;");
        assert!(errors.is_empty());
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Type,
                TokenKind::Id,
                TokenKind::Semicolon,
                TokenKind::Id,
                TokenKind::Equals,
                TokenKind::Number,
                TokenKind::ArithOp,
                TokenKind::Number,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn keywords_take_priority_over_identifiers() {
        let (tokens, _) = lex("se senao enquanto procedimento funcao retorna");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::If,
                TokenKind::Else,
                TokenKind::While,
                TokenKind::Procedure,
                TokenKind::Function,
                TokenKind::Return,
            ]
        );
    }

    #[test]
    fn keyword_prefix_does_not_shadow_longer_identifier() {
        let (tokens, errors) = lex("sem");
        assert!(errors.is_empty());
        assert_eq!(kinds(&tokens), vec![TokenKind::Id]);
        assert_eq!(tokens[0].lexeme, "sem");
    }

    #[test]
    fn invalid_character_is_reported_and_skipped() {
        let (tokens, errors) = lex("x @ y");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].character, '@');
        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::Id, TokenKind::Mismatch, TokenKind::Id]
        );
    }

    #[test]
    fn multi_char_operators_are_not_split() {
        let (tokens, errors) = lex("a == b && c");
        assert!(errors.is_empty());
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Id,
                TokenKind::CompOp,
                TokenKind::Id,
                TokenKind::LogicOp,
                TokenKind::Id
            ]
        );
    }

    #[test]
    fn unterminated_block_comment_yields_mismatch_stream() {
        let (tokens, errors) = lex("x; /* never closes");
        let expected_mismatches = "/* never closes".chars().count();
        assert_eq!(errors.len(), expected_mismatches);
        assert_eq!(
            kinds(&tokens),
            [TokenKind::Id, TokenKind::Semicolon]
                .into_iter()
                .chain(std::iter::repeat(TokenKind::Mismatch).take(expected_mismatches))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn unterminated_string_yields_one_mismatch_then_resumes_scanning() {
        let (tokens, errors) = lex("x; \"never closes");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].character, '"');
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Id,
                TokenKind::Semicolon,
                TokenKind::Mismatch,
                TokenKind::Id,
                TokenKind::Id,
            ]
        );
    }

    /// Tokens plus whitespace must cover the input exactly: the gap before
    /// each token's offset is whitespace only, each token's lexeme matches
    /// the source bytes at its offset, and the trailing gap is whitespace
    /// only too. This is the round-trip property from `spec.md` §8.
    #[test]
    fn tokens_plus_whitespace_cover_the_input_exactly() {
        let src = "inteiro x; // note\nx = 3 + 4; /* block */ y @ \"ok\"";
        let (tokens, _) = lex(src);
        let mut cursor = 0usize;
        for tok in &tokens {
            assert!(
                src[cursor..tok.position.offset].chars().all(char::is_whitespace),
                "gap before {tok:?} was not pure whitespace"
            );
            let end = tok.position.offset + tok.lexeme.len();
            assert_eq!(&src[tok.position.offset..end], tok.lexeme);
            cursor = end;
        }
        assert!(src[cursor..].chars().all(char::is_whitespace));
    }

    #[test]
    fn string_literal_has_no_escapes() {
        let (tokens, errors) = lex("\"hello world\"");
        assert!(errors.is_empty());
        assert_eq!(kinds(&tokens), vec![TokenKind::String]);
        assert_eq!(tokens[0].lexeme, "\"hello world\"");
    }

    #[test]
    fn positions_track_line_and_column() {
        let (tokens, _) = lex("inteiro x;\nx = 1;");
        let second_x = &tokens[3];
        assert_eq!(second_x.position.line, 1);
        assert_eq!(second_x.position.column, 0);
    }

    #[test]
    fn identifiers_pre_populate_the_symbol_table_as_undefined() {
        let mut symbols = SymbolTable::new();
        super::lex("inteiro x;\nx = f(x);", &mut symbols);
        let x = symbols.get("x").expect("x was seen as an identifier");
        assert_eq!(x.declared_type, None);
        let f = symbols.get("f").expect("f was seen as an identifier");
        assert_eq!(f.declared_type, None);
    }

    #[test]
    fn repeated_identifier_does_not_reset_the_placeholder() {
        let mut symbols = SymbolTable::new();
        super::lex("x x x", &mut symbols);
        assert_eq!(symbols.iter().count(), 1);
    }
}
