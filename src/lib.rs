//! Compiler front-end for Coins: lexer, parser, semantic analyzer, and a
//! Python-targeting code generator. The four phases run in strict sequence;
//! code generation is only attempted when lexing, parsing, and semantic
//! analysis all produced zero errors.

pub mod codegen;
pub mod lexer;
pub mod parser;
pub mod semantic;
pub mod symbol;

use log::debug;

use lexer::LexError;
use parser::SyntaxError;
use semantic::error::{SemanticError, SemanticWarning};
use symbol::SymbolTable;

/// Everything a single compilation produced: diagnostics from every phase
/// that ran, the populated symbol table, and the generated program text
/// (only present when compilation reached code generation cleanly).
#[derive(Debug, Default)]
pub struct CompileResult {
    pub lex_errors: Vec<LexError>,
    pub syntax_errors: Vec<SyntaxError>,
    pub semantic_errors: Vec<SemanticError>,
    pub semantic_warnings: Vec<SemanticWarning>,
    pub symbols: SymbolTable,
    pub generated: Option<String>,
}

impl CompileResult {
    /// Whether any phase reported an error (warnings do not count).
    pub fn has_errors(&self) -> bool {
        !self.lex_errors.is_empty()
            || !self.syntax_errors.is_empty()
            || !self.semantic_errors.is_empty()
    }
}

/// Run the full pipeline over `source`. Lexing and parsing always run;
/// semantic analysis only runs if lexing and parsing were both clean, and
/// code generation only runs if semantic analysis added no errors either.
/// This mirrors the reference compiler's all-phases-or-nothing policy:
/// partial, possibly nonsensical output is worse than no output.
pub fn compile(source: &str) -> CompileResult {
    let mut symbols = SymbolTable::new();

    debug!("lexing {} bytes", source.len());
    let (tokens, lex_errors) = lexer::lex(source, &mut symbols);
    debug!("lexing done: {} tokens, {} errors", tokens.len(), lex_errors.len());

    debug!("parsing {} tokens", tokens.len());
    let (mut program, syntax_errors) = parser::parse(tokens);
    debug!(
        "parsing done: {} top-level statements, {} errors",
        program.body.len(),
        syntax_errors.len()
    );

    let mut result = CompileResult {
        lex_errors,
        syntax_errors,
        ..Default::default()
    };

    // Every phase runs over whatever its predecessor produced, even a
    // degraded AST recovered from a syntax error: only code generation is
    // gated on the full error tally being empty.
    debug!("analyzing semantics");
    let (semantic_errors, semantic_warnings) = semantic::analyze(&mut program, &mut symbols);
    debug!(
        "semantic analysis done: {} errors, {} warnings",
        semantic_errors.len(),
        semantic_warnings.len()
    );
    result.semantic_errors = semantic_errors;
    result.semantic_warnings = semantic_warnings;
    result.symbols = symbols;

    if !result.has_errors() {
        debug!("generating code");
        result.generated = Some(codegen::generate(&program));
    } else {
        debug!("skipping code generation, {} total errors", {
            result.lex_errors.len() + result.syntax_errors.len() + result.semantic_errors.len()
        });
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_clean_program_reaches_codegen() {
        let result = compile("inteiro x;\nx = 3 + 4;\n");
        assert!(!result.has_errors());
        assert!(result.generated.is_some());
        let generated = result.generated.unwrap();
        assert!(generated.contains("x = 0"));
        assert!(generated.contains("x = (3 + 4)"));
    }

    #[test]
    fn s3_arithmetic_on_text_blocks_codegen() {
        let result = compile("texto s;\ninteiro x;\nx = s + 1;\n");
        assert!(result.has_errors());
        assert!(result.generated.is_none());
        assert_eq!(result.semantic_errors.len(), 1);
    }

    #[test]
    fn s5_syntax_error_still_lets_semantic_analysis_see_the_recovered_ast() {
        let result = compile("inteiro x  x = 1;\ninteiro y;\ny = 2;\n");
        assert_eq!(result.syntax_errors.len(), 1);
        assert!(result.semantic_errors.is_empty());
        assert!(result.symbols.get("x").is_some());
        assert!(result.symbols.get("y").is_some());
        assert!(result.generated.is_none(), "a syntax error still suppresses codegen");
    }

    #[test]
    fn s4_missing_return_is_reported() {
        let result = compile("funcao f() retorna inteiro {\n}\n");
        assert!(result
            .semantic_errors
            .iter()
            .any(|e| matches!(e, SemanticError::FunctionMissingReturn(..))));
        assert!(result.generated.is_none());
    }

    #[test]
    fn s2_narrowing_assignment_warns_but_still_compiles() {
        let result = compile("real r;\ninteiro i;\nr = 1.5;\ni = r;\n");
        assert!(!result.has_errors());
        assert!(!result.semantic_warnings.is_empty());
        assert!(result.generated.is_some());
    }
}
