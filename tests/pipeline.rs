//! End-to-end pipeline tests: each covers one of the scenarios walked
//! through by hand in the language reference.

use coins::compile;
use coins::semantic::error::SemanticError;

#[test]
fn s1_integer_declaration_and_arithmetic_assignment() {
    let result = compile("inteiro x;\nx = 3 + 4;\n");
    assert!(!result.has_errors());
    let generated = result.generated.expect("clean program generates code");
    assert_eq!(generated, "x = 0\nx = (3 + 4)\n");
}

#[test]
fn s2_narrowing_real_into_integer_warns_but_compiles() {
    let result = compile("real r;\ninteiro i;\nr = 3.5;\ni = r;\n");
    assert!(!result.has_errors(), "narrowing is a warning, not an error");
    assert_eq!(result.semantic_warnings.len(), 1);
    assert!(result.generated.is_some());
}

#[test]
fn s3_arithmetic_on_text_is_rejected() {
    let result = compile("texto nome;\ninteiro x;\nx = nome + 1;\n");
    assert!(result.has_errors());
    assert_eq!(result.semantic_errors.len(), 1);
    assert!(matches!(
        result.semantic_errors[0],
        SemanticError::ArithmeticOnText(..)
    ));
    assert!(result.generated.is_none());
}

#[test]
fn s4_function_declaring_a_return_type_must_return() {
    let missing = compile("funcao dobro(inteiro x) retorna inteiro {\n}\n");
    assert!(missing.semantic_errors.iter().any(|e| matches!(
        e,
        SemanticError::FunctionMissingReturn(..)
    )));

    let present = compile("funcao dobro(inteiro x) retorna inteiro {\nretorna x * 2;\n}\n");
    assert!(!present.has_errors());
    assert!(present.generated.is_some());
}

#[test]
fn s5_missing_semicolon_recovers_without_losing_the_rest_of_the_program() {
    let result = compile("inteiro x  x = 1;\ninteiro y;\ny = 2;\n");
    assert_eq!(result.syntax_errors.len(), 1);
    assert!(result.semantic_errors.is_empty());
    assert!(result.symbols.get("x").is_some());
    assert!(result.symbols.get("y").is_some());
    // a syntax error still suppresses codegen even though semantics ran clean
    assert!(result.generated.is_none());
}

#[test]
fn s6_calling_a_subroutine_with_the_wrong_arity_is_an_error() {
    let result = compile(
        "procedimento soma(inteiro a, inteiro b) {\n}\nsoma(1);\n",
    );
    assert!(result.has_errors());
    assert!(result
        .semantic_errors
        .iter()
        .any(|e| matches!(e, SemanticError::ArityMismatch(..))));
}

#[test]
fn procedure_cannot_be_used_as_an_expression() {
    let result = compile(
        "procedimento faz_nada() {\n}\ninteiro x;\nx = faz_nada();\n",
    );
    assert!(result.has_errors());
    assert!(result
        .semantic_errors
        .iter()
        .any(|e| matches!(e, SemanticError::ProcedureUsedAsExpression(..))));
}

#[test]
fn function_called_as_a_statement_discards_its_result_without_error() {
    let result = compile(
        "funcao um() retorna inteiro {\nretorna 1;\n}\num();\n",
    );
    assert!(!result.has_errors());
    assert!(result.generated.is_some());
}

#[test]
fn nested_scopes_may_shadow_outer_declarations() {
    let result = compile(
        "inteiro x;\nx = 1;\nse (x == 1) {\ntexto x;\nx = \"oi\";\n}\n",
    );
    assert!(!result.has_errors());
}
