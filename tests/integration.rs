//! End-to-end tests driving `computorv2_core::process` exactly as the REPL
//! and one-shot CLI mode do, line by line against a shared `Environment`.

use computorv2_core::value::{Environment, Value};
use computorv2_core::{process, Outcome};

fn eval_value(env: &mut Environment, line: &str) -> Value {
    match process(line, env).unwrap_or_else(|e| panic!("'{line}' failed: {e}")) {
        Outcome::Value(v) | Outcome::Bound { value: v, .. } => v,
        other => panic!("'{line}' did not produce a value: {other:?}"),
    }
}

fn render(env: &mut Environment, line: &str) -> String {
    eval_value(env, line).to_string()
}

#[test]
fn basic_arithmetic_respects_precedence() {
    let mut env = Environment::new();
    assert_eq!(render(&mut env, "2 + 3 * 4"), "14");
}

#[test]
fn rational_division_stays_exact() {
    let mut env = Environment::new();
    assert_eq!(render(&mut env, "1 / 3"), "1/3");
}

#[test]
fn imaginary_unit_squared_is_minus_one() {
    let mut env = Environment::new();
    assert_eq!(render(&mut env, "i * i"), "-1");
}

#[test]
fn sqrt_of_negative_returns_imaginary_result() {
    let mut env = Environment::new();
    assert_eq!(render(&mut env, "sqrt(-4)"), "2i");
}

#[test]
fn variable_assignment_then_use() {
    let mut env = Environment::new();
    process("a = 5", &mut env).unwrap();
    assert_eq!(render(&mut env, "a * a"), "25");
}

#[test]
fn function_definition_then_call() {
    let mut env = Environment::new();
    process("f(x) = x^2 + 1", &mut env).unwrap();
    assert_eq!(render(&mut env, "f(3)"), "10");
}

#[test]
fn trailing_eval_query_evaluates_the_left_hand_side() {
    let mut env = Environment::new();
    process("f(x) = x^2 + 1", &mut env).unwrap();
    assert_eq!(render(&mut env, "f(3) = ?"), "10");
}

#[test]
fn matrix_determinant() {
    let mut env = Environment::new();
    assert_eq!(render(&mut env, "det([[1,2];[3,4]])"), "-2");
}

#[test]
fn matrix_addition() {
    let mut env = Environment::new();
    assert_eq!(
        render(&mut env, "[[1,2];[3,4]] + [[1,0];[0,1]]"),
        "[[2,2];[3,5]]"
    );
}

#[test]
fn unbound_variable_builds_a_symbolic_expression() {
    let mut env = Environment::new();
    let value = eval_value(&mut env, "x + x");
    match value {
        Value::Symbolic(p) => assert_eq!(p.to_string(), "2 * x"),
        other => panic!("expected a symbolic result, got {other:?}"),
    }
}

#[test]
fn quadratic_with_two_real_roots_solves() {
    let mut env = Environment::new();
    let outcome = process("x^2 - 1 = 0 ?", &mut env).unwrap();
    match outcome {
        Outcome::Solved(result) => {
            use computorv2_core::solve::SolveResult;
            assert!(matches!(result, SolveResult::TwoReal(_, _)));
        }
        other => panic!("expected a solved outcome, got {other:?}"),
    }
}

#[test]
fn quadratic_with_irrational_roots_displays_symbolically() {
    let mut env = Environment::new();
    let outcome = process("x^2 - 2 = 0 ?", &mut env).unwrap();
    match outcome {
        Outcome::Solved(result) => {
            use computorv2_core::solve::SolveResult;
            match result {
                SolveResult::TwoReal(a, b) => {
                    let rendered = [a.to_string(), b.to_string()];
                    assert!(rendered.contains(&"sqrt(2)".to_string()));
                    assert!(rendered.contains(&"-sqrt(2)".to_string()));
                }
                other => panic!("unexpected solve result: {other:?}"),
            }
        }
        other => panic!("expected a solved outcome, got {other:?}"),
    }
}

#[test]
fn quadratic_with_negative_discriminant_has_complex_roots() {
    let mut env = Environment::new();
    let outcome = process("x^2 + 1 = 0 ?", &mut env).unwrap();
    match outcome {
        Outcome::Solved(result) => {
            use computorv2_core::solve::SolveResult;
            assert!(matches!(result, SolveResult::TwoComplex(_, _)));
        }
        other => panic!("expected a solved outcome, got {other:?}"),
    }
}

#[test]
fn linear_equation_solves_to_a_single_root() {
    let mut env = Environment::new();
    let outcome = process("2 * x + 4 = 0 ?", &mut env).unwrap();
    match outcome {
        Outcome::Solved(result) => {
            use computorv2_core::solve::SolveResult;
            match result {
                SolveResult::Linear(root) => assert_eq!(root.to_string(), "-2"),
                other => panic!("unexpected solve result: {other:?}"),
            }
        }
        other => panic!("expected a solved outcome, got {other:?}"),
    }
}

#[test]
fn degree_three_equation_is_rejected() {
    let mut env = Environment::new();
    assert!(process("x^3 - 1 = 0 ?", &mut env).is_err());
}

#[test]
fn division_by_zero_is_reported_as_an_error() {
    let mut env = Environment::new();
    assert!(process("1 / 0", &mut env).is_err());
}

#[test]
fn failed_statement_does_not_mutate_the_environment() {
    let mut env = Environment::new();
    process("a = 10", &mut env).unwrap();
    assert!(process("a = 1 / 0", &mut env).is_err());
    assert_eq!(render(&mut env, "a"), "10");
}

#[test]
fn implicit_multiplication_is_a_parse_error() {
    let mut env = Environment::new();
    assert!(process("2x", &mut env).is_err());
}

#[test]
fn undefined_function_call_is_a_name_error() {
    let mut env = Environment::new();
    assert!(process("g(1)", &mut env).is_err());
}

#[test]
fn wrong_arity_call_is_an_arity_error() {
    let mut env = Environment::new();
    process("f(x) = x + 1", &mut env).unwrap();
    assert!(process("f(1, 2)", &mut env).is_err());
}

#[test]
fn matrix_inverse_then_matmul_is_identity() {
    let mut env = Environment::new();
    assert_eq!(
        render(&mut env, "[[1,2];[3,4]] ** inv([[1,2];[3,4]])"),
        "[[1,0];[0,1]]"
    );
}

#[test]
fn matrix_star_is_elementwise() {
    let mut env = Environment::new();
    assert_eq!(
        render(&mut env, "[[1,2];[3,4]] * [[1,0];[0,1]]"),
        "[[1,0];[0,4]]"
    );
}

#[test]
fn redefining_a_variable_a_function_depends_on_changes_its_result() {
    // late-binding: the function body is re-evaluated against the
    // environment at call time, not at definition time.
    let mut env = Environment::new();
    process("a = 1", &mut env).unwrap();
    process("f(x) = x + a", &mut env).unwrap();
    assert_eq!(render(&mut env, "f(1)"), "2");
    process("a = 10", &mut env).unwrap();
    assert_eq!(render(&mut env, "f(1)"), "11");
}

#[test]
fn repeated_processing_of_the_same_line_is_idempotent() {
    let mut env = Environment::new();
    process("a = 5", &mut env).unwrap();
    let first = render(&mut env, "a + 1");
    let second = render(&mut env, "a + 1");
    assert_eq!(first, second);
}
