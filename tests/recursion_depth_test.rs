//! Nesting depth is bounded during parse, not during evaluation.

use simexpr::{FuncError, ParsedFunction, DEFAULT_MAX_RECURSION_DEPTH};

fn nested(depth: usize) -> String {
    format!("{}1{}", "(".repeat(depth), ")".repeat(depth))
}

#[test]
fn test_default_limit_accepts_realistic_nesting() {
    let mut f = ParsedFunction::new();
    f.set_expression(nested(100));
    f.parse().unwrap();
    assert_eq!(f.evaluate(&[]).unwrap(), 1.0);
}

#[test]
fn test_default_limit_rejects_pathological_nesting() {
    let mut f = ParsedFunction::new();
    f.set_expression(nested(300));
    assert_eq!(
        f.parse().unwrap_err(),
        FuncError::RecursionLimit {
            limit: DEFAULT_MAX_RECURSION_DEPTH
        }
    );
}

#[test]
fn test_configurable_limit() {
    let mut f = ParsedFunction::new();
    f.set_max_recursion_depth(10);
    f.set_expression(nested(11));
    assert_eq!(f.parse().unwrap_err(), FuncError::RecursionLimit { limit: 10 });

    f.set_max_recursion_depth(20);
    f.parse().unwrap();
    assert_eq!(f.evaluate(&[]).unwrap(), 1.0);
}

#[test]
fn test_flat_operator_chains_are_not_nesting() {
    // A long left-associative chain splits iteratively; only parenthesis
    // groups and unary chains consume depth.
    let mut f = ParsedFunction::new();
    let chain = vec!["1"; 2000].join("+");
    f.set_expression(&chain);
    f.parse().unwrap();
    assert_eq!(f.evaluate(&[]).unwrap(), 2000.0);
}

#[test]
fn test_unary_chains_consume_depth() {
    let mut f = ParsedFunction::new();
    f.set_max_recursion_depth(10);
    let minuses = format!("{}1", "-".repeat(30));
    f.set_expression(&minuses);
    assert_eq!(f.parse().unwrap_err(), FuncError::RecursionLimit { limit: 10 });

    let minuses = format!("{}1", "-".repeat(5));
    f.set_expression(&minuses);
    f.parse().unwrap();
    assert_eq!(f.evaluate(&[]).unwrap(), -1.0);
}

#[test]
fn test_call_arguments_consume_depth() {
    let mut f = ParsedFunction::new();
    f.set_max_recursion_depth(8);
    // Each nested call re-enters the ladder through its argument list.
    f.set_expression("sqrt(sqrt(sqrt(sqrt(sqrt(sqrt(sqrt(sqrt(sqrt(sqrt(65536))))))))))");
    assert_eq!(f.parse().unwrap_err(), FuncError::RecursionLimit { limit: 8 });
}
