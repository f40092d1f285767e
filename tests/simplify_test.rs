//! Constant folding: parameter-only subtrees collapse, folded and original
//! trees stay evaluation-equivalent, and the folded tree tracks parameter
//! values only on request.

use simexpr::{assert_approx_eq, ExprNode, ParsedFunction};

fn with_param(expr: &str, vars: &[&str], param: &str, value: f64) -> ParsedFunction {
    let mut f = ParsedFunction::new();
    f.set_variable_names(vars.iter().copied());
    f.set_parameter_names([param]);
    f.set_parameter_values(vec![value]);
    f.set_expression(expr);
    f
}

#[test]
fn test_parameter_only_tree_folds_to_single_constant() {
    let mut f = with_param("k^2 + 2*k + 1", &[], "k", 3.0);
    f.parse().unwrap();
    assert_eq!(f.simplified_tree(), Some(&ExprNode::Constant(16.0)));
    assert_eq!(f.evaluate(&[]).unwrap(), 16.0);
}

#[test]
fn test_mixed_tree_folds_only_parameter_subtrees() {
    let mut f = with_param("x + 2*k", &["x"], "k", 10.0);
    f.parse().unwrap();
    match f.simplified_tree() {
        Some(ExprNode::Binary { left, right, .. }) => {
            assert!(matches!(**left, ExprNode::Variable(0)));
            assert!(matches!(**right, ExprNode::Constant(v) if v == 20.0));
        }
        other => panic!("expected partially folded tree, got {:?}", other),
    }
    assert_eq!(f.evaluate(&[1.0]).unwrap(), 21.0);
}

#[test]
fn test_folded_and_original_trees_agree() {
    let mut f = with_param("k * sin(x) + sqrt(k)", &["x"], "k", 4.0);
    f.parse().unwrap();
    for x in [-2.0, -0.5, 0.0, 0.5, 2.0] {
        assert_approx_eq!(
            f.evaluate(&[x]).unwrap(),
            f.evaluate_original(&[x]).unwrap()
        );
    }
}

#[test]
fn test_parameter_mutation_leaves_simplified_tree_stale() {
    let mut f = with_param("k * x", &["x"], "k", 2.0);
    f.parse().unwrap();
    assert_eq!(f.evaluate(&[1.0]).unwrap(), 2.0);

    // The folded tree holds the old value; the original sees the new one.
    f.set_parameter_values(vec![5.0]);
    assert_eq!(f.evaluate(&[1.0]).unwrap(), 2.0);
    assert_eq!(f.evaluate_original(&[1.0]).unwrap(), 5.0);

    // An explicit refresh re-folds against the current values.
    f.refresh_simplified().unwrap();
    assert_eq!(f.evaluate(&[1.0]).unwrap(), 5.0);
}

#[test]
fn test_simplify_disallowed_keeps_single_tree() {
    let mut f = with_param("k * x", &["x"], "k", 2.0);
    f.set_simplify_allowed(false);
    f.parse().unwrap();
    assert_eq!(f.simplified_tree(), None);

    // Without a folded copy, parameter mutation is visible immediately.
    f.set_parameter_values(vec![5.0]);
    assert_eq!(f.evaluate(&[1.0]).unwrap(), 5.0);
}

#[test]
fn test_folding_skips_domain_error_subtrees() {
    // The untaken branch divides by zero; folding must not evaluate it
    // into an error, and evaluation never reaches it.
    let mut f = ParsedFunction::new();
    f.set_expression("IF(1 = 1, 5, 1/0)");
    f.parse().unwrap();
    assert_eq!(f.evaluate(&[]).unwrap(), 5.0);

    // A reachable domain error still fires at evaluation time.
    let mut f = ParsedFunction::new();
    f.set_expression("sqrt(0 - 9)");
    f.parse().unwrap();
    assert!(f.evaluate(&[]).is_err());
}

#[test]
fn test_constant_conditionals_fold_through() {
    let mut f = ParsedFunction::new();
    f.set_expression("IF(2 > 1, 10, 20)");
    f.parse().unwrap();
    assert_eq!(f.simplified_tree(), Some(&ExprNode::Constant(10.0)));
}

#[test]
fn test_reserved_constants_fold() {
    let mut f = ParsedFunction::new();
    f.set_expression("2 * PI");
    f.parse().unwrap();
    assert!(matches!(
        f.simplified_tree(),
        Some(ExprNode::Constant(v)) if (*v - 2.0 * std::f64::consts::PI).abs() < 1e-12
    ));
}

#[test]
fn test_refresh_without_parse_is_rejected() {
    let mut f = ParsedFunction::new();
    assert!(f.refresh_simplified().is_err());
    assert!(f.simplify_in_place().is_err());
}

#[test]
fn test_simplify_in_place_equivalence() {
    let mut a = with_param("k*x^2 + k^2*x + k", &["x"], "k", 3.0);
    a.parse().unwrap();
    let mut b = with_param("k*x^2 + k^2*x + k", &["x"], "k", 3.0);
    b.parse().unwrap();
    b.simplify_in_place().unwrap();
    for x in [-1.0, 0.0, 0.25, 2.0] {
        assert_approx_eq!(a.evaluate(&[x]).unwrap(), b.evaluate(&[x]).unwrap());
    }
}
